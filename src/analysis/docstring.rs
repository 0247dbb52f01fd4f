// Docstring resolution
//
// A member's documentation may live on the member itself, on the same
// name further up its class's ancestry, or in comments above its source.

use crate::parser::PythonParser;
use crate::runtime::{DescriptorKind, ObjectId, ObjectKind, Reflect, RoutineKind};
use tracing::debug;

/// Docstring stored on the object itself.
///
/// A docstring identical to the one of the object's runtime type is
/// generic, not documentation, and counts as absent (except on the type of
/// all classes, which documents itself).
pub fn own_doc<R: Reflect>(rt: &R, id: ObjectId) -> Option<&str> {
    // Method wrappers carry the docstring of the function they wrap
    if let Some(function) = rt.unwrap_method(id) {
        return own_doc(rt, function);
    }

    let doc = rt.doc_slot(id).filter(|d| !d.is_empty())?;
    if id != rt.type_type() {
        let type_doc = rt.doc_slot(rt.type_of(id));
        if type_doc == Some(doc) {
            return None;
        }
    }
    Some(doc)
}

/// Class reached by walking the qualified name of `id` from its module
fn find_class<R: Reflect>(rt: &R, id: ObjectId) -> Option<ObjectId> {
    let mut current = rt.module_named(rt.module_name(id)?)?;
    let qualname = rt.qualname(id)?;
    let parts: Vec<&str> = qualname.split('.').collect();
    for part in &parts[..parts.len().saturating_sub(1)] {
        current = rt.get_attr(current, part).ok()??;
    }
    rt.is_class(current).then_some(current)
}

fn attr_is<R: Reflect>(rt: &R, owner: ObjectId, name: &str, value: ObjectId) -> bool {
    rt.get_attr(owner, name).ok().flatten() == Some(value)
}

/// Where to look for inherited documentation: anchor class and declared name
enum Anchor<'a> {
    Walk { class: ObjectId, name: &'a str },
    Found(&'a str),
}

fn anchor<R: Reflect>(rt: &R, id: ObjectId) -> Option<Anchor<'_>> {
    match rt.kind(id) {
        ObjectKind::Routine => {
            let info = rt.routine(id)?;
            match info.kind {
                RoutineKind::BoundMethod => {
                    let function = info.function?;
                    let receiver = info.receiver?;
                    let name = rt.name(function)?;
                    // Methods bound to a class are class methods of it
                    let bound_to_class = rt.is_class(receiver)
                        && rt
                            .get_attr(receiver, name)
                            .ok()
                            .flatten()
                            .is_some_and(|v| v == function || rt.routine(v).and_then(|r| r.function) == Some(function));
                    let class = if bound_to_class { receiver } else { rt.type_of(receiver) };
                    Some(Anchor::Walk { class, name })
                }
                RoutineKind::Function => {
                    let name = rt.name(id)?;
                    let class = find_class(rt, id)?;
                    attr_is(rt, class, name, id).then_some(Anchor::Walk { class, name })
                }
                RoutineKind::Builtin => {
                    let name = rt.name(id)?;
                    let receiver = info.receiver?;
                    let own_method = rt.is_class(receiver)
                        && rt
                            .qualname(receiver)
                            .zip(rt.qualname(id))
                            .is_some_and(|(owner, qualname)| format!("{}.{}", owner, name) == qualname);
                    let class = if own_method { receiver } else { rt.type_of(receiver) };
                    Some(Anchor::Walk { class, name })
                }
                RoutineKind::MethodDescriptor => {
                    let name = rt.name(id)?;
                    let class = info.owner?;
                    attr_is(rt, class, name, id).then_some(Anchor::Walk { class, name })
                }
            }
        }
        ObjectKind::Property => {
            let getter = rt.property(id)?.getter?;
            let name = rt.name(getter)?;
            let class = find_class(rt, getter)?;
            attr_is(rt, class, name, id).then_some(Anchor::Walk { class, name })
        }
        ObjectKind::DataDescriptor | ObjectKind::MethodDescriptor => {
            let info = rt.descriptor(id)?;
            let name = rt.name(id)?;
            let class = info.owner?;
            if !attr_is(rt, class, name, id) {
                return None;
            }
            if info.kind == DescriptorKind::Member {
                if let Some(doc) = rt.slot_docs(class).and_then(|slots| slots.get(name)) {
                    return Some(Anchor::Found(doc.as_str()));
                }
            }
            Some(Anchor::Walk { class, name })
        }
        _ => None,
    }
}

/// Documentation inherited from the same name on an ancestor
pub fn find_doc<R: Reflect>(rt: &R, id: ObjectId) -> Option<String> {
    let (class, name) = match anchor(rt, id)? {
        Anchor::Found(doc) => return Some(doc.to_string()),
        Anchor::Walk { class, name } => (class, name),
    };
    for base in rt.ancestry(class) {
        let Ok(Some(value)) = rt.get_attr(base, name) else {
            continue;
        };
        if let Some(doc) = own_doc(rt, value) {
            return Some(doc.to_string());
        }
    }
    None
}

/// Comment block above the object's definition in its source file
fn source_comments<R: Reflect>(rt: &R, id: ObjectId) -> Option<String> {
    let target = match rt.routine(id) {
        Some(info) if info.kind == RoutineKind::BoundMethod => info.function.unwrap_or(id),
        _ => rt.unwrap_method(id).unwrap_or(id),
    };

    let (path, line) = match rt.kind(target) {
        ObjectKind::Module => (rt.module_info(target)?.file.clone()?, None),
        ObjectKind::Class | ObjectKind::Routine => {
            let location = rt.source_location(target)?;
            (location.file.clone(), Some(location.line))
        }
        _ => return None,
    };
    if !path.is_file() {
        return None;
    }

    let comments = PythonParser::new()
        .and_then(|mut parser| parser.parse_file(&path))
        .map_err(|e| debug!(path = %path.display(), error = %e, "cannot read source comments"))
        .ok()?;
    match line {
        Some(line) => comments.preceding(line),
        None => comments.header(),
    }
}

/// Documentation of an object, cleaned up for display.
///
/// Own docstring, then an inherited one, then source comments; empty when
/// none exists.
pub fn get_doc<R: Reflect>(rt: &R, id: ObjectId) -> String {
    let found = own_doc(rt, id)
        .map(str::to_string)
        .or_else(|| find_doc(rt, id))
        .map(|doc| clean_doc(&doc))
        .filter(|doc| !doc.is_empty())
        .or_else(|| source_comments(rt, id));

    let Some(text) = found else {
        return String::new();
    };
    let text = text.trim_end();
    // Drop a single leading blank line
    match text.find('\n') {
        Some(end) if text[..end].chars().all(|c| c == ' ') => text[end + 1..].to_string(),
        _ => text.to_string(),
    }
}

/// Expand tabs to 8-column stops
pub fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = 8 - column % 8;
                out.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Normalize docstring indentation.
///
/// Tabs are expanded, the first line is left-stripped, the indentation
/// common to the remaining lines is removed and blank lines at either end
/// are dropped.
pub fn clean_doc(doc: &str) -> String {
    let expanded = expand_tabs(doc);
    let mut lines: Vec<String> = expanded.split('\n').map(str::to_string).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| line.chars().count() - line.trim_start().chars().count())
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Interpreter, Snapshot};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const ZOO: &str = r#"{"modules": [{
        "name": "zoo",
        "members": {
            "Animal": {"kind": "class", "doc": "An animal.", "members": {
                "speak": {"kind": "function", "signature": "(self)", "doc": "Make a sound."},
                "legs": {"kind": "property", "doc": "Number of legs."},
                "kind": {"kind": "descriptor", "flavor": "getset", "doc": "Kind of animal."}
            }},
            "Dog": {"kind": "class", "bases": ["zoo.Animal"], "members": {
                "speak": {"kind": "function", "signature": "(self)"},
                "legs": {"kind": "property"},
                "kind": {"kind": "descriptor", "flavor": "getset"},
                "fetch": {"kind": "class_method", "signature": "(cls)", "doc": "Fetch."}
            }},
            "Slotted": {"kind": "class", "slots": {"size": "How big it is."}, "members": {
                "size": {"kind": "descriptor", "flavor": "member"}
            }},
            "rex": {"kind": "data", "type": "zoo.Dog", "repr": "<zoo.Dog object>"},
            "count": {"kind": "data", "type": "int", "repr": "3"},
            "bark": {"kind": "bound_method", "function": "zoo.Dog.speak", "receiver": "zoo.rex"},
            "helper": {"kind": "function", "doc": "\n    Helps.\n\n        Indented.\n    "}
        }
    }]}"#;

    fn zoo() -> Interpreter {
        Snapshot::from_json(ZOO).unwrap().build(Path::new("zoo.json")).unwrap()
    }

    fn attr(rt: &Interpreter, path: &[&str]) -> ObjectId {
        let mut current = rt.module_named("zoo").unwrap();
        for name in path {
            current = rt.get_attr(current, name).unwrap().unwrap();
        }
        current
    }

    #[test]
    fn test_own_doc_ignores_type_doc() {
        let rt = zoo();
        let count = attr(&rt, &["count"]);
        // The value only sees the generic docstring of int
        assert!(rt.doc_slot(count).is_some());
        assert_eq!(own_doc(&rt, count), None);
        assert_eq!(get_doc(&rt, count), "");
    }

    #[test]
    fn test_own_doc_of_type_itself() {
        let rt = zoo();
        assert!(own_doc(&rt, rt.type_type()).is_some());
    }

    #[test]
    fn test_inherited_method_doc() {
        let rt = zoo();
        let speak = attr(&rt, &["Dog", "speak"]);
        assert_eq!(own_doc(&rt, speak), None);
        assert_eq!(find_doc(&rt, speak), Some("Make a sound.".to_string()));
        assert_eq!(get_doc(&rt, speak), "Make a sound.");
    }

    #[test]
    fn test_inherited_property_and_descriptor_doc() {
        let rt = zoo();
        assert_eq!(get_doc(&rt, attr(&rt, &["Dog", "legs"])), "Number of legs.");
        assert_eq!(get_doc(&rt, attr(&rt, &["Dog", "kind"])), "Kind of animal.");
    }

    #[test]
    fn test_slot_doc() {
        let rt = zoo();
        assert_eq!(get_doc(&rt, attr(&rt, &["Slotted", "size"])), "How big it is.");
    }

    #[test]
    fn test_bound_method_doc_from_receiver_type() {
        let rt = zoo();
        assert_eq!(get_doc(&rt, attr(&rt, &["bark"])), "Make a sound.");
    }

    #[test]
    fn test_class_method_wrapper_doc() {
        let rt = zoo();
        let dog = attr(&rt, &["Dog"]);
        let raw = rt.object(dog).attrs["fetch"];
        assert_eq!(own_doc(&rt, raw), Some("Fetch."));
    }

    #[test]
    fn test_instance_sees_class_doc() {
        let rt = zoo();
        // Neither rex nor its class carries a docstring
        assert_eq!(get_doc(&rt, attr(&rt, &["rex"])), "");
    }

    #[test]
    fn test_get_doc_cleans_indentation() {
        let rt = zoo();
        assert_eq!(get_doc(&rt, attr(&rt, &["helper"])), "Helps.\n\n    Indented.");
    }

    #[test]
    fn test_clean_doc() {
        assert_eq!(clean_doc("Summary.\n    Body\n      more\n"), "Summary.\nBody\n  more");
        assert_eq!(clean_doc("\n\n   Only body.\n"), "Only body.");
        assert_eq!(clean_doc("\tTabbed\n\tline"), "Tabbed\nline");
        assert_eq!(clean_doc(""), "");
    }

    #[test]
    fn test_get_doc_falls_back_to_comments() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("util.py");
        std::fs::write(&source, "# Utility helpers.\nimport os\n\n# Add numbers.\ndef add(a, b):\n    return a + b\n").unwrap();
        let json = format!(
            r#"{{"modules": [{{"name": "util", "file": {file:?}, "members": {{
                "add": {{"kind": "function", "line": 5}}
            }}}}]}}"#,
            file = source.display().to_string()
        );
        let rt = Snapshot::from_json(&json).unwrap().build(Path::new("util.json")).unwrap();
        let module = rt.module_named("util").unwrap();
        let add = rt.get_attr(module, "add").unwrap().unwrap();
        assert_eq!(get_doc(&rt, add), "# Add numbers.");
        assert_eq!(get_doc(&rt, module), "# Utility helpers.");
    }
}
