// Visibility of member names

use crate::config::Config;
use crate::runtime::{ObjectId, Reflect};

/// Bookkeeping names never worth documenting
const RESERVED: &[&str] = &[
    "__author__",
    "__builtins__",
    "__cached__",
    "__credits__",
    "__date__",
    "__dict__",
    "__doc__",
    "__file__",
    "__spec__",
    "__loader__",
    "__module__",
    "__name__",
    "__package__",
    "__path__",
    "__qualname__",
    "__slots__",
    "__version__",
    "__weakref__",
];

/// Decide whether a member name should be shown.
///
/// `exports` is the owner's export allow-list, `has_fields` whether the
/// owner carries a named-fields marker.
pub fn is_visible(name: &str, exports: Option<&[String]>, has_fields: bool) -> bool {
    if RESERVED.contains(&name) {
        return false;
    }
    // Special names are shown, private ones hidden
    if name.starts_with("__") && name.ends_with("__") {
        return true;
    }
    if has_fields && name.starts_with('_') {
        return true;
    }
    match exports {
        Some(exports) => exports.iter().any(|e| e == name),
        None => !name.starts_with('_'),
    }
}

/// `is_visible` with the named-fields marker read from `owner`
pub fn is_visible_in(rt: &impl Reflect, name: &str, exports: Option<&[String]>, owner: Option<ObjectId>) -> bool {
    let has_fields = owner.is_some_and(|owner| rt.fields(owner).is_some());
    is_visible(name, exports, has_fields)
}

/// Export list that applies to a module.
///
/// Ignored entirely when internals are documented; a configured override
/// wins over the module's own list.
pub fn module_exports(rt: &impl Reflect, module: ObjectId, config: &Config) -> Option<Vec<String>> {
    if config.render.document_internals {
        return None;
    }
    if let Some(name) = rt.name(module) {
        if let Some(names) = config.exports.get(name) {
            return Some(names.clone());
        }
    }
    rt.module_info(module).and_then(|info| info.exports.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Interpreter, Snapshot};
    use std::path::Path;

    #[test]
    fn test_reserved_names_hidden() {
        assert!(!is_visible("__dict__", None, false));
        assert!(!is_visible("__doc__", None, true));
        let exports = vec!["__version__".to_string()];
        assert!(!is_visible("__version__", Some(exports.as_slice()), false));
    }

    #[test]
    fn test_special_names_shown() {
        assert!(is_visible("__init__", None, false));
        assert!(is_visible("__eq__", Some(&[][..]), false));
    }

    #[test]
    fn test_private_names() {
        assert!(!is_visible("_private", None, false));
        assert!(is_visible("_private", None, true));
        assert!(is_visible("_asdict", Some(&[][..]), true));
        assert!(!is_visible("__mangled", None, false));
    }

    #[test]
    fn test_export_list_is_exact() {
        let exports = vec!["public".to_string(), "_exported".to_string()];
        assert!(is_visible("public", Some(exports.as_slice()), false));
        assert!(is_visible("_exported", Some(exports.as_slice()), false));
        assert!(!is_visible("other", Some(exports.as_slice()), false));
        assert!(is_visible("other", None, false));
    }

    fn interp() -> Interpreter {
        let json = r#"{"modules": [
            {"name": "records", "exports": ["Point"], "members": {
                "Point": {"kind": "class", "fields": ["x", "y"]},
                "Plain": {"kind": "class"}
            }}
        ]}"#;
        Snapshot::from_json(json).unwrap().build(Path::new("t.json")).unwrap()
    }

    #[test]
    fn test_fields_marker_from_owner() {
        let rt = interp();
        let module = rt.module_named("records").unwrap();
        let point = rt.get_attr(module, "Point").unwrap();
        let plain = rt.get_attr(module, "Plain").unwrap();
        assert!(is_visible_in(&rt, "_replace", None, point));
        assert!(!is_visible_in(&rt, "_replace", None, plain));
        assert!(!is_visible_in(&rt, "_replace", None, None));
    }

    #[test]
    fn test_module_export_precedence() {
        let rt = interp();
        let module = rt.module_named("records").unwrap();
        let mut config = Config::default();
        assert_eq!(module_exports(&rt, module, &config), Some(vec!["Point".to_string()]));

        config.exports.insert("records".to_string(), vec!["Plain".to_string()]);
        assert_eq!(module_exports(&rt, module, &config), Some(vec!["Plain".to_string()]));

        config.render.document_internals = true;
        assert_eq!(module_exports(&rt, module, &config), None);
    }
}
