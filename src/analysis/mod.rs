// Introspection engine: resolution, visibility, docstrings, member
// classification and the discovery frontier

pub mod docstring;
pub mod frontier;
pub mod members;
pub mod resolver;
pub mod visibility;

pub use docstring::{clean_doc, find_doc, get_doc, own_doc};
pub use frontier::{Frontier, FrontierEntry, FrontierState};
pub use members::{classify, classify_class_attrs, MemberGroup, MemberKind, MemberRecord, MemberValue, Ownership};
pub use resolver::{Reference, Resolver};
pub use visibility::{is_visible, is_visible_in, module_exports};

use crate::runtime::{DescriptorKind, ObjectId, ObjectKind, Reflect, RoutineKind};
use serde::Serialize;

/// What a documented entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Module,
    Class,
    Routine,
    DataDescriptor,
    OtherValue,
}

impl EntityKind {
    pub fn of(rt: &impl Reflect, id: ObjectId) -> Self {
        match rt.kind(id) {
            ObjectKind::Module => EntityKind::Module,
            ObjectKind::Class => EntityKind::Class,
            kind if kind.is_routine() => EntityKind::Routine,
            kind if kind.is_data_descriptor() => EntityKind::DataDescriptor,
            _ => EntityKind::OtherValue,
        }
    }
}

/// A resolved documentation target
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub handle: ObjectId,
    /// Dotted name: `module.Qual.name` when the object knows its home
    pub qualified_name: String,
    pub display_name: String,
    pub kind: EntityKind,
    /// Home module of classes and routines
    pub module: Option<String>,
    /// Method resolution order of classes
    pub ancestry: Vec<ObjectId>,
}

impl Entity {
    pub fn new(rt: &impl Reflect, handle: ObjectId, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let kind = EntityKind::of(rt, handle);
        let module = match kind {
            EntityKind::Class | EntityKind::Routine => rt.module_name(handle).map(str::to_string),
            _ => None,
        };
        let qualified_name = match (kind, rt.module_name(handle), rt.qualname(handle)) {
            (EntityKind::Module, Some(name), _) => name.to_string(),
            (_, Some(module), Some(qualname)) => format!("{}.{}", module, qualname),
            _ => display_name.clone(),
        };
        let ancestry = if kind == EntityKind::Class {
            rt.ancestry(handle)
        } else {
            Vec::new()
        };
        Self {
            handle,
            qualified_name,
            display_name,
            kind,
            module,
            ancestry,
        }
    }
}

/// Short description of an object, used as a page title
pub fn describe(rt: &impl Reflect, id: ObjectId) -> String {
    let name = rt.name(id).unwrap_or("");
    match rt.kind(id) {
        ObjectKind::Module => match rt.module_info(id) {
            Some(info) if info.builtin => format!("built-in module {}", name),
            Some(info) if info.package => format!("package {}", name),
            _ => format!("module {}", name),
        },
        ObjectKind::Class => format!("class {}", name),
        ObjectKind::Routine => match rt.routine(id).map(|r| r.kind) {
            Some(RoutineKind::Builtin) => format!("built-in function {}", name),
            Some(RoutineKind::BoundMethod) => format!("method {}", name),
            Some(RoutineKind::Function) => format!("function {}", name),
            _ => type_name(rt, id),
        },
        ObjectKind::DataDescriptor => match rt.descriptor(id) {
            Some(info) if info.kind != DescriptorKind::Custom => {
                let label = if info.kind == DescriptorKind::GetSet {
                    "getset descriptor"
                } else {
                    "member descriptor"
                };
                let owner = info.owner.map(|o| {
                    format!(
                        "{}.{}",
                        rt.module_name(o).unwrap_or(""),
                        rt.name(o).unwrap_or("")
                    )
                });
                match owner {
                    Some(owner) => format!("{} {}.{}", label, owner, name),
                    None => format!("{} {}", label, name),
                }
            }
            _ => type_name(rt, id),
        },
        _ => type_name(rt, id),
    }
}

fn type_name(rt: &impl Reflect, id: ObjectId) -> String {
    rt.name(rt.type_of(id)).unwrap_or("object").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Interpreter, Snapshot};
    use std::path::Path;

    fn interp() -> Interpreter {
        let json = r#"{"modules": [
            {"name": "pkg", "package": true, "submodules": ["pkg.core"]},
            {"name": "pkg.core", "members": {
                "Engine": {"kind": "class", "members": {
                    "start": {"kind": "function", "signature": "(self)"},
                    "speed": {"kind": "descriptor", "flavor": "member"}
                }},
                "run": {"kind": "function"},
                "LIMIT": {"kind": "data", "type": "int", "repr": "10"}
            }}
        ]}"#;
        Snapshot::from_json(json).unwrap().build(Path::new("t.json")).unwrap()
    }

    fn get(rt: &Interpreter, module: &str, name: &str) -> ObjectId {
        let m = rt.module_named(module).unwrap();
        rt.get_attr(m, name).unwrap().unwrap()
    }

    #[test]
    fn test_entity_kinds() {
        let rt = interp();
        assert_eq!(EntityKind::of(&rt, rt.module_named("pkg").unwrap()), EntityKind::Module);
        assert_eq!(EntityKind::of(&rt, get(&rt, "pkg.core", "Engine")), EntityKind::Class);
        assert_eq!(EntityKind::of(&rt, get(&rt, "pkg.core", "run")), EntityKind::Routine);
        assert_eq!(EntityKind::of(&rt, get(&rt, "pkg.core", "LIMIT")), EntityKind::OtherValue);
    }

    #[test]
    fn test_entity_names() {
        let rt = interp();
        let engine = get(&rt, "pkg.core", "Engine");
        let entity = Entity::new(&rt, engine, "Engine");
        assert_eq!(entity.qualified_name, "pkg.core.Engine");
        assert_eq!(entity.module.as_deref(), Some("pkg.core"));
        assert_eq!(entity.ancestry, vec![engine, rt.root_type()]);

        let module = Entity::new(&rt, rt.module_named("pkg.core").unwrap(), "pkg.core");
        assert_eq!(module.qualified_name, "pkg.core");
        assert!(module.module.is_none());
    }

    #[test]
    fn test_describe() {
        let rt = interp();
        assert_eq!(describe(&rt, rt.module_named("pkg").unwrap()), "package pkg");
        assert_eq!(describe(&rt, rt.module_named("pkg.core").unwrap()), "module pkg.core");
        assert_eq!(describe(&rt, rt.builtins()), "built-in module builtins");
        assert_eq!(describe(&rt, get(&rt, "pkg.core", "Engine")), "class Engine");
        assert_eq!(describe(&rt, get(&rt, "pkg.core", "run")), "function run");
        assert_eq!(describe(&rt, get(&rt, "builtins", "len")), "built-in function len");
        assert_eq!(describe(&rt, get(&rt, "pkg.core", "LIMIT")), "int");

        let engine = get(&rt, "pkg.core", "Engine");
        let speed = rt.get_attr(engine, "speed").unwrap().unwrap();
        assert_eq!(describe(&rt, speed), "member descriptor pkg.core.Engine.speed");
    }
}
