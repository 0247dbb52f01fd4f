// Host runtime: reflection capabilities and the module system
//
// The documentation engine only talks to the runtime through the `Reflect`
// and `ModuleSystem` traits. `Interpreter` is the shipped implementation,
// populated from object graph snapshots.

mod builtins;
mod interpreter;
mod mro;
pub mod object;
pub mod snapshot;

pub use interpreter::Interpreter;
pub use object::*;
pub use snapshot::{load_snapshot, load_snapshot_dir, Snapshot};

use indexmap::IndexMap;
use std::path::PathBuf;

/// Read-only reflection over live objects
pub trait Reflect {
    fn kind(&self, id: ObjectId) -> ObjectKind;

    /// Declared `__name__`, if the object has a textual one
    fn name(&self, id: ObjectId) -> Option<&str>;

    fn qualname(&self, id: ObjectId) -> Option<&str>;

    /// Name of the module the object was defined in
    fn module_name(&self, id: ObjectId) -> Option<&str>;

    /// Runtime type of the object
    fn type_of(&self, id: ObjectId) -> ObjectId;

    /// Docstring visible on the object, including one found on its type for
    /// plain instances
    fn doc_slot(&self, id: ObjectId) -> Option<&str>;

    fn source_location(&self, id: ObjectId) -> Option<&SourceLocation>;

    /// Own namespace in definition order
    fn list_members(&self, id: ObjectId) -> Vec<(&str, ObjectId)>;

    /// Method resolution order of a class, the class itself first
    fn ancestry(&self, id: ObjectId) -> Vec<ObjectId>;

    fn bases(&self, id: ObjectId) -> Vec<ObjectId>;

    /// Attribute lookup with descriptor semantics
    fn get_attr(&self, id: ObjectId, name: &str) -> Result<Option<ObjectId>, AccessError>;

    fn signature(&self, id: ObjectId) -> Option<&str>;

    /// Named-fields marker, looked up through the ancestry
    fn fields(&self, id: ObjectId) -> Option<&[String]>;

    /// Slot documentation table of a class
    fn slot_docs(&self, id: ObjectId) -> Option<&IndexMap<String, String>>;

    fn routine(&self, id: ObjectId) -> Option<&RoutineInfo>;

    fn property(&self, id: ObjectId) -> Option<&PropertyInfo>;

    fn descriptor(&self, id: ObjectId) -> Option<&DescriptorInfo>;

    fn module_info(&self, id: ObjectId) -> Option<&ModuleInfo>;

    /// Function wrapped by a static-method or class-method wrapper
    fn unwrap_method(&self, id: ObjectId) -> Option<ObjectId>;

    /// Reason a class refuses member enumeration
    fn enumeration_error(&self, id: ObjectId) -> Option<&str>;

    fn repr(&self, id: ObjectId) -> String;

    /// The universal root type every class derives from
    fn root_type(&self) -> ObjectId;

    /// The type of all classes
    fn type_type(&self) -> ObjectId;

    /// The built-in namespace
    fn builtins(&self) -> ObjectId;

    /// Any module object known to the runtime, loaded or not
    fn module_named(&self, name: &str) -> Option<ObjectId>;

    fn is_class(&self, id: ObjectId) -> bool {
        self.kind(id) == ObjectKind::Class
    }

    fn is_module(&self, id: ObjectId) -> bool {
        self.kind(id) == ObjectKind::Module
    }

    /// Module an object was defined in, the module itself for modules
    fn module_of(&self, id: ObjectId) -> Option<ObjectId> {
        if self.is_module(id) {
            return Some(id);
        }
        self.module_name(id).and_then(|name| self.module_named(name))
    }
}

/// Why an import did not produce a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportFailure {
    /// No module with this name exists
    NotFound { name: String },
    /// The module source could not be compiled
    Syntax {
        filename: Option<PathBuf>,
        message: String,
    },
    /// The module was found but raised while executing
    Execution {
        filename: Option<PathBuf>,
        message: String,
    },
}

/// The runtime's module registry and import machinery
pub trait ModuleSystem {
    /// Module currently present in the registry
    fn loaded(&self, name: &str) -> Option<ObjectId>;

    fn loaded_names(&self) -> Vec<String>;

    /// Import a dotted module path, returning the innermost module
    fn import(&mut self, path: &str) -> Result<ObjectId, ImportFailure>;

    /// Remove a module from the registry, returning what was there
    fn evict(&mut self, name: &str) -> Option<ObjectId>;

    fn is_builtin_module(&self, name: &str) -> bool;

    /// Recorded reason importing `name` fails
    fn import_failure(&self, name: &str) -> Option<&ImportFailure>;

    /// Importable modules strictly below `prefix`, sorted by name; every
    /// module for an empty prefix
    fn iter_modules(&self, prefix: &str) -> Vec<String>;
}
