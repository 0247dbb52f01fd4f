// Name resolution
//
// Turns a dotted path or a live handle into an `Entity`, importing
// modules through the runtime as needed.

use super::Entity;
use crate::error::{Error, Result};
use crate::runtime::{ImportFailure, ModuleSystem, ObjectId, Reflect};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What the caller asked to document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// Dotted path such as `pkg.module.Class`
    Path(&'a str),
    /// An object already in hand
    Handle(ObjectId),
}

/// Resolves references against a runtime's module system
#[derive(Debug, Default)]
pub struct Resolver {
    /// Re-import modules even when already loaded
    force_reload: bool,
    /// Modules evicted by forced reloads, kept alive for the resolver's lifetime
    evicted: IndexMap<String, ObjectId>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force_reload(mut self, force_reload: bool) -> Self {
        self.force_reload = force_reload;
        self
    }

    /// Names of the modules evicted so far
    pub fn evicted(&self) -> impl Iterator<Item = &str> {
        self.evicted.keys().map(String::as_str)
    }

    /// Import a module, returning the innermost module of a dotted path.
    ///
    /// `Ok(None)` means no module of that name exists. A module that exists
    /// but fails to import is an `Error::ImportTime`.
    pub fn safe_import<R>(&mut self, rt: &mut R, path: &str) -> Result<Option<ObjectId>>
    where
        R: Reflect + ModuleSystem,
    {
        if self.force_reload && rt.loaded(path).is_some() && !rt.is_builtin_module(path) {
            self.evict_tree(rt, path);
        }

        let failure = match rt.import(path) {
            Ok(module) => return Ok(Some(module)),
            Err(failure) => failure,
        };

        // A module left in the registry failed while executing
        if let Some(module) = rt.loaded(path) {
            let filename = rt.module_info(module).and_then(|info| info.file.clone());
            warn!(module = path, "import failed after the module was found");
            return Err(Error::import_time(filename, failure_message(&failure)));
        }

        match failure {
            ImportFailure::NotFound { ref name } if name == path => {
                debug!(module = path, "no such module");
                Ok(None)
            }
            ImportFailure::Syntax { filename, message } => {
                warn!(module = path, "syntax error while importing");
                Err(Error::import_time(filename, format!("SyntaxError: {}", message)))
            }
            ImportFailure::Execution { filename, ref message } => {
                warn!(module = path, error = %message, "error while importing");
                let filename = filename.or_else(|| Some(PathBuf::from(path)));
                Err(Error::import_time(filename, message.clone()))
            }
            other => {
                warn!(module = path, "error while importing");
                Err(Error::import_time(Some(PathBuf::from(path)), failure_message(&other)))
            }
        }
    }

    /// Remove `path` and its loaded submodules from the registry
    fn evict_tree<R: ModuleSystem>(&mut self, rt: &mut R, path: &str) {
        let below = format!("{}.", path);
        let mut names = vec![path.to_string()];
        names.extend(rt.loaded_names().into_iter().filter(|name| name.starts_with(&below)));
        for name in names {
            if let Some(module) = rt.evict(&name) {
                debug!(module = %name, "evicted for reload");
                self.evicted.insert(name, module);
            }
        }
    }

    /// Find an object by dotted path, importing as necessary.
    ///
    /// Prefixes are imported left to right; the rest of the path is looked
    /// up as attributes of the last module imported, or of the built-in
    /// namespace when nothing could be imported.
    pub fn locate<R>(&mut self, rt: &mut R, path: &str) -> Result<Option<ObjectId>>
    where
        R: Reflect + ModuleSystem,
    {
        let path = path.replace('-', "_");
        let parts: Vec<&str> = path.split('.').filter(|part| !part.is_empty()).collect();
        if parts.is_empty() {
            return Ok(None);
        }

        let mut module = None;
        let mut index = 0;
        while index < parts.len() {
            match self.safe_import(rt, &parts[..=index].join("."))? {
                Some(next) => {
                    module = Some(next);
                    index += 1;
                }
                None => break,
            }
        }

        let mut object = module.unwrap_or_else(|| rt.builtins());
        for part in &parts[index..] {
            match rt.get_attr(object, part) {
                Ok(Some(value)) => object = value,
                Ok(None) | Err(_) => {
                    debug!(path = %path, missing = part, "attribute lookup failed");
                    return Ok(None);
                }
            }
        }
        Ok(Some(object))
    }

    /// Resolve a reference to an entity and its display name
    pub fn resolve<R>(&mut self, rt: &mut R, reference: Reference<'_>) -> Result<Entity>
    where
        R: Reflect + ModuleSystem,
    {
        match reference {
            Reference::Handle(id) => Ok(Entity::new(&*rt, id, display_name(&*rt, id))),
            Reference::Path(path) => match self.locate(rt, path)? {
                Some(id) => Ok(Entity::new(&*rt, id, path)),
                None => Err(Error::resolution(path)),
            },
        }
    }
}

/// Declared name of an object, or its repr when it has none
pub fn display_name(rt: &impl Reflect, id: ObjectId) -> String {
    match rt.name(id) {
        Some(name) => name.to_string(),
        None => rt.repr(id),
    }
}

fn failure_message(failure: &ImportFailure) -> String {
    match failure {
        ImportFailure::NotFound { name } => format!("ModuleNotFoundError: No module named '{}'", name),
        ImportFailure::Syntax { message, .. } => format!("SyntaxError: {}", message),
        ImportFailure::Execution { message, .. } => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EntityKind;
    use crate::runtime::{Interpreter, Snapshot};
    use std::path::Path;

    const GRAPH: &str = r#"{"modules": [
        {"name": "net", "package": true, "file": "net/__init__.py"},
        {"name": "net.http", "file": "net/http.py", "members": {
            "Client": {"kind": "class", "members": {
                "get": {"kind": "function", "signature": "(self, url)"}
            }},
            "TIMEOUT": {"kind": "data", "type": "int", "repr": "30"}
        }},
        {"name": "net.http.cookies", "file": "net/http/cookies.py"},
        {"name": "broken", "file": "broken.py", "import_error": {"kind": "execution", "message": "RuntimeError: boom"}},
        {"name": "bad_syntax", "import_error": {"kind": "syntax", "message": "invalid syntax", "filename": "bad_syntax.py"}},
        {"name": "needs_numpy", "import_error": {"kind": "missing_dependency", "name": "numpy"}},
        {"name": "my_tool"}
    ]}"#;

    fn graph() -> Interpreter {
        Snapshot::from_json(GRAPH).unwrap().build(Path::new("graph.json")).unwrap()
    }

    #[test]
    fn test_resolve_module_path() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let entity = resolver.resolve(&mut rt, Reference::Path("net.http")).unwrap();
        assert_eq!(entity.kind, EntityKind::Module);
        assert_eq!(entity.display_name, "net.http");
        assert!(rt.loaded("net").is_some());
    }

    #[test]
    fn test_resolve_attribute_path() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let entity = resolver.resolve(&mut rt, Reference::Path("net.http.Client.get")).unwrap();
        assert_eq!(entity.kind, EntityKind::Routine);
        assert_eq!(entity.qualified_name, "net.http.Client.get");
        assert_eq!(entity.module.as_deref(), Some("net.http"));
    }

    #[test]
    fn test_resolve_builtin_fallback() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let entity = resolver.resolve(&mut rt, Reference::Path("len")).unwrap();
        assert_eq!(entity.kind, EntityKind::Routine);
        let entity = resolver.resolve(&mut rt, Reference::Path("object")).unwrap();
        assert_eq!(entity.handle, rt.root_type());
    }

    #[test]
    fn test_resolve_hyphens() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let entity = resolver.resolve(&mut rt, Reference::Path("my-tool")).unwrap();
        assert_eq!(entity.kind, EntityKind::Module);
        assert_eq!(entity.display_name, "my-tool");
    }

    #[test]
    fn test_resolve_missing_is_resolution_error() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let err = resolver.resolve(&mut rt, Reference::Path("nowhere.at.all")).unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
        let err = resolver.resolve(&mut rt, Reference::Path("net.http.Missing")).unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
        assert!(resolver.resolve(&mut rt, Reference::Path("")).is_err());
    }

    #[test]
    fn test_resolve_handle() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let http = resolver.resolve(&mut rt, Reference::Path("net.http")).unwrap();
        let timeout = rt.get_attr(http.handle, "TIMEOUT").unwrap().unwrap();

        let entity = resolver.resolve(&mut rt, Reference::Handle(http.handle)).unwrap();
        assert_eq!(entity.display_name, "net.http");
        let entity = resolver.resolve(&mut rt, Reference::Handle(timeout)).unwrap();
        assert_eq!(entity.display_name, "30");
        assert_eq!(entity.kind, EntityKind::OtherValue);
    }

    #[test]
    fn test_safe_import_failures() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        assert_eq!(resolver.safe_import(&mut rt, "absent").unwrap(), None);

        let err = resolver.safe_import(&mut rt, "broken").unwrap_err();
        assert!(matches!(&err, Error::ImportTime { filename: Some(f), .. } if f == Path::new("broken.py")));
        assert_eq!(err.to_string(), "problem in broken.py - RuntimeError: boom");

        let err = resolver.safe_import(&mut rt, "bad_syntax").unwrap_err();
        assert!(err.to_string().contains("SyntaxError"));

        let err = resolver.safe_import(&mut rt, "needs_numpy").unwrap_err();
        assert!(err.is_skippable());
        assert!(err.to_string().contains("numpy"));
    }

    #[test]
    fn test_import_time_error_surfaces_from_resolve() {
        let mut rt = graph();
        let mut resolver = Resolver::new();
        let err = resolver.resolve(&mut rt, Reference::Path("broken.thing")).unwrap_err();
        assert!(matches!(err, Error::ImportTime { .. }));
    }

    #[test]
    fn test_force_reload_evicts_submodules() {
        let mut rt = graph();
        rt.import("net.http.cookies").unwrap();

        let mut resolver = Resolver::new().with_force_reload(true);
        let module = resolver.safe_import(&mut rt, "net.http").unwrap();
        assert!(module.is_some());

        let evicted: Vec<&str> = resolver.evicted().collect();
        assert_eq!(evicted, vec!["net.http", "net.http.cookies"]);
        // Reimported, but submodules stay out until asked for again
        assert!(rt.loaded("net.http").is_some());
        assert!(rt.loaded("net.http.cookies").is_none());
        assert!(rt.loaded("net").is_some());
    }

    #[test]
    fn test_force_reload_keeps_builtins() {
        let mut rt = graph();
        let mut resolver = Resolver::new().with_force_reload(true);
        assert!(resolver.safe_import(&mut rt, "builtins").unwrap().is_some());
        assert_eq!(resolver.evicted().count(), 0);
    }
}
