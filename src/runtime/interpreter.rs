// In-memory interpreter: object arena, module registry and finder

use super::builtins::{self, bootstrap};
use super::mro::{c3_linearize, depth_first};
use super::object::*;
use super::{ImportFailure, ModuleSystem, Reflect};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// A runtime whose objects live in an arena
#[derive(Debug, Clone)]
pub struct Interpreter {
    objects: Vec<Object>,
    /// Every module the finder can produce
    modules: IndexMap<String, ObjectId>,
    /// Modules currently imported
    registry: IndexMap<String, ObjectId>,
    /// Modules whose import fails
    failures: HashMap<String, ImportFailure>,
    builtins: ObjectId,
    object: ObjectId,
    type_: ObjectId,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter holding only the built-in namespace
    pub fn new() -> Self {
        let mut interp = Self {
            objects: Vec::new(),
            modules: IndexMap::new(),
            registry: IndexMap::new(),
            failures: HashMap::new(),
            builtins: ObjectId(0),
            object: ObjectId(0),
            type_: ObjectId(0),
        };
        let core = bootstrap(&mut interp);
        interp.modules.insert(builtins::MODULE.to_string(), core.builtins);
        interp.registry.insert(builtins::MODULE.to_string(), core.builtins);
        interp
    }

    pub(crate) fn set_core(&mut self, builtins: ObjectId, object: ObjectId, type_: ObjectId) {
        self.builtins = builtins;
        self.object = object;
        self.type_ = type_;
    }

    /// Store an object exactly as given
    pub(crate) fn alloc_raw(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        id
    }

    /// Store an object, filling in its runtime type from its kind when unset
    pub fn alloc(&mut self, mut object: Object) -> ObjectId {
        if object.type_of.is_none() {
            object.type_of = Some(self.default_type(&object.body));
        }
        self.alloc_raw(object)
    }

    fn default_type(&self, body: &Body) -> ObjectId {
        let name = match body {
            Body::Module(_) => "module",
            Body::Class(_) => return self.type_,
            Body::Routine(info) => match info.kind {
                RoutineKind::Function => "function",
                RoutineKind::BoundMethod => "method",
                RoutineKind::Builtin => "builtin_function_or_method",
                RoutineKind::MethodDescriptor => "method_descriptor",
            },
            Body::StaticMethod(_) => "staticmethod",
            Body::ClassMethod(_) => "classmethod",
            Body::Property(_) => "property",
            Body::Descriptor(info) => match info.kind {
                DescriptorKind::Member => "member_descriptor",
                DescriptorKind::GetSet => "getset_descriptor",
                DescriptorKind::Custom => return self.object,
            },
            Body::Data { .. } => return self.object,
        };
        self.builtin_type(name).unwrap_or(self.object)
    }

    /// A type from the built-in namespace
    pub fn builtin_type(&self, name: &str) -> Option<ObjectId> {
        self.objects[self.builtins.0]
            .attrs
            .get(name)
            .copied()
            .filter(|&id| self.objects[id.0].kind() == ObjectKind::Class)
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.0]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bind `name` in the namespace of `owner`
    pub fn set_attr(&mut self, owner: ObjectId, name: &str, value: ObjectId) {
        self.objects[owner.0].attrs.insert(name.to_string(), value);
    }

    /// Make a module importable under `name`
    pub fn add_module(&mut self, name: &str, module: ObjectId) {
        self.modules.insert(name.to_string(), module);
    }

    /// Make importing `name` fail
    pub fn set_import_failure(&mut self, name: &str, failure: ImportFailure) {
        self.failures.insert(name.to_string(), failure);
    }

    /// Replace the bases of a class and recompute its ancestry
    pub fn set_bases(&mut self, class: ObjectId, bases: Vec<ObjectId>) {
        if let Body::Class(info) = &mut self.objects[class.0].body {
            info.bases = bases;
        }
        self.finalize_class(class);
    }

    /// Compute the ancestry of a class from its bases.
    ///
    /// Bases must already be finalized.
    pub fn finalize_class(&mut self, class: ObjectId) {
        let bases = match &self.objects[class.0].body {
            Body::Class(info) => info.bases.clone(),
            _ => return,
        };
        let base_mros: Vec<Vec<ObjectId>> = bases.iter().map(|&b| self.ancestry(b)).collect();
        let mro = c3_linearize(class, &bases, &base_mros).unwrap_or_else(|| {
            debug!(class = ?self.objects[class.0].name, "inconsistent hierarchy, using depth-first order");
            depth_first(class, &base_mros)
        });
        if let Body::Class(info) = &mut self.objects[class.0].body {
            info.mro = mro;
        }
    }

    fn class_info(&self, id: ObjectId) -> Option<&ClassInfo> {
        match &self.objects[id.0].body {
            Body::Class(info) => Some(info),
            _ => None,
        }
    }

    /// Apply descriptor semantics to a value found in a class namespace
    fn bind_class_attr(&self, name: &str, value: ObjectId) -> Result<ObjectId, AccessError> {
        match &self.objects[value.0].body {
            Body::StaticMethod(function) | Body::ClassMethod(function) => Ok(*function),
            Body::Descriptor(DescriptorInfo {
                get_error: Some(message),
                ..
            }) => Err(AccessError {
                name: name.to_string(),
                message: message.clone(),
            }),
            _ => Ok(value),
        }
    }

    fn lookup_in_mro(&self, class: ObjectId, name: &str) -> Result<Option<ObjectId>, AccessError> {
        for ancestor in self.ancestry(class) {
            if let Some(&value) = self.objects[ancestor.0].attrs.get(name) {
                return self.bind_class_attr(name, value).map(Some);
            }
        }
        Ok(None)
    }
}

impl Reflect for Interpreter {
    fn kind(&self, id: ObjectId) -> ObjectKind {
        self.objects[id.0].kind()
    }

    fn name(&self, id: ObjectId) -> Option<&str> {
        self.objects[id.0].name.as_deref()
    }

    fn qualname(&self, id: ObjectId) -> Option<&str> {
        let obj = &self.objects[id.0];
        obj.qualname.as_deref().or(obj.name.as_deref())
    }

    fn module_name(&self, id: ObjectId) -> Option<&str> {
        let obj = &self.objects[id.0];
        match obj.body {
            Body::Module(_) => obj.name.as_deref(),
            _ => obj.module.as_deref(),
        }
    }

    fn type_of(&self, id: ObjectId) -> ObjectId {
        self.objects[id.0].type_of.unwrap_or(self.object)
    }

    fn doc_slot(&self, id: ObjectId) -> Option<&str> {
        let obj = &self.objects[id.0];
        match obj.body {
            // Plain instances see the docstring of their class
            Body::Data { .. } if obj.doc.is_none() => self.objects[self.type_of(id).0].doc.as_deref(),
            _ => obj.doc.as_deref(),
        }
    }

    fn source_location(&self, id: ObjectId) -> Option<&SourceLocation> {
        self.objects[id.0].source.as_ref()
    }

    fn list_members(&self, id: ObjectId) -> Vec<(&str, ObjectId)> {
        self.objects[id.0]
            .attrs
            .iter()
            .map(|(name, &value)| (name.as_str(), value))
            .collect()
    }

    fn ancestry(&self, id: ObjectId) -> Vec<ObjectId> {
        match self.class_info(id) {
            Some(info) if !info.mro.is_empty() => info.mro.clone(),
            Some(_) => vec![id],
            None => Vec::new(),
        }
    }

    fn bases(&self, id: ObjectId) -> Vec<ObjectId> {
        self.class_info(id).map(|info| info.bases.clone()).unwrap_or_default()
    }

    fn get_attr(&self, id: ObjectId, name: &str) -> Result<Option<ObjectId>, AccessError> {
        match &self.objects[id.0].body {
            Body::Module(_) => Ok(self.objects[id.0].attrs.get(name).copied()),
            Body::Class(_) => self.lookup_in_mro(id, name),
            _ => {
                if let Some(&value) = self.objects[id.0].attrs.get(name) {
                    return Ok(Some(value));
                }
                self.lookup_in_mro(self.type_of(id), name)
            }
        }
    }

    fn signature(&self, id: ObjectId) -> Option<&str> {
        match &self.objects[id.0].body {
            Body::Class(info) => info.signature.as_deref(),
            Body::Routine(info) => info.signature.as_deref(),
            Body::StaticMethod(function) | Body::ClassMethod(function) => self.signature(*function),
            _ => None,
        }
    }

    fn fields(&self, id: ObjectId) -> Option<&[String]> {
        let class = match self.objects[id.0].body {
            Body::Class(_) => id,
            Body::Module(_) => return None,
            _ => self.type_of(id),
        };
        self.ancestry(class)
            .into_iter()
            .find_map(|ancestor| self.class_info(ancestor).and_then(|info| info.fields.as_deref()))
    }

    fn slot_docs(&self, id: ObjectId) -> Option<&IndexMap<String, String>> {
        self.class_info(id).and_then(|info| info.slots.as_ref())
    }

    fn routine(&self, id: ObjectId) -> Option<&RoutineInfo> {
        match &self.objects[id.0].body {
            Body::Routine(info) => Some(info),
            _ => None,
        }
    }

    fn property(&self, id: ObjectId) -> Option<&PropertyInfo> {
        match &self.objects[id.0].body {
            Body::Property(info) => Some(info),
            _ => None,
        }
    }

    fn descriptor(&self, id: ObjectId) -> Option<&DescriptorInfo> {
        match &self.objects[id.0].body {
            Body::Descriptor(info) => Some(info),
            _ => None,
        }
    }

    fn module_info(&self, id: ObjectId) -> Option<&ModuleInfo> {
        match &self.objects[id.0].body {
            Body::Module(info) => Some(info),
            _ => None,
        }
    }

    fn unwrap_method(&self, id: ObjectId) -> Option<ObjectId> {
        match &self.objects[id.0].body {
            Body::StaticMethod(function) | Body::ClassMethod(function) => Some(*function),
            _ => None,
        }
    }

    fn enumeration_error(&self, id: ObjectId) -> Option<&str> {
        self.class_info(id).and_then(|info| info.enumeration_error.as_deref())
    }

    fn repr(&self, id: ObjectId) -> String {
        let obj = &self.objects[id.0];
        let name = obj.name.as_deref().unwrap_or("?");
        let qualname = self.qualname(id).unwrap_or(name);
        match &obj.body {
            Body::Module(info) => {
                if info.builtin {
                    format!("<module '{}' (built-in)>", name)
                } else if let Some(file) = &info.file {
                    format!("<module '{}' from '{}'>", name, file.display())
                } else {
                    format!("<module '{}'>", name)
                }
            }
            Body::Class(_) => match obj.module.as_deref() {
                Some(module) if module != builtins::MODULE => format!("<class '{}.{}'>", module, qualname),
                _ => format!("<class '{}'>", qualname),
            },
            Body::Routine(info) => match info.kind {
                RoutineKind::Function => format!("<function {}>", qualname),
                RoutineKind::BoundMethod => {
                    let receiver = info.receiver.map(|r| self.repr(r)).unwrap_or_default();
                    format!("<bound method {} of {}>", qualname, receiver)
                }
                RoutineKind::Builtin => format!("<built-in function {}>", name),
                RoutineKind::MethodDescriptor => {
                    let owner = info.owner.and_then(|o| self.name(o)).unwrap_or("object");
                    format!("<method '{}' of '{}' objects>", name, owner)
                }
            },
            Body::StaticMethod(function) => format!("<staticmethod({})>", self.repr(*function)),
            Body::ClassMethod(function) => format!("<classmethod({})>", self.repr(*function)),
            Body::Property(_) => "<property object>".to_string(),
            Body::Descriptor(info) => {
                let owner = info.owner.and_then(|o| self.name(o)).unwrap_or("object");
                match info.kind {
                    DescriptorKind::Member => format!("<member '{}' of '{}' objects>", name, owner),
                    DescriptorKind::GetSet => format!("<attribute '{}' of '{}' objects>", name, owner),
                    DescriptorKind::Custom => {
                        let type_name = self.name(self.type_of(id)).unwrap_or("object");
                        format!("<{} object>", type_name)
                    }
                }
            }
            Body::Data { repr } => repr.clone(),
        }
    }

    fn root_type(&self) -> ObjectId {
        self.object
    }

    fn type_type(&self) -> ObjectId {
        self.type_
    }

    fn builtins(&self) -> ObjectId {
        self.builtins
    }

    fn module_named(&self, name: &str) -> Option<ObjectId> {
        self.registry.get(name).or_else(|| self.modules.get(name)).copied()
    }
}

impl ModuleSystem for Interpreter {
    fn loaded(&self, name: &str) -> Option<ObjectId> {
        self.registry.get(name).copied()
    }

    fn loaded_names(&self) -> Vec<String> {
        self.registry.keys().cloned().collect()
    }

    fn import(&mut self, path: &str) -> Result<ObjectId, ImportFailure> {
        let parts: Vec<&str> = path.split('.').collect();
        let mut current: Option<ObjectId> = None;

        for i in 0..parts.len() {
            let prefix = parts[..=i].join(".");
            if let Some(&id) = self.registry.get(&prefix) {
                current = Some(id);
                continue;
            }
            if let Some(failure) = self.failures.get(&prefix) {
                return Err(failure.clone());
            }
            let Some(&id) = self.modules.get(&prefix) else {
                return Err(ImportFailure::NotFound { name: prefix });
            };

            debug!(module = %prefix, "importing");
            self.registry.insert(prefix, id);
            if let Some(parent) = current {
                self.set_attr(parent, parts[i], id);
            }
            current = Some(id);
        }

        current.ok_or_else(|| ImportFailure::NotFound {
            name: path.to_string(),
        })
    }

    fn evict(&mut self, name: &str) -> Option<ObjectId> {
        self.registry.shift_remove(name)
    }

    fn is_builtin_module(&self, name: &str) -> bool {
        self.module_named(name)
            .and_then(|id| self.module_info(id))
            .is_some_and(|info| info.builtin)
    }

    fn import_failure(&self, name: &str) -> Option<&ImportFailure> {
        self.failures.get(name)
    }

    fn iter_modules(&self, prefix: &str) -> Vec<String> {
        let below = format!("{}.", prefix);
        let mut names: Vec<String> = self
            .modules
            .keys()
            .chain(self.failures.keys())
            .filter(|name| prefix.is_empty() || name.starts_with(&below))
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(interp: &mut Interpreter, name: &str) -> ObjectId {
        let id = interp.alloc(Object::new(Body::Module(ModuleInfo::default())).named(name));
        interp.add_module(name, id);
        id
    }

    fn class(interp: &mut Interpreter, name: &str, module: &str, bases: Vec<ObjectId>) -> ObjectId {
        let id = interp.alloc(Object::new(Body::Class(ClassInfo::default())).named(name).in_module(module));
        interp.set_bases(id, bases);
        id
    }

    #[test]
    fn test_bootstrap_has_core_types() {
        let interp = Interpreter::new();
        let object = interp.root_type();
        let type_ = interp.type_type();
        assert_eq!(interp.name(object), Some("object"));
        assert_eq!(interp.name(type_), Some("type"));
        assert_eq!(interp.type_of(object), type_);
        assert_eq!(interp.ancestry(object), vec![object]);
        assert!(interp.builtin_type("property").is_some());
        assert_eq!(interp.loaded(builtins::MODULE), Some(interp.builtins()));
    }

    #[test]
    fn test_alloc_fills_type() {
        let mut interp = Interpreter::new();
        let f = interp.alloc(Object::new(Body::Routine(RoutineInfo {
            kind: RoutineKind::Function,
            signature: None,
            is_async: false,
            receiver: None,
            function: None,
            owner: None,
        })));
        assert_eq!(Some(interp.type_of(f)), interp.builtin_type("function"));
    }

    #[test]
    fn test_data_doc_falls_back_to_type() {
        let mut interp = Interpreter::new();
        let int = interp.builtin_type("int").unwrap();
        let value = interp.alloc(Object::new(Body::Data { repr: "3".to_string() }).with_type(int));
        assert_eq!(interp.doc_slot(value), interp.doc_slot(int));
    }

    #[test]
    fn test_get_attr_walks_mro() {
        let mut interp = Interpreter::new();
        let object = interp.root_type();
        let base = class(&mut interp, "Base", "m", vec![object]);
        let child = class(&mut interp, "Child", "m", vec![base]);
        let value = interp.alloc(Object::new(Body::Data { repr: "1".to_string() }));
        interp.set_attr(base, "x", value);

        assert_eq!(interp.get_attr(child, "x"), Ok(Some(value)));
        assert_eq!(interp.get_attr(child, "missing"), Ok(None));
        assert!(interp.get_attr(child, "__init__").unwrap().is_some());
    }

    #[test]
    fn test_get_attr_unwraps_static_and_reports_failures() {
        let mut interp = Interpreter::new();
        let object = interp.root_type();
        let cls = class(&mut interp, "C", "m", vec![object]);
        let function = interp.alloc(Object::new(Body::Routine(RoutineInfo {
            kind: RoutineKind::Function,
            signature: None,
            is_async: false,
            receiver: None,
            function: None,
            owner: None,
        })));
        let wrapper = interp.alloc(Object::new(Body::StaticMethod(function)));
        let broken = interp.alloc(Object::new(Body::Descriptor(DescriptorInfo {
            kind: DescriptorKind::Custom,
            owner: Some(cls),
            get_error: Some("RuntimeError".to_string()),
            get_only: false,
        })));
        interp.set_attr(cls, "s", wrapper);
        interp.set_attr(cls, "broken", broken);

        assert_eq!(interp.get_attr(cls, "s"), Ok(Some(function)));
        let err = interp.get_attr(cls, "broken").unwrap_err();
        assert_eq!(err.name, "broken");
    }

    #[test]
    fn test_import_registers_prefixes() {
        let mut interp = Interpreter::new();
        let pkg = module(&mut interp, "pkg");
        let sub = module(&mut interp, "pkg.sub");

        assert_eq!(interp.loaded("pkg"), None);
        assert_eq!(interp.import("pkg.sub"), Ok(sub));
        assert_eq!(interp.loaded("pkg"), Some(pkg));
        assert_eq!(interp.loaded("pkg.sub"), Some(sub));
        assert_eq!(interp.get_attr(pkg, "sub"), Ok(Some(sub)));
    }

    #[test]
    fn test_import_missing_and_failing() {
        let mut interp = Interpreter::new();
        module(&mut interp, "pkg");
        interp.set_import_failure(
            "pkg.bad",
            ImportFailure::Execution {
                filename: None,
                message: "ValueError".to_string(),
            },
        );

        assert_eq!(
            interp.import("nope"),
            Err(ImportFailure::NotFound { name: "nope".to_string() })
        );
        assert_eq!(
            interp.import("pkg.nope"),
            Err(ImportFailure::NotFound { name: "pkg.nope".to_string() })
        );
        assert!(matches!(interp.import("pkg.bad"), Err(ImportFailure::Execution { .. })));
    }

    #[test]
    fn test_evict_and_iter_modules() {
        let mut interp = Interpreter::new();
        module(&mut interp, "pkg");
        module(&mut interp, "pkg.b");
        module(&mut interp, "pkg.a");
        module(&mut interp, "pkgx");
        interp.import("pkg").unwrap();

        assert_eq!(interp.iter_modules("pkg"), vec!["pkg.a".to_string(), "pkg.b".to_string()]);
        let all = interp.iter_modules("");
        assert!(all.contains(&"pkgx".to_string()) && all.contains(&"pkg.a".to_string()));
        assert!(interp.evict("pkg").is_some());
        assert_eq!(interp.loaded("pkg"), None);
        assert!(interp.evict("pkg").is_none());
    }

    #[test]
    fn test_builtin_module_check() {
        let interp = Interpreter::new();
        assert!(interp.is_builtin_module("builtins"));
        assert!(!interp.is_builtin_module("nope"));
    }

    #[test]
    fn test_repr_forms() {
        let mut interp = Interpreter::new();
        let object = interp.root_type();
        let m = module(&mut interp, "shapes");
        let cls = class(&mut interp, "Circle", "shapes", vec![object]);
        assert_eq!(interp.repr(m), "<module 'shapes'>");
        assert_eq!(interp.repr(cls), "<class 'shapes.Circle'>");
        assert_eq!(interp.repr(object), "<class 'object'>");
        assert_eq!(interp.repr(interp.builtins()), "<module 'builtins' (built-in)>");
    }
}
