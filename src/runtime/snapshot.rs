// Object graph snapshots
//
// A snapshot is a JSON dump of the modules of a live interpreter: their
// members, docstrings, signatures, class hierarchies and import failures.
// Loading one produces an `Interpreter` the documentation engine can
// reflect on.

use super::builtins;
use super::interpreter::Interpreter;
use super::object::*;
use super::{ImportFailure, Reflect};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Root of a snapshot document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModuleSpec {
    pub name: String,
    pub doc: Option<String>,
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
    pub exports: Option<Vec<String>>,
    pub package: bool,
    pub submodules: Vec<String>,
    pub builtin: bool,
    pub stdlib: bool,
    pub version: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub credits: Option<String>,
    pub import_error: Option<ImportErrorSpec>,
    pub members: IndexMap<String, MemberSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportErrorSpec {
    Syntax {
        message: String,
        #[serde(default)]
        filename: Option<PathBuf>,
    },
    Execution {
        message: String,
    },
    MissingDependency {
        name: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberSpec {
    Class(ClassSpec),
    Function(RoutineSpec),
    Builtin(RoutineSpec),
    StaticMethod(RoutineSpec),
    ClassMethod(RoutineSpec),
    BoundMethod(BoundMethodSpec),
    Property(PropertySpec),
    Descriptor(DescriptorSpec),
    Data(DataSpec),
    Ref(RefSpec),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassSpec {
    pub name: Option<String>,
    pub doc: Option<String>,
    pub line: Option<usize>,
    pub bases: Vec<String>,
    pub fields: Option<Vec<String>>,
    pub slots: Option<IndexMap<String, String>>,
    pub signature: Option<String>,
    pub enumeration_error: Option<String>,
    pub members: IndexMap<String, MemberSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoutineSpec {
    pub name: Option<String>,
    pub doc: Option<String>,
    pub line: Option<usize>,
    pub signature: Option<String>,
    pub is_async: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundMethodSpec {
    pub function: String,
    pub receiver: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertySpec {
    pub doc: Option<String>,
    pub line: Option<usize>,
    pub setter: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorFlavor {
    Member,
    Getset,
    #[default]
    Custom,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DescriptorSpec {
    pub doc: Option<String>,
    pub flavor: DescriptorFlavor,
    pub get_error: Option<String>,
    /// Custom descriptor without `__set__`
    pub get_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataSpec {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub repr: String,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefSpec {
    pub target: String,
}

/// Links that can only be resolved once every module exists
enum Pending {
    Ref { owner: ObjectId, name: String, target: String },
    Bases { class: ObjectId, targets: Vec<String> },
    DataType { value: ObjectId, target: String },
    Bound { method: ObjectId, function: String, receiver: String },
}

/// Where a member is being defined
struct Scope<'a> {
    module: &'a str,
    file: Option<&'a PathBuf>,
    qualprefix: Option<String>,
    owner: ObjectId,
    owner_is_class: bool,
}

impl<'a> Scope<'a> {
    fn qualify(&self, name: &str) -> String {
        match &self.qualprefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.to_string(),
        }
    }

    fn location(&self, line: Option<usize>) -> Option<SourceLocation> {
        match (self.file, line) {
            (Some(file), Some(line)) => Some(SourceLocation {
                file: file.clone(),
                line,
            }),
            _ => None,
        }
    }
}

impl Snapshot {
    /// Parse a snapshot document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge the modules of another snapshot into this one
    pub fn merge(&mut self, other: Snapshot) {
        self.modules.extend(other.modules);
    }

    /// Build an interpreter holding every module of the snapshot.
    ///
    /// `origin` only labels errors.
    pub fn build(&self, origin: &Path) -> Result<Interpreter> {
        let mut interp = Interpreter::new();
        let mut pending = Vec::new();
        let mut seen = HashSet::new();

        for spec in &self.modules {
            if spec.name.is_empty() {
                return Err(Error::snapshot(origin, "module without a name"));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(Error::snapshot(origin, format!("duplicate module {}", spec.name)));
            }
            build_module(&mut interp, spec, &mut pending);
        }

        resolve_pending(&mut interp, pending, origin)?;
        debug!(objects = interp.len(), modules = self.modules.len(), "snapshot loaded");
        Ok(interp)
    }
}

/// Load a snapshot file, or every `*.json` snapshot below a directory
pub fn load_snapshot(path: &Path) -> Result<Interpreter> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return load_snapshot_dir(path);
    }
    let contents = std::fs::read_to_string(path)?;
    let snapshot = Snapshot::from_json(&contents).map_err(|e| Error::snapshot(path, e.to_string()))?;
    snapshot.build(path)
}

/// Load and merge every `*.json` snapshot below `dir`, in path order
pub fn load_snapshot_dir(dir: &Path) -> Result<Interpreter> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();

    let mut merged = Snapshot::default();
    for file in &files {
        let contents = std::fs::read_to_string(file)?;
        let snapshot = Snapshot::from_json(&contents).map_err(|e| Error::snapshot(file, e.to_string()))?;
        merged.merge(snapshot);
    }
    merged.build(dir)
}

fn build_module(interp: &mut Interpreter, spec: &ModuleSpec, pending: &mut Vec<Pending>) {
    let info = ModuleInfo {
        file: spec.file.clone(),
        exports: spec.exports.clone(),
        package: spec.package,
        submodules: spec.submodules.clone(),
        builtin: spec.builtin,
        stdlib: spec.stdlib,
        version: spec.version.clone(),
        date: spec.date.clone(),
        author: spec.author.clone(),
        credits: spec.credits.clone(),
    };
    let mut object = Object::new(Body::Module(info)).named(spec.name.clone());
    object.doc = spec.doc.clone();
    object.source = spec
        .file
        .as_ref()
        .map(|file| SourceLocation {
            file: file.clone(),
            line: spec.line.unwrap_or(1),
        });
    let module = interp.alloc(object);
    interp.add_module(&spec.name, module);

    if let Some(error) = &spec.import_error {
        let failure = match error {
            ImportErrorSpec::Syntax { message, filename } => ImportFailure::Syntax {
                filename: filename.clone().or_else(|| spec.file.clone()),
                message: message.clone(),
            },
            ImportErrorSpec::Execution { message } => ImportFailure::Execution {
                filename: spec.file.clone(),
                message: message.clone(),
            },
            ImportErrorSpec::MissingDependency { name } => ImportFailure::NotFound { name: name.clone() },
        };
        interp.set_import_failure(&spec.name, failure);
    }

    let scope = Scope {
        module: &spec.name,
        file: spec.file.as_ref(),
        qualprefix: None,
        owner: module,
        owner_is_class: false,
    };
    for (name, member) in &spec.members {
        build_member(interp, &scope, name, member, pending);
    }
}

fn routine(
    interp: &mut Interpreter,
    scope: &Scope<'_>,
    name: &str,
    spec: &RoutineSpec,
    kind: RoutineKind,
) -> ObjectId {
    let declared = spec.name.clone().unwrap_or_else(|| name.to_string());
    let (receiver, owner) = match kind {
        RoutineKind::Builtin => (Some(scope.owner), None),
        RoutineKind::MethodDescriptor => (None, Some(scope.owner)),
        _ => (None, None),
    };
    let mut object = Object::new(Body::Routine(RoutineInfo {
        kind,
        signature: spec.signature.clone(),
        is_async: spec.is_async,
        receiver,
        function: None,
        owner,
    }))
    .named(declared.clone())
    .in_module(scope.module);
    object.qualname = Some(scope.qualify(&declared));
    object.doc = spec.doc.clone();
    object.source = scope.location(spec.line);
    interp.alloc(object)
}

fn build_member(interp: &mut Interpreter, scope: &Scope<'_>, name: &str, spec: &MemberSpec, pending: &mut Vec<Pending>) {
    let value = match spec {
        MemberSpec::Ref(reference) => {
            pending.push(Pending::Ref {
                owner: scope.owner,
                name: name.to_string(),
                target: reference.target.clone(),
            });
            return;
        }
        MemberSpec::Class(class) => build_class(interp, scope, name, class, pending),
        MemberSpec::Function(spec) => routine(interp, scope, name, spec, RoutineKind::Function),
        MemberSpec::Builtin(spec) => {
            let kind = if scope.owner_is_class {
                RoutineKind::MethodDescriptor
            } else {
                RoutineKind::Builtin
            };
            routine(interp, scope, name, spec, kind)
        }
        MemberSpec::StaticMethod(spec) => {
            let function = routine(interp, scope, name, spec, RoutineKind::Function);
            interp.alloc(Object::new(Body::StaticMethod(function)))
        }
        MemberSpec::ClassMethod(spec) => {
            let function = routine(interp, scope, name, spec, RoutineKind::Function);
            interp.alloc(Object::new(Body::ClassMethod(function)))
        }
        MemberSpec::BoundMethod(spec) => {
            let method = interp.alloc(
                Object::new(Body::Routine(RoutineInfo {
                    kind: RoutineKind::BoundMethod,
                    signature: None,
                    is_async: false,
                    receiver: None,
                    function: None,
                    owner: None,
                }))
                .named(name),
            );
            pending.push(Pending::Bound {
                method,
                function: spec.function.clone(),
                receiver: spec.receiver.clone(),
            });
            method
        }
        MemberSpec::Property(spec) => {
            let getter_spec = RoutineSpec {
                doc: spec.doc.clone(),
                line: spec.line,
                ..RoutineSpec::default()
            };
            let getter = routine(interp, scope, name, &getter_spec, RoutineKind::Function);
            let setter = spec.setter.then(|| {
                let setter_spec = RoutineSpec {
                    line: spec.line,
                    ..RoutineSpec::default()
                };
                routine(interp, scope, name, &setter_spec, RoutineKind::Function)
            });
            let mut object = Object::new(Body::Property(PropertyInfo {
                getter: Some(getter),
                setter,
            }));
            // A property takes its docstring from the getter
            object.doc = spec.doc.clone();
            interp.alloc(object)
        }
        MemberSpec::Descriptor(spec) => {
            let kind = match spec.flavor {
                DescriptorFlavor::Member => DescriptorKind::Member,
                DescriptorFlavor::Getset => DescriptorKind::GetSet,
                DescriptorFlavor::Custom => DescriptorKind::Custom,
            };
            let mut object = Object::new(Body::Descriptor(DescriptorInfo {
                kind,
                owner: scope.owner_is_class.then_some(scope.owner),
                get_error: spec.get_error.clone(),
                get_only: spec.get_only && kind == DescriptorKind::Custom,
            }))
            .named(name)
            .in_module(scope.module);
            object.qualname = Some(scope.qualify(name));
            object.doc = spec.doc.clone();
            interp.alloc(object)
        }
        MemberSpec::Data(spec) => {
            let mut object = Object::new(Body::Data { repr: spec.repr.clone() });
            object.doc = spec.doc.clone();
            let value = interp.alloc(object);
            if let Some(type_name) = &spec.type_name {
                pending.push(Pending::DataType {
                    value,
                    target: type_name.clone(),
                });
            }
            value
        }
    };
    interp.set_attr(scope.owner, name, value);
}

fn build_class(
    interp: &mut Interpreter,
    scope: &Scope<'_>,
    name: &str,
    spec: &ClassSpec,
    pending: &mut Vec<Pending>,
) -> ObjectId {
    let declared = spec.name.clone().unwrap_or_else(|| name.to_string());
    let qualname = scope.qualify(&declared);
    let mut object = Object::new(Body::Class(ClassInfo {
        bases: Vec::new(),
        mro: Vec::new(),
        fields: spec.fields.clone(),
        slots: spec.slots.clone(),
        signature: spec.signature.clone(),
        enumeration_error: spec.enumeration_error.clone(),
    }))
    .named(declared)
    .in_module(scope.module);
    object.qualname = Some(qualname.clone());
    object.doc = spec.doc.clone();
    object.source = scope.location(spec.line);
    let class = interp.alloc(object);

    let targets = if spec.bases.is_empty() {
        vec![format!("{}.object", builtins::MODULE)]
    } else {
        spec.bases.clone()
    };
    pending.push(Pending::Bases { class, targets });

    let inner = Scope {
        module: scope.module,
        file: scope.file,
        qualprefix: Some(qualname),
        owner: class,
        owner_is_class: true,
    };
    for (member_name, member) in &spec.members {
        build_member(interp, &inner, member_name, member, pending);
    }
    class
}

/// Find an object by dotted path: the longest module prefix, then attributes
fn lookup_path(interp: &Interpreter, path: &str) -> Option<ObjectId> {
    let parts: Vec<&str> = path.split('.').collect();
    for split in (1..=parts.len()).rev() {
        let module_name = parts[..split].join(".");
        if let Some(module) = interp.module_named(&module_name) {
            return walk_attrs(interp, module, &parts[split..]);
        }
    }
    walk_attrs(interp, interp.builtins(), &parts)
}

fn walk_attrs(interp: &Interpreter, start: ObjectId, names: &[&str]) -> Option<ObjectId> {
    let mut current = start;
    for name in names {
        current = interp.object(current).attrs.get(*name).copied()?;
    }
    Some(current)
}

fn resolve_pending(interp: &mut Interpreter, mut pending: Vec<Pending>, origin: &Path) -> Result<()> {
    // Refs may point at other refs, so resolve until no progress is made
    loop {
        let before = pending.len();
        let mut remaining = Vec::new();
        for item in pending {
            match item {
                Pending::Ref { owner, name, target } => match lookup_path(interp, &target) {
                    Some(value) => interp.set_attr(owner, &name, value),
                    None => remaining.push(Pending::Ref { owner, name, target }),
                },
                other => remaining.push(other),
            }
        }
        pending = remaining;
        let refs_left = pending.iter().filter(|p| matches!(p, Pending::Ref { .. })).count();
        if refs_left == 0 {
            break;
        }
        if pending.len() == before {
            if let Some(Pending::Ref { target, name, .. }) = pending.iter().find(|p| matches!(p, Pending::Ref { .. })) {
                return Err(Error::snapshot(origin, format!("unresolved reference {} for {}", target, name)));
            }
        }
    }

    let mut classes = Vec::new();
    for item in pending {
        match item {
            Pending::Bases { class, targets } => {
                let mut bases = Vec::with_capacity(targets.len());
                for target in &targets {
                    let base = lookup_path(interp, target)
                        .filter(|&b| interp.is_class(b))
                        .ok_or_else(|| Error::snapshot(origin, format!("unknown base class {}", target)))?;
                    bases.push(base);
                }
                if let Body::Class(info) = &mut interp.object_mut(class).body {
                    info.bases = bases;
                }
                classes.push(class);
            }
            Pending::DataType { value, target } => {
                let type_of = lookup_path(interp, &target)
                    .filter(|&t| interp.is_class(t))
                    .ok_or_else(|| Error::snapshot(origin, format!("unknown type {}", target)))?;
                interp.object_mut(value).type_of = Some(type_of);
            }
            Pending::Bound {
                method,
                function,
                receiver,
            } => {
                let function_id = lookup_path(interp, &function)
                    .map(|f| interp.unwrap_method(f).unwrap_or(f))
                    .ok_or_else(|| Error::snapshot(origin, format!("unknown function {}", function)))?;
                let receiver_id = lookup_path(interp, &receiver)
                    .ok_or_else(|| Error::snapshot(origin, format!("unknown receiver {}", receiver)))?;
                let source = interp.object(function_id).clone();
                let obj = interp.object_mut(method);
                obj.qualname = source.qualname;
                obj.module = source.module;
                obj.doc = source.doc;
                obj.source = source.source;
                if let Some(declared) = source.name {
                    obj.name = Some(declared);
                }
                let signature = match &source.body {
                    Body::Routine(info) => info.signature.clone(),
                    _ => None,
                };
                if let Body::Routine(info) = &mut obj.body {
                    info.function = Some(function_id);
                    info.receiver = Some(receiver_id);
                    info.signature = signature;
                }
            }
            Pending::Ref { .. } => {}
        }
    }

    finalize_classes(interp, &classes, origin)
}

/// Compute ancestry for every class, bases first
fn finalize_classes(interp: &mut Interpreter, classes: &[ObjectId], origin: &Path) -> Result<()> {
    let mut done: HashSet<ObjectId> = HashSet::new();
    let mut visiting: HashSet<ObjectId> = HashSet::new();

    fn visit(
        interp: &mut Interpreter,
        class: ObjectId,
        done: &mut HashSet<ObjectId>,
        visiting: &mut HashSet<ObjectId>,
        origin: &Path,
    ) -> Result<()> {
        if done.contains(&class) {
            return Ok(());
        }
        if !visiting.insert(class) {
            let name = interp.qualname(class).unwrap_or("?").to_string();
            return Err(Error::snapshot(origin, format!("class {} inherits from itself", name)));
        }
        for base in interp.bases(class) {
            visit(interp, base, done, visiting, origin)?;
        }
        interp.finalize_class(class);
        visiting.remove(&class);
        done.insert(class);
        Ok(())
    }

    for &class in classes {
        visit(interp, class, &mut done, &mut visiting, origin)?;
    }
    Ok(())
}
