// Object model of the host runtime
//
// Every documentable value lives in an arena owned by the interpreter and
// is addressed by an `ObjectId` handle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Opaque handle to a live object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

/// Coarse runtime kind of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Module,
    Class,
    Routine,
    /// Raw static-method wrapper as stored in a class namespace
    StaticMethod,
    /// Raw class-method wrapper as stored in a class namespace
    ClassMethod,
    Property,
    DataDescriptor,
    /// Descriptor with a getter only, documented like a method
    MethodDescriptor,
    Data,
}

impl ObjectKind {
    /// Anything callable that documents as a routine
    pub fn is_routine(self) -> bool {
        matches!(
            self,
            ObjectKind::Routine
                | ObjectKind::StaticMethod
                | ObjectKind::ClassMethod
                | ObjectKind::MethodDescriptor
        )
    }

    /// Properties and other data descriptors
    pub fn is_data_descriptor(self) -> bool {
        matches!(self, ObjectKind::Property | ObjectKind::DataDescriptor)
    }
}

/// Where an object was defined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line of the definition
    pub line: usize,
}

/// A failure raised while reading an attribute (a descriptor failing on access)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot read attribute {name}: {message}")]
pub struct AccessError {
    pub name: String,
    pub message: String,
}

/// Kinds of routines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    /// Plain function defined in source
    Function,
    /// Function bound to a receiver
    BoundMethod,
    /// Natively implemented function, optionally bound to a receiver
    Builtin,
    /// Natively implemented method stored on a class
    MethodDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutineInfo {
    pub kind: RoutineKind,
    pub signature: Option<String>,
    pub is_async: bool,
    /// `__self__` of bound methods and builtins
    pub receiver: Option<ObjectId>,
    /// `__func__` of bound methods
    pub function: Option<ObjectId>,
    /// `__objclass__` of method descriptors
    pub owner: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub getter: Option<ObjectId>,
    pub setter: Option<ObjectId>,
}

/// Kinds of data descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Slot member descriptor
    Member,
    /// Native get/set descriptor
    GetSet,
    /// User-defined descriptor
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorInfo {
    pub kind: DescriptorKind,
    /// `__objclass__`, the class that declares the descriptor
    pub owner: Option<ObjectId>,
    /// Failure raised when the descriptor is read through its class
    pub get_error: Option<String>,
    /// Defines no setter (a non-data descriptor)
    pub get_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleInfo {
    pub file: Option<PathBuf>,
    /// `__all__`
    pub exports: Option<Vec<String>>,
    /// Has a package search path
    pub package: bool,
    /// Names of direct submodules of a package
    pub submodules: Vec<String>,
    pub builtin: bool,
    /// Shipped with the language's standard library
    pub stdlib: bool,
    pub version: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub credits: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassInfo {
    pub bases: Vec<ObjectId>,
    /// Linearized ancestry, the class itself first
    pub mro: Vec<ObjectId>,
    /// Named-fields marker of record-like classes
    pub fields: Option<Vec<String>>,
    /// Slot name -> documentation
    pub slots: Option<IndexMap<String, String>>,
    pub signature: Option<String>,
    /// Set when the class refuses member enumeration
    pub enumeration_error: Option<String>,
}

/// Kind-specific payload of an object
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Module(ModuleInfo),
    Class(ClassInfo),
    Routine(RoutineInfo),
    StaticMethod(ObjectId),
    ClassMethod(ObjectId),
    Property(PropertyInfo),
    Descriptor(DescriptorInfo),
    Data { repr: String },
}

/// A live object
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Declared `__name__`
    pub name: Option<String>,
    pub qualname: Option<String>,
    /// Name of the defining module
    pub module: Option<String>,
    /// Docstring stored on the object itself
    pub doc: Option<String>,
    /// Runtime type, filled in by the interpreter when absent
    pub type_of: Option<ObjectId>,
    /// Own namespace, in definition order
    pub attrs: IndexMap<String, ObjectId>,
    pub source: Option<SourceLocation>,
    pub body: Body,
}

impl Object {
    pub fn new(body: Body) -> Self {
        Self {
            name: None,
            qualname: None,
            module: None,
            doc: None,
            type_of: None,
            attrs: IndexMap::new(),
            source: None,
            body,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.qualname = Some(name.clone());
        self.name = Some(name);
        self
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_type(mut self, type_of: ObjectId) -> Self {
        self.type_of = Some(type_of);
        self
    }

    pub fn kind(&self) -> ObjectKind {
        match &self.body {
            Body::Module(_) => ObjectKind::Module,
            Body::Class(_) => ObjectKind::Class,
            Body::Routine(_) => ObjectKind::Routine,
            Body::StaticMethod(_) => ObjectKind::StaticMethod,
            Body::ClassMethod(_) => ObjectKind::ClassMethod,
            Body::Property(_) => ObjectKind::Property,
            Body::Descriptor(info) if info.get_only => ObjectKind::MethodDescriptor,
            Body::Descriptor(_) => ObjectKind::DataDescriptor,
            Body::Data { .. } => ObjectKind::Data,
        }
    }
}
