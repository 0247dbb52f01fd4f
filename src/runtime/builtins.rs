// Bootstrap of the built-in namespace
//
// Creates the `builtins` module with the root type, the type of types, the
// runtime types of functions/descriptors/modules and a few value types,
// each carrying its generic docstring.

use super::interpreter::Interpreter;
use super::object::*;

pub(crate) const MODULE: &str = "builtins";

/// (name, docstring) of every built-in type created at bootstrap
const TYPES: &[(&str, Option<&str>)] = &[
    ("module", Some("Create a module object.\n\nThe name must be a string; the optional doc argument can have any type.")),
    ("function", Some("Create a function object.\n\n  code\n    a code object\n  globals\n    the globals dictionary\n  name\n    a string that overrides the name from the code object\n  argdefs\n    a tuple that specifies the default argument values\n  closure\n    a tuple that supplies the bindings for free variables")),
    ("method", Some("Create a bound instance method object.")),
    ("builtin_function_or_method", None),
    ("method_descriptor", None),
    ("staticmethod", Some("staticmethod(function) -> method\n\nConvert a function to be a static method.")),
    ("classmethod", Some("classmethod(function) -> method\n\nConvert a function to be a class method.")),
    ("property", Some("Property attribute.\n\n  fget\n    function to be used for getting an attribute value\n  fset\n    function to be used for setting an attribute value\n  fdel\n    function to be used for del'ing an attribute\n  doc\n    docstring")),
    ("member_descriptor", None),
    ("getset_descriptor", None),
    ("NoneType", None),
    ("bool", Some("bool(x) -> bool\n\nReturns True when the argument x is true, False otherwise.")),
    ("int", Some("int([x]) -> integer\nint(x, base=10) -> integer\n\nConvert a number or string to an integer, or return 0 if no arguments\nare given.")),
    ("float", Some("Convert a string or number to a floating point number, if possible.")),
    ("str", Some("str(object='') -> str\nstr(bytes_or_buffer[, encoding[, errors]]) -> str\n\nCreate a new string object from the given object.")),
    ("list", Some("Built-in mutable sequence.\n\nIf no argument is given, the constructor creates a new empty list.\nThe argument must be an iterable if specified.")),
    ("tuple", Some("Built-in immutable sequence.\n\nIf no argument is given, the constructor returns an empty tuple.")),
    ("dict", Some("dict() -> new empty dictionary")),
    ("set", Some("set() -> new empty set object\nset(iterable) -> new set object\n\nBuild an unordered collection of unique elements.")),
];

/// Methods every class inherits from the root type
const ROOT_METHODS: &[(&str, &str, &str)] = &[
    ("__init__", "(self, /, *args, **kwargs)", "Initialize self.  See help(type(self)) for accurate signature."),
    ("__repr__", "(self, /)", "Return repr(self)."),
    ("__str__", "(self, /)", "Return str(self)."),
    ("__eq__", "(self, value, /)", "Return self==value."),
    ("__ne__", "(self, value, /)", "Return self!=value."),
    ("__hash__", "(self, /)", "Return hash(self)."),
];

const FUNCTIONS: &[(&str, &str, &str)] = &[
    ("len", "(obj, /)", "Return the number of items in a container."),
    ("repr", "(obj, /)", "Return the canonical string representation of the object.\n\nFor many object types, including most builtins, eval(repr(obj)) == obj."),
    ("isinstance", "(obj, class_or_tuple, /)", "Return whether an object is an instance of a class or of a subclass thereof."),
];

/// Handles created by `bootstrap`
pub(crate) struct Bootstrap {
    pub builtins: ObjectId,
    pub object: ObjectId,
    pub type_: ObjectId,
}

fn class(name: &str, doc: Option<&str>) -> Object {
    let mut obj = Object::new(Body::Class(ClassInfo::default()))
        .named(name)
        .in_module(MODULE);
    obj.doc = doc.map(str::to_string);
    obj
}

pub(crate) fn bootstrap(interp: &mut Interpreter) -> Bootstrap {
    let builtins = interp.alloc_raw(
        Object::new(Body::Module(ModuleInfo {
            builtin: true,
            ..ModuleInfo::default()
        }))
        .named(MODULE)
        .with_doc("Built-in functions, exceptions, and other objects."),
    );

    let object = interp.alloc_raw(class(
        "object",
        Some("The base class of the class hierarchy.\n\nWhen called, it accepts no arguments and returns a new featureless\ninstance that has no instance attributes and cannot be given any."),
    ));
    let type_ = interp.alloc_raw(class(
        "type",
        Some("type(object) -> the object's type\ntype(name, bases, dict, **kwds) -> a new type"),
    ));
    interp.object_mut(object).type_of = Some(type_);
    interp.object_mut(type_).type_of = Some(type_);
    interp.set_attr(builtins, "object", object);
    interp.set_attr(builtins, "type", type_);

    for (name, doc) in TYPES {
        let id = interp.alloc_raw(class(name, *doc).with_type(type_));
        interp.set_attr(builtins, name, id);
    }

    interp.set_core(builtins, object, type_);
    interp.finalize_class(object);
    interp.finalize_class(type_);
    for (name, _) in TYPES {
        if let Some(id) = interp.builtin_type(name) {
            interp.set_bases(id, vec![object]);
        }
    }
    interp.set_bases(type_, vec![object]);

    for (name, signature, doc) in ROOT_METHODS {
        let method = interp.alloc(
            Object::new(Body::Routine(RoutineInfo {
                kind: RoutineKind::MethodDescriptor,
                signature: Some(signature.to_string()),
                is_async: false,
                receiver: None,
                function: None,
                owner: Some(object),
            }))
            .named(*name)
            .in_module(MODULE)
            .with_doc(*doc),
        );
        interp.object_mut(method).qualname = Some(format!("object.{}", name));
        interp.set_attr(object, name, method);
    }

    for (name, signature, doc) in FUNCTIONS {
        let function = interp.alloc(
            Object::new(Body::Routine(RoutineInfo {
                kind: RoutineKind::Builtin,
                signature: Some(signature.to_string()),
                is_async: false,
                receiver: Some(builtins),
                function: None,
                owner: None,
            }))
            .named(*name)
            .in_module(MODULE)
            .with_doc(*doc),
        );
        interp.set_attr(builtins, name, function);
    }

    Bootstrap {
        builtins,
        object,
        type_,
    }
}
