//! The structured in-memory representation of one class.
//!
//! A [`ClassModel`] is the decoded form of a single `.class` entry: header data,
//! class-level attributes, fields and methods. Models are immutable snapshots:
//! the repository caches them behind [`std::sync::Arc`] and the rewriter builds a
//! *new* model per kept class rather than mutating a cached one, so repeated
//! reachability queries always observe the original bytes.
//!
//! Original method bodies are not retained as instructions. The shaker never
//! re-emits an original body (every retained concrete method gets a synthesized
//! stub), so at decode time a body is summarized to the symbolic references its
//! instructions make ([`CodeRef`]), which is exactly what reachability analysis
//! consumes.

use crate::classfile::{
    access::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    annotations::{Annotation, ElementValue, TypeAnnotation},
    descriptor::ReturnCategory,
};
use crate::Result;

/// Name of the class attribute carrying the structured declaration metadata blob.
///
/// The blob describes source-level declarations (functions, properties with their
/// accessor/backing-field triples, constructors) at a finer grain than bytecode
/// signatures; see [`crate::shake::DeclarationTable`] for the decoded shape.
pub const DECLARATIONS_ATTRIBUTE: &str = "jarshake.Declarations";

/// A symbolic reference extracted from a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeRef {
    /// A class reference (`new`, `checkcast`, `instanceof`, `anewarray`,
    /// `multianewarray`, a `Class` constant load, or a catch type). May be an
    /// array descriptor rather than a plain internal name.
    Class(String),
    /// A field access: owner, name, descriptor
    Field(String, String, String),
    /// A method call (including via `MethodHandle` constants): owner, name, descriptor
    Method(String, String, String),
    /// A `MethodType` constant load: the method descriptor
    MethodType(String),
}

/// The body of a method, when present.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    /// An original body, summarized to the references its instructions make.
    Original {
        /// Symbolic references found in the instruction stream and exception table
        refs: Vec<CodeRef>,
    },
    /// A synthesized straight-line replacement body.
    Stub(StubBody),
}

/// A synthesized minimal-but-legal method body.
///
/// Stubs are straight-line instruction sequences with no branch targets, so they
/// need no stack-map frames; `max_stack`/`max_locals` are derived from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum StubBody {
    /// `aload_0; invokespecial <super>.<init>()V; return`
    SuperConstructor {
        /// Internal name of the immediate superclass
        super_name: String,
        /// Local-variable slots occupied by the constructor's own parameters
        argument_slots: u16,
    },
    /// Push the zero/default value of the return category and return it.
    DefaultReturn {
        /// Return category of the method's descriptor
        category: ReturnCategory,
        /// Total local-variable slots (receiver plus parameters)
        local_slots: u16,
    },
}

/// One entry of the inner-class relationship table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    /// Internal name of the inner class
    pub inner: String,
    /// Internal name of the enclosing class, if the relation records one
    pub outer: Option<String>,
    /// Simple source name of the inner class, absent for anonymous classes
    pub inner_name: Option<String>,
    /// Access flags of the inner class as declared in source
    pub access: u16,
}

/// One record component of a record class.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    /// Component name
    pub name: String,
    /// Field descriptor of the component type
    pub descriptor: String,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// Runtime-visible annotations
    pub visible_annotations: Vec<Annotation>,
    /// Runtime-invisible annotations
    pub invisible_annotations: Vec<Annotation>,
    /// Runtime-visible type annotations
    pub visible_type_annotations: Vec<TypeAnnotation>,
    /// Runtime-invisible type annotations
    pub invisible_type_annotations: Vec<TypeAnnotation>,
}

/// A decoded field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    /// Access flags
    pub access: FieldAccessFlags,
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// Runtime-visible annotations
    pub visible_annotations: Vec<Annotation>,
    /// Runtime-invisible annotations
    pub invisible_annotations: Vec<Annotation>,
    /// Runtime-visible type annotations
    pub visible_type_annotations: Vec<TypeAnnotation>,
    /// Runtime-invisible type annotations
    pub invisible_type_annotations: Vec<TypeAnnotation>,
    /// Carries a `Deprecated` attribute
    pub deprecated: bool,
}

/// A decoded method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodModel {
    /// Access flags
    pub access: MethodAccessFlags,
    /// Method name (`<init>` for constructors, `<clinit>` for initializers)
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// Declared thrown exception classes (internal names)
    pub exceptions: Vec<String>,
    /// Runtime-visible annotations
    pub visible_annotations: Vec<Annotation>,
    /// Runtime-invisible annotations
    pub invisible_annotations: Vec<Annotation>,
    /// Runtime-visible per-parameter annotations, one list per parameter
    pub visible_parameter_annotations: Vec<Vec<Annotation>>,
    /// Runtime-invisible per-parameter annotations, one list per parameter
    pub invisible_parameter_annotations: Vec<Vec<Annotation>>,
    /// Runtime-visible type annotations
    pub visible_type_annotations: Vec<TypeAnnotation>,
    /// Runtime-invisible type annotations
    pub invisible_type_annotations: Vec<TypeAnnotation>,
    /// Default value for an annotation-interface element
    pub annotation_default: Option<ElementValue>,
    /// The method body, absent for abstract and native methods
    pub body: Option<MethodBody>,
    /// Carries a `Deprecated` attribute
    pub deprecated: bool,
}

impl MethodModel {
    /// Returns `true` for constructors.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    /// Returns `true` if the method is declared abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access.contains(MethodAccessFlags::ABSTRACT)
    }

    /// Returns `true` if the method is declared native.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.access.contains(MethodAccessFlags::NATIVE)
    }

    /// Returns `true` if the method is declared static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access.contains(MethodAccessFlags::STATIC)
    }
}

/// The structured decode of one class's bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassModel {
    /// Class-file minor version
    pub minor_version: u16,
    /// Class-file major version
    pub major_version: u16,
    /// Access flags
    pub access: ClassAccessFlags,
    /// This class's internal name
    pub name: String,
    /// Superclass internal name; absent only for `java/lang/Object` and modules
    pub super_name: Option<String>,
    /// Implemented interface internal names
    pub interfaces: Vec<String>,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// Source file name, if recorded
    pub source_file: Option<String>,
    /// `SourceDebugExtension` payload, if recorded
    pub source_debug: Option<Vec<u8>>,
    /// Immediately enclosing class, for local and anonymous classes
    pub enclosing_class: Option<String>,
    /// Exact enclosing method `(name, descriptor)` within the enclosing class
    pub enclosing_method: Option<(String, String)>,
    /// Nest host, if this class is a nest member
    pub nest_host: Option<String>,
    /// Nest members, if this class is a nest host
    pub nest_members: Vec<String>,
    /// Permitted direct subclasses, for sealed classes
    pub permitted_subclasses: Vec<String>,
    /// Record components; `Some` iff the class carries a `Record` attribute
    pub record_components: Option<Vec<RecordComponent>>,
    /// Runtime-visible annotations
    pub visible_annotations: Vec<Annotation>,
    /// Runtime-invisible annotations
    pub invisible_annotations: Vec<Annotation>,
    /// Runtime-visible type annotations
    pub visible_type_annotations: Vec<TypeAnnotation>,
    /// Runtime-invisible type annotations
    pub invisible_type_annotations: Vec<TypeAnnotation>,
    /// The inner-class relationship table
    pub inner_classes: Vec<InnerClass>,
    /// Raw payload of the declaration-metadata attribute, if present
    pub declarations: Option<Vec<u8>>,
    /// Carries a `Deprecated` attribute
    pub deprecated: bool,
    /// Declared fields
    pub fields: Vec<FieldModel>,
    /// Declared methods
    pub methods: Vec<MethodModel>,
}

impl ClassModel {
    /// Decode a class from its raw bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a structurally valid class file of a
    /// supported version.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        crate::classfile::reader::read_class(data)
    }

    /// Encode the model into class-file bytes with a freshly built constant pool.
    ///
    /// Methods whose body is [`MethodBody::Original`] are emitted without a `Code`
    /// attribute: original instruction streams are never carried across a rewrite.
    ///
    /// # Errors
    /// Returns an error if the constant pool outgrows the format's index space.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::classfile::writer::write_class(self)
    }

    /// Returns `true` if this class is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.contains(ClassAccessFlags::INTERFACE)
    }

    /// Returns `true` if this class is declared abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access.contains(ClassAccessFlags::ABSTRACT)
    }
}
