//! Access-flag bitmasks for classes, fields and methods.
//!
//! Unknown bits are retained verbatim so that rewritten classes round-trip flags this
//! library does not interpret.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Class-level access and property flags
    pub struct ClassAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared final
        const FINAL = 0x0010;
        /// Treat superclass methods specially on invokespecial
        const SUPER = 0x0020;
        /// Is an interface
        const INTERFACE = 0x0200;
        /// Declared abstract
        const ABSTRACT = 0x0400;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an enum class
        const ENUM = 0x4000;
        /// Is a module descriptor, not a class
        const MODULE = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Field access and property flags
    pub struct FieldAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final
        const FINAL = 0x0010;
        /// Declared volatile
        const VOLATILE = 0x0040;
        /// Declared transient
        const TRANSIENT = 0x0080;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an enum constant
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method access and property flags
    pub struct MethodAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final
        const FINAL = 0x0010;
        /// Declared synchronized
        const SYNCHRONIZED = 0x0020;
        /// Compiler-generated bridge method
        const BRIDGE = 0x0040;
        /// Declared with a variable arity
        const VARARGS = 0x0080;
        /// Implemented in a language other than Java
        const NATIVE = 0x0100;
        /// Declared abstract, no implementation provided
        const ABSTRACT = 0x0400;
        /// Declared strictfp
        const STRICT = 0x0800;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
    }
}
