use thiserror::Error;

use crate::thing::TypeCode;

/// Errors that can occur when working with a duplicate-key tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Allocation failed while copying a key or value into the tree. The
    /// tree is left exactly as it was before the call.
    #[error("Out of memory while copying a key or value")]
    OutOfMemory,

    /// A raw type code did not name one of the supported types.
    #[error("Unsupported type code {0:#010x}")]
    UnsupportedType(u32),

    /// A type name did not name one of the supported types.
    #[error("Unknown type name: {0}")]
    UnknownTypeName(String),

    /// A key or value did not match the type declared for the tree.
    #[error("Expected a {expected} thing but found a {found} thing")]
    TypeMismatch {
        /// The type the tree was created with.
        expected: TypeCode,
        /// The type of the thing that was supplied.
        found: TypeCode,
    },

    /// Text could not be converted into a thing of the requested type.
    #[error("Failed to parse {text:?} as {type_code}")]
    Parse {
        /// The text that was rejected.
        text: String,
        /// The type it was being parsed as.
        type_code: TypeCode,
    },

    /// The output capacity is too small to format a numeric thing.
    #[error("Buffer of {capacity} bytes is too small, need at least {needed}")]
    BufferTooSmall {
        /// Minimum capacity for the type being formatted.
        needed: usize,
        /// The capacity that was offered.
        capacity: usize,
    },

    /// The tree was destroyed before access could be granted.
    #[error("Tree access denied: the index has been destroyed")]
    AccessDenied,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
