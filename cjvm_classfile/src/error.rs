//! Error handling for the `cjvm_classfile` crate.

/// Result type alias for this crate, defaulting the error to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that can occur while parsing or serializing a class file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The class file did not start with the `0xCAFEBABE` magic number.
    #[error("Invalid magic number: {0:#010x}")]
    InvalidMagicNumber(u32),
    /// The major/minor version is not one this crate understands.
    #[error("Invalid version: {major}.{minor}")]
    InvalidVersion { major: u16, minor: u16 },
    /// A constant pool entry carried an unrecognized tag byte.
    #[error("Invalid constant tag: {0}")]
    InvalidConstantTag(u8),
    /// A constant pool index was zero, out of range, or pointed at a placeholder slot.
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    /// A constant pool index pointed at an entry of the wrong tag.
    #[error("Invalid constant pool index type at {index}: expected {expected}")]
    InvalidConstantPoolIndexType { index: u16, expected: &'static str },
    /// A field or method descriptor did not conform to JVMS grammar.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
    /// A reference-kind byte used by `MethodHandle` constants was not 1..=9.
    #[error("Invalid reference kind: {0}")]
    InvalidReferenceKind(u8),
    /// Modified UTF-8 bytes could not be decoded.
    #[error("Invalid MUTF-8 data: {0}")]
    InvalidMutf8(String),
    /// An attribute's `attribute_name_index` did not resolve to a `Utf8` constant.
    #[error("Invalid attribute name index: {0}")]
    InvalidAttributeNameIndex(u16),
    /// An attribute's declared `attribute_length` did not match the bytes actually consumed.
    #[error("Invalid attribute length: expected {expected}, found {found}")]
    InvalidAttributeLength { expected: u32, found: u32 },
    /// An attribute name was not one this crate recognizes.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    /// An integer conversion overflowed (e.g. more than 65,534 constant pool entries).
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),
    /// Underlying I/O failure while reading or writing bytes.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
