//! Error handling for the `cjvm_classloader` crate.

/// Result type alias for this crate, defaulting the error to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that can occur while loading, linking, initializing, or resolving classes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No class path entry produced bytes for this binary name.
    #[error("class not found: {0}")]
    ClassNotFound(String),
    /// A class file failed to parse.
    #[error(transparent)]
    ClassFormat(#[from] cjvm_classfile::Error),
    /// A class's superclass, interface, or other structural constraint was violated.
    #[error("linkage error: {0}")]
    LinkageError(String),
    /// A class transitioned to `ERROR` during a prior initialization attempt.
    #[error("could not initialize class {0}")]
    NoClassDefFound(String),
    /// A field lookup by name/descriptor found nothing on the class or its supertypes.
    #[error("field not found: {class_name}.{field_name}")]
    FieldNotFound { class_name: String, field_name: String },
    /// A method lookup by name/descriptor found nothing on the class or its supertypes.
    #[error("method not found: {class_name}.{method_name}{descriptor}")]
    MethodNotFound {
        class_name: String,
        method_name: String,
        descriptor: String,
    },
    /// A constant pool entry had an index or tag the resolver did not expect.
    #[error("invalid constant pool entry at index {0}")]
    InvalidConstant(u16),
    /// A value did not carry the runtime type an operation required.
    #[error("invalid value type: {0}")]
    InvalidValueType(String),
    /// A native method had no registered implementation at link time.
    #[error("unsatisfied link error: {0}")]
    UnsatisfiedLinkError(String),
    /// Heap address-space bookkeeping failed.
    #[error(transparent)]
    Heap(#[from] cjvm_heap::Error),
    /// Underlying I/O failure while reading a class path entry.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Underlying failure while reading a jar/zip class path entry.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
