//! Error handling for `cjvm_runtime`.
//!
//! Mirrors the teacher's layered-crate discipline: `cjvm_classfile::Error` and
//! `cjvm_classloader::Error` are wrapped via `#[from]`, and every VM-visible throwable
//! kind (JVMS chapter that defines `java.lang.*Error`/`*Exception`) gets its own
//! [`JavaError`] variant so the CLI can map it to a process exit code and a
//! Java-style stack trace without string-matching messages.

/// Result type alias for this crate, defaulting the error to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A condition that the JVM specification requires surfacing as a thrown `Throwable`.
///
/// Each variant carries the text that becomes the thrown object's `detailMessage`.
#[derive(Debug, thiserror::Error)]
pub enum JavaError {
    #[error("{0}")]
    ClassNotFoundException(String),
    #[error("{0}")]
    NoClassDefFoundError(String),
    #[error("{0}")]
    NoSuchFieldError(String),
    #[error("{0}")]
    NoSuchMethodError(String),
    #[error("{0}")]
    IncompatibleClassChangeError(String),
    #[error("{0}")]
    IllegalAccessError(String),
    #[error("{0}")]
    AbstractMethodError(String),
    #[error("{0}")]
    NullPointerException(String),
    #[error("Index {index} out of bounds for length {length}")]
    ArrayIndexOutOfBoundsException { index: i32, length: usize },
    #[error("class {from} cannot be cast to class {to}")]
    ClassCastException { from: String, to: String },
    #[error("{0}")]
    NegativeArraySizeException(String),
    #[error("/ by zero")]
    ArithmeticException,
    #[error("{0}")]
    StackOverflowError(String),
    #[error("{0}")]
    OutOfMemoryError(String),
    #[error("{0}")]
    ExceptionInInitializerError(String),
    #[error("{0}")]
    InterruptedException(String),
    #[error("{0}")]
    UnsupportedOperationException(String),
    #[error("{0}")]
    IllegalMonitorStateException(String),
    #[error("{0}")]
    RuntimeException(String),
    #[error("{0}")]
    UnsatisfiedLinkError(String),
}

/// Comprehensive error type for `cjvm_runtime`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed class bytes surfaced while resolving a constant during execution.
    #[error(transparent)]
    ClassFile(#[from] cjvm_classfile::Error),
    /// Class loading, linking, initialization, or constant pool resolution failed.
    #[error(transparent)]
    ClassLoader(cjvm_classloader::Error),
    /// A condition the JVM specification requires surfacing as a thrown `Throwable`.
    #[error(transparent)]
    Java(#[from] JavaError),
    /// A VM-internal invariant was violated; not a condition Java code can catch.
    #[error("internal error: {0}")]
    InternalError(String),
    /// A `parking_lot`/`std::sync` lock was poisoned by a panicking holder.
    #[error("poisoned lock: {0}")]
    PoisonedLock(String),
    /// The current bytecode offset fell outside the method's code array.
    #[error("invalid program counter: {0}")]
    InvalidProgramCounter(u16),
    /// An operand stack push exceeded the method's declared `max_stack`.
    #[error("operand stack overflow")]
    OperandStackOverflow,
    /// An operand stack pop was attempted on an empty stack.
    #[error("operand stack underflow")]
    OperandStackUnderflow,
    /// A frame-internal value did not carry the type an instruction required.
    #[error("invalid operand; expected {expected}, found {actual}")]
    InvalidOperand { expected: String, actual: String },
    /// A `Value`-carrying error was produced where reflection or formatting failed.
    #[error(transparent)]
    TryFromIntError(#[from] std::num::TryFromIntError),
    /// A configuration value could not be built into a usable VM configuration.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

/// A native method failing to link is a Java-catchable condition (`UnsatisfiedLinkError`);
/// every other `cjvm_classloader` failure stays an opaque wrapped error.
impl From<cjvm_classloader::Error> for Error {
    fn from(error: cjvm_classloader::Error) -> Self {
        match error {
            cjvm_classloader::Error::UnsatisfiedLinkError(message) => {
                Error::Java(JavaError::UnsatisfiedLinkError(message))
            }
            other => Error::ClassLoader(other),
        }
    }
}

/// Map this crate's error back into `cjvm_classloader::Error`, for the handful of
/// `cjvm_classloader` callback hooks (`run_clinit`, string-interning builders) that
/// only know that crate's error type.
pub(crate) fn to_classloader_error(error: Error) -> cjvm_classloader::Error {
    match error {
        Error::ClassLoader(error) => error,
        Error::ClassFile(error) => cjvm_classloader::Error::ClassFormat(error),
        other => cjvm_classloader::Error::LinkageError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_error_display() {
        let error = JavaError::ArrayIndexOutOfBoundsException { index: 5, length: 3 };
        assert_eq!("Index 5 out of bounds for length 3", error.to_string());
    }

    #[test]
    fn test_wraps_classloader_error() {
        let error: Error = cjvm_classloader::Error::ClassNotFound("Foo".to_string()).into();
        assert!(matches!(error, Error::ClassLoader(_)));
    }
}
