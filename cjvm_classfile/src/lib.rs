//! Parsing and serialization for the JVM class file format (JVMS chapter 4).
//!
//! This crate is purely a codec: it turns `.class` bytes into an immutable, in-memory
//! [`ClassFile`] and back. It performs no linking, no resolution, and no verification;
//! those live in `cjvm_classloader` and `cjvm_runtime`.

pub mod attributes;
mod base_type;
mod class_access_flags;
mod class_file;
mod constant;
mod constant_pool;
mod error;
mod field;
mod field_access_flags;
mod field_type;
mod method;
mod method_access_flags;
mod mutf8;
mod reference_kind;
mod version;

pub use base_type::BaseType;
pub use class_access_flags::ClassAccessFlags;
pub use class_file::ClassFile;
pub use constant::Constant;
pub use constant_pool::ConstantPool;
pub use error::{Error, Result};
pub use field::Field;
pub use field_access_flags::FieldAccessFlags;
pub use field_type::FieldType;
pub use method::Method;
pub use method_access_flags::MethodAccessFlags;
pub use reference_kind::ReferenceKind;
pub use version::{Version, MAX_MAJOR_VERSION};
