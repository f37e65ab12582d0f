//! Class loading, linking, initialization, the object/array model, and constant pool
//! resolution (JVMS chapters 2 and 5).
//!
//! This crate owns everything between "bytes of a class file" and "a running method's
//! frame can read a field or invoke a method": parsing is `cjvm_classfile`'s job,
//! bytecode execution is `cjvm_runtime`'s. Initialization (`<clinit>` execution) is
//! always driven by an injected closure, since this crate has no interpreter of its
//! own to run one.

mod class;
mod class_loader;
mod class_path;
mod class_path_entry;
mod error;
mod field;
mod intern;
mod method;
mod object;
mod reference;
mod resolved_pool;
mod value;

pub use class::{Class, ClassState};
pub use class_loader::{ClassLoader, LoaderId, NativeAvailability};
pub use class_path::ClassPath;
pub use class_path_entry::{ClassPathEntry, Directory, Jar};
pub use error::{Error, Result};
pub use field::Field;
pub use intern::InternTable;
pub use method::Method;
pub use object::Object;
pub use reference::{ObjectArray, Reference};
pub use resolved_pool::{ClassRef, FieldRef, MemberRef, MethodRef, ResolutionState, ResolvedPool, StringRef};
pub use value::Value;
