use crate::Error::InvalidValueType;
use crate::object::Object;
use crate::value::Value;
use crate::{Class, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A reference-type array: its own array class (e.g. `[Ljava/lang/String;`) plus the
/// backing element storage. Kept out of the main `Reference` enum's primitive
/// variants so primitive arrays don't pay for an `Arc<Class>`.
#[derive(Clone, Debug)]
pub struct ObjectArray {
    pub class: Arc<Class>,
    pub elements: Arc<RwLock<Vec<Value>>>,
}

impl ObjectArray {
    #[must_use]
    pub fn new(class: Arc<Class>, length: usize) -> Self {
        ObjectArray {
            class,
            elements: Arc::new(RwLock::new(vec![Value::null(); length])),
        }
    }
}

/// A heap reference: an object instance, or one of the nine array shapes the JVM
/// distinguishes by element kind (JVMS §2.4, table 6.5.newarray-A plus object arrays).
#[derive(Clone, Debug)]
pub enum Reference {
    BooleanArray(Arc<RwLock<Vec<i8>>>),
    ByteArray(Arc<RwLock<Vec<i8>>>),
    CharArray(Arc<RwLock<Vec<u16>>>),
    ShortArray(Arc<RwLock<Vec<i16>>>),
    IntArray(Arc<RwLock<Vec<i32>>>),
    LongArray(Arc<RwLock<Vec<i64>>>),
    FloatArray(Arc<RwLock<Vec<f32>>>),
    DoubleArray(Arc<RwLock<Vec<f64>>>),
    Array(ObjectArray),
    Object(Object),
}

impl Reference {
    /// The JVMS internal binary name of the reference's runtime class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        match self {
            Reference::BooleanArray(_) => "[Z",
            Reference::ByteArray(_) => "[B",
            Reference::CharArray(_) => "[C",
            Reference::ShortArray(_) => "[S",
            Reference::IntArray(_) => "[I",
            Reference::LongArray(_) => "[J",
            Reference::FloatArray(_) => "[F",
            Reference::DoubleArray(_) => "[D",
            Reference::Array(object_array) => object_array.class.name(),
            Reference::Object(object) => object.class().name(),
        }
    }

    /// Whether this reference denotes any kind of array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        !matches!(self, Reference::Object(_))
    }

    /// Element count. For `Object`, always 0 (instances have no length).
    #[must_use]
    pub fn array_length(&self) -> usize {
        match self {
            Reference::BooleanArray(v) | Reference::ByteArray(v) => v.read().len(),
            Reference::CharArray(v) => v.read().len(),
            Reference::ShortArray(v) => v.read().len(),
            Reference::IntArray(v) => v.read().len(),
            Reference::LongArray(v) => v.read().len(),
            Reference::FloatArray(v) => v.read().len(),
            Reference::DoubleArray(v) => v.read().len(),
            Reference::Array(object_array) => object_array.elements.read().len(),
            Reference::Object(_) => 0,
        }
    }

    /// # Errors
    ///
    /// if this reference is not an `Object`.
    pub fn as_object(&self) -> Result<&Object> {
        match self {
            Reference::Object(object) => Ok(object),
            _ => Err(InvalidValueType("expected object instance".to_string())),
        }
    }

    /// # Errors
    ///
    /// if this reference is not an `Array` (reference-type array).
    pub fn as_object_array(&self) -> Result<&ObjectArray> {
        match self {
            Reference::Array(object_array) => Ok(object_array),
            _ => Err(InvalidValueType("expected object array".to_string())),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name())
    }
}

macro_rules! typed_array_accessor {
    ($name:ident, $variant:ident, $element:ty) => {
        impl Reference {
            #[doc = concat!("# Errors\n\nif this reference is not a `", stringify!($variant), "`.")]
            pub fn $name(&self) -> Result<&Arc<RwLock<Vec<$element>>>> {
                match self {
                    Reference::$variant(value) => Ok(value),
                    _ => Err(InvalidValueType(format!(
                        "expected {}",
                        stringify!($variant)
                    ))),
                }
            }
        }
    };
}

typed_array_accessor!(as_byte_array, ByteArray, i8);
typed_array_accessor!(as_boolean_array, BooleanArray, i8);
typed_array_accessor!(as_char_array, CharArray, u16);
typed_array_accessor!(as_short_array, ShortArray, i16);
typed_array_accessor!(as_int_array, IntArray, i32);
typed_array_accessor!(as_long_array, LongArray, i64);
typed_array_accessor!(as_float_array, FloatArray, f32);
typed_array_accessor!(as_double_array, DoubleArray, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_length() {
        let reference = Reference::IntArray(Arc::new(RwLock::new(vec![1, 2, 3])));
        assert_eq!(3, reference.array_length());
        assert!(reference.is_array());
        assert_eq!("[I", reference.class_name());
    }

    #[test]
    fn test_typed_accessor_mismatch() {
        let reference = Reference::IntArray(Arc::new(RwLock::new(vec![])));
        assert!(reference.as_long_array().is_err());
        assert!(reference.as_int_array().is_ok());
    }
}
