use crate::Error::InvalidValueType;
use crate::reference::Reference;
use crate::Result;
use cjvm_classfile::{BaseType, FieldType};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A value occupying one or two operand-stack/local-variable slots.
///
/// `Object(None)` is Java `null`. `Long`/`Double` each occupy two consecutive 32-bit
/// slots in locals and on the operand stack (JVMS §2.6.1); the interpreter is
/// responsible for that bookkeeping, this type just carries the 64-bit payload.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(Option<Arc<RwLock<Reference>>>),
}

impl Value {
    /// Wrap a reference as a non-null object value.
    #[must_use]
    pub fn from_reference(reference: Reference) -> Self {
        Value::Object(Some(Arc::new(RwLock::new(reference))))
    }

    /// Java `null`.
    #[must_use]
    pub fn null() -> Self {
        Value::Object(None)
    }

    /// The zero/default value for a field of the given type (JVMS §2.3, §2.4).
    #[must_use]
    pub fn default_for(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Base(BaseType::Long) => Value::Long(0),
            FieldType::Base(BaseType::Double) => Value::Double(0.0),
            FieldType::Base(BaseType::Float) => Value::Float(0.0),
            FieldType::Base(
                BaseType::Boolean
                | BaseType::Byte
                | BaseType::Char
                | BaseType::Short
                | BaseType::Int,
            ) => Value::Int(0),
            FieldType::Object(_) | FieldType::Array(_) => Value::null(),
        }
    }

    /// Number of 32-bit slots this value occupies (1, except `Long`/`Double` which are 2).
    #[must_use]
    pub fn slot_count(&self) -> usize {
        match self {
            Value::Long(_) | Value::Double(_) => 2,
            Value::Int(_) | Value::Float(_) | Value::Object(_) => 1,
        }
    }

    /// # Errors
    ///
    /// if this value is not an `Int`.
    pub fn as_int(&self) -> Result<i32> {
        match self {
            Value::Int(value) => Ok(*value),
            _ => Err(InvalidValueType("expected int".to_string())),
        }
    }

    /// # Errors
    ///
    /// if this value is not a `Long`.
    pub fn as_long(&self) -> Result<i64> {
        match self {
            Value::Long(value) => Ok(*value),
            _ => Err(InvalidValueType("expected long".to_string())),
        }
    }

    /// # Errors
    ///
    /// if this value is not a `Float`.
    pub fn as_float(&self) -> Result<f32> {
        match self {
            Value::Float(value) => Ok(*value),
            _ => Err(InvalidValueType("expected float".to_string())),
        }
    }

    /// # Errors
    ///
    /// if this value is not a `Double`.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(value) => Ok(*value),
            _ => Err(InvalidValueType("expected double".to_string())),
        }
    }

    /// # Errors
    ///
    /// if this value is not an `Object`.
    pub fn as_object(&self) -> Result<Option<&Arc<RwLock<Reference>>>> {
        match self {
            Value::Object(reference) => Ok(reference.as_ref()),
            _ => Err(InvalidValueType("expected object reference".to_string())),
        }
    }

    /// Whether this value is `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Object(None))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Long(value) => write!(f, "{value}L"),
            Value::Float(value) => write!(f, "{value}F"),
            Value::Double(value) => write!(f, "{value}D"),
            Value::Object(None) => write!(f, "null"),
            Value::Object(Some(reference)) => write!(f, "{}", reference.read().class_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_for_long_is_wide() {
        assert_eq!(2, Value::default_for(&FieldType::Base(BaseType::Long)).slot_count());
        assert_eq!(2, Value::default_for(&FieldType::Base(BaseType::Double)).slot_count());
        assert_eq!(1, Value::default_for(&FieldType::Base(BaseType::Int)).slot_count());
    }

    #[test]
    fn test_null_is_null() {
        assert!(Value::null().is_null());
        assert!(!Value::Int(0).is_null());
    }

    #[test]
    fn test_as_int_type_mismatch() {
        assert!(Value::Long(1).as_int().is_err());
    }
}
