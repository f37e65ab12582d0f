use crate::{Error, Result};
use cjvm_classloader::{Reference, Value};
use parking_lot::RwLock;
use std::sync::Arc;

/// A frame's local variable slots (JVMS §2.6.1).
///
/// Sized to the method's `max_locals` at construction. A `long`/`double` stored at
/// index `i` occupies the logical slot at `i`; the JVM specification reserves `i + 1`
/// as unaddressable, so unlike the operand stack this array never needs an explicit
/// "second half" marker — verified bytecode only ever loads/stores the low index.
#[derive(Debug)]
pub struct LocalVariables {
    slots: Vec<Value>,
}

impl LocalVariables {
    #[must_use]
    pub fn with_max_locals(max_locals: u16) -> Self {
        LocalVariables {
            slots: vec![Value::Int(0); max_locals as usize],
        }
    }

    fn slot(&self, index: u16) -> Result<&Value> {
        self.slots
            .get(index as usize)
            .ok_or(Error::InvalidProgramCounter(index))
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals`.
    pub fn get(&self, index: u16) -> Result<Value> {
        self.slot(index).cloned().map_err(|_| Error::InvalidProgramCounter(index))
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals` or the slot does not hold an `int`.
    pub fn get_int(&self, index: u16) -> Result<i32> {
        Ok(self.slot(index)?.as_int()?)
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals` or the slot does not hold a `long`.
    pub fn get_long(&self, index: u16) -> Result<i64> {
        Ok(self.slot(index)?.as_long()?)
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals` or the slot does not hold a `float`.
    pub fn get_float(&self, index: u16) -> Result<f32> {
        Ok(self.slot(index)?.as_float()?)
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals` or the slot does not hold a `double`.
    pub fn get_double(&self, index: u16) -> Result<f64> {
        Ok(self.slot(index)?.as_double()?)
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals` or the slot does not hold an object reference.
    pub fn get_object(&self, index: u16) -> Result<Option<Arc<RwLock<Reference>>>> {
        Ok(self.slot(index)?.as_object()?.cloned())
    }

    /// # Errors
    ///
    /// if `index` is outside `max_locals`.
    pub fn set(&mut self, index: u16, value: Value) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(Error::InvalidProgramCounter(index))?;
        *slot = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_int() -> Result<()> {
        let mut locals = LocalVariables::with_max_locals(2);
        locals.set(0, Value::Int(42))?;
        assert_eq!(42, locals.get_int(0)?);
        Ok(())
    }

    #[test]
    fn test_round_trips_long() -> Result<()> {
        let mut locals = LocalVariables::with_max_locals(2);
        locals.set(0, Value::Long(i64::from(i32::MAX) + 1))?;
        assert_eq!(i64::from(i32::MAX) + 1, locals.get_long(0)?);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_errors() {
        let locals = LocalVariables::with_max_locals(1);
        assert!(locals.get_int(5).is_err());
    }
}
