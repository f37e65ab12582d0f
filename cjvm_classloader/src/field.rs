use crate::value::Value;
use cjvm_classfile::{ConstantPool, Field as RawField, FieldAccessFlags, FieldType};

/// A resolved field declaration, layered over the raw classfile `Field` with the
/// instance- or static-slot index assigned during linking.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
    access_flags: FieldAccessFlags,
    slot: u16,
    constant_value_index: Option<u16>,
}

impl Field {
    /// Build a runtime field from its raw classfile declaration.
    ///
    /// # Errors
    ///
    /// if the field's name or descriptor index does not resolve in `constant_pool`.
    pub fn new(
        constant_pool: &ConstantPool,
        raw: &RawField,
        slot: u16,
    ) -> cjvm_classfile::Result<Self> {
        let name = constant_pool.utf8(raw.name_index)?.to_string();
        Ok(Field {
            name,
            field_type: raw.field_type.clone(),
            access_flags: raw.access_flags,
            slot,
            constant_value_index: raw.constant_value_index(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    #[must_use]
    pub fn access_flags(&self) -> FieldAccessFlags {
        self.access_flags
    }

    /// Index into the owning class's instance-slot table (if non-static) or
    /// static-slot table (if static).
    #[must_use]
    pub fn slot(&self) -> u16 {
        self.slot
    }

    /// Rewrite this field's slot to an absolute index, used when flattening a class
    /// hierarchy's instance fields into one object-wide table.
    pub(crate) fn set_absolute_slot(&mut self, slot: u16) {
        self.slot = slot;
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::FINAL)
    }

    #[must_use]
    pub fn constant_value_index(&self) -> Option<u16> {
        self.constant_value_index
    }

    /// The field's zero/default value (JVMS §2.3, §2.4).
    #[must_use]
    pub fn default_value(&self) -> Value {
        Value::default_for(&self.field_type)
    }
}
