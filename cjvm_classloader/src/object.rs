use crate::Error::FieldNotFound;
use crate::class::Class;
use crate::value::Value;
use crate::Result;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A Java object instance: its class plus a flat table of instance-field slots, laid
/// out by [`Class::link`] over the class and all of its superclasses.
#[derive(Clone)]
pub struct Object {
    class: Arc<Class>,
    slots: Arc<RwLock<Vec<Value>>>,
}

impl Object {
    /// Allocate a new instance, filling every instance field with its type's default
    /// value (JVMS §2.3, §2.4) -- no constructor runs here; that is a method invocation
    /// the interpreter drives separately, matching `new` followed by `invokespecial`.
    ///
    /// # Errors
    ///
    /// if `class` has not been linked yet.
    pub fn new(class: Arc<Class>) -> Result<Self> {
        let fields = class.instance_fields()?;
        let slots = fields.iter().map(|field| field.default_value()).collect();
        Ok(Object {
            class,
            slots: Arc::new(RwLock::new(slots)),
        })
    }

    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Whether this object is an instance of `class` (JVMS §2.4.7 ordinary `instanceof`
    /// semantics, minus array covariance, which `Reference::Array` handles).
    ///
    /// # Errors
    ///
    /// if the class hierarchy cannot be walked (missing superclass link).
    pub fn is_instance_of(&self, class: &Arc<Class>) -> Result<bool> {
        self.class.is_assignable_to(class)
    }

    /// Read an instance field by slot index.
    ///
    /// # Errors
    ///
    /// if `slot` is out of range for this object's field table.
    pub fn get_slot(&self, slot: u16) -> Result<Value> {
        let slots = self.slots.read();
        slots
            .get(slot as usize)
            .cloned()
            .ok_or_else(|| FieldNotFound {
                class_name: self.class.name().to_string(),
                field_name: format!("<slot {slot}>"),
            })
    }

    /// Write an instance field by slot index.
    ///
    /// # Errors
    ///
    /// if `slot` is out of range for this object's field table.
    pub fn set_slot(&self, slot: u16, value: Value) -> Result<()> {
        let mut slots = self.slots.write();
        let entry = slots.get_mut(slot as usize).ok_or_else(|| FieldNotFound {
            class_name: self.class.name().to_string(),
            field_name: format!("<slot {slot}>"),
        })?;
        *entry = value;
        Ok(())
    }

    /// Read an instance field by name, searching this class and its superclasses.
    ///
    /// # Errors
    ///
    /// if no field named `name` is declared anywhere in the hierarchy.
    pub fn get_field(&self, name: &str) -> Result<Value> {
        let slot = self.class.instance_field_slot(name)?;
        self.get_slot(slot)
    }

    /// Write an instance field by name, searching this class and its superclasses.
    ///
    /// # Errors
    ///
    /// if no field named `name` is declared anywhere in the hierarchy.
    pub fn set_field(&self, name: &str, value: Value) -> Result<()> {
        let slot = self.class.instance_field_slot(name)?;
        self.set_slot(slot, value)
    }

    /// A stable per-instance identity, used for `System.identityHashCode`, monitor
    /// lookup, and reference equality.
    #[must_use]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.slots) as *const () as usize
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("class", &self.class.name()).finish()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_loader::LoaderId;
    use cjvm_classfile::{ClassAccessFlags, ClassFile, Constant, ConstantPool, Version};

    fn object_class_file() -> cjvm_classfile::Result<ClassFile> {
        let mut constant_pool = ConstantPool::new();
        let this_name = constant_pool.push(Constant::Utf8("java/lang/Object".to_string()));
        let this_class = constant_pool.push(Constant::Class(this_name));
        Ok(ClassFile {
            version: Version { major: 52, minor: 0 },
            constant_pool,
            access_flags: ClassAccessFlags::PUBLIC,
            this_class,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        })
    }

    #[test]
    fn test_new_object_has_no_slots() -> Result<()> {
        let class_file = object_class_file()?;
        let class = Class::from_class_file(class_file, LoaderId::Bootstrap)?;
        class.link()?;
        let object = Object::new(Arc::new(class))?;
        assert!(object.get_field("missing").is_err());
        Ok(())
    }

    #[test]
    fn test_identity_is_stable() -> Result<()> {
        let class_file = object_class_file()?;
        let class = Class::from_class_file(class_file, LoaderId::Bootstrap)?;
        class.link()?;
        let object = Object::new(Arc::new(class))?;
        let a = object.identity();
        let b = object.identity();
        assert_eq!(a, b);
        Ok(())
    }
}
