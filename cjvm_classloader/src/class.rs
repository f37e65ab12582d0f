use crate::Error::{FieldNotFound, LinkageError, MethodNotFound};
use crate::class_loader::LoaderId;
use crate::field::Field;
use crate::method::Method;
use crate::object::Object;
use crate::resolved_pool::ResolvedPool;
use crate::Result;
use cjvm_classfile::{ClassAccessFlags, ClassFile, FieldType};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

/// A class's position in the loading/linking/initialization lifecycle (JVMS §5.3-§5.5).
///
/// Transitions only move forward: `Loaded -> Linked -> Initializing -> Inited`, with
/// `Error` reachable from `Initializing` and sticky from then on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ClassState {
    Loaded = 0,
    Linked = 1,
    Initializing = 2,
    Inited = 3,
    Error = 4,
}

impl ClassState {
    fn from_u8(value: u8) -> ClassState {
        match value {
            1 => ClassState::Linked,
            2 => ClassState::Initializing,
            3 => ClassState::Inited,
            4 => ClassState::Error,
            _ => ClassState::Loaded,
        }
    }
}

/// A loaded, (eventually) linked and initialized class. Owns the immutable classfile
/// descriptor, the runtime views over its fields and methods, and the mutable
/// lifecycle/layout state that linking and initialization fill in.
pub struct Class {
    class_file: Option<ClassFile>,
    array_component: Option<FieldType>,
    is_primitive: bool,
    loader: LoaderId,
    name: String,
    state: AtomicU8,
    super_class: RwLock<Option<Arc<Class>>>,
    interfaces: RwLock<Vec<Arc<Class>>>,
    instance_fields: Vec<Arc<Field>>,
    static_fields: Vec<Arc<Field>>,
    instance_field_base: RwLock<u16>,
    methods: Vec<Arc<Method>>,
    static_values: RwLock<Vec<crate::value::Value>>,
    resolved_pool: ResolvedPool,
    mirror: OnceLock<Object>,
}

impl Class {
    /// Parse a class's own field/method tables out of its classfile. Does not touch the
    /// superclass or interfaces; that is `ClassLoader::link`'s job, since it requires
    /// loading other classes.
    ///
    /// # Errors
    ///
    /// if the classfile's constant pool references are inconsistent.
    pub fn from_class_file(class_file: ClassFile, loader: LoaderId) -> Result<Self> {
        let name = class_file.class_name()?.to_string();
        let constant_pool = &class_file.constant_pool;

        let mut instance_fields = Vec::new();
        let mut static_fields = Vec::new();
        for raw_field in &class_file.fields {
            let is_static = raw_field
                .access_flags
                .contains(cjvm_classfile::FieldAccessFlags::STATIC);
            #[allow(clippy::cast_possible_truncation)]
            let slot = if is_static {
                static_fields.len() as u16
            } else {
                instance_fields.len() as u16
            };
            let field = Arc::new(Field::new(constant_pool, raw_field, slot)?);
            if is_static {
                static_fields.push(field);
            } else {
                instance_fields.push(field);
            }
        }

        let mut methods = Vec::with_capacity(class_file.methods.len());
        for raw_method in &class_file.methods {
            methods.push(Arc::new(Method::new(constant_pool, raw_method)?));
        }

        let static_values = static_fields.iter().map(|field| field.default_value()).collect();
        let pool_len = class_file.constant_pool.len();

        Ok(Class {
            class_file: Some(class_file),
            array_component: None,
            is_primitive: false,
            loader,
            name,
            state: AtomicU8::new(ClassState::Loaded as u8),
            super_class: RwLock::new(None),
            interfaces: RwLock::new(Vec::new()),
            instance_fields,
            static_fields,
            instance_field_base: RwLock::new(0),
            methods,
            static_values: RwLock::new(static_values),
            resolved_pool: ResolvedPool::new(pool_len),
            mirror: OnceLock::new(),
        })
    }

    /// Build the synthetic class describing an array type, e.g. `[I` or
    /// `[Ljava.lang.String;`. Array classes have no classfile of their own (JVMS
    /// §5.3.3): their superclass is always `java.lang.Object`, they implement
    /// `Cloneable` and `java.io.Serializable`, and they need no linking since there is
    /// no bytecode to verify.
    #[must_use]
    pub fn new_array(
        name: String,
        component: FieldType,
        loader: LoaderId,
        object_class: Arc<Class>,
        interfaces: Vec<Arc<Class>>,
    ) -> Arc<Class> {
        let class = Class {
            class_file: None,
            array_component: Some(component),
            is_primitive: false,
            loader,
            name,
            state: AtomicU8::new(ClassState::Linked as u8),
            super_class: RwLock::new(Some(object_class)),
            interfaces: RwLock::new(interfaces),
            instance_fields: Vec::new(),
            static_fields: Vec::new(),
            instance_field_base: RwLock::new(0),
            methods: Vec::new(),
            static_values: RwLock::new(Vec::new()),
            resolved_pool: ResolvedPool::new(0),
            mirror: OnceLock::new(),
        };
        Arc::new(class)
    }

    /// Build the synthetic descriptor for a primitive type (`int`, `boolean`, ...) or
    /// `void`. JVMS has no classfile for these at all; `Class.isPrimitive()` and
    /// `Class.getName()` are the only reflective surface they need, so the mirror is
    /// the whole point -- there is no superclass, no interfaces, nothing to link.
    #[must_use]
    pub fn new_primitive(name: String, loader: LoaderId) -> Arc<Class> {
        let class = Class {
            class_file: None,
            array_component: None,
            is_primitive: true,
            loader,
            name,
            state: AtomicU8::new(ClassState::Inited as u8),
            super_class: RwLock::new(None),
            interfaces: RwLock::new(Vec::new()),
            instance_fields: Vec::new(),
            static_fields: Vec::new(),
            instance_field_base: RwLock::new(0),
            methods: Vec::new(),
            static_values: RwLock::new(Vec::new()),
            resolved_pool: ResolvedPool::new(0),
            mirror: OnceLock::new(),
        };
        Arc::new(class)
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array_component.is_some()
    }

    #[must_use]
    pub fn array_component(&self) -> Option<&FieldType> {
        self.array_component.as_ref()
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.is_primitive
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn class_file(&self) -> Option<&ClassFile> {
        self.class_file.as_ref()
    }

    #[must_use]
    pub fn loader(&self) -> LoaderId {
        self.loader
    }

    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.class_file
            .as_ref()
            .map_or(ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL, |cf| cf.access_flags)
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags().contains(ClassAccessFlags::INTERFACE)
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access_flags().contains(ClassAccessFlags::ABSTRACT)
    }

    #[must_use]
    pub fn state(&self) -> ClassState {
        ClassState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ClassState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[must_use]
    pub fn super_class(&self) -> Option<Arc<Class>> {
        self.super_class.read().clone()
    }

    pub(crate) fn set_super_class(&self, super_class: Option<Arc<Class>>) {
        *self.super_class.write() = super_class;
    }

    #[must_use]
    pub fn interfaces(&self) -> Vec<Arc<Class>> {
        self.interfaces.read().clone()
    }

    pub(crate) fn set_interfaces(&self, interfaces: Vec<Arc<Class>>) {
        *self.interfaces.write() = interfaces;
    }

    #[must_use]
    pub fn resolved_pool(&self) -> &ResolvedPool {
        &self.resolved_pool
    }

    #[must_use]
    pub fn declared_methods(&self) -> &[Arc<Method>] {
        &self.methods
    }

    #[must_use]
    pub fn declared_instance_fields(&self) -> &[Arc<Field>] {
        &self.instance_fields
    }

    #[must_use]
    pub fn declared_static_fields(&self) -> &[Arc<Field>] {
        &self.static_fields
    }

    /// This class's instance-field slot count, not including superclass fields.
    #[must_use]
    pub fn own_instance_slot_count(&self) -> u16 {
        #[allow(clippy::cast_possible_truncation)]
        (self.instance_fields.len() as u16)
    }

    /// Total instance-field slot count across this class and every superclass.
    #[must_use]
    pub fn total_instance_slots(&self) -> u16 {
        *self.instance_field_base.read() + self.own_instance_slot_count()
    }

    pub(crate) fn set_instance_field_base(&self, base: u16) {
        *self.instance_field_base.write() = base;
    }

    /// Link this class on its own, without resolving a superclass or interfaces.
    ///
    /// This only covers the self-contained case: a class file with no superclass
    /// (`super_class == 0`, i.e. `java.lang.Object` itself). Every other class must go
    /// through `ClassLoader::link`, which loads and links the superclass and interfaces
    /// first and then calls [`Class::finish_link`]. Idempotent: linking an
    /// already-linked class is a no-op.
    ///
    /// # Errors
    ///
    /// if this class file declares a superclass, since resolving one requires a
    /// `ClassLoader`.
    pub fn link(&self) -> Result<()> {
        if self.state() != ClassState::Loaded {
            return Ok(());
        }
        let super_class_index = self.class_file.as_ref().map_or(0, |cf| cf.super_class);
        if super_class_index != 0 {
            return Err(LinkageError(format!(
                "{} must be linked via ClassLoader::link to resolve its superclass",
                self.name
            )));
        }
        self.finish_link(None, Vec::new());
        Ok(())
    }

    /// Complete linking once a `ClassLoader` has resolved (and itself linked) this
    /// class's superclass and interfaces. Computes this class's instance-field base
    /// offset from the superclass's total slot count and transitions to `Linked`.
    /// Idempotent.
    pub fn finish_link(&self, super_class: Option<Arc<Class>>, interfaces: Vec<Arc<Class>>) {
        if self.state() != ClassState::Loaded {
            return;
        }
        let base = super_class.as_ref().map_or(0, |class| class.total_instance_slots());
        self.set_super_class(super_class);
        self.set_interfaces(interfaces);
        self.set_instance_field_base(base);
        self.set_state(ClassState::Linked);
    }

    /// Every instance field visible on an object of this class, from `Object` down to
    /// this class, with slot indices absolute within the object's flat slot table.
    ///
    /// # Errors
    ///
    /// if this class has not been linked.
    pub fn instance_fields(&self) -> Result<Vec<Arc<Field>>> {
        if self.state() == ClassState::Loaded {
            return Err(LinkageError(format!("{} has not been linked", self.name)));
        }
        let mut fields = match self.super_class() {
            Some(super_class) => super_class.instance_fields()?,
            None => Vec::new(),
        };
        let base = *self.instance_field_base.read();
        for field in &self.instance_fields {
            fields.push(Arc::new(rebase(field, base)));
        }
        Ok(fields)
    }

    /// Resolve an instance field's absolute slot by name, searching this class then its
    /// superclasses (most-derived declaration wins, matching field shadowing rules).
    ///
    /// # Errors
    ///
    /// if no instance field named `name` is declared anywhere in the hierarchy.
    pub fn instance_field_slot(&self, name: &str) -> Result<u16> {
        if let Some(field) = self.instance_fields.iter().find(|field| field.name() == name) {
            return Ok(*self.instance_field_base.read() + field.slot());
        }
        if let Some(super_class) = self.super_class() {
            return super_class.instance_field_slot(name);
        }
        Err(FieldNotFound {
            class_name: self.name.clone(),
            field_name: name.to_string(),
        })
    }

    /// Read a static field's current value by name, searching this class then its
    /// superclasses.
    ///
    /// # Errors
    ///
    /// if no static field named `name` is declared anywhere in the hierarchy.
    pub fn static_field(&self, name: &str) -> Result<crate::value::Value> {
        if let Some(field) = self.static_fields.iter().find(|field| field.name() == name) {
            return Ok(self.static_values.read()[field.slot() as usize].clone());
        }
        if let Some(super_class) = self.super_class() {
            return super_class.static_field(name);
        }
        Err(FieldNotFound {
            class_name: self.name.clone(),
            field_name: name.to_string(),
        })
    }

    /// Write a static field's value by name. Only ever targets this exact class's own
    /// static storage: unlike instance fields, static fields are never inherited
    /// storage, only inherited *access*, so a write through a subclass name must first
    /// be resolved to the declaring class by the caller.
    ///
    /// # Errors
    ///
    /// if no static field named `name` is declared on this class.
    pub fn set_static_field(&self, name: &str, value: crate::value::Value) -> Result<()> {
        let field = self
            .static_fields
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| FieldNotFound {
                class_name: self.name.clone(),
                field_name: name.to_string(),
            })?;
        self.static_values.write()[field.slot() as usize] = value;
        Ok(())
    }

    /// Find a method by name and descriptor, searching this class then its
    /// superclasses (simple single-dispatch lookup; interface default methods are
    /// searched separately via `interfaces()`).
    ///
    /// # Errors
    ///
    /// if no method matches anywhere in the hierarchy.
    pub fn find_method(&self, name: &str, descriptor: &str) -> Result<Arc<Method>> {
        if let Some(method) = self
            .methods
            .iter()
            .find(|method| method.name() == name && method.descriptor() == descriptor)
        {
            return Ok(Arc::clone(method));
        }
        if let Some(super_class) = self.super_class() {
            if let Ok(method) = super_class.find_method(name, descriptor) {
                return Ok(method);
            }
        }
        for interface in self.interfaces() {
            if let Ok(method) = interface.find_method(name, descriptor) {
                return Ok(method);
            }
        }
        Err(MethodNotFound {
            class_name: self.name.clone(),
            method_name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// Widening reference-type assignability (JVMS §2.4.7), for `instanceof`/`checkcast`
    /// and the `isAssignableFrom` testable property: reflexive, and walks the
    /// superclass chain plus every implemented interface.
    ///
    /// # Errors
    ///
    /// never, currently; kept fallible to mirror the interface this will grow into
    /// once array-component covariance is added.
    pub fn is_assignable_to(&self, target: &Arc<Class>) -> Result<bool> {
        if self.name == target.name {
            return Ok(true);
        }
        if let Some(super_class) = self.super_class() {
            if super_class.is_assignable_to(target)? {
                return Ok(true);
            }
        }
        for interface in self.interfaces() {
            if interface.is_assignable_to(target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Fetch this class's `java.lang.Class` mirror, if one has been attached.
    #[must_use]
    pub fn mirror(&self) -> Option<&Object> {
        self.mirror.get()
    }

    /// Attach this class's mirror. Idempotent: a second call with a different object is
    /// ignored, matching `OnceLock` semantics, since a class has exactly one mirror for
    /// its entire lifetime.
    pub fn set_mirror(&self, mirror: Object) {
        let _ = self.mirror.set(mirror);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

fn rebase(field: &Arc<Field>, base: u16) -> Field {
    let mut rebased = (**field).clone();
    rebased.set_absolute_slot(base + field.slot());
    rebased
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjvm_classfile::{ClassAccessFlags, Constant, ConstantPool, Version};

    fn simple_class_file(name: &str, super_class: u16) -> cjvm_classfile::Result<ClassFile> {
        let mut constant_pool = ConstantPool::new();
        let name_index = constant_pool.push(Constant::Utf8(name.to_string()));
        let this_class = constant_pool.push(Constant::Class(name_index));
        Ok(ClassFile {
            version: Version { major: 52, minor: 0 },
            constant_pool,
            access_flags: ClassAccessFlags::PUBLIC,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        })
    }

    #[test]
    fn test_link_rejects_class_with_superclass() -> Result<()> {
        let class_file = simple_class_file("Sub", 99)?;
        let class = Class::from_class_file(class_file, LoaderId::Bootstrap)?;
        assert!(class.link().is_err());
        Ok(())
    }

    #[test]
    fn test_finish_link_offsets_slots_past_superclass() -> Result<()> {
        let super_file = simple_class_file("java/lang/Object", 0)?;
        let super_class = Arc::new(Class::from_class_file(super_file, LoaderId::Bootstrap)?);
        super_class.link()?;

        let sub_file = simple_class_file("Sub", 1)?;
        let sub = Class::from_class_file(sub_file, LoaderId::Bootstrap)?;
        sub.finish_link(Some(super_class), vec![]);
        assert_eq!(ClassState::Linked, sub.state());
        assert_eq!(0, sub.total_instance_slots());
        Ok(())
    }

    #[test]
    fn test_is_assignable_to_is_reflexive_and_walks_supers() -> Result<()> {
        let object_file = simple_class_file("java/lang/Object", 0)?;
        let object_class = Arc::new(Class::from_class_file(object_file, LoaderId::Bootstrap)?);
        object_class.link()?;

        let sub_file = simple_class_file("Sub", 1)?;
        let sub = Arc::new(Class::from_class_file(sub_file, LoaderId::Bootstrap)?);
        sub.finish_link(Some(Arc::clone(&object_class)), vec![]);

        assert!(sub.is_assignable_to(&sub)?);
        assert!(sub.is_assignable_to(&object_class)?);
        assert!(!object_class.is_assignable_to(&sub)?);
        Ok(())
    }

    #[test]
    fn test_new_array_is_already_linked() -> Result<()> {
        let object_file = simple_class_file("java/lang/Object", 0)?;
        let object_class = Arc::new(Class::from_class_file(object_file, LoaderId::Bootstrap)?);
        object_class.link()?;

        let array_class = Class::new_array(
            "[I".to_string(),
            FieldType::Base(cjvm_classfile::BaseType::Int),
            LoaderId::Bootstrap,
            object_class,
            vec![],
        );
        assert!(array_class.is_array());
        assert_eq!(ClassState::Linked, array_class.state());
        Ok(())
    }
}
