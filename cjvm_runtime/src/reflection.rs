//! Just enough of `java.lang.Class` to let bytecode carry class literals (`Foo.class`,
//! `ldc` of a `Class` constant) and run `getClass()`/`instanceof`-flavored reflection,
//! without a general metaobject protocol.

use crate::{Result, Thread};
use cjvm_classfile::FieldType;
use cjvm_classloader::{Class, Object, ObjectArray, Reference, Value};
use std::sync::Arc;

/// Fetch (creating on first use) the `java.lang.Class` mirror for `class`.
///
/// Every class gets exactly one mirror for its lifetime (JVMS §5.1): [`Class::mirror`]
/// is a `OnceLock`, so a race between two threads both populating it for the first time
/// is resolved by re-reading the winner back out rather than trusting either side's own
/// locally built `Object`.
///
/// # Errors
///
/// if `java.lang.Class` itself cannot be loaded and initialized, or the mirror object
/// cannot be allocated.
pub(crate) fn mirror_of(thread: &Thread, class: &Arc<Class>) -> Result<Value> {
    if let Some(mirror) = class.mirror() {
        return Ok(Value::from_reference(Reference::Object(mirror.clone())));
    }

    let class_mirror_class = thread.resolve_and_init("java/lang/Class")?;
    let mirror = Object::new(class_mirror_class)?;
    class.set_mirror(mirror.clone());
    let mirror = class.mirror().cloned().unwrap_or(mirror);

    thread.vm().register_mirror(mirror.identity(), Arc::clone(class));
    Ok(Value::from_reference(Reference::Object(mirror)))
}

/// Recover the `Class` a `java.lang.Class` mirror value stands for, as needed by
/// `Class`'s own native methods (`getName0`, `isInstance`, ...).
///
/// # Errors
///
/// if `value` is not a non-null object reference, or was never produced by
/// [`mirror_of`].
pub(crate) fn class_of_mirror(thread: &Thread, value: &Value) -> Result<Arc<Class>> {
    let reference = value
        .as_object()?
        .ok_or_else(|| crate::JavaError::NullPointerException("null Class mirror".to_string()))?;
    let object = reference.read().as_object()?.clone();
    thread.vm().class_for_mirror(object.identity())
}

/// Fetch the mirror for whatever `field_type` names, loading it (primitive,
/// object, or array) through the bootstrap loader first if this is the first time
/// it's been seen.
///
/// # Errors
///
/// if the named class cannot be loaded and initialized.
pub(crate) fn mirror_of_field_type(thread: &Thread, field_type: &FieldType) -> Result<Value> {
    let class = match field_type {
        FieldType::Base(base_type) => thread.vm().class_loader().load(base_type.java_name())?,
        FieldType::Object(name) => thread.resolve_and_init(name)?,
        FieldType::Array(_) => thread.vm().class_loader().load(&field_type.descriptor())?,
    };
    mirror_of(thread, &class)
}

/// Build a `java.lang.Class[]` mirror array over `classes`, in order, as
/// `getInterfaces0`/`getParameterTypes`/`getExceptionTypes`-style natives need.
///
/// # Errors
///
/// if `java.lang.Class`'s array class cannot be loaded, or any element's mirror
/// cannot be built.
pub(crate) fn mirror_array(thread: &Thread, classes: &[Arc<Class>]) -> Result<Value> {
    let array_class = thread.vm().class_loader().load("[Ljava/lang/Class;")?;
    let mut elements = Vec::with_capacity(classes.len());
    for class in classes {
        elements.push(mirror_of(thread, class)?);
    }
    let object_array = ObjectArray {
        class: array_class,
        elements: Arc::new(parking_lot::RwLock::new(elements)),
    };
    Ok(Value::from_reference(Reference::Array(object_array)))
}

/// Build a `java.lang.Class[]` mirror array over a method's parameter (or exception)
/// field types, as `getParameterTypes`/`getDeclaredFields0`-backing natives need.
///
/// # Errors
///
/// if `java.lang.Class`'s array class cannot be loaded, or any element's mirror
/// cannot be built.
pub(crate) fn mirror_array_field_types(thread: &Thread, field_types: &[FieldType]) -> Result<Value> {
    let array_class = thread.vm().class_loader().load("[Ljava/lang/Class;")?;
    let mut elements = Vec::with_capacity(field_types.len());
    for field_type in field_types {
        elements.push(mirror_of_field_type(thread, field_type)?);
    }
    let object_array = ObjectArray {
        class: array_class,
        elements: Arc::new(parking_lot::RwLock::new(elements)),
    };
    Ok(Value::from_reference(Reference::Array(object_array)))
}
