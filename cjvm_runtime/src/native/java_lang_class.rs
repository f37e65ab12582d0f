use super::java_lang_string::chars_of;
use super::registry::NativeRegistry;
use crate::reflection::{class_of_mirror, mirror_array, mirror_array_field_types, mirror_of, mirror_of_field_type};
use crate::{JavaError, Result, Thread};
use cjvm_classloader::{Class, Method as RuntimeMethod, Object, ObjectArray, Reference, Value};
use cjvm_classfile::{FieldAccessFlags, MethodAccessFlags};
use std::sync::Arc;

pub(super) fn register(registry: &mut NativeRegistry) {
    registry.register("java/lang/Class", "registerNatives", "()V", no_op);
    registry.register("java/lang/Class", "getName0", "()Ljava/lang/String;", get_name0);
    registry.register("java/lang/Class", "isInstance", "(Ljava/lang/Object;)Z", is_instance);
    registry.register(
        "java/lang/Class",
        "isAssignableFrom",
        "(Ljava/lang/Class;)Z",
        is_assignable_from,
    );
    registry.register("java/lang/Class", "isInterface", "()Z", is_interface);
    registry.register("java/lang/Class", "isArray", "()Z", is_array);
    registry.register("java/lang/Class", "isPrimitive", "()Z", is_primitive);
    registry.register("java/lang/Class", "getSuperclass", "()Ljava/lang/Class;", get_superclass);
    registry.register("java/lang/Class", "getModifiers", "()I", get_modifiers);
    registry.register(
        "java/lang/Class",
        "desiredAssertionStatus0",
        "(Ljava/lang/Class;)Z",
        desired_assertion_status0,
    );
    registry.register(
        "java/lang/Class",
        "forName0",
        "(Ljava/lang/String;ZLjava/lang/ClassLoader;Ljava/lang/Class;)Ljava/lang/Class;",
        for_name0,
    );
    registry.register(
        "java/lang/Class",
        "getPrimitiveClass",
        "(Ljava/lang/String;)Ljava/lang/Class;",
        get_primitive_class,
    );
    registry.register("java/lang/Class", "getInterfaces0", "()[Ljava/lang/Class;", get_interfaces0);
    registry.register("java/lang/Class", "getComponentType", "()Ljava/lang/Class;", get_component_type);
    registry.register(
        "java/lang/Class",
        "getDeclaredFields0",
        "(Z)[Ljava/lang/reflect/Field;",
        get_declared_fields0,
    );
    registry.register(
        "java/lang/Class",
        "getDeclaredMethods0",
        "(Z)[Ljava/lang/reflect/Method;",
        get_declared_methods0,
    );
    registry.register(
        "java/lang/Class",
        "getDeclaredConstructors0",
        "(Z)[Ljava/lang/reflect/Constructor;",
        get_declared_constructors0,
    );
    registry.register(
        "java/lang/Class",
        "getDeclaringClass0",
        "()Ljava/lang/Class;",
        get_declaring_class0,
    );
}

fn no_op(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(None)
}

fn get_name0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    let name = if class.is_array() || class.is_primitive() {
        class.name().to_string()
    } else {
        class.name().replace('/', ".")
    };
    let string_class = thread.resolve_and_init("java/lang/String")?;
    Ok(Some(thread.vm().new_string(&string_class, &name)?))
}

fn is_instance(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    let Some(reference) = arguments[1].as_object()? else {
        return Ok(Some(Value::Int(0)));
    };
    let matches = match &*reference.read() {
        cjvm_classloader::Reference::Object(object) => object.is_instance_of(&class)?,
        other => other.class_name() == class.name() || class.name() == "java/lang/Object",
    };
    Ok(Some(Value::Int(i32::from(matches))))
}

fn is_assignable_from(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let target = class_of_mirror(thread, &arguments[0])?;
    let source = class_of_mirror(thread, &arguments[1])?;
    let assignable = source.is_assignable_to(&target)?;
    Ok(Some(Value::Int(i32::from(assignable))))
}

fn is_interface(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    Ok(Some(Value::Int(i32::from(class.is_interface()))))
}

fn is_array(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    Ok(Some(Value::Int(i32::from(class.is_array()))))
}

fn is_primitive(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    Ok(Some(Value::Int(i32::from(class.is_primitive()))))
}

fn get_superclass(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    match class.super_class() {
        Some(super_class) => Ok(Some(mirror_of(thread, &super_class)?)),
        None => Ok(Some(Value::null())),
    }
}

fn get_modifiers(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    #[allow(clippy::cast_possible_wrap)]
    let modifiers = class.access_flags().bits() as i32;
    Ok(Some(Value::Int(modifiers)))
}

fn desired_assertion_status0(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(Some(Value::Int(0)))
}

/// `Class.forName(String, boolean, ClassLoader)`'s native half: load (optionally
/// initializing) the named class through the bootstrap loader. The `loader` and
/// `caller` arguments are accepted but unused -- this runtime has exactly one loader.
fn for_name0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let name = chars_of(&arguments[0])?.replace('.', "/");
    let initialize = arguments[1].as_int()? != 0;
    let class_loader = thread.vm().class_loader();
    let class = class_loader.load(&name).map_err(|error| match error {
        cjvm_classloader::Error::ClassNotFound(name) => JavaError::ClassNotFoundException(name).into(),
        other => other.into(),
    })?;
    if initialize {
        thread.initialize(&class)?;
    }
    Ok(Some(mirror_of(thread, &class)?))
}

/// `Class.getPrimitiveClass(String)`: the bootstrap loader synthesizes a primitive
/// descriptor for the 8 primitive names plus `void` instead of consulting the class
/// path (see `ClassLoader::load`).
fn get_primitive_class(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let name = chars_of(&arguments[0])?;
    let class = thread.vm().class_loader().load(&name)?;
    Ok(Some(mirror_of(thread, &class)?))
}

fn get_interfaces0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    Ok(Some(mirror_array(thread, &class.interfaces())?))
}

fn get_component_type(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    match class.array_component() {
        Some(component) => Ok(Some(mirror_of_field_type(thread, component)?)),
        None => Ok(Some(Value::null())),
    }
}

/// For a binary name `Outer$Inner`, the declaring class is whatever precedes the last
/// `$`; a name with no `$` declares nothing (JVMS has no concept of nesting beyond this
/// naming convention, which `javac` itself relies on).
fn get_declaring_class0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    match class.name().rfind('$') {
        Some(index) => {
            let outer_name = class.name()[..index].to_string();
            let outer = thread.vm().class_loader().load(&outer_name)?;
            Ok(Some(mirror_of(thread, &outer)?))
        }
        None => Ok(Some(Value::null())),
    }
}

fn get_declared_fields0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    let public_only = arguments[1].as_int()? != 0;
    let array_class = thread.vm().class_loader().load("[Ljava/lang/reflect/Field;")?;

    let mut elements = Vec::new();
    for field in class.declared_instance_fields().iter().chain(class.declared_static_fields()) {
        if public_only && !field.access_flags().contains(FieldAccessFlags::PUBLIC) {
            continue;
        }
        elements.push(build_field_mirror(thread, &class, field)?);
    }
    Ok(Some(Value::from_reference(Reference::Array(ObjectArray {
        class: array_class,
        elements: Arc::new(parking_lot::RwLock::new(elements)),
    }))))
}

fn get_declared_methods0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    let public_only = arguments[1].as_int()? != 0;
    let array_class = thread.vm().class_loader().load("[Ljava/lang/reflect/Method;")?;

    let mut elements = Vec::new();
    for method in class.declared_methods() {
        if method.name() == "<init>" || method.name() == "<clinit>" {
            continue;
        }
        if public_only && !method.access_flags().contains(MethodAccessFlags::PUBLIC) {
            continue;
        }
        elements.push(build_method_mirror(thread, &class, method)?);
    }
    Ok(Some(Value::from_reference(Reference::Array(ObjectArray {
        class: array_class,
        elements: Arc::new(parking_lot::RwLock::new(elements)),
    }))))
}

fn get_declared_constructors0(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let class = class_of_mirror(thread, &arguments[0])?;
    let public_only = arguments[1].as_int()? != 0;
    let array_class = thread.vm().class_loader().load("[Ljava/lang/reflect/Constructor;")?;

    let mut elements = Vec::new();
    for method in class.declared_methods() {
        if method.name() != "<init>" {
            continue;
        }
        if public_only && !method.access_flags().contains(MethodAccessFlags::PUBLIC) {
            continue;
        }
        elements.push(build_constructor_mirror(thread, &class, method)?);
    }
    Ok(Some(Value::from_reference(Reference::Array(ObjectArray {
        class: array_class,
        elements: Arc::new(parking_lot::RwLock::new(elements)),
    }))))
}

/// Build a `java.lang.reflect.Field` mirror directly, the same way [`mirror_of`]
/// builds a `java.lang.Class` mirror: no constructor runs, the handful of fields
/// reflection actually reads (`clazz`, `name`, `type`, `modifiers`, `slot`) are set
/// straight into the new instance's slots.
fn build_field_mirror(thread: &Thread, owner: &Arc<Class>, field: &cjvm_classloader::Field) -> Result<Value> {
    let field_class = thread.resolve_and_init("java/lang/reflect/Field")?;
    let object = Object::new(field_class)?;
    let _ = object.set_field("clazz", mirror_of(thread, owner)?);
    let string_class = thread.resolve_and_init("java/lang/String")?;
    let _ = object.set_field("name", thread.vm().new_string(&string_class, field.name())?);
    let _ = object.set_field("type", mirror_of_field_type(thread, field.field_type())?);
    #[allow(clippy::cast_possible_wrap)]
    let modifiers = field.access_flags().bits() as i32;
    let _ = object.set_field("modifiers", Value::Int(modifiers));
    let _ = object.set_field("slot", Value::Int(i32::from(field.slot())));
    Ok(Value::from_reference(Reference::Object(object)))
}

fn build_method_mirror(thread: &Thread, owner: &Arc<Class>, method: &RuntimeMethod) -> Result<Value> {
    let method_class = thread.resolve_and_init("java/lang/reflect/Method")?;
    let object = Object::new(method_class)?;
    let _ = object.set_field("clazz", mirror_of(thread, owner)?);
    let string_class = thread.resolve_and_init("java/lang/String")?;
    let _ = object.set_field("name", thread.vm().new_string(&string_class, method.name())?);
    let _ = object.set_field("parameterTypes", mirror_array_field_types(thread, method.parameters())?);
    let return_mirror = match method.return_type() {
        Some(field_type) => mirror_of_field_type(thread, field_type)?,
        None => mirror_of(thread, &thread.vm().class_loader().load("void")?)?,
    };
    let _ = object.set_field("returnType", return_mirror);
    #[allow(clippy::cast_possible_wrap)]
    let modifiers = method.access_flags().bits() as i32;
    let _ = object.set_field("modifiers", Value::Int(modifiers));
    Ok(Value::from_reference(Reference::Object(object)))
}

fn build_constructor_mirror(thread: &Thread, owner: &Arc<Class>, method: &RuntimeMethod) -> Result<Value> {
    let constructor_class = thread.resolve_and_init("java/lang/reflect/Constructor")?;
    let object = Object::new(constructor_class)?;
    let _ = object.set_field("clazz", mirror_of(thread, owner)?);
    let _ = object.set_field("parameterTypes", mirror_array_field_types(thread, method.parameters())?);
    #[allow(clippy::cast_possible_wrap)]
    let modifiers = method.access_flags().bits() as i32;
    let _ = object.set_field("modifiers", Value::Int(modifiers));
    Ok(Value::from_reference(Reference::Object(object)))
}
