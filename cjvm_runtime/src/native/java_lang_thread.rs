use super::registry::NativeRegistry;
use crate::{Result, Thread};
use cjvm_classloader::{Object, Reference, Value};

/// Every Java thread this runtime creates maps to exactly one OS thread and runs to
/// completion synchronously (see [`Thread::invoke`]); there is no thread scheduler to
/// hand a new `Thread` instance off to, so `start0` is the one native method here that
/// cannot do what its name promises. It is kept registered so a `Thread` subclass that
/// never actually calls `start()` (common in single-threaded test programs) still
/// loads and links cleanly.
pub(super) fn register(registry: &mut NativeRegistry) {
    let class_name = "java/lang/Thread";
    registry.register(class_name, "registerNatives", "()V", no_op);
    registry.register(class_name, "currentThread", "()Ljava/lang/Thread;", current_thread);
    registry.register(class_name, "setPriority0", "(I)V", no_op);
    registry.register(class_name, "isAlive", "()Z", is_alive);
    registry.register(class_name, "sleep", "(J)V", no_op);
    registry.register(class_name, "yield", "()V", no_op);
}

fn no_op(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(None)
}

/// A fresh `Thread` instance on every call, not the one identity-stable object a real
/// JVM would hand back: this runtime never allocates a `Thread` instance when a Java
/// thread starts (there is no scheduler for `start0` to hand off to), so there is
/// nothing cached here to return instead.
fn current_thread(thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    let thread_class = thread.resolve_and_init("java/lang/Thread")?;
    let instance = Object::new(thread_class)?;
    let string_class = thread.resolve_and_init("java/lang/String")?;
    let name = thread.vm().new_string(&string_class, thread.name())?;
    instance.set_field("name", name)?;
    Ok(Some(Value::from_reference(Reference::Object(instance))))
}

fn is_alive(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(Some(Value::Int(0)))
}
