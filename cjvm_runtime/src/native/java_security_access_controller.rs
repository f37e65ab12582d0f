use super::registry::NativeRegistry;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::Value;

pub(super) fn register(registry: &mut NativeRegistry) {
    let class_name = "java/security/AccessController";
    registry.register(
        class_name,
        "doPrivileged",
        "(Ljava/security/PrivilegedAction;)Ljava/lang/Object;",
        do_privileged,
    );
    registry.register(
        class_name,
        "doPrivileged",
        "(Ljava/security/PrivilegedExceptionAction;)Ljava/lang/Object;",
        do_privileged,
    );
    registry.register(class_name, "getStackAccessControlContext", "()Ljava/security/AccessControlContext;", no_context);
}

/// No security manager or permission model is enforced (JVMS has nothing to say about
/// either; they are a `java.security` library concern). `doPrivileged` just invokes
/// the action's `run()` directly, same as running with every permission already
/// granted.
fn do_privileged(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let action = arguments.into_iter().next().ok_or_else(|| {
        JavaError::NullPointerException("doPrivileged with no action".to_string())
    })?;
    let reference = action
        .as_object()?
        .cloned()
        .ok_or_else(|| JavaError::NullPointerException("doPrivileged(null)".to_string()))?;
    let class = reference.read().as_object()?.class().clone();
    let method = class.find_method("run", "()Ljava/lang/Object;")?;
    thread.invoke(&class, &method, vec![action])
}

fn no_context(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(Some(Value::null()))
}
