use super::registry::NativeRegistry;
use crate::reflection::mirror_of;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::Value;
use std::sync::Arc;

pub(super) fn register(registry: &mut NativeRegistry) {
    registry.register("java/lang/Object", "registerNatives", "()V", no_op);
    registry.register("java/lang/Object", "hashCode", "()I", hash_code);
    registry.register("java/lang/Object", "getClass", "()Ljava/lang/Class;", get_class);
    registry.register("java/lang/Object", "notify", "()V", notify);
    registry.register("java/lang/Object", "notifyAll", "()V", notify_all);
    registry.register("java/lang/Object", "wait", "(J)V", wait);
}

fn no_op(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(None)
}

fn receiver_reference(arguments: &[Value]) -> Result<&Arc<parking_lot::RwLock<cjvm_classloader::Reference>>> {
    arguments
        .first()
        .ok_or_else(|| JavaError::NullPointerException("missing receiver".to_string()))?
        .as_object()?
        .ok_or_else(|| JavaError::NullPointerException("null receiver".to_string()).into())
}

/// A stable per-instance identity, shared with monitor ownership: the address of the
/// `Arc` every heap reference is wrapped in exactly once for its lifetime.
fn identity(reference: &Arc<parking_lot::RwLock<cjvm_classloader::Reference>>) -> usize {
    Arc::as_ptr(reference) as *const () as usize
}

fn hash_code(_thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let reference = receiver_reference(&arguments)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let hash = identity(reference) as i32;
    Ok(Some(Value::Int(hash)))
}

fn get_class(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let reference = receiver_reference(&arguments)?;
    let class_name = reference.read().class_name().to_string();
    let class = thread.vm().class_loader().load(&class_name)?;
    Ok(Some(mirror_of(thread, &class)?))
}

fn notify(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let reference = receiver_reference(&arguments)?;
    let monitor = thread.vm().monitors().monitor(identity(reference));
    monitor
        .notify_one(thread.id())
        .map_err(|_| JavaError::IllegalMonitorStateException("notify without owning the monitor".to_string()))?;
    Ok(None)
}

fn notify_all(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let reference = receiver_reference(&arguments)?;
    let monitor = thread.vm().monitors().monitor(identity(reference));
    monitor
        .notify_all(thread.id())
        .map_err(|_| JavaError::IllegalMonitorStateException("notifyAll without owning the monitor".to_string()))?;
    Ok(None)
}

fn wait(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let reference = receiver_reference(&arguments)?;
    let millis = arguments.get(1).map(Value::as_long).transpose()?.unwrap_or(0);
    let monitor = thread.vm().monitors().monitor(identity(reference));
    let owner_error =
        || JavaError::IllegalMonitorStateException("wait without owning the monitor".to_string()).into();
    if millis == 0 {
        monitor.wait(thread.id()).map_err(|_| owner_error())?;
    } else {
        #[allow(clippy::cast_sign_loss)]
        monitor
            .wait_timeout(thread.id(), std::time::Duration::from_millis(millis as u64))
            .map_err(|_| owner_error())?;
    }
    Ok(None)
}
