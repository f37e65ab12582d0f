use super::registry::NativeRegistry;
use crate::reflection::mirror_of;
use crate::{Result, Thread};
use cjvm_classloader::Value;

pub(super) fn register(registry: &mut NativeRegistry) {
    registry.register("sun/reflect/Reflection", "getCallerClass", "()Ljava/lang/Class;", get_caller_class);
}

/// A native method implementation has no access to the interpreter's call stack (it
/// only ever sees its own arguments), so there is no frame to walk back to find the
/// real caller. Always answers `Object.class` rather than misreporting some other
/// class as the caller.
fn get_caller_class(thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    let object_class = thread.resolve_and_init("java/lang/Object")?;
    Ok(Some(mirror_of(thread, &object_class)?))
}
