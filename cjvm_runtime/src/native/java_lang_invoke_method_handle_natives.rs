use super::registry::NativeRegistry;
use crate::{Result, Thread};
use cjvm_classloader::Value;

/// `invokedynamic` (JVMS §6.5 `invokedynamic`) is out of scope: this interpreter never
/// emits a `CallSite` to link against, so none of `MethodHandleNatives`' real linkage
/// machinery is reachable. `registerNatives` only exists so classes that merely
/// reference `MethodHandle`/`MethodHandles.Lookup` in their constant pool, without
/// ever executing an `invokedynamic`, still load.
pub(super) fn register(registry: &mut NativeRegistry) {
    registry.register("java/lang/invoke/MethodHandleNatives", "registerNatives", "()V", no_op);
}

fn no_op(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(None)
}
