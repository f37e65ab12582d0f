use super::registry::NativeRegistry;
use crate::{Result, Thread};
use cjvm_classloader::Value;

/// Stack traces are not modeled: thrown conditions are allocated as real `Throwable`
/// instances with a populated `detailMessage` but no captured call stack, so these
/// natives have nothing to fill in and exist only so `Throwable`'s constructors link
/// without an `UnsatisfiedLinkError`.
pub(super) fn register(registry: &mut NativeRegistry) {
    let class_name = "java/lang/Throwable";
    registry.register(class_name, "fillInStackTrace", "(I)Ljava/lang/Throwable;", fill_in_stack_trace);
    registry.register(class_name, "getStackTraceDepth", "()I", get_stack_trace_depth);
    registry.register(
        class_name,
        "getStackTraceElement",
        "(I)Ljava/lang/StackTraceElement;",
        get_stack_trace_element,
    );
}

fn fill_in_stack_trace(_thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(arguments.into_iter().next())
}

fn get_stack_trace_depth(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(Some(Value::Int(0)))
}

fn get_stack_trace_element(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(Some(Value::null()))
}
