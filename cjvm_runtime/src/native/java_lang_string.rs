use super::registry::NativeRegistry;
use crate::error::to_classloader_error;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::Value;

pub(super) fn register(registry: &mut NativeRegistry) {
    registry.register("java/lang/String", "intern", "()Ljava/lang/String;", intern);
}

/// Read a `java.lang.String` instance's backing `char[]` field back into a Rust
/// `String`, matching the layout [`crate::VM::new_string`] writes.
pub(super) fn chars_of(string: &Value) -> Result<String> {
    let reference = string
        .as_object()?
        .ok_or_else(|| JavaError::NullPointerException("null String".to_string()))?;
    let object = reference.read().as_object()?.clone();
    let value = object.get_field("value")?;
    let char_array = value
        .as_object()?
        .ok_or_else(|| JavaError::NullPointerException("String.value was null".to_string()))?;
    let chars = char_array.read().as_char_array()?.read().clone();
    Ok(String::from_utf16_lossy(&chars))
}

fn intern(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let text = chars_of(&arguments[0])?;
    let vm = thread.vm();
    let string_class = thread.resolve_and_init("java/lang/String")?;
    let reference = vm.interned().get_or_insert(&text, |text| {
        let string = vm.new_string(&string_class, text).map_err(to_classloader_error)?;
        match string {
            Value::Object(Some(reference)) => Ok(reference),
            _ => Err(cjvm_classloader::Error::InvalidValueType("expected string object".to_string())),
        }
    })?;
    Ok(Some(Value::Object(Some(reference))))
}
