use super::registry::NativeRegistry;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::{Reference, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) fn register(registry: &mut NativeRegistry) {
    let class_name = "java/lang/System";
    registry.register(class_name, "registerNatives", "()V", no_op);
    registry.register(class_name, "currentTimeMillis", "()J", current_time_millis);
    registry.register(class_name, "nanoTime", "()J", nano_time);
    registry.register(
        class_name,
        "arraycopy",
        "(Ljava/lang/Object;ILjava/lang/Object;II)V",
        arraycopy,
    );
    registry.register(class_name, "identityHashCode", "(Ljava/lang/Object;)I", identity_hash_code);
    registry.register(class_name, "setIn0", "(Ljava/io/InputStream;)V", no_op);
    registry.register(class_name, "setOut0", "(Ljava/io/PrintStream;)V", no_op);
    registry.register(class_name, "setErr0", "(Ljava/io/PrintStream;)V", no_op);
}

fn no_op(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    Ok(None)
}

fn current_time_millis(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|error| JavaError::RuntimeException(error.to_string()))?;
    Ok(Some(Value::Long(i64::try_from(duration.as_millis())?)))
}

fn nano_time(_thread: &Thread, _arguments: Vec<Value>) -> Result<Option<Value>> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|error| JavaError::RuntimeException(error.to_string()))?;
    Ok(Some(Value::Long(i64::try_from(duration.as_nanos())?)))
}

fn identity_hash_code(_thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let Some(reference) = arguments[0].as_object()? else {
        return Ok(Some(Value::Int(0)));
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let hash = (std::sync::Arc::as_ptr(reference) as *const () as usize) as i32;
    Ok(Some(Value::Int(hash)))
}

/// `System.arraycopy`: both arrays must share the same underlying element kind (the
/// JDK itself enforces this with `ArrayStoreException`, not a bytecode-level check).
fn arraycopy(_thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>> {
    let source = arguments[0]
        .as_object()?
        .ok_or_else(|| JavaError::NullPointerException("arraycopy source".to_string()))?;
    let source_pos = arguments[1].as_int()?;
    let destination = arguments[2]
        .as_object()?
        .ok_or_else(|| JavaError::NullPointerException("arraycopy destination".to_string()))?;
    let destination_pos = arguments[3].as_int()?;
    let length = arguments[4].as_int()?;

    if source_pos < 0 || destination_pos < 0 || length < 0 {
        return Err(JavaError::NegativeArraySizeException("arraycopy with a negative index or length".to_string()).into());
    }
    #[allow(clippy::cast_sign_loss)]
    let (source_pos, destination_pos, length) = (source_pos as usize, destination_pos as usize, length as usize);

    // Same array: copy element-by-element through the one Reference this thread
    // already holds, so there is only ever one lock in play.
    if std::sync::Arc::ptr_eq(source, destination) {
        macro_rules! copy_within_same {
            ($cells:expr) => {{
                let mut cells = $cells.write();
                check_bounds(cells.len(), source_pos.max(destination_pos), length)?;
                cells.copy_within(source_pos..source_pos + length, destination_pos);
            }};
        }
        match &*source.read() {
            Reference::BooleanArray(cells) | Reference::ByteArray(cells) => copy_within_same!(cells),
            Reference::CharArray(cells) => copy_within_same!(cells),
            Reference::ShortArray(cells) => copy_within_same!(cells),
            Reference::IntArray(cells) => copy_within_same!(cells),
            Reference::LongArray(cells) => copy_within_same!(cells),
            Reference::FloatArray(cells) => copy_within_same!(cells),
            Reference::DoubleArray(cells) => copy_within_same!(cells),
            Reference::Array(array) => copy_within_same!(array.elements),
            Reference::Object(_) => {
                return Err(JavaError::RuntimeException("arraycopy source is not an array".to_string()).into());
            }
        }
        return Ok(None);
    }

    macro_rules! copy_across {
        ($source_cells:expr, $variant:ident, $destination_ref:expr) => {{
            let Reference::$variant(destination_cells) = &*$destination_ref else {
                return Err(JavaError::RuntimeException("arraycopy element type mismatch".to_string()).into());
            };
            let slice = {
                let source_cells = $source_cells.read();
                check_bounds(source_cells.len(), source_pos, length)?;
                source_cells[source_pos..source_pos + length].to_vec()
            };
            let mut destination_cells = destination_cells.write();
            check_bounds(destination_cells.len(), destination_pos, length)?;
            destination_cells[destination_pos..destination_pos + length].clone_from_slice(&slice);
        }};
    }

    let destination_guard = destination.read();
    match &*source.read() {
        Reference::BooleanArray(cells) => copy_across!(cells, BooleanArray, destination_guard),
        Reference::ByteArray(cells) => copy_across!(cells, ByteArray, destination_guard),
        Reference::CharArray(cells) => copy_across!(cells, CharArray, destination_guard),
        Reference::ShortArray(cells) => copy_across!(cells, ShortArray, destination_guard),
        Reference::IntArray(cells) => copy_across!(cells, IntArray, destination_guard),
        Reference::LongArray(cells) => copy_across!(cells, LongArray, destination_guard),
        Reference::FloatArray(cells) => copy_across!(cells, FloatArray, destination_guard),
        Reference::DoubleArray(cells) => copy_across!(cells, DoubleArray, destination_guard),
        Reference::Array(source_array) => {
            let Reference::Array(destination_array) = &*destination_guard else {
                return Err(JavaError::RuntimeException("arraycopy element type mismatch".to_string()).into());
            };
            let slice = {
                let elements = source_array.elements.read();
                check_bounds(elements.len(), source_pos, length)?;
                elements[source_pos..source_pos + length].to_vec()
            };
            let mut elements = destination_array.elements.write();
            check_bounds(elements.len(), destination_pos, length)?;
            elements[destination_pos..destination_pos + length].clone_from_slice(&slice);
        }
        Reference::Object(_) => {
            return Err(JavaError::RuntimeException("arraycopy source is not an array".to_string()).into());
        }
    }
    Ok(None)
}

fn check_bounds(array_len: usize, start: usize, length: usize) -> Result<()> {
    if start + length > array_len {
        #[allow(clippy::cast_possible_wrap)]
        return Err(JavaError::ArrayIndexOutOfBoundsException {
            index: (start + length) as i32,
            length: array_len,
        }
        .into());
    }
    Ok(())
}
