use crate::frame::Frame;
use crate::interpreter::instruction::{u16_at, u8_at};
use crate::interpreter::StepResult;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::{Class, ClassLoader, ObjectArray, Reference, Value};
use cjvm_classfile::{BaseType, FieldType};
use parking_lot::RwLock;
use std::sync::Arc;

/// `newarray`/`anewarray`/`arraylength` (JVMS §6.5, 0xbc-0xbe) and `multianewarray`
/// (0xc5).
pub(super) fn handle(thread: &Thread, opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    match opcode {
        0xbc => newarray(frame),
        0xbd => anewarray(thread, frame),
        0xbe => arraylength(frame),
        0xc5 => multianewarray(thread, frame),
        _ => unreachable!("array::handle called with opcode outside its dispatched set"),
    }
}

fn checked_length(length: i32) -> Result<usize> {
    if length < 0 {
        return Err(JavaError::NegativeArraySizeException(length.to_string()).into());
    }
    #[allow(clippy::cast_sign_loss)]
    Ok(length as usize)
}

/// `newarray` (0xbc): allocate a primitive array. The one-byte `atype` operand follows
/// the JVMS §6.5 table (4=boolean .. 11=long).
fn newarray(frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let atype = u8_at(frame.method().code(), pc + 1)?;
    let length = checked_length(frame.operand_stack_mut().pop_int()?)?;

    let reference = match atype {
        4 => Reference::BooleanArray(Arc::new(RwLock::new(vec![0i8; length]))),
        5 => Reference::CharArray(Arc::new(RwLock::new(vec![0u16; length]))),
        6 => Reference::FloatArray(Arc::new(RwLock::new(vec![0f32; length]))),
        7 => Reference::DoubleArray(Arc::new(RwLock::new(vec![0f64; length]))),
        8 => Reference::ByteArray(Arc::new(RwLock::new(vec![0i8; length]))),
        9 => Reference::ShortArray(Arc::new(RwLock::new(vec![0i16; length]))),
        10 => Reference::IntArray(Arc::new(RwLock::new(vec![0i32; length]))),
        11 => Reference::LongArray(Arc::new(RwLock::new(vec![0i64; length]))),
        _ => return Err(crate::Error::InternalError(format!("invalid newarray atype {atype}"))),
    };
    frame.operand_stack_mut().push(Value::from_reference(reference))?;
    Ok(StepResult::Continue(pc + 2))
}

/// `anewarray` (0xbd): allocate a reference-type array over the resolved component
/// class.
fn anewarray(thread: &Thread, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let index = u16_at(frame.method().code(), pc + 1)?;
    let component = thread.vm().class_loader().resolve_class(frame.class(), index)?;
    let array_class = thread
        .vm()
        .class_loader()
        .load(&format!("[L{};", component.name()))?;
    let length = checked_length(frame.operand_stack_mut().pop_int()?)?;
    let object_array = ObjectArray::new(array_class, length);
    frame
        .operand_stack_mut()
        .push(Value::from_reference(Reference::Array(object_array)))?;
    Ok(StepResult::Continue(pc + 3))
}

/// `arraylength` (0xbe).
fn arraylength(frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let reference = frame
        .operand_stack_mut()
        .pop_object()?
        .ok_or_else(|| JavaError::NullPointerException("arraylength on null".to_string()))?;
    #[allow(clippy::cast_possible_wrap)]
    let length = reference.read().array_length() as i32;
    frame.operand_stack_mut().push_int(length)?;
    Ok(StepResult::Continue(pc + 1))
}

/// `multianewarray` (0xc5): allocate an array of `dimensions` explicit dimensions,
/// recursing one level per given count. Dimensions beyond `dimensions` (implied by the
/// resolved array class's own rank) are left unallocated, `null`, matching JVMS §6.5.
fn multianewarray(thread: &Thread, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let index = u16_at(frame.method().code(), pc + 1)?;
    let dimensions = u8_at(frame.method().code(), pc + 3)?;
    let array_class = thread.vm().class_loader().resolve_class(frame.class(), index)?;

    let mut counts = Vec::with_capacity(dimensions as usize);
    for _ in 0..dimensions {
        counts.push(frame.operand_stack_mut().pop_int()?);
    }
    counts.reverse();

    let class_loader = thread.vm().class_loader();
    let value = allocate_dimension(class_loader, &array_class, &counts)?;
    frame.operand_stack_mut().push(value)?;
    Ok(StepResult::Continue(pc + 4))
}

fn allocate_dimension(class_loader: &Arc<ClassLoader>, array_class: &Arc<Class>, counts: &[i32]) -> Result<Value> {
    let length = checked_length(counts[0])?;
    if counts.len() == 1 {
        return allocate_single(array_class, length);
    }
    let component_name = &array_class.name()[1..];
    let component_class = class_loader.load(component_name)?;
    let mut elements = Vec::with_capacity(length);
    for _ in 0..length {
        elements.push(allocate_dimension(class_loader, &component_class, &counts[1..])?);
    }
    let object_array = ObjectArray {
        class: Arc::clone(array_class),
        elements: Arc::new(RwLock::new(elements)),
    };
    Ok(Value::from_reference(Reference::Array(object_array)))
}

fn allocate_single(array_class: &Arc<Class>, length: usize) -> Result<Value> {
    let reference = match array_class.array_component() {
        Some(FieldType::Base(BaseType::Boolean)) => Reference::BooleanArray(Arc::new(RwLock::new(vec![0; length]))),
        Some(FieldType::Base(BaseType::Byte)) => Reference::ByteArray(Arc::new(RwLock::new(vec![0; length]))),
        Some(FieldType::Base(BaseType::Char)) => Reference::CharArray(Arc::new(RwLock::new(vec![0; length]))),
        Some(FieldType::Base(BaseType::Short)) => Reference::ShortArray(Arc::new(RwLock::new(vec![0; length]))),
        Some(FieldType::Base(BaseType::Int)) => Reference::IntArray(Arc::new(RwLock::new(vec![0; length]))),
        Some(FieldType::Base(BaseType::Long)) => Reference::LongArray(Arc::new(RwLock::new(vec![0; length]))),
        Some(FieldType::Base(BaseType::Float)) => Reference::FloatArray(Arc::new(RwLock::new(vec![0.0; length]))),
        Some(FieldType::Base(BaseType::Double)) => Reference::DoubleArray(Arc::new(RwLock::new(vec![0.0; length]))),
        Some(FieldType::Object(_) | FieldType::Array(_)) | None => {
            Reference::Array(ObjectArray::new(Arc::clone(array_class), length))
        }
    };
    Ok(Value::from_reference(reference))
}
