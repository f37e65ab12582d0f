use crate::frame::Frame;
use crate::interpreter::instruction::{u16_at, u8_at};
use crate::interpreter::StepResult;
use crate::{reflection, JavaError, Result, Thread};
use cjvm_classfile::Constant;
use cjvm_classloader::Value;

/// `aconst_null`..`ldc2_w` (0x01-0x14): push a literal onto the operand stack.
pub(super) fn handle(thread: &Thread, opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let (value, len) = match opcode {
        0x01 => (Value::null(), 1),
        0x02 => (Value::Int(-1), 1),
        0x03..=0x08 => (Value::Int(i32::from(opcode) - 0x03), 1),
        0x09 => (Value::Long(0), 1),
        0x0a => (Value::Long(1), 1),
        0x0b => (Value::Float(0.0), 1),
        0x0c => (Value::Float(1.0), 1),
        0x0d => (Value::Float(2.0), 1),
        0x0e => (Value::Double(0.0), 1),
        0x0f => (Value::Double(1.0), 1),
        0x10 => {
            let byte = u8_at(frame.method().code(), pc + 1)? as i8;
            (Value::Int(i32::from(byte)), 2)
        }
        0x11 => {
            let short = u16_at(frame.method().code(), pc + 1)? as i16;
            (Value::Int(i32::from(short)), 3)
        }
        0x12 => {
            let index = u16::from(u8_at(frame.method().code(), pc + 1)?);
            (load_constant(thread, frame, index)?, 2)
        }
        0x13 => {
            let index = u16_at(frame.method().code(), pc + 1)?;
            (load_constant(thread, frame, index)?, 3)
        }
        0x14 => {
            let index = u16_at(frame.method().code(), pc + 1)?;
            (load_constant(thread, frame, index)?, 3)
        }
        _ => unreachable!("push::handle called with opcode outside 0x01..=0x14"),
    };
    frame.operand_stack_mut().push(value)?;
    Ok(StepResult::Continue(pc + len))
}

fn load_constant(thread: &Thread, frame: &Frame, index: u16) -> Result<Value> {
    let class = frame.class();
    let Some(class_file) = class.class_file() else {
        return Err(JavaError::RuntimeException("ldc outside a classfile-backed class".to_string()).into());
    };
    match class_file.constant_pool.get(index)? {
        Constant::Integer(value) => Ok(Value::Int(*value)),
        Constant::Float(value) => Ok(Value::Float(*value)),
        Constant::Long(value) => Ok(Value::Long(*value)),
        Constant::Double(value) => Ok(Value::Double(*value)),
        Constant::String(_) => {
            let vm = thread.vm();
            let string_class = thread.resolve_and_init("java/lang/String")?;
            let reference = vm.class_loader().resolve_string(class, index, |text| {
                vm.interned().get_or_insert(text, |text| {
                    let string = vm
                        .new_string(&string_class, text)
                        .map_err(crate::error::to_classloader_error)?;
                    match string {
                        Value::Object(Some(reference)) => Ok(reference),
                        _ => Err(cjvm_classloader::Error::InvalidValueType(
                            "expected string object".to_string(),
                        )),
                    }
                })
            })?;
            Ok(Value::Object(Some(reference)))
        }
        Constant::Class(_) => {
            let resolved = vm_resolve_class(thread, class, index)?;
            reflection::mirror_of(thread, &resolved)
        }
        _ => Err(JavaError::UnsupportedOperationException(
            "ldc of MethodHandle/MethodType constants".to_string(),
        )
        .into()),
    }
}

fn vm_resolve_class(
    thread: &Thread,
    class: &std::sync::Arc<cjvm_classloader::Class>,
    index: u16,
) -> Result<std::sync::Arc<cjvm_classloader::Class>> {
    Ok(thread.vm().class_loader().resolve_class(class, index)?)
}
