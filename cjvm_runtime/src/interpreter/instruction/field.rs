use crate::frame::Frame;
use crate::interpreter::instruction::u16_at;
use crate::interpreter::StepResult;
use crate::{JavaError, Result, Thread};

/// `getstatic`/`putstatic`/`getfield`/`putfield` (JVMS §6.5, 0xb2-0xb5).
pub(super) fn handle(thread: &Thread, opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let index = u16_at(frame.method().code(), pc + 1)?;
    let (owner, field, _is_static) = thread.vm().class_loader().resolve_field(frame.class(), index)?;

    match opcode {
        0xb2 => {
            thread.initialize(&owner)?;
            let value = owner.static_field(field.name())?;
            frame.operand_stack_mut().push(value)?;
        }
        0xb3 => {
            thread.initialize(&owner)?;
            let value = frame.operand_stack_mut().pop()?;
            owner.set_static_field(field.name(), value)?;
        }
        0xb4 => {
            let reference = frame
                .operand_stack_mut()
                .pop_object()?
                .ok_or_else(|| JavaError::NullPointerException("getfield on null".to_string()))?;
            let value = reference.read().as_object()?.get_field(field.name())?;
            frame.operand_stack_mut().push(value)?;
        }
        0xb5 => {
            let value = frame.operand_stack_mut().pop()?;
            let reference = frame
                .operand_stack_mut()
                .pop_object()?
                .ok_or_else(|| JavaError::NullPointerException("putfield on null".to_string()))?;
            reference.read().as_object()?.set_field(field.name(), value)?;
        }
        _ => unreachable!("field::handle called with opcode outside 0xb2..=0xb5"),
    }
    Ok(StepResult::Continue(pc + 3))
}
