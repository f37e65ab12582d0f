use crate::frame::Frame;
use crate::interpreter::StepResult;
use crate::Result;

/// Widening and narrowing numeric conversions (JVMS §6.5 `i2l`..`i2s`, 0x85-0x93).
pub(super) fn handle(opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let stack = frame.operand_stack_mut();
    match opcode {
        0x85 => {
            let value = stack.pop_int()?;
            stack.push_long(i64::from(value))?;
        }
        0x86 => {
            let value = stack.pop_int()?;
            #[allow(clippy::cast_precision_loss)]
            stack.push_float(value as f32)?;
        }
        0x87 => {
            let value = stack.pop_int()?;
            stack.push_double(f64::from(value))?;
        }
        0x88 => {
            let value = stack.pop_long()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_int(value as i32)?;
        }
        0x89 => {
            let value = stack.pop_long()?;
            #[allow(clippy::cast_precision_loss)]
            stack.push_float(value as f32)?;
        }
        0x8a => {
            let value = stack.pop_long()?;
            #[allow(clippy::cast_precision_loss)]
            stack.push_double(value as f64)?;
        }
        0x8b => {
            let value = stack.pop_float()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_int(value as i32)?;
        }
        0x8c => {
            let value = stack.pop_float()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_long(value as i64)?;
        }
        0x8d => {
            let value = stack.pop_float()?;
            stack.push_double(f64::from(value))?;
        }
        0x8e => {
            let value = stack.pop_double()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_int(value as i32)?;
        }
        0x8f => {
            let value = stack.pop_double()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_long(value as i64)?;
        }
        0x90 => {
            let value = stack.pop_double()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_float(value as f32)?;
        }
        0x91 => {
            let value = stack.pop_int()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_int(i32::from(value as i8))?;
        }
        0x92 => {
            let value = stack.pop_int()?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            stack.push_int(i32::from(value as u16))?;
        }
        0x93 => {
            let value = stack.pop_int()?;
            #[allow(clippy::cast_possible_truncation)]
            stack.push_int(i32::from(value as i16))?;
        }
        _ => unreachable!("convert::handle called with opcode outside 0x85..=0x93"),
    }
    Ok(StepResult::Continue(pc + 1))
}
