use crate::frame::Frame;
use crate::interpreter::instruction::u8_at;
use crate::interpreter::StepResult;
use crate::{JavaError, Result};

/// Arithmetic (`iadd`..`dxor`, 0x60-0x83), `iinc` (0x84), and the numeric comparison
/// family (`lcmp`, `fcmpl`/`fcmpg`, `dcmpl`/`dcmpg`, 0x94-0x98).
pub(super) fn handle(opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    match opcode {
        0x60 => binary_int(frame, pc, i32::wrapping_add),
        0x61 => binary_long(frame, pc, i64::wrapping_add),
        0x62 => binary_float(frame, pc, |a, b| a + b),
        0x63 => binary_double(frame, pc, |a, b| a + b),
        0x64 => binary_int(frame, pc, i32::wrapping_sub),
        0x65 => binary_long(frame, pc, i64::wrapping_sub),
        0x66 => binary_float(frame, pc, |a, b| a - b),
        0x67 => binary_double(frame, pc, |a, b| a - b),
        0x68 => binary_int(frame, pc, i32::wrapping_mul),
        0x69 => binary_long(frame, pc, i64::wrapping_mul),
        0x6a => binary_float(frame, pc, |a, b| a * b),
        0x6b => binary_double(frame, pc, |a, b| a * b),
        0x6c => checked_binary_int(frame, pc, i32::checked_div),
        0x6d => checked_binary_long(frame, pc, i64::checked_div),
        0x6e => binary_float(frame, pc, |a, b| a / b),
        0x6f => binary_double(frame, pc, |a, b| a / b),
        0x70 => checked_binary_int(frame, pc, i32::checked_rem),
        0x71 => checked_binary_long(frame, pc, i64::checked_rem),
        0x72 => binary_float(frame, pc, |a, b| a % b),
        0x73 => binary_double(frame, pc, |a, b| a % b),
        0x74 => unary_int(frame, pc, i32::wrapping_neg),
        0x75 => unary_long(frame, pc, i64::wrapping_neg),
        0x76 => unary_float(frame, pc, |a| -a),
        0x77 => unary_double(frame, pc, |a| -a),
        0x78 => shift_int(frame, pc, |a, shift| a.wrapping_shl(shift)),
        0x79 => shift_long(frame, pc, |a, shift| a.wrapping_shl(shift)),
        0x7a => shift_int(frame, pc, |a, shift| a.wrapping_shr(shift)),
        0x7b => shift_long(frame, pc, |a, shift| a.wrapping_shr(shift)),
        0x7c => shift_int(frame, pc, |a, shift| (a as u32).wrapping_shr(shift) as i32),
        0x7d => shift_long(frame, pc, |a, shift| (a as u64).wrapping_shr(shift) as i64),
        0x7e => binary_int(frame, pc, |a, b| a & b),
        0x7f => binary_long(frame, pc, |a, b| a & b),
        0x80 => binary_int(frame, pc, |a, b| a | b),
        0x81 => binary_long(frame, pc, |a, b| a | b),
        0x82 => binary_int(frame, pc, |a, b| a ^ b),
        0x83 => binary_long(frame, pc, |a, b| a ^ b),
        0x84 => {
            let index = u16::from(u8_at(frame.method().code(), pc + 1)?);
            let delta = i32::from(u8_at(frame.method().code(), pc + 2)? as i8);
            let value = frame.locals().get_int(index)?;
            frame.locals_mut().set(index, cjvm_classloader::Value::Int(value.wrapping_add(delta)))?;
            Ok(StepResult::Continue(pc + 3))
        }
        0x94 => {
            let b = frame.operand_stack_mut().pop_long()?;
            let a = frame.operand_stack_mut().pop_long()?;
            frame.operand_stack_mut().push_int(compare(a, b))?;
            Ok(StepResult::Continue(pc + 1))
        }
        0x95 => float_compare(frame, pc, -1),
        0x96 => float_compare(frame, pc, 1),
        0x97 => double_compare(frame, pc, -1),
        0x98 => double_compare(frame, pc, 1),
        _ => unreachable!("integer::handle called with opcode outside 0x60..=0x98"),
    }
}

fn compare<T: PartialOrd>(a: T, b: T) -> i32 {
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        0
    }
}

fn binary_int(frame: &mut Frame, pc: u16, op: fn(i32, i32) -> i32) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_int()?;
    let a = frame.operand_stack_mut().pop_int()?;
    frame.operand_stack_mut().push_int(op(a, b))?;
    Ok(StepResult::Continue(pc + 1))
}

fn binary_long(frame: &mut Frame, pc: u16, op: fn(i64, i64) -> i64) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_long()?;
    let a = frame.operand_stack_mut().pop_long()?;
    frame.operand_stack_mut().push_long(op(a, b))?;
    Ok(StepResult::Continue(pc + 1))
}

fn binary_float(frame: &mut Frame, pc: u16, op: fn(f32, f32) -> f32) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_float()?;
    let a = frame.operand_stack_mut().pop_float()?;
    frame.operand_stack_mut().push_float(op(a, b))?;
    Ok(StepResult::Continue(pc + 1))
}

fn binary_double(frame: &mut Frame, pc: u16, op: fn(f64, f64) -> f64) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_double()?;
    let a = frame.operand_stack_mut().pop_double()?;
    frame.operand_stack_mut().push_double(op(a, b))?;
    Ok(StepResult::Continue(pc + 1))
}

fn checked_binary_int(frame: &mut Frame, pc: u16, op: fn(i32, i32) -> Option<i32>) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_int()?;
    let a = frame.operand_stack_mut().pop_int()?;
    let value = op(a, b).ok_or(JavaError::ArithmeticException)?;
    frame.operand_stack_mut().push_int(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn checked_binary_long(frame: &mut Frame, pc: u16, op: fn(i64, i64) -> Option<i64>) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_long()?;
    let a = frame.operand_stack_mut().pop_long()?;
    let value = op(a, b).ok_or(JavaError::ArithmeticException)?;
    frame.operand_stack_mut().push_long(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn unary_int(frame: &mut Frame, pc: u16, op: fn(i32) -> i32) -> Result<StepResult> {
    let a = frame.operand_stack_mut().pop_int()?;
    frame.operand_stack_mut().push_int(op(a))?;
    Ok(StepResult::Continue(pc + 1))
}

fn unary_long(frame: &mut Frame, pc: u16, op: fn(i64) -> i64) -> Result<StepResult> {
    let a = frame.operand_stack_mut().pop_long()?;
    frame.operand_stack_mut().push_long(op(a))?;
    Ok(StepResult::Continue(pc + 1))
}

fn unary_float(frame: &mut Frame, pc: u16, op: fn(f32) -> f32) -> Result<StepResult> {
    let a = frame.operand_stack_mut().pop_float()?;
    frame.operand_stack_mut().push_float(op(a))?;
    Ok(StepResult::Continue(pc + 1))
}

fn unary_double(frame: &mut Frame, pc: u16, op: fn(f64) -> f64) -> Result<StepResult> {
    let a = frame.operand_stack_mut().pop_double()?;
    frame.operand_stack_mut().push_double(op(a))?;
    Ok(StepResult::Continue(pc + 1))
}

/// Shift instructions only consult the low 5 bits of the shift amount (JVMS §6.5
/// `ishl` etc.).
fn shift_int(frame: &mut Frame, pc: u16, op: fn(i32, u32) -> i32) -> Result<StepResult> {
    let shift = frame.operand_stack_mut().pop_int()?;
    let a = frame.operand_stack_mut().pop_int()?;
    #[allow(clippy::cast_sign_loss)]
    let amount = (shift as u32) & 0x1f;
    frame.operand_stack_mut().push_int(op(a, amount))?;
    Ok(StepResult::Continue(pc + 1))
}

/// Long shift instructions consult the low 6 bits of the shift amount.
fn shift_long(frame: &mut Frame, pc: u16, op: fn(i64, u32) -> i64) -> Result<StepResult> {
    let shift = frame.operand_stack_mut().pop_int()?;
    let a = frame.operand_stack_mut().pop_long()?;
    #[allow(clippy::cast_sign_loss)]
    let amount = (shift as u32) & 0x3f;
    frame.operand_stack_mut().push_long(op(a, amount))?;
    Ok(StepResult::Continue(pc + 1))
}

/// `fcmpl`/`fcmpg` differ only in which value they push for an unordered (`NaN`)
/// comparison; `nan_result` carries that.
fn float_compare(frame: &mut Frame, pc: u16, nan_result: i32) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_float()?;
    let a = frame.operand_stack_mut().pop_float()?;
    let result = if a.is_nan() || b.is_nan() { nan_result } else { compare(a, b) };
    frame.operand_stack_mut().push_int(result)?;
    Ok(StepResult::Continue(pc + 1))
}

fn double_compare(frame: &mut Frame, pc: u16, nan_result: i32) -> Result<StepResult> {
    let b = frame.operand_stack_mut().pop_double()?;
    let a = frame.operand_stack_mut().pop_double()?;
    let result = if a.is_nan() || b.is_nan() { nan_result } else { compare(a, b) };
    frame.operand_stack_mut().push_int(result)?;
    Ok(StepResult::Continue(pc + 1))
}
