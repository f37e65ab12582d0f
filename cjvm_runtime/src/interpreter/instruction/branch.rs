use crate::frame::Frame;
use crate::interpreter::instruction::{i16_at, i32_at};
use crate::interpreter::StepResult;
use crate::{JavaError, Result};
use std::sync::Arc;

/// Conditional and unconditional branches (JVMS §6.5 `ifeq`..`if_acmpne`, `goto`,
/// `tableswitch`, `lookupswitch`, `ifnull`/`ifnonnull`, `goto_w`), 0x99-0xab and
/// 0xc6-0xc9.
pub(super) fn handle(opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    match opcode {
        0x99 => compare_int_to_zero(frame, pc, |a| a == 0),
        0x9a => compare_int_to_zero(frame, pc, |a| a != 0),
        0x9b => compare_int_to_zero(frame, pc, |a| a < 0),
        0x9c => compare_int_to_zero(frame, pc, |a| a >= 0),
        0x9d => compare_int_to_zero(frame, pc, |a| a > 0),
        0x9e => compare_int_to_zero(frame, pc, |a| a <= 0),
        0x9f => compare_ints(frame, pc, |a, b| a == b),
        0xa0 => compare_ints(frame, pc, |a, b| a != b),
        0xa1 => compare_ints(frame, pc, |a, b| a < b),
        0xa2 => compare_ints(frame, pc, |a, b| a >= b),
        0xa3 => compare_ints(frame, pc, |a, b| a > b),
        0xa4 => compare_ints(frame, pc, |a, b| a <= b),
        0xa5 => compare_references(frame, pc, true),
        0xa6 => compare_references(frame, pc, false),
        0xa7 => {
            let offset = i16_at(frame.method().code(), pc + 1)?;
            Ok(StepResult::Continue(branch_target(pc, offset)))
        }
        0xaa => tableswitch(frame, pc),
        0xab => lookupswitch(frame, pc),
        0xc6 => compare_null(frame, pc, true),
        0xc7 => compare_null(frame, pc, false),
        0xc8 => {
            let offset = i32_at(frame.method().code(), pc + 1)?;
            Ok(StepResult::Continue(wide_branch_target(pc, offset)))
        }
        0xc9 => Err(JavaError::UnsupportedOperationException("jsr_w".to_string()).into()),
        _ => unreachable!("branch::handle called with opcode outside its dispatched ranges"),
    }
}

/// Branch offsets are relative to the address of the branching instruction itself
/// (JVMS §6.5 `goto`), not to the end of the instruction or its operands.
fn branch_target(pc: u16, offset: i16) -> u16 {
    (i32::from(pc) + i32::from(offset)) as u16
}

fn wide_branch_target(pc: u16, offset: i32) -> u16 {
    (i32::from(pc) + offset) as u16
}

fn compare_int_to_zero(frame: &mut Frame, pc: u16, test: fn(i32) -> bool) -> Result<StepResult> {
    let offset = i16_at(frame.method().code(), pc + 1)?;
    let value = frame.operand_stack_mut().pop_int()?;
    let target = if test(value) { branch_target(pc, offset) } else { pc + 3 };
    Ok(StepResult::Continue(target))
}

fn compare_ints(frame: &mut Frame, pc: u16, test: fn(i32, i32) -> bool) -> Result<StepResult> {
    let offset = i16_at(frame.method().code(), pc + 1)?;
    let b = frame.operand_stack_mut().pop_int()?;
    let a = frame.operand_stack_mut().pop_int()?;
    let target = if test(a, b) { branch_target(pc, offset) } else { pc + 3 };
    Ok(StepResult::Continue(target))
}

fn compare_references(frame: &mut Frame, pc: u16, want_equal: bool) -> Result<StepResult> {
    let offset = i16_at(frame.method().code(), pc + 1)?;
    let b = frame.operand_stack_mut().pop_object()?;
    let a = frame.operand_stack_mut().pop_object()?;
    let equal = match (&a, &b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    };
    let taken = if want_equal { equal } else { !equal };
    let target = if taken { branch_target(pc, offset) } else { pc + 3 };
    Ok(StepResult::Continue(target))
}

fn compare_null(frame: &mut Frame, pc: u16, want_null: bool) -> Result<StepResult> {
    let offset = i16_at(frame.method().code(), pc + 1)?;
    let value = frame.operand_stack_mut().pop_object()?;
    let is_null = value.is_none();
    let taken = if want_null { is_null } else { !is_null };
    let target = if taken { branch_target(pc, offset) } else { pc + 3 };
    Ok(StepResult::Continue(target))
}

/// Round `position` up to the next multiple of 4, as required before the padding-free
/// operands of `tableswitch`/`lookupswitch` (JVMS §6.5).
fn aligned(position: u16) -> u16 {
    position.div_ceil(4) * 4
}

fn tableswitch(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let code = frame.method().code();
    let operands = aligned(pc + 1);
    let default = i32_at(code, operands)?;
    let low = i32_at(code, operands + 4)?;
    let high = i32_at(code, operands + 8)?;
    let index = frame.operand_stack_mut().pop_int()?;

    let target = if index < low || index > high {
        wide_branch_target(pc, default)
    } else {
        #[allow(clippy::cast_sign_loss)]
        let slot = (index - low) as u16;
        let offset = i32_at(code, operands + 12 + slot * 4)?;
        wide_branch_target(pc, offset)
    };
    Ok(StepResult::Continue(target))
}

fn lookupswitch(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let code = frame.method().code();
    let operands = aligned(pc + 1);
    let default = i32_at(code, operands)?;
    let pair_count = i32_at(code, operands + 4)?;
    let key = frame.operand_stack_mut().pop_int()?;

    #[allow(clippy::cast_sign_loss)]
    let pair_count = pair_count as u16;
    let mut target = wide_branch_target(pc, default);
    for pair in 0..pair_count {
        let base = operands + 8 + pair * 8;
        let candidate = i32_at(code, base)?;
        if candidate == key {
            let offset = i32_at(code, base + 4)?;
            target = wide_branch_target(pc, offset);
            break;
        }
    }
    Ok(StepResult::Continue(target))
}
