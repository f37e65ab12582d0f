use crate::frame::Frame;
use crate::interpreter::instruction::u8_at;
use crate::interpreter::StepResult;
use crate::{JavaError, Result};
use cjvm_classloader::Reference;
use parking_lot::RwLock;
use std::sync::Arc;

/// `*load`/`*store` (0x15-0x3a, plus their `_0`-`_3` shorthands 0x1a-0x4e), the array
/// element loads/stores (0x2e-0x35, 0x4f-0x56), and the stack-shuffling family
/// `pop`/`pop2`/`dup*`/`swap` (0x57-0x5f).
pub(super) fn handle(opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    match opcode {
        0x15..=0x19 => {
            let index = u16::from(u8_at(frame.method().code(), pc + 1)?);
            let value = frame.locals().get(index)?;
            frame.operand_stack_mut().push(value)?;
            Ok(StepResult::Continue(pc + 2))
        }
        0x1a..=0x2d => {
            let index = local_index_for_n(opcode);
            let value = frame.locals().get(index)?;
            frame.operand_stack_mut().push(value)?;
            Ok(StepResult::Continue(pc + 1))
        }
        0x2e => array_load_int(frame, pc),
        0x2f => array_load_long(frame, pc),
        0x30 => array_load_float(frame, pc),
        0x31 => array_load_double(frame, pc),
        0x32 => array_load_object(frame, pc),
        0x33 => array_load_byte(frame, pc),
        0x34 => array_load_char(frame, pc),
        0x35 => array_load_short(frame, pc),
        0x36..=0x3a => {
            let index = u16::from(u8_at(frame.method().code(), pc + 1)?);
            let value = frame.operand_stack_mut().pop()?;
            frame.locals_mut().set(index, value)?;
            Ok(StepResult::Continue(pc + 2))
        }
        0x3b..=0x4e => {
            let index = local_index_for_n(opcode);
            let value = frame.operand_stack_mut().pop()?;
            frame.locals_mut().set(index, value)?;
            Ok(StepResult::Continue(pc + 1))
        }
        0x4f => array_store_int(frame, pc),
        0x50 => array_store_long(frame, pc),
        0x51 => array_store_float(frame, pc),
        0x52 => array_store_double(frame, pc),
        0x53 => array_store_object(frame, pc),
        0x54 => array_store_byte(frame, pc),
        0x55 => array_store_char(frame, pc),
        0x56 => array_store_short(frame, pc),
        0x57 => {
            frame.operand_stack_mut().pop()?;
            Ok(StepResult::Continue(pc + 1))
        }
        0x58 => {
            let top = frame.operand_stack_mut().pop()?;
            if top.slot_count() == 1 {
                frame.operand_stack_mut().pop()?;
            }
            Ok(StepResult::Continue(pc + 1))
        }
        0x59 => {
            let top = frame.operand_stack().peek()?.clone();
            frame.operand_stack_mut().push(top)?;
            Ok(StepResult::Continue(pc + 1))
        }
        0x5a => {
            let v1 = frame.operand_stack_mut().pop()?;
            let v2 = frame.operand_stack_mut().pop()?;
            frame.operand_stack_mut().push(v1.clone())?;
            frame.operand_stack_mut().push(v2)?;
            frame.operand_stack_mut().push(v1)?;
            Ok(StepResult::Continue(pc + 1))
        }
        0x5b => {
            let v1 = frame.operand_stack_mut().pop()?;
            let v2 = frame.operand_stack_mut().pop()?;
            if v2.slot_count() == 2 {
                frame.operand_stack_mut().push(v1.clone())?;
                frame.operand_stack_mut().push(v2)?;
                frame.operand_stack_mut().push(v1)?;
            } else {
                let v3 = frame.operand_stack_mut().pop()?;
                frame.operand_stack_mut().push(v1.clone())?;
                frame.operand_stack_mut().push(v3)?;
                frame.operand_stack_mut().push(v2)?;
                frame.operand_stack_mut().push(v1)?;
            }
            Ok(StepResult::Continue(pc + 1))
        }
        0x5c => {
            let v1 = frame.operand_stack_mut().pop()?;
            if v1.slot_count() == 2 {
                frame.operand_stack_mut().push(v1.clone())?;
                frame.operand_stack_mut().push(v1)?;
            } else {
                let v2 = frame.operand_stack_mut().pop()?;
                frame.operand_stack_mut().push(v2.clone())?;
                frame.operand_stack_mut().push(v1.clone())?;
                frame.operand_stack_mut().push(v2)?;
                frame.operand_stack_mut().push(v1)?;
            }
            Ok(StepResult::Continue(pc + 1))
        }
        0x5d => {
            let v1 = frame.operand_stack_mut().pop()?;
            let v2 = frame.operand_stack_mut().pop()?;
            if v1.slot_count() == 2 {
                frame.operand_stack_mut().push(v1.clone())?;
                frame.operand_stack_mut().push(v2)?;
                frame.operand_stack_mut().push(v1)?;
            } else {
                let v3 = frame.operand_stack_mut().pop()?;
                frame.operand_stack_mut().push(v2.clone())?;
                frame.operand_stack_mut().push(v1.clone())?;
                frame.operand_stack_mut().push(v3)?;
                frame.operand_stack_mut().push(v2)?;
                frame.operand_stack_mut().push(v1)?;
            }
            Ok(StepResult::Continue(pc + 1))
        }
        0x5e => {
            let v1 = frame.operand_stack_mut().pop()?;
            if v1.slot_count() == 2 {
                let v2 = frame.operand_stack_mut().pop()?;
                if v2.slot_count() == 2 {
                    frame.operand_stack_mut().push(v1.clone())?;
                    frame.operand_stack_mut().push(v2)?;
                    frame.operand_stack_mut().push(v1)?;
                } else {
                    let v3 = frame.operand_stack_mut().pop()?;
                    frame.operand_stack_mut().push(v1.clone())?;
                    frame.operand_stack_mut().push(v3)?;
                    frame.operand_stack_mut().push(v2)?;
                    frame.operand_stack_mut().push(v1)?;
                }
            } else {
                let v2 = frame.operand_stack_mut().pop()?;
                let v3 = frame.operand_stack_mut().pop()?;
                if v3.slot_count() == 2 {
                    frame.operand_stack_mut().push(v2.clone())?;
                    frame.operand_stack_mut().push(v1.clone())?;
                    frame.operand_stack_mut().push(v3)?;
                    frame.operand_stack_mut().push(v2)?;
                    frame.operand_stack_mut().push(v1)?;
                } else {
                    let v4 = frame.operand_stack_mut().pop()?;
                    frame.operand_stack_mut().push(v2.clone())?;
                    frame.operand_stack_mut().push(v1.clone())?;
                    frame.operand_stack_mut().push(v4)?;
                    frame.operand_stack_mut().push(v3)?;
                    frame.operand_stack_mut().push(v2)?;
                    frame.operand_stack_mut().push(v1)?;
                }
            }
            Ok(StepResult::Continue(pc + 1))
        }
        0x5f => {
            let v1 = frame.operand_stack_mut().pop()?;
            let v2 = frame.operand_stack_mut().pop()?;
            frame.operand_stack_mut().push(v1)?;
            frame.operand_stack_mut().push(v2)?;
            Ok(StepResult::Continue(pc + 1))
        }
        _ => unreachable!("stack::handle called with opcode outside 0x15..=0x5f"),
    }
}

/// The `_0`-`_3` shorthand opcodes (`iload_0`..`aload_3`, `istore_0`..`astore_3`) each
/// encode their local slot in the opcode byte itself, four opcodes per type in a fixed
/// order (`int`, `long`, `float`, `double`, `reference`).
fn local_index_for_n(opcode: u8) -> u16 {
    u16::from(match opcode {
        0x1a..=0x1d => opcode - 0x1a,
        0x1e..=0x21 => opcode - 0x1e,
        0x22..=0x25 => opcode - 0x22,
        0x26..=0x29 => opcode - 0x26,
        0x2a..=0x2d => opcode - 0x2a,
        0x3b..=0x3e => opcode - 0x3b,
        0x3f..=0x42 => opcode - 0x3f,
        0x43..=0x46 => opcode - 0x43,
        0x47..=0x4a => opcode - 0x47,
        0x4b..=0x4e => opcode - 0x4b,
        _ => unreachable!("local_index_for_n called with an opcode outside the *_0..*_3 shorthands"),
    })
}

fn pop_array_and_index(frame: &mut Frame) -> Result<(Arc<RwLock<Reference>>, i32)> {
    let index = frame.operand_stack_mut().pop_int()?;
    let array = frame
        .operand_stack_mut()
        .pop_object()?
        .ok_or_else(|| JavaError::NullPointerException("array load/store on null".to_string()))?;
    Ok((array, index))
}

fn checked_index(length: usize, index: i32) -> Result<usize> {
    if index < 0 || index as usize >= length {
        return Err(JavaError::ArrayIndexOutOfBoundsException { index, length }.into());
    }
    Ok(index as usize)
}

fn array_load_int(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = guard.as_int_array()?.read();
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_int(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_long(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = guard.as_long_array()?.read();
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_long(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_float(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = guard.as_float_array()?.read();
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_float(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_double(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = guard.as_double_array()?.read();
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_double(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_object(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let object_array = guard.as_object_array()?;
    let elements = object_array.elements.read();
    let value = elements[checked_index(elements.len(), index)?].clone();
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push(value)?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_byte(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = match &*guard {
        Reference::ByteArray(elements) | Reference::BooleanArray(elements) => elements.read(),
        _ => return Err(cjvm_classloader::Error::InvalidValueType("expected byte/boolean array".to_string()).into()),
    };
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_int(i32::from(value))?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_char(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = guard.as_char_array()?.read();
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_int(i32::from(value))?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_load_short(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let elements = guard.as_short_array()?.read();
    let value = elements[checked_index(elements.len(), index)?];
    drop(elements);
    drop(guard);
    frame.operand_stack_mut().push_int(i32::from(value))?;
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_int(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_int()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = guard.as_int_array()?.write();
    let position = checked_index(elements.len(), index)?;
    elements[position] = value;
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_long(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_long()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = guard.as_long_array()?.write();
    let position = checked_index(elements.len(), index)?;
    elements[position] = value;
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_float(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_float()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = guard.as_float_array()?.write();
    let position = checked_index(elements.len(), index)?;
    elements[position] = value;
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_double(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_double()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = guard.as_double_array()?.write();
    let position = checked_index(elements.len(), index)?;
    elements[position] = value;
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_object(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let object_array = guard.as_object_array()?;
    let mut elements = object_array.elements.write();
    let position = checked_index(elements.len(), index)?;
    elements[position] = value;
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_byte(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_int()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = match &*guard {
        Reference::ByteArray(elements) | Reference::BooleanArray(elements) => elements.write(),
        _ => return Err(cjvm_classloader::Error::InvalidValueType("expected byte/boolean array".to_string()).into()),
    };
    let position = checked_index(elements.len(), index)?;
    #[allow(clippy::cast_possible_truncation)]
    {
        elements[position] = value as i8;
    }
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_char(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_int()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = guard.as_char_array()?.write();
    let position = checked_index(elements.len(), index)?;
    #[allow(clippy::cast_possible_truncation)]
    {
        elements[position] = value as u16;
    }
    Ok(StepResult::Continue(pc + 1))
}

fn array_store_short(frame: &mut Frame, pc: u16) -> Result<StepResult> {
    let value = frame.operand_stack_mut().pop_int()?;
    let (array, index) = pop_array_and_index(frame)?;
    let guard = array.read();
    let mut elements = guard.as_short_array()?.write();
    let position = checked_index(elements.len(), index)?;
    #[allow(clippy::cast_possible_truncation)]
    {
        elements[position] = value as i16;
    }
    Ok(StepResult::Continue(pc + 1))
}
