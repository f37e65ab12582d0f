//! One module per JVMS §6.5 instruction family. Each `handle` function reads its own
//! operand bytes directly out of the method's code array and returns the next program
//! counter (or a [`StepResult::Return`]); `step` only fetches the opcode and dispatches.
//!
//! The opcode set implemented here is representative rather than exhaustive: it covers
//! every instruction a typical `javac`-compiled method body uses, but leaves a handful
//! of rarely generated instructions (`jsr`/`ret`, `invokedynamic`) stubbed as
//! `UnsupportedOperationException` (see `DESIGN.md`).

mod array;
mod branch;
mod convert;
mod field;
mod integer;
mod invoke;
mod monitor;
mod nop;
mod object;
mod push;
mod stack;

use crate::frame::Frame;
use crate::interpreter::StepResult;
use crate::{Error, JavaError, Thread};

/// Read the big-endian `u16` operand starting at `code[index]`.
///
/// # Errors
///
/// if the two-byte operand runs past the end of `code`.
pub(super) fn u16_at(code: &[u8], index: u16) -> crate::Result<u16> {
    let position = index as usize;
    let high = *code.get(position).ok_or(Error::InvalidProgramCounter(index))?;
    let low = *code.get(position + 1).ok_or(Error::InvalidProgramCounter(index))?;
    Ok(u16::from_be_bytes([high, low]))
}

/// Read the byte operand at `code[index]`.
///
/// # Errors
///
/// if `index` runs past the end of `code`.
pub(super) fn u8_at(code: &[u8], index: u16) -> crate::Result<u8> {
    code.get(index as usize).copied().ok_or(Error::InvalidProgramCounter(index))
}

/// Read the two-byte operand at `code[index]` as a signed branch offset.
///
/// # Errors
///
/// if the two-byte operand runs past the end of `code`.
pub(super) fn i16_at(code: &[u8], index: u16) -> crate::Result<i16> {
    Ok(u16_at(code, index)? as i16)
}

/// Read the big-endian four-byte operand starting at `code[index]`, used by
/// `goto_w`/`jsr_w` and the `tableswitch`/`lookupswitch` payload.
///
/// # Errors
///
/// if the four-byte operand runs past the end of `code`.
pub(super) fn i32_at(code: &[u8], index: u16) -> crate::Result<i32> {
    let position = index as usize;
    let mut bytes = [0u8; 4];
    for (offset, byte) in bytes.iter_mut().enumerate() {
        *byte = *code
            .get(position + offset)
            .ok_or(Error::InvalidProgramCounter(index))?;
    }
    Ok(i32::from_be_bytes(bytes))
}

/// Fetch the opcode at the frame's current program counter and run its handler.
///
/// # Errors
///
/// if the opcode is unrecognized, an operand runs past the code array, or the
/// instruction itself fails (a thrown exception, an operand stack violation, ...).
pub(super) fn step(thread: &Thread, frame: &mut Frame) -> crate::Result<StepResult> {
    let opcode = frame.fetch()?;
    match opcode {
        // nop
        0x00 => nop::handle(frame),

        // push: constants, bipush/sipush, ldc family
        0x01..=0x14 => push::handle(thread, opcode, frame),

        // stack: *load, *store, array loads/stores, pop/dup/swap
        0x15..=0x56 | 0x57..=0x5f => stack::handle(opcode, frame),

        // integer/long/float/double arithmetic, shifts, bitwise, iinc, compares
        0x60..=0x84 | 0x94..=0x98 => integer::handle(opcode, frame),

        // widening/narrowing conversions
        0x85..=0x93 => convert::handle(opcode, frame),

        // conditional/unconditional branches, switches
        0x99..=0xa7 | 0xaa | 0xab => branch::handle(opcode, frame),

        // jsr/ret: unsupported, vanishingly rare in modern bytecode
        0xa8 | 0xa9 => Err(JavaError::UnsupportedOperationException("jsr/ret".to_string()).into()),

        // returns
        0xac..=0xb1 => invoke::handle_return(opcode, frame),

        // field access
        0xb2..=0xb5 => field::handle(thread, opcode, frame),

        // method invocation
        0xb6..=0xb9 => invoke::handle(thread, opcode, frame),
        0xba => Err(JavaError::UnsupportedOperationException("invokedynamic".to_string()).into()),

        // object/array allocation and type checks
        0xbb => object::handle_new(thread, frame),
        0xbc..=0xbe => array::handle(thread, opcode, frame),
        0xbf => object::handle_athrow(frame),
        0xc0 | 0xc1 => object::handle_cast_or_instanceof(thread, opcode, frame),

        // monitors
        0xc2 | 0xc3 => monitor::handle(thread, opcode, frame),

        // wide-indexed iinc/goto/jsr variants, multianewarray, ifnull/ifnonnull
        0xc4 => Err(JavaError::UnsupportedOperationException("wide".to_string()).into()),
        0xc5 => array::handle(thread, opcode, frame),
        0xc6 | 0xc7 => branch::handle(opcode, frame),
        0xc8 | 0xc9 => branch::handle(opcode, frame),

        _ => Err(Error::InternalError(format!("unimplemented opcode 0x{opcode:02x}"))),
    }
}
