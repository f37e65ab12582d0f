use crate::frame::Frame;
use crate::interpreter::StepResult;
use crate::Result;

/// `nop` (0x00): advance the program counter, nothing else.
pub(super) fn handle(frame: &Frame) -> Result<StepResult> {
    Ok(StepResult::Continue(frame.program_counter() + 1))
}
