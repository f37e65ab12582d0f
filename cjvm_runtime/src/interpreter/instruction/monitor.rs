use crate::frame::Frame;
use crate::interpreter::StepResult;
use crate::{JavaError, Result, Thread};
use std::sync::Arc;

/// `monitorenter`/`monitorexit` (JVMS §6.5, 0xc2/0xc3).
pub(super) fn handle(thread: &Thread, opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let reference = frame
        .operand_stack_mut()
        .pop_object()?
        .ok_or_else(|| JavaError::NullPointerException("monitor operation on null".to_string()))?;

    let object_id = Arc::as_ptr(&reference) as *const () as usize;
    let monitor = thread.vm().monitors().monitor(object_id);

    match opcode {
        0xc2 => monitor.enter(thread.id()),
        0xc3 => monitor.exit(thread.id()).map_err(|_| {
            JavaError::IllegalMonitorStateException(
                "current thread does not own this object's monitor".to_string(),
            )
        })?,
        _ => unreachable!("monitor::handle called with opcode outside 0xc2..=0xc3"),
    }
    Ok(StepResult::Continue(pc + 1))
}
