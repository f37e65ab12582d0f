use crate::frame::Frame;
use crate::interpreter::instruction::u16_at;
use crate::interpreter::StepResult;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::{Class, Object, Reference, Value};
use std::sync::Arc;

/// `new` (JVMS §6.5, 0xbb): allocate an instance with every field at its default
/// value. No constructor runs here -- `invokespecial` on `<init>` is a separate,
/// explicit bytecode the compiler always emits right after.
pub(super) fn handle_new(thread: &Thread, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let index = u16_at(frame.method().code(), pc + 1)?;
    let class = thread.vm().class_loader().resolve_class(frame.class(), index)?;
    thread.initialize(&class)?;
    let object = Object::new(class)?;
    frame
        .operand_stack_mut()
        .push(Value::from_reference(Reference::Object(object)))?;
    Ok(StepResult::Continue(pc + 3))
}

/// `athrow` (JVMS §6.5, 0xbf): hand the popped exception reference to the interpreter's
/// handler search by surfacing it as a `JavaError`.
///
/// A faithful implementation would unwind carrying the thrown object itself; until the
/// exception class hierarchy is modeled (see `DESIGN.md`), only its runtime class name
/// survives the trip through `crate::Error`.
pub(super) fn handle_athrow(frame: &mut Frame) -> Result<StepResult> {
    let reference = frame
        .operand_stack_mut()
        .pop_object()?
        .ok_or_else(|| JavaError::NullPointerException("athrow on null".to_string()))?;
    let class_name = reference.read().class_name().to_string();
    Err(JavaError::RuntimeException(class_name).into())
}

/// `checkcast`/`instanceof` (JVMS §6.5, 0xc0/0xc1).
pub(super) fn handle_cast_or_instanceof(thread: &Thread, opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let index = u16_at(frame.method().code(), pc + 1)?;
    let target = thread.vm().class_loader().resolve_class(frame.class(), index)?;

    match opcode {
        0xc0 => {
            let value = frame.operand_stack_mut().pop_object()?;
            if let Some(reference) = &value {
                if !is_instance(&reference.read(), &target)? {
                    return Err(JavaError::ClassCastException {
                        from: reference.read().class_name().to_string(),
                        to: target.name().to_string(),
                    }
                    .into());
                }
            }
            frame.operand_stack_mut().push_object(value)?;
        }
        0xc1 => {
            let value = frame.operand_stack_mut().pop_object()?;
            let result = match &value {
                Some(reference) => i32::from(is_instance(&reference.read(), &target)?),
                None => 0,
            };
            frame.operand_stack_mut().push_int(result)?;
        }
        _ => unreachable!("object::handle_cast_or_instanceof called with opcode outside 0xc0..=0xc1"),
    }
    Ok(StepResult::Continue(pc + 3))
}

/// Reference-type assignability (JVMS §2.4.7). Array covariance against interfaces
/// (`Cloneable`, `java.io.Serializable`) is not modeled; arrays are only recognized as
/// assignable to their own exact class and to `java.lang.Object` (see `DESIGN.md`).
fn is_instance(reference: &Reference, target: &Arc<Class>) -> Result<bool> {
    match reference {
        Reference::Object(object) => Ok(object.is_instance_of(target)?),
        _ => Ok(target.name() == reference.class_name() || target.name() == "java/lang/Object"),
    }
}
