use crate::frame::Frame;
use crate::interpreter::instruction::u16_at;
use crate::interpreter::StepResult;
use crate::{JavaError, Result, Thread};
use cjvm_classloader::{Class, Method, Value};
use std::sync::Arc;

/// `invokevirtual`/`invokespecial`/`invokestatic`/`invokeinterface` (JVMS §6.5,
/// 0xb6-0xb9).
pub(super) fn handle(thread: &Thread, opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let pc = frame.program_counter();
    let index = u16_at(frame.method().code(), pc + 1)?;
    let next_pc = if opcode == 0xb9 { pc + 5 } else { pc + 3 };

    let class_loader = thread.vm().class_loader();
    let (owner, resolved) = if opcode == 0xb9 {
        class_loader.resolve_interface_method(frame.class(), index)?
    } else {
        class_loader.resolve_method(frame.class(), index)?
    };

    let mut arguments = pop_arguments(frame, &resolved)?;

    let (target_class, target_method) = match opcode {
        // invokestatic: no receiver, no dispatch.
        0xb8 => (owner, resolved),
        // invokespecial: the statically resolved method, always -- used for
        // constructors, superclass calls, and private methods.
        0xb7 => (owner, resolved),
        // invokevirtual/invokeinterface: look up the override on the receiver's
        // actual runtime class.
        0xb6 | 0xb9 => {
            let receiver = arguments.first().ok_or_else(|| {
                JavaError::NullPointerException("missing receiver for invocation".to_string())
            })?;
            let runtime_class = receiver_class(receiver)?;
            let method = runtime_class.find_method(resolved.name(), resolved.descriptor())?;
            (runtime_class, method)
        }
        _ => unreachable!("invoke::handle called with opcode outside 0xb6..=0xb9"),
    };

    if opcode != 0xb8 && arguments[0].is_null() {
        return Err(JavaError::NullPointerException(format!(
            "{}.{}",
            target_method.name(),
            target_method.descriptor()
        ))
        .into());
    }

    let result = thread.invoke(&target_class, &target_method, arguments)?;
    if let Some(value) = result {
        frame.operand_stack_mut().push(value)?;
    }
    Ok(StepResult::Continue(next_pc))
}

/// Pop a method's arguments off the operand stack in descriptor order, including the
/// receiver (as argument 0) for instance methods.
fn pop_arguments(frame: &mut Frame, method: &Arc<Method>) -> Result<Vec<Value>> {
    let mut arguments = Vec::with_capacity(method.parameters().len() + 1);
    for _ in 0..method.parameters().len() {
        arguments.push(frame.operand_stack_mut().pop()?);
    }
    arguments.reverse();
    if !method.is_static() {
        let receiver = frame.operand_stack_mut().pop()?;
        arguments.insert(0, receiver);
    }
    Ok(arguments)
}

fn receiver_class(receiver: &Value) -> Result<Arc<Class>> {
    let reference = receiver
        .as_object()?
        .ok_or_else(|| JavaError::NullPointerException("null receiver".to_string()))?;
    Ok(Arc::clone(reference.read().as_object()?.class()))
}

/// `ireturn`/`lreturn`/`freturn`/`dreturn`/`areturn`/`return` (JVMS §6.5, 0xac-0xb1).
pub(super) fn handle_return(opcode: u8, frame: &mut Frame) -> Result<StepResult> {
    let value = match opcode {
        0xac => Some(Value::Int(frame.operand_stack_mut().pop_int()?)),
        0xad => Some(Value::Long(frame.operand_stack_mut().pop_long()?)),
        0xae => Some(Value::Float(frame.operand_stack_mut().pop_float()?)),
        0xaf => Some(Value::Double(frame.operand_stack_mut().pop_double()?)),
        0xb0 => Some(Value::Object(frame.operand_stack_mut().pop_object()?)),
        0xb1 => None,
        _ => unreachable!("invoke::handle_return called with opcode outside 0xac..=0xb1"),
    };
    Ok(StepResult::Return(value))
}
