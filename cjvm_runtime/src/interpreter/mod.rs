//! Fetch-decode-dispatch over raw bytecode bytes.
//!
//! `cjvm_classloader::Method::code()` hands back the method's `Code` attribute bytes
//! untouched; there is no separate decoding pass that turns them into an instruction
//! enum ahead of time; each opcode is read, dispatched, and its operands consumed
//! directly out of the byte slice as part of running it.

mod instruction;

use crate::frame::Frame;
use crate::{Error, JavaError, Result, Thread};
use cjvm_classloader::{Object, Reference, Value};
use std::sync::Arc;

/// What an instruction handler did to control flow.
pub(crate) enum StepResult {
    /// Keep executing at an explicit next program counter (usually `pc + instruction_len`,
    /// but branches set it directly).
    Continue(u16),
    /// The method returned, optionally with a value.
    Return(Option<Value>),
}

/// Run `frame` to completion, returning the method's result (or propagating a thrown
/// exception once no handler in `frame`'s method covers it).
///
/// # Errors
///
/// if an instruction is malformed, the operand stack under/overflows, or the method
/// throws and no exception table entry covers the faulting program counter.
pub(crate) fn run(thread: &Thread, frame: &mut Frame) -> Result<Option<Value>> {
    loop {
        let pc = frame.program_counter();
        match instruction::step(thread, frame) {
            Ok(StepResult::Continue(next_pc)) => frame.set_program_counter(next_pc),
            Ok(StepResult::Return(value)) => return Ok(value),
            Err(error) => {
                let Error::Java(java_error) = error else { return Err(error) };
                let exception = java_error_to_value(thread, &java_error)?;
                match find_handler(thread, frame, pc, &exception)? {
                    Some(handler_pc) => frame.unwind_to_handler(handler_pc, exception)?,
                    None => return Err(Error::Java(java_error)),
                }
            }
        }
    }
}

/// The JVMS binary name of the `Throwable` subclass each [`JavaError`] variant stands
/// for, so a caught error can be allocated as a real class-bearing instance instead of
/// a bare message.
fn java_error_class_name(java_error: &JavaError) -> &'static str {
    match java_error {
        JavaError::ClassNotFoundException(_) => "java/lang/ClassNotFoundException",
        JavaError::NoClassDefFoundError(_) => "java/lang/NoClassDefFoundError",
        JavaError::NoSuchFieldError(_) => "java/lang/NoSuchFieldError",
        JavaError::NoSuchMethodError(_) => "java/lang/NoSuchMethodError",
        JavaError::IncompatibleClassChangeError(_) => "java/lang/IncompatibleClassChangeError",
        JavaError::IllegalAccessError(_) => "java/lang/IllegalAccessError",
        JavaError::AbstractMethodError(_) => "java/lang/AbstractMethodError",
        JavaError::NullPointerException(_) => "java/lang/NullPointerException",
        JavaError::ArrayIndexOutOfBoundsException { .. } => "java/lang/ArrayIndexOutOfBoundsException",
        JavaError::ClassCastException { .. } => "java/lang/ClassCastException",
        JavaError::NegativeArraySizeException(_) => "java/lang/NegativeArraySizeException",
        JavaError::ArithmeticException => "java/lang/ArithmeticException",
        JavaError::StackOverflowError(_) => "java/lang/StackOverflowError",
        JavaError::OutOfMemoryError(_) => "java/lang/OutOfMemoryError",
        JavaError::ExceptionInInitializerError(_) => "java/lang/ExceptionInInitializerError",
        JavaError::InterruptedException(_) => "java/lang/InterruptedException",
        JavaError::UnsupportedOperationException(_) => "java/lang/UnsupportedOperationException",
        JavaError::IllegalMonitorStateException(_) => "java/lang/IllegalMonitorStateException",
        JavaError::RuntimeException(_) => "java/lang/RuntimeException",
        JavaError::UnsatisfiedLinkError(_) => "java/lang/UnsatisfiedLinkError",
    }
}

/// Represent a thrown `JavaError` as an operand-stack `Value`.
///
/// Allocates a real instance of the matching exception class with its `detailMessage`
/// field populated, so `find_handler` has a class identity to run a catch-type subtype
/// check against. No constructor runs and no stack trace is captured (see
/// `java_lang_throwable`'s natives), matching `fillInStackTrace` being a no-op.
///
/// # Errors
///
/// if the exception class (or `java.lang.String`) cannot be loaded and initialized.
fn java_error_to_value(thread: &Thread, java_error: &JavaError) -> Result<Value> {
    let class_name = java_error_class_name(java_error);
    let class = thread.resolve_and_init(class_name)?;
    let object = Object::new(class)?;

    let string_class = thread.resolve_and_init("java/lang/String")?;
    let message = thread.vm().new_string(&string_class, &java_error.to_string())?;
    let _ = object.set_field("detailMessage", message);

    Ok(Value::from_reference(Reference::Object(object)))
}

/// Search `frame`'s method's exception table for an entry covering `pc` whose
/// `catch_type` (JVMS §4.7.3), resolved against `frame`'s own constant pool, the thrown
/// exception's class is actually assignable to. A `catch_type` of 0 (`finally`, or a
/// bare `catch` with no declared type) matches unconditionally.
///
/// # Errors
///
/// if `exception` is not an object reference, or resolving a candidate `catch_type`
/// fails for a reason other than "not this one" (surfaced, rather than silently
/// skipped, since a malformed constant pool is a linkage defect).
fn find_handler(thread: &Thread, frame: &Frame, pc: u16, exception: &Value) -> Result<Option<u16>> {
    let Some(reference) = exception.as_object()? else {
        return Ok(None);
    };
    let exception_class = Arc::clone(reference.read().as_object()?.class());

    for entry in frame.method().exception_table() {
        if !entry.covers(pc) {
            continue;
        }
        if entry.is_catch_all() {
            return Ok(Some(entry.handler_pc));
        }
        let catch_class = thread.vm().class_loader().resolve_class(frame.class(), entry.catch_type)?;
        if exception_class.is_assignable_to(&catch_class)? {
            return Ok(Some(entry.handler_pc));
        }
    }
    Ok(None)
}
