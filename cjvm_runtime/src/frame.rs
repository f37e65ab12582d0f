use crate::local_variables::LocalVariables;
use crate::operand_stack::OperandStack;
use crate::{Error, Result};
use cjvm_classloader::{Class, Method, Value};
use std::sync::Arc;

/// One activation record (JVMS §2.6): the method being run, its local variables and
/// operand stack, and the program counter into its bytecode.
///
/// Unlike the class/object model a frame is never shared: it lives on exactly one
/// Java thread's call stack for exactly the duration of one invocation, so it carries
/// no internal locking.
#[derive(Debug)]
pub struct Frame {
    class: Arc<Class>,
    method: Arc<Method>,
    locals: LocalVariables,
    operand_stack: OperandStack,
    program_counter: u16,
}

impl Frame {
    /// Build a frame for `method`, seeding its local variables from `arguments` in
    /// descriptor order (receiver first, for instance methods; JVMS §2.6.1).
    ///
    /// # Errors
    ///
    /// if `arguments` carries more slots than `method.max_locals()` allows.
    pub fn new(class: Arc<Class>, method: Arc<Method>, arguments: Vec<Value>) -> Result<Self> {
        let mut locals = LocalVariables::with_max_locals(method.max_locals());
        let mut slot = 0u16;
        for argument in arguments {
            let width = argument.slot_count();
            locals.set(slot, argument)?;
            #[allow(clippy::cast_possible_truncation)]
            {
                slot += width as u16;
            }
        }
        let operand_stack = OperandStack::with_max_stack(method.max_stack());
        Ok(Frame {
            class,
            method,
            locals,
            operand_stack,
            program_counter: 0,
        })
    }

    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    #[must_use]
    pub fn method(&self) -> &Arc<Method> {
        &self.method
    }

    #[must_use]
    pub fn locals(&self) -> &LocalVariables {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut LocalVariables {
        &mut self.locals
    }

    #[must_use]
    pub fn operand_stack(&self) -> &OperandStack {
        &self.operand_stack
    }

    pub fn operand_stack_mut(&mut self) -> &mut OperandStack {
        &mut self.operand_stack
    }

    #[must_use]
    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, pc: u16) {
        self.program_counter = pc;
    }

    /// Read the code byte at the current program counter without advancing it.
    ///
    /// # Errors
    ///
    /// if the program counter has fallen outside the method's code array.
    pub fn fetch(&self) -> Result<u8> {
        self.method
            .code()
            .get(self.program_counter as usize)
            .copied()
            .ok_or(Error::InvalidProgramCounter(self.program_counter))
    }

    /// Clear the operand stack and jump to a handler's start, as exception unwinding
    /// requires (JVMS §2.10): the handler always begins with an empty operand stack
    /// holding only the thrown exception.
    pub fn unwind_to_handler(&mut self, handler_pc: u16, exception: Value) -> Result<()> {
        self.operand_stack.clear();
        self.operand_stack.push(exception)?;
        self.program_counter = handler_pc;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjvm_classloader::LoaderId;
    use cjvm_classfile::{ClassAccessFlags, ClassFile, Constant, ConstantPool, Version};

    fn object_class() -> cjvm_classloader::Result<Arc<Class>> {
        let mut constant_pool = ConstantPool::new();
        let this_name = constant_pool.push(Constant::Utf8("java/lang/Object".to_string()));
        let this_class = constant_pool.push(Constant::Class(this_name));
        let class_file = ClassFile {
            version: Version { major: 52, minor: 0 },
            constant_pool,
            access_flags: ClassAccessFlags::PUBLIC,
            this_class,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };
        let class = Class::from_class_file(class_file, LoaderId::Bootstrap)?;
        class.link()?;
        Ok(Arc::new(class))
    }

    fn no_arg_method(constant_pool: &mut ConstantPool) -> cjvm_classfile::Result<Arc<Method>> {
        let name_index = constant_pool.push(Constant::Utf8("run".to_string()));
        let descriptor_index = constant_pool.push(Constant::Utf8("()V".to_string()));
        let raw = cjvm_classfile::Method {
            access_flags: cjvm_classfile::MethodAccessFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: vec![cjvm_classfile::attributes::Attribute::Code {
                name_index: 0,
                max_stack: 2,
                max_locals: 1,
                code: vec![0x00],
                exception_table: vec![],
                attributes: vec![],
            }],
        };
        Ok(Arc::new(Method::new(constant_pool, &raw)?))
    }

    #[test]
    fn test_new_seeds_receiver_at_slot_zero() -> Result<()> {
        let class = object_class()?;
        let mut constant_pool = ConstantPool::new();
        let method = no_arg_method(&mut constant_pool)?;
        let receiver = Value::null();
        let frame = Frame::new(Arc::clone(&class), method, vec![receiver])?;
        assert!(frame.locals().get(0)?.is_null());
        Ok(())
    }

    #[test]
    fn test_fetch_past_end_errors() -> Result<()> {
        let class = object_class()?;
        let mut constant_pool = ConstantPool::new();
        let method = no_arg_method(&mut constant_pool)?;
        let mut frame = Frame::new(class, method, vec![])?;
        frame.set_program_counter(10);
        assert!(matches!(frame.fetch(), Err(Error::InvalidProgramCounter(10))));
        Ok(())
    }
}
