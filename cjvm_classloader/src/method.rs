use cjvm_classfile::attributes::{Attribute, ExceptionTableEntry, LineNumber};
use cjvm_classfile::{ConstantPool, FieldType, Method as RawMethod, MethodAccessFlags};

/// A resolved method: its signature plus the `Code` attribute contents the
/// interpreter needs, flattened out of the attribute list for quick access.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    name: String,
    descriptor: String,
    access_flags: MethodAccessFlags,
    parameters: Vec<FieldType>,
    return_type: Option<FieldType>,
    max_stack: u16,
    max_locals: u16,
    code: Vec<u8>,
    exception_table: Vec<ExceptionTableEntry>,
    line_numbers: Vec<LineNumber>,
}

impl Method {
    /// Build a runtime method from its raw classfile declaration.
    ///
    /// # Errors
    ///
    /// if the method's name/descriptor index does not resolve, or the descriptor is
    /// not well-formed.
    pub fn new(constant_pool: &ConstantPool, raw: &RawMethod) -> cjvm_classfile::Result<Self> {
        let name = constant_pool.utf8(raw.name_index)?.to_string();
        let descriptor = constant_pool.utf8(raw.descriptor_index)?.to_string();
        let (parameters, return_type) = raw.parse_descriptor(constant_pool)?;

        let (max_stack, max_locals, code, exception_table, line_numbers) = match raw.code() {
            Some(Attribute::Code {
                max_stack,
                max_locals,
                code,
                exception_table,
                attributes,
                ..
            }) => {
                let line_numbers = attributes
                    .iter()
                    .find_map(|attribute| match attribute {
                        Attribute::LineNumberTable { line_numbers, .. } => Some(line_numbers.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                (*max_stack, *max_locals, code.clone(), exception_table.clone(), line_numbers)
            }
            _ => (0, 0, Vec::new(), Vec::new(), Vec::new()),
        };

        Ok(Method {
            name,
            descriptor,
            access_flags: raw.access_flags,
            parameters,
            return_type,
            max_stack,
            max_locals,
            code,
            exception_table,
            line_numbers,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    #[must_use]
    pub fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    #[must_use]
    pub fn parameters(&self) -> &[FieldType] {
        &self.parameters
    }

    #[must_use]
    pub fn return_type(&self) -> Option<&FieldType> {
        self.return_type.as_ref()
    }

    #[must_use]
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    #[must_use]
    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    #[must_use]
    pub fn exception_table(&self) -> &[ExceptionTableEntry] {
        &self.exception_table
    }

    #[must_use]
    pub fn line_number(&self, pc: u16) -> Option<u16> {
        self.line_numbers
            .iter()
            .filter(|entry| entry.start_pc <= pc)
            .max_by_key(|entry| entry.start_pc)
            .map(|entry| entry.line_number)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::NATIVE)
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ABSTRACT)
    }

    /// Number of 32-bit argument slots this method expects, including the receiver
    /// slot for non-static methods.
    #[must_use]
    pub fn argument_slots(&self) -> u16 {
        let mut slots = u16::from(!self.is_static());
        for parameter in &self.parameters {
            #[allow(clippy::cast_possible_truncation)]
            {
                slots += parameter.slot_count() as u16;
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjvm_classfile::Constant;

    #[test]
    fn test_abstract_method_has_no_code() -> cjvm_classfile::Result<()> {
        let mut constant_pool = ConstantPool::new();
        let name_index = constant_pool.push(Constant::Utf8("run".to_string()));
        let descriptor_index = constant_pool.push(Constant::Utf8("()V".to_string()));
        let raw = RawMethod {
            access_flags: MethodAccessFlags::ABSTRACT | MethodAccessFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: vec![],
        };
        let method = Method::new(&constant_pool, &raw)?;
        assert!(method.is_abstract());
        assert!(method.code().is_empty());
        Ok(())
    }
}
