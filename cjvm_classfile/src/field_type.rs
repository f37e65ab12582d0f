use crate::Error::InvalidDescriptor;
use crate::{BaseType, Result};
use std::fmt;

/// A JVMS field descriptor (JVMS §4.3.2): a primitive, an object type, or an array of either.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Parse a single field descriptor, requiring the whole string to be consumed.
    ///
    /// # Errors
    ///
    /// if `descriptor` is not a well-formed field descriptor.
    pub fn parse(descriptor: &str) -> Result<FieldType> {
        let mut chars = descriptor.chars().peekable();
        let field_type = Self::parse_one(&mut chars)
            .ok_or_else(|| InvalidDescriptor(descriptor.to_string()))?;
        if chars.next().is_some() {
            return Err(InvalidDescriptor(descriptor.to_string()));
        }
        Ok(field_type)
    }

    fn parse_one(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<FieldType> {
        let head = *chars.peek()?;
        if head == '[' {
            chars.next();
            let component = Self::parse_one(chars)?;
            return Some(FieldType::Array(Box::new(component)));
        }
        if head == 'L' {
            chars.next();
            let mut name = String::new();
            for character in chars.by_ref() {
                if character == ';' {
                    return Some(FieldType::Object(name));
                }
                name.push(character);
            }
            return None;
        }
        if let Some(base_type) = BaseType::from_descriptor(head) {
            chars.next();
            return Some(FieldType::Base(base_type));
        }
        None
    }

    /// Render this type back to its JVMS descriptor string.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            FieldType::Base(base_type) => base_type.descriptor().to_string(),
            FieldType::Object(name) => format!("L{name};"),
            FieldType::Array(component) => format!("[{}", component.descriptor()),
        }
    }

    /// Number of array dimensions, 0 for non-array types.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        match self {
            FieldType::Array(component) => 1 + component.dimensions(),
            _ => 0,
        }
    }

    /// The innermost, non-array component type.
    #[must_use]
    pub fn element_type(&self) -> &FieldType {
        match self {
            FieldType::Array(component) => component.element_type(),
            other => other,
        }
    }

    /// Number of 32-bit slots a value of this type occupies in locals / on the operand stack.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        match self {
            FieldType::Base(base_type) => base_type.slot_count(),
            FieldType::Object(_) | FieldType::Array(_) => 1,
        }
    }

    /// The JVMS internal class name for this type if it names a class or array
    /// (slash form, including the leading `[` sigils for arrays), otherwise `None`.
    #[must_use]
    pub fn class_name(&self) -> Option<String> {
        match self {
            FieldType::Object(name) => Some(name.clone()),
            FieldType::Array(_) => Some(self.descriptor()),
            FieldType::Base(_) => None,
        }
    }

    /// Parse a method descriptor `(ParamTypes)ReturnType` into its parameter types and an
    /// optional return type (`None` for `void`).
    ///
    /// # Errors
    ///
    /// if `descriptor` is not a well-formed method descriptor.
    pub fn parse_method_descriptor(descriptor: &str) -> Result<(Vec<FieldType>, Option<FieldType>)> {
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(InvalidDescriptor(descriptor.to_string()));
        }
        let mut parameters = Vec::new();
        while chars.peek().copied() != Some(')') {
            let parameter = Self::parse_one(&mut chars)
                .ok_or_else(|| InvalidDescriptor(descriptor.to_string()))?;
            parameters.push(parameter);
        }
        chars.next(); // consume ')'

        let return_type = match chars.peek().copied() {
            Some('V') => {
                chars.next();
                None
            }
            Some(_) => Some(
                Self::parse_one(&mut chars).ok_or_else(|| InvalidDescriptor(descriptor.to_string()))?,
            ),
            None => return Err(InvalidDescriptor(descriptor.to_string())),
        };
        if chars.next().is_some() {
            return Err(InvalidDescriptor(descriptor.to_string()));
        }
        Ok((parameters, return_type))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type() -> Result<()> {
        assert_eq!(FieldType::Base(BaseType::Int), FieldType::parse("I")?);
        Ok(())
    }

    #[test]
    fn test_object_type() -> Result<()> {
        let field_type = FieldType::parse("Ljava/lang/String;")?;
        assert_eq!(FieldType::Object("java/lang/String".to_string()), field_type);
        assert_eq!("Ljava/lang/String;", field_type.descriptor());
        Ok(())
    }

    #[test]
    fn test_array_type() -> Result<()> {
        let field_type = FieldType::parse("[[[I")?;
        assert_eq!(3, field_type.dimensions());
        assert_eq!(&FieldType::Base(BaseType::Int), field_type.element_type());
        assert_eq!("[[[I", field_type.descriptor());
        Ok(())
    }

    #[test]
    fn test_invalid() {
        assert!(FieldType::parse("Q").is_err());
        assert!(FieldType::parse("Ljava/lang/String").is_err());
        assert!(FieldType::parse("I garbage").is_err());
    }

    #[test]
    fn test_method_descriptor() -> Result<()> {
        let (parameters, return_type) = FieldType::parse_method_descriptor("(IDLjava/lang/String;)Z")?;
        assert_eq!(
            vec![
                FieldType::Base(BaseType::Int),
                FieldType::Base(BaseType::Double),
                FieldType::Object("java/lang/String".to_string()),
            ],
            parameters
        );
        assert_eq!(Some(FieldType::Base(BaseType::Boolean)), return_type);
        Ok(())
    }

    #[test]
    fn test_method_descriptor_void() -> Result<()> {
        let (parameters, return_type) = FieldType::parse_method_descriptor("()V")?;
        assert!(parameters.is_empty());
        assert_eq!(None, return_type);
        Ok(())
    }
}
