use crate::attributes::Attribute;
use crate::constant_pool::ConstantPool;
use crate::method_access_flags::MethodAccessFlags;
use crate::{FieldType, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// A method declaration (JVMS §4.6). Abstract and native methods carry no `Code`
/// attribute; everything else does.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub access_flags: MethodAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl Method {
    /// # Errors
    ///
    /// if the stream is truncated or an attribute fails to parse.
    pub fn from_bytes(constant_pool: &ConstantPool, bytes: &mut Cursor<Vec<u8>>) -> Result<Method> {
        let access_flags = MethodAccessFlags::from_bits_truncate(bytes.read_u16::<BigEndian>()?);
        let name_index = bytes.read_u16::<BigEndian>()?;
        let descriptor_index = bytes.read_u16::<BigEndian>()?;

        let attributes_count = bytes.read_u16::<BigEndian>()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::from_bytes(constant_pool, bytes)?);
        }

        Ok(Method {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// # Errors
    ///
    /// if any count overflows its wire width.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u16::<BigEndian>(self.access_flags.bits())?;
        bytes.write_u16::<BigEndian>(self.name_index)?;
        bytes.write_u16::<BigEndian>(self.descriptor_index)?;
        bytes.write_u16::<BigEndian>(u16::try_from(self.attributes.len())?)?;
        for attribute in &self.attributes {
            attribute.to_bytes(bytes)?;
        }
        Ok(())
    }

    /// This method's `Code` attribute, if it has one.
    #[must_use]
    pub fn code(&self) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| matches!(attribute, Attribute::Code { .. }))
    }

    /// Parse this method's descriptor into parameter and return types.
    ///
    /// # Errors
    ///
    /// if `descriptor_index` does not resolve to a `Utf8` entry or is not a well-formed
    /// method descriptor.
    pub fn parse_descriptor(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<(Vec<FieldType>, Option<FieldType>)> {
        FieldType::parse_method_descriptor(constant_pool.utf8(self.descriptor_index)?)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}:#{}", self.access_flags, self.name_index, self.descriptor_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Constant;

    #[test]
    fn test_round_trip() -> Result<()> {
        let mut constant_pool = ConstantPool::new();
        let name_index = constant_pool.push(Constant::Utf8("main".to_string()));
        let descriptor_index =
            constant_pool.push(Constant::Utf8("([Ljava/lang/String;)V".to_string()));

        let method = Method {
            access_flags: MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            name_index,
            descriptor_index,
            attributes: vec![],
        };

        let mut bytes = Vec::new();
        method.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(method, Method::from_bytes(&constant_pool, &mut cursor)?);
        Ok(())
    }

    #[test]
    fn test_no_code_for_abstract_method() -> Result<()> {
        let method = Method {
            access_flags: MethodAccessFlags::ABSTRACT,
            name_index: 0,
            descriptor_index: 0,
            attributes: vec![],
        };
        assert!(method.code().is_none());
        Ok(())
    }
}
