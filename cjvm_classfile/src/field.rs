use crate::attributes::Attribute;
use crate::constant_pool::ConstantPool;
use crate::field_access_flags::FieldAccessFlags;
use crate::{FieldType, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// A field declaration (JVMS §4.5): access flags, name/descriptor indices, the parsed
/// field type, and attributes (`ConstantValue` for compile-time-constant statics).
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub access_flags: FieldAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub field_type: FieldType,
    pub attributes: Vec<Attribute>,
}

impl Field {
    /// # Errors
    ///
    /// if the stream is truncated, the descriptor is malformed, or an attribute fails
    /// to parse.
    pub fn from_bytes(constant_pool: &ConstantPool, bytes: &mut Cursor<Vec<u8>>) -> Result<Field> {
        let access_flags = FieldAccessFlags::from_bits_truncate(bytes.read_u16::<BigEndian>()?);
        let name_index = bytes.read_u16::<BigEndian>()?;
        let descriptor_index = bytes.read_u16::<BigEndian>()?;
        let field_type = FieldType::parse(constant_pool.utf8(descriptor_index)?)?;

        let attributes_count = bytes.read_u16::<BigEndian>()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::from_bytes(constant_pool, bytes)?);
        }

        Ok(Field {
            access_flags,
            name_index,
            descriptor_index,
            field_type,
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

    /// The `ConstantValue` attribute's constant pool index, if this field declares one.
    #[must_use]
    pub fn constant_value_index(&self) -> Option<u16> {
        self.attributes.iter().find_map(|attribute| match attribute {
            Attribute::ConstantValue {
                constant_value_index,
                ..
            } => Some(*constant_value_index),
            _ => None,
        })
    }
}

impl fmt::Display for Field {
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
        let name_index = constant_pool.push(Constant::Utf8("count".to_string()));
        let descriptor_index = constant_pool.push(Constant::Utf8("I".to_string()));

        let field = Field {
            access_flags: FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC,
            name_index,
            descriptor_index,
            field_type: FieldType::parse("I")?,
            attributes: vec![],
        };

        let mut bytes = Vec::new();
        field.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(field, Field::from_bytes(&constant_pool, &mut cursor)?);
        Ok(())
    }
}
