use crate::Error::InvalidConstantTag;
use crate::Result;
use crate::mutf8;
use crate::reference_kind::ReferenceKind;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Cursor, Read};

/// One raw constant pool entry (JVMS §4.4). Immutable and terminal for scalar tags;
/// the class/string/field/method-ref tags are the symbolic references that
/// `cjvm_classloader::ResolvedPool` later resolves via an in-place tag upgrade layered on top
/// (see `ResolvedPool`; this type itself never changes shape after parsing).
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: ReferenceKind,
        reference_index: u16,
    },
    MethodType(u16),
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
}

impl Constant {
    /// The wire tag byte for this constant (JVMS §4.4).
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => 1,
            Constant::Integer(_) => 3,
            Constant::Float(_) => 4,
            Constant::Long(_) => 5,
            Constant::Double(_) => 6,
            Constant::Class(_) => 7,
            Constant::String(_) => 8,
            Constant::FieldRef { .. } => 9,
            Constant::MethodRef { .. } => 10,
            Constant::InterfaceMethodRef { .. } => 11,
            Constant::NameAndType { .. } => 12,
            Constant::MethodHandle { .. } => 15,
            Constant::MethodType(_) => 16,
            Constant::InvokeDynamic { .. } => 18,
        }
    }

    /// Whether this tag occupies two consecutive constant pool slots (`Long`, `Double`).
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }

    /// Deserialize one constant from the class file byte stream.
    ///
    /// # Errors
    ///
    /// if the tag byte is unrecognized or the payload is truncated.
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<Constant> {
        let tag = bytes.read_u8()?;
        let constant = match tag {
            1 => {
                let length = bytes.read_u16::<BigEndian>()? as usize;
                let mut utf8_bytes = vec![0; length];
                bytes.read_exact(&mut utf8_bytes)?;
                Constant::Utf8(mutf8::from_bytes(&utf8_bytes)?)
            }
            3 => Constant::Integer(bytes.read_i32::<BigEndian>()?),
            4 => Constant::Float(bytes.read_f32::<BigEndian>()?),
            5 => Constant::Long(bytes.read_i64::<BigEndian>()?),
            6 => Constant::Double(bytes.read_f64::<BigEndian>()?),
            7 => Constant::Class(bytes.read_u16::<BigEndian>()?),
            8 => Constant::String(bytes.read_u16::<BigEndian>()?),
            9 => Constant::FieldRef {
                class_index: bytes.read_u16::<BigEndian>()?,
                name_and_type_index: bytes.read_u16::<BigEndian>()?,
            },
            10 => Constant::MethodRef {
                class_index: bytes.read_u16::<BigEndian>()?,
                name_and_type_index: bytes.read_u16::<BigEndian>()?,
            },
            11 => Constant::InterfaceMethodRef {
                class_index: bytes.read_u16::<BigEndian>()?,
                name_and_type_index: bytes.read_u16::<BigEndian>()?,
            },
            12 => Constant::NameAndType {
                name_index: bytes.read_u16::<BigEndian>()?,
                descriptor_index: bytes.read_u16::<BigEndian>()?,
            },
            15 => Constant::MethodHandle {
                reference_kind: ReferenceKind::from_bytes(bytes)?,
                reference_index: bytes.read_u16::<BigEndian>()?,
            },
            16 => Constant::MethodType(bytes.read_u16::<BigEndian>()?),
            18 => Constant::InvokeDynamic {
                bootstrap_method_attr_index: bytes.read_u16::<BigEndian>()?,
                name_and_type_index: bytes.read_u16::<BigEndian>()?,
            },
            _ => return Err(InvalidConstantTag(tag)),
        };
        Ok(constant)
    }

    /// Serialize this constant to bytes, tag-prefixed.
    ///
    /// # Errors
    ///
    /// if a `Utf8` value is longer than 65,535 MUTF-8 bytes.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u8(self.tag())?;
        match self {
            Constant::Utf8(value) => {
                let utf8_value = mutf8::to_bytes(value)?;
                let length = u16::try_from(utf8_value.len())?;
                bytes.write_u16::<BigEndian>(length)?;
                bytes.extend_from_slice(&utf8_value);
            }
            Constant::Integer(value) => bytes.write_i32::<BigEndian>(*value)?,
            Constant::Float(value) => bytes.write_f32::<BigEndian>(*value)?,
            Constant::Long(value) => bytes.write_i64::<BigEndian>(*value)?,
            Constant::Double(value) => bytes.write_f64::<BigEndian>(*value)?,
            Constant::Class(name_index) => bytes.write_u16::<BigEndian>(*name_index)?,
            Constant::String(string_index) => bytes.write_u16::<BigEndian>(*string_index)?,
            Constant::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Constant::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => {
                bytes.write_u16::<BigEndian>(*class_index)?;
                bytes.write_u16::<BigEndian>(*name_and_type_index)?;
            }
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => {
                bytes.write_u16::<BigEndian>(*name_index)?;
                bytes.write_u16::<BigEndian>(*descriptor_index)?;
            }
            Constant::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                reference_kind.to_bytes(bytes)?;
                bytes.write_u16::<BigEndian>(*reference_index)?;
            }
            Constant::MethodType(descriptor_index) => {
                bytes.write_u16::<BigEndian>(*descriptor_index)?;
            }
            Constant::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                bytes.write_u16::<BigEndian>(*bootstrap_method_attr_index)?;
                bytes.write_u16::<BigEndian>(*name_and_type_index)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Utf8(value) => write!(f, "Utf8 {value}"),
            Constant::Integer(value) => write!(f, "Integer {value}"),
            Constant::Float(value) => write!(f, "Float {value}"),
            Constant::Long(value) => write!(f, "Long {value}"),
            Constant::Double(value) => write!(f, "Double {value}"),
            Constant::Class(name_index) => write!(f, "Class #{name_index}"),
            Constant::String(string_index) => write!(f, "String #{string_index}"),
            Constant::FieldRef {
                class_index,
                name_and_type_index,
            } => write!(f, "Fieldref #{class_index}.#{name_and_type_index}"),
            Constant::MethodRef {
                class_index,
                name_and_type_index,
            } => write!(f, "Methodref #{class_index}.#{name_and_type_index}"),
            Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => write!(f, "InterfaceMethodref #{class_index}.#{name_and_type_index}"),
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => write!(f, "NameAndType #{name_index}:#{descriptor_index}"),
            Constant::MethodHandle {
                reference_kind,
                reference_index,
            } => write!(f, "MethodHandle {reference_kind}.#{reference_index}"),
            Constant::MethodType(descriptor_index) => write!(f, "MethodType #{descriptor_index}"),
            Constant::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => write!(
                f,
                "InvokeDynamic #{bootstrap_method_attr_index}.#{name_and_type_index}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(constant: &Constant, expected_bytes: &[u8]) -> Result<()> {
        let mut bytes = Vec::new();
        constant.to_bytes(&mut bytes)?;
        assert_eq!(expected_bytes, &bytes[..]);
        let mut cursor = Cursor::new(expected_bytes.to_vec());
        assert_eq!(*constant, Constant::from_bytes(&mut cursor)?);
        Ok(())
    }

    #[test]
    fn test_utf8() -> Result<()> {
        round_trip(&Constant::Utf8("foo".to_string()), &[1, 0, 3, 102, 111, 111])
    }

    #[test]
    fn test_integer() -> Result<()> {
        round_trip(&Constant::Integer(42), &[3, 0, 0, 0, 42])
    }

    #[test]
    fn test_long_is_wide() {
        assert!(Constant::Long(1).is_wide());
        assert!(Constant::Double(1.0).is_wide());
        assert!(!Constant::Integer(1).is_wide());
    }

    #[test]
    fn test_method_ref() -> Result<()> {
        round_trip(
            &Constant::MethodRef {
                class_index: 1,
                name_and_type_index: 2,
            },
            &[10, 0, 1, 0, 2],
        )
    }

    #[test]
    fn test_invalid_tag() {
        let mut bytes = Cursor::new(vec![200]);
        assert!(matches!(
            Constant::from_bytes(&mut bytes),
            Err(InvalidConstantTag(200))
        ));
    }
}
