use crate::attributes::{ExceptionTableEntry, LineNumber};
use crate::constant_pool::ConstantPool;
use crate::Constant;
use crate::Error::{InvalidAttributeLength, InvalidAttributeNameIndex};
use crate::Result;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Cursor, Read};

/// A class file attribute (JVMS §4.7). Only the attributes the interpreter and linker
/// actually consult are modeled explicitly; everything else round-trips as `Unknown`
/// so a class file can be re-serialized without losing information.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    /// See JVMS §4.7.2. Present on `static final` fields with a compile-time constant.
    ConstantValue {
        name_index: u16,
        constant_value_index: u16,
    },
    /// See JVMS §4.7.3. The only attribute that carries executable bytecode.
    Code {
        name_index: u16,
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
        exception_table: Vec<ExceptionTableEntry>,
        attributes: Vec<Attribute>,
    },
    /// See JVMS §4.7.5. Checked exceptions a method declares via `throws`.
    Exceptions {
        name_index: u16,
        exception_indexes: Vec<u16>,
    },
    /// See JVMS §4.7.10.
    SourceFile {
        name_index: u16,
        source_file_index: u16,
    },
    /// See JVMS §4.7.12.
    LineNumberTable {
        name_index: u16,
        line_numbers: Vec<LineNumber>,
    },
    /// See JVMS §4.7.8.
    Synthetic { name_index: u16 },
    /// See JVMS §4.7.15.
    Deprecated { name_index: u16 },
    /// Any attribute this crate does not interpret. Preserved verbatim.
    Unknown {
        name_index: u16,
        name: String,
        info: Vec<u8>,
    },
}

impl Attribute {
    #[must_use]
    pub fn name_index(&self) -> u16 {
        match self {
            Attribute::ConstantValue { name_index, .. }
            | Attribute::Code { name_index, .. }
            | Attribute::Exceptions { name_index, .. }
            | Attribute::SourceFile { name_index, .. }
            | Attribute::LineNumberTable { name_index, .. }
            | Attribute::Synthetic { name_index }
            | Attribute::Deprecated { name_index }
            | Attribute::Unknown { name_index, .. } => *name_index,
        }
    }

    /// Deserialize one attribute.
    ///
    /// # Errors
    ///
    /// if `name_index` does not resolve to a `Utf8` constant, the declared
    /// `attribute_length` does not match the bytes actually consumed, or the payload
    /// is otherwise malformed.
    pub fn from_bytes(constant_pool: &ConstantPool, bytes: &mut Cursor<Vec<u8>>) -> Result<Attribute> {
        let name_index = bytes.read_u16::<BigEndian>()?;
        let name = constant_pool
            .utf8(name_index)
            .map_err(|_| InvalidAttributeNameIndex(name_index))?
            .to_string();
        let attribute_length = bytes.read_u32::<BigEndian>()?;
        let start_position = bytes.position();

        let attribute = match name.as_str() {
            "ConstantValue" => Attribute::ConstantValue {
                name_index,
                constant_value_index: bytes.read_u16::<BigEndian>()?,
            },
            "Code" => {
                let max_stack = bytes.read_u16::<BigEndian>()?;
                let max_locals = bytes.read_u16::<BigEndian>()?;
                let code_length = bytes.read_u32::<BigEndian>()?;
                let mut code = vec![0; code_length as usize];
                bytes.read_exact(&mut code)?;

                let exception_table_length = bytes.read_u16::<BigEndian>()?;
                let mut exception_table = Vec::with_capacity(exception_table_length as usize);
                for _ in 0..exception_table_length {
                    exception_table.push(ExceptionTableEntry::from_bytes(bytes)?);
                }

                let attributes_count = bytes.read_u16::<BigEndian>()?;
                let mut attributes = Vec::with_capacity(attributes_count as usize);
                for _ in 0..attributes_count {
                    attributes.push(Attribute::from_bytes(constant_pool, bytes)?);
                }

                Attribute::Code {
                    name_index,
                    max_stack,
                    max_locals,
                    code,
                    exception_table,
                    attributes,
                }
            }
            "Exceptions" => {
                let number_of_exceptions = bytes.read_u16::<BigEndian>()?;
                let mut exception_indexes = Vec::with_capacity(number_of_exceptions as usize);
                for _ in 0..number_of_exceptions {
                    exception_indexes.push(bytes.read_u16::<BigEndian>()?);
                }
                Attribute::Exceptions {
                    name_index,
                    exception_indexes,
                }
            }
            "SourceFile" => Attribute::SourceFile {
                name_index,
                source_file_index: bytes.read_u16::<BigEndian>()?,
            },
            "LineNumberTable" => {
                let line_number_table_length = bytes.read_u16::<BigEndian>()?;
                let mut line_numbers = Vec::with_capacity(line_number_table_length as usize);
                for _ in 0..line_number_table_length {
                    line_numbers.push(LineNumber::from_bytes(bytes)?);
                }
                Attribute::LineNumberTable {
                    name_index,
                    line_numbers,
                }
            }
            "Synthetic" => Attribute::Synthetic { name_index },
            "Deprecated" => Attribute::Deprecated { name_index },
            _ => {
                let mut info = vec![0; attribute_length as usize];
                bytes.read_exact(&mut info)?;
                Attribute::Unknown {
                    name_index,
                    name,
                    info,
                }
            }
        };

        #[allow(clippy::cast_possible_truncation)]
        let consumed = (bytes.position() - start_position) as u32;
        if consumed != attribute_length {
            return Err(InvalidAttributeLength {
                expected: attribute_length,
                found: consumed,
            });
        }
        Ok(attribute)
    }

    /// Serialize this attribute, name-index- and length-prefixed.
    ///
    /// # Errors
    ///
    /// if any child value overflows its wire width or the buffer cannot be written to.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u16::<BigEndian>(self.name_index())?;
        let mut info = Vec::new();
        match self {
            Attribute::ConstantValue {
                constant_value_index,
                ..
            } => info.write_u16::<BigEndian>(*constant_value_index)?,
            Attribute::Code {
                max_stack,
                max_locals,
                code,
                exception_table,
                attributes,
                ..
            } => {
                info.write_u16::<BigEndian>(*max_stack)?;
                info.write_u16::<BigEndian>(*max_locals)?;
                info.write_u32::<BigEndian>(u32::try_from(code.len())?)?;
                info.extend_from_slice(code);
                info.write_u16::<BigEndian>(u16::try_from(exception_table.len())?)?;
                for entry in exception_table {
                    entry.to_bytes(&mut info)?;
                }
                info.write_u16::<BigEndian>(u16::try_from(attributes.len())?)?;
                for attribute in attributes {
                    attribute.to_bytes(&mut info)?;
                }
            }
            Attribute::Exceptions {
                exception_indexes, ..
            } => {
                info.write_u16::<BigEndian>(u16::try_from(exception_indexes.len())?)?;
                for index in exception_indexes {
                    info.write_u16::<BigEndian>(*index)?;
                }
            }
            Attribute::SourceFile {
                source_file_index, ..
            } => info.write_u16::<BigEndian>(*source_file_index)?,
            Attribute::LineNumberTable { line_numbers, .. } => {
                info.write_u16::<BigEndian>(u16::try_from(line_numbers.len())?)?;
                for line_number in line_numbers {
                    line_number.to_bytes(&mut info)?;
                }
            }
            Attribute::Synthetic { .. } | Attribute::Deprecated { .. } => {}
            Attribute::Unknown { info: raw, .. } => info.extend_from_slice(raw),
        }
        bytes.write_u32::<BigEndian>(u32::try_from(info.len())?)?;
        bytes.extend_from_slice(&info);
        Ok(())
    }

    /// Find the `Code` attribute's `exception_table`, `code`, `max_stack` and
    /// `max_locals`, if this attribute is a `Code` attribute.
    #[must_use]
    pub fn as_code(&self) -> Option<(&[u8], u16, u16, &[ExceptionTableEntry])> {
        match self {
            Attribute::Code {
                code,
                max_stack,
                max_locals,
                exception_table,
                ..
            } => Some((code, *max_stack, *max_locals, exception_table)),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::ConstantValue { .. } => write!(f, "ConstantValue"),
            Attribute::Code {
                max_stack,
                max_locals,
                code,
                ..
            } => write!(
                f,
                "Code: max_stack={max_stack}, max_locals={max_locals}, {} bytes",
                code.len()
            ),
            Attribute::Exceptions { .. } => write!(f, "Exceptions"),
            Attribute::SourceFile { .. } => write!(f, "SourceFile"),
            Attribute::LineNumberTable { line_numbers, .. } => {
                write!(f, "LineNumberTable: {} entries", line_numbers.len())
            }
            Attribute::Synthetic { .. } => write!(f, "Synthetic"),
            Attribute::Deprecated { .. } => write!(f, "Deprecated"),
            Attribute::Unknown { name, .. } => write!(f, "Unknown({name})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_with_names(names: &[&str]) -> ConstantPool {
        let mut constant_pool = ConstantPool::new();
        for name in names {
            constant_pool.push(Constant::Utf8((*name).to_string()));
        }
        constant_pool
    }

    #[test]
    fn test_deprecated_round_trip() -> Result<()> {
        let constant_pool = pool_with_names(&["Deprecated"]);
        let attribute = Attribute::Deprecated { name_index: 1 };
        let mut bytes = Vec::new();
        attribute.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(attribute, Attribute::from_bytes(&constant_pool, &mut cursor)?);
        Ok(())
    }

    #[test]
    fn test_code_round_trip() -> Result<()> {
        let constant_pool = pool_with_names(&["Code"]);
        let attribute = Attribute::Code {
            name_index: 1,
            max_stack: 2,
            max_locals: 1,
            code: vec![0x2a, 0xb1], // aload_0, return
            exception_table: vec![],
            attributes: vec![],
        };
        let mut bytes = Vec::new();
        attribute.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(attribute, Attribute::from_bytes(&constant_pool, &mut cursor)?);
        Ok(())
    }

    #[test]
    fn test_unknown_preserves_bytes() -> Result<()> {
        let constant_pool = pool_with_names(&["FutureAttribute"]);
        let attribute = Attribute::Unknown {
            name_index: 1,
            name: "FutureAttribute".to_string(),
            info: vec![1, 2, 3, 4],
        };
        let mut bytes = Vec::new();
        attribute.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(attribute, Attribute::from_bytes(&constant_pool, &mut cursor)?);
        Ok(())
    }
}
