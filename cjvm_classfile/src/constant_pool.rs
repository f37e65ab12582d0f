use crate::Error::{InvalidConstantPoolIndex, InvalidConstantPoolIndexType};
use crate::{Constant, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// A class file's constant pool (JVMS §4.4). Indices are 1-based; `Long` and `Double`
/// entries occupy their own index plus an unusable placeholder at `index + 1`, matching
/// the historical quirk the class file format inherited from the original JVM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantPool {
    constants: Vec<Option<Constant>>,
}

impl ConstantPool {
    /// Create an empty constant pool. Index 0 is never valid and is reserved internally.
    #[must_use]
    pub fn new() -> Self {
        ConstantPool {
            constants: vec![None],
        }
    }

    /// Number of slots in the pool, including the reserved index 0 and wide-entry placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constants.len() <= 1
    }

    /// Append a constant, returning its 1-based index. Wide entries (`Long`, `Double`)
    /// additionally consume the following index as an unusable placeholder.
    pub fn push(&mut self, constant: Constant) -> u16 {
        let is_wide = constant.is_wide();
        self.constants.push(Some(constant));
        #[allow(clippy::cast_possible_truncation)]
        let index = (self.constants.len() - 1) as u16;
        if is_wide {
            self.constants.push(None);
        }
        index
    }

    /// Look up a constant by its 1-based index.
    ///
    /// # Errors
    ///
    /// if `index` is out of range or refers to a wide-entry placeholder.
    pub fn get(&self, index: u16) -> Result<&Constant> {
        self.constants
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(InvalidConstantPoolIndex(index))
    }

    /// Look up a constant by index without producing an error for an empty/placeholder slot.
    #[must_use]
    pub fn try_get(&self, index: u16) -> Option<&Constant> {
        self.constants.get(index as usize).and_then(Option::as_ref)
    }

    /// Fetch a `Utf8` constant by index.
    ///
    /// # Errors
    ///
    /// if `index` is out of range or does not name a `Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(InvalidConstantPoolIndexType {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Resolve a `Class` constant's name by index.
    ///
    /// # Errors
    ///
    /// if `index` is out of range, does not name a `Class` entry, or its name index is invalid.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            _ => Err(InvalidConstantPoolIndexType {
                index,
                expected: "Class",
            }),
        }
    }

    /// Resolve a `NameAndType` constant's name and descriptor strings by index.
    ///
    /// # Errors
    ///
    /// if `index` is out of range, does not name a `NameAndType` entry, or its inner
    /// indices are invalid.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(InvalidConstantPoolIndexType {
                index,
                expected: "NameAndType",
            }),
        }
    }

    /// Iterate over `(index, constant)` pairs, skipping the reserved index 0 and
    /// wide-entry placeholders.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.constants
            .iter()
            .enumerate()
            .filter_map(|(index, constant)| {
                #[allow(clippy::cast_possible_truncation)]
                constant.as_ref().map(|c| (index as u16, c))
            })
    }

    /// Deserialize a full constant pool: a `u16` count (`constant_pool_count`, one greater
    /// than the number of real entries) followed by that many constants.
    ///
    /// # Errors
    ///
    /// if the count or any entry is malformed.
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<ConstantPool> {
        let constant_pool_count = bytes.read_u16::<BigEndian>()?;
        let mut constant_pool = ConstantPool::new();
        while constant_pool.len() < constant_pool_count as usize {
            let constant = Constant::from_bytes(bytes)?;
            constant_pool.push(constant);
        }
        Ok(constant_pool)
    }

    /// Serialize this constant pool, `constant_pool_count`-prefixed.
    ///
    /// # Errors
    ///
    /// if the pool has more than 65,535 slots or an entry fails to serialize.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        let constant_pool_count = u16::try_from(self.constants.len())?;
        bytes.write_u16::<BigEndian>(constant_pool_count)?;
        for constant in self.constants.iter().skip(1).flatten() {
            constant.to_bytes(bytes)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConstantPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Constant pool:")?;
        for (index, constant) in self.iter() {
            writeln!(f, "  #{index} = {constant}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let constant_pool = ConstantPool::new();
        assert!(constant_pool.is_empty());
        assert_eq!(1, constant_pool.len());
    }

    #[test]
    fn test_push_and_get() -> Result<()> {
        let mut constant_pool = ConstantPool::new();
        let index = constant_pool.push(Constant::Utf8("foo".to_string()));
        assert_eq!(1, index);
        assert_eq!("foo", constant_pool.utf8(index)?);
        Ok(())
    }

    #[test]
    fn test_wide_entry_reserves_placeholder() {
        let mut constant_pool = ConstantPool::new();
        let long_index = constant_pool.push(Constant::Long(1));
        let next_index = constant_pool.push(Constant::Integer(2));
        assert_eq!(long_index + 2, next_index);
        assert!(constant_pool.try_get(long_index + 1).is_none());
    }

    #[test]
    fn test_invalid_index() {
        let constant_pool = ConstantPool::new();
        assert!(matches!(
            constant_pool.get(1),
            Err(InvalidConstantPoolIndex(1))
        ));
    }

    #[test]
    fn test_class_name() -> Result<()> {
        let mut constant_pool = ConstantPool::new();
        let name_index = constant_pool.push(Constant::Utf8("java/lang/Object".to_string()));
        let class_index = constant_pool.push(Constant::Class(name_index));
        assert_eq!("java/lang/Object", constant_pool.class_name(class_index)?);
        Ok(())
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let mut constant_pool = ConstantPool::new();
        constant_pool.push(Constant::Utf8("foo".to_string()));
        constant_pool.push(Constant::Long(42));
        constant_pool.push(Constant::Integer(7));

        let mut bytes = Vec::new();
        constant_pool.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        let round_tripped = ConstantPool::from_bytes(&mut cursor)?;
        assert_eq!(constant_pool, round_tripped);
        Ok(())
    }
}
