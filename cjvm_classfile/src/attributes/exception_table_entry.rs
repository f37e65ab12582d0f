use crate::Result;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// One entry of a `Code` attribute's exception table (JVMS §4.7.3).
///
/// `catch_type` is a constant pool index into a `Class` entry, or 0 to match any
/// throwable (used to implement `finally` blocks).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    /// Whether `pc` falls within this entry's protected range `[start_pc, end_pc)`.
    #[must_use]
    pub fn covers(&self, pc: u16) -> bool {
        pc >= self.start_pc && pc < self.end_pc
    }

    /// Whether this entry matches any throwable rather than a specific class.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.catch_type == 0
    }

    /// # Errors
    ///
    /// if the stream is truncated.
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<ExceptionTableEntry> {
        Ok(ExceptionTableEntry {
            start_pc: bytes.read_u16::<BigEndian>()?,
            end_pc: bytes.read_u16::<BigEndian>()?,
            handler_pc: bytes.read_u16::<BigEndian>()?,
            catch_type: bytes.read_u16::<BigEndian>()?,
        })
    }

    /// # Errors
    ///
    /// if the byte buffer cannot be written to.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u16::<BigEndian>(self.start_pc)?;
        bytes.write_u16::<BigEndian>(self.end_pc)?;
        bytes.write_u16::<BigEndian>(self.handler_pc)?;
        bytes.write_u16::<BigEndian>(self.catch_type)?;
        Ok(())
    }
}

impl fmt::Display for ExceptionTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) -> {} (catch_type = #{})",
            self.start_pc, self.end_pc, self.handler_pc, self.catch_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let entry = ExceptionTableEntry {
            start_pc: 2,
            end_pc: 10,
            handler_pc: 20,
            catch_type: 0,
        };
        assert!(!entry.covers(1));
        assert!(entry.covers(2));
        assert!(entry.covers(9));
        assert!(!entry.covers(10));
        assert!(entry.is_catch_all());
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let entry = ExceptionTableEntry {
            start_pc: 1,
            end_pc: 2,
            handler_pc: 3,
            catch_type: 4,
        };
        let mut bytes = Vec::new();
        entry.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(entry, ExceptionTableEntry::from_bytes(&mut cursor)?);
        Ok(())
    }
}
