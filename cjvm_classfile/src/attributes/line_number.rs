use crate::Result;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// One entry of a `LineNumberTable` attribute (JVMS §4.7.12), mapping a bytecode
/// offset to a source line, for diagnostics and stack traces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

impl LineNumber {
    /// # Errors
    ///
    /// if the stream is truncated.
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<LineNumber> {
        Ok(LineNumber {
            start_pc: bytes.read_u16::<BigEndian>()?,
            line_number: bytes.read_u16::<BigEndian>()?,
        })
    }

    /// # Errors
    ///
    /// if the byte buffer cannot be written to.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u16::<BigEndian>(self.start_pc)?;
        bytes.write_u16::<BigEndian>(self.line_number)?;
        Ok(())
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: pc {}", self.line_number, self.start_pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> Result<()> {
        let line_number = LineNumber {
            start_pc: 0,
            line_number: 12,
        };
        let mut bytes = Vec::new();
        line_number.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(line_number, LineNumber::from_bytes(&mut cursor)?);
        Ok(())
    }
}
