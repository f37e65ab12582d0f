use crate::Error::InvalidReferenceKind;
use crate::Result;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// The reference kind carried by a `MethodHandle` constant pool entry (JVMS §4.4.8, table 5.4.3.5-A).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReferenceKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl ReferenceKind {
    /// Read a reference kind from its one-byte encoding.
    ///
    /// # Errors
    ///
    /// if the byte is not in `1..=9`.
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<ReferenceKind> {
        let value = bytes.read_u8()?;
        Self::from_u8(value)
    }

    /// Convert a raw byte to a `ReferenceKind`.
    ///
    /// # Errors
    ///
    /// if the byte is not in `1..=9`.
    pub fn from_u8(value: u8) -> Result<ReferenceKind> {
        let kind = match value {
            1 => ReferenceKind::GetField,
            2 => ReferenceKind::GetStatic,
            3 => ReferenceKind::PutField,
            4 => ReferenceKind::PutStatic,
            5 => ReferenceKind::InvokeVirtual,
            6 => ReferenceKind::InvokeStatic,
            7 => ReferenceKind::InvokeSpecial,
            8 => ReferenceKind::NewInvokeSpecial,
            9 => ReferenceKind::InvokeInterface,
            _ => return Err(InvalidReferenceKind(value)),
        };
        Ok(kind)
    }

    /// The one-byte encoding for this reference kind.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            ReferenceKind::GetField => 1,
            ReferenceKind::GetStatic => 2,
            ReferenceKind::PutField => 3,
            ReferenceKind::PutStatic => 4,
            ReferenceKind::InvokeVirtual => 5,
            ReferenceKind::InvokeStatic => 6,
            ReferenceKind::InvokeSpecial => 7,
            ReferenceKind::NewInvokeSpecial => 8,
            ReferenceKind::InvokeInterface => 9,
        }
    }

    /// Serialize to bytes.
    ///
    /// # Errors
    ///
    /// if writing to `bytes` fails.
    pub fn to_bytes(self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u8(self.to_u8())?;
        Ok(())
    }

    /// Whether this reference kind targets a field (as opposed to a method/constructor).
    #[must_use]
    pub fn is_field(self) -> bool {
        matches!(
            self,
            ReferenceKind::GetField
                | ReferenceKind::GetStatic
                | ReferenceKind::PutField
                | ReferenceKind::PutStatic
        )
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::GetField => "GetField",
            ReferenceKind::GetStatic => "GetStatic",
            ReferenceKind::PutField => "PutField",
            ReferenceKind::PutStatic => "PutStatic",
            ReferenceKind::InvokeVirtual => "InvokeVirtual",
            ReferenceKind::InvokeStatic => "InvokeStatic",
            ReferenceKind::InvokeSpecial => "InvokeSpecial",
            ReferenceKind::NewInvokeSpecial => "NewInvokeSpecial",
            ReferenceKind::InvokeInterface => "InvokeInterface",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> Result<()> {
        for kind in [
            ReferenceKind::GetField,
            ReferenceKind::GetStatic,
            ReferenceKind::PutField,
            ReferenceKind::PutStatic,
            ReferenceKind::InvokeVirtual,
            ReferenceKind::InvokeStatic,
            ReferenceKind::InvokeSpecial,
            ReferenceKind::NewInvokeSpecial,
            ReferenceKind::InvokeInterface,
        ] {
            let mut bytes = Vec::new();
            kind.to_bytes(&mut bytes)?;
            let mut cursor = Cursor::new(bytes);
            assert_eq!(kind, ReferenceKind::from_bytes(&mut cursor)?);
        }
        Ok(())
    }

    #[test]
    fn test_invalid() {
        let mut bytes = Cursor::new(vec![0]);
        assert!(ReferenceKind::from_bytes(&mut bytes).is_err());
    }
}
