use crate::Error::InvalidVersion;
use crate::Result;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

/// The class file format version, as the `(minor, major)` pair from JVMS §4.1.
///
/// Only major versions up to 52 (Java 8) are accepted; this core targets a single
/// Java 8-era class library layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

/// Largest major version this crate accepts (Java SE 8).
pub const MAX_MAJOR_VERSION: u16 = 52;

impl Version {
    /// Read a version from a class file header.
    ///
    /// # Errors
    ///
    /// if the major version exceeds [`MAX_MAJOR_VERSION`].
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<Version> {
        let minor = bytes.read_u16::<BigEndian>()?;
        let major = bytes.read_u16::<BigEndian>()?;
        if major > MAX_MAJOR_VERSION {
            return Err(InvalidVersion { major, minor });
        }
        Ok(Version { major, minor })
    }

    /// Serialize the version to bytes.
    ///
    /// # Errors
    ///
    /// if writing to `bytes` fails.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u16::<BigEndian>(self.minor)?;
        bytes.write_u16::<BigEndian>(self.major)?;
        Ok(())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> Result<()> {
        let version = Version { major: 52, minor: 0 };
        let mut bytes = Vec::new();
        version.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(version, Version::from_bytes(&mut cursor)?);
        Ok(())
    }

    #[test]
    fn test_version_too_new() {
        let mut bytes = Cursor::new(vec![0, 0, 0, 61]);
        assert!(matches!(
            Version::from_bytes(&mut bytes),
            Err(crate::Error::InvalidVersion { major: 61, minor: 0 })
        ));
    }
}
