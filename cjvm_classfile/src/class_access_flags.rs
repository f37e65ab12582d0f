use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Class access and property flags (JVMS §4.1, table 4.1-B).
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

impl ClassAccessFlags {
    /// Read access flags from their on-the-wire `u16` encoding.
    #[must_use]
    pub fn from_bits_retain_value(value: u16) -> ClassAccessFlags {
        ClassAccessFlags::from_bits_retain(value)
    }
}

impl fmt::Display for ClassAccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
