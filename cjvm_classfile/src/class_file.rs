use crate::Error::{InvalidConstantPoolIndexType, InvalidMagicNumber};
use crate::attributes::Attribute;
use crate::class_access_flags::ClassAccessFlags;
use crate::constant::Constant;
use crate::constant_pool::ConstantPool;
use crate::field::Field;
use crate::method::Method;
use crate::version::Version;
use crate::Result;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::Cursor;

const MAGIC: u32 = 0xCAFE_BABE;

/// The parsed contents of a `.class` file (JVMS §4.1). Immutable: this is the raw
/// descriptor the class loader consumes to build a linked, runtime `Class`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassFile {
    pub version: Version,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// This class's binary name (slash form, e.g. `java/lang/Object`).
    ///
    /// # Errors
    ///
    /// if `this_class` does not resolve to a `Class` constant.
    pub fn class_name(&self) -> Result<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    /// The superclass's binary name. `None` only for `java/lang/Object`, whose
    /// `super_class` index is 0.
    ///
    /// # Errors
    ///
    /// if `super_class` is non-zero but does not resolve to a `Class` constant.
    pub fn super_class_name(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        Ok(Some(self.constant_pool.class_name(self.super_class)?))
    }

    /// Binary names of the directly implemented/extended interfaces.
    ///
    /// # Errors
    ///
    /// if any interface index does not resolve to a `Class` constant.
    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    /// The `SourceFile` attribute's value, if present.
    ///
    /// # Errors
    ///
    /// if the attribute is present but its index does not resolve to a `Utf8` constant.
    pub fn source_file(&self) -> Result<Option<&str>> {
        for attribute in &self.attributes {
            if let Attribute::SourceFile {
                source_file_index, ..
            } = attribute
            {
                return Ok(Some(self.constant_pool.utf8(*source_file_index)?));
            }
        }
        Ok(None)
    }

    /// Deserialize a full class file: magic number, version, constant pool, access
    /// flags, this/super class, interfaces, fields, methods, and class attributes.
    ///
    /// # Errors
    ///
    /// if the magic number or version is invalid, or any section fails to parse.
    pub fn from_bytes(bytes: &mut Cursor<Vec<u8>>) -> Result<ClassFile> {
        let magic = bytes.read_u32::<BigEndian>()?;
        if magic != MAGIC {
            return Err(InvalidMagicNumber(magic));
        }
        let version = Version::from_bytes(bytes)?;
        let constant_pool = ConstantPool::from_bytes(bytes)?;
        let access_flags = ClassAccessFlags::from_bits_retain_value(bytes.read_u16::<BigEndian>()?);
        let this_class = bytes.read_u16::<BigEndian>()?;
        let super_class = bytes.read_u16::<BigEndian>()?;

        let interfaces_count = bytes.read_u16::<BigEndian>()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(bytes.read_u16::<BigEndian>()?);
        }

        let fields_count = bytes.read_u16::<BigEndian>()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.push(Field::from_bytes(&constant_pool, bytes)?);
        }

        let methods_count = bytes.read_u16::<BigEndian>()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(Method::from_bytes(&constant_pool, bytes)?);
        }

        let attributes_count = bytes.read_u16::<BigEndian>()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.push(Attribute::from_bytes(&constant_pool, bytes)?);
        }

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Serialize this class file back to bytes.
    ///
    /// # Errors
    ///
    /// if any section overflows its wire width.
    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> Result<()> {
        bytes.write_u32::<BigEndian>(MAGIC)?;
        self.version.to_bytes(bytes)?;
        self.constant_pool.to_bytes(bytes)?;
        bytes.write_u16::<BigEndian>(self.access_flags.bits())?;
        bytes.write_u16::<BigEndian>(self.this_class)?;
        bytes.write_u16::<BigEndian>(self.super_class)?;

        bytes.write_u16::<BigEndian>(u16::try_from(self.interfaces.len())?)?;
        for interface in &self.interfaces {
            bytes.write_u16::<BigEndian>(*interface)?;
        }

        bytes.write_u16::<BigEndian>(u16::try_from(self.fields.len())?)?;
        for field in &self.fields {
            field.to_bytes(bytes)?;
        }

        bytes.write_u16::<BigEndian>(u16::try_from(self.methods.len())?)?;
        for method in &self.methods {
            method.to_bytes(bytes)?;
        }

        bytes.write_u16::<BigEndian>(u16::try_from(self.attributes.len())?)?;
        for attribute in &self.attributes {
            attribute.to_bytes(bytes)?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_name = self.class_name().unwrap_or("<unknown>");
        writeln!(f, "class {class_name} (version {})", self.version)?;
        writeln!(f, "  access flags: {}", self.access_flags)?;
        writeln!(f, "  fields: {}", self.fields.len())?;
        writeln!(f, "  methods: {}", self.methods.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_access_flags::FieldAccessFlags;
    use crate::FieldType;

    fn sample_class_file() -> Result<ClassFile> {
        let mut constant_pool = ConstantPool::new();
        let this_name = constant_pool.push(Constant::Utf8("Sample".to_string()));
        let this_class = constant_pool.push(Constant::Class(this_name));
        let super_name = constant_pool.push(Constant::Utf8("java/lang/Object".to_string()));
        let super_class = constant_pool.push(Constant::Class(super_name));
        let field_name = constant_pool.push(Constant::Utf8("value".to_string()));
        let field_descriptor = constant_pool.push(Constant::Utf8("I".to_string()));

        Ok(ClassFile {
            version: Version { major: 52, minor: 0 },
            constant_pool,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![Field {
                access_flags: FieldAccessFlags::PRIVATE,
                name_index: field_name,
                descriptor_index: field_descriptor,
                field_type: FieldType::parse("I")?,
                attributes: vec![],
            }],
            methods: vec![],
            attributes: vec![],
        })
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let class_file = sample_class_file()?;
        let mut bytes = Vec::new();
        class_file.to_bytes(&mut bytes)?;
        let mut cursor = Cursor::new(bytes);
        assert_eq!(class_file, ClassFile::from_bytes(&mut cursor)?);
        Ok(())
    }

    #[test]
    fn test_invalid_magic() {
        let mut cursor = Cursor::new(vec![0, 0, 0, 0]);
        assert!(matches!(
            ClassFile::from_bytes(&mut cursor),
            Err(InvalidMagicNumber(0))
        ));
    }

    #[test]
    fn test_class_name() -> Result<()> {
        let class_file = sample_class_file()?;
        assert_eq!("Sample", class_file.class_name()?);
        assert_eq!(Some("java/lang/Object"), class_file.super_class_name()?);
        Ok(())
    }
}
