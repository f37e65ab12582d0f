use crate::Error::ClassNotFound;
use crate::Result;
use cjvm_classfile::ClassFile;
use dashmap::DashMap;
use std::io;
use std::sync::Arc;
use tracing::{debug, instrument};
use zip::ZipArchive;

/// A jar or zip in the class path. Every class file it contains is decompressed and
/// parsed eagerly at open time, since a jar's central directory has to be scanned in
/// full anyway and JVMS gives no guarantee entries are added to the underlying archive
/// afterward.
#[derive(Debug)]
pub struct Jar {
    name: String,
    class_files: DashMap<String, Arc<ClassFile>>,
}

impl Jar {
    /// Open a jar from a path on disk.
    ///
    /// # Errors
    ///
    /// if the file cannot be read or is not a valid zip archive.
    pub fn new<S: AsRef<str>>(path: S) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Jar::from_bytes(path, &bytes)
    }

    /// Parse a jar from bytes already in memory.
    ///
    /// # Errors
    ///
    /// if the bytes are not a valid zip archive.
    #[instrument(level = "trace", skip(bytes))]
    pub fn from_bytes<S: AsRef<str>>(name: S, bytes: &[u8]) -> Result<Self> {
        let reader = io::Cursor::new(bytes);
        let mut archive = ZipArchive::new(reader)?;
        let class_files = DashMap::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let entry_name = entry.name().to_string();
            if !entry_name.ends_with(".class") {
                continue;
            }
            let class_name = entry_name.trim_end_matches(".class").to_string();

            let mut class_bytes = Vec::new();
            io::copy(&mut entry, &mut class_bytes)?;
            let mut cursor = io::Cursor::new(class_bytes);
            match ClassFile::from_bytes(&mut cursor) {
                Ok(class_file) => {
                    class_files.insert(class_name, Arc::new(class_file));
                }
                Err(error) => debug!("failed to parse {class_name} in jar: {error:?}"),
            }
        }

        Ok(Jar {
            name: name.as_ref().to_string(),
            class_files,
        })
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    /// Read a class from this jar's pre-parsed table.
    ///
    /// # Errors
    ///
    /// if no entry with this class name was present in the archive.
    #[instrument(level = "trace", fields(name = ?name.as_ref()), skip(self))]
    pub fn read_class<S: AsRef<str>>(&self, name: S) -> Result<Arc<ClassFile>> {
        let name = name.as_ref();
        self.class_files
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClassNotFound(name.to_string()))
    }
}

impl PartialEq for Jar {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_test_jar(path: &std::path::Path, entries: &[(&str, Vec<u8>)]) -> Result<()> {
        let mut archive = zip::ZipWriter::new(std::fs::File::create(path)?);
        for (name, bytes) in entries {
            archive.start_file(*name, SimpleFileOptions::default())?;
            archive.write_all(bytes)?;
        }
        archive.finish()?;
        Ok(())
    }

    fn class_bytes(name: &str) -> cjvm_classfile::Result<Vec<u8>> {
        use cjvm_classfile::{ClassAccessFlags, Constant, ConstantPool, Version};
        let mut constant_pool = ConstantPool::new();
        let name_index = constant_pool.push(Constant::Utf8(name.to_string()));
        let this_class = constant_pool.push(Constant::Class(name_index));
        let class_file = ClassFile {
            version: Version { major: 52, minor: 0 },
            constant_pool,
            access_flags: ClassAccessFlags::PUBLIC,
            this_class,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };
        let mut bytes = Vec::new();
        class_file.to_bytes(&mut bytes)?;
        Ok(bytes)
    }

    #[test]
    fn test_read_class_not_found() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let jar_path = temp_dir.path().join("empty.jar");
        write_test_jar(&jar_path, &[])?;
        let jar = Jar::new(jar_path.to_string_lossy())?;
        assert!(matches!(jar.read_class("Foo"), Err(ClassNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_read_class_caches() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let jar_path = temp_dir.path().join("classes.jar");
        write_test_jar(&jar_path, &[("Hello.class", class_bytes("Hello")?)])?;
        let jar = Jar::new(jar_path.to_string_lossy())?;
        for _ in 0..2 {
            let class_file = jar.read_class("Hello")?;
            assert_eq!("Hello", class_file.class_name()?);
        }
        Ok(())
    }

    #[test]
    fn test_skips_unparseable_class() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let jar_path = temp_dir.path().join("bad.jar");
        write_test_jar(&jar_path, &[("Bad.class", vec![0x00, 0x01, 0x02])])?;
        let jar = Jar::new(jar_path.to_string_lossy())?;
        assert!(matches!(jar.read_class("Bad"), Err(ClassNotFound(_))));
        Ok(())
    }
}
