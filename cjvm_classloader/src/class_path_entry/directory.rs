use crate::Error::ClassNotFound;
use crate::Result;
use cjvm_classfile::ClassFile;
use dashmap::DashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// A directory in the class path, read directly by joining the dotted class name into
/// a path under it -- the class path is flat per package, never walked.
#[derive(Debug)]
pub struct Directory {
    path: PathBuf,
    class_files: DashMap<String, Arc<ClassFile>>,
}

impl Directory {
    #[must_use]
    pub fn new<S: AsRef<str>>(path: S) -> Self {
        Directory {
            path: PathBuf::from(path.as_ref()),
            class_files: DashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Read a class from the directory, caching the parsed `ClassFile`.
    ///
    /// # Errors
    ///
    /// if the class file is not found under this directory, or cannot be parsed.
    #[instrument(level = "trace", fields(name = ?name.as_ref()), skip(self))]
    pub fn read_class<S: AsRef<str>>(&self, name: S) -> Result<Arc<ClassFile>> {
        let name = name.as_ref();
        if let Some(class_file) = self.class_files.get(name) {
            return Ok(Arc::clone(class_file.value()));
        }

        let path = name
            .split('/')
            .fold(self.path.clone(), |path, part| path.join(part))
            .with_extension("class");
        if !path.is_file() {
            return Err(ClassNotFound(name.to_string()));
        }

        let bytes = std::fs::read(path)?;
        let mut cursor = io::Cursor::new(bytes);
        let class_file = Arc::new(ClassFile::from_bytes(&mut cursor)?);
        self.class_files.insert(name.to_string(), Arc::clone(&class_file));
        Ok(class_file)
    }
}

impl Default for Directory {
    fn default() -> Self {
        Directory::new(".")
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjvm_classfile::{ClassAccessFlags, Constant, ConstantPool, Version};

    #[test]
    fn test_name() {
        let directory = Directory::new("test");
        assert_eq!("test", directory.name());
    }

    #[test]
    fn test_read_class_not_found() {
        let directory = Directory::new("test");
        let result = directory.read_class("does.not.Exist");
        assert!(matches!(result, Err(crate::Error::ClassNotFound(_))));
    }

    #[test]
    fn test_read_class_caches() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let directory = Directory::new(temp_dir.path().to_string_lossy());

        let mut constant_pool = ConstantPool::new();
        let name_index = constant_pool.push(Constant::Utf8("Hello".to_string()));
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
        std::fs::write(temp_dir.path().join("Hello.class"), bytes)?;

        for _ in 0..2 {
            let class_file = directory.read_class("Hello")?;
            assert_eq!("Hello", class_file.class_name()?);
        }
        Ok(())
    }
}
