use crate::class_path_entry::ClassPathEntry;
use crate::Error::ClassNotFound;
use crate::Result;
use cjvm_classfile::ClassFile;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// An ordered list of directories and jars searched, in order, for class files (JVMS
/// §5.3.2).
#[derive(Debug, PartialEq)]
pub struct ClassPath {
    entries: Vec<ClassPathEntry>,
}

impl ClassPath {
    #[must_use]
    pub fn new(entries: Vec<ClassPathEntry>) -> Self {
        ClassPath { entries }
    }

    /// Build a class path from a platform-style `:`-separated string of directory and
    /// jar paths.
    ///
    /// # Errors
    ///
    /// if any entry names a file that is not a readable archive.
    pub fn parse(class_path: &str) -> Result<Self> {
        let entries = class_path
            .split(':')
            .filter(|entry| !entry.is_empty())
            .map(ClassPathEntry::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(ClassPath::new(entries))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassPathEntry> {
        self.entries.iter()
    }

    /// Read a class file by internal name, searching entries in order.
    ///
    /// # Errors
    ///
    /// if no entry on the class path has this class.
    #[instrument(level = "trace", fields(name = ?name.as_ref()), skip(self))]
    pub fn read_class<S: AsRef<str>>(&self, name: S) -> Result<Arc<ClassFile>> {
        let name = name.as_ref();
        for entry in self.iter() {
            if let Ok(class_file) = entry.read_class(name) {
                return Ok(class_file);
            }
        }
        Err(ClassNotFound(name.to_string()))
    }
}

impl fmt::Display for ClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_path = self.entries.iter().map(ClassPathEntry::name).collect::<Vec<_>>().join(":");
        write!(f, "{class_path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_entries() -> Result<()> {
        let class_path = ClassPath::parse(".:..")?;
        assert_eq!(".:..", class_path.to_string());
        Ok(())
    }

    #[test]
    fn test_read_class_not_found() -> Result<()> {
        let class_path = ClassPath::parse(".")?;
        let result = class_path.read_class("does/not/Exist");
        assert!(matches!(result, Err(crate::Error::ClassNotFound(_))));
        Ok(())
    }
}
