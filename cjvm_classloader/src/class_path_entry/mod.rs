mod directory;
mod jar;

pub use directory::Directory;
pub use jar::Jar;

use crate::Result;
use cjvm_classfile::ClassFile;
use std::path::PathBuf;
use std::sync::Arc;

/// One entry of a class path: either a directory of loose `.class` files or a jar/zip
/// archive of them.
#[derive(Debug, PartialEq)]
pub enum ClassPathEntry {
    Directory(Directory),
    Jar(Jar),
}

impl ClassPathEntry {
    /// Classify a path as a directory or archive and open it.
    ///
    /// # Errors
    ///
    /// if the path names a file that is not a readable zip/jar archive.
    pub fn new<S: AsRef<str>>(path: S) -> Result<Self> {
        let path = path.as_ref();
        if PathBuf::from(path).is_file() {
            Ok(ClassPathEntry::Jar(Jar::new(path)?))
        } else {
            Ok(ClassPathEntry::Directory(Directory::new(path)))
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            ClassPathEntry::Directory(directory) => directory.name(),
            ClassPathEntry::Jar(jar) => jar.name(),
        }
    }

    /// Read a class file by internal (slash-separated) name from this entry.
    ///
    /// # Errors
    ///
    /// if this entry has no such class.
    pub fn read_class<S: AsRef<str>>(&self, name: S) -> Result<Arc<ClassFile>> {
        match self {
            ClassPathEntry::Directory(directory) => directory.read_class(name),
            ClassPathEntry::Jar(jar) => jar.read_class(name),
        }
    }
}
