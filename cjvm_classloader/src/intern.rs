use crate::resolved_pool::StringRef;
use crate::Result;
use dashmap::DashMap;

/// The JVM's interned-string pool (JLS §3.10.5 / `String.intern`): every `String`
/// constant pool literal, and every `String.intern()` call, shares one object per
/// distinct sequence of characters.
///
/// Building the actual `java.lang.String` instance needs the bootstrapped
/// `java.lang.String` class and a `char[]` to back it, neither of which this crate
/// knows how to construct on its own; `get_or_insert` takes a builder closure supplied
/// by whatever has already bootstrapped those classes.
#[derive(Debug, Default)]
pub struct InternTable {
    strings: DashMap<String, StringRef>,
}

impl InternTable {
    #[must_use]
    pub fn new() -> Self {
        InternTable { strings: DashMap::new() }
    }

    /// Look up `text` in the pool, building and caching a new `String` object via
    /// `build` if this is the first time it has been interned.
    ///
    /// # Errors
    ///
    /// if `build` fails to construct a `String` instance.
    pub fn get_or_insert<F>(&self, text: &str, build: F) -> Result<StringRef>
    where
        F: FnOnce(&str) -> Result<StringRef>,
    {
        if let Some(reference) = self.strings.get(text) {
            return Ok(reference.clone());
        }
        let reference = build(text)?;
        Ok(self
            .strings
            .entry(text.to_string())
            .or_insert(reference)
            .clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;
    use parking_lot::RwLock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fake_string(length: usize) -> StringRef {
        Arc::new(RwLock::new(Reference::CharArray(Arc::new(RwLock::new(vec![0u16; length])))))
    }

    #[test]
    fn test_interns_same_text_once() -> Result<()> {
        let table = InternTable::new();
        let calls = AtomicUsize::new(0);
        let build = |text: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(fake_string(text.len()))
        };
        let first = table.get_or_insert("hello", build)?;
        let second = table.get_or_insert("hello", build)?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(1, calls.load(Ordering::SeqCst));
        Ok(())
    }

    #[test]
    fn test_distinct_text_not_shared() -> Result<()> {
        let table = InternTable::new();
        let a = table.get_or_insert("a", |_| Ok(fake_string(1)))?;
        let b = table.get_or_insert("b", |_| Ok(fake_string(1)))?;
        assert!(!Arc::ptr_eq(&a, &b));
        Ok(())
    }
}
