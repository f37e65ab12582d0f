use crate::{Result, Thread};
use ahash::AHashMap;
use cjvm_classloader::Value;
use std::sync::OnceLock;

/// A native method is implemented in Rust and invoked in place of bytecode whenever a
/// method's `ACC_NATIVE` flag is set.
pub type NativeMethod = fn(thread: &Thread, arguments: Vec<Value>) -> Result<Option<Value>>;

/// Lookup table from `"{class}.{method}{descriptor}"` to its Rust implementation.
#[derive(Debug)]
pub struct NativeRegistry {
    methods: AHashMap<String, NativeMethod>,
}

impl NativeRegistry {
    #[must_use]
    pub fn new() -> Self {
        NativeRegistry {
            methods: AHashMap::new(),
        }
    }

    pub fn register(&mut self, class_name: &str, method_name: &str, method_descriptor: &str, method: NativeMethod) {
        self.methods
            .insert(format!("{class_name}.{method_name}{method_descriptor}"), method);
    }

    #[must_use]
    pub fn get(&self, class_name: &str, method_name: &str, method_descriptor: &str) -> Option<NativeMethod> {
        let signature = format!("{class_name}.{method_name}{method_descriptor}");
        self.methods.get(&signature).copied()
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        let mut registry = NativeRegistry::new();
        super::java_lang_object::register(&mut registry);
        super::java_lang_class::register(&mut registry);
        super::java_lang_string::register(&mut registry);
        super::java_lang_system::register(&mut registry);
        super::java_lang_throwable::register(&mut registry);
        super::java_lang_thread::register(&mut registry);
        super::java_security_access_controller::register(&mut registry);
        super::java_lang_invoke_method_handle_natives::register(&mut registry);
        super::sun_reflect_reflection::register(&mut registry);
        registry
    }
}

/// The process-wide native registry, built once on first access.
pub fn registry() -> &'static NativeRegistry {
    static REGISTRY: OnceLock<NativeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(NativeRegistry::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = NativeRegistry::new();
        let method: NativeMethod = |_, _| Ok(None);
        registry.register("java/lang/Object", "hashCode", "()I", method);
        assert!(registry.get("java/lang/Object", "hashCode", "()I").is_some());
        assert!(registry.get("java/lang/Object", "wait", "()V").is_none());
    }

    #[test]
    fn test_default_registry_has_object_get_class() {
        let registry = registry();
        assert!(registry.get("java/lang/Object", "getClass", "()Ljava/lang/Class;").is_some());
    }
}
