use crate::{Configuration, Error, JavaError, Result, Thread};
use cjvm_classloader::{Class, ClassLoader, ClassPath, InternTable, LoaderId, Object, Reference, Value};
use cjvm_heap::{Allocator, MonitorRegistry};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, instrument};

/// A notional, enormous flat address space; only `Allocator`'s bookkeeping is real,
/// nothing is actually mapped.
const HEAP_SIZE: usize = 1 << 40;

/// Whether a declared-native method has a registered implementation, consulted by
/// `ClassLoader::link` so an unbound native fails linking with `UnsatisfiedLinkError`
/// instead of surfacing as an internal error on first invocation.
fn native_available(class_name: &str, method_name: &str, descriptor: &str) -> bool {
    crate::native::registry().get(class_name, method_name, descriptor).is_some()
}

/// The process-wide virtual machine: the bootstrap class loader, the object heap's
/// identity allocator, the monitor and string-intern tables every thread shares, and
/// the [`Configuration`] it was started with.
#[derive(Debug)]
pub struct VM {
    configuration: Configuration,
    class_loader: Arc<ClassLoader>,
    allocator: Allocator,
    monitors: MonitorRegistry,
    interned: InternTable,
    next_thread_id: AtomicU64,
    class_mirrors: DashMap<usize, Arc<Class>>,
}

impl VM {
    /// Boot a VM: construct the bootstrap loader over the configured class path, then
    /// load and link `java.lang.Object` and `java.lang.Class` so every later class load
    /// has a superclass and a mirror type to attach to.
    ///
    /// # Errors
    ///
    /// if `java.lang.Object` or `java.lang.Class` cannot be found on the class path.
    #[instrument(level = "debug", skip(configuration))]
    pub fn new(configuration: Configuration) -> Result<Arc<VM>> {
        let class_path = ClassPath::parse(configuration.class_path())?;
        let class_loader = ClassLoader::new(LoaderId::Bootstrap, class_path, None, Some(native_available));
        let vm = Arc::new(VM {
            configuration,
            class_loader,
            allocator: Allocator::new(0, HEAP_SIZE),
            monitors: MonitorRegistry::new(),
            interned: InternTable::new(),
            next_thread_id: AtomicU64::new(1),
            class_mirrors: DashMap::new(),
        });

        let bootstrap = Thread::new(Arc::clone(&vm), "bootstrap");
        bootstrap.resolve_and_init("java/lang/Object")?;
        bootstrap.resolve_and_init("java/lang/Class")?;
        info!("VM bootstrapped");
        Ok(vm)
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn class_loader(&self) -> &Arc<ClassLoader> {
        &self.class_loader
    }

    #[must_use]
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    #[must_use]
    pub fn monitors(&self) -> &MonitorRegistry {
        &self.monitors
    }

    #[must_use]
    pub fn interned(&self) -> &InternTable {
        &self.interned
    }

    /// Allocate a new, unique thread id for monitor ownership tracking.
    pub fn next_thread_id(&self) -> u64 {
        self.next_thread_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Record which `Class` a `java.lang.Class` mirror instance stands for, so a native
    /// method holding only the mirror (e.g. `Class.isInstance`) can recover it.
    pub fn register_mirror(&self, mirror_identity: usize, class: Arc<Class>) {
        self.class_mirrors.entry(mirror_identity).or_insert(class);
    }

    /// Recover the `Class` a `java.lang.Class` mirror instance stands for.
    ///
    /// # Errors
    ///
    /// if `mirror_identity` was never registered via [`Self::register_mirror`].
    pub fn class_for_mirror(&self, mirror_identity: usize) -> Result<Arc<Class>> {
        self.class_mirrors
            .get(&mirror_identity)
            .map(|entry| Arc::clone(&entry))
            .ok_or_else(|| Error::InternalError("no class registered for this mirror".to_string()))
    }

    /// Reserve an identity address for a newly allocated object or array. Purely
    /// bookkeeping: nothing is mapped at the returned address, but it is stable and
    /// unique for the object's lifetime, and backs `System.identityHashCode`.
    ///
    /// # Errors
    ///
    /// if the heap's notional address space is exhausted.
    pub fn allocate_identity(&self) -> Result<usize> {
        self.allocator.alloc(1).map_err(|error| Error::Java(JavaError::OutOfMemoryError(error.to_string())))
    }

    /// Run `main(String[])` on `main_class`, on a fresh main thread.
    ///
    /// # Errors
    ///
    /// if the main class or method cannot be found, or `main` throws.
    #[instrument(level = "info", skip(self))]
    pub fn run(self: &Arc<VM>) -> Result<()> {
        let main_class_name = self
            .configuration
            .main_class()
            .ok_or_else(|| Error::ConfigurationError("no main class configured".to_string()))?
            .to_string();

        let thread = Thread::new(Arc::clone(self), "main");
        let class = thread.resolve_and_init(&main_class_name)?;
        let method = class.find_method("main", "([Ljava/lang/String;)V")?;

        let arguments = self.build_argument_array(&thread, &class)?;
        thread.invoke(&class, &method, vec![arguments])?;
        Ok(())
    }

    /// Build the `String[]` passed to `main`, converting the configuration's program
    /// arguments into interned `java.lang.String` instances.
    fn build_argument_array(&self, thread: &Thread, main_class: &Arc<Class>) -> Result<Value> {
        let _ = main_class;
        let string_class = thread.resolve_and_init("java/lang/String")?;
        let array_class = self.class_loader.load("[Ljava/lang/String;")?;

        let mut elements = Vec::with_capacity(self.configuration.arguments().len());
        for argument in self.configuration.arguments() {
            elements.push(self.new_string(&string_class, argument)?);
        }
        let object_array = cjvm_classloader::ObjectArray {
            class: array_class,
            elements: Arc::new(parking_lot::RwLock::new(elements)),
        };
        Ok(Value::from_reference(Reference::Array(object_array)))
    }

    /// Build a `java.lang.String` instance wrapping `text`, without interning it.
    ///
    /// `java.lang.String`'s internal representation (a `char[]` or `byte[]` field
    /// named `value`) is a core-library implementation detail; this runtime always
    /// models it as a `char[]` field named `value`, which is what `java_lang_string`'s
    /// native methods expect to find.
    ///
    /// # Errors
    ///
    /// if `string_class` has no `value` field, or a string's backing array class
    /// cannot be loaded.
    pub fn new_string(&self, string_class: &Arc<Class>, text: &str) -> Result<Value> {
        let chars: Vec<u16> = text.encode_utf16().collect();
        let char_array = Reference::CharArray(Arc::new(parking_lot::RwLock::new(chars)));
        let object = Object::new(Arc::clone(string_class))?;
        object.set_field("value", Value::from_reference(char_array))?;
        Ok(Value::from_reference(Reference::Object(object)))
    }
}
