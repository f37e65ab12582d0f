use crate::native::registry;
use crate::{JavaError, Result, VM};
use cjvm_classloader::{Class, Method, Value};
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, event_enabled, Level};

/// Bytecode recursion depth past which we raise `StackOverflowError` rather than
/// exhaust the underlying OS thread's own stack.
const MAX_CALL_DEPTH: usize = 1024;

/// One Java thread: a name, the `VM` it belongs to, and the call-stack depth it has
/// currently recursed to. Per the concurrency model, every Java thread maps to exactly
/// one OS thread (`std::thread::spawn`), so a `Thread` never migrates and needs no
/// internal locking of its own.
#[derive(Debug)]
pub struct Thread {
    id: u64,
    name: String,
    vm: Arc<VM>,
    depth: Cell<usize>,
}

impl Thread {
    #[must_use]
    pub fn new(vm: Arc<VM>, name: impl Into<String>) -> Self {
        let id = vm.next_thread_id();
        Thread {
            id,
            name: name.into(),
            vm,
            depth: Cell::new(0),
        }
    }

    /// A stable identifier used for monitor ownership (JVMS §2.11.10 `monitorenter`).
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn vm(&self) -> &Arc<VM> {
        &self.vm
    }

    /// Initialize an already-loaded class (JVMS §5.5), running `<clinit>` for it and
    /// every not-yet-initialized superclass.
    ///
    /// # Errors
    ///
    /// if linking fails or any `<clinit>` in the chain throws.
    pub fn initialize(&self, class: &Arc<Class>) -> Result<()> {
        Ok(self.vm.class_loader().initialize(class, &|class| self.run_clinit(class))?)
    }

    /// Invoke a method, dispatching to its native implementation if one is registered,
    /// otherwise running its bytecode through the interpreter.
    ///
    /// A method declared `native` is guaranteed a registered implementation by this
    /// point: `ClassLoader::link` already rejected the class with `UnsatisfiedLinkError`
    /// if one was missing.
    ///
    /// # Errors
    ///
    /// if the call stack would exceed [`MAX_CALL_DEPTH`], the method is abstract
    /// (`AbstractMethodError`), or the invoked method itself throws.
    pub fn invoke(&self, class: &Arc<Class>, method: &Arc<Method>, arguments: Vec<Value>) -> Result<Option<Value>> {
        let class_name = class.name();
        let method_name = method.name();
        let method_descriptor = method.descriptor();
        if event_enabled!(Level::DEBUG) {
            debug!("{}: invoke {class_name}.{method_name}{method_descriptor}", self.name);
        }

        if let Some(native_method) = registry().get(class_name, method_name, method_descriptor) {
            return native_method(self, arguments);
        }
        if method.is_abstract() {
            return Err(JavaError::AbstractMethodError(format!(
                "{class_name}.{method_name}{method_descriptor}"
            ))
            .into());
        }

        let depth = self.depth.get();
        if depth >= MAX_CALL_DEPTH {
            return Err(JavaError::StackOverflowError(format!("{class_name}.{method_name}{method_descriptor}")).into());
        }
        self.depth.set(depth + 1);
        let mut frame = crate::frame::Frame::new(Arc::clone(class), Arc::clone(method), arguments)?;
        let result = crate::interpreter::run(self, &mut frame);
        self.depth.set(depth);
        result
    }

    /// Run a class's `<clinit>`, if it declares one. Passed to
    /// `cjvm_classloader::ClassLoader::initialize` as the `run_clinit` callback.
    ///
    /// # Errors
    ///
    /// if the class's static initializer throws, mapped to a `cjvm_classloader::Error`
    /// since that crate has no knowledge of `cjvm_runtime`'s own error type.
    pub fn run_clinit(&self, class: &Arc<Class>) -> cjvm_classloader::Result<()> {
        let Ok(clinit) = class.find_method("<clinit>", "()V") else {
            return Ok(());
        };
        self.invoke(class, &clinit, vec![])
            .map(|_| ())
            .map_err(crate::error::to_classloader_error)
    }

    /// Load, link, and initialize a class by binary name on this thread, running its
    /// static initializers (and those of its superclasses) as needed.
    ///
    /// # Errors
    ///
    /// if the class cannot be found, linked, or its `<clinit>` throws.
    pub fn resolve_and_init(&self, name: &str) -> Result<Arc<Class>> {
        let class = self.vm.class_loader().load(name)?;
        self.vm
            .class_loader()
            .initialize(&class, &|class| self.run_clinit(class))?;
        Ok(class)
    }
}
