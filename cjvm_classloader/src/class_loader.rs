use crate::class::{Class, ClassState};
use crate::class_path::ClassPath;
use crate::field::Field;
use crate::method::Method;
use crate::resolved_pool::{ClassRef, MemberRef, ResolutionState, StringRef};
use crate::value::Value;
use crate::Error::{
    ClassNotFound, FieldNotFound, InvalidConstant, LinkageError, MethodNotFound, NoClassDefFound,
    UnsatisfiedLinkError,
};
use crate::Result;
use cjvm_classfile::{Constant, FieldType, ReferenceKind};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// The nine names `ClassLoader::load` synthesizes a descriptor for instead of
/// consulting the class path (JVMS §2.3, §4.3.2): the eight primitive types plus
/// `void`, as returned by `BaseType::java_name` and `void`'s literal spelling.
const PRIMITIVE_NAMES: [&str; 9] = [
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

/// Checks whether a native method has a registered implementation, so linking can fail
/// with `UnsatisfiedLinkError` up front (JVMS §5.4, "a native method that cannot be
/// bound fails linking") instead of at first invocation. Supplied by `cjvm_runtime`,
/// which owns the native method registry this crate cannot see.
pub type NativeAvailability = fn(class_name: &str, method_name: &str, descriptor: &str) -> bool;

/// Identifies which loader defined a class: the bootstrap loader, or a numbered user
/// loader. JVMS identity for loaded classes is always `(loader, binary name)`, never
/// binary name alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LoaderId {
    Bootstrap,
    User(u64),
}

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderId::Bootstrap => write!(f, "bootstrap"),
            LoaderId::User(id) => write!(f, "user#{id}"),
        }
    }
}

/// A delegating class loader: finds, defines, links, and initializes classes,
/// following the parent-delegation model (JVMS §5.3) and caching every class it has
/// ever defined by binary name.
pub struct ClassLoader {
    id: LoaderId,
    parent: Option<Arc<ClassLoader>>,
    class_path: ClassPath,
    classes: DashMap<String, Arc<Class>>,
    init_locks: DashMap<String, Arc<Mutex<()>>>,
    native_available: Option<NativeAvailability>,
}

impl ClassLoader {
    #[must_use]
    pub fn new(
        id: LoaderId,
        class_path: ClassPath,
        parent: Option<Arc<ClassLoader>>,
        native_available: Option<NativeAvailability>,
    ) -> Arc<Self> {
        Arc::new(ClassLoader {
            id,
            parent,
            class_path,
            classes: DashMap::new(),
            init_locks: DashMap::new(),
            native_available,
        })
    }

    #[must_use]
    pub fn id(&self) -> LoaderId {
        self.id
    }

    #[must_use]
    pub fn class_path(&self) -> &ClassPath {
        &self.class_path
    }

    /// Look up a class already defined by this loader (or, transitively, a loader it
    /// delegated to), without attempting to load it.
    #[must_use]
    pub fn find_loaded(&self, name: &str) -> Option<Arc<Class>> {
        let internal = name.replace('.', "/");
        self.classes.get(&internal).map(|entry| Arc::clone(&entry))
    }

    /// Load a class by binary name, consulting the parent loader first (JVMS §5.3
    /// delegation), then this loader's class path, then (for array types) synthesizing
    /// the array class directly.
    ///
    /// # Errors
    ///
    /// if no class path entry, parent loader, or array synthesis produces the class.
    #[instrument(level = "trace", fields(name = %name), skip(self))]
    pub fn load(&self, name: &str) -> Result<Arc<Class>> {
        let internal = name.replace('.', "/");

        if let Some(class) = self.classes.get(&internal) {
            return Ok(Arc::clone(&class));
        }

        if PRIMITIVE_NAMES.contains(&internal.as_str()) {
            let class = Class::new_primitive(internal.clone(), self.id);
            self.classes.insert(internal, Arc::clone(&class));
            return Ok(class);
        }

        if let Some(parent) = &self.parent
            && let Ok(class) = parent.load(&internal)
        {
            self.classes.insert(internal.clone(), Arc::clone(&class));
            return Ok(class);
        }

        let class = if internal.starts_with('[') {
            self.load_array_class(&internal)?
        } else {
            self.load_and_link(&internal)?
        };

        match self.classes.entry(internal) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&class));
                Ok(class)
            }
        }
    }

    fn load_and_link(&self, internal_name: &str) -> Result<Arc<Class>> {
        let class_file = self.class_path.read_class(internal_name)?;
        let class = Class::from_class_file((*class_file).clone(), self.id)?;
        let class = Arc::new(class);
        self.link(&class)?;
        Ok(class)
    }

    /// Resolve (loading if necessary) an array class's component type and synthesize
    /// the array class over it.
    fn load_array_class(&self, internal_name: &str) -> Result<Arc<Class>> {
        let component = FieldType::parse(internal_name)
            .ok()
            .and_then(|field_type| match field_type {
                FieldType::Array(component) => Some(*component),
                _ => None,
            })
            .ok_or_else(|| ClassNotFound(internal_name.to_string()))?;

        if let FieldType::Object(ref class_name) = component {
            self.load(class_name)?;
        }

        let object_class = self.load("java/lang/Object")?;
        Ok(Class::new_array(
            internal_name.to_string(),
            component,
            self.id,
            object_class,
            Vec::new(),
        ))
    }

    /// Link a class that has already been defined: resolve (and link) its superclass
    /// and interfaces first, then finish laying out its own instance fields on top.
    ///
    /// # Errors
    ///
    /// if the superclass or any interface cannot be loaded.
    pub fn link(&self, class: &Arc<Class>) -> Result<()> {
        if class.state() != ClassState::Loaded {
            return Ok(());
        }

        let Some(class_file) = class.class_file() else {
            // Array classes are constructed already linked.
            return Ok(());
        };

        let super_class = if class_file.super_class == 0 {
            None
        } else {
            let name = class_file.super_class_name()?.ok_or_else(|| {
                LinkageError(format!("{} has a malformed superclass reference", class.name()))
            })?;
            let super_class = self.load(name)?;
            self.link(&super_class)?;
            Some(super_class)
        };

        let mut interfaces = Vec::with_capacity(class_file.interfaces.len());
        for interface_name in class_file.interface_names()? {
            let interface = self.load(interface_name)?;
            self.link(&interface)?;
            interfaces.push(interface);
        }

        class.finish_link(super_class, interfaces);

        if let Some(native_available) = self.native_available {
            for method in class.declared_methods() {
                if method.is_native()
                    && !native_available(class.name(), method.name(), method.descriptor())
                {
                    return Err(UnsatisfiedLinkError(format!(
                        "{}.{}{}",
                        class.name(),
                        method.name(),
                        method.descriptor()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Initialize a class (JVMS §5.5): link it, initialize its superclass first, then
    /// run `<clinit>` via `run_clinit` -- this crate has no interpreter of its own, so
    /// bytecode execution is always the caller's responsibility. `run_clinit` is invoked
    /// once per class in the superclass chain that still needs initializing, so it must
    /// be reusable rather than consumed.
    ///
    /// # Errors
    ///
    /// if linking fails, the superclass failed to initialize, or `run_clinit` errors
    /// (the class is left in the `Error` state either way, matching `NoClassDefFoundError`
    /// on every subsequent attempt).
    pub fn initialize(&self, class: &Arc<Class>, run_clinit: &dyn Fn(&Arc<Class>) -> Result<()>) -> Result<()> {
        if class.state() == ClassState::Inited {
            return Ok(());
        }
        if class.state() == ClassState::Error {
            return Err(NoClassDefFound(class.name().to_string()));
        }

        self.link(class)?;

        let lock = Arc::clone(
            self.init_locks
                .entry(class.name().to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let _guard = lock.lock();

        match class.state() {
            ClassState::Inited => return Ok(()),
            ClassState::Error => return Err(NoClassDefFound(class.name().to_string())),
            ClassState::Initializing => return Ok(()),
            _ => {}
        }

        if let Some(super_class) = class.super_class() {
            self.initialize(&super_class, run_clinit)?;
        }

        class.set_state(ClassState::Initializing);
        match run_clinit(class) {
            Ok(()) => {
                class.set_state(ClassState::Inited);
                Ok(())
            }
            Err(error) => {
                class.set_state(ClassState::Error);
                Err(error)
            }
        }
    }

    /// Resolve constant pool index `index` of `class` as a `Class` reference (JVMS
    /// §5.4.3.1), loading and linking the named class on first use.
    ///
    /// # Errors
    ///
    /// if the index does not name a `Class` constant, or the class cannot be loaded.
    pub fn resolve_class(&self, class: &Arc<Class>, index: u16) -> Result<ClassRef> {
        let state = class.resolved_pool().resolve(index, || {
            let Some(class_file) = class.class_file() else {
                return Err(InvalidConstant(index));
            };
            let name = class_file.constant_pool.class_name(index)?;
            let resolved = self.load(name)?;
            self.link(&resolved)?;
            Ok::<_, crate::Error>(ResolutionState::ResolvedClass(resolved))
        })?;
        match state {
            ResolutionState::ResolvedClass(resolved) => Ok(resolved),
            _ => Err(InvalidConstant(index)),
        }
    }

    /// Resolve constant pool index `index` of `class` as a field reference (JVMS
    /// §5.4.3.2): resolves the owning class, then searches it and its superclasses for
    /// a field with the given name.
    ///
    /// # Errors
    ///
    /// if the index is not a `Fieldref`, the owning class cannot be resolved, or no
    /// such field is declared anywhere in its hierarchy.
    pub fn resolve_field(&self, class: &Arc<Class>, index: u16) -> Result<(ClassRef, Arc<Field>, bool)> {
        let state = class.resolved_pool().resolve(index, || {
            let Some(class_file) = class.class_file() else {
                return Err(InvalidConstant(index));
            };
            let Constant::FieldRef { class_index, name_and_type_index } = class_file.constant_pool.get(index)?
            else {
                return Err(InvalidConstant(index));
            };
            let owner = self.resolve_class(class, *class_index)?;
            let (name, _descriptor) = class_file.constant_pool.name_and_type(*name_and_type_index)?;
            let (declaring, field, is_static) = locate_field(&owner, name).ok_or_else(|| FieldNotFound {
                class_name: owner.name().to_string(),
                field_name: name.to_string(),
            })?;
            Ok::<_, crate::Error>(ResolutionState::ResolvedField { class: declaring, field, is_static })
        })?;
        match state {
            ResolutionState::ResolvedField { class, field, is_static } => Ok((class, field, is_static)),
            _ => Err(InvalidConstant(index)),
        }
    }

    /// Resolve constant pool index `index` of `class` as a (non-interface) method
    /// reference (JVMS §5.4.3.3).
    ///
    /// # Errors
    ///
    /// if the index is not a `Methodref`, the owning class cannot be resolved, or no
    /// such method is declared anywhere in its hierarchy.
    pub fn resolve_method(&self, class: &Arc<Class>, index: u16) -> Result<(ClassRef, Arc<Method>)> {
        self.resolve_method_like(class, index, false)
    }

    /// Resolve constant pool index `index` of `class` as an interface method reference
    /// (JVMS §5.4.3.4).
    ///
    /// # Errors
    ///
    /// as [`Self::resolve_method`].
    pub fn resolve_interface_method(&self, class: &Arc<Class>, index: u16) -> Result<(ClassRef, Arc<Method>)> {
        self.resolve_method_like(class, index, true)
    }

    fn resolve_method_like(
        &self,
        class: &Arc<Class>,
        index: u16,
        interface: bool,
    ) -> Result<(ClassRef, Arc<Method>)> {
        let state = class.resolved_pool().resolve(index, || {
            let Some(class_file) = class.class_file() else {
                return Err(InvalidConstant(index));
            };
            let (class_index, name_and_type_index) = match class_file.constant_pool.get(index)? {
                Constant::MethodRef { class_index, name_and_type_index } if !interface => {
                    (*class_index, *name_and_type_index)
                }
                Constant::InterfaceMethodRef { class_index, name_and_type_index } if interface => {
                    (*class_index, *name_and_type_index)
                }
                _ => return Err(InvalidConstant(index)),
            };
            let owner = self.resolve_class(class, class_index)?;
            let (name, descriptor) = class_file.constant_pool.name_and_type(name_and_type_index)?;
            let (declaring, method) = locate_method(&owner, name, descriptor).ok_or_else(|| MethodNotFound {
                class_name: owner.name().to_string(),
                method_name: name.to_string(),
                descriptor: descriptor.to_string(),
            })?;
            let resolved = if interface {
                ResolutionState::ResolvedInterfaceMethod { class: declaring, method }
            } else {
                ResolutionState::ResolvedMethod { class: declaring, method }
            };
            Ok::<_, crate::Error>(resolved)
        })?;
        match state {
            ResolutionState::ResolvedMethod { class, method }
            | ResolutionState::ResolvedInterfaceMethod { class, method } => Ok((class, method)),
            _ => Err(InvalidConstant(index)),
        }
    }

    /// Resolve constant pool index `index` of `class` as a `String` reference (JVMS
    /// §5.4.3.3), interning the literal via `intern`.
    ///
    /// # Errors
    ///
    /// if the index is not a `String` constant, or `intern` fails to build the object.
    pub fn resolve_string<F>(&self, class: &Arc<Class>, index: u16, intern: F) -> Result<StringRef>
    where
        F: FnOnce(&str) -> Result<StringRef>,
    {
        let state = class.resolved_pool().resolve(index, || {
            let Some(class_file) = class.class_file() else {
                return Err(InvalidConstant(index));
            };
            let Constant::String(utf8_index) = class_file.constant_pool.get(index)? else {
                return Err(InvalidConstant(index));
            };
            let text = class_file.constant_pool.utf8(*utf8_index)?;
            let reference = intern(text)?;
            Ok::<_, crate::Error>(ResolutionState::ResolvedString(reference))
        })?;
        match state {
            ResolutionState::ResolvedString(reference) => Ok(reference),
            _ => Err(InvalidConstant(index)),
        }
    }

    /// Resolve constant pool index `index` of `class` as a `MethodType` reference
    /// (JVMS §5.4.3.5), parsing the method descriptor it names.
    ///
    /// # Errors
    ///
    /// if the index is not a `MethodType` constant, or the descriptor is malformed.
    pub fn resolve_method_type(
        &self,
        class: &Arc<Class>,
        index: u16,
    ) -> Result<(Vec<FieldType>, Option<FieldType>)> {
        let state = class.resolved_pool().resolve(index, || {
            let Some(class_file) = class.class_file() else {
                return Err(InvalidConstant(index));
            };
            let Constant::MethodType(descriptor_index) = class_file.constant_pool.get(index)? else {
                return Err(InvalidConstant(index));
            };
            let descriptor = class_file.constant_pool.utf8(*descriptor_index)?;
            let (parameters, return_type) = FieldType::parse_method_descriptor(descriptor)?;
            Ok::<_, crate::Error>(ResolutionState::ResolvedMethodType { parameters, return_type })
        })?;
        match state {
            ResolutionState::ResolvedMethodType { parameters, return_type } => Ok((parameters, return_type)),
            _ => Err(InvalidConstant(index)),
        }
    }

    /// Resolve constant pool index `index` of `class` as a `MethodHandle` reference
    /// (JVMS §5.4.3.5). Supports the four field-access kinds plus `invokestatic`;
    /// other kinds are not implemented (see `DESIGN.md`).
    ///
    /// # Errors
    ///
    /// if the index is not a `MethodHandle` constant, its reference kind is
    /// unsupported, or the underlying field/method reference does not resolve.
    pub fn resolve_method_handle(
        &self,
        class: &Arc<Class>,
        index: u16,
    ) -> Result<(ReferenceKind, ClassRef, MemberRef)> {
        let state = class.resolved_pool().resolve(index, || {
            let Some(class_file) = class.class_file() else {
                return Err(InvalidConstant(index));
            };
            let Constant::MethodHandle { reference_kind, reference_index } = class_file.constant_pool.get(index)?
            else {
                return Err(InvalidConstant(index));
            };
            let kind = *reference_kind;
            let (owner, member) = if kind.is_field() {
                let (owner, field, _) = self.resolve_field(class, *reference_index)?;
                (owner, MemberRef::Field(field))
            } else if kind == ReferenceKind::InvokeStatic {
                let (owner, method) = self.resolve_method(class, *reference_index)?;
                (owner, MemberRef::Method(method))
            } else {
                return Err(LinkageError(format!(
                    "unsupported method handle reference kind: {kind}"
                )));
            };
            Ok::<_, crate::Error>(ResolutionState::ResolvedMethodHandle { kind, class: owner, member })
        })?;
        match state {
            ResolutionState::ResolvedMethodHandle { kind, class, member } => Ok((kind, class, member)),
            _ => Err(InvalidConstant(index)),
        }
    }
}

impl fmt::Debug for ClassLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassLoader")
            .field("id", &self.id)
            .field("classes", &self.classes.len())
            .finish()
    }
}

fn locate_field(class: &Arc<Class>, name: &str) -> Option<(ClassRef, Arc<Field>, bool)> {
    if let Some(field) = class.declared_static_fields().iter().find(|field| field.name() == name) {
        return Some((Arc::clone(class), Arc::clone(field), true));
    }
    if let Some(field) = class.declared_instance_fields().iter().find(|field| field.name() == name) {
        return Some((Arc::clone(class), Arc::clone(field), false));
    }
    if let Some(super_class) = class.super_class() {
        return locate_field(&super_class, name);
    }
    for interface in class.interfaces() {
        if let Some(found) = locate_field(&interface, name) {
            return Some(found);
        }
    }
    None
}

fn locate_method(class: &Arc<Class>, name: &str, descriptor: &str) -> Option<(ClassRef, Arc<Method>)> {
    if let Some(method) = class
        .declared_methods()
        .iter()
        .find(|method| method.name() == name && method.descriptor() == descriptor)
    {
        return Some((Arc::clone(class), Arc::clone(method)));
    }
    if let Some(super_class) = class.super_class() {
        if let Some(found) = locate_method(&super_class, name, descriptor) {
            return Some(found);
        }
    }
    for interface in class.interfaces() {
        if let Some(found) = locate_method(&interface, name, descriptor) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjvm_classfile::{ClassAccessFlags, ClassFile, Constant, ConstantPool, Version};

    fn write_class(dir: &std::path::Path, name: &str, super_name: Option<&str>) -> cjvm_classfile::Result<()> {
        let mut constant_pool = ConstantPool::new();
        let this_name = constant_pool.push(Constant::Utf8(name.to_string()));
        let this_class = constant_pool.push(Constant::Class(this_name));
        let super_class = match super_name {
            Some(super_name) => {
                let super_name_index = constant_pool.push(Constant::Utf8(super_name.to_string()));
                constant_pool.push(Constant::Class(super_name_index))
            }
            None => 0,
        };
        let class_file = ClassFile {
            version: Version { major: 52, minor: 0 },
            constant_pool,
            access_flags: ClassAccessFlags::PUBLIC,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };
        let mut bytes = Vec::new();
        class_file.to_bytes(&mut bytes)?;
        std::fs::write(dir.join(format!("{name}.class")), bytes)?;
        Ok(())
    }

    fn bootstrap_loader(dir: &std::path::Path) -> Result<Arc<ClassLoader>> {
        write_class(dir, "java/lang/Object", None)?;
        write_class(dir, "Sub", Some("java/lang/Object"))?;
        let class_path = ClassPath::parse(&dir.to_string_lossy())?;
        Ok(ClassLoader::new(LoaderId::Bootstrap, class_path, None, None))
    }

    #[test]
    fn test_load_links_superclass_chain() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let loader = bootstrap_loader(temp_dir.path())?;
        let sub = loader.load("Sub")?;
        assert_eq!(ClassState::Linked, sub.state());
        assert_eq!("java/lang/Object", sub.super_class().expect("super").name());
        Ok(())
    }

    #[test]
    fn test_load_is_cached() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let loader = bootstrap_loader(temp_dir.path())?;
        let first = loader.load("Sub")?;
        let second = loader.load("Sub")?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn test_initialize_does_not_rerun_clinit_once_inited() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let loader = bootstrap_loader(temp_dir.path())?;
        let sub = loader.load("Sub")?;
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let record_call = |_: &Arc<Class>| -> Result<()> {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        };
        loader.initialize(&sub, &record_call)?;
        loader.initialize(&sub, &record_call)?;
        assert_eq!(2, calls.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(ClassState::Inited, sub.state());
        Ok(())
    }

    #[test]
    fn test_initialize_runs_clinit_for_every_uninited_superclass() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let loader = bootstrap_loader(temp_dir.path())?;
        let sub = loader.load("Sub")?;
        let object = loader.load("java/lang/Object")?;
        let inited = std::sync::Mutex::new(Vec::new());
        loader.initialize(&sub, &|class: &Arc<Class>| -> Result<()> {
            inited.lock().expect("lock").push(class.name().to_string());
            Ok(())
        })?;
        assert_eq!(vec!["java/lang/Object", "Sub"], *inited.lock().expect("lock"));
        assert_eq!(ClassState::Inited, object.state());
        assert_eq!(ClassState::Inited, sub.state());
        Ok(())
    }

    #[test]
    fn test_initialize_failure_sticks_as_error() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let loader = bootstrap_loader(temp_dir.path())?;
        let sub = loader.load("Sub")?;
        let result = loader.initialize(&sub, &|class: &Arc<Class>| {
            Err(LinkageError(format!("boom in {}", class.name())))
        });
        assert!(result.is_err());
        assert_eq!(ClassState::Error, sub.state());
        assert!(matches!(
            loader.initialize(&sub, &|_| Ok(())),
            Err(NoClassDefFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_array_class_name_reflects_component() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let loader = bootstrap_loader(temp_dir.path())?;
        let array_class = loader.load("[I")?;
        assert!(array_class.is_array());
        assert_eq!(ClassState::Linked, array_class.state());
        assert_eq!("java/lang/Object", array_class.super_class().expect("super").name());
        Ok(())
    }
}
