use crate::class::Class;
use crate::field::Field;
use crate::method::Method;
use crate::reference::Reference;
use cjvm_classfile::{FieldType, ReferenceKind};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// The side table the class loader resolves symbolic constant pool references into.
///
/// The class file format describes resolution as an in-place tag upgrade of the
/// constant pool slot itself (JVMS §5.1): `Class` becomes `ResolvedClass`, `Fieldref`
/// becomes `ResolvedField`, and so on, with the upgrade happening at most once and
/// being visible to every thread thereafter. This crate keeps `cjvm_classfile::
/// ConstantPool` immutable and layers that upgrade on top as a parallel table of
/// per-index cells, each independently lockable, so resolving one entry never blocks
/// a concurrent resolution of another. Observationally this is the same monotone
/// lattice the spec describes: `Unresolved` only ever transitions to a single
/// terminal `Resolved*` state, never back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    ResolvedClass(ClassRef),
    ResolvedField { class: ClassRef, field: FieldRef, is_static: bool },
    ResolvedMethod { class: ClassRef, method: MethodRef },
    ResolvedInterfaceMethod { class: ClassRef, method: MethodRef },
    ResolvedString(StringRef),
    ResolvedMethodType { parameters: Vec<FieldType>, return_type: Option<FieldType> },
    ResolvedMethodHandle { kind: ReferenceKind, class: ClassRef, member: MemberRef },
}

/// A resolved member target for `MethodHandle` resolution: either a field or a method,
/// matching the reference kinds this runtime supports (see `DESIGN.md`).
#[derive(Clone, Debug)]
pub enum MemberRef {
    Field(FieldRef),
    Method(MethodRef),
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MemberRef::Field(a), MemberRef::Field(b)) => Arc::ptr_eq(a, b),
            (MemberRef::Method(a), MemberRef::Method(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
impl Eq for MemberRef {}

pub type ClassRef = Arc<Class>;
pub type FieldRef = Arc<Field>;
pub type MethodRef = Arc<Method>;
pub type StringRef = Arc<RwLock<Reference>>;

impl PartialEq for ResolutionState {
    fn eq(&self, other: &Self) -> bool {
        use ResolutionState::{
            ResolvedClass, ResolvedField, ResolvedInterfaceMethod, ResolvedMethod,
            ResolvedMethodHandle, ResolvedMethodType, ResolvedString, Unresolved,
        };
        match (self, other) {
            (Unresolved, Unresolved) => true,
            (ResolvedClass(a), ResolvedClass(b)) => Arc::ptr_eq(a, b),
            (
                ResolvedField { class: ca, field: fa, is_static: sa },
                ResolvedField { class: cb, field: fb, is_static: sb },
            ) => Arc::ptr_eq(ca, cb) && Arc::ptr_eq(fa, fb) && sa == sb,
            (ResolvedMethod { class: ca, method: ma }, ResolvedMethod { class: cb, method: mb })
            | (
                ResolvedInterfaceMethod { class: ca, method: ma },
                ResolvedInterfaceMethod { class: cb, method: mb },
            ) => Arc::ptr_eq(ca, cb) && Arc::ptr_eq(ma, mb),
            (ResolvedString(a), ResolvedString(b)) => Arc::ptr_eq(a, b),
            (
                ResolvedMethodType { parameters: pa, return_type: ra },
                ResolvedMethodType { parameters: pb, return_type: rb },
            ) => pa == pb && ra == rb,
            (
                ResolvedMethodHandle { kind: ka, class: ca, member: ma },
                ResolvedMethodHandle { kind: kb, class: cb, member: mb },
            ) => ka.to_u8() == kb.to_u8() && Arc::ptr_eq(ca, cb) && ma == mb,
            _ => false,
        }
    }
}
impl Eq for ResolutionState {}

/// One cell per constant pool index. Indices that never hold a resolvable tag (e.g.
/// `Utf8`, the index-1 reserved slot, wide-entry placeholders) simply stay `Unresolved`
/// forever, which costs a mutex but no heap allocation.
#[derive(Debug, Default)]
pub struct ResolvedPool {
    cells: Vec<Mutex<ResolutionState>>,
}

impl ResolvedPool {
    /// Create a side table with one cell per constant pool slot.
    #[must_use]
    pub fn new(len: usize) -> Self {
        ResolvedPool {
            cells: (0..len).map(|_| Mutex::new(ResolutionState::Unresolved)).collect(),
        }
    }

    /// Read the current resolution state without attempting to resolve.
    #[must_use]
    pub fn peek(&self, index: u16) -> ResolutionState {
        self.cells
            .get(index as usize)
            .map_or(ResolutionState::Unresolved, |cell| cell.lock().clone())
    }

    /// Resolve `index`, computing and caching via `resolver` on first access. Concurrent
    /// callers resolving the same index block on each other rather than racing; once any
    /// one of them succeeds, every later call (including the ones that were blocked)
    /// observes the cached result and never re-invokes `resolver`.
    ///
    /// # Errors
    ///
    /// if `resolver` fails. A failed resolution is not cached; the next call retries.
    pub fn resolve<F, E>(&self, index: u16, resolver: F) -> Result<ResolutionState, E>
    where
        F: FnOnce() -> Result<ResolutionState, E>,
    {
        let Some(cell) = self.cells.get(index as usize) else {
            return resolver();
        };
        let mut guard = cell.lock();
        if *guard == ResolutionState::Unresolved {
            *guard = resolver()?;
        }
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_indices_stay_unresolved() {
        let pool = ResolvedPool::new(4);
        assert_eq!(ResolutionState::Unresolved, pool.peek(1));
    }

    #[test]
    fn test_resolve_caches_and_skips_second_call() {
        let pool = ResolvedPool::new(4);
        let mut calls = 0;
        let first: Result<ResolutionState, String> = pool.resolve(1, || {
            calls += 1;
            Ok(ResolutionState::ResolvedMethodType {
                parameters: vec![],
                return_type: None,
            })
        });
        assert!(first.is_ok());
        let second: Result<ResolutionState, String> = pool.resolve(1, || {
            calls += 1;
            Ok(ResolutionState::ResolvedMethodType {
                parameters: vec![],
                return_type: None,
            })
        });
        assert!(second.is_ok());
        assert_eq!(1, calls);
    }
}
