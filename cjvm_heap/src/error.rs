//! Error handling for the `cjvm_heap` crate.

/// Result type alias for this crate, defaulting the error to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that can occur while allocating or releasing address-space.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The allocator's backing region has no gap large enough to satisfy a request.
    #[error("out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },
    /// `free` was called with an address that does not fall within the allocator's region.
    #[error("address {0:#x} is not owned by this allocator")]
    NotOwned(usize),
    /// `free` was called with a `(address, len)` pair that does not match a live allocation.
    #[error("address {address:#x} with length {len} is not a live allocation")]
    NotAllocated { address: usize, len: usize },
    /// `exit`, `wait`, `notify`, or `notify_all` was called by a thread that does not
    /// currently hold the monitor.
    #[error("current thread does not own the monitor")]
    NotMonitorOwner,
}
