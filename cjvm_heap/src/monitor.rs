use crate::error::Error::NotMonitorOwner;
use crate::error::Result;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A reentrant lock plus a wait set, one per synchronized Java object.
///
/// Built on `parking_lot::Mutex`/`Condvar` rather than an async primitive: this runtime
/// gives each Java thread a real OS thread, so monitor acquisition is ordinary blocking
/// mutual exclusion, not a task suspension point.
#[derive(Debug, Default)]
pub struct Monitor {
    state: Mutex<MonitorState>,
    condvar: Condvar,
}

#[derive(Debug, Default)]
struct MonitorState {
    owner: Option<u64>,
    entry_count: usize,
}

impl Monitor {
    #[must_use]
    pub fn new() -> Self {
        Monitor::default()
    }

    /// Acquire the monitor, blocking until available. Reentrant: a thread that already
    /// holds the monitor just increments its entry count.
    pub fn enter(&self, thread_id: u64) {
        let mut state = self.state.lock();
        loop {
            match state.owner {
                Some(owner) if owner == thread_id => {
                    state.entry_count += 1;
                    return;
                }
                None => {
                    state.owner = Some(thread_id);
                    state.entry_count = 1;
                    return;
                }
                Some(_) => self.condvar.wait(&mut state),
            }
        }
    }

    /// Release one level of ownership. Fully releases and wakes waiters once the entry
    /// count reaches zero.
    ///
    /// # Errors
    ///
    /// if `thread_id` does not currently own the monitor.
    pub fn exit(&self, thread_id: u64) -> Result<()> {
        let mut state = self.state.lock();
        if state.owner != Some(thread_id) {
            return Err(NotMonitorOwner);
        }
        state.entry_count -= 1;
        if state.entry_count == 0 {
            state.owner = None;
            self.condvar.notify_all();
        }
        Ok(())
    }

    /// `Object.wait()`: release the monitor and block until notified, then reacquire it
    /// with the same entry count.
    ///
    /// # Errors
    ///
    /// if `thread_id` does not currently own the monitor.
    pub fn wait(&self, thread_id: u64) -> Result<()> {
        let mut state = self.state.lock();
        if state.owner != Some(thread_id) {
            return Err(NotMonitorOwner);
        }
        let saved_count = state.entry_count;
        state.owner = None;
        state.entry_count = 0;
        self.condvar.notify_all();

        self.condvar.wait(&mut state);

        while state.owner.is_some() {
            self.condvar.wait(&mut state);
        }
        state.owner = Some(thread_id);
        state.entry_count = saved_count;
        Ok(())
    }

    /// `Object.wait(millis)`: as [`Monitor::wait`], but gives up and reacquires after
    /// `timeout` elapses. Returns whether the wait timed out.
    ///
    /// # Errors
    ///
    /// if `thread_id` does not currently own the monitor.
    pub fn wait_timeout(&self, thread_id: u64, timeout: Duration) -> Result<bool> {
        let mut state = self.state.lock();
        if state.owner != Some(thread_id) {
            return Err(NotMonitorOwner);
        }
        let saved_count = state.entry_count;
        state.owner = None;
        state.entry_count = 0;
        self.condvar.notify_all();

        let wait_result = self.condvar.wait_for(&mut state, timeout);
        let timed_out = wait_result.timed_out();

        while state.owner.is_some() {
            self.condvar.wait(&mut state);
        }
        state.owner = Some(thread_id);
        state.entry_count = saved_count;
        Ok(timed_out)
    }

    /// `Object.notify()`: wake one waiter, if any.
    ///
    /// # Errors
    ///
    /// if `thread_id` does not currently own the monitor.
    pub fn notify_one(&self, thread_id: u64) -> Result<()> {
        let state = self.state.lock();
        if state.owner != Some(thread_id) {
            return Err(NotMonitorOwner);
        }
        self.condvar.notify_one();
        Ok(())
    }

    /// `Object.notifyAll()`: wake every waiter.
    ///
    /// # Errors
    ///
    /// if `thread_id` does not currently own the monitor.
    pub fn notify_all(&self, thread_id: u64) -> Result<()> {
        let state = self.state.lock();
        if state.owner != Some(thread_id) {
            return Err(NotMonitorOwner);
        }
        self.condvar.notify_all();
        Ok(())
    }

    /// Whether `thread_id` currently holds the monitor.
    #[must_use]
    pub fn is_held_by(&self, thread_id: u64) -> bool {
        self.state.lock().owner == Some(thread_id)
    }
}

/// Lazily allocates a [`Monitor`] per object identity (its heap address), so that
/// `synchronized` blocks don't pay for a monitor on objects that never use one.
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    monitors: Mutex<HashMap<usize, Arc<Monitor>>>,
}

impl MonitorRegistry {
    #[must_use]
    pub fn new() -> Self {
        MonitorRegistry::default()
    }

    /// Fetch the monitor for `object_id`, creating it on first use.
    pub fn monitor(&self, object_id: usize) -> Arc<Monitor> {
        self.monitors
            .lock()
            .entry(object_id)
            .or_insert_with(|| Arc::new(Monitor::new()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reentrant_enter_exit() -> Result<()> {
        let monitor = Monitor::new();
        monitor.enter(1);
        monitor.enter(1);
        assert!(monitor.is_held_by(1));
        monitor.exit(1)?;
        assert!(monitor.is_held_by(1));
        monitor.exit(1)?;
        assert!(!monitor.is_held_by(1));
        Ok(())
    }

    #[test]
    fn test_exit_requires_ownership() {
        let monitor = Monitor::new();
        monitor.enter(1);
        assert!(matches!(monitor.exit(2), Err(NotMonitorOwner)));
    }

    #[test]
    fn test_wait_timeout_elapses() -> Result<()> {
        let monitor = Monitor::new();
        monitor.enter(1);
        let timed_out = monitor.wait_timeout(1, Duration::from_millis(10))?;
        assert!(timed_out);
        assert!(monitor.is_held_by(1));
        Ok(())
    }

    #[test]
    fn test_registry_reuses_monitor_for_same_object() {
        let registry = MonitorRegistry::new();
        let a = registry.monitor(0x1000);
        let b = registry.monitor(0x1000);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
