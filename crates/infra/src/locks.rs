//! Per-group mutual exclusion for load-mutate-save cycles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use splitledger_core::GroupId;

use crate::error::LedgerError;

/// One mutex per group id, created on first use.
///
/// Different groups never share a mutex, so they never contend.
#[derive(Debug, Default)]
pub struct GroupLocks {
    locks: Mutex<HashMap<GroupId, Arc<Mutex<()>>>>,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: GroupId) -> Result<Arc<Mutex<()>>, LedgerError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LedgerError::Storage("group lock table poisoned".to_string()))?;
        Ok(locks.entry(id).or_default().clone())
    }

    /// Run `f` while holding the lock for `id`.
    pub fn with_lock<T, F>(&self, id: GroupId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce() -> Result<T, LedgerError>,
    {
        let handle = self.handle(id)?;
        let _guard = handle
            .lock()
            .map_err(|_| LedgerError::Storage(format!("lock for group {id} poisoned")))?;
        f()
    }

    /// Number of groups that have been locked at least once.
    pub fn tracked(&self) -> Result<usize, LedgerError> {
        Ok(self
            .locks
            .lock()
            .map_err(|_| LedgerError::Storage("group lock table poisoned".to_string()))?
            .len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn serialises_work_on_one_group() {
        let locks = Arc::new(GroupLocks::new());
        let id = GroupId::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_seen) = (locks.clone(), inside.clone(), max_seen.clone());
                thread::spawn(move || {
                    locks
                        .with_lock(id, || {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.tracked().unwrap(), 1);
    }

    #[test]
    fn passes_through_the_closure_result() {
        let locks = GroupLocks::new();
        let err = locks
            .with_lock(GroupId::new(), || -> Result<(), LedgerError> {
                Err(LedgerError::InvalidState("nope".into()))
            })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[test]
    fn poisoned_lock_table_is_a_storage_error() {
        let locks = GroupLocks::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = locks.locks.lock().unwrap();
            panic!("holder died");
        }));

        assert_eq!(locks.tracked().unwrap_err().code(), "INTERNAL_ERROR");
        let err = locks.with_lock(GroupId::new(), || Ok(())).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
