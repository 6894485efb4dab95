//! Counting semaphores used for the workshop rendezvous

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use super::state::{ELF_BATCH, REINDEER_TEAM};

/// A named counting semaphore used purely for signalling
///
/// Permits taken by `wait` are forgotten, so the only way a permit comes back
/// is an explicit `post`.
pub(crate) struct Signal {
    name: &'static str,
    sem: Semaphore,
}

impl Signal {
    pub(crate) fn new(name: &'static str, permits: usize) -> Self {
        Self {
            name,
            sem: Semaphore::new(permits),
        }
    }

    /// Release `n` permits
    pub(crate) fn post(&self, n: usize) {
        self.sem.add_permits(n);
    }

    /// Block until a permit is available; false if the semaphore was closed
    pub(crate) async fn wait(&self) -> bool {
        match self.sem.acquire().await {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => {
                debug!(signal = self.name, "Signal::wait: semaphore closed");
                false
            }
        }
    }

    /// Acquire a permit that returns itself when dropped
    pub(crate) async fn hold(&self) -> Option<SemaphorePermit<'_>> {
        self.sem.acquire().await.ok()
    }

    pub(crate) fn available(&self) -> usize {
        self.sem.available_permits()
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }
}

/// Upper bound on how many tasks of each role can be blocked at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolSizes {
    pub dispatchers: usize,
    pub reindeer: usize,
    pub elves: usize,
}

/// Every semaphore the workers and the dispatcher rendezvous on
pub(crate) struct Fabric {
    pub wake_dispatcher: Signal,
    pub release_reindeer: Signal,
    pub admission_limit: Signal,
    pub elf_ready: Signal,
    pub elf_done: Signal,
    pub last_reindeer_done: Signal,
}

impl Fabric {
    pub(crate) fn new() -> Self {
        Self {
            wake_dispatcher: Signal::new("wake_dispatcher", 0),
            release_reindeer: Signal::new("release_reindeer", 0),
            admission_limit: Signal::new("admission_limit", ELF_BATCH),
            elf_ready: Signal::new("elf_ready", 0),
            elf_done: Signal::new("elf_done", 0),
            last_reindeer_done: Signal::new("last_reindeer_done", 0),
        }
    }

    /// Release every semaphore enough times that no task stays blocked
    ///
    /// Each count is the most tasks that can wait on that semaphore at once,
    /// derived from the pool sizes rather than the live counters. A woken task
    /// re-checks the running flag before doing anything else, so surplus
    /// permits are harmless.
    pub(crate) fn release_all(&self, pools: PoolSizes) {
        let plan = [
            (&self.wake_dispatcher, pools.dispatchers),
            (&self.release_reindeer, pools.reindeer.max(REINDEER_TEAM)),
            (&self.admission_limit, pools.elves),
            (&self.elf_ready, pools.elves.max(ELF_BATCH)),
            (&self.elf_done, pools.dispatchers * ELF_BATCH),
            (&self.last_reindeer_done, pools.reindeer.max(1)),
        ];
        for (signal, count) in plan {
            debug!(signal = signal.name(), count, "Fabric::release_all: posting");
            signal.post(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_permits() {
        let fabric = Fabric::new();
        assert_eq!(fabric.wake_dispatcher.available(), 0);
        assert_eq!(fabric.release_reindeer.available(), 0);
        assert_eq!(fabric.admission_limit.available(), 3);
        assert_eq!(fabric.elf_ready.available(), 0);
        assert_eq!(fabric.elf_done.available(), 0);
        assert_eq!(fabric.last_reindeer_done.available(), 0);
    }

    #[tokio::test]
    async fn test_wait_consumes_posted_permit() {
        let signal = Signal::new("test", 0);
        signal.post(2);
        assert!(signal.wait().await);
        assert_eq!(signal.available(), 1);
    }

    #[tokio::test]
    async fn test_hold_returns_permit_on_drop() {
        let signal = Signal::new("test", 1);
        {
            let permit = signal.hold().await;
            assert!(permit.is_some());
            assert_eq!(signal.available(), 0);
        }
        assert_eq!(signal.available(), 1);
    }

    #[test]
    fn test_release_all_covers_pool_sizes() {
        let fabric = Fabric::new();
        fabric.release_all(PoolSizes {
            dispatchers: 1,
            reindeer: 9,
            elves: 10,
        });
        assert_eq!(fabric.wake_dispatcher.available(), 1);
        assert_eq!(fabric.release_reindeer.available(), 9);
        assert_eq!(fabric.admission_limit.available(), 13);
        assert_eq!(fabric.elf_ready.available(), 10);
        assert_eq!(fabric.elf_done.available(), 3);
        assert_eq!(fabric.last_reindeer_done.available(), 9);
    }

    #[test]
    fn test_release_all_with_small_pools_still_covers_batches() {
        let fabric = Fabric::new();
        fabric.release_all(PoolSizes {
            dispatchers: 0,
            reindeer: 0,
            elves: 0,
        });
        assert_eq!(fabric.release_reindeer.available(), REINDEER_TEAM);
        assert_eq!(fabric.elf_ready.available(), ELF_BATCH);
        assert_eq!(fabric.last_reindeer_done.available(), 1);
    }
}
