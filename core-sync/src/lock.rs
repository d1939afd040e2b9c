//! Per-username mutual exclusion.
//!
//! Two syncs of the same user would race on the same catalog list (one
//! clearing while the other adds). Holding a [`UserLockGuard`] for the whole
//! sync makes a second request for that user wait until the first finishes.
//! Different users never block each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<Mutex<()>>>;

#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<StdMutex<LockMap>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other sync holds `username`, then hold it until the
    /// guard is dropped.
    pub async fn acquire(&self, username: &str) -> UserLockGuard {
        let lock = {
            let mut locks = lock_map(&self.locks);
            Arc::clone(
                locks
                    .entry(username.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        let guard = Arc::clone(&lock).lock_owned().await;

        UserLockGuard {
            username: username.to_string(),
            lock,
            registry: Arc::clone(&self.locks),
            _guard: guard,
        }
    }

    pub fn is_locked(&self, username: &str) -> bool {
        lock_map(&self.locks)
            .get(username)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of usernames currently held or waited on.
    pub fn tracked(&self) -> usize {
        lock_map(&self.locks).len()
    }
}

fn lock_map(locks: &StdMutex<LockMap>) -> StdMutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct UserLockGuard {
    username: String,
    lock: Arc<Mutex<()>>,
    registry: Arc<StdMutex<LockMap>>,
    _guard: OwnedMutexGuard<()>,
}

impl UserLockGuard {
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        let mut locks = lock_map(&self.registry);
        // map + this guard's handle + the owned guard; anything above that is a waiter
        if Arc::strong_count(&self.lock) <= 3 {
            locks.remove(&self.username);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_waits() {
        let locks = UserLocks::new();
        let first = locks.acquire("alice").await;
        assert!(locks.is_locked("alice"));

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let guard = locks.acquire("alice").await;
                guard.username().to_string()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(first);
        assert_eq!(contender.await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let locks = UserLocks::new();
        let _alice = locks.acquire("alice").await;

        let bob = tokio::time::timeout(Duration::from_millis(100), locks.acquire("bob")).await;
        assert!(bob.is_ok());
        assert!(!locks.is_locked("carol"));
    }

    #[tokio::test]
    async fn test_released_locks_are_forgotten() {
        let locks = UserLocks::new();
        {
            let _guard = locks.acquire("alice").await;
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);
        assert!(!locks.is_locked("alice"));
    }
}
