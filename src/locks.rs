//! Named advisory locks.
//!
//! Independent resources that modify a shared parent (a cache joining a
//! subnet, for example) serialize on the parent's name. Locks are keyed by
//! `"{resource_type}.{name}"` and released when the guard drops. An entry is
//! removed from the registry once nobody holds or waits for it.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ids::SubnetId;

pub const VIRTUAL_NETWORK_RESOURCE_NAME: &str = "azurerm_virtual_network";
pub const SUBNET_RESOURCE_NAME: &str = "azurerm_subnet";

static GLOBAL: LazyLock<LockRegistry> = LazyLock::new(LockRegistry::default);

/// The process-wide registry.
pub fn global() -> &'static LockRegistry {
    &GLOBAL
}

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: LockMap,
}

/// Held while the named lock is taken.
#[derive(Debug)]
pub struct NamedLockGuard {
    key: String,
    locks: LockMap,
    guard: OwnedMutexGuard<()>,
}

impl NamedLockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one in this guard.
        if Arc::strong_count(OwnedMutexGuard::mutex(&self.guard)) == 2 {
            locks.remove(&self.key);
        }
        tracing::debug!(key = %self.key, "released lock");
    }
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the lock for `name` of `resource_type` is free and takes it.
    pub async fn by_name(&self, name: &str, resource_type: &str) -> NamedLockGuard {
        let key = format!("{}.{}", resource_type, name);
        let mutex = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(key.clone()).or_default().clone()
        };

        tracing::debug!(key = %key, "acquiring lock");
        let guard = mutex.lock_owned().await;
        tracing::debug!(key = %key, "acquired lock");

        NamedLockGuard {
            key,
            locks: self.locks.clone(),
            guard,
        }
    }

    /// Number of names currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the virtual network, then the subnet. Always in that order, so
    /// two callers on the same subnet cannot deadlock.
    pub async fn by_subnet(&self, subnet: &SubnetId) -> Vec<NamedLockGuard> {
        let network = self
            .by_name(&subnet.virtual_network_name, VIRTUAL_NETWORK_RESOURCE_NAME)
            .await;
        let subnet = self.by_name(&subnet.subnet_name, SUBNET_RESOURCE_NAME).await;
        vec![network, subnet]
    }
}
