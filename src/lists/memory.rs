//! In-process allow/deny list store.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{cidr, ListKind, ListStore};
use crate::error::Result;

/// A [`ListStore`] keeping both lists in memory.
///
/// Contents do not survive a restart; seed them from configuration with
/// [`MemoryListStore::with_entries`].
#[derive(Debug, Default)]
pub struct MemoryListStore {
    allow: RwLock<HashSet<String>>,
    deny: RwLock<HashSet<String>>,
}

impl MemoryListStore {
    /// Create a store with both lists empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given entries.
    ///
    /// Every entry must be a valid CIDR; entries are stored normalized.
    pub fn with_entries<S: AsRef<str>>(allow: &[S], deny: &[S]) -> Result<Self> {
        let store = Self::new();
        for entry in allow {
            store.insert(ListKind::Allow, &cidr::normalize(entry.as_ref())?);
        }
        for entry in deny {
            store.insert(ListKind::Deny, &cidr::normalize(entry.as_ref())?);
        }

        debug!(
            allow = store.allow.read().len(),
            deny = store.deny.read().len(),
            "Seeded list store"
        );
        Ok(store)
    }

    /// Get the entries of one list, sorted.
    pub fn entries(&self, kind: ListKind) -> Vec<String> {
        let mut entries: Vec<String> = self.list(kind).read().iter().cloned().collect();
        entries.sort();
        entries
    }

    fn list(&self, kind: ListKind) -> &RwLock<HashSet<String>> {
        match kind {
            ListKind::Allow => &self.allow,
            ListKind::Deny => &self.deny,
        }
    }

    fn contains(&self, kind: ListKind, ip: &str) -> bool {
        self.list(kind).read().contains(ip)
    }

    fn insert(&self, kind: ListKind, ip: &str) {
        if self.list(kind).write().insert(ip.to_string()) {
            debug!(list = %kind, ip = %ip, "Added list entry");
        }
    }

    fn remove(&self, kind: ListKind, ip: &str) {
        if self.list(kind).write().remove(ip) {
            debug!(list = %kind, ip = %ip, "Removed list entry");
        }
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn contains_allow(&self, ip: &str) -> Result<bool> {
        Ok(self.contains(ListKind::Allow, ip))
    }

    async fn contains_deny(&self, ip: &str) -> Result<bool> {
        Ok(self.contains(ListKind::Deny, ip))
    }

    async fn add_allow(&self, ip: &str) -> Result<()> {
        self.insert(ListKind::Allow, ip);
        Ok(())
    }

    async fn add_deny(&self, ip: &str) -> Result<()> {
        self.insert(ListKind::Deny, ip);
        Ok(())
    }

    async fn remove_allow(&self, ip: &str) -> Result<()> {
        self.remove(ListKind::Allow, ip);
        Ok(())
    }

    async fn remove_deny(&self, ip: &str) -> Result<()> {
        self.remove(ListKind::Deny, ip);
        Ok(())
    }
}
