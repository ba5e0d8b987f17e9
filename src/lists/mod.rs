//! Allow/deny list access.
//!
//! The lists themselves are owned by an external store; the decision engine
//! only needs membership tests and mutations, described by [`ListStore`].

pub mod cidr;
mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryListStore;

/// Which of the two lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Sources that bypass every other check
    Allow,
    /// Sources that are always denied
    Deny,
}

impl ListKind {
    /// Get the list name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Allow => "allow",
            ListKind::Deny => "deny",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for allow/deny list stores.
///
/// Entries are CIDR strings validated by the caller; implementations test
/// membership by string equality.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn contains_allow(&self, ip: &str) -> Result<bool>;

    async fn contains_deny(&self, ip: &str) -> Result<bool>;

    /// Add an entry to the allow list. Adding an existing entry is not an error.
    async fn add_allow(&self, ip: &str) -> Result<()>;

    /// Add an entry to the deny list. Adding an existing entry is not an error.
    async fn add_deny(&self, ip: &str) -> Result<()>;

    /// Remove an entry from the allow list. Removing an absent entry is not an error.
    async fn remove_allow(&self, ip: &str) -> Result<()>;

    /// Remove an entry from the deny list. Removing an absent entry is not an error.
    async fn remove_deny(&self, ip: &str) -> Result<()>;
}
