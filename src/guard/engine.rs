//! Allow/deny decisions for authentication attempts.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::LimitsConfig;
use crate::error::{GuardError, Result};
use crate::lists::ListStore;
use crate::ratelimit::AttemptLimiter;

use super::request::AttemptRequest;

/// Maximum attempts allowed per window for each dimension of an attempt.
///
/// A counter strictly above its limit denies the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub ip: u64,
    pub login: u64,
    pub password: u64,
}

impl TryFrom<&LimitsConfig> for Thresholds {
    type Error = GuardError;

    fn try_from(limits: &LimitsConfig) -> Result<Self> {
        let check = |name: &str, value: i64| {
            u64::try_from(value).map_err(|_| {
                GuardError::Config(format!("{} limit must not be negative, got {}", name, value))
            })
        };

        Ok(Self {
            ip: check("ip", limits.ip)?,
            login: check("login", limits.login)?,
            password: check("password", limits.password)?,
        })
    }
}

/// Why an attempt was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The source is on the deny list
    DenyListed,
    IpLimitExceeded,
    LoginLimitExceeded,
    PasswordLimitExceeded,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::DenyListed => "ip in deny list",
            DenyReason::IpLimitExceeded => "ip limit exceeded",
            DenyReason::LoginLimitExceeded => "login limit exceeded",
            DenyReason::PasswordLimitExceeded => "password limit exceeded",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Combines the allow/deny lists with per-key attempt counters.
///
/// The engine holds no per-request state; it can be shared across tasks
/// behind an `Arc`.
pub struct DecisionEngine<L: ListStore, A: AttemptLimiter> {
    lists: Arc<L>,
    limiter: Arc<A>,
    thresholds: Thresholds,
}

impl<L: ListStore, A: AttemptLimiter> DecisionEngine<L, A> {
    pub fn new(lists: Arc<L>, limiter: Arc<A>, thresholds: Thresholds) -> Self {
        Self {
            lists,
            limiter,
            thresholds,
        }
    }

    /// Build an engine from configured limits, rejecting invalid ones.
    pub fn from_limits(lists: Arc<L>, limiter: Arc<A>, limits: &LimitsConfig) -> Result<Self> {
        let thresholds = Thresholds::try_from(limits)?;
        Ok(Self::new(lists, limiter, thresholds))
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Decide whether an authentication attempt may proceed.
    ///
    /// Checks run in order and stop at the first conclusive one: allow list,
    /// deny list, then the ip, login and password counters. Each counter
    /// check charges one attempt. Collaborator failures are returned as
    /// errors, never as a verdict; charges made before a failure stay.
    #[instrument(skip_all, fields(ip = %ip, login = %login))]
    pub async fn check(&self, ip: &str, login: &str, password: &str) -> Result<Decision> {
        if self.lists.contains_allow(ip).await? {
            debug!("Source is allow-listed");
            return Ok(Decision::Allow);
        }

        if self.lists.contains_deny(ip).await? {
            debug!("Source is deny-listed");
            return Ok(Decision::Deny(DenyReason::DenyListed));
        }

        let charges = [
            (ip, self.thresholds.ip, DenyReason::IpLimitExceeded),
            (login, self.thresholds.login, DenyReason::LoginLimitExceeded),
            (password, self.thresholds.password, DenyReason::PasswordLimitExceeded),
        ];

        for (key, limit, reason) in charges {
            let count = self.limiter.charge(key).await?;
            if count > limit {
                info!(count = count, limit = limit, reason = %reason, "Authentication attempt denied");
                return Ok(Decision::Deny(reason));
            }
        }

        Ok(Decision::Allow)
    }

    /// Same as [`check`](Self::check) for a request value.
    pub async fn check_request(&self, request: &AttemptRequest) -> Result<Decision> {
        self.check(&request.ip, &request.login, &request.password).await
    }

    /// Reset the counters for `ip` and `login`. The password counter is kept.
    pub async fn clear_buckets(&self, ip: &str, login: &str) -> Result<()> {
        self.limiter
            .clear_keys(&[ip.to_string(), login.to_string()])
            .await?;
        debug!(ip = %ip, login = %login, "Cleared buckets");
        Ok(())
    }

    /// Reset every counter.
    pub async fn clear_all_buckets(&self) -> Result<()> {
        self.limiter.clear_all().await?;
        debug!("Cleared all buckets");
        Ok(())
    }

    pub async fn add_to_allow_list(&self, ip: &str) -> Result<()> {
        self.lists.add_allow(ip).await
    }

    pub async fn add_to_deny_list(&self, ip: &str) -> Result<()> {
        self.lists.add_deny(ip).await
    }

    pub async fn remove_from_allow_list(&self, ip: &str) -> Result<()> {
        self.lists.remove_allow(ip).await
    }

    pub async fn remove_from_deny_list(&self, ip: &str) -> Result<()> {
        self.lists.remove_deny(ip).await
    }
}
