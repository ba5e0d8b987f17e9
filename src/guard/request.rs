//! Authentication attempt input.

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::lists::cidr;

/// One authentication attempt as submitted by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRequest {
    /// Source network in CIDR form
    pub ip: String,
    pub login: String,
    #[serde(default)]
    pub password: String,
}

impl AttemptRequest {
    pub fn new(ip: impl Into<String>, login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            login: login.into(),
            password: password.into(),
        }
    }

    /// Validate a request destined for a full check.
    ///
    /// Login and password must be non-empty and `ip` must be a valid CIDR.
    /// All problems are reported together.
    pub fn validate(&self) -> Result<()> {
        self.validate_fields(true)
    }

    /// Validate a request destined for a bucket reset, where no password is sent.
    pub fn validate_for_reset(&self) -> Result<()> {
        self.validate_fields(false)
    }

    fn validate_fields(&self, require_password: bool) -> Result<()> {
        let mut problems = Vec::new();

        if self.login.is_empty() {
            problems.push("empty login");
        }
        if require_password && self.password.is_empty() {
            problems.push("empty password");
        }
        if !cidr::is_valid(&self.ip) {
            problems.push("invalid ip");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GuardError::Validation(problems.join(", ")))
        }
    }
}
