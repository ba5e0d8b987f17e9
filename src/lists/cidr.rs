//! CIDR validation for list entries and attempt sources.
//!
//! Entries are IPv4 networks written as `a.b.c.d/len` with `len` in `0..=32`.
//! Host bits are kept as written; two entries match only if their
//! normalized strings are equal.

use std::net::Ipv4Addr;

use crate::error::{GuardError, Result};

/// Largest IPv4 prefix length.
const MAX_PREFIX_LEN: u8 = 32;

/// Validate `value` and return its canonical form.
pub fn normalize(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let invalid = || GuardError::Validation(format!("invalid CIDR: {:?}", value));

    let (addr, prefix) = trimmed.split_once('/').ok_or_else(invalid)?;
    let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > MAX_PREFIX_LEN {
        return Err(invalid());
    }

    Ok(format!("{}/{}", addr, prefix))
}

/// Whether `value` is a well-formed CIDR entry.
pub fn is_valid(value: &str) -> bool {
    normalize(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_network_entries() {
        assert_eq!(normalize("192.1.1.0/25").unwrap(), "192.1.1.0/25");
        assert_eq!(normalize("10.0.0.1/32").unwrap(), "10.0.0.1/32");
        assert_eq!(normalize("0.0.0.0/0").unwrap(), "0.0.0.0/0");
    }

    #[test]
    fn test_keeps_host_bits() {
        assert_eq!(normalize("127.0.0.1/25").unwrap(), "127.0.0.1/25");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize(" 10.1.2.3/8\n").unwrap(), "10.1.2.3/8");
    }

    #[test]
    fn test_rejects_malformed_entries() {
        for bad in [
            "",
            "10.0.0.1",
            "10.0.0.1/",
            "10.0.0.1/33",
            "10.0.0.1/-1",
            "10.0.0.1/+8",
            "10.0.0/24",
            "256.0.0.1/24",
            "::1/128",
            "login",
        ] {
            assert!(!is_valid(bad), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_error_is_validation() {
        assert!(matches!(normalize("nope"), Err(GuardError::Validation(_))));
    }
}
