//! Brute Guard - Login Brute-Force Throttling
//!
//! This crate decides whether an authentication attempt, identified by its
//! source network, login and password, may proceed. Static allow/deny lists
//! are consulted first; otherwise each dimension is charged against a
//! decaying in-memory counter and compared with its configured limit.
//! A background janitor evicts counters that have gone idle.

pub mod config;
pub mod error;
pub mod guard;
pub mod lists;
pub mod logging;
pub mod ratelimit;
