//! # Integration Tests
//!
//! Every test assembles a real kernel; nothing is mocked below the
//! `ServiceInstance` boundary.

pub mod compliance;
pub mod lifecycle;
pub mod scenarios;
pub mod security;
pub mod versioning;
