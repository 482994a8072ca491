//! Integration tests for the Bluetooth manager transport layer
//!
//! This crate contains scenario tests that exercise the registry, the
//! manager and the in-memory transport together:
//!
//! ```bash
//! cargo test -p btm-tests
//! ```
//!
//! # Test Structure
//!
//! - `registry_scenarios.rs` - registration, fan-out and cascading invalidation
//! - `combined_adapter.rs` - combined-adapter resolution across transports

// This crate only contains tests, no library code
