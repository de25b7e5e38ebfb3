//! Integration tests for perpliq-handler.
//!
//! These tests drive the handler against the in-memory venue:
//! - authorization and exclusion across calls and threads
//! - rollback of every effect on failure
//! - end-to-end liquidation and ADL through the built-in strategies

pub mod common;
