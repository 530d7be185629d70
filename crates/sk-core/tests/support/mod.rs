//! Shared helpers for sk-core integration tests.

pub mod fixtures;
