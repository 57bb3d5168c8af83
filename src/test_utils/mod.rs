//! Test utilities and mock implementations
//!
//! Provides a scriptable remote backend so the data manager can be exercised
//! without network access.

pub mod mocks;

pub use mocks::MockAdapter;
