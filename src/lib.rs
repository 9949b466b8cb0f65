// src/lib.rs
// tenant-probe: scenario harness for multi-tenant HTTP APIs

pub mod actor;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod report;
pub mod scenario;
pub mod suites;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ProbeError, Result};
