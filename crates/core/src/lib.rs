//! Equitybook Core - performance analytics engine.
//!
//! This crate turns daily account-equity snapshots and their cash flows into
//! deposit-neutral time-weighted returns, drawdown tracking and benchmark
//! simulations. It performs no I/O: storage and caching are reached through
//! the traits defined here and implemented by the host application.

pub mod accounts;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod quotes;
pub mod settings;
pub mod utils;

// Re-export the engine entry points
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
