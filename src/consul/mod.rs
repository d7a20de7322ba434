//! Consul agent integration.
//!
//! # Data Flow
//! ```text
//! ConsulClient (reqwest)
//!     → store::consul (KV values + session locks)
//!     → watch::consul (blocking health check queries)
//! ```

pub mod client;
pub mod types;

pub use client::ConsulClient;
pub use types::{ConsulError, ConsulResult, HealthCheck};
