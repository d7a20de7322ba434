//! State store subsystem.
//!
//! # Data Flow
//! ```text
//! Processor
//!     → state.rs (CheckKey ↔ storage key, JSON encode/decode)
//!     → traits.rs (StateStore: get / put / lock)
//!         → consul.rs (Consul KV + session locks)
//!         → memory.rs (process-local, tests and dry runs)
//! ```
//!
//! # Design Decisions
//! - The store is the source of truth; anything cached elsewhere is advisory
//! - Lock handles are released explicitly so errors can be logged
//! - Decode failures surface as errors instead of empty state

pub mod consul;
pub mod error;
pub mod memory;
pub mod state;
pub mod traits;

pub use consul::ConsulStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use state::CheckStateStore;
pub use traits::{LockHandle, StateStore};
