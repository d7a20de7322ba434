//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NotifConfig (validated, immutable)
//!     → CLI overrides applied in main, then validated again
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ConsulConfig, LockConfig, NotifConfig, NotifierConfig, NotifierKind, ObservabilityConfig,
    PagerConfig, ProcessorConfig, SlackConfig, StoreConfig, StoreKind, WatchConfig,
};
pub use validation::{validate_config, ValidationError};
