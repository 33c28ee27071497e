//! Storage abstractions for the seen-state.
//!
//! The whole persistence model is one text file:
//!
//! ```text
//! storage/
//! ├── config.toml           # Bot configuration
//! └── seen_notices.txt      # One relayed title per line, oldest first
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SeenState;

// Re-export for convenience
pub use local::FileStateStore;

/// Trait for seen-state backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load previously relayed titles.
    ///
    /// A missing or unreadable store is a first run, not an error.
    async fn load(&self) -> SeenState;

    /// Persist the newest titles, replacing what was stored before.
    async fn save(&self, state: &SeenState) -> Result<()>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}
