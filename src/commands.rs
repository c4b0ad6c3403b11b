//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Pages return commands, and the App spawns them with automatic
//! completion detection and status tracking.

mod dashboard;

use async_trait::async_trait;
use color_eyre::Result;
pub use dashboard::{CreatePostCmd, FetchUsersCmd, RunChainCmd};

/// Async command that performs side effects.
///
/// Commands are spawned by the App and tracked for status display.
/// They send their results back to the page via its message channel.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for status display and logs.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> Result<()>;
}
