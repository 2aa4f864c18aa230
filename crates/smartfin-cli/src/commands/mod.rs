//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_ledger, build_pipeline)
//! - `ledger` - Ledger commands (add, delete, list, summary)
//! - `advisor` - Insight request command (advise)
//! - `prompts` - Prompt library commands
//! - `status` - Status command

pub mod advisor;
pub mod core;
pub mod ledger;
pub mod prompts;
pub mod status;

// Re-export command functions for main.rs
pub use self::core::*;
pub use advisor::*;
pub use ledger::*;
pub use prompts::*;
pub use status::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
