//! CLI commands
//!
//! Command implementation for the `repo-sync` binary.

mod progress;
mod style;
mod sync;

pub use sync::{run_sync, SyncArgs};
