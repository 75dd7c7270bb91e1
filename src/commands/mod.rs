//! CLI commands for chlog
//!
//! - **sync**: merge version lists from the board into the stored changelog
//!
//! Commands take a `&SyncContext` so providers are built once, in `main`.

pub mod sync;

pub use sync::{SyncOutcome, SyncReport, SyncRequest, SyncTarget, run_sync, run_sync_command};
