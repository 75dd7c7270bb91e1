//! Core building blocks shared by every chlog run
//!
//! - **config**: environment-sourced configuration, validated eagerly
//! - **context**: the run context carrying injected providers
//! - **error**: error types with contextual help messages and exit codes
//! - **scratch**: local working copy of the changelog document

pub mod config;
pub mod context;
pub mod error;
pub mod scratch;
