//! Release lists on the board
//!
//! Each release is a board list named after its version tag (`v1.4.0`). Cards filed
//! under the list are the changes shipped in that version.
//!
//! - **version**: which list names count as versions, and how they are ordered
//! - **collector**: reads one version list, or every open one, into changelog records

pub mod collector;
pub mod version;

pub use collector::{ReleaseBundle, ReleaseCollector};
