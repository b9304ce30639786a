//! Keeps a local list of posts and a draft in step with the remote `/posts` collection.
//!
//! [`PostListSynchronizer`] is the only mutator of that state. Every remote
//! call it issues is awaited, logged on failure, and surfaced as a
//! [`SyncResult`] so callers can react.

/// Errors returned by synchronizer operations.
pub mod error;
/// The synchronizer and its lifecycle phase.
pub mod synchronizer;

pub use error::{SyncError, SyncResult};
pub use synchronizer::{Phase, PostListSynchronizer};
