//! Core types and traits for the Quill blog client.
//!
//! This crate provides the post data model, error handling, client
//! configuration and the [`PostCollection`] trait implemented by the
//! collection resource clients.

/// Client configuration loaded from TOML.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Trait definitions for collection resource clients.
pub mod traits;
/// Post, draft and identifier types.
pub mod types;

pub use config::{ClientConfig, InsertPolicy};
pub use error::{Error, Result};
pub use traits::PostCollection;
pub use types::{DraftField, DraftPost, Operation, Post, PostId};
