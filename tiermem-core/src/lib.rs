//! tiermem-core - shared types for the tiered memory system
//!
//! This crate holds the pieces every memory tier and store agrees on:
//!
//! - **schema** - `Message`, `Role`, `ContentPart` and `Document`
//! - **embedding** - the `Embedder` trait plus built-in providers
//! - **error** - core error type
//!
//! Memory tiers, stores and hooks live in `tiermem-sdk`.

pub mod embedding;
pub mod error;
pub mod schema;

pub use embedding::{Embedder, HashEmbedder};
pub use error::{Error, Result};
pub use schema::{ContentPart, Document, Message, Role};
