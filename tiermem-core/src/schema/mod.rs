//! Message and document schema shared by every memory tier.

mod document;
mod message;

pub use document::Document;
pub use message::{ContentPart, Message, Role};
