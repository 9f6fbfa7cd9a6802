//! LSP Protocol Implementation
//!
//! Thin host over the parser and validation engine: document store,
//! settings plumbing and the hover/completion/symbol handlers.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::{Backend, CONFIG_SECTION};
pub use document::DocumentState;
pub use server::serve;
