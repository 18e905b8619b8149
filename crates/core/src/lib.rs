//! # llmd Core
//!
//! Domain types, traits, and error definitions shared by every llmd crate.
//! This crate has **no I/O of its own** apart from the plain template
//! renderer; it defines the vocabulary the other crates implement against.
//!
//! ## Layout
//!
//! - [`error`]: one error enum per bounded context, aggregated in [`Error`]
//! - [`message`]: the human/assistant [`Message`] that a project log stores
//! - [`provider`]: the [`Provider`] trait over language-model backends
//! - [`template`]: the [`TemplateRenderer`] applied to a file before parsing

pub mod error;
pub mod message;
pub mod provider;
pub mod template;

// Re-export key types at crate root for ergonomics
pub use error::{
    ConversationError, Error, PatchPreconditionError, ProviderError, Result, StructureError,
};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use template::{PlainRenderer, TemplateRenderer};
