//! Project log documents for llmd.
//!
//! A project log is one Markdown-like file:
//!
//! ```text
//! # Project: <name>
//! ## Mission
//! ## Code Context
//! ### <file path>        (one fenced code block each)
//! ## Changelog
//! ## Conversation Thread
//! ### Entry N            (Human: / Assistant: paragraphs)
//! ```
//!
//! - [`section`] parses the heading structure into a [`Document`] tree and
//!   writes it back byte for byte.
//! - [`conversation`] converts the Conversation Thread entries to and from a
//!   `Vec<Message>`.
//! - [`project`] ties both together in [`ProjectLog`].

pub mod conversation;
pub mod project;
pub mod section;

pub use conversation::{ASSISTANT_MARKER, HUMAN_MARKER, THREAD_TITLE};
pub use project::{CHANGELOG_TITLE, CODE_CONTEXT_TITLE, MISSION_TITLE, ProjectLog};
pub use section::{BodyDefect, Document, RESERVED_TITLE, Section, check_body};
