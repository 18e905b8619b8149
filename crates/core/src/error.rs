//! Error types for the llmd domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] aggregates them.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all llmd operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Document structure ---
    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    // --- Patch application ---
    #[error("Patch error: {0}")]
    Patch(#[from] PatchPreconditionError),

    // --- Conversation state ---
    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Template rendering ---
    #[error("Template error for {path}: {reason}")]
    Template { path: PathBuf, reason: String },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// The document text cannot be interpreted as a section tree.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("line {line}: section title '{title}' is reserved")]
    ReservedTitle { line: usize, title: String },

    #[error("line {line}: text appears before any heading")]
    OrphanBody { line: usize },

    #[error("line {line}: heading level {level} skips a level (deepest open level is {open})")]
    SkippedLevel { line: usize, level: usize, open: usize },

    #[error("line {line}: duplicate section title '{title}' under the same parent")]
    DuplicateTitle { line: usize, title: String },

    #[error("line {line}: final heading '{title}' has no trailing newline")]
    UnterminatedHeading { line: usize, title: String },
}

/// A patch instruction could not be applied to the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchPreconditionError {
    #[error("search text not found in '{section}'")]
    SearchNotFound { section: String },

    #[error("empty search text for '{section}'")]
    EmptySearch { section: String },

    #[error("no code file named '{target}' in Code Context")]
    UnknownTarget { target: String },

    #[error("code edit has no target file label")]
    MissingTarget,

    #[error("document has no '{section}' section")]
    MissingSection { section: String },

    #[error("edit would leave an unclosed code fence in '{section}'")]
    UnbalancedFence { section: String },

    #[error("edit would put a heading at line {line} of '{section}'")]
    HeadingInBody { section: String, line: usize },

    #[error("edit would remove the final newline of '{section}'")]
    MissingFinalNewline { section: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("document has no '{0}' section")]
    MissingThread(String),

    #[error("nothing to answer: the last message is not from the user")]
    AwaitingUser,
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}
