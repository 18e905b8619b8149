//! The turn runner for llmd.
//!
//! A turn follows one fixed path over an owned [`ProjectLog`]:
//!
//! 1. **Check** that the newest message is from the user
//! 2. **Build context** (patch guide + the log without its entries)
//! 3. **Send to LLM** via the configured provider
//! 4. **Record** the reply as the newest assistant message
//! 5. **Scan and apply** its patch instructions, redacting what was applied
//!
//! [`apply_reply`] runs steps 4 and 5 alone, for a reply obtained elsewhere.
//!
//! [`ProjectLog`]: llmd_document::ProjectLog

pub mod turn;

pub use turn::{TurnOutcome, TurnRunner, apply_reply};
