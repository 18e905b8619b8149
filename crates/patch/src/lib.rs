//! Inline patch instructions for llmd.
//!
//! An assistant reply may carry edits to the project log:
//!
//! ```text
//! reply text ──scan──▶ Vec<PatchInstruction> ──PatchApplier::apply──▶ edited ProjectLog
//! ```
//!
//! - [`lexer`] finds instructions in free text and never fails.
//! - [`applier`] checks preconditions, edits the document and redacts the
//!   applied spans from the newest message.
//! - [`prompt`] holds the guide that tells a model how to write them.

pub mod applier;
pub mod instruction;
pub mod lexer;
pub mod prompt;

pub use applier::{
    ApplyReport, FailurePolicy, PatchApplier, PatchFailure, REDACTION_MARKER, redact,
};
pub use instruction::{PatchInstruction, PatchOp};
pub use lexer::scan;
pub use prompt::{PATCH_GUIDE, system_prompt};
