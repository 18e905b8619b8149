//! Patch instruction model.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const SEARCH: &str = "SEARCH";
pub const REPLACE: &str = "REPLACE";
pub const SEARCH_MISSION: &str = "SEARCH_MISSION";
pub const REPLACE_MISSION: &str = "REPLACE_MISSION";
pub const CHANGELOG: &str = "CHANGELOG";

/// One instruction as found in a reply, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInstruction {
    /// Label line preceding the opening marker (a file path for code edits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,

    /// Opcode after the opening marker.
    pub opcode_open: String,

    /// Lines between the opening marker and the divider (or the close marker
    /// when there is no divider), terminators included.
    pub search_text: String,

    /// Opcode after the closing marker. Always `None` without a divider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode_close: Option<String>,

    /// Lines between the divider and the close marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_text: Option<String>,

    /// 1-based line of the opening marker in the scanned text.
    pub line: usize,
}

/// A recognized instruction, borrowed from its [`PatchInstruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp<'a> {
    /// `(SEARCH, REPLACE)` on a Code Context file.
    Replace {
        target: Option<&'a str>,
        search: &'a str,
        replace: &'a str,
    },
    /// `(SEARCH_MISSION, REPLACE_MISSION)` on the Mission body.
    ReplaceMission { search: &'a str, replace: &'a str },
    /// `(CHANGELOG, none)`: append a bullet.
    Changelog { entry: &'a str },
}

impl PatchInstruction {
    /// Classify by opcode pair; `None` for anything unrecognized.
    pub fn op(&self) -> Option<PatchOp<'_>> {
        match (
            self.opcode_open.as_str(),
            self.opcode_close.as_deref(),
            self.replace_text.as_deref(),
        ) {
            (SEARCH, Some(REPLACE), Some(replace)) => Some(PatchOp::Replace {
                target: self.target_label.as_deref(),
                search: &self.search_text,
                replace,
            }),
            (SEARCH_MISSION, Some(REPLACE_MISSION), Some(replace)) => {
                Some(PatchOp::ReplaceMission {
                    search: &self.search_text,
                    replace,
                })
            }
            (CHANGELOG, None, None) => Some(PatchOp::Changelog {
                entry: &self.search_text,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for PatchInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode_open)?;
        if let Some(close) = &self.opcode_close {
            write!(f, "/{close}")?;
        }
        if let Some(label) = &self.target_label {
            write!(f, " {label}")?;
        }
        write!(f, " (line {})", self.line)
    }
}
