//! Section tree parser and serializer.
//!
//! A document is a sequence of heading lines (`#` repeated `level` times, a
//! space, a title) and body lines. Each heading opens a [`Section`]; body
//! lines accumulate verbatim into the innermost open section.
//!
//! ```text
//! # Project: demo          ← level 1, root
//! ## Mission               ← level 2, child of "Project: demo"
//! Ship it.                 ← body of "Mission"
//! ## Changelog             ← level 2 closes "Mission"
//! ```
//!
//! [`Document::parse`] and [`Document::unparse`] are exact inverses:
//! `unparse(parse(t)) == t` byte for byte for every accepted `t`. That is why
//! the parser rejects inputs whose layout cannot be reproduced from the tree
//! (skipped levels, an unterminated final heading).

use std::fmt;
use std::str::FromStr;

use llmd_core::StructureError;
use serde::Serialize;
use tracing::{debug, warn};

/// Title the parser refuses: it collides with the body-storage key used by
/// exported representations of the tree.
pub const RESERVED_TITLE: &str = "text";

/// A titled node in the heading hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    /// Raw text between this heading line and the next heading of any level.
    #[serde(rename = "text")]
    pub body: String,
    /// Child sections in source order.
    pub children: Vec<Section>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_child(mut self, child: Section) -> Self {
        self.children.push(child);
        self
    }

    /// Direct child by exact title.
    pub fn child(&self, title: &str) -> Option<&Section> {
        self.children.iter().find(|c| c.title == title)
    }

    pub fn child_mut(&mut self, title: &str) -> Option<&mut Section> {
        self.children.iter_mut().find(|c| c.title == title)
    }

    /// Depth-first, pre-order search among descendants.
    pub fn find(&self, title: &str) -> Option<&Section> {
        find_in(&self.children, title)
    }

    pub fn find_mut(&mut self, title: &str) -> Option<&mut Section> {
        find_in_mut(&mut self.children, title)
    }

    /// Number of sections in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Section::count).sum::<usize>()
    }

    fn write_to(&self, level: usize, out: &mut String) {
        for _ in 0..level {
            out.push('#');
        }
        out.push(' ');
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.body);
        for child in &self.children {
            child.write_to(level + 1, out);
        }
    }
}

/// The unlabeled root container holding the top-level sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// Build the section tree from heading-structured text.
    ///
    /// Open sections live on an explicit stack where `stack[i]` is the open
    /// section at level `i + 1`. A heading at level `L` pops every open
    /// section at level ≥ `L`, attaching each to its parent (or to the root),
    /// then pushes itself.
    pub fn parse(text: &str) -> Result<Self, StructureError> {
        let mut roots: Vec<Section> = Vec::new();
        let mut stack: Vec<Section> = Vec::new();
        let mut fence: Option<&'static str> = None;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;

            if fence.is_none() {
                if let Some((level, title)) = heading(line) {
                    if title.trim() == RESERVED_TITLE {
                        return Err(StructureError::ReservedTitle {
                            line: line_no,
                            title: title.to_string(),
                        });
                    }
                    if level > stack.len() + 1 {
                        return Err(StructureError::SkippedLevel {
                            line: line_no,
                            level,
                            open: stack.len(),
                        });
                    }
                    if !line.ends_with('\n') {
                        return Err(StructureError::UnterminatedHeading {
                            line: line_no,
                            title: title.to_string(),
                        });
                    }

                    close_to(&mut stack, &mut roots, level - 1);

                    let siblings = stack.last().map_or(&roots, |parent| &parent.children);
                    if siblings.iter().any(|s| s.title == title) {
                        return Err(StructureError::DuplicateTitle {
                            line: line_no,
                            title: title.to_string(),
                        });
                    }

                    stack.push(Section::new(title));
                    continue;
                }
            }

            let Some(current) = stack.last_mut() else {
                return Err(StructureError::OrphanBody { line: line_no });
            };
            current.body.push_str(line);
            fence = toggle_fence(fence, line);
        }

        if let Some(marker) = fence {
            warn!(marker, "Document ends inside an unclosed code fence");
        }

        close_to(&mut stack, &mut roots, 0);
        let document = Self { sections: roots };
        debug!(sections = document.count(), "Parsed document");
        Ok(document)
    }

    /// Serialize back to text: pre-order, heading then body then children.
    pub fn unparse(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.write_to(1, &mut out);
        }
        out
    }

    /// Depth-first, pre-order search over the whole tree.
    pub fn find(&self, title: &str) -> Option<&Section> {
        find_in(&self.sections, title)
    }

    pub fn find_mut(&mut self, title: &str) -> Option<&mut Section> {
        find_in_mut(&mut self.sections, title)
    }

    /// Total number of sections.
    pub fn count(&self) -> usize {
        self.sections.iter().map(Section::count).sum()
    }
}

impl FromStr for Document {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unparse())
    }
}

/// Pop open sections until `depth` remain, attaching each to its parent.
fn close_to(stack: &mut Vec<Section>, roots: &mut Vec<Section>, depth: usize) {
    while stack.len() > depth {
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

fn find_in<'a>(sections: &'a [Section], title: &str) -> Option<&'a Section> {
    for section in sections {
        if section.title == title {
            return Some(section);
        }
        if let Some(found) = find_in(&section.children, title) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(sections: &'a mut [Section], title: &str) -> Option<&'a mut Section> {
    for section in sections.iter_mut() {
        if section.title == title {
            return Some(section);
        }
        if let Some(found) = find_in_mut(&mut section.children, title) {
            return Some(found);
        }
    }
    None
}

/// Classify a line as a heading: one or more `#`, a space, a non-blank title.
///
/// Returns the level and the title (without the line terminator).
pub(crate) fn heading(line: &str) -> Option<(usize, &str)> {
    let content = line.strip_suffix('\n').unwrap_or(line);
    let level = content.bytes().take_while(|b| *b == b'#').count();
    if level == 0 {
        return None;
    }
    let title = content[level..].strip_prefix(' ')?;
    if title.trim().is_empty() {
        return None;
    }
    Some((level, title))
}

/// The fence marker a line opens or closes, if any.
pub(crate) fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

/// Advance the fence state by one body line.
pub(crate) fn toggle_fence(open: Option<&'static str>, line: &str) -> Option<&'static str> {
    match (open, fence_marker(line)) {
        (None, Some(marker)) => Some(marker),
        (Some(current), Some(marker)) if current == marker => None,
        (state, _) => state,
    }
}

/// Why a body would not read back as the same body of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDefect {
    /// A code fence is still open at the end, so it would swallow the
    /// headings that follow.
    UnclosedFence,
    /// A line outside any fence parses as a heading. 1-based within the body.
    Heading { line: usize },
}

/// Check that `body`, placed under a heading, parses back as that body.
pub fn check_body(body: &str) -> Result<(), BodyDefect> {
    let mut fence = None;
    for (idx, line) in body.split_inclusive('\n').enumerate() {
        if fence.is_none() && heading(line).is_some() {
            return Err(BodyDefect::Heading { line: idx + 1 });
        }
        fence = toggle_fence(fence, line);
    }
    match fence {
        Some(_) => Err(BodyDefect::UnclosedFence),
        None => Ok(()),
    }
}
