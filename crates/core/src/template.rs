//! Template rendering applied to a project log file before it is parsed.
//!
//! The renderer is a seam: [`PlainRenderer`] returns the file unchanged, and
//! richer expansion can be plugged in without touching the parser.

use std::path::Path;
use crate::error::{Error, Result};

/// Expands a file on disk into the text handed to the document parser.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, path: &Path) -> Result<String>;
}

/// Identity renderer: reads the file as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl TemplateRenderer for PlainRenderer {
    fn render(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| Error::Template {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
