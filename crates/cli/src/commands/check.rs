//! `llmd check`: parse a project log and verify it round-trips.

use std::path::Path;

use llmd_core::{PlainRenderer, TemplateRenderer};
use llmd_document::{Document, ProjectLog};

use super::CmdResult;

pub fn run(file: &Path) -> CmdResult {
    println!("🔍 Checking {}...", file.display());

    let text = PlainRenderer.render(file)?;
    let document = Document::parse(&text).map_err(|e| format!("{}: {e}", file.display()))?;

    let written = document.unparse();
    if written != text {
        let at = first_difference(&written, &text);
        return Err(format!("round trip differs from the file at byte {at}").into());
    }
    println!("   ✅ Round trip is exact ({} bytes)", text.len());

    let log = ProjectLog::parse(&text)?;
    let files: Vec<&str> = log.code_files().iter().map(|(path, _)| *path).collect();
    let changelog = log
        .changelog()
        .map(|body| body.lines().filter(|l| l.starts_with("- ")).count())
        .unwrap_or(0);

    println!();
    println!("   Project:    {}", log.project_name().unwrap_or("(unnamed)"));
    println!("   Sections:   {}", log.document.count());
    if files.is_empty() {
        println!("   Code files: 0");
    } else {
        println!("   Code files: {} ({})", files.len(), files.join(", "));
    }
    println!("   Changelog:  {changelog} entries");
    println!(
        "   Messages:   {}{}",
        log.messages.len(),
        if log.awaiting_reply() { " (awaiting reply)" } else { "" }
    );

    Ok(())
}

fn first_difference(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| a.len().min(b.len()))
}
