//! `llmd init`: write an empty project log.

use std::path::Path;

use llmd_document::ProjectLog;

use super::CmdResult;

pub fn run(file: &Path, name: &str, force: bool) -> CmdResult {
    if file.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", file.display()).into());
    }

    let name = name.trim();
    if name.is_empty() {
        return Err("project name must not be empty".into());
    }

    let text = ProjectLog::skeleton(name).to_text()?;
    std::fs::write(file, text)?;

    println!("✅ Created {}", file.display());
    println!("   Add files under \"## Code Context\" and a message under \"## Conversation Thread\",");
    println!("   then run: llmd run {}", file.display());
    Ok(())
}
