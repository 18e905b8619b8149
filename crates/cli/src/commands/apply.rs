//! `llmd apply`: apply a saved reply without calling a model.

use std::path::Path;

use llmd_agent::apply_reply;

use super::CmdResult;

pub fn run(file: &Path, reply: &Path, config: Option<&Path>, dry_run: bool) -> CmdResult {
    let config = super::load_config(config)?;
    let mut log = super::read_log(file)?;

    let reply = std::fs::read_to_string(reply)
        .map_err(|e| format!("Failed to read reply {}: {e}", reply.display()))?;

    let outcome = apply_reply(&mut log, &reply, &super::applier(&config))?;
    super::print_summary(&outcome);
    super::write_log(file, &log, dry_run)
}
