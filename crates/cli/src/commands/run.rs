//! `llmd run`: one turn against the configured provider.

use std::path::Path;

use llmd_agent::TurnRunner;
use llmd_core::Message;
use llmd_patch::PATCH_GUIDE;
use llmd_providers::build_from_config;

use super::CmdResult;

pub struct RunOptions {
    pub message: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub dry_run: bool,
}

pub async fn run(file: &Path, config: Option<&Path>, options: RunOptions) -> CmdResult {
    let config = super::load_config(config)?;
    let mut log = super::read_log(file)?;

    if let Some(message) = options.message {
        log.push(Message::user(message.trim()));
    }

    let router = build_from_config(&config);
    let provider = router.select(options.provider.as_deref()).map_err(|e| {
        format!(
            "{e}\n\n  Set LLMD_API_KEY (or the provider's own key variable) or add it to {}",
            llmd_config::AppConfig::config_path().display()
        )
    })?;
    let model = options
        .model
        .unwrap_or_else(|| config.model_for(provider.name()).to_string());

    let guide = config
        .prompt
        .system_prompt_override
        .clone()
        .unwrap_or_else(|| PATCH_GUIDE.to_string());

    let runner = TurnRunner::new(provider, model, config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_guide(guide)
        .with_applier(super::applier(&config));

    let outcome = runner.run(&mut log).await?;

    if options.dry_run {
        eprintln!("{}", outcome.reply.trim_end());
    } else {
        println!("{}", outcome.reply.trim_end());
    }
    super::print_summary(&outcome);
    super::write_log(file, &log, options.dry_run)
}
