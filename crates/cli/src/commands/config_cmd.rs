//! `llmd config`: Configuration management commands.

use std::path::Path;

use llmd_config::AppConfig;

use super::CmdResult;

const REDACTED: &str = "[REDACTED]";

pub fn show(path: Option<&Path>) -> CmdResult {
    let mut config = super::load_config(path)?;

    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.into());
        }
    }

    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(path: Option<&Path>) {
    let config_path = path.map_or_else(AppConfig::config_path, Path::to_path_buf);
    println!("{}", config_path.display());
}
