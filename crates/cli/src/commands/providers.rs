//! `llmd providers`: list the configured providers, optionally contacting each.

use std::path::Path;

use llmd_config::AppConfig;
use llmd_core::Provider;
use llmd_providers::build_from_config;

use super::CmdResult;

/// What a live check against one provider found.
#[derive(Debug, PartialEq, Eq)]
pub enum ProviderStatus {
    Reachable { models: usize },
    Rejected,
    Failed(String),
}

/// Call `health_check`, then `list_models` when the provider answered.
pub async fn check_provider(provider: &dyn Provider) -> ProviderStatus {
    match provider.health_check().await {
        Ok(true) => match provider.list_models().await {
            Ok(models) => ProviderStatus::Reachable {
                models: models.len(),
            },
            Err(e) => ProviderStatus::Failed(e.to_string()),
        },
        Ok(false) => ProviderStatus::Rejected,
        Err(e) => ProviderStatus::Failed(e.to_string()),
    }
}

pub async fn run(config: Option<&Path>, check: bool) -> CmdResult {
    let config = super::load_config(config)?;
    let router = build_from_config(&config);
    let names = router.list();

    println!("🤖 Configured providers");
    println!();
    if names.is_empty() {
        println!("  ⚠️  None. Set LLMD_API_KEY or add a [providers.<name>] table to");
        println!("     {}", AppConfig::config_path().display());
        return Ok(());
    }

    let mut issues = 0;
    for name in names {
        let marker = if name == config.default_provider { "*" } else { " " };
        println!("  {marker} {name:<12} model: {}", config.model_for(name));

        let Some(provider) = router.get(name).filter(|_| check) else {
            continue;
        };
        match check_provider(provider.as_ref()).await {
            ProviderStatus::Reachable { models } => {
                println!("      ✅ reachable, {models} models listed");
            }
            ProviderStatus::Rejected => {
                println!("      ❌ rejected the API key");
                issues += 1;
            }
            ProviderStatus::Failed(reason) => {
                println!("      ❌ {reason}");
                issues += 1;
            }
        }
    }

    if check {
        println!();
        if issues == 0 {
            println!("  🎉 All providers answered.");
        } else {
            println!("  ⚠️  {issues} provider(s) failed. See above for details.");
        }
    }
    Ok(())
}
