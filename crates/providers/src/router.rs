//! Provider router: selects the correct LLM provider based on config.

use std::collections::HashMap;
use std::sync::Arc;

use llmd_config::AppConfig;
use llmd_core::error::ProviderError;
use llmd_core::provider::Provider;
use tracing::{debug, warn};

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Look up `name`, or the default provider when `None`.
    pub fn select(&self, name: Option<&str>) -> Result<Arc<dyn Provider>, ProviderError> {
        let name = name.unwrap_or(self.default_provider.as_str());
        self.get(name).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "no provider named '{name}' (configured: {})",
                self.list().join(", ")
            ))
        })
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Every `[providers.<name>]` entry is registered, plus the default provider
/// when it is a well-known name. Entries that need a key but have none, and
/// unknown names without an `api_url`, are left out.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    let mut names: Vec<&str> = config.providers.keys().map(String::as_str).collect();
    if !config.providers.contains_key(&config.default_provider) {
        names.push(config.default_provider.as_str());
    }

    for name in names {
        let api_url = config
            .providers
            .get(name)
            .and_then(|p| p.api_url.as_deref());
        let Some(base_url) = api_url.map(String::from).or_else(|| default_base_url(name)) else {
            warn!(provider = name, "Unknown provider without api_url, skipping");
            continue;
        };

        let api_key = config.api_key_for(name).map(String::from);
        let api_key = match (api_key, is_local(name)) {
            (Some(key), _) => key,
            (None, true) => String::new(),
            (None, false) => {
                debug!(provider = name, "No API key, skipping");
                continue;
            }
        };

        let provider: Arc<dyn Provider> = if name == "anthropic" {
            Arc::new(AnthropicProvider::new(api_key).with_base_url(base_url))
        } else {
            Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
        };

        router.register(name, provider);
    }

    router
}

/// Providers that run on the user's machine and take no key.
fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "anthropic" => "https://api.anthropic.com",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.into())
}
