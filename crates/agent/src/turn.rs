//! One turn of a project log: ask the model, record the reply, apply its
//! patches.

use std::sync::Arc;

use llmd_core::message::Message;
use llmd_core::provider::{Provider, ProviderRequest, Usage};
use llmd_core::{ConversationError, Result};
use llmd_document::ProjectLog;
use llmd_patch::{ApplyReport, PATCH_GUIDE, PatchApplier, PatchInstruction, scan, system_prompt};
use tracing::{debug, info, warn};

/// What a turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The reply as received, before redaction.
    pub reply: String,
    pub instructions: Vec<PatchInstruction>,
    pub report: ApplyReport,
    pub usage: Option<Usage>,
    /// The model that answered; `None` for a reply supplied offline.
    pub model: Option<String>,
}

/// Runs turns against a provider.
pub struct TurnRunner {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Text placed before the project log in the system context
    guide: String,

    applier: PatchApplier,
}

impl TurnRunner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            guide: PATCH_GUIDE.to_string(),
            applier: PatchApplier::default(),
        }
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Replace the built-in patch guide.
    pub fn with_guide(mut self, guide: impl Into<String>) -> Self {
        self.guide = guide.into();
        self
    }

    pub fn with_applier(mut self, applier: PatchApplier) -> Self {
        self.applier = applier;
        self
    }

    /// The request a turn on `log` would send.
    pub fn request(&self, log: &ProjectLog) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            system: Some(system_prompt(&self.guide, &log.system_context())),
            messages: log.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Answer the newest user message in `log`.
    ///
    /// Fails with [`ConversationError::AwaitingUser`] when the log does not
    /// end with a user message. Provider errors are returned unchanged and
    /// leave `log` untouched.
    pub async fn run(&self, log: &mut ProjectLog) -> Result<TurnOutcome> {
        if !log.awaiting_reply() {
            return Err(ConversationError::AwaitingUser.into());
        }

        info!(
            provider = self.provider.name(),
            model = %self.model,
            messages = log.messages.len(),
            "Requesting reply"
        );

        let response = self.provider.complete(self.request(log)).await?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        let mut outcome = apply_reply(log, &response.message.content, &self.applier)?;
        outcome.usage = response.usage;
        outcome.model = Some(response.model);
        Ok(outcome)
    }
}

/// Record `reply` as the newest assistant message and apply its patches.
pub fn apply_reply(
    log: &mut ProjectLog,
    reply: &str,
    applier: &PatchApplier,
) -> Result<TurnOutcome> {
    log.push(Message::assistant(reply.trim()));

    let instructions = scan(reply);
    let report = applier.apply_to_log(log, &instructions)?;

    if report.is_clean() {
        info!(
            instructions = instructions.len(),
            applied = report.applied,
            "Patches applied"
        );
    } else {
        warn!(
            applied = report.applied,
            failed = report.failures.len(),
            "Some patches were skipped"
        );
    }

    Ok(TurnOutcome {
        reply: reply.to_string(),
        instructions,
        report,
        usage: None,
        model: None,
    })
}
