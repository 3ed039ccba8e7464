//! Two-pass generation pipeline

use std::sync::Arc;

use protoscribe_config::{ProtoscribeConfig, DEFAULT_GENERATION_MODEL, DEFAULT_REFINEMENT_MODEL};
use protoscribe_prompts::{
    PromptBuilder, PromptOptions, GENERATION_SYSTEM_ROLE, REFINEMENT_SYSTEM_ROLE,
};
use protoscribe_protocol::{
    HistoryEntry, HistoryPolicy, TrialParameters, DEFAULT_MAX_OUTPUT_TOKENS,
};
use protoscribe_providers::CompletionClient;

use crate::error::{GenerationError, Pass};
use crate::session::{Session, SessionState};

/// Model identifiers for the two passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPair {
    pub generation: String,
    pub refinement: String,
}

impl Default for ModelPair {
    fn default() -> Self {
        Self {
            generation: DEFAULT_GENERATION_MODEL.to_string(),
            refinement: DEFAULT_REFINEMENT_MODEL.to_string(),
        }
    }
}

/// Session orchestrator
///
/// Owns the session and is the only thing that mutates it; every mutation goes
/// through `&mut self`, so a generation in flight cannot race another.
pub struct Generator {
    client: Arc<dyn CompletionClient>,
    prompts: PromptBuilder,
    models: ModelPair,
    max_output_tokens: Option<u32>,
    policy: HistoryPolicy,
    session: Session,
}

impl Generator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            prompts: PromptBuilder::default(),
            models: ModelPair::default(),
            max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
            policy: HistoryPolicy::default(),
            session: Session::new(),
        }
    }

    pub fn from_config(client: Arc<dyn CompletionClient>, config: &ProtoscribeConfig) -> Self {
        Self::new(client)
            .with_models(ModelPair {
                generation: config.models.generation.clone(),
                refinement: config.models.refinement.clone(),
            })
            .with_max_output_tokens(config.generation.max_output_tokens)
            .with_policy(config.generation.history_policy)
            .with_prompt_options(
                PromptOptions::default().with_deidentify(config.generation.deidentify),
            )
    }

    pub fn with_models(mut self, models: ModelPair) -> Self {
        self.models = models;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_policy(mut self, policy: HistoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompt_options(mut self, options: PromptOptions) -> Self {
        self.prompts = PromptBuilder::new(options);
        self
    }

    /// Override the draft model, as typed into the form's model field.
    /// Blank input keeps the current model.
    pub fn set_generation_model(&mut self, model: &str) {
        let model = model.trim();
        if !model.is_empty() {
            self.models.generation = model.to_string();
        }
    }

    pub fn models(&self) -> &ModelPair {
        &self.models
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    pub fn provider(&self) -> &str {
        self.client.provider()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn current_text(&self) -> &str {
        self.session.current_text()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.session.history()
    }

    pub fn clear_history(&mut self) {
        tracing::debug!(entries = self.session.history().len(), "clearing history");
        self.session.clear_history();
    }

    /// Run both passes and return the refined text
    ///
    /// Missing required fields fail before any remote call. The current text
    /// changes only when refinement succeeds; when the draft enters history
    /// depends on the [`HistoryPolicy`]. A failed cycle returns the session
    /// to [`SessionState::Idle`].
    pub async fn generate(&mut self, params: &TrialParameters) -> Result<String, GenerationError> {
        if let Err(missing) = params.validate() {
            tracing::warn!(missing = missing.len(), "generation rejected: required fields empty");
            return Err(GenerationError::Validation(missing));
        }

        let params = params.clone().clamped();
        self.session.set_state(SessionState::Generating);

        match self.run_pipeline(&params).await {
            Ok(text) => {
                self.session.set_current_text(text.clone());
                self.session.set_state(SessionState::Succeeded);
                Ok(text)
            }
            Err(err) => {
                tracing::warn!(error = %err, "generation failed");
                self.session.set_state(SessionState::Idle);
                Err(err)
            }
        }
    }

    async fn run_pipeline(&mut self, params: &TrialParameters) -> Result<String, GenerationError> {
        let prompt = self.prompts.generation_prompt(params);
        tracing::debug!(
            model = %self.models.generation,
            prompt_len = prompt.len(),
            "starting generation pass"
        );
        tracing::trace!(preview = %preview(&prompt), "generation prompt");

        let draft = self
            .client
            .complete_text(
                &prompt,
                GENERATION_SYSTEM_ROLE,
                &self.models.generation,
                params.temperature,
                self.max_output_tokens,
            )
            .await
            .map_err(|e| GenerationError::transport(Pass::Generation, e))?;
        tracing::info!(draft_len = draft.len(), "generation pass complete");

        let entry = HistoryEntry::new(
            params.section_request.clone(),
            draft.clone(),
            self.models.generation.clone(),
        );
        let mut pending = Some(entry);
        if self.policy == HistoryPolicy::AfterDraft {
            if let Some(entry) = pending.take() {
                self.session.push_history(entry);
            }
        }

        let prompt = self.prompts.refinement_prompt(&draft, params);
        tracing::debug!(
            model = %self.models.refinement,
            prompt_len = prompt.len(),
            "starting refinement pass"
        );

        let refined = self
            .client
            .complete_text(
                &prompt,
                REFINEMENT_SYSTEM_ROLE,
                &self.models.refinement,
                params.temperature,
                self.max_output_tokens,
            )
            .await
            .map_err(|e| GenerationError::transport(Pass::Refinement, e))?;
        tracing::info!(refined_len = refined.len(), "refinement pass complete");

        if let Some(entry) = pending {
            self.session.push_history(entry);
        }

        Ok(refined)
    }
}

/// First 80 characters of a prompt, for trace output
fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(80).collect();
    if text.chars().count() > 80 {
        preview.push_str("...");
    }
    preview.replace('\n', " ")
}
