//! Explicit chat session: the conversation log and credential of one user,
//! passed to the gateway and orchestrator instead of living in globals.

use gemgate_types::{
    GatewayConfig, GatewayError, GenerationRequest, GenerationResult, InlineData, Part,
    PromptModifiers, Role, Turn,
};

use crate::proxy::batch::{BatchLimits, BatchMode, BatchOrchestrator, BatchProgress, CallTarget};
use crate::proxy::upstream::{resolve_credential, Gateway, ModelModifiers};

pub const NO_CONTENT_MESSAGE: &str = "No content returned.";

/// One image-page submission.
#[derive(Debug, Clone, Default)]
pub struct ImageSubmission {
    pub prompt: String,
    pub modifiers: PromptModifiers,
    pub attachments: Vec<InlineData>,
    pub mode: BatchMode,
}

pub struct ChatSession {
    conversation: Vec<Turn>,
    credential: Option<String>,
    config: GatewayConfig,
}

impl ChatSession {
    pub fn new(config: GatewayConfig, credential: Option<String>) -> Self {
        Self { conversation: Vec::new(), credential, config }
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential;
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Send one chat message. Returns the model's parts.
    pub async fn submit_chat(
        &mut self,
        gateway: &dyn Gateway,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<Part>, GatewayError> {
        let model = model.filter(|m| !m.trim().is_empty()).unwrap_or(self.config.chat_model.as_str()).to_string();
        let modifiers = ModelModifiers::chat(self.config.max_output_tokens);
        let submission = ImageSubmission { prompt: text.to_string(), ..ImageSubmission::default() };

        let results = self.submit(gateway, submission, model, modifiers, |_| {}).await?;
        Ok(results.into_iter().flat_map(|r| r.parts).collect())
    }

    /// Run an image submission (single or batch) against the image model.
    pub async fn submit_image<F>(
        &mut self,
        gateway: &dyn Gateway,
        submission: ImageSubmission,
        on_progress: F,
    ) -> Result<Vec<GenerationResult>, GatewayError>
    where
        F: FnMut(BatchProgress) + Send,
    {
        let model = self.config.image_model.clone();
        self.submit(gateway, submission, model, ModelModifiers::image(), on_progress).await
    }

    async fn submit<F>(
        &mut self,
        gateway: &dyn Gateway,
        submission: ImageSubmission,
        model: String,
        modifiers: ModelModifiers,
        on_progress: F,
    ) -> Result<Vec<GenerationResult>, GatewayError>
    where
        F: FnMut(BatchProgress) + Send,
    {
        let request = GenerationRequest {
            prompt: submission.prompt,
            prior_turns: self.conversation.clone(),
            modifiers: submission.modifiers,
            attachments: submission.attachments,
        };
        // Nothing to record for an empty submission.
        if request.is_empty() {
            return Err(GatewayError::validation("Message is required"));
        }

        self.conversation.push(user_turn(&request));

        let outcome = match resolve_credential(self.credential.as_deref(), self.config.api_key.as_deref()) {
            Ok(credential) => {
                let target = CallTarget { credential, model, modifiers };
                BatchOrchestrator::new(gateway, BatchLimits::from(&self.config))
                    .run(&request, submission.mode, &target, on_progress)
                    .await
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(results) => {
                self.conversation.push(model_turn(&results));
                Ok(results)
            },
            Err(e) => {
                tracing::warn!("[Session] Submission failed: {}", e);
                self.conversation.push(Turn::model_text(format!("Error: {}", e)));
                Err(e)
            },
        }
    }
}

/// The user's own text (never the composed prompt) followed by attachments.
fn user_turn(request: &GenerationRequest) -> Turn {
    let mut parts = Vec::with_capacity(request.attachments.len() + 1);
    if !request.prompt.is_empty() || request.attachments.is_empty() {
        parts.push(Part::text(request.prompt.clone()));
    }
    parts.extend(request.attachments.iter().cloned().map(Part::inline));
    Turn::new(Role::User, parts)
}

/// One model turn for the whole batch; labeled results are introduced by
/// their label.
fn model_turn(results: &[GenerationResult]) -> Turn {
    let mut parts = Vec::new();
    for result in results {
        if let Some(label) = &result.label {
            parts.push(Part::text(label.clone()));
        }
        parts.extend(result.parts.iter().cloned());
    }
    if parts.is_empty() {
        parts.push(Part::text(NO_CONTENT_MESSAGE));
    }
    Turn::new(Role::Model, parts)
}
