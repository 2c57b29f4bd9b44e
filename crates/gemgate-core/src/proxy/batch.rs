//! Batch orchestration.
//!
//! One user action may fan out into several gateway calls: a fixed
//! three-page set, or styles x variations. Calls run strictly one after
//! another against the same history snapshot, and the first failure ends
//! the batch.

use std::sync::Arc;

use gemgate_types::{GatewayConfig, GatewayError, GenerationRequest, GenerationResult, PromptModifiers, Turn};
use serde::Serialize;

use crate::proxy::mappers::prompt::compose;
use crate::proxy::upstream::{Gateway, GatewayRequest, ModelModifiers};

/// Page presets generated by the "full set" action, in call order.
pub const FULL_SET: [&str; 3] = ["Landing Page", "Blog Homepage", "Product Page"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    #[default]
    Single,
    FullSet,
    /// `count` generations per selected style (styles outer, variations inner)
    Variations { count: usize, label_styles: bool },
}

/// Emitted after each completed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_variations: usize,
    pub max_batch_calls: usize,
}

impl From<&GatewayConfig> for BatchLimits {
    fn from(config: &GatewayConfig) -> Self {
        Self { max_variations: config.max_variations, max_batch_calls: config.max_batch_calls }
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCall {
    pub modifiers: PromptModifiers,
    pub label: Option<String>,
}

/// The ordered calls of one batch, fixed before the first call is made.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    calls: Vec<PlannedCall>,
}

impl BatchPlan {
    pub fn new(
        mode: BatchMode,
        modifiers: &PromptModifiers,
        limits: BatchLimits,
    ) -> Result<Self, GatewayError> {
        let calls = match mode {
            BatchMode::Single => vec![PlannedCall { modifiers: modifiers.clone(), label: None }],
            BatchMode::FullSet => FULL_SET
                .iter()
                .map(|page| PlannedCall {
                    modifiers: modifiers.with_preset(page),
                    label: Some(page.to_string()),
                })
                .collect(),
            BatchMode::Variations { count, label_styles } => {
                if count == 0 || count > limits.max_variations {
                    return Err(GatewayError::validation(format!(
                        "Variation count must be between 1 and {}",
                        limits.max_variations
                    )));
                }

                let selected = modifiers.selected_styles();
                let styles: Vec<Option<String>> = if selected.is_empty() {
                    vec![None]
                } else {
                    selected.into_iter().map(Some).collect()
                };

                let total = styles.len() * count;
                if total > limits.max_batch_calls {
                    return Err(GatewayError::validation(format!(
                        "Batch of {} generations exceeds the limit of {}",
                        total, limits.max_batch_calls
                    )));
                }

                let mut calls = Vec::with_capacity(total);
                for style in &styles {
                    for _ in 0..count {
                        calls.push(PlannedCall {
                            modifiers: modifiers.with_single_style(style.as_deref()),
                            label: style.clone().filter(|_| label_styles),
                        });
                    }
                }
                calls
            },
        };
        Ok(Self { calls })
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn calls(&self) -> &[PlannedCall] {
        &self.calls
    }
}

/// Where a batch is sent: credential, model and `generationConfig`.
#[derive(Debug, Clone)]
pub struct CallTarget {
    pub credential: String,
    pub model: String,
    pub modifiers: ModelModifiers,
}

pub struct BatchOrchestrator<'a> {
    gateway: &'a dyn Gateway,
    limits: BatchLimits,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(gateway: &'a dyn Gateway, limits: BatchLimits) -> Self {
        Self { gateway, limits }
    }

    /// Run every planned call in order and collect the results.
    ///
    /// Validation happens before the first call. A failure on call `k > 1`
    /// becomes [`GatewayError::PartialBatch`] and the `k - 1` results
    /// already produced are dropped; a failure on the first call is
    /// returned unchanged.
    pub async fn run<F>(
        &self,
        request: &GenerationRequest,
        mode: BatchMode,
        target: &CallTarget,
        mut on_progress: F,
    ) -> Result<Vec<GenerationResult>, GatewayError>
    where
        F: FnMut(BatchProgress) + Send,
    {
        if request.is_empty() {
            return Err(GatewayError::validation("Message is required"));
        }

        let plan = BatchPlan::new(mode, &request.modifiers, self.limits)?;
        let total = plan.len();
        let history: Arc<[Turn]> = Arc::from(request.prior_turns.clone());

        if total > 1 {
            tracing::info!("[Batch] {:?}: {} sequential calls to {}", mode, total, target.model);
        }

        let mut results = Vec::with_capacity(total);
        for (index, call) in plan.calls().iter().enumerate() {
            let gateway_request = GatewayRequest {
                history: Arc::clone(&history),
                message: compose(&request.prompt, &call.modifiers, &request.attachments),
                credential: target.credential.clone(),
                model: target.model.clone(),
                modifiers: target.modifiers.clone(),
            };

            let parts = match self.gateway.generate(&gateway_request).await {
                Ok(parts) => parts,
                Err(e) if index == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!("[Batch] Call {}/{} failed, discarding {} results", index + 1, total, index);
                    return Err(GatewayError::PartialBatch {
                        completed: index,
                        total,
                        message: e.to_string(),
                    });
                },
            };

            tracing::debug!("[Batch] Call {}/{} returned {} parts", index + 1, total, parts.len());
            results.push(GenerationResult { parts, label: call.label.clone() });
            on_progress(BatchProgress { current: index + 1, total, label: call.label.clone() });
        }

        Ok(results)
    }
}
