//! Recording gateway for orchestration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gemgate_types::{GatewayError, InlineData, Part, Turn};

use crate::proxy::upstream::{Gateway, GatewayRequest};

/// Answers every call with `"generated: <prompt>"` plus one image, and
/// records what it was sent.
#[derive(Default)]
pub(crate) struct FakeGateway {
    calls: Mutex<Vec<GatewayRequest>>,
    failures: HashMap<usize, GatewayError>,
    extra_parts: HashMap<usize, usize>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the call with this zero-based index.
    pub(crate) fn failing_at(mut self, index: usize, error: GatewayError) -> Self {
        self.failures.insert(index, error);
        self
    }

    pub(crate) fn with_extra_parts_on(mut self, index: usize, extra: usize) -> Self {
        self.extra_parts.insert(index, extra);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.message.text().unwrap_or_default().to_string())
            .collect()
    }

    pub(crate) fn histories(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().unwrap().iter().map(|c| c.history.to_vec()).collect()
    }

    pub(crate) fn requests(&self) -> Vec<GatewayRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn generate(&self, request: &GatewayRequest) -> Result<Vec<Part>, GatewayError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len() - 1
        };

        if let Some(error) = self.failures.get(&index) {
            return Err(error.clone());
        }

        let prompt = request.message.text().unwrap_or_default();
        let mut parts = vec![
            Part::text(format!("generated: {}", prompt)),
            Part::inline(InlineData { mime_type: "image/png".into(), data: format!("img{}", index) }),
        ];
        for n in 0..self.extra_parts.get(&index).copied().unwrap_or(0) {
            parts.push(Part::text(format!("extra {}", n)));
        }
        Ok(parts)
    }
}
