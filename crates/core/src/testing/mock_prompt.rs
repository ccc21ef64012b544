//! Mock missing-symbol prompt for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use crate::catalog::{SetCode, SetRecord};
use crate::symbol::{MissingSymbolDecision, MissingSymbolPrompt};

/// Prompt that replays scripted answers and records who was asked.
///
/// Once the script runs out every further prompt answers `Skip`.
#[derive(Debug, Clone)]
pub struct MockPrompt {
    answers: Arc<Mutex<VecDeque<MissingSymbolDecision>>>,
    asked: Arc<Mutex<Vec<SetCode>>>,
}

impl MockPrompt {
    pub fn new(answers: Vec<MissingSymbolDecision>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into())),
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times the prompt was shown.
    pub fn prompt_count(&self) -> usize {
        self.asked.lock().unwrap().len()
    }

    /// Codes the prompt was shown for, in order.
    pub fn asked_for(&self) -> Vec<SetCode> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl MissingSymbolPrompt for MockPrompt {
    async fn resolve_missing_symbol(
        &self,
        record: &SetRecord,
        _remaining: usize,
    ) -> MissingSymbolDecision {
        self.asked.lock().unwrap().push(record.code.clone());
        // Give concurrent callers a chance to pile up behind the prompt.
        tokio::task::yield_now().await;
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MissingSymbolDecision::Skip)
    }
}
