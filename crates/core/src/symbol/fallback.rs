//! What to do when a set has no usable symbol.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::catalog::SetRecord;

/// Answer to a missing symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingSymbolDecision {
    /// Retry resolution with this file as the override.
    UseImage(PathBuf),
    /// Skip this set.
    Skip,
    /// Render the label without a symbol.
    TextOnly,
    /// Skip this set and every later set missing a symbol.
    SkipAll,
    /// Text-only for this set and every later set missing a symbol.
    TextOnlyAll,
}

impl MissingSymbolDecision {
    /// The run-wide choice this decision establishes, if any.
    pub fn remembered(&self) -> Option<RememberedChoice> {
        match self {
            Self::SkipAll => Some(RememberedChoice::Skip),
            Self::TextOnlyAll => Some(RememberedChoice::TextOnly),
            _ => None,
        }
    }
}

/// A missing-symbol choice that applies to the rest of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RememberedChoice {
    Skip,
    TextOnly,
}

impl RememberedChoice {
    pub fn as_decision(self) -> MissingSymbolDecision {
        match self {
            Self::Skip => MissingSymbolDecision::Skip,
            Self::TextOnly => MissingSymbolDecision::TextOnly,
        }
    }
}

/// Asks someone (usually a human) how to handle a missing symbol.
#[async_trait]
pub trait MissingSymbolPrompt: Send + Sync {
    /// `remaining` is the number of sets after this one still queued.
    async fn resolve_missing_symbol(
        &self,
        record: &SetRecord,
        remaining: usize,
    ) -> MissingSymbolDecision;
}

/// Non-interactive prompt that always gives the same answer.
#[derive(Debug, Clone)]
pub struct FixedDecision(pub MissingSymbolDecision);

impl FixedDecision {
    pub fn skip() -> Self {
        Self(MissingSymbolDecision::Skip)
    }

    pub fn text_only() -> Self {
        Self(MissingSymbolDecision::TextOnly)
    }
}

#[async_trait]
impl MissingSymbolPrompt for FixedDecision {
    async fn resolve_missing_symbol(
        &self,
        _record: &SetRecord,
        _remaining: usize,
    ) -> MissingSymbolDecision {
        self.0.clone()
    }
}

/// State shared by every worker of one batch run.
#[derive(Debug, Default)]
pub struct RunContext {
    remembered: OnceCell<RememberedChoice>,
    prompt_lock: Mutex<()>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with a choice already made, e.g. from a non-interactive run.
    pub fn with_remembered(choice: RememberedChoice) -> Self {
        Self {
            remembered: OnceCell::new_with(Some(choice)),
            prompt_lock: Mutex::new(()),
        }
    }

    pub fn remembered(&self) -> Option<RememberedChoice> {
        self.remembered.get().copied()
    }

    /// Record a run-wide choice. Returns false when one was already set.
    pub fn remember(&self, choice: RememberedChoice) -> bool {
        self.remembered.set(choice).is_ok()
    }

    /// Decide how to handle a missing symbol for `record`.
    ///
    /// A remembered choice is returned without prompting. Prompts are
    /// serialized; a caller that waited for another prompt re-checks the
    /// remembered choice first.
    pub async fn decide(
        &self,
        prompt: &dyn MissingSymbolPrompt,
        record: &SetRecord,
        remaining: usize,
    ) -> MissingSymbolDecision {
        if let Some(choice) = self.remembered() {
            debug!("{}: applying remembered choice {:?}", record.code, choice);
            return choice.as_decision();
        }

        let _guard = self.prompt_lock.lock().await;

        if let Some(choice) = self.remembered() {
            debug!("{}: applying remembered choice {:?}", record.code, choice);
            return choice.as_decision();
        }

        let decision = prompt.resolve_missing_symbol(record, remaining).await;
        debug!("{}: missing symbol decision {:?}", record.code, decision);

        if let Some(choice) = decision.remembered() {
            if self.remember(choice) {
                info!("Remembering {:?} for remaining sets without a symbol", choice);
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockPrompt};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fixed_decision() {
        let record = fixtures::set_record("ABC", "Alpha", 2020, 1);
        let ctx = RunContext::new();
        let decision = ctx.decide(&FixedDecision::text_only(), &record, 0).await;
        assert_eq!(decision, MissingSymbolDecision::TextOnly);
        assert_eq!(ctx.remembered(), None);
    }

    #[tokio::test]
    async fn test_skip_all_is_remembered() {
        let record = fixtures::set_record("ABC", "Alpha", 2020, 1);
        let prompt = MockPrompt::new(vec![MissingSymbolDecision::SkipAll]);
        let ctx = RunContext::new();

        assert_eq!(
            ctx.decide(&prompt, &record, 2).await,
            MissingSymbolDecision::SkipAll
        );
        assert_eq!(
            ctx.decide(&prompt, &record, 1).await,
            MissingSymbolDecision::Skip
        );
        assert_eq!(
            ctx.decide(&prompt, &record, 0).await,
            MissingSymbolDecision::Skip
        );
        assert_eq!(prompt.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_text_only_all_is_remembered() {
        let record = fixtures::set_record("ABC", "Alpha", 2020, 1);
        let prompt = MockPrompt::new(vec![MissingSymbolDecision::TextOnlyAll]);
        let ctx = RunContext::new();

        ctx.decide(&prompt, &record, 1).await;
        assert_eq!(ctx.remembered(), Some(RememberedChoice::TextOnly));
        assert_eq!(
            ctx.decide(&prompt, &record, 0).await,
            MissingSymbolDecision::TextOnly
        );
        assert_eq!(prompt.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_first_remembered_choice_wins() {
        let ctx = RunContext::new();
        assert!(ctx.remember(RememberedChoice::Skip));
        assert!(!ctx.remember(RememberedChoice::TextOnly));
        assert_eq!(ctx.remembered(), Some(RememberedChoice::Skip));
    }

    #[tokio::test]
    async fn test_concurrent_workers_prompt_once() {
        let prompt = Arc::new(MockPrompt::new(vec![MissingSymbolDecision::SkipAll]));
        let ctx = Arc::new(RunContext::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let prompt = Arc::clone(&prompt);
            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(async move {
                let record = fixtures::set_record(&format!("S{}", i), "Set", 2020, 1);
                ctx.decide(prompt.as_ref(), &record, 0).await
            }));
        }

        for handle in handles {
            let decision = handle.await.unwrap();
            assert!(matches!(
                decision,
                MissingSymbolDecision::SkipAll | MissingSymbolDecision::Skip
            ));
        }
        assert_eq!(prompt.prompt_count(), 1);
    }
}
