//! Interactive questions asked on the terminal.
//!
//! inquire blocks the calling thread, so every question runs on the blocking
//! pool. An active progress bar is suspended while a question is on screen.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::ProgressBar;
use inquire::validator::Validation;
use inquire::{Confirm, InquireError, Select, Text};
use tracing::warn;

use setlabel_core::{MissingSymbolDecision, MissingSymbolPrompt, SetRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    CustomImage,
    Skip,
    TextOnly,
    SkipAll,
    TextOnlyAll,
}

impl Choice {
    fn options(batch: bool) -> Vec<Choice> {
        if batch {
            vec![
                Self::CustomImage,
                Self::Skip,
                Self::TextOnly,
                Self::SkipAll,
                Self::TextOnlyAll,
            ]
        } else {
            vec![Self::CustomImage, Self::Skip, Self::TextOnly]
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CustomImage => "Provide a custom symbol image",
            Self::Skip => "Skip this set",
            Self::TextOnly => "Continue without symbol (text-only label)",
            Self::SkipAll => "Skip ALL remaining sets without symbols",
            Self::TextOnlyAll => "Continue without symbols for ALL remaining sets",
        })
    }
}

fn missing_symbol_header(record: &SetRecord, remaining: usize, batch: bool) -> String {
    let mut header = format!("No symbol found for {} ({})", record.code, record.name);
    if batch {
        header.push_str(&format!("\n  {} sets remaining in batch", remaining));
    }
    header
}

/// Asks on the terminal what to do about a set without a symbol.
pub struct TerminalPrompt {
    batch: bool,
    progress: Option<ProgressBar>,
}

impl TerminalPrompt {
    /// `batch` adds the "for all remaining sets" choices.
    pub fn new(batch: bool) -> Self {
        Self {
            batch,
            progress: None,
        }
    }

    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }
}

#[async_trait]
impl MissingSymbolPrompt for TerminalPrompt {
    async fn resolve_missing_symbol(
        &self,
        record: &SetRecord,
        remaining: usize,
    ) -> MissingSymbolDecision {
        let header = missing_symbol_header(record, remaining, self.batch);
        let batch = self.batch;
        let progress = self.progress.clone();

        let answer = tokio::task::spawn_blocking(move || {
            let ask = || ask_missing_symbol(&header, batch);
            match progress {
                Some(bar) => bar.suspend(ask),
                None => ask(),
            }
        })
        .await;

        match answer {
            Ok(Ok(decision)) => decision,
            Ok(Err(e)) => {
                warn!("No answer for {} ({}), skipping", record.code, e);
                MissingSymbolDecision::Skip
            }
            Err(e) => {
                warn!("Prompt for {} stopped: {}", record.code, e);
                MissingSymbolDecision::Skip
            }
        }
    }
}

fn ask_missing_symbol(header: &str, batch: bool) -> Result<MissingSymbolDecision, InquireError> {
    eprintln!("\n{}", console::style(header).yellow().bold());

    let choice = Select::new("What should be done?", Choice::options(batch))
        .without_filtering()
        .with_help_message("↑↓ to move, ENTER to select, ESC to skip this set")
        .prompt()?;

    Ok(match choice {
        Choice::CustomImage => MissingSymbolDecision::UseImage(ask_symbol_path()?),
        Choice::Skip => MissingSymbolDecision::Skip,
        Choice::TextOnly => MissingSymbolDecision::TextOnly,
        Choice::SkipAll => MissingSymbolDecision::SkipAll,
        Choice::TextOnlyAll => MissingSymbolDecision::TextOnlyAll,
    })
}

fn ask_symbol_path() -> Result<PathBuf, InquireError> {
    let raw = Text::new("Path to symbol image:")
        .with_validator(|input: &str| {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                Ok(Validation::Invalid("Enter a path".into()))
            } else if Path::new(trimmed).is_file() {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    format!("File not found: {}", trimmed).into(),
                ))
            }
        })
        .prompt()?;
    Ok(PathBuf::from(raw.trim()))
}

/// Yes/no question. Escape and Ctrl-C count as "no".
pub async fn confirm(message: String, default: bool) -> Result<bool> {
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::new(&message)
            .with_default(default)
            .with_help_message("Press Enter to accept the default")
            .prompt()
    })
    .await
    .context("Confirmation prompt stopped")?;

    match answer {
        Ok(value) => Ok(value),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(e).context("Failed to read confirmation"),
    }
}
