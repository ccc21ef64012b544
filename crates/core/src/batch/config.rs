//! Options for one batch run.

use std::path::PathBuf;

use crate::config::BatchConfig;
use crate::layout::CanvasSize;

/// How existing labels are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingLabels {
    /// Regenerate and replace.
    #[default]
    Overwrite,
    /// Leave existing labels alone without touching the network.
    Skip,
    /// Regenerate and replace, even when skipping was configured.
    Force,
}

/// What the run does with each code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Full pipeline, labels are written.
    #[default]
    Generate,
    /// Full pipeline in memory, nothing is written.
    DryRun,
    /// Metadata lookup only.
    Validate,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub existing: ExistingLabels,
    pub mode: RunMode,
    /// Number of concurrent workers, at least 1.
    pub parallelism: usize,
    /// Symbol file used for every code instead of the downloaded one.
    pub symbol_override: Option<PathBuf>,
    pub canvas: CanvasSize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            existing: ExistingLabels::default(),
            mode: RunMode::default(),
            parallelism: 1,
            symbol_override: None,
            canvas: CanvasSize::LABEL,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &BatchConfig) -> Self {
        let existing = if config.force {
            ExistingLabels::Force
        } else if config.skip_existing {
            ExistingLabels::Skip
        } else {
            ExistingLabels::Overwrite
        };
        let mode = if config.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Generate
        };

        Self {
            existing,
            mode,
            parallelism: config.parallelism.max(1),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_existing(mut self, existing: ExistingLabels) -> Self {
        self.existing = existing;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn with_symbol_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.symbol_override = Some(path.into());
        self
    }

    /// Whether existing labels short-circuit an item.
    pub fn skips_existing(&self) -> bool {
        self.existing == ExistingLabels::Skip && self.mode != RunMode::Validate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = BatchConfig {
            skip_existing: true,
            parallelism: 4,
            dry_run: true,
            ..BatchConfig::default()
        };
        let options = BatchOptions::from_config(&config);
        assert_eq!(options.existing, ExistingLabels::Skip);
        assert_eq!(options.mode, RunMode::DryRun);
        assert_eq!(options.parallelism, 4);
        assert!(options.skips_existing());
    }

    #[test]
    fn test_force_wins_over_skip() {
        let config = BatchConfig {
            skip_existing: true,
            force: true,
            ..BatchConfig::default()
        };
        let options = BatchOptions::from_config(&config);
        assert_eq!(options.existing, ExistingLabels::Force);
        assert!(!options.skips_existing());
    }

    #[test]
    fn test_validate_never_skips() {
        let options = BatchOptions::default()
            .with_existing(ExistingLabels::Skip)
            .with_mode(RunMode::Validate);
        assert!(!options.skips_existing());
    }

    #[test]
    fn test_parallelism_clamped() {
        assert_eq!(BatchOptions::default().with_parallelism(0).parallelism, 1);
    }
}
