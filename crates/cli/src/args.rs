//! CLI definitions using clap derive API

use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use setlabel_core::Config;

use crate::logging::Verbosity;

/// Generate printable labels for Magic: The Gathering card sets.
#[derive(Parser, Debug)]
#[command(
    name = "setlabel",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Generate printable labels for Magic: The Gathering card sets",
    after_help = "Examples:\n    \
                  setlabel AFR                     Label for Adventures in the Forgotten Realms\n    \
                  setlabel sets.txt                Every set code listed in sets.txt\n    \
                  setlabel sets.txt --skip         Keep labels that already exist\n    \
                  setlabel AFR -s custom.png       Use a custom symbol\n    \
                  setlabel sets.txt --dry-run      Preview without writing files\n    \
                  setlabel sets.txt -p 4 -y        Four sets at a time, no confirmation\n    \
                  setlabel --list-recent           Show recent sets and their codes\n    \
                  setlabel --validate sets.txt     Check set codes without generating labels"
)]
pub struct Cli {
    /// A set code (e.g. AFR) or a .txt file with one set code per line
    pub input: Option<String>,

    /// Symbol image used instead of the downloaded one
    #[arg(long, short = 's', value_name = "PATH")]
    pub symbol: Option<PathBuf>,

    /// Skip labels that already exist
    #[arg(long, conflicts_with = "force")]
    pub skip: bool,

    /// Overwrite existing labels (opposite of --skip)
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Show what would be generated without creating files
    #[arg(long)]
    pub dry_run: bool,

    /// Show detailed output, including retries and symbol decisions
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Directory labels are written to [default: ./labels]
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Process N sets in parallel
    #[arg(long, short = 'p', value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub parallel: Option<u16>,

    /// List recent sets with their codes
    #[arg(long)]
    pub list_recent: bool,

    /// Check set codes without generating labels
    #[arg(long)]
    pub validate: bool,

    /// Configuration file
    #[arg(long, short = 'c', value_name = "FILE", env = "SETLABEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Answer yes to confirmation questions
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Never ask about missing symbols; create text-only labels instead
    #[arg(long)]
    pub no_prompt: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Apply flags on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.batch.output_dir = dir.clone();
        }
        if let Some(parallel) = self.parallel {
            config.batch.parallelism = usize::from(parallel);
        }
        if self.skip {
            config.batch.skip_existing = true;
            config.batch.force = false;
        }
        if self.force {
            config.batch.force = true;
            config.batch.skip_existing = false;
        }
        if self.dry_run {
            config.batch.dry_run = true;
        }
    }
}
