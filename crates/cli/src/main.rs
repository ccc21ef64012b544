mod args;
mod logging;
mod progress;
mod prompt;
mod report;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use setlabel_core::{
    load_config, load_config_from_env, validate_config, BatchInput, BatchObserver, BatchOptions,
    BatchOrchestrator, Config, DirectorySink, FixedDecision, MissingSymbolPrompt, RunMode,
    ScryfallClient, SetCatalog,
};

use args::Cli;
use logging::Verbosity;
use progress::ProgressDisplay;
use prompt::TerminalPrompt;

/// Batches larger than this ask before enabling missing-symbol prompts.
const PROMPT_BATCH_THRESHOLD: usize = 5;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.verbosity());

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_settings(&cli)?;
    let catalog = ScryfallClient::from_config(&config).context("Failed to create HTTP client")?;

    if cli.list_recent {
        let sets = catalog
            .recent_sets(report::RECENT_SETS_LIMIT)
            .await
            .context("Unable to fetch recent sets. Please check your internet connection")?;
        print!("{}", report::recent_sets_report(&sets));
        return Ok(0);
    }

    let Some(raw_input) = cli.input.as_deref() else {
        if cli.validate {
            bail!("--validate requires an input file or set code");
        }
        bail!("Input is required. Use --help for usage information.");
    };

    let input = BatchInput::classify(raw_input);
    let codes = input.codes().await?;
    if codes.is_empty() {
        warn!("No set codes found in {}", raw_input);
        return Ok(0);
    }

    let mode = if cli.validate {
        RunMode::Validate
    } else if config.batch.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Generate
    };
    let mut options = BatchOptions::from_config(&config.batch).with_mode(mode);
    if let Some(path) = &cli.symbol {
        options = options.with_symbol_override(path.clone());
    }

    let interactive = std::io::stdin().is_terminal();
    if options.parallelism > 1 && mode != RunMode::Validate && interactive && !cli.yes {
        let question = format!(
            "Process {} sets in parallel? This may hit API rate limits",
            options.parallelism
        );
        if !prompt::confirm(question, true).await? {
            info!("Operation cancelled by user");
            return Ok(0);
        }
    }

    let progress = Arc::new(
        if codes.len() > 1 && cli.verbosity() == Verbosity::Normal {
            ProgressDisplay::new(codes.len() as u64)
        } else {
            ProgressDisplay::hidden()
        },
    );

    let prompt = missing_symbol_prompt(&cli, &options, codes.len(), interactive, &progress).await?;

    let sink = DirectorySink::new(config.batch.output_dir.clone());
    let orchestrator = BatchOrchestrator::new(Arc::new(catalog), Arc::new(sink), prompt, options)
        .with_observer(Arc::clone(&progress) as Arc<dyn BatchObserver>);

    let summary = orchestrator.run(codes).await;
    progress.finish();

    if mode == RunMode::Validate {
        print!("{}", report::validation_report(&summary));
    } else if cli.verbosity() == Verbosity::Quiet {
        for (code, reason) in &summary.failures {
            error!("{}: {}", code, reason);
        }
    } else {
        print!("{}", report::summary_report(&summary, mode));
    }

    Ok(summary.exit_code())
}

/// Defaults, then the config file, then `SETLABEL_*` variables, then flags.
fn load_settings(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load configuration")?,
    };

    cli.apply_to(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Who answers when a set has no symbol.
///
/// Dry runs, validation, parallel runs, `--no-prompt` and runs without a
/// terminal never ask and fall back to text-only labels.
async fn missing_symbol_prompt(
    cli: &Cli,
    options: &BatchOptions,
    total: usize,
    interactive: bool,
    progress: &ProgressDisplay,
) -> Result<Arc<dyn MissingSymbolPrompt>> {
    let non_interactive: Arc<dyn MissingSymbolPrompt> = Arc::new(FixedDecision::text_only());

    if cli.no_prompt || !interactive || options.mode != RunMode::Generate || options.parallelism > 1
    {
        return Ok(non_interactive);
    }

    if total > PROMPT_BATCH_THRESHOLD {
        if cli.yes {
            return Ok(non_interactive);
        }
        let question = format!(
            "Ask what to do when one of these {} sets has no symbol?",
            total
        );
        if !prompt::confirm(question, false).await? {
            info!("Sets without a symbol will get text-only labels");
            return Ok(non_interactive);
        }
    }

    Ok(Arc::new(
        TerminalPrompt::new(total > 1).with_progress(progress.bar()),
    ))
}
