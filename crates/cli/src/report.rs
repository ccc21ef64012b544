//! Human-readable run reports printed to stdout.

use std::fmt::Write;
use std::time::Duration;

use console::style;

use setlabel_core::{BatchSummary, FailureKind, LabelStatus, RunMode, SetSummary};

/// How many sets `--list-recent` shows.
pub const RECENT_SETS_LIMIT: usize = 25;

const NAME_COLUMN: usize = 35;

/// `12.3s`, `4m 5s` or `1h 2m`.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

pub fn summary_report(summary: &BatchSummary, mode: RunMode) -> String {
    let mut out = String::new();
    let elapsed = format_duration(Duration::from_millis(summary.elapsed_ms));
    let created_label = if mode == RunMode::DryRun {
        "would be created"
    } else {
        "created"
    };

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {} {}, {} skipped, {} failed ({} total) in {}",
        style("Summary:").bold(),
        summary.created_count,
        created_label,
        summary.skipped_count,
        summary.failed_count,
        summary.total_count,
        elapsed
    );

    if let Some(rate) = summary.success_rate() {
        let rate_text = format!("{:.1}% success rate", rate);
        let styled = if summary.failed_count == 0 {
            style(rate_text).green()
        } else {
            style(rate_text).yellow()
        };
        let _ = writeln!(out, "{}", styled);
    }

    if summary.skipped_count > 0 {
        let _ = writeln!(out, "Skipped {} label(s)", summary.skipped_count);
    }

    if !summary.failures.is_empty() {
        let _ = writeln!(out, "\n{}", style("Failed:").red().bold());
        for (code, reason) in &summary.failures {
            let _ = writeln!(out, "  {} {}: {}", style("✗").red(), code, reason);
        }
    }

    out
}

/// Valid, invalid and errored codes of a `--validate` run.
pub fn validation_report(summary: &BatchSummary) -> String {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    let mut errors = Vec::new();

    for result in &summary.results {
        match (&result.status, &result.error) {
            (LabelStatus::Created, _) => valid.push(match &result.set_name {
                Some(name) => format!("{} - {}", result.code, name),
                None => result.code.clone(),
            }),
            (LabelStatus::Failed, Some(failure))
                if matches!(failure.kind, FailureKind::NotFound | FailureKind::InvalidCode) =>
            {
                invalid.push(result.code.clone())
            }
            (LabelStatus::Failed, failure) => errors.push(format!(
                "{}: {}",
                result.code,
                failure.as_ref().map(|f| f.message.as_str()).unwrap_or("")
            )),
            (LabelStatus::Skipped, _) => {}
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n{}", style("Validation Results:").bold());
    let _ = writeln!(out, "Valid sets: {}", valid.len());
    let _ = writeln!(out, "Invalid sets: {}", invalid.len());
    let _ = writeln!(out, "Errors: {}", errors.len());

    let sections = [
        (style("✓ Valid Sets:").green(), &valid),
        (style("✗ Invalid Sets:").red(), &invalid),
        (style("⚠ Errors:").yellow(), &errors),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{}", title);
        for item in items {
            let _ = writeln!(out, "  {}", item);
        }
    }

    out
}

pub fn recent_sets_report(sets: &[SetSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("Recent Magic: The Gathering sets:").bold());
    let _ = writeln!(out, "{}", "=".repeat(50));

    if sets.is_empty() {
        let _ = writeln!(out, "No released sets found.");
        return out;
    }

    for set in sets {
        let _ = writeln!(
            out,
            "{} | {:width$} | {} | {}",
            style(format!("{:6}", set.code)).cyan(),
            truncate(&set.name, NAME_COLUMN),
            set.released_at.format("%Y-%m-%d"),
            set.set_type,
            width = NAME_COLUMN
        );
    }

    let _ = writeln!(out, "\nUse any of these codes with the tool, e.g.:");
    for set in sets.iter().take(3) {
        let _ = writeln!(out, "  setlabel {}", set.code);
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
