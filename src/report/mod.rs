pub mod types;

pub use types::{Format, Report};

use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::fetcher::BatchResult;
use crate::github::FetchResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output the report to the terminal (default) or to a file.
///
/// - Human + no path: colored text on stdout
/// - Human + path: markdown file
/// - Json: pretty JSON on stdout or in the file
#[instrument(skip(report))]
pub fn output(report: &Report, format: Format, output_path: Option<&Path>) -> Result<(), ReportError> {
    match (format, output_path) {
        (Format::Human, None) => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        (Format::Human, Some(path)) => {
            debug!(path = %path.display(), "writing markdown report");
            std::fs::write(path, render_markdown(report))?;
            Ok(())
        }
        (Format::Json, None) => {
            println!("{}", serde_json::to_string_pretty(report)?);
            Ok(())
        }
        (Format::Json, Some(path)) => {
            debug!(path = %path.display(), "writing JSON report");
            std::fs::write(path, serde_json::to_string_pretty(report)?)?;
            Ok(())
        }
    }
}

fn print_terminal_report(report: &Report) {
    match report {
        Report::Sample(sample) => print_sample(sample),
        Report::Batch(batch) => print_batch(batch),
    }
}

/// sample_id (kind) [truncated]
/// ───
/// text_description
fn print_sample(sample: &FetchResult) {
    println!();
    let truncated = if sample.meta.truncated {
        " [truncated]".yellow().to_string()
    } else {
        String::new()
    };
    println!(
        "{} ({}){}",
        sample.sample_id.bold(),
        sample.source_type,
        truncated
    );
    println!("{}", "───".dimmed());
    println!("{}", sample.text_description);
    println!();
}

fn print_batch(batch: &BatchResult) {
    println!();
    for entry in &batch.results {
        match (&entry.data, &entry.error) {
            (Some(data), _) => println!("  {} {} → {}", "✓".green().bold(), entry.url, data.sample_id),
            (None, error) => println!(
                "  {} {}: {}",
                "✗".red().bold(),
                entry.url,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    println!();
    let summary = format!(
        "═══ {} fetched, {} failed, {} total ═══",
        batch.success_count, batch.failure_count, batch.total_count
    );
    if batch.failure_count == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
    println!();
}

fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    match report {
        Report::Sample(sample) => push_sample_markdown(&mut md, sample, "#"),
        Report::Batch(batch) => {
            md.push_str("# GitHub batch fetch\n\n");
            md.push_str(&format!(
                "**Fetched:** {} | **Failed:** {} | **Total:** {}\n\n",
                batch.success_count, batch.failure_count, batch.total_count
            ));
            let failures: Vec<_> = batch.results.iter().filter(|e| !e.success).collect();
            if !failures.is_empty() {
                md.push_str("## Failures\n\n");
                for entry in failures {
                    md.push_str(&format!(
                        "- `{}`: {}\n",
                        entry.url,
                        entry.error.as_deref().unwrap_or("unknown error")
                    ));
                }
                md.push('\n');
            }
            for data in batch.results.iter().filter_map(|e| e.data.as_ref()) {
                push_sample_markdown(&mut md, data, "##");
            }
        }
    }
    md
}

fn push_sample_markdown(md: &mut String, sample: &FetchResult, heading: &str) {
    md.push_str(&format!("{} {} ({})\n\n", heading, sample.sample_id, sample.source_type));
    if sample.meta.truncated {
        md.push_str("_Text truncated._\n\n");
    }
    md.push_str("```text\n");
    md.push_str(&sample.text_description);
    md.push_str("\n```\n\n");
}
