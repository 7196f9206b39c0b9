mod config;
mod fetcher;
mod github;
mod report;
mod server;

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use fetcher::SampleFetcher;
use report::{Format, Report};

/// gh-sampler — turns GitHub issue, pull request and commit URLs into
/// text samples for vulnerability-risk classification.
#[derive(Parser, Debug)]
#[command(name = "gh-sampler", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a single URL (e.g., https://github.com/org/repo/issues/42)
    Fetch {
        url: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch many URLs with bounded concurrency
    Batch {
        /// URLs to fetch; combined with --file if both are given
        urls: Vec<String>,

        /// File with one URL per line (blank lines and # comments are skipped)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Serve the fetch endpoints over HTTP
    Serve {
        /// Listen address, overrides [server].listen
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print JSON instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// Optional output file (markdown, or JSON with --json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl OutputArgs {
    fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else {
            Format::Human
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;
    debug!(
        api_base = %config.github.api_base,
        authenticated = config.github.token.is_some(),
        "configuration loaded"
    );

    let client = github::GitHubClient::new(&config.github)?;
    let fetcher = Arc::new(SampleFetcher::new(Arc::new(client), &config));

    match cli.command {
        Command::Fetch { url, output } => {
            let _span = info_span!("fetch", url = %url).entered();
            let sample = fetcher.fetch_one(&url).await?;
            report::output(&Report::Sample(sample), output.format(), output.output.as_deref())?;
        }
        Command::Batch { mut urls, file, output } => {
            if let Some(path) = file {
                urls.extend(read_url_file(&path)?);
            }
            let _span = info_span!("batch", urls = urls.len()).entered();
            let batch = fetcher.fetch_batch(&urls).await?;
            report::output(&Report::Batch(batch), output.format(), output.output.as_deref())?;
        }
        Command::Serve { listen } => {
            let addr = listen.unwrap_or(config.server.listen);
            server::serve(addr, server::AppState::new(fetcher)).await?;
        }
    }

    info!("done");
    Ok(())
}

fn read_url_file(path: &Path) -> std::io::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&contents))
}

fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_list_skips_blanks_and_comments() {
        let contents = "\
# triage queue
https://github.com/o/r/issues/1

  https://github.com/o/r/commit/abc1234
#https://github.com/o/r/pull/2
";
        assert_eq!(
            parse_url_list(contents),
            vec![
                "https://github.com/o/r/issues/1".to_string(),
                "https://github.com/o/r/commit/abc1234".to_string(),
            ]
        );
    }

    #[test]
    fn test_cli_parses_batch_arguments() {
        let cli = Cli::try_parse_from([
            "gh-sampler",
            "batch",
            "https://github.com/o/r/issues/1",
            "--file",
            "urls.txt",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Batch { urls, file, output } => {
                assert_eq!(urls.len(), 1);
                assert_eq!(file, Some(PathBuf::from("urls.txt")));
                assert_eq!(output.format(), Format::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_serve_listen() {
        let cli = Cli::try_parse_from(["gh-sampler", "serve", "--listen", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve { listen } => assert_eq!(listen.map(|a| a.port()), Some(8080)),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
