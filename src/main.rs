use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use prompt_refiner::config::AppConfig;
use prompt_refiner::diff::{diff_words, render_ansi, render_html, render_plain, DiffStats};
use prompt_refiner::logging::init_tracing;
use prompt_refiner::server::{serve, AppState};
use prompt_refiner::{Error, Result};

/// Prompt refinement proxy and offline helpers.
#[derive(Parser, Debug)]
#[command(name = "prompt-refiner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./prompt-refiner.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP proxy
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },

    /// Estimate tokens and cost of refining a text
    Estimate {
        /// Text to estimate; read from stdin when omitted
        text: Option<String>,

        /// Print JSON instead of a summary line
        #[arg(long)]
        json: bool,
    },

    /// Word diff of two files
    Diff {
        original: PathBuf,
        revised: PathBuf,

        #[arg(long, value_enum, default_value_t = DiffFormat::Ansi)]
        format: DiffFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DiffFormat {
    Ansi,
    Html,
    Plain,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = AppState::new(config.build_proxy()?, config.build_estimator());
            tracing::info!(
                model = %config.provider.model,
                base_url = %config.provider.base_url,
                "starting prompt refiner"
            );
            serve(&addr, state).await?;
        }
        Command::Estimate { text, json } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let estimator = config.build_estimator();
            let estimate = estimator.estimate(&text);
            if json {
                println!("{}", json!(estimate));
            } else {
                let qualifier = if estimator.is_exact() { "" } else { " (approximate)" };
                println!("{estimate}{qualifier}");
            }
        }
        Command::Diff {
            original,
            revised,
            format,
        } => {
            let original = read_file(&original)?;
            let revised = read_file(&revised)?;
            let segments = diff_words(&original, &revised);

            match format {
                DiffFormat::Ansi => {
                    println!("{}", render_ansi(&segments));
                    let stats = DiffStats::from_segments(&segments);
                    eprintln!(
                        "{} words added, {} removed, {} unchanged",
                        stats.words_added, stats.words_removed, stats.words_unchanged
                    );
                }
                DiffFormat::Html => println!("{}", render_html(&segments)),
                DiffFormat::Plain => println!("{}", render_plain(&segments)),
                DiffFormat::Json => println!("{}", json!({ "segments": segments })),
            }
        }
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|source| Error::Read {
            path: "<stdin>".to_string(),
            source,
        })?;
    Ok(buffer)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.display().to_string(),
        source,
    })
}
