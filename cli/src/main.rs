//! `refine`: terminal client for the prompt refiner proxy.
//!
//! Keeps the last ten refinements and the last share link in the user's data
//! directory, so `refine copy` and `refine open` work across runs.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use prompt_refiner::diff::render_ansi;
use prompt_refiner::estimate::TokenEstimator;
use prompt_refiner::logging::init_tracing;
use prompt_refiner::session::{
    AddressBar, Clipboard, ClipboardError, FileAddressBar, FileHistoryStore, HistoryStore,
    HttpRefineBackend, MemoryClipboard, SessionDriver, SessionEvent, SessionState, ShareLink,
};
use prompt_refiner::timeout::TimeoutConfig;
use url::Url;

/// Refine rough prompts through a running prompt-refiner server.
#[derive(Parser, Debug)]
#[command(name = "refine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text to refine; read from stdin when omitted
    text: Option<String>,

    /// Base URL of the proxy server
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    server: Url,

    /// Base of generated share links (defaults to the server URL)
    #[arg(long, global = true)]
    link_base: Option<Url>,

    /// Directory for history and the last share link
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show a word diff between input and output
    #[arg(long, global = true)]
    diff: bool,

    /// Do not copy the refined text to the clipboard
    #[arg(long)]
    no_copy: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore a view from a share link
    Open { link: String },

    /// List stored refinements, newest first
    History {
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print the stored entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy the current output again
    Copy,
}

/// System clipboard via arboard.
struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| ClipboardError(err.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| ClipboardError(err.to_string()))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("warn");

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir(),
    };
    let history_store = Arc::new(FileHistoryStore::in_dir(&data_dir));
    let address_bar = Arc::new(FileAddressBar::in_dir(&data_dir));

    let timeouts = TimeoutConfig::default();
    let backend = HttpRefineBackend::new(&cli.server, timeouts.refine_timeout())
        .context("invalid server url")?;
    let clipboard: Arc<dyn Clipboard> = if cli.no_copy {
        Arc::new(MemoryClipboard::default())
    } else {
        Arc::new(SystemClipboard)
    };
    let link_base = cli.link_base.clone().unwrap_or_else(|| cli.server.clone());

    let state = SessionState::new(TokenEstimator::default(), timeouts.copy_ack());
    let mut driver = SessionDriver::new(state, Arc::new(backend), link_base)
        .with_history_store(history_store.clone())
        .with_address_bar(address_bar.clone())
        .with_clipboard(clipboard);

    match cli.command {
        Some(Command::Open { link }) => {
            let link = ShareLink::parse(&link).context("not a valid share link")?;
            if let Err(err) = address_bar.replace(&link) {
                tracing::warn!(error = %err, "failed to record share link");
            }
            driver.load_from(Some(link)).await;
            print_view(&driver, cli.diff);
        }
        Some(Command::Copy) => {
            driver.load().await;
            if driver.state().output().is_empty() {
                bail!("nothing to copy yet");
            }
            driver.dispatch(SessionEvent::CopyRequested).await;
            if driver.state().is_copied() {
                println!("{}", "Copied!".green());
            } else {
                println!("{}", "Clipboard unavailable".yellow());
            }
        }
        Some(Command::History { limit, json }) => {
            print_history(history_store.as_ref(), limit, json)?;
        }
        None => {
            let text = match cli.text {
                Some(text) => text,
                None => read_stdin()?,
            };

            driver.load().await;
            driver.dispatch(SessionEvent::InputChanged(text)).await;
            eprintln!("{}", driver.state().estimate().to_string().dimmed());

            if !driver.state().can_submit() {
                bail!("nothing to refine: input is empty");
            }

            driver.dispatch(SessionEvent::SubmitRequested).await;
            if let Some(message) = driver.state().error() {
                eprintln!("{}", message.red());
                return Ok(ExitCode::FAILURE);
            }

            println!("{}", driver.state().output());
            if let Some((count, cost)) = driver.state().actual_cost() {
                eprintln!(
                    "{}",
                    format!("{} tokens used, ${:.4}", count.total(), cost).dimmed()
                );
            }
            if driver.state().is_copied() && !cli.no_copy {
                eprintln!("{}", "Copied!".green());
            }
            if let Some(link) = address_bar.current() {
                eprintln!("{} {}", "Share:".bold(), link);
            }
            if cli.diff {
                print_diff(&driver);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("prompt-refiner"))
        .unwrap_or_else(|| PathBuf::from(".prompt-refiner"))
}

fn read_stdin() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("{}", "Enter a prompt, then Ctrl-D:".dimmed());
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

fn print_view(driver: &SessionDriver, diff: bool) {
    let state = driver.state();
    println!("{}", "Input".bold());
    println!("{}", state.input());
    eprintln!("{}", state.estimate().to_string().dimmed());
    println!();
    println!("{}", "Output".bold());
    println!("{}", state.output());
    if diff {
        print_diff(driver);
    }
}

fn print_diff(driver: &SessionDriver) {
    match driver.state().diff() {
        Some(segments) => {
            println!();
            println!("{}", "Changes".bold());
            println!("{}", render_ansi(&segments));
        }
        None => eprintln!("{}", "Nothing to compare".dimmed()),
    }
}

fn print_history(store: &dyn HistoryStore, limit: usize, json: bool) -> Result<()> {
    let entries = store.load();
    if json {
        let newest: Vec<_> = entries.iter().rev().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&newest)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("{}", "No history yet".dimmed());
        return Ok(());
    }

    for (index, entry) in entries.iter().rev().take(limit).enumerate() {
        let when = entry
            .refined_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{} {}", format!("#{}", index + 1).cyan().bold(), when.dimmed());
        println!("  {} {}", "in: ".dimmed(), first_line(&entry.input));
        println!("  {} {}", "out:".dimmed(), first_line(&entry.output));
    }
    Ok(())
}

fn first_line(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > 72 {
        let cut: String = line.chars().take(71).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
