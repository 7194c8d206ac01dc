mod commands;
mod events;
mod helper;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use phraser_core::domain::settings::{PhraserSettings, RewriterChoice};
use phraser_core::domain::types::{OrderingPolicy, Tone};
use phraser_core::infra::output::OutputRouter;
use phraser_core::infra::rewriter::{HttpParaphraser, NoopRewriter, Rewriter};
use phraser_core::usecase::{PhraserService, RewriteOutcome};

use crate::commands::{dispatch, parse_command, Flow};
use crate::helper::CliHelper;

#[derive(Parser)]
#[command(name = "phraser")]
#[command(about = "Paraphrase text in a chosen tone", long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rewrite service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Starting tone (name or tab index)
    #[arg(long)]
    tone: Option<Tone>,

    /// How overlapping responses are applied
    #[arg(long, value_enum)]
    ordering: Option<OrderingArg>,

    /// Echo text back instead of calling the service
    #[arg(long)]
    offline: bool,

    /// Paraphrase TEXT once, print the result and exit
    #[arg(long, value_name = "TEXT")]
    once: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderingArg {
    Arrival,
    Issue,
}

impl From<OrderingArg> for OrderingPolicy {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Arrival => OrderingPolicy::ArrivalOrder,
            OrderingArg::Issue => OrderingPolicy::IssueOrder,
        }
    }
}

fn resolve_settings(cli: &Cli) -> Result<PhraserSettings> {
    let mut settings =
        PhraserSettings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(url) = &cli.base_url {
        settings.base_url = url.clone();
    }
    if let Some(tone) = cli.tone {
        settings.default_tone = tone;
    }
    if let Some(ordering) = cli.ordering {
        settings.ordering = ordering.into();
    }
    if cli.offline {
        settings.rewriter = RewriterChoice::Noop;
    }
    Ok(settings)
}

/// リライターを構築する（設定に応じて HTTP / Noop）
fn create_rewriter(settings: &PhraserSettings) -> Result<Arc<dyn Rewriter>> {
    match settings.rewriter {
        RewriterChoice::Http => {
            let rewriter = HttpParaphraser::from_settings(settings)?;
            log::info!("HTTP rewriter selected: {}", rewriter.endpoint());
            Ok(Arc::new(rewriter))
        }
        RewriterChoice::Noop => {
            log::info!("Using Noop rewriter");
            Ok(Arc::new(NoopRewriter))
        }
    }
}

async fn run_once(service: &PhraserService, text: &str) -> Result<()> {
    match service.on_paste_and_wait(text).await? {
        RewriteOutcome::Applied(result) | RewriteOutcome::Discarded(result) => {
            println!("{result}");
        }
        RewriteOutcome::Skipped => anyhow::bail!("nothing to paraphrase"),
    }
    Ok(())
}

async fn run_repl(service: &PhraserService) -> Result<()> {
    let renderer = events::spawn_renderer(service.subscribe());

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Phraser ===".bright_magenta().bold());
    println!(
        "{}",
        "Type text to set the input, '/paste <text>' to paraphrase, '/help' for more, 'quit' to exit."
            .bright_black()
    );
    println!(
        "{} {}",
        "tone:".bright_black(),
        service.snapshot().tone.to_string().cyan()
    );

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_command(&line) {
                    Ok(command) => {
                        if let Flow::Quit = dispatch(service, command) {
                            println!("{}", "Goodbye!".bright_green());
                            break;
                        }
                    }
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    renderer.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    let rewriter = create_rewriter(&settings)?;
    let service = PhraserService::new(&settings, rewriter, OutputRouter::new());

    match cli.once.as_deref() {
        Some(text) => run_once(&service, text).await,
        None => run_repl(&service).await,
    }
}
