use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use renderdeck::config::{self, Config};
use renderdeck::jobs::{self, JobForm};
use renderdeck::server::{self, ReceiverState, RequestOutbox};
use renderdeck::tui::{self, app::App};

#[derive(Parser)]
#[command(name = "renderdeck", version, about = "htop for render farm agents")]
struct Cli {
    /// Run the event receiver without the terminal UI
    #[arg(short = 'H', long)]
    headless: bool,

    /// Address to receive director events on (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build a render job from a form JSON file and print it
    Job { form: PathBuf },
    /// Write the default config file
    InitConfig,
}

fn init_tracing(to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "renderdeck=info".into()),
    );

    // In TUI mode: log to file to avoid interference
    if to_file {
        let log_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("renderdeck");
        std::fs::create_dir_all(&log_dir)?;
        let log_file = std::fs::File::create(log_dir.join("renderdeck.log"))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(log_file).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let tui_mode = !cli.headless && cli.command.is_none();
    init_tracing(tui_mode)?;

    let config_path = cli.config.clone().or_else(config::config_path);

    if let Some(command) = cli.command {
        return match command {
            Command::Job { form } => print_job(&form),
            Command::InitConfig => {
                let path = config_path.context("Could not determine config directory")?;
                config::write_to(&path, &Config::default())?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        };
    }

    let mut config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let outbox = RequestOutbox::new();
    let state = ReceiverState {
        events: tx,
        outbox: outbox.clone(),
    };

    if cli.headless {
        tracing::info!("Running in headless mode (no TUI)");
        tracing::info!("Press Ctrl+C to stop");

        let listen_addr = config.listen_addr.clone();
        tokio::select! {
            res = server::start_receiver(&listen_addr, state) => res?,
            _ = run_headless(&config, outbox, rx) => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
        }
    } else {
        // Bind first so a taken port fails before raw mode
        let listener = server::bind_receiver(&config.listen_addr).await?;
        tokio::spawn(async move {
            if let Err(e) = server::serve_receiver(listener, state).await {
                tracing::error!("Director receiver error: {:#}", e);
            }
        });

        // Run TUI (this blocks until quit)
        tui::run(&config, outbox, rx).await?;
    }

    Ok(())
}

// Same reconciliation as the TUI, surfaced through tracing only
async fn run_headless(
    config: &Config,
    outbox: RequestOutbox,
    mut rx: mpsc::UnboundedReceiver<renderdeck::events::DirectorEvent>,
) {
    let mut app = App::new(outbox, config);
    while let Some(event) = rx.recv().await {
        app.apply(event);
        tracing::debug!(
            "{} agents, {} queued jobs",
            app.registry.len(),
            app.queue.len()
        );
    }
}

fn print_job(form_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(form_path)
        .with_context(|| format!("Failed to read job form {:?}", form_path))?;
    let form: JobForm = serde_json::from_str(&content)
        .with_context(|| format!("Job form {:?} is not valid JSON", form_path))?;
    let job = jobs::create_job(&form, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}
