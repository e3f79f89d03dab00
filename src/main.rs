//! Voice Sheet - Main Entry Point
//!
//! Supports two modes:
//! - serve: the conversion API server (default)
//! - cli: an interactive capture console that talks to a running server

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voice_sheet::business::{CaptureError, PlatformServices};
use voice_sheet::data::API_KEY_ENV;
use voice_sheet::server::{start_api_server, AppState};
use voice_sheet::{AppConfig, Converter, GeminiClient, HttpSheetClient, Language, VoiceController};

#[derive(Parser)]
#[command(name = "voice-sheet", version, about = "Turn instructions into Excel sheets")]
struct Cli {
    /// Config file (defaults to config.toml next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the conversion API server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Interactive capture console
    Cli {
        /// Base URL of the conversion server
        #[arg(long)]
        server: Option<String>,
        /// Instruction language (en or ur)
        #[arg(long)]
        language: Option<Language>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load_or_default()?,
    };

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => run_server(config, host, port).await,
        Command::Cli { server, language } => run_cli_mode(config, server, language).await,
    }
}

/// Run the API server
async fn run_server(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    init_logging(false);

    info!("Starting Voice Sheet v{} (server)", env!("CARGO_PKG_VERSION"));

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let api_key = AppConfig::api_key();
    if api_key.is_none() {
        warn!("{} is not set; conversions will fail until it is", API_KEY_ENV);
    }

    let model = Arc::new(GeminiClient::new(&config.llm, api_key)?);
    info!(
        "Model {} via {}, extraction {}",
        config.llm.model,
        config.llm.endpoint,
        config.extraction.mode.as_str()
    );

    let state = Arc::new(AppState {
        converter: Converter::new(model, config.extraction.clone(), config.workbook.clone()),
    });

    start_api_server(&config.server, state).await?;

    info!("Server exited");
    Ok(())
}

/// Run the interactive capture console
async fn run_cli_mode(
    config: AppConfig,
    server: Option<String>,
    language: Option<Language>,
) -> Result<()> {
    init_logging(true);

    let server_url = server.unwrap_or_else(|| config.client.server_url.clone());
    let language = language.unwrap_or(config.general.language);

    println!("╔═══════════════════════════════════════════════╗");
    println!("║     Voice Sheet - capture console v{:<10} ║", env!("CARGO_PKG_VERSION"));
    println!("╚═══════════════════════════════════════════════╝");
    println!("  Server:    {}", server_url);
    println!("  Language:  {}", language);
    println!("  Downloads: {}", config.client.download_dir.display());
    println!();

    let api = Arc::new(HttpSheetClient::new(
        &server_url,
        Duration::from_secs(config.llm.timeout_secs + 30),
    )?);
    let services = PlatformServices::detect(&config.client.download_dir);
    let mut controller = VoiceController::new(api, services, language, &config.workbook.file_name);
    controller.set_on_transcript(|text| println!("📝 {}", text));
    let controller = Arc::new(controller);

    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b">>> ").await?;
        stdout.flush().await?;

        let Some(input) = lines.next_line().await? else {
            break;
        };
        let input = input.trim();
        let (cmd, arg) = input
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((input, ""));

        match cmd.to_lowercase().as_str() {
            "t" | "type" => {
                controller.set_instruction(arg);
                println!("✏️  Instruction set");
            }
            "p" | "print" => {
                println!("📄 {}", controller.instruction());
            }
            "s" | "start" => match controller.start_listening() {
                Ok(()) => println!("🎙️  Listening... (e to stop)"),
                Err(CaptureError::Unsupported) => {}
                Err(e) => error!("Failed to start listening: {}", e),
            },
            "e" | "end" | "stop" => {
                controller.stop_listening();
                println!("🛑 Stopped listening");
            }
            "g" | "generate" => {
                println!("⏳ Generating...");
                match controller.generate().await {
                    Ok(path) => println!("⬇️  Saved {}", path.display()),
                    Err(e) => error!("Generation failed: {}", e),
                }
            }
            "l" | "lang" | "language" => match arg.parse::<Language>() {
                Ok(language) => {
                    controller.set_language(language);
                    println!("🌐 Language: {}", language);
                }
                Err(e) => println!("❓ {}", e),
            },
            "h" | "help" => print_help(),
            "q" | "quit" | "exit" => {
                info!("User requested exit");
                break;
            }
            "" => {}
            other => {
                println!("❓ Unknown command: {}", other);
                print_help();
            }
        }
    }

    controller.stop_listening();
    println!("Bye");
    Ok(())
}

fn print_help() {
    println!("════════════════════════════════════════════════");
    println!("  t <text>   type an instruction");
    println!("  p          print the current instruction");
    println!("  s          start listening");
    println!("  e          stop listening");
    println!("  g          generate and download the sheet");
    println!("  l <en|ur>  switch language");
    println!("  q          quit");
    println!("════════════════════════════════════════════════");
}

fn init_logging(debug: bool) {
    let level = if debug {
        "voice_sheet=debug"
    } else {
        "voice_sheet=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
