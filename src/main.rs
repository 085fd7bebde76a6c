//! signal-relay — service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build the LLM provider
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Serve until shutdown

use tokio_util::sync::CancellationToken;
use tracing::info;

use signal_relay::{config, error, llm, logger, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::parse_level(effective_log_level)?;
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bind = %config.service.bind,
        provider = %config.llm.provider,
        model = %config.llm.openai.model,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let provider = llm::providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| error::AppError::Config(e.to_string()))?;

    let state = server::RelayState::from_config(&config, provider);

    // Shared shutdown token — Ctrl-C cancels it, the server watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    print_startup_summary(&config);

    server::run(&config.service.bind, state, shutdown).await
}

fn print_startup_summary(config: &config::Config) {
    let key_status = if config.llm_api_key.is_some() { "set" } else { "not set" };
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║ 📈 signal-relay                                      ║");
    println!("╟──────────────────────────────────────────────────────╢");
    println!("║ 🌐 bind:     {:<40}║", config.service.bind);
    println!("║ 🧠 llm:      {:<40}║", format!("{} ({})", config.llm.provider, config.llm.openai.model));
    println!("║ 🔑 api key:  {:<40}║", key_status);
    println!("║ 📄 prompts:  {:<40}║", config.service.prompts_dir.display().to_string());
    println!("╚══════════════════════════════════════════════════════╝");
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: signal-relay [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug  (prompt layer resolution, request/response sizes)
    //   -vvvv+  → trace  (full payload dumps, very verbose)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
