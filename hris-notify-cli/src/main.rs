//! HRIS notification CLI.

mod commands;
mod config;
mod handlers;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{notification, watch};
use config::Overrides;
use output::{print_json, OutputFormat, PlainPrint};
use rust_i18n::t;

rust_i18n::i18n!("src/locales", fallback = "en");

/// HRIS notification CLI
#[derive(Parser)]
#[command(name = "hris-notify")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Language for output (en, id)
    #[arg(short, long, global = true, default_value = "en")]
    lang: String,

    /// API base URL
    #[arg(long, global = true, env = "HRIS_API_URL")]
    base_url: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "HRIS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage authentication
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Notification operations
    #[command(alias = "n")]
    Notification {
        #[command(subcommand)]
        action: notification::NotificationAction,
    },

    /// Stream live notifications until Ctrl-C
    #[command(alias = "w")]
    Watch,

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Save a token after checking it against the backend
    Login {
        /// Access token
        #[arg(value_name = "TOKEN")]
        access_token: String,
    },
    /// Logout
    Logout,
    /// Show current auth status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    rust_i18n::set_locale(&cli.lang);

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = cli
        .command
        .ok_or_else(|| anyhow::anyhow!("{}", t!("no_command")))?;

    let overrides = Overrides {
        base_url: cli.base_url,
        token: cli.token,
    };

    match command {
        Commands::Auth { action } => handle_auth(action, &overrides, cli.format).await,
        Commands::Notification { action } => {
            notification::handle(action, &overrides, cli.format, cli.verbose).await
        }
        Commands::Watch => watch::handle(&overrides, cli.format, cli.verbose).await,
        Commands::Config => {
            let cfg = config::load_config()?;
            println!(
                "{}",
                t!("config_file", path = config::config_path()?.display())
            );
            let base_url = overrides
                .base_url
                .or(cfg.base_url.clone())
                .unwrap_or_else(|| hris_notify::DEFAULT_BASE_URL.to_string());
            println!("{}", t!("base_url", url = base_url));
            println!("{}", t!("authenticated", status = cfg.token.is_some()));

            let realtime = cfg.realtime();
            println!(
                "{}",
                t!(
                    "reconnect_interval",
                    ms = realtime.reconnect_interval.as_millis()
                )
            );
            match realtime.resync_interval {
                Some(every) => println!("{}", t!("resync_interval", secs = every.as_secs())),
                None => println!("{}", t!("resync_disabled")),
            }
            Ok(())
        }
    }
}

async fn handle_auth(action: AuthAction, overrides: &Overrides, format: OutputFormat) -> Result<()> {
    match action {
        AuthAction::Login { access_token } => {
            let candidate = Overrides {
                base_url: overrides.base_url.clone(),
                token: Some(access_token.clone()),
            };
            let client = config::build_client(&candidate)?;
            let user = handlers::user::whoami(&client)
                .await
                .context("Token was rejected by the backend")?;

            let mut cfg = config::load_config()?;
            cfg.token = Some(access_token);
            if overrides.base_url.is_some() {
                cfg.base_url = overrides.base_url.clone();
            }
            config::save_config(&cfg)?;

            println!("{} {}", "✓".green(), t!("logged_in_as", name = &user.name));
            Ok(())
        }
        AuthAction::Logout => {
            let mut cfg = config::load_config()?;
            cfg.token = None;
            config::save_config(&cfg)?;
            println!("{}", t!("logged_out"));
            Ok(())
        }
        AuthAction::Status => {
            let client = config::build_client(overrides)?;
            if !client.is_authenticated() {
                println!("{}", t!("not_logged_in"));
                return Ok(());
            }

            match handlers::user::whoami(&client).await {
                Ok(user) => match format {
                    OutputFormat::Json => print_json(&user),
                    _ => user.plain_print(),
                },
                Err(e) => {
                    tracing::debug!("identity lookup failed: {:#}", e);
                    println!("{}", t!("token_rejected").to_string().red());
                }
            }
            Ok(())
        }
    }
}
