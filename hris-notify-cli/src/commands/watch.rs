//! Live notification stream.

use anyhow::{Context, Result};
use colored::Colorize;
use hris_notify::{ConnectionState, Notifier};
use rust_i18n::t;
use tokio::sync::broadcast::error::RecvError;

use crate::config::{build_authed_client, load_config, Overrides};
use crate::handlers::notification::AlertInfo;
use crate::handlers::user::UserInfo;
use crate::output::{print_json, OutputFormat, PlainPrint};

/// Connect and print alerts until interrupted.
pub async fn handle(overrides: &Overrides, format: OutputFormat, verbose: bool) -> Result<()> {
    let client = build_authed_client(overrides)?;
    let realtime = load_config()?.realtime();

    let notifier = client.notifier().config(realtime).build();
    let mut alerts = notifier.subscribe_alerts();
    let mut states = notifier.subscribe_state();
    notifier.start();

    let profile = client
        .users()
        .resolve_identity()
        .await
        .context("Failed to resolve the signed-in user")?;
    if !matches!(format, OutputFormat::Json) {
        println!(
            "{}",
            t!("watching", name = UserInfo::from(&profile).name).to_string().bold()
        );
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res.context("Failed to listen for Ctrl-C")?;
                break;
            }
            alert = alerts.recv() => match alert {
                Ok(alert) => {
                    let info = AlertInfo::from(&alert);
                    match format {
                        OutputFormat::Json => print_json(&info),
                        _ => info.plain_print(),
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("skipped {} alerts", n);
                }
                Err(RecvError::Closed) => break,
            },
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                report_state(&notifier, state, format, verbose);
            }
        }
    }

    notifier.stop().await;
    tracing::info!("stopped");
    Ok(())
}

fn report_state(notifier: &Notifier, state: ConnectionState, format: OutputFormat, verbose: bool) {
    if matches!(format, OutputFormat::Json) {
        return;
    }

    match state {
        ConnectionState::Connected => println!(
            "{} {}",
            t!("connected").to_string().green(),
            t!("unread_count", count = notifier.unread_count()).to_string().dimmed()
        ),
        ConnectionState::Disconnected => {
            println!("{}", t!("disconnected").to_string().yellow())
        }
        ConnectionState::Connecting if verbose => {
            println!("{}", t!("connecting").to_string().dimmed())
        }
        _ => {}
    }
}
