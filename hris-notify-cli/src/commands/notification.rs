//! Notification commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rust_i18n::t;

use crate::config::{build_authed_client, Overrides};
use crate::handlers::notification::{
    list_notifications, mark_all_read, mark_read, MarkAllReadResult,
};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List notifications, newest first
    #[command(alias = "ls")]
    List {
        /// Only show unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark notification as read
    Read {
        /// Notification ID
        id: String,
    },

    /// Mark all unread notifications as read
    ReadAll,
}

pub async fn handle(
    action: NotificationAction,
    overrides: &Overrides,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    match action {
        NotificationAction::List { unread } => list(overrides, unread, format).await,
        NotificationAction::Read { id } => read(overrides, &id, format).await,
        NotificationAction::ReadAll => read_all(overrides, format, verbose).await,
    }
}

async fn list(overrides: &Overrides, unread_only: bool, format: OutputFormat) -> Result<()> {
    let client = build_authed_client(overrides)?;
    let result = list_notifications(&client, unread_only).await?;

    if matches!(format, OutputFormat::Json) {
        print_json(&result);
        return Ok(());
    }

    print_table(result.notifications, format);

    if matches!(format, OutputFormat::Plain) && result.unread > 0 {
        println!(
            "\n{}",
            t!("total_unread", count = result.unread).to_string().yellow()
        );
    }

    Ok(())
}

async fn read(overrides: &Overrides, id: &str, format: OutputFormat) -> Result<()> {
    let client = build_authed_client(overrides)?;
    let result = mark_read(&client, id).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        _ => println!("{} {}", "✓".green(), t!("marked_read", id = result.id)),
    }

    Ok(())
}

async fn read_all(overrides: &Overrides, format: OutputFormat, verbose: bool) -> Result<()> {
    let client = build_authed_client(overrides)?;
    let result = mark_all_read(&client).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        _ => {
            for line in read_all_summary(&result, verbose) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Lines printed after `read-all`; verbose output lists each ID.
fn read_all_summary(result: &MarkAllReadResult, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if verbose {
        for id in &result.ids {
            lines.push(format!("  {}", t!("marked_read", id = id).to_string().dimmed()));
        }
    }
    lines.push(format!(
        "{} {}",
        "✓".green(),
        t!("marked_all_read", count = result.marked)
    ));
    lines
}
