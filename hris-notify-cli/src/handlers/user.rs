//! User handlers.

use anyhow::Result;
use colored::Colorize;
use hris_notify::{HrisClient, UserProfile};
use rust_i18n::t;
use serde::Serialize;

use crate::output::PlainPrint;

/// User profile information.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub department: String,
}

impl From<&UserProfile> for UserInfo {
    fn from(u: &UserProfile) -> Self {
        Self {
            id: u.id.get(),
            name: u.display_name().to_string(),
            role: u.role.clone(),
            department: u.department_name.clone(),
        }
    }
}

impl PlainPrint for UserInfo {
    fn plain_print(&self) {
        println!(
            "{} {}",
            t!("uid_label", id = self.id).to_string().cyan(),
            self.name.bold()
        );
        if !self.role.is_empty() || !self.department.is_empty() {
            println!("   {} | {}", self.role, self.department.dimmed());
        }
    }
}

/// Resolve the signed-in user and record the ID on the client's session.
pub async fn whoami(client: &HrisClient) -> Result<UserInfo> {
    let profile = client.users().resolve_identity().await?;
    Ok(UserInfo::from(&profile))
}
