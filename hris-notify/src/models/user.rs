//! User models.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Profile of the signed-in employee, as returned by `GET /users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Role, e.g. `EMPLOYEE` or `SUPERADMIN`.
    #[serde(default)]
    pub role: String,
    /// Full display name.
    #[serde(default)]
    pub full_name: String,
    /// Employee number.
    #[serde(default)]
    pub nik: String,
    /// Department name.
    #[serde(default)]
    pub department_name: String,
}

impl UserProfile {
    /// Name to show in greetings and headers.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }

    /// Whether the user administers the company.
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("SUPERADMIN")
    }
}
