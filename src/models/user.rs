//! User accounts and roles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Platform roles. The set is closed; guard sites match it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Places and tracks orders
    Buyer,
    /// Manages own products and approves orders
    Manager,
    /// Manages users and sees every product and order
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn all() -> [Role; 3] {
        [Role::Buyer, Role::Manager, Role::Admin]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Account standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_feedback: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl User {
    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }
}

/// Status change sent by an admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusUpdate {
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend_feedback: Option<String>,
}

impl UserStatusUpdate {
    pub fn suspend(reason: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            status: UserStatus::Suspended,
            suspend_reason: Some(reason.into()),
            suspend_feedback: Some(feedback.into()),
        }
    }

    pub fn activate() -> Self {
        Self {
            status: UserStatus::Active,
            suspend_reason: None,
            suspend_feedback: None,
        }
    }
}

/// Query parameters for the admin user list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        if let Some(role) = self.role {
            pairs.push(("role", role.to_string()));
        }
        pairs
    }

    pub fn key_params(&self) -> Vec<String> {
        vec![
            self.search.clone().unwrap_or_default(),
            self.role.map(|r| r.to_string()).unwrap_or_default(),
        ]
    }
}
