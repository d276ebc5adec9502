//! Account identity model shared by every role.
//!
//! # Purpose
//! Defines the login-facing identity record, the closed role tag, and the
//! partial-update payload accepted by the identity endpoint.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of roles. A person's role is fixed when the identity is
/// created; there is no role-change operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

/// Authenticatable account record. Exactly one exists per person; role
/// profiles reference it by normalized email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Unique key, stored trimmed and lowercased.
    pub email: String,
    pub display_name: String,
    /// Argon2 PHC string. Never serialized in responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    /// Opaque reference into the out-of-scope document storage.
    pub profile_image: Option<String>,
    /// Free-form per-user settings blob.
    #[schema(value_type = Object)]
    pub preferences: serde_json::Value,
}

/// Partial update for the mutable identity fields. Only name, email, image
/// reference, and preferences are patchable here; role and password have
/// their own operations.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IdentityPatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
    #[schema(value_type = Object)]
    pub preferences: Option<serde_json::Value>,
}

/// Canonical form used for every email comparison and store key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
