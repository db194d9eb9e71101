use serde::{Deserialize, Serialize};
use std::fmt;

/// The role column of an account. Unknown roles are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Teacher,
    Other(String),
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "teacher" => Role::Teacher,
            _ => Role::Other(value.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Teacher => write!(f, "teacher"),
            Role::Other(role) => write!(f, "{}", role),
        }
    }
}

/// An authenticated account. Fetched once at login and owned by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub login: String,
    pub display_name: String,
    pub role: Role,
}
