//! User profiles
//!
//! Every person in the system has one profile row carrying a role.
//! Role decides which dashboard a profile sees and which operations the
//! API lets it perform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Role of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Receptionist,
    Technician,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Receptionist => "receptionist",
            Role::Technician => "technician",
            Role::Client => "client",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "admin" => Ok(Role::Admin),
            "receptionist" => Ok(Role::Receptionist),
            "technician" => Ok(Role::Technician),
            "client" => Ok(Role::Client),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }

    /// Staff roles can see internal screens; clients only see their own orders
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Client)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A profile row as read from the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Stamped by `POST /profiles/:id/login`; absent until first sign-in
    pub last_login_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Receptionist, Role::Technician, Role::Client] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("manager").is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Receptionist.is_staff());
        assert!(Role::Technician.is_staff());
        assert!(!Role::Client.is_staff());
    }
}
