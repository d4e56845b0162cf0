use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Editor,
    Staff,
    Admin,
    EnterpriseAdmin,
}

impl Role {
    /// Roles that receive workflow notifications about every change.
    pub const NOTIFIED: [Role; 3] = [Role::Admin, Role::Staff, Role::EnterpriseAdmin];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Editor => "editor",
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::EnterpriseAdmin => "enterprise_admin",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "user" => Ok(Role::User),
            "editor" => Ok(Role::Editor),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "enterprise_admin" => Ok(Role::EnterpriseAdmin),
            _ => Err(CoreError::Validation(format!("unknown role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
}
