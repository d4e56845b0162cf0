use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{ChangeRequestId, NotificationId, UserId};
use crate::types::Impact;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Ticket,
    Change,
    Knowledge,
    Solution,
    System,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Ticket => "ticket",
            NotificationKind::Change => "change",
            NotificationKind::Knowledge => "knowledge",
            NotificationKind::Solution => "solution",
            NotificationKind::System => "system",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NotificationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ticket" => Ok(NotificationKind::Ticket),
            "change" => Ok(NotificationKind::Change),
            "knowledge" => Ok(NotificationKind::Knowledge),
            "solution" => Ok(NotificationKind::Solution),
            "system" => Ok(NotificationKind::System),
            _ => Err(CoreError::Validation(format!(
                "unknown notification kind: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(CoreError::Validation(format!("unknown priority: {s}"))),
        }
    }
}

impl From<Impact> for Priority {
    fn from(impact: Impact) -> Self {
        match impact {
            Impact::Low => Priority::Low,
            Impact::Medium => Priority::Medium,
            Impact::High => Priority::High,
            Impact::Critical => Priority::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub read: bool,
    pub recipient: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_change: Option<ChangeRequestId>,
    pub created_at_ms: u64,
}
