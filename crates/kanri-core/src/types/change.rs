use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{ChangeRequestId, UserId};
use crate::CoreError;

/// Nominal lifecycle order: draft, submitted, under-review, approved or
/// rejected, implemented, closed. The order is documentation only; any
/// authorized editor may set any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeStatus {
    #[default]
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Implemented,
    Closed,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeStatus::Draft => "draft",
            ChangeStatus::Submitted => "submitted",
            ChangeStatus::UnderReview => "under-review",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
            ChangeStatus::Implemented => "implemented",
            ChangeStatus::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ChangeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "draft" => Ok(ChangeStatus::Draft),
            "submitted" => Ok(ChangeStatus::Submitted),
            "under-review" | "underreview" => Ok(ChangeStatus::UnderReview),
            "approved" => Ok(ChangeStatus::Approved),
            "rejected" => Ok(ChangeStatus::Rejected),
            "implemented" => Ok(ChangeStatus::Implemented),
            "closed" => Ok(ChangeStatus::Closed),
            _ => Err(CoreError::Validation(format!("unknown change status: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
            Impact::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Impact {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Impact::Low),
            "medium" => Ok(Impact::Medium),
            "high" => Ok(Impact::High),
            "critical" => Ok(Impact::Critical),
            _ => Err(CoreError::Validation(format!("unknown impact: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hardware,
    Software,
    Network,
    Security,
    Process,
    #[default]
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Hardware => "hardware",
            Category::Software => "software",
            Category::Network => "network",
            Category::Security => "security",
            Category::Process => "process",
            Category::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hardware" => Ok(Category::Hardware),
            "software" => Ok(Category::Software),
            "network" => Ok(Category::Network),
            "security" => Ok(Category::Security),
            "process" => Ok(Category::Process),
            "other" => Ok(Category::Other),
            _ => Err(CoreError::Validation(format!("unknown category: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ReviewStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(CoreError::Validation(format!("unknown review status: {s}"))),
        }
    }
}

/// One reviewer slot. Entries are not deduplicated by user; the same user
/// may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub user: UserId,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Set when the entry is created, never revised on a later vote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub stored_path: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author: UserId,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub impact: Impact,
    #[serde(default)]
    pub status: ChangeStatus,
    #[serde(default)]
    pub category: Category,
    pub planned_start_ms: u64,
    pub planned_end_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub reviewers: Vec<Reviewer>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Creating user. Ownership never transfers.
    pub owner: UserId,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

/// Caller-supplied fields for create. Everything the server assigns
/// (id, owner, timestamps) is absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChangeStatus>,
    #[serde(default)]
    pub category: Category,
    pub planned_start_ms: u64,
    pub planned_end_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub reviewers: Vec<Reviewer>,
}

/// Update payload: supplied fields overwrite, absent fields keep the
/// stored value. id, owner and created_at are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChangeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<Reviewer>>,
}
