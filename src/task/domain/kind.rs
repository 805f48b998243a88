//! Task classification: type and priority.

use super::ParseTaskFieldError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Phone call.
    Call,
    /// Meeting.
    Meeting,
    /// Email correspondence.
    Email,
    /// Follow-up with a contact.
    FollowUp,
    /// Document preparation or review.
    Document,
    /// Insurance claim processing.
    ClaimProcessing,
    /// Policy review.
    PolicyReview,
    /// Quote preparation.
    QuotePreparation,
    /// Anything else.
    Custom,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Meeting => "meeting",
            Self::Email => "email",
            Self::FollowUp => "follow_up",
            Self::Document => "document",
            Self::ClaimProcessing => "claim_processing",
            Self::PolicyReview => "policy_review",
            Self::QuotePreparation => "quote_preparation",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskFieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "call" => Ok(Self::Call),
            "meeting" => Ok(Self::Meeting),
            "email" => Ok(Self::Email),
            "follow_up" => Ok(Self::FollowUp),
            "document" => Ok(Self::Document),
            "claim_processing" => Ok(Self::ClaimProcessing),
            "policy_review" => Ok(Self::PolicyReview),
            "quote_preparation" => Ok(Self::QuotePreparation),
            "custom" => Ok(Self::Custom),
            _ => Err(ParseTaskFieldError::new("type", value)),
        }
    }
}

/// Task urgency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Needs immediate attention.
    Urgent,
    /// Important.
    High,
    /// Normal.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Sort rank; lower is more urgent.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskFieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseTaskFieldError::new("priority", value)),
        }
    }
}
