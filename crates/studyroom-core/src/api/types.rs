use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Goals allowed per session set.
pub const MAX_GOALS_PER_SET: usize = 5;
/// Maximum goal text length, in characters.
pub const MAX_GOAL_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
}

/// Login and registration answer: the token plus the user fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub nombre: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub set_number: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub text: String,
    pub set_number: u32,
}

impl NewGoal {
    /// Trim and check the text.
    pub fn new(text: &str, set_number: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            text: validate_goal_text(text)?,
            set_number,
        })
    }
}

/// Partial goal update; unset fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl GoalPatch {
    pub fn text(text: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            text: Some(validate_goal_text(text)?),
            completed: None,
        })
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }
}

/// Returns the trimmed text.
pub fn validate_goal_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyGoal);
    }
    let len = trimmed.chars().count();
    if len > MAX_GOAL_LEN {
        return Err(ValidationError::GoalTooLong {
            len,
            max: MAX_GOAL_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// A finished study phase as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub set_number: u32,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub set_number: u32,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

/// Error body shape used by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "message")]
    pub error: String,
}
