use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

pub type FeedbackId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub manager_id: UserId,
    pub employee_id: UserId,
    pub strengths: String,
    pub areas_to_improve: String,
    pub sentiment: Sentiment,
    pub acknowledged: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sentiment| sentiment.as_str() == s)
    }

    /// Capitalized label used in rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

/// A tag as submitted by a client: either a bare string or a `{"name": ..}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Name(String),
    Record { name: String },
}

impl TagInput {
    pub fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Record { name } => name,
        }
    }
}

impl From<&str> for TagInput {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Flattens submitted tags into the ordered list that is stored.
pub fn normalize_tags(tags: Vec<TagInput>) -> Vec<String> {
    tags.into_iter().map(TagInput::into_name).collect()
}

/// Fields are optional so that a missing value surfaces as a validation
/// failure rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFeedbackInput {
    #[serde(default, deserialize_with = "super::id::optional_id")]
    pub employee_id: Option<UserId>,
    pub strengths: Option<String>,
    pub areas_to_improve: Option<String>,
    pub sentiment: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeedbackInput {
    pub strengths: Option<String>,
    pub areas_to_improve: Option<String>,
    pub sentiment: Option<String>,
    pub tags: Option<Vec<TagInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackView {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub manager_name: String,
    pub employee_name: String,
    pub comments_count: usize,
}
