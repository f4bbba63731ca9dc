use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedbackId, UserId};

pub type CommentId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub feedback_id: FeedbackId,
    pub user_id: UserId,
    pub comment_text: String,
    pub parent_id: Option<CommentId>,
    pub likes: usize,
    pub liked_by: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_liked_by(&self, user_id: UserId) -> bool {
        self.liked_by.contains(&user_id)
    }

    /// Flips `user_id`'s membership in the like set. `likes` is recomputed
    /// from the set, never adjusted on its own.
    pub fn toggle_like(&mut self, user_id: UserId) -> LikeAction {
        let action = if self.liked_by.remove(&user_id) {
            LikeAction::Unliked
        } else {
            self.liked_by.insert(user_id);
            LikeAction::Liked
        };
        self.likes = self.liked_by.len();
        action
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Unliked => "unliked",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub comment_text: Option<String>,
    #[serde(default, deserialize_with = "super::id::optional_id")]
    pub parent_id: Option<CommentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCommentInput {
    pub comment_text: Option<String>,
}

/// A comment as seen by one viewer, with its reply subtree attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub user_name: String,
    pub user_role: String,
    pub liked_by_user: bool,
    pub replies: Vec<CommentView>,
}

impl CommentView {
    /// Number of comments in this subtree, including this one.
    pub fn thread_size(&self) -> usize {
        1 + self.replies.iter().map(CommentView::thread_size).sum::<usize>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeToggleResult {
    pub comment: CommentView,
    pub action: LikeAction,
}
