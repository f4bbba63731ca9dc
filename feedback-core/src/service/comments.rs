use rusqlite::Connection;

use super::{non_blank, CommentTree, Tracker};
use crate::error::{Error, Result};
use crate::models::{
    Comment, CommentId, CommentView, CreateCommentInput, Feedback, FeedbackId, LikeToggleResult,
    UpdateCommentInput, User,
};
use crate::notify::templates;

const TEXT_REQUIRED: &str = "Comment text is required";

impl Tracker {
    /// Top-level comments of a feedback, oldest first, each carrying its
    /// replies.
    pub fn list_comments(&self, actor: &User, feedback_id: FeedbackId) -> Result<Vec<CommentView>> {
        self.db.with_connection(|conn| {
            self.accessible_feedback(conn, actor, feedback_id)?;
            let tree = CommentTree::build(Comment::list_for_feedback(conn, feedback_id)?);
            Ok(tree.threads(actor.id, &|id| self.author(id)))
        })
    }

    /// Post a comment, or a reply when `parent_id` is set. Only top-level
    /// comments notify the other party of the feedback; replies never do.
    pub fn create_comment(
        &self,
        actor: &User,
        feedback_id: FeedbackId,
        input: CreateCommentInput,
    ) -> Result<CommentView> {
        let (feedback, comment) = self.db.transaction(|conn| {
            let feedback = self.accessible_feedback(conn, actor, feedback_id)?;
            let text = non_blank(input.comment_text.as_deref())
                .ok_or_else(|| Error::validation(TEXT_REQUIRED))?;

            // Only the immediate parent is checked, so replies may nest.
            if let Some(parent_id) = input.parent_id {
                Comment::find_in_feedback(conn, feedback_id, parent_id)?
                    .ok_or_else(|| Error::not_found("Parent comment not found"))?;
            }

            let comment = Comment::insert(
                conn,
                feedback_id,
                actor.id,
                &text,
                input.parent_id,
                Self::now(),
            )?;
            Ok((feedback, comment))
        })?;

        tracing::info!(
            feedback_id,
            comment_id = comment.id,
            parent_id = ?comment.parent_id,
            user_id = actor.id,
            "Comment created"
        );

        if comment.is_top_level() {
            self.announce_comment(actor, &feedback, &comment);
        }

        let (user_name, user_role) = self.author(comment.user_id);
        Ok(CommentView {
            liked_by_user: comment.is_liked_by(actor.id),
            comment,
            user_name,
            user_role,
            replies: Vec::new(),
        })
    }

    /// Replace a comment's text. Only its author may edit it.
    pub fn update_comment(
        &self,
        actor: &User,
        feedback_id: FeedbackId,
        comment_id: CommentId,
        input: UpdateCommentInput,
    ) -> Result<CommentView> {
        let view = self.db.transaction(|conn| {
            let mut comment = self.owned_comment(conn, actor, feedback_id, comment_id, "edit")?;
            comment.comment_text = non_blank(input.comment_text.as_deref())
                .ok_or_else(|| Error::validation(TEXT_REQUIRED))?;
            comment.updated_at = Self::now();
            comment.save(conn)?;
            self.comment_view(conn, actor, &comment)
        })?;

        tracing::info!(feedback_id, comment_id, "Comment updated");
        Ok(view)
    }

    /// Delete a comment and every reply beneath it, at any depth. Returns the
    /// number of comments removed.
    pub fn delete_comment(
        &self,
        actor: &User,
        feedback_id: FeedbackId,
        comment_id: CommentId,
    ) -> Result<usize> {
        let removed = self.db.transaction(|conn| {
            self.owned_comment(conn, actor, feedback_id, comment_id, "delete")?;

            let tree = CommentTree::build(Comment::list_for_feedback(conn, feedback_id)?);
            let mut ids = tree.subtree_ids(comment_id);
            ids.reverse();
            Comment::delete_all(conn, &ids)
        })?;

        tracing::info!(feedback_id, comment_id, removed, "Comment deleted");
        Ok(removed)
    }

    /// Like the comment for the actor, or take the like back if it is
    /// already there. The like set is re-read inside the write transaction.
    pub fn toggle_like(
        &self,
        actor: &User,
        feedback_id: FeedbackId,
        comment_id: CommentId,
    ) -> Result<LikeToggleResult> {
        let result = self.db.transaction(|conn| {
            let feedback = Feedback::find_by_id(conn, feedback_id)?
                .ok_or_else(|| Error::not_found("Feedback not found"))?;
            let mut comment = Comment::find_in_feedback(conn, feedback_id, comment_id)?
                .ok_or_else(|| Error::not_found("Comment not found"))?;
            if feedback.manager_id != actor.id && feedback.employee_id != actor.id {
                return Err(Error::forbidden("Access denied"));
            }

            let action = comment.toggle_like(actor.id);
            comment.save(conn)?;
            Ok(LikeToggleResult {
                comment: self.comment_view(conn, actor, &comment)?,
                action,
            })
        })?;

        tracing::info!(
            feedback_id,
            comment_id,
            user_id = actor.id,
            action = result.action.as_str(),
            likes = result.comment.comment.likes,
            "Comment like toggled"
        );
        Ok(result)
    }

    /// Load a comment for its author, checking the feedback first.
    fn owned_comment(
        &self,
        conn: &Connection,
        actor: &User,
        feedback_id: FeedbackId,
        comment_id: CommentId,
        verb: &str,
    ) -> Result<Comment> {
        Feedback::find_by_id(conn, feedback_id)?
            .ok_or_else(|| Error::not_found("Feedback not found"))?;
        let comment = Comment::find_in_feedback(conn, feedback_id, comment_id)?
            .ok_or_else(|| Error::not_found("Comment not found"))?;
        if comment.user_id != actor.id {
            return Err(Error::forbidden(format!(
                "You can only {verb} your own comments"
            )));
        }
        Ok(comment)
    }

    fn comment_view(&self, conn: &Connection, actor: &User, comment: &Comment) -> Result<CommentView> {
        let tree = CommentTree::build(Comment::list_for_feedback(conn, comment.feedback_id)?);
        Ok(tree.view(comment, actor.id, &|id| self.author(id)))
    }

    /// Tell the other party of the feedback about a new top-level comment.
    fn announce_comment(&self, actor: &User, feedback: &Feedback, comment: &Comment) {
        let recipient_id = if actor.id == feedback.manager_id {
            feedback.employee_id
        } else {
            feedback.manager_id
        };
        let Some(recipient) = self.directory.resolve(recipient_id) else {
            tracing::warn!(
                recipient_id,
                feedback_id = feedback.id,
                "Skipping comment notification for unknown recipient"
            );
            return;
        };

        let notification = if actor.id == feedback.manager_id {
            templates::comment_from_manager(&self.app_url, actor, &recipient, &comment.comment_text)
        } else {
            templates::comment_from_employee(&self.app_url, actor, &recipient, &comment.comment_text)
        };
        self.send(notification);
    }
}
