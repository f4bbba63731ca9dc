use rusqlite::Connection;

use super::{non_blank, Tracker};
use crate::db::NewFeedback;
use crate::error::{Error, Result};
use crate::models::{
    normalize_tags, CreateFeedbackInput, Feedback, FeedbackId, FeedbackView, Sentiment,
    UpdateFeedbackInput, User,
};

const INVALID_SENTIMENT: &str = "Sentiment must be positive, neutral, or negative";

fn parse_sentiment(value: &str) -> Result<Sentiment> {
    Sentiment::from_str(value.trim()).ok_or_else(|| Error::validation(INVALID_SENTIMENT))
}

impl Tracker {
    /// Record feedback from a manager for one of their direct reports.
    pub fn create_feedback(&self, actor: &User, input: CreateFeedbackInput) -> Result<FeedbackView> {
        if !actor.is_manager() {
            return Err(Error::unauthorized("Only managers can create feedback"));
        }

        let missing = || Error::validation("All fields are required");
        let employee_id = input.employee_id.ok_or_else(missing)?;
        let strengths = non_blank(input.strengths.as_deref()).ok_or_else(missing)?;
        let areas_to_improve = non_blank(input.areas_to_improve.as_deref()).ok_or_else(missing)?;
        let sentiment = non_blank(input.sentiment.as_deref()).ok_or_else(missing)?;
        let sentiment = parse_sentiment(&sentiment)?;

        let employee = self
            .directory
            .resolve(employee_id)
            .ok_or_else(|| Error::not_found("Employee not found"))?;
        if employee.manager_id != Some(actor.id) {
            return Err(Error::forbidden(
                "You can only give feedback to your team members",
            ));
        }

        let new = NewFeedback {
            manager_id: actor.id,
            employee_id: employee.id,
            strengths,
            areas_to_improve,
            sentiment,
            tags: normalize_tags(input.tags),
        };

        let view = self.db.transaction(|conn| {
            let feedback = Feedback::insert(conn, new, Self::now())?;
            self.feedback_view(conn, feedback)
        })?;

        tracing::info!(
            feedback_id = view.feedback.id,
            manager_id = actor.id,
            employee_id = employee.id,
            "Feedback created"
        );
        Ok(view)
    }

    /// Feedback the actor wrote (managers) or received (employees).
    pub fn list_feedback(&self, actor: &User) -> Result<Vec<FeedbackView>> {
        self.db.with_connection(|conn| {
            let feedback = self.feedback_for(conn, actor)?;
            feedback
                .into_iter()
                .map(|f| self.feedback_view(conn, f))
                .collect()
        })
    }

    /// Apply the fields present in `patch`. Every field is validated before
    /// anything is written.
    pub fn update_feedback(
        &self,
        actor: &User,
        feedback_id: FeedbackId,
        patch: UpdateFeedbackInput,
    ) -> Result<FeedbackView> {
        let view = self.db.transaction(|conn| {
            let mut feedback = Feedback::find_by_id(conn, feedback_id)?
                .ok_or_else(|| Error::not_found("Feedback not found"))?;
            if !actor.is_manager() || feedback.manager_id != actor.id {
                return Err(Error::forbidden("You can only update your own feedback"));
            }

            let strengths = match patch.strengths.as_deref() {
                Some(text) => Some(
                    non_blank(Some(text))
                        .ok_or_else(|| Error::validation("Strengths cannot be empty"))?,
                ),
                None => None,
            };
            let areas_to_improve = match patch.areas_to_improve.as_deref() {
                Some(text) => Some(
                    non_blank(Some(text))
                        .ok_or_else(|| Error::validation("Areas to improve cannot be empty"))?,
                ),
                None => None,
            };
            let sentiment = patch.sentiment.as_deref().map(parse_sentiment).transpose()?;
            let tags = patch.tags.map(normalize_tags);

            let touched = strengths.is_some()
                || areas_to_improve.is_some()
                || sentiment.is_some()
                || tags.is_some();

            if let Some(strengths) = strengths {
                feedback.strengths = strengths;
            }
            if let Some(areas_to_improve) = areas_to_improve {
                feedback.areas_to_improve = areas_to_improve;
            }
            if let Some(sentiment) = sentiment {
                feedback.sentiment = sentiment;
            }
            if let Some(tags) = tags {
                feedback.tags = tags;
            }

            if touched {
                feedback.updated_at = Self::now();
                feedback.save(conn)?;
            }
            self.feedback_view(conn, feedback)
        })?;

        tracing::info!(feedback_id, manager_id = actor.id, "Feedback updated");
        Ok(view)
    }

    /// Mark feedback as read by its subject. Acknowledging twice is a no-op.
    pub fn acknowledge_feedback(&self, actor: &User, feedback_id: FeedbackId) -> Result<FeedbackView> {
        let view = self.db.transaction(|conn| {
            let mut feedback = Feedback::find_by_id(conn, feedback_id)?
                .ok_or_else(|| Error::not_found("Feedback not found"))?;
            if feedback.employee_id != actor.id {
                return Err(Error::forbidden("You can only acknowledge your own feedback"));
            }

            if !feedback.acknowledged {
                feedback.acknowledged = true;
                feedback.updated_at = Self::now();
                feedback.save(conn)?;
                tracing::info!(feedback_id, employee_id = actor.id, "Feedback acknowledged");
            }
            self.feedback_view(conn, feedback)
        })?;
        Ok(view)
    }

    pub(super) fn feedback_for(&self, conn: &Connection, actor: &User) -> Result<Vec<Feedback>> {
        if actor.is_manager() {
            Feedback::list_by_manager(conn, actor.id)
        } else {
            Feedback::list_by_employee(conn, actor.id)
        }
    }

    pub(super) fn feedback_view(&self, conn: &Connection, feedback: Feedback) -> Result<FeedbackView> {
        Ok(FeedbackView {
            manager_name: self.display_name(feedback.manager_id),
            employee_name: self.display_name(feedback.employee_id),
            comments_count: Feedback::comment_count(conn, feedback.id)?,
            feedback,
        })
    }

    /// Load feedback the actor may see, as its manager or its subject.
    pub(super) fn accessible_feedback(
        &self,
        conn: &Connection,
        actor: &User,
        feedback_id: FeedbackId,
    ) -> Result<Feedback> {
        let feedback = Feedback::find_by_id(conn, feedback_id)?
            .ok_or_else(|| Error::not_found("Feedback not found"))?;
        if feedback.manager_id != actor.id && feedback.employee_id != actor.id {
            return Err(Error::forbidden("Access denied"));
        }
        Ok(feedback)
    }
}
