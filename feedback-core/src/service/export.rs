use super::Tracker;
use crate::error::Result;
use crate::models::{Comment, FeedbackId, User};
use crate::report::{report_filename, ExportedReport, FeedbackReport, ReportComment};

impl Tracker {
    /// Render a feedback record and its discussion with the configured
    /// renderer. Either party of the feedback may export it.
    pub fn export_feedback(&self, actor: &User, feedback_id: FeedbackId) -> Result<ExportedReport> {
        let report = self.db.with_connection(|conn| {
            let feedback = self.accessible_feedback(conn, actor, feedback_id)?;
            let comments = Comment::list_for_feedback(conn, feedback_id)?
                .into_iter()
                .map(|comment| {
                    let (author_name, author_role) = self.author(comment.user_id);
                    ReportComment {
                        comment,
                        author_name,
                        author_role,
                    }
                })
                .collect();
            Ok(FeedbackReport {
                feedback: self.feedback_view(conn, feedback)?,
                comments,
                generated_at: Self::now(),
            })
        })?;

        let bytes = self.renderer.render(&report).map_err(|e| {
            tracing::warn!(feedback_id, error = %e, "Failed to render feedback report");
            e
        })?;

        let filename = report_filename(
            &report.feedback.employee_name,
            &report.feedback.feedback.created_at,
            self.renderer.extension(),
        );
        tracing::debug!(feedback_id, %filename, size = bytes.len(), "Feedback report exported");

        Ok(ExportedReport {
            filename,
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}
