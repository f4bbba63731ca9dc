//! Feedback report rendering.
//!
//! Rendering is a pure function of a [`FeedbackReport`]; the tracker only
//! gathers the view, picks the file name and hands the bytes back.

use chrono::{DateTime, Utc};

use crate::models::{Comment, FeedbackView};

/// Everything a renderer needs to produce one export.
#[derive(Debug, Clone)]
pub struct FeedbackReport {
    pub feedback: FeedbackView,
    pub comments: Vec<ReportComment>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReportComment {
    pub comment: Comment,
    pub author_name: String,
    pub author_role: String,
}

#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to render report: {0}")]
    Render(String),
}

pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &FeedbackReport) -> Result<Vec<u8>, RenderError>;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;
}

/// `feedback_<Employee_Name>_<YYYYMMDD>.<ext>`, dated by the feedback's creation.
pub fn report_filename(employee_name: &str, created_at: &DateTime<Utc>, extension: &str) -> String {
    format!(
        "feedback_{}_{}.{}",
        employee_name.replace(' ', "_"),
        created_at.format("%Y%m%d"),
        extension
    )
}

fn human_time(time: &DateTime<Utc>) -> String {
    time.format("%B %d, %Y at %I:%M %p").to_string()
}

/// Plain-text report.
#[derive(Debug, Clone, Default)]
pub struct TextReportRenderer;

impl ReportRenderer for TextReportRenderer {
    fn render(&self, report: &FeedbackReport) -> Result<Vec<u8>, RenderError> {
        let view = &report.feedback;
        let feedback = &view.feedback;
        let mut out = String::new();

        out.push_str("Feedback Report\n");
        out.push_str("===============\n\n");

        let mut details = vec![
            ("Manager:", view.manager_name.clone()),
            ("Employee:", view.employee_name.clone()),
            ("Date Created:", human_time(&feedback.created_at)),
            ("Sentiment:", feedback.sentiment.label().to_string()),
            (
                "Status:",
                if feedback.acknowledged { "Acknowledged" } else { "Pending" }.to_string(),
            ),
        ];
        if !feedback.tags.is_empty() {
            details.push(("Tags:", feedback.tags.join(", ")));
        }
        for (label, value) in details {
            out.push_str(&format!("{label:<14} {value}\n"));
        }

        out.push_str("\nStrengths\n---------\n");
        out.push_str(&feedback.strengths);
        out.push_str("\n\nAreas to Improve\n----------------\n");
        out.push_str(&feedback.areas_to_improve);
        out.push('\n');

        if !report.comments.is_empty() {
            out.push_str("\nComments & Discussion\n---------------------\n");
            for entry in &report.comments {
                let indent = if entry.comment.is_top_level() { "" } else { "    " };
                out.push_str(&format!(
                    "\n{indent}{} ({}) - {}\n{indent}{}\n",
                    entry.author_name,
                    entry.author_role,
                    human_time(&entry.comment.created_at),
                    entry.comment.comment_text,
                ));
            }
        }

        out.push_str(&format!("\n\nGenerated on {}\n", human_time(&report.generated_at)));
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}
