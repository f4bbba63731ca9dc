//! Notification sink.
//!
//! Notifications are sent after the triggering mutation has committed. A
//! failing sink is logged by the caller and never turns a successful
//! mutation into an error.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient_email: String,
    pub subject: String,
    pub body_html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes every notification to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = %notification.recipient_email,
            subject = %notification.subject,
            body = %notification.body_html,
            "Email notification"
        );
        Ok(())
    }
}

/// Keeps notifications in memory. Useful for tests and for embedding the
/// tracker where mail is delivered by the host application.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every notification.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing {
            return Err(NotifyError::Delivery("sink unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        Ok(())
    }
}

/// Email bodies for every event the tracker announces.
pub mod templates {
    use super::Notification;
    use crate::models::User;

    const SIGNATURE: &str = "<p>Best regards,<br>Your Feedback System</p>";

    /// Escape text for interpolation into an HTML body or attribute.
    pub fn escape_html(input: &str) -> String {
        input
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// A manager started a discussion on feedback they wrote.
    pub fn comment_from_manager(
        base_url: &str,
        manager: &User,
        employee: &User,
        comment_text: &str,
    ) -> Notification {
        Notification {
            recipient_email: employee.email.clone(),
            subject: format!("New comment on your feedback from {}", manager.name),
            body_html: format!(
                "<h2>New Comment on Your Feedback</h2>\n\
                 <p>Hi {employee},</p>\n\
                 <p>{manager} has added a comment to your feedback:</p>\n\
                 <blockquote>{text}</blockquote>\n\
                 <p><a href=\"{base_url}/feedback\">View and respond to the comment</a></p>\n\
                 {SIGNATURE}",
                employee = escape_html(&employee.name),
                manager = escape_html(&manager.name),
                text = escape_html(comment_text),
                base_url = escape_html(base_url),
            ),
        }
    }

    /// An employee replied at the top level of feedback they received.
    pub fn comment_from_employee(
        base_url: &str,
        employee: &User,
        manager: &User,
        comment_text: &str,
    ) -> Notification {
        Notification {
            recipient_email: manager.email.clone(),
            subject: format!("New comment on feedback you gave to {}", employee.name),
            body_html: format!(
                "<h2>New Comment on Feedback</h2>\n\
                 <p>Hi {manager},</p>\n\
                 <p>{employee} has responded to the feedback you provided:</p>\n\
                 <blockquote>{text}</blockquote>\n\
                 <p><a href=\"{base_url}/feedback\">View and respond to the comment</a></p>\n\
                 {SIGNATURE}",
                manager = escape_html(&manager.name),
                employee = escape_html(&employee.name),
                text = escape_html(comment_text),
                base_url = escape_html(base_url),
            ),
        }
    }

    pub fn request_created(
        base_url: &str,
        employee: &User,
        manager: &User,
        message: Option<&str>,
    ) -> Notification {
        let message = message
            .map(|m| format!("<p><strong>Message:</strong> {}</p>\n", escape_html(m)))
            .unwrap_or_default();
        Notification {
            recipient_email: manager.email.clone(),
            subject: format!("Feedback request from {}", employee.name),
            body_html: format!(
                "<h2>New Feedback Request</h2>\n\
                 <p>Hi {manager},</p>\n\
                 <p>{employee} has requested feedback from you.</p>\n\
                 {message}\
                 <p><a href=\"{base_url}/feedback-requests\">View and respond to the request</a></p>\n\
                 {SIGNATURE}",
                manager = escape_html(&manager.name),
                employee = escape_html(&employee.name),
                base_url = escape_html(base_url),
            ),
        }
    }

    pub fn request_completed(base_url: &str, manager: &User, employee: &User) -> Notification {
        Notification {
            recipient_email: employee.email.clone(),
            subject: "Your feedback request has been completed".to_string(),
            body_html: format!(
                "<h2>Feedback Request Completed</h2>\n\
                 <p>Hi {employee},</p>\n\
                 <p>Great news! {manager} has completed your feedback request.</p>\n\
                 <p><a href=\"{base_url}/feedback\">View your new feedback</a></p>\n\
                 {SIGNATURE}",
                employee = escape_html(&employee.name),
                manager = escape_html(&manager.name),
                base_url = escape_html(base_url),
            ),
        }
    }

    pub fn request_declined(manager: &User, employee: &User) -> Notification {
        Notification {
            recipient_email: employee.email.clone(),
            subject: "Your feedback request has been declined".to_string(),
            body_html: format!(
                "<h2>Feedback Request Declined</h2>\n\
                 <p>Hi {employee},</p>\n\
                 <p>{manager} has declined your feedback request. You can try requesting \
                 again later or discuss this directly with your manager.</p>\n\
                 {SIGNATURE}",
                employee = escape_html(&employee.name),
                manager = escape_html(&manager.name),
            ),
        }
    }
}
