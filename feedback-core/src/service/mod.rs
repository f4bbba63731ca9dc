//! The tracker service.
//!
//! [`Tracker`] enforces every ownership rule and state transition. Each
//! mutating operation runs as one database transaction; notifications are
//! sent only after that transaction commits.

mod comments;
mod dashboard;
mod export;
mod feedback;
mod requests;
mod threads;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::identity::IdentityDirectory;
use crate::models::{ManagerSummary, User, UserId};
use crate::notify::{Notification, Notifier};
use crate::report::{ReportRenderer, TextReportRenderer};

pub use threads::CommentTree;

pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

const UNKNOWN_USER: &str = "Unknown User";
const UNKNOWN_ROLE: &str = "unknown";

#[derive(Clone)]
pub struct Tracker {
    db: Database,
    directory: Arc<dyn IdentityDirectory>,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn ReportRenderer>,
    app_url: String,
}

impl Tracker {
    pub fn new(
        db: Database,
        directory: Arc<dyn IdentityDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            directory,
            notifier,
            renderer: Arc::new(TextReportRenderer),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ReportRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Base URL used for links in notification emails.
    pub fn with_app_url(mut self, app_url: impl Into<String>) -> Self {
        self.app_url = app_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Mirror the directory into the `users` relation so feedback, comments
    /// and requests can reference it. Managers go first to satisfy the
    /// `manager_id` foreign key. Stored users missing from the directory are
    /// deleted when nothing refers to them; otherwise they are kept for their
    /// history with their email released, so a reseeded directory may move an
    /// address to a different id.
    pub fn sync_directory(&self) -> Result<usize> {
        let mut users = self.directory.users();
        users.sort_by_key(|user| (!user.is_manager(), user.id));
        let seeded: HashMap<UserId, &User> = users.iter().map(|user| (user.id, user)).collect();

        let (removed, retained) = self.db.transaction(|conn| {
            let stored = User::list_all(conn)?;
            let stale: Vec<UserId> = stored
                .iter()
                .filter(|user| !seeded.contains_key(&user.id))
                .map(|user| user.id)
                .collect();

            for user in &stored {
                let moved = seeded
                    .get(&user.id)
                    .map_or(true, |seed| seed.email != user.email);
                if moved {
                    User::release_email(conn, user.id)?;
                }
            }
            for &id in &stale {
                User::clear_manager(conn, id)?;
            }
            for user in &users {
                user.upsert(conn)?;
            }

            let mut removed = 0;
            for &id in &stale {
                if User::delete_if_unreferenced(conn, id)? {
                    removed += 1;
                }
            }
            Ok((removed, stale.len() - removed))
        })?;

        tracing::info!(
            users = users.len(),
            removed,
            retained,
            "Synchronized identity directory"
        );
        Ok(users.len())
    }

    /// Resolve a caller id, failing `Unauthorized` when nobody has it.
    pub fn resolve_actor(&self, id: UserId) -> Result<User> {
        self.directory
            .resolve(id)
            .ok_or_else(|| Error::unauthorized("Authentication required"))
    }

    /// Look a user up by email. There is no credential check here.
    pub fn login(&self, email: &str) -> Result<User> {
        if email.trim().is_empty() {
            return Err(Error::validation("Email is required"));
        }
        self.directory
            .find_by_email(email)
            .ok_or_else(|| Error::unauthorized("Invalid credentials"))
    }

    pub fn team_members(&self, actor: &User) -> Result<Vec<User>> {
        if !actor.is_manager() {
            return Err(Error::forbidden("Only managers can view team members"));
        }
        Ok(self.directory.direct_reports(actor.id))
    }

    pub fn managers(&self) -> Vec<ManagerSummary> {
        self.directory
            .managers()
            .iter()
            .map(ManagerSummary::from)
            .collect()
    }

    /// Current time at the precision the database stores.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    fn display_name(&self, id: UserId) -> String {
        self.directory
            .resolve(id)
            .map(|user| user.name)
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }

    /// Name and role label of a comment author.
    fn author(&self, id: UserId) -> (String, String) {
        match self.directory.resolve(id) {
            Some(user) => (user.name, user.role.as_str().to_string()),
            None => (UNKNOWN_USER.to_string(), UNKNOWN_ROLE.to_string()),
        }
    }

    /// Hand a notification to the sink. Failures are logged and dropped.
    fn send(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification) {
            tracing::warn!(
                to = %notification.recipient_email,
                subject = %notification.subject,
                error = %e,
                "Failed to send notification"
            );
        }
    }
}

/// Trimmed text, or `None` when missing or blank.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
