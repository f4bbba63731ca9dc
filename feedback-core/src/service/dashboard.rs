use super::Tracker;
use crate::error::Result;
use crate::models::{
    Dashboard, EmployeeDashboard, FeedbackView, ManagerDashboard, SentimentDistribution, User,
};

const RECENT_FEEDBACK: usize = 5;

impl Tracker {
    /// Team overview for managers, personal timeline for employees.
    pub fn dashboard(&self, actor: &User) -> Result<Dashboard> {
        let feedback: Vec<FeedbackView> = self.db.with_connection(|conn| {
            self.feedback_for(conn, actor)?
                .into_iter()
                .map(|f| self.feedback_view(conn, f))
                .collect()
        })?;

        if actor.is_manager() {
            let team_members = self.directory.direct_reports(actor.id);
            let mut sentiment_distribution = SentimentDistribution::default();
            for view in &feedback {
                sentiment_distribution.record(view.feedback.sentiment);
            }
            let total_feedback_given = feedback.len();
            let recent_feedback = feedback.into_iter().rev().take(RECENT_FEEDBACK).collect();

            Ok(Dashboard::Manager(ManagerDashboard {
                team_members_count: team_members.len(),
                total_feedback_given,
                sentiment_distribution,
                team_members,
                recent_feedback,
            }))
        } else {
            let acknowledged = feedback.iter().filter(|v| v.feedback.acknowledged).count();
            Ok(Dashboard::Employee(EmployeeDashboard {
                total_feedback_received: feedback.len(),
                acknowledged_feedback: acknowledged,
                unacknowledged_feedback: feedback.len() - acknowledged,
                feedback_timeline: feedback,
            }))
        }
    }
}
