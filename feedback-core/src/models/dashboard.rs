use serde::{Deserialize, Serialize};

use super::{FeedbackView, Sentiment, User};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerDashboard {
    pub team_members_count: usize,
    pub total_feedback_given: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub team_members: Vec<User>,
    pub recent_feedback: Vec<FeedbackView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDashboard {
    pub total_feedback_received: usize,
    pub acknowledged_feedback: usize,
    pub unacknowledged_feedback: usize,
    pub feedback_timeline: Vec<FeedbackView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dashboard {
    Manager(ManagerDashboard),
    Employee(EmployeeDashboard),
}
