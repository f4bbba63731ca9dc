#![allow(dead_code)]

use std::sync::Arc;

use feedback_core::identity::StaticDirectory;
use feedback_core::models::{CreateFeedbackInput, FeedbackView, Role, TagInput, User};
use feedback_core::notify::{MemoryNotifier, Notifier};
use feedback_core::report::{FeedbackReport, RenderError, ReportRenderer};
use feedback_core::{Database, Tracker};

pub struct Fixture {
    pub tracker: Tracker,
    pub notifier: Arc<MemoryNotifier>,
    /// Manages Jane and Bob.
    pub john: User,
    pub jane: User,
    pub bob: User,
    /// Manages Sam.
    pub mary: User,
    pub sam: User,
    /// An employee without a manager.
    pub solo: User,
}

fn user(id: i64, name: &str, role: Role, manager_id: Option<i64>) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@company.com", name.split(' ').next().unwrap().to_lowercase()),
        role,
        manager_id,
    }
}

pub fn users() -> Vec<User> {
    vec![
        user(1, "John Manager", Role::Manager, None),
        user(2, "Jane Employee", Role::Employee, Some(1)),
        user(3, "Bob Employee", Role::Employee, Some(1)),
        user(4, "Mary Manager", Role::Manager, None),
        user(5, "Sam Employee", Role::Employee, Some(4)),
        user(6, "Solo Employee", Role::Employee, None),
    ]
}

pub fn fixture() -> Fixture {
    let notifier = Arc::new(MemoryNotifier::new());
    build(notifier.clone(), notifier)
}

/// A fixture whose tracker sends through `sink`; `notifier` stays empty.
pub fn fixture_with_sink(sink: Arc<dyn Notifier>) -> Fixture {
    build(sink, Arc::new(MemoryNotifier::new()))
}

fn build(sink: Arc<dyn Notifier>, notifier: Arc<MemoryNotifier>) -> Fixture {
    let db = Database::open_memory().expect("Failed to create test database");
    db.migrate().expect("Failed to migrate test database");

    let directory = StaticDirectory::new(users()).expect("valid directory");
    let tracker = Tracker::new(db, Arc::new(directory), sink);
    tracker.sync_directory().expect("Failed to seed users");

    let resolve = |id| tracker.resolve_actor(id).expect("seeded user");
    let (john, jane, bob) = (resolve(1), resolve(2), resolve(3));
    let (mary, sam, solo) = (resolve(4), resolve(5), resolve(6));

    Fixture {
        tracker,
        notifier,
        john,
        jane,
        bob,
        mary,
        sam,
        solo,
    }
}

pub fn feedback_input(employee: &User) -> CreateFeedbackInput {
    CreateFeedbackInput {
        employee_id: Some(employee.id),
        strengths: Some("Clear communicator".to_string()),
        areas_to_improve: Some("Delegation".to_string()),
        sentiment: Some("positive".to_string()),
        tags: vec![TagInput::from("leadership"), TagInput::from("clarity")],
    }
}

pub fn create_feedback(fx: &Fixture, manager: &User, employee: &User) -> FeedbackView {
    fx.tracker
        .create_feedback(manager, feedback_input(employee))
        .expect("Failed to create feedback")
}

/// A renderer that always fails.
pub struct FailingRenderer;

impl ReportRenderer for FailingRenderer {
    fn render(&self, _report: &FeedbackReport) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Render("template missing".to_string()))
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}
