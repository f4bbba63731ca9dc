mod common;

use speculate2::speculate;

speculate! {
    use std::sync::Arc;

    use crate::common::*;
    use feedback_core::models::{CreateRequestInput, RequestStatus, UpdateRequestStatusInput};
    use feedback_core::notify::MemoryNotifier;
    use feedback_core::Error;

    fn ask(message: &str) -> CreateRequestInput {
        CreateRequestInput {
            message: Some(message.to_string()),
        }
    }

    fn status(value: &str) -> UpdateRequestStatusInput {
        UpdateRequestStatusInput {
            status: Some(value.to_string()),
        }
    }

    describe "requesting feedback" {
        it "addresses the request to the employee's manager" {
            let fx = fixture();

            let view = fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();

            assert_eq!(view.request.employee_id, fx.jane.id);
            assert_eq!(view.request.manager_id, fx.john.id);
            assert_eq!(view.request.status, RequestStatus::Pending);
            assert_eq!(view.request.message.as_deref(), Some("Q3 review?"));
            assert!(view.request.completed_at.is_none());
            assert_eq!(view.employee_name, "Jane Employee");
            assert_eq!(view.manager_name, "John Manager");
        }

        it "stores a blank message as no message" {
            let fx = fixture();

            let view = fx.tracker.create_request(&fx.jane, ask("   ")).unwrap();
            assert!(view.request.message.is_none());

            let sent = fx.notifier.sent();
            assert_eq!(sent.len(), 1);
            assert!(!sent[0].body_html.contains("Message:"));
        }

        it "notifies the manager" {
            let fx = fixture();

            fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();

            let sent = fx.notifier.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].recipient_email, "john@company.com");
            assert_eq!(sent[0].subject, "Feedback request from Jane Employee");
            assert!(sent[0].body_html.contains("Q3 review?"));
        }

        it "allows one pending request per manager" {
            let fx = fixture();
            fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();

            let err = fx.tracker.create_request(&fx.jane, ask("Again?")).unwrap_err();
            assert!(matches!(err, Error::Conflict(_)));

            // Bob's request is independent of Jane's.
            fx.tracker.create_request(&fx.bob, ask("Me too")).unwrap();
            assert_eq!(fx.tracker.list_requests(&fx.john).unwrap().len(), 2);
        }

        it "is only for employees with a manager" {
            let fx = fixture();

            let err = fx.tracker.create_request(&fx.john, ask("Hi")).unwrap_err();
            assert!(matches!(err, Error::Forbidden(_)));

            let err = fx.tracker.create_request(&fx.solo, ask("Hi")).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));

            assert!(fx.notifier.sent().is_empty());
        }

        it "survives a failing notification sink" {
            let fx = fixture_with_sink(Arc::new(MemoryNotifier::failing()));

            let view = fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();
            let listed = fx.tracker.list_requests(&fx.jane).unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].request.id, view.request.id);
        }
    }

    describe "listing requests" {
        it "shows managers the requests addressed to them, newest first" {
            let fx = fixture();
            let first = fx.tracker.create_request(&fx.jane, ask("First")).unwrap();
            let second = fx.tracker.create_request(&fx.bob, ask("Second")).unwrap();
            fx.tracker.create_request(&fx.sam, ask("Elsewhere")).unwrap();

            let ids: Vec<_> = fx.tracker
                .list_requests(&fx.john)
                .unwrap()
                .iter()
                .map(|v| v.request.id)
                .collect();
            assert_eq!(ids, vec![second.request.id, first.request.id]);
        }

        it "shows employees only their own requests" {
            let fx = fixture();
            fx.tracker.create_request(&fx.jane, ask("Mine")).unwrap();
            fx.tracker.create_request(&fx.bob, ask("Bob's")).unwrap();

            let listed = fx.tracker.list_requests(&fx.jane).unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].request.employee_id, fx.jane.id);
            assert!(fx.tracker.list_requests(&fx.solo).unwrap().is_empty());
        }
    }

    describe "resolving requests" {
        it "walks a request through completion and allows a new one" {
            let fx = fixture();
            let pending = fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();
            fx.notifier.clear();

            let done = fx.tracker
                .update_request_status(&fx.john, pending.request.id, status("completed"))
                .unwrap();
            assert_eq!(done.request.status, RequestStatus::Completed);
            let completed_at = done.request.completed_at.expect("completion time");
            assert!(completed_at >= pending.request.created_at);

            let sent = fx.notifier.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].recipient_email, "jane@company.com");
            assert_eq!(sent[0].subject, "Your feedback request has been completed");

            let err = fx.tracker
                .update_request_status(&fx.john, pending.request.id, status("declined"))
                .unwrap_err();
            assert!(matches!(err, Error::Conflict(_)));

            let again = fx.tracker.create_request(&fx.jane, ask("Q4 review?")).unwrap();
            assert_eq!(again.request.status, RequestStatus::Pending);
            assert_ne!(again.request.id, pending.request.id);
        }

        it "declines without a completion time" {
            let fx = fixture();
            let pending = fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();
            fx.notifier.clear();

            let declined = fx.tracker
                .update_request_status(&fx.john, pending.request.id, status("declined"))
                .unwrap();
            assert_eq!(declined.request.status, RequestStatus::Declined);
            assert!(declined.request.completed_at.is_none());

            let sent = fx.notifier.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].subject, "Your feedback request has been declined");
        }

        it "rejects statuses other than completed or declined" {
            let fx = fixture();
            let pending = fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();

            for value in ["pending", "archived", ""] {
                let err = fx.tracker
                    .update_request_status(&fx.john, pending.request.id, status(value))
                    .unwrap_err();
                assert!(matches!(err, Error::Validation(_)), "status {value:?}");
            }
            let err = fx.tracker
                .update_request_status(&fx.john, pending.request.id, UpdateRequestStatusInput::default())
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));

            let listed = fx.tracker.list_requests(&fx.john).unwrap();
            assert_eq!(listed[0].request.status, RequestStatus::Pending);
        }

        it "belongs to the addressed manager only" {
            let fx = fixture();
            let pending = fx.tracker.create_request(&fx.jane, ask("Q3 review?")).unwrap();

            let err = fx.tracker
                .update_request_status(&fx.mary, pending.request.id, status("completed"))
                .unwrap_err();
            assert!(matches!(err, Error::Forbidden(_)));

            let err = fx.tracker
                .update_request_status(&fx.jane, pending.request.id, status("completed"))
                .unwrap_err();
            assert!(matches!(err, Error::Forbidden(_)));

            let err = fx.tracker
                .update_request_status(&fx.john, 4242, status("completed"))
                .unwrap_err();
            assert!(matches!(err, Error::NotFound(_)));
        }
    }
}
