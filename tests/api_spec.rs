use speculate2::speculate;

speculate! {
    use std::sync::Arc;

    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use feedback_core::notify::MemoryNotifier;
    use feedback_core::report::{FeedbackReport, RenderError, ReportRenderer};
    use feedback_core::{Database, Tracker};
    use feedback_tracker::api::create_router;
    use feedback_tracker::config::load_directory;

    const JOHN: i64 = 1;
    const JANE: i64 = 2;
    const BOB: i64 = 3;

    struct BrokenRenderer;

    impl ReportRenderer for BrokenRenderer {
        fn render(&self, _report: &FeedbackReport) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Render("font not found".to_string()))
        }

        fn extension(&self) -> &'static str {
            "pdf"
        }

        fn content_type(&self) -> &'static str {
            "application/pdf"
        }
    }

    fn tracker() -> Tracker {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        let directory = load_directory(None).expect("bundled users");
        let tracker = Tracker::new(db, Arc::new(directory), Arc::new(MemoryNotifier::new()));
        tracker.sync_directory().expect("Failed to seed users");
        tracker
    }

    fn server() -> TestServer {
        TestServer::new(create_router(tracker())).expect("Failed to start test server")
    }

    fn user_header() -> HeaderName {
        HeaderName::from_static("x-user-id")
    }

    fn as_user(id: i64) -> HeaderValue {
        HeaderValue::from(id)
    }

    async fn give_feedback(server: &TestServer) -> i64 {
        let response = server
            .post("/api/feedback")
            .add_header(user_header(), as_user(JOHN))
            .json(&json!({
                "employee_id": JANE,
                "strengths": "Clear communicator",
                "areas_to_improve": "Delegation",
                "sentiment": "positive",
                "tags": ["leadership", {"name": "clarity"}],
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["feedback"]["id"]
            .as_i64()
            .expect("feedback id")
    }

    describe "health and identity" {
        it "reports health without authentication" {
            tokio_test::block_on(async {
                let server = server();
                let response = server.get("/api/health").await;

                assert_eq!(response.status_code(), StatusCode::OK);
                let body = response.json::<Value>();
                assert_eq!(body["status"], "ok");
                assert_eq!(body["database"], "connected");
            });
        }

        it "rejects missing, malformed and unknown user ids" {
            tokio_test::block_on(async {
                let server = server();

                let missing = server.get("/api/feedback").await;
                assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
                assert_eq!(missing.json::<Value>()["error"], "Authentication required");

                let malformed = server
                    .get("/api/feedback")
                    .add_header(user_header(), HeaderValue::from_static("jane"))
                    .await;
                assert_eq!(malformed.status_code(), StatusCode::UNAUTHORIZED);

                let unknown = server
                    .get("/api/feedback")
                    .add_header(user_header(), as_user(99))
                    .await;
                assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
            });
        }

        it "logs in by email" {
            tokio_test::block_on(async {
                let server = server();

                let response = server
                    .post("/api/auth/login")
                    .json(&json!({ "email": "employee1@company.com" }))
                    .await;
                assert_eq!(response.status_code(), StatusCode::OK);
                let body = response.json::<Value>();
                assert_eq!(body["user"]["id"], JANE);
                assert_eq!(body["user"]["role"], "employee");
                assert_eq!(body["user"]["manager_id"], JOHN);

                let unknown = server
                    .post("/api/auth/login")
                    .json(&json!({ "email": "nobody@company.com" }))
                    .await;
                assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
                assert_eq!(unknown.json::<Value>()["error"], "Invalid credentials");

                let blank = server.post("/api/auth/login").json(&json!({})).await;
                assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);
            });
        }
    }

    describe "users" {
        it "lists a manager's team and refuses employees" {
            tokio_test::block_on(async {
                let server = server();

                let team = server
                    .get("/api/users/team")
                    .add_header(user_header(), as_user(JOHN))
                    .await;
                assert_eq!(team.status_code(), StatusCode::OK);
                let members = team.json::<Value>()["team_members"].as_array().cloned().unwrap();
                assert_eq!(members.len(), 2);

                let refused = server
                    .get("/api/users/team")
                    .add_header(user_header(), as_user(JANE))
                    .await;
                assert_eq!(refused.status_code(), StatusCode::FORBIDDEN);
            });
        }

        it "lists managers publicly" {
            tokio_test::block_on(async {
                let server = server();
                let response = server.get("/api/users/managers").await;

                assert_eq!(response.status_code(), StatusCode::OK);
                assert_eq!(
                    response.json::<Value>()["managers"],
                    json!([{ "id": 1, "name": "John Manager", "email": "manager1@company.com" }])
                );
            });
        }
    }

    describe "feedback endpoints" {
        it "creates, lists and acknowledges feedback" {
            tokio_test::block_on(async {
                let server = server();
                let id = give_feedback(&server).await;

                let listed = server
                    .get("/api/feedback")
                    .add_header(user_header(), as_user(JANE))
                    .await
                    .json::<Value>();
                let feedback = &listed["feedback"][0];
                assert_eq!(feedback["id"], id);
                assert_eq!(feedback["manager_name"], "John Manager");
                assert_eq!(feedback["tags"], json!(["leadership", "clarity"]));
                assert_eq!(feedback["acknowledged"], false);

                let acked = server
                    .post(&format!("/api/feedback/{id}/acknowledge"))
                    .add_header(user_header(), as_user(JANE))
                    .await;
                assert_eq!(acked.status_code(), StatusCode::OK);
                assert_eq!(acked.json::<Value>()["feedback"]["acknowledged"], true);
            });
        }

        it "maps validation and ownership failures to status codes" {
            tokio_test::block_on(async {
                let server = server();

                let incomplete = server
                    .post("/api/feedback")
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "employee_id": JANE, "sentiment": "positive" }))
                    .await;
                assert_eq!(incomplete.status_code(), StatusCode::BAD_REQUEST);
                assert_eq!(incomplete.json::<Value>()["error"], "All fields are required");

                let id = give_feedback(&server).await;

                let by_employee = server
                    .put(&format!("/api/feedback/{id}"))
                    .add_header(user_header(), as_user(JANE))
                    .json(&json!({ "strengths": "Self-assessed" }))
                    .await;
                assert_eq!(by_employee.status_code(), StatusCode::FORBIDDEN);

                let missing = server
                    .put("/api/feedback/999")
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "strengths": "Anything" }))
                    .await;
                assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
            });
        }

        it "accepts ids sent as strings" {
            tokio_test::block_on(async {
                let server = server();

                let created = server
                    .post("/api/feedback")
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({
                        "employee_id": "2",
                        "strengths": "Clear communicator",
                        "areas_to_improve": "Delegation",
                        "sentiment": "positive",
                    }))
                    .await;
                assert_eq!(created.status_code(), StatusCode::CREATED);
                let feedback = created.json::<Value>()["feedback"].clone();
                assert_eq!(feedback["employee_id"], JANE);
                let id = feedback["id"].as_i64().unwrap();

                let top = server
                    .post(&format!("/api/feedback/{id}/comments"))
                    .add_header(user_header(), as_user(JANE))
                    .json(&json!({ "comment_text": "Thanks!" }))
                    .await
                    .json::<Value>();
                let cid = top["comment"]["id"].as_i64().unwrap();

                let reply = server
                    .post(&format!("/api/feedback/{id}/comments"))
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "comment_text": "Anytime", "parent_id": cid.to_string() }))
                    .await;
                assert_eq!(reply.status_code(), StatusCode::CREATED);
                assert_eq!(reply.json::<Value>()["comment"]["parent_id"], cid);
            });
        }

        it "answers malformed bodies with a 400 error envelope" {
            tokio_test::block_on(async {
                let server = server();

                let non_numeric = server
                    .post("/api/feedback")
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "employee_id": "jane", "strengths": "x" }))
                    .await;
                assert_eq!(non_numeric.status_code(), StatusCode::BAD_REQUEST);
                assert!(non_numeric.json::<Value>()["error"].is_string());

                let broken = server
                    .post("/api/feedback")
                    .add_header(user_header(), as_user(JOHN))
                    .text("{\"employee_id\": ")
                    .content_type("application/json")
                    .await;
                assert_eq!(broken.status_code(), StatusCode::BAD_REQUEST);
                assert!(broken.json::<Value>()["error"].is_string());

                let blank_id = server
                    .post("/api/feedback")
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({
                        "employee_id": "",
                        "strengths": "Clear communicator",
                        "areas_to_improve": "Delegation",
                        "sentiment": "positive",
                    }))
                    .await;
                assert_eq!(blank_id.status_code(), StatusCode::BAD_REQUEST);
                assert_eq!(blank_id.json::<Value>()["error"], "All fields are required");
            });
        }

        it "serves the manager dashboard" {
            tokio_test::block_on(async {
                let server = server();
                give_feedback(&server).await;

                let response = server
                    .get("/api/feedback/dashboard")
                    .add_header(user_header(), as_user(JOHN))
                    .await;
                assert_eq!(response.status_code(), StatusCode::OK);
                let dashboard = &response.json::<Value>()["dashboard"];
                assert_eq!(dashboard["team_members_count"], 2);
                assert_eq!(dashboard["total_feedback_given"], 1);
                assert_eq!(dashboard["sentiment_distribution"]["positive"], 1);
            });
        }

        it "exports a report as an attachment" {
            tokio_test::block_on(async {
                let server = server();
                let id = give_feedback(&server).await;

                let response = server
                    .get(&format!("/api/feedback/{id}/export"))
                    .add_header(user_header(), as_user(JANE))
                    .await;
                assert_eq!(response.status_code(), StatusCode::OK);

                let disposition = response.header("content-disposition");
                let disposition = disposition.to_str().unwrap();
                assert!(disposition.starts_with("attachment; filename=\"feedback_Jane_Employee_"));
                assert!(disposition.ends_with(".txt\""));
                assert!(response.text().contains("Clear communicator"));

                let outsider = server
                    .get(&format!("/api/feedback/{id}/export"))
                    .add_header(user_header(), as_user(BOB))
                    .await;
                assert_eq!(outsider.status_code(), StatusCode::FORBIDDEN);
            });
        }

        it "hides renderer failures behind a 500" {
            tokio_test::block_on(async {
                let router = create_router(tracker().with_renderer(Arc::new(BrokenRenderer)));
                let server = TestServer::new(router).expect("Failed to start test server");
                let id = give_feedback(&server).await;

                let response = server
                    .get(&format!("/api/feedback/{id}/export"))
                    .add_header(user_header(), as_user(JANE))
                    .await;
                assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(response.json::<Value>()["error"], "Internal server error");

                let listed = server
                    .get("/api/feedback")
                    .add_header(user_header(), as_user(JANE))
                    .await
                    .json::<Value>();
                assert_eq!(listed["feedback"][0]["id"], id);
            });
        }
    }

    describe "comment endpoints" {
        it "threads, likes and deletes comments" {
            tokio_test::block_on(async {
                let server = server();
                let id = give_feedback(&server).await;

                let created = server
                    .post(&format!("/api/feedback/{id}/comments"))
                    .add_header(user_header(), as_user(JANE))
                    .json(&json!({ "comment_text": "Thanks!" }))
                    .await;
                assert_eq!(created.status_code(), StatusCode::CREATED);
                let cid = created.json::<Value>()["comment"]["id"].as_i64().unwrap();

                let replied = server
                    .post(&format!("/api/feedback/{id}/comments"))
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "comment_text": "Anytime", "parent_id": cid }))
                    .await;
                assert_eq!(replied.status_code(), StatusCode::CREATED);

                let liked = server
                    .post(&format!("/api/feedback/{id}/comments/{cid}/like"))
                    .add_header(user_header(), as_user(JOHN))
                    .await
                    .json::<Value>();
                assert_eq!(liked["action"], "liked");
                assert_eq!(liked["comment"]["likes"], 1);
                assert_eq!(liked["comment"]["liked_by_user"], true);

                let threads = server
                    .get(&format!("/api/feedback/{id}/comments"))
                    .add_header(user_header(), as_user(JANE))
                    .await
                    .json::<Value>();
                assert_eq!(threads["comments"].as_array().unwrap().len(), 1);
                assert_eq!(threads["comments"][0]["replies"][0]["comment_text"], "Anytime");
                assert_eq!(threads["comments"][0]["liked_by_user"], false);

                let forbidden = server
                    .delete(&format!("/api/feedback/{id}/comments/{cid}"))
                    .add_header(user_header(), as_user(JOHN))
                    .await;
                assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

                let deleted = server
                    .delete(&format!("/api/feedback/{id}/comments/{cid}"))
                    .add_header(user_header(), as_user(JANE))
                    .await;
                assert_eq!(deleted.status_code(), StatusCode::OK);
                assert_eq!(deleted.json::<Value>()["deleted"], 2);
            });
        }

        it "rejects blank comments" {
            tokio_test::block_on(async {
                let server = server();
                let id = give_feedback(&server).await;

                let response = server
                    .post(&format!("/api/feedback/{id}/comments"))
                    .add_header(user_header(), as_user(JANE))
                    .json(&json!({ "comment_text": "   " }))
                    .await;
                assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
                assert_eq!(response.json::<Value>()["error"], "Comment text is required");
            });
        }
    }

    describe "feedback request endpoints" {
        it "runs a request from creation to completion" {
            tokio_test::block_on(async {
                let server = server();

                let created = server
                    .post("/api/feedback/requests")
                    .add_header(user_header(), as_user(JANE))
                    .json(&json!({ "message": "Q3 review?" }))
                    .await;
                assert_eq!(created.status_code(), StatusCode::CREATED);
                let request = created.json::<Value>()["request"].clone();
                assert_eq!(request["status"], "pending");
                assert_eq!(request["manager_name"], "John Manager");
                let rid = request["id"].as_i64().unwrap();

                let duplicate = server
                    .post("/api/feedback/requests")
                    .add_header(user_header(), as_user(JANE))
                    .json(&json!({ "message": "Again?" }))
                    .await;
                assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

                let invalid = server
                    .put(&format!("/api/feedback/requests/{rid}"))
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "status": "archived" }))
                    .await;
                assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

                let completed = server
                    .put(&format!("/api/feedback/requests/{rid}"))
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({ "status": "completed" }))
                    .await;
                assert_eq!(completed.status_code(), StatusCode::OK);
                let request = &completed.json::<Value>()["request"];
                assert_eq!(request["status"], "completed");
                assert!(request["completed_at"].is_string());

                let listed = server
                    .get("/api/feedback/requests")
                    .add_header(user_header(), as_user(JOHN))
                    .await
                    .json::<Value>();
                assert_eq!(listed["requests"].as_array().unwrap().len(), 1);
            });
        }

        it "refuses requests from managers" {
            tokio_test::block_on(async {
                let server = server();
                let response = server
                    .post("/api/feedback/requests")
                    .add_header(user_header(), as_user(JOHN))
                    .json(&json!({}))
                    .await;
                assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
            });
        }
    }
}
