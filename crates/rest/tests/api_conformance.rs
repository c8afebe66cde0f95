//! REST API conformance tests.
//!
//! Covers the uniform response envelope, the auth middleware chain, and
//! CRUD behavior for each entity, all over the in-memory backends.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{admin_token, create_test_server, seed_quiz, seed_subject, seed_topic, user_token};
use scifun_persistence::store::DocumentStore;

// =============================================================================
// Envelope and auth
// =============================================================================

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_rejected_in_body() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/subject/create-subject")
            .json(&json!({ "name": "Toán" }))
            .await;

        // Transport is always 200; the envelope carries the outcome
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Vui lòng đăng nhập để tiếp tục");
    }

    #[tokio::test]
    async fn test_malformed_authorization_header() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/subject/create-subject")
            .add_header("authorization", "Token abc")
            .json(&json!({ "name": "Toán" }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Token không đúng định dạng");
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/subject/create-subject")
            .authorization_bearer("not-a-jwt")
            .json(&json!({ "name": "Toán" }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Token không hợp lệ");
    }

    #[tokio::test]
    async fn test_non_admin_role_rejected() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/subject/create-subject")
            .authorization_bearer(user_token("507f1f77bcf86cd799439099"))
            .json(&json!({ "name": "Toán" }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Bạn không có quyền truy cập tài nguyên này");
    }

    #[tokio::test]
    async fn test_admin_token_passes_the_gate() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/subject/create-subject")
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Toán" }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Tạo môn học thành công");
    }

    #[tokio::test]
    async fn test_public_routes_need_no_token() {
        let (server, _, _) = create_test_server();

        let response = server.get("/api/v1/subject/get-subjects").await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
    }
}

// =============================================================================
// Subjects
// =============================================================================

mod subjects {
    use super::*;

    #[tokio::test]
    async fn test_create_applies_schema_defaults() {
        let (server, _, index) = create_test_server();
        let id = seed_subject(&server, "Vật lý").await;

        use scifun_persistence::index::SearchIndex;
        let mirrored = index
            .get("subject", &id)
            .await
            .expect("index get failed")
            .expect("subject not mirrored");
        assert_eq!(mirrored["name"], "Vật lý");
        assert_eq!(mirrored["maxTopics"], 20);
        assert!(mirrored["image"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_update_subject() {
        let (server, _, _) = create_test_server();
        let id = seed_subject(&server, "Hóa học").await;

        let response = server
            .put(&format!("/api/v1/subject/update-subject/{id}"))
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Hóa học 12" }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Cập nhật môn học thành công");
        assert_eq!(body["data"]["name"], "Hóa học 12");
    }

    #[tokio::test]
    async fn test_update_missing_subject() {
        let (server, _, _) = create_test_server();

        let response = server
            .put("/api/v1/subject/update-subject/507f1f77bcf86cd799439022")
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "x" }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Subject không tồn tại");
    }

    #[tokio::test]
    async fn test_delete_subject_returns_nested_payload() {
        let (server, store, _) = create_test_server();
        let id = seed_subject(&server, "Sinh học").await;

        let response = server
            .delete(&format!("/api/v1/subject/delete-subject/{id}"))
            .authorization_bearer(admin_token())
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Xóa môn học thành công");
        assert_eq!(body["data"]["message"], "Xóa subject thành công");
        assert_eq!(body["data"]["subject"]["name"], "Sinh học");

        let remaining = store
            .count("subjects", &[])
            .await
            .expect("count failed");
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_invalid_id_message() {
        let (server, _, _) = create_test_server();

        let response = server.get("/api/v1/subject/get-subjectById/zzz").await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "ID môn học không hợp lệ");
    }

    #[tokio::test]
    async fn test_unknown_body_field_rejected() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/subject/create-subject")
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Toán", "bogus": true }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        let message = body["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("Error creating subject:"), "{message}");
    }
}

// =============================================================================
// Quizzes
// =============================================================================

mod quizzes {
    use super::*;

    #[tokio::test]
    async fn test_detail_populates_topic_and_subject() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Điện học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Định luật Ôm").await;

        let response = server
            .get(&format!("/api/v1/quiz/get-quizById/{quiz_id}"))
            .await;

        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Lấy chi tiết quiz thành công");
        assert_eq!(body["data"]["topic"]["name"], "Điện học");
        assert_eq!(body["data"]["topic"]["subject"]["name"], "Vật lý");
    }

    #[tokio::test]
    async fn test_quiz_counters_default_to_zero() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Quang học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Thấu kính").await;

        let response = server
            .get(&format!("/api/v1/quiz/get-quizById/{quiz_id}"))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["questionCount"], 0);
        assert_eq!(body["data"]["uniqueUserCount"], 0);
        assert_eq!(body["data"]["favoriteCount"], 0);
        assert_eq!(body["data"]["lastAttemptAt"], Value::Null);
    }

    #[tokio::test]
    async fn test_delete_quiz() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Chuyển động").await;

        let response = server
            .delete(&format!("/api/v1/quiz/delete-quiz/{quiz_id}"))
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Xoá quiz thành công");
        assert_eq!(body["data"]["title"], "Chuyển động");
    }
}

// =============================================================================
// Questions
// =============================================================================

mod questions {
    use super::*;

    async fn seed_question(server: &axum_test::TestServer, quiz_id: &str, text: &str) -> Value {
        let response = server
            .post("/api/v1/question/create-question")
            .authorization_bearer(admin_token())
            .json(&json!({
                "text": text,
                "quiz": quiz_id,
                "answers": [
                    { "text": "A", "isCorrect": true },
                    { "text": "B", "isCorrect": false },
                ],
            }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200, "seed question failed: {body}");
        body
    }

    #[tokio::test]
    async fn test_create_question_populates_quiz() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Chuyển động").await;

        let body = seed_question(&server, &quiz_id, "1 + 1 = ?").await;
        assert_eq!(body["message"], "Thêm thành công");
        assert_eq!(body["data"]["quiz"]["title"], "Chuyển động");
    }

    #[tokio::test]
    async fn test_list_defaults_to_ten_newest_first() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Chuyển động").await;

        for i in 0..12 {
            seed_question(&server, &quiz_id, &format!("Câu {i}")).await;
        }

        let response = server
            .get("/api/v1/question/get-questions")
            .add_query_param("quizId", &quiz_id)
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Lấy danh sách thành công");
        assert_eq!(body["data"]["page"], 1);
        assert_eq!(body["data"]["limit"], 10);
        assert_eq!(body["data"]["total"], 12);
        assert_eq!(body["data"]["totalPages"], 2);
        let items = body["data"]["data"].as_array().expect("data array");
        assert_eq!(items.len(), 10);
    }

    #[tokio::test]
    async fn test_delete_question_payload() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Chuyển động").await;
        let created = seed_question(&server, &quiz_id, "Câu 1").await;
        let question_id = created["data"]["_id"].as_str().expect("question id");

        let response = server
            .delete(&format!("/api/v1/question/delete-question/{question_id}"))
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["message"], "Xóa thành công");
        assert_eq!(body["data"]["message"], "Xóa câu hỏi thành công");
        assert_eq!(body["data"]["question"]["text"], "Câu 1");
    }
}

// =============================================================================
// Video lessons
// =============================================================================

mod video_lessons {
    use super::*;

    #[tokio::test]
    async fn test_create_normalizes_watch_url() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;

        let response = server
            .post("/api/v1/video-lesson/create")
            .authorization_bearer(admin_token())
            .json(&json!({
                "title": "Bài giảng 1",
                "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "topic": topic_id,
            }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Tạo video lesson thành công");
        assert_eq!(
            body["data"]["url"],
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(body["data"]["topic"]["name"], "Cơ học");
    }

    #[tokio::test]
    async fn test_list_filters_by_title_substring() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;

        for title in ["Dao động cơ", "Sóng cơ", "Dòng điện"] {
            let response = server
                .post("/api/v1/video-lesson/create")
                .authorization_bearer(admin_token())
                .json(&json!({
                    "title": title,
                    "url": "https://youtu.be/abc",
                    "topic": topic_id,
                }))
                .await;
            let body: Value = response.json();
            assert_eq!(body["status"], 200, "{body}");
        }

        let response = server
            .get("/api/v1/video-lesson/list")
            .add_query_param("search", "cơ")
            .await;
        let body: Value = response.json();
        assert_eq!(body["message"], "Lấy danh sách video lessons thành công");
        let items = body["data"]["data"].as_array().expect("data array");
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_detail_requires_admin() {
        let (server, _, _) = create_test_server();

        let response = server
            .get("/api/v1/video-lesson/detail/507f1f77bcf86cd799439022")
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Vui lòng đăng nhập để tiếp tục");
    }
}

// =============================================================================
// Users
// =============================================================================

mod users {
    use super::*;

    async fn create_user(server: &axum_test::TestServer, email: &str, fullname: &str) -> Value {
        let response = server
            .post("/api/v1/user/create-user")
            .authorization_bearer(admin_token())
            .json(&json!({
                "email": email,
                "password": "secret123",
                "fullname": fullname,
            }))
            .await;
        response.json()
    }

    #[tokio::test]
    async fn test_create_user_strips_password() {
        let (server, _, _) = create_test_server();
        let body = create_user(&server, "alice@scifun.vn", "Alice").await;

        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Tạo tài khoản thành công");
        assert_eq!(body["data"]["email"], "alice@scifun.vn");
        assert_eq!(body["data"]["isVerified"], true);
        assert!(body["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (server, _, _) = create_test_server();
        create_user(&server, "alice@scifun.vn", "Alice").await;
        let body = create_user(&server, "alice@scifun.vn", "Alice Again").await;

        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Email đã tồn tại trong hệ thống");
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (server, _, _) = create_test_server();
        create_user(&server, "alice@scifun.vn", "Alice").await;

        let response = server
            .post("/api/v1/user/login")
            .json(&json!({ "email": "alice@scifun.vn", "password": "secret123" }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Đăng nhập thành công");
        assert!(body["token"].as_str().is_some());
        assert!(body["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (server, _, _) = create_test_server();
        create_user(&server, "alice@scifun.vn", "Alice").await;

        let response = server
            .post("/api/v1/user/login")
            .json(&json!({ "email": "alice@scifun.vn", "password": "wrong" }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Sai mật khẩu");
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/api/v1/user/login")
            .json(&json!({ "email": "ghost@scifun.vn", "password": "x" }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Email không tồn tại");
    }

    #[tokio::test]
    async fn test_login_unverified_account() {
        let (server, store, _) = create_test_server();
        let hash = bcrypt::hash("secret123", 4).expect("hash failed");
        store
            .insert(
                "users",
                json!({ "email": "bob@scifun.vn", "password": hash }),
            )
            .await
            .expect("seed user failed");

        let response = server
            .post("/api/v1/user/login")
            .json(&json!({ "email": "bob@scifun.vn", "password": "secret123" }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Tài khoản chưa xác thực OTP");
    }

    #[tokio::test]
    async fn test_get_user_is_self_only() {
        let (server, store, _) = create_test_server();
        // The admin token in this suite carries this fixed user id
        let own_id = "507f1f77bcf86cd799439011";
        store
            .insert(
                "users",
                json!({
                    "_id": own_id,
                    "email": "admin@scifun.vn",
                    "password": "irrelevant",
                    "role": "ADMIN",
                }),
            )
            .await
            .expect("seed user failed");

        let response = server
            .get(&format!("/api/v1/user/get-user/{own_id}"))
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Lấy thông tin người dùng thành công");
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("isVerified").is_none());

        let response = server
            .get("/api/v1/user/get-user/507f1f77bcf86cd799439099")
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Bạn không có quyền truy cập thông tin này");
    }

    #[tokio::test]
    async fn test_user_list_searches_email_and_fullname() {
        let (server, _, _) = create_test_server();
        create_user(&server, "alice@scifun.vn", "Alice Nguyen").await;
        create_user(&server, "bob@scifun.vn", "Bob Tran").await;
        create_user(&server, "carol@scifun.vn", "Carol alice").await;

        let response = server
            .get("/api/v1/user/get-user-list")
            .authorization_bearer(admin_token())
            .add_query_param("search", "alice")
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Lấy danh sách người dùng thành công");
        let users = body["data"]["users"].as_array().expect("users array");
        assert_eq!(users.len(), 2);
        for user in users {
            assert!(user.get("password").is_none());
        }
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (server, _, _) = create_test_server();
        let created = create_user(&server, "alice@scifun.vn", "Alice").await;
        let id = created["data"]["_id"].as_str().expect("user id");

        let response = server
            .delete(&format!("/api/v1/user/delete-user/{id}"))
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Xóa người dùng thành công");
        assert!(body.get("data").is_none());
    }
}

// =============================================================================
// Quiz results
// =============================================================================

mod results {
    use super::*;

    #[tokio::test]
    async fn test_list_sorted_by_last_submission() {
        let (server, store, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Chuyển động").await;

        for (score, at) in [
            (6, "2026-01-01T00:00:00Z"),
            (9, "2026-03-01T00:00:00Z"),
            (7, "2026-02-01T00:00:00Z"),
        ] {
            store
                .insert(
                    "results",
                    json!({
                        "userId": "507f1f77bcf86cd799439055",
                        "quiz": quiz_id,
                        "bestScore": score,
                        "attempts": 1,
                        "averageScore": score,
                        "lastSubmissionAt": at,
                    }),
                )
                .await
                .expect("seed result failed");
        }

        let response = server.get("/api/v1/submisstion/get-all").await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Lấy danh sách thành công");
        let items = body["data"]["data"].as_array().expect("data array");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["bestScore"], 9);
        assert_eq!(items[2]["bestScore"], 6);
        // The quiz reference comes back populated
        assert_eq!(items[0]["quiz"]["title"], "Chuyển động");
    }
}
