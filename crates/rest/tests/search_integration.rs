//! Search and dual-write integration tests.
//!
//! Exercises the mirror synchronizer through the API: list endpoints read
//! the search index only, so these tests double as visibility checks for
//! the write path.

mod common;

use serde_json::{Value, json};

use common::{admin_token, create_test_server, seed_quiz, seed_subject, seed_topic};
use scifun_persistence::index::{FailNext, SearchIndex};
use scifun_persistence::store::DocumentStore;

// =============================================================================
// Search behavior
// =============================================================================

mod search {
    use super::*;

    #[tokio::test]
    async fn test_created_subject_visible_in_list() {
        let (server, _, _) = create_test_server();
        seed_subject(&server, "Vật lý").await;

        let response = server.get("/api/v1/subject/get-subjects").await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Lấy danh sách môn học thành công");
        let subjects = body["data"]["subjects"].as_array().expect("subjects");
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0]["name"], "Vật lý");
        assert!(subjects[0]["_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_fuzzy_match_tolerates_typos() {
        let (server, _, _) = create_test_server();
        seed_subject(&server, "Physics").await;

        let response = server
            .get("/api/v1/subject/get-subjects")
            .add_query_param("search", "physic")
            .await;
        let body: Value = response.json();
        let subjects = body["data"]["subjects"].as_array().expect("subjects");
        assert_eq!(subjects.len(), 1);
    }

    #[tokio::test]
    async fn test_mostly_wrong_query_matches_nothing() {
        let (server, _, _) = create_test_server();
        seed_subject(&server, "mot hai ba bon").await;

        // Only two of four terms match, below the three-quarters floor
        let response = server
            .get("/api/v1/subject/get-subjects")
            .add_query_param("search", "mot hai xxxxx yyyyy")
            .await;
        let body: Value = response.json();
        let subjects = body["data"]["subjects"].as_array().expect("subjects");
        assert!(subjects.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_counters() {
        let (server, _, _) = create_test_server();
        for i in 0..5 {
            seed_subject(&server, &format!("Môn {i}")).await;
        }

        let response = server
            .get("/api/v1/subject/get-subjects")
            .add_query_param("page", 2)
            .add_query_param("limit", 2)
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["page"], 2);
        assert_eq!(body["data"]["limit"], 2);
        assert_eq!(body["data"]["total"], 5);
        assert_eq!(body["data"]["totalPages"], 3);
        let subjects = body["data"]["subjects"].as_array().expect("subjects");
        assert_eq!(subjects.len(), 2);
    }

    #[tokio::test]
    async fn test_unpaged_list_reports_single_page() {
        let (server, _, _) = create_test_server();
        for i in 0..3 {
            seed_subject(&server, &format!("Môn {i}")).await;
        }

        let response = server.get("/api/v1/subject/get-subjects").await;
        let body: Value = response.json();
        assert_eq!(body["data"]["page"], 1);
        assert_eq!(body["data"]["limit"], 3);
        assert_eq!(body["data"]["totalPages"], 1);
    }

    #[tokio::test]
    async fn test_topic_list_filters_by_subject() {
        let (server, _, _) = create_test_server();
        let physics = seed_subject(&server, "Vật lý").await;
        let chemistry = seed_subject(&server, "Hóa học").await;
        seed_topic(&server, &physics, "Cơ học").await;
        seed_topic(&server, &physics, "Quang học").await;
        seed_topic(&server, &chemistry, "Hữu cơ").await;

        let response = server
            .get("/api/v1/topic/get-topics")
            .add_query_param("subjectId", &physics)
            .await;
        let body: Value = response.json();
        assert_eq!(body["message"], "Lấy danh sách topic thành công");
        let topics = body["data"]["topics"].as_array().expect("topics");
        assert_eq!(topics.len(), 2);
        for topic in topics {
            assert_eq!(topic["subject"]["_id"], json!(physics));
        }
    }

    #[tokio::test]
    async fn test_quiz_list_embeds_parent_chain() {
        let (server, _, _) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Điện học").await;
        seed_quiz(&server, &topic_id, "Định luật Ôm").await;

        let response = server
            .get("/api/v1/quiz/get-quizzes")
            .add_query_param("topicId", &topic_id)
            .await;
        let body: Value = response.json();
        assert_eq!(body["message"], "Lấy danh sách quiz thành công");
        let quizzes = body["data"]["quizzes"].as_array().expect("quizzes");
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0]["topic"]["name"], "Điện học");
        assert_eq!(quizzes[0]["topic"]["subject"]["name"], "Vật lý");
    }
}

// =============================================================================
// Dual-write semantics
// =============================================================================

mod dual_write {
    use super::*;

    #[tokio::test]
    async fn test_update_resyncs_the_mirror() {
        let (server, _, index) = create_test_server();
        let id = seed_subject(&server, "Hóa học").await;

        server
            .put(&format!("/api/v1/subject/update-subject/{id}"))
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Hóa học 12" }))
            .await;

        let mirrored = index
            .get("subject", &id)
            .await
            .expect("index get failed")
            .expect("subject not mirrored");
        assert_eq!(mirrored["name"], "Hóa học 12");
    }

    #[tokio::test]
    async fn test_topic_mirror_goes_stale_on_subject_rename() {
        let (server, _, index) = create_test_server();
        let subject_id = seed_subject(&server, "Vật lý").await;
        let topic_id = seed_topic(&server, &subject_id, "Cơ học").await;

        server
            .put(&format!("/api/v1/subject/update-subject/{subject_id}"))
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Vật lý 12" }))
            .await;

        // The embedded snapshot is only refreshed when the topic itself
        // is written again
        let mirrored = index
            .get("topic", &topic_id)
            .await
            .expect("index get failed")
            .expect("topic not mirrored");
        assert_eq!(mirrored["subject"]["name"], "Vật lý");

        server
            .put(&format!("/api/v1/topic/update-topic/{topic_id}"))
            .authorization_bearer(admin_token())
            .json(&json!({ "description": "updated" }))
            .await;
        let mirrored = index
            .get("topic", &topic_id)
            .await
            .expect("index get failed")
            .expect("topic not mirrored");
        assert_eq!(mirrored["subject"]["name"], "Vật lý 12");
    }

    #[tokio::test]
    async fn test_index_failure_leaves_primary_committed() {
        let (server, store, index) = create_test_server();
        index.fail_next(FailNext::Put);

        let response = server
            .post("/api/v1/subject/create-subject")
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Vật lý" }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);

        // The primary write is not rolled back
        let count = store.count("subjects", &[]).await.expect("count failed");
        assert_eq!(count, 1);

        // And the mirror never saw the document
        let list: Value = server.get("/api/v1/subject/get-subjects").await.json();
        let subjects = list["data"]["subjects"].as_array().expect("subjects");
        assert!(subjects.is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_missing_mirror_reports_index_miss() {
        let (server, store, index) = create_test_server();
        let id = seed_subject(&server, "Vật lý").await;

        index
            .remove("subject", "Subject", &id)
            .await
            .expect("mirror remove failed");

        let response = server
            .delete(&format!("/api/v1/subject/delete-subject/{id}"))
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Subject không tồn tại trong Elasticsearch");

        // The primary delete already happened when the mirror miss surfaced
        let count = store.count("subjects", &[]).await.expect("count failed");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_deleted_quiz_leaves_list_and_index() {
        let (server, _, index) = create_test_server();
        let subject_id = seed_subject(&server, "Toán").await;
        let topic_id = seed_topic(&server, &subject_id, "Đại số").await;
        let quiz_id = seed_quiz(&server, &topic_id, "Phương trình bậc nhất").await;

        let response = server
            .delete(&format!("/api/v1/quiz/delete-quiz/{quiz_id}"))
            .authorization_bearer(admin_token())
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], 200, "{body}");

        let list: Value = server
            .get("/api/v1/quiz/get-quizzes")
            .add_query_param("topicId", &topic_id)
            .await
            .json();
        let quizzes = list["data"]["quizzes"].as_array().expect("quizzes");
        assert!(quizzes.is_empty());

        let mirrored = index.get("quiz", &quiz_id).await.expect("index get failed");
        assert!(mirrored.is_none());
    }

    #[tokio::test]
    async fn test_deleted_subject_leaves_the_index() {
        let (server, _, index) = create_test_server();
        let id = seed_subject(&server, "Vật lý").await;

        server
            .delete(&format!("/api/v1/subject/delete-subject/{id}"))
            .authorization_bearer(admin_token())
            .await;

        let mirrored = index.get("subject", &id).await.expect("index get failed");
        assert!(mirrored.is_none());
    }
}
