//! Typed views over the stored documents.
//!
//! The store itself moves `serde_json::Value` documents; these structs are
//! the typed shapes handlers and the mirror synchronizer deserialize into.
//! Field names serialize exactly as the collections store them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// A top-level subject such as "Toán" or "Vật lý".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Short course code, e.g. `PHY10`.
    #[serde(default)]
    pub code: Option<String>,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Cap on the number of topics this subject may hold.
    #[serde(rename = "maxTopics", default = "Subject::default_max_topics")]
    pub max_topics: u32,
    /// Cover image URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl Subject {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "subjects";

    fn default_max_topics() -> u32 {
        20
    }
}

/// A topic nested under a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owning subject id.
    pub subject: EntityId,
}

impl Topic {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "topics";
}

/// A quiz nested under a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Display title.
    pub title: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owning topic id.
    pub topic: EntityId,
    /// Time limit in minutes.
    pub duration: u32,
    /// Denormalized count of questions attached to this quiz.
    #[serde(rename = "questionCount", default)]
    pub question_count: u32,
    /// Number of distinct users who have submitted this quiz.
    #[serde(rename = "uniqueUserCount", default)]
    pub unique_user_count: u32,
    /// Favorite counter.
    #[serde(rename = "favoriteCount", default)]
    pub favorite_count: u32,
    /// Timestamp of the most recent submission, if any.
    #[serde(rename = "lastAttemptAt", default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl Quiz {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "quizzes";
}

/// One answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Option text shown to the user.
    pub text: String,
    /// Whether this option is the correct one.
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

/// A multiple-choice question belonging to a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Question text.
    pub text: String,
    /// Owning quiz id.
    pub quiz: EntityId,
    /// Answer options.
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// Optional explanation shown after answering.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "questions";
}

/// A video lesson attached to a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoLesson {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Display title.
    pub title: String,
    /// Embeddable video URL.
    pub url: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Owning topic id.
    pub topic: EntityId,
}

impl VideoLesson {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "videolessons";
}

/// One answered question inside a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionAnswer {
    /// Question id being answered.
    pub question: EntityId,
    /// The option text the user picked.
    #[serde(rename = "selectedAnswer")]
    pub selected_answer: String,
    /// Whether the pick was correct, graded at submission time.
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

/// A single graded quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Submitting user id.
    #[serde(rename = "userId")]
    pub user_id: EntityId,
    /// Quiz id.
    pub quiz: EntityId,
    /// The graded answers.
    pub answers: Vec<SubmissionAnswer>,
    /// Score on a 0..=10 scale.
    pub score: f64,
    /// Submission timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "submissions";
}

/// The rolled-up result of one user on one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// User id.
    #[serde(rename = "userId")]
    pub user_id: EntityId,
    /// Quiz id.
    pub quiz: EntityId,
    /// Best score over all attempts.
    #[serde(rename = "bestScore")]
    pub best_score: f64,
    /// Number of attempts.
    pub attempts: u32,
    /// Running average score.
    #[serde(rename = "averageScore")]
    pub average_score: f64,
    /// Timestamp of the latest submission.
    #[serde(rename = "lastSubmissionAt", default)]
    pub last_submission_at: Option<DateTime<Utc>>,
}

impl QuizResult {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "results";
}

/// User role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular authenticated user.
    #[serde(rename = "USER")]
    User,
    /// Administrator with write access to the catalog.
    #[serde(rename = "ADMIN")]
    Admin,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Login email, unique.
    pub email: String,
    /// bcrypt password hash. Stripped before any response leaves the API.
    #[serde(default)]
    pub password: Option<String>,
    /// Display name.
    #[serde(default = "User::default_fullname")]
    pub fullname: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Whether the account finished verification.
    #[serde(rename = "isVerified", default)]
    pub is_verified: bool,
    /// Role gate.
    #[serde(default = "User::default_role")]
    pub role: Role,
    /// Date of birth.
    #[serde(default)]
    pub dob: Option<DateTime<Utc>>,
    /// 0 female, 1 male.
    #[serde(default)]
    pub sex: Option<u8>,
}

impl User {
    /// Primary-store collection name.
    pub const COLLECTION: &'static str = "users";

    fn default_fullname() -> String {
        "New User".to_string()
    }

    fn default_role() -> Role {
        Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_deserializes_with_defaults() {
        let subject: Subject = serde_json::from_value(json!({
            "_id": "0123456789abcdef01234567",
            "name": "Toán"
        }))
        .unwrap();
        assert_eq!(subject.max_topics, 20);
        assert!(subject.description.is_none());
    }

    #[test]
    fn test_quiz_counters_default_to_zero() {
        let quiz: Quiz = serde_json::from_value(json!({
            "_id": "0123456789abcdef01234567",
            "title": "Kiểm tra 15 phút",
            "topic": "0123456789abcdef01234568",
            "duration": 15
        }))
        .unwrap();
        assert_eq!(quiz.question_count, 0);
        assert!(quiz.last_attempt_at.is_none());
    }

    #[test]
    fn test_role_round_trips_uppercase() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("ADMIN"));
        let role: Role = serde_json::from_value(json!("USER")).unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_user_password_is_optional() {
        let user: User = serde_json::from_value(json!({
            "_id": "0123456789abcdef01234567",
            "email": "a@b.c",
            "role": "USER"
        }))
        .unwrap();
        assert!(user.password.is_none());
        assert_eq!(user.fullname, "New User");
    }
}
