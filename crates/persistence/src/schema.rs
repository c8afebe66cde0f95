//! Collection schemas and document validation.
//!
//! Instead of annotation-driven mapping, each collection declares its field
//! set as plain data ([`FieldSpec`] / [`CollectionSchema`]) and every write
//! goes through the generic [`validate`] function. Inserts are validated in
//! full with defaults applied first; updates validate only the fields
//! present in the patch. Fields not declared by the schema are rejected,
//! mirroring the original API's whitelist behavior.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::error::ValidationError;
use crate::id::EntityId;

/// Default subject/avatar image URLs carried over from the deployed data.
pub const DEFAULT_SUBJECT_IMAGE: &str =
    "https://res.cloudinary.com/dglm2f7sr/image/upload/v1761400287/default_gdfbhs.png";
/// Default user avatar URL.
pub const DEFAULT_AVATAR: &str =
    "https://res.cloudinary.com/dglm2f7sr/image/upload/v1761373988/default_awmzq0.jpg";

/// The type of a document field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// UTF-8 string.
    String,
    /// Any JSON number.
    Number,
    /// Boolean.
    Bool,
    /// RFC 3339 date-time string (or null when optional).
    Date,
    /// A 24-hex entity identifier referencing another collection.
    Id,
    /// A string restricted to a fixed set of values.
    Enum(&'static [&'static str]),
    /// A homogeneous array.
    Array(Box<FieldKind>),
    /// A nested object with its own field list.
    Object(Vec<FieldSpec>),
}

/// Declaration of a single field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name as serialized.
    pub name: &'static str,
    /// Field type.
    pub kind: FieldKind,
    /// Whether the field must be present on insert.
    pub required: bool,
    /// Minimum numeric value, when the kind is `Number`.
    pub min: Option<f64>,
    /// Default applied on insert when the field is absent.
    pub default: Option<Value>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            min: None,
            default: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// The field set of one collection.
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    /// Collection name in the primary store.
    pub collection: &'static str,
    /// Declared fields.
    pub fields: Vec<FieldSpec>,
}

/// Whether a document is being inserted or patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateMode {
    /// Full document: required fields enforced.
    Insert,
    /// Partial document: only present fields checked.
    Update,
}

/// Fills in schema defaults for fields absent from `doc`.
///
/// Only meaningful before an insert; updates never invent fields.
pub fn apply_defaults(schema: &CollectionSchema, doc: &mut Value) {
    let Some(obj) = doc.as_object_mut() else {
        return;
    };
    for spec in &schema.fields {
        if let Some(default) = &spec.default {
            obj.entry(spec.name.to_string())
                .or_insert_with(|| default.clone());
        }
    }
}

/// Validates `doc` against `schema`.
///
/// `_id` is always accepted. Unknown fields are rejected in both modes.
pub fn validate(
    schema: &CollectionSchema,
    doc: &Value,
    mode: ValidateMode,
) -> Result<(), ValidationError> {
    let obj = doc.as_object().ok_or_else(|| ValidationError::InvalidField {
        field: schema.collection.to_string(),
        message: "document must be a JSON object".to_string(),
    })?;

    for key in obj.keys() {
        if key != "_id" && !schema.fields.iter().any(|f| f.name == key) {
            return Err(ValidationError::UnknownField { field: key.clone() });
        }
    }

    for spec in &schema.fields {
        match obj.get(spec.name) {
            Some(value) => check_field(spec, value)?,
            None => {
                if mode == ValidateMode::Insert && spec.required {
                    return Err(ValidationError::MissingRequiredField {
                        field: spec.name.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn check_field(spec: &FieldSpec, value: &Value) -> Result<(), ValidationError> {
    if value.is_null() {
        if spec.required {
            return Err(ValidationError::InvalidField {
                field: spec.name.to_string(),
                message: "required field cannot be null".to_string(),
            });
        }
        return Ok(());
    }
    check_kind(spec.name, &spec.kind, value)?;

    if let (Some(min), Some(n)) = (spec.min, value.as_f64()) {
        if n < min {
            return Err(ValidationError::InvalidField {
                field: spec.name.to_string(),
                message: format!("must be at least {}", min),
            });
        }
    }
    Ok(())
}

fn check_kind(field: &str, kind: &FieldKind, value: &Value) -> Result<(), ValidationError> {
    let invalid = |message: &str| ValidationError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    };

    match kind {
        FieldKind::String => {
            value.as_str().ok_or_else(|| invalid("expected a string"))?;
        }
        FieldKind::Number => {
            if !value.is_number() {
                return Err(invalid("expected a number"));
            }
        }
        FieldKind::Bool => {
            value.as_bool().ok_or_else(|| invalid("expected a boolean"))?;
        }
        FieldKind::Date => {
            let s = value.as_str().ok_or_else(|| invalid("expected a date string"))?;
            chrono::DateTime::parse_from_rfc3339(s)
                .map_err(|_| invalid("expected an RFC 3339 date"))?;
        }
        FieldKind::Id => {
            let s = value.as_str().ok_or_else(|| invalid("expected an id string"))?;
            if !EntityId::is_valid(s) {
                return Err(ValidationError::InvalidIdentifier {
                    value: s.to_string(),
                });
            }
        }
        FieldKind::Enum(allowed) => {
            let matched = match value.as_str() {
                Some(s) => allowed.contains(&s),
                // sex is stored as 0|1 in the original schema
                None => value
                    .as_i64()
                    .map(|n| allowed.contains(&n.to_string().as_str()))
                    .unwrap_or(false),
            };
            if !matched {
                return Err(invalid(&format!("expected one of {:?}", allowed)));
            }
        }
        FieldKind::Array(inner) => {
            let arr = value.as_array().ok_or_else(|| invalid("expected an array"))?;
            for item in arr {
                check_kind(field, inner, item)?;
            }
        }
        FieldKind::Object(fields) => {
            let obj = value.as_object().ok_or_else(|| invalid("expected an object"))?;
            for key in obj.keys() {
                if key != "_id" && !fields.iter().any(|f| f.name == key) {
                    return Err(ValidationError::UnknownField {
                        field: format!("{}.{}", field, key),
                    });
                }
            }
            for spec in fields {
                match obj.get(spec.name) {
                    Some(v) => check_field(spec, v)?,
                    None => {
                        if spec.required {
                            return Err(ValidationError::MissingRequiredField {
                                field: format!("{}.{}", field, spec.name),
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn subject_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "subjects",
        fields: vec![
            FieldSpec::new("name", FieldKind::String).required(),
            FieldSpec::new("code", FieldKind::String),
            FieldSpec::new("description", FieldKind::String),
            FieldSpec::new("maxTopics", FieldKind::Number).default(Value::from(20)),
            FieldSpec::new("image", FieldKind::String)
                .default(Value::from(DEFAULT_SUBJECT_IMAGE)),
        ],
    }
}

fn topic_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "topics",
        fields: vec![
            FieldSpec::new("name", FieldKind::String).required(),
            FieldSpec::new("description", FieldKind::String),
            FieldSpec::new("subject", FieldKind::Id).required(),
        ],
    }
}

fn quiz_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "quizzes",
        fields: vec![
            FieldSpec::new("title", FieldKind::String).required(),
            FieldSpec::new("description", FieldKind::String),
            FieldSpec::new("topic", FieldKind::Id).required(),
            FieldSpec::new("duration", FieldKind::Number).required().min(1.0),
            FieldSpec::new("questionCount", FieldKind::Number)
                .min(0.0)
                .default(Value::from(0)),
            FieldSpec::new("uniqueUserCount", FieldKind::Number).default(Value::from(0)),
            FieldSpec::new("favoriteCount", FieldKind::Number).default(Value::from(0)),
            FieldSpec::new("lastAttemptAt", FieldKind::Date).default(Value::Null),
        ],
    }
}

fn answer_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("text", FieldKind::String).required(),
        FieldSpec::new("isCorrect", FieldKind::Bool).required(),
    ]
}

fn question_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "questions",
        fields: vec![
            FieldSpec::new("text", FieldKind::String).required(),
            FieldSpec::new("quiz", FieldKind::Id).required(),
            FieldSpec::new(
                "answers",
                FieldKind::Array(Box::new(FieldKind::Object(answer_fields()))),
            ),
            FieldSpec::new("explanation", FieldKind::String),
        ],
    }
}

fn video_lesson_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "videolessons",
        fields: vec![
            FieldSpec::new("title", FieldKind::String).required(),
            FieldSpec::new("url", FieldKind::String).required(),
            FieldSpec::new("duration", FieldKind::Number).min(0.0),
            FieldSpec::new("topic", FieldKind::Id).required(),
        ],
    }
}

fn submission_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "submissions",
        fields: vec![
            FieldSpec::new("userId", FieldKind::Id).required(),
            FieldSpec::new("quiz", FieldKind::Id).required(),
            FieldSpec::new(
                "answers",
                FieldKind::Array(Box::new(FieldKind::Object(vec![
                    FieldSpec::new("question", FieldKind::Id).required(),
                    FieldSpec::new("selectedAnswer", FieldKind::String).required(),
                    FieldSpec::new("isCorrect", FieldKind::Bool).required(),
                ]))),
            )
            .required(),
            FieldSpec::new("score", FieldKind::Number).required(),
            FieldSpec::new("createdAt", FieldKind::Date),
        ],
    }
}

fn result_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "results",
        fields: vec![
            FieldSpec::new("userId", FieldKind::Id).required(),
            FieldSpec::new("quiz", FieldKind::Id).required(),
            FieldSpec::new("bestScore", FieldKind::Number).required(),
            FieldSpec::new("attempts", FieldKind::Number).required().default(Value::from(0)),
            FieldSpec::new("averageScore", FieldKind::Number)
                .required()
                .default(Value::from(0)),
            FieldSpec::new("lastSubmissionAt", FieldKind::Date).default(Value::Null),
            FieldSpec::new("createdAt", FieldKind::Date),
        ],
    }
}

fn user_schema() -> CollectionSchema {
    CollectionSchema {
        collection: "users",
        fields: vec![
            FieldSpec::new("email", FieldKind::String).required(),
            FieldSpec::new("password", FieldKind::String).required(),
            FieldSpec::new("fullname", FieldKind::String).default(Value::from("New User")),
            FieldSpec::new("otp", FieldKind::String),
            FieldSpec::new("otpExpires", FieldKind::Date),
            FieldSpec::new("isVerified", FieldKind::Bool).default(Value::from(false)),
            FieldSpec::new("avatar", FieldKind::String).default(Value::from(DEFAULT_AVATAR)),
            FieldSpec::new("role", FieldKind::Enum(&["USER", "ADMIN"]))
                .required()
                .default(Value::from("USER")),
            FieldSpec::new("dob", FieldKind::Date)
                .default(Value::from("2000-01-01T00:00:00Z")),
            FieldSpec::new("sex", FieldKind::Enum(&["0", "1"])).default(Value::from(1)),
            FieldSpec::new("createdAt", FieldKind::Date),
            FieldSpec::new("updatedAt", FieldKind::Date),
        ],
    }
}

/// Returns the schema for a collection, or `None` for unknown collections.
pub fn schema_for(collection: &str) -> Option<&'static CollectionSchema> {
    static REGISTRY: OnceLock<HashMap<&'static str, CollectionSchema>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| {
            [
                subject_schema(),
                topic_schema(),
                quiz_schema(),
                question_schema(),
                video_lesson_schema(),
                submission_schema(),
                result_schema(),
                user_schema(),
            ]
            .into_iter()
            .map(|s| (s.collection, s))
            .collect()
        })
        .get(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_insert_defaults() {
        let schema = schema_for("subjects").unwrap();
        let mut doc = json!({"name": "Toán"});
        apply_defaults(schema, &mut doc);
        assert_eq!(doc["maxTopics"], 20);
        assert_eq!(doc["image"], DEFAULT_SUBJECT_IMAGE);
        assert!(validate(schema, &doc, ValidateMode::Insert).is_ok());
    }

    #[test]
    fn test_insert_missing_required() {
        let schema = schema_for("topics").unwrap();
        let doc = json!({"name": "Đại số"});
        let err = validate(schema, &doc, ValidateMode::Insert).unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequiredField { ref field } if field == "subject"));
    }

    #[test]
    fn test_update_partial_ok() {
        let schema = schema_for("topics").unwrap();
        // missing required fields are fine on update
        let doc = json!({"description": "mới"});
        assert!(validate(schema, &doc, ValidateMode::Update).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let schema = schema_for("subjects").unwrap();
        let doc = json!({"name": "Lý", "bogus": true});
        let err = validate(schema, &doc, ValidateMode::Update).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { ref field } if field == "bogus"));
    }

    #[test]
    fn test_id_field_format() {
        let schema = schema_for("quizzes").unwrap();
        let doc = json!({"topic": "nope"});
        let err = validate(schema, &doc, ValidateMode::Update).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_quiz_duration_min() {
        let schema = schema_for("quizzes").unwrap();
        let doc = json!({
            "title": "Quiz",
            "topic": "0123456789abcdef01234567",
            "duration": 0
        });
        let err = validate(schema, &doc, ValidateMode::Insert).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { ref field, .. } if field == "duration"));
    }

    #[test]
    fn test_nested_answers_validated() {
        let schema = schema_for("questions").unwrap();
        let doc = json!({
            "text": "2+2?",
            "quiz": "0123456789abcdef01234567",
            "answers": [{"text": "4", "isCorrect": true}, {"text": "5"}]
        });
        let err = validate(schema, &doc, ValidateMode::Insert).unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequiredField { ref field } if field == "answers.isCorrect"));
    }

    #[test]
    fn test_user_role_enum() {
        let schema = schema_for("users").unwrap();
        let doc = json!({"role": "ROOT"});
        assert!(validate(schema, &doc, ValidateMode::Update).is_err());
        let doc = json!({"role": "ADMIN"});
        assert!(validate(schema, &doc, ValidateMode::Update).is_ok());
    }

    #[test]
    fn test_nullable_optional_field() {
        let schema = schema_for("quizzes").unwrap();
        let doc = json!({"lastAttemptAt": null});
        assert!(validate(schema, &doc, ValidateMode::Update).is_ok());
    }
}
