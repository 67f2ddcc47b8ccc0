use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, InstanceScope, Semester};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    pub academic_year: i32,
    pub semester: Semester,
    pub course_id: CourseId,
}

impl CreateInstanceRequest {
    pub fn new(scope: InstanceScope, course_id: CourseId) -> Self {
        Self {
            academic_year: scope.academic_year,
            semester: scope.semester,
            course_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteCourseQuery {
    pub force: bool,
}

/// Body of a 409 answer to a course deletion. The shape alone decides
/// whether the conflict can be overridden by a forced delete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConflictBody {
    OfferedYears(Vec<i32>),
    Message(String),
    Detailed { message: String },
}

impl ConflictBody {
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Self::Message(raw.trim().to_string()))
    }
}

/// Extracts a human-readable message from an error body: a JSON string,
/// a `{"message": ..}` object, or the raw text.
pub fn error_message_from_body(raw: &str) -> String {
    match serde_json::from_str::<ConflictBody>(raw) {
        Ok(ConflictBody::Message(message)) | Ok(ConflictBody::Detailed { message }) => message,
        _ => raw.trim().to_string(),
    }
}
