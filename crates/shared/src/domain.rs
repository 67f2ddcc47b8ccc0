use std::fmt;

use serde::{Deserialize, Serialize};

/// Years offered by the scope selectors.
pub const ACADEMIC_YEAR_OPTIONS: [i32; 3] = [2024, 2025, 2026];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl CourseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Semester(u8);

impl Semester {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Semester> {
        (Self::MIN..=Self::MAX).map(Semester)
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "semester {value} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<Semester> for u8 {
    fn from(value: Semester) -> Self {
        value.0
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Semester {}", self.0)
    }
}

/// Denormalized `{courseId, title}` pair embedded in other records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub course_id: CourseId,
    #[serde(default)]
    pub title: String,
}

/// One entry of a resolved `prerequisites` list. Servers send either the
/// `{courseId, title}` pair or the bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrerequisiteEntry {
    Resolved(CourseRef),
    Bare(CourseId),
}

impl PrerequisiteEntry {
    pub fn course_id(&self) -> &CourseId {
        match self {
            Self::Resolved(course) => &course.course_id,
            Self::Bare(course_id) => course_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub academic_year: i32,
    pub semester: Semester,
    /// `None` when the server sent no id list or an explicit `null`.
    #[serde(default)]
    pub prerequisite_ids: Option<Vec<CourseId>>,
    /// Resolved prerequisites as some servers return them; never sent back.
    #[serde(default, skip_serializing)]
    pub prerequisites: Option<Vec<PrerequisiteEntry>>,
}

impl Course {
    /// Effective prerequisite ids: the explicit id list whenever the server
    /// sent one (even empty), otherwise the ids of the resolved
    /// `prerequisites` payload.
    pub fn prerequisite_ids(&self) -> Vec<&CourseId> {
        match &self.prerequisite_ids {
            Some(ids) => ids.iter().collect(),
            None => self
                .prerequisites
                .iter()
                .flatten()
                .map(PrerequisiteEntry::course_id)
                .collect(),
        }
    }

    pub fn requires(&self, course_id: &CourseId) -> bool {
        self.prerequisite_ids().into_iter().any(|id| id == course_id)
    }

    pub fn to_ref(&self) -> CourseRef {
        CourseRef {
            course_id: self.course_id.clone(),
            title: self.title.clone(),
        }
    }
}

/// The `(academicYear, semester)` pair an instance listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceScope {
    pub academic_year: i32,
    pub semester: Semester,
}

impl InstanceScope {
    pub fn new(academic_year: i32, semester: Semester) -> Self {
        Self {
            academic_year,
            semester,
        }
    }
}

impl fmt::Display for InstanceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.academic_year, self.semester.get())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    pub scope: InstanceScope,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInstance {
    pub academic_year: i32,
    pub semester: Semester,
    pub course: CourseRef,
}

impl CourseInstance {
    pub fn scope(&self) -> InstanceScope {
        InstanceScope::new(self.academic_year, self.semester)
    }

    pub fn key(&self) -> InstanceKey {
        InstanceKey {
            scope: self.scope(),
            course_id: self.course.course_id.clone(),
        }
    }
}
