//! Create-or-update forms for courses and delivery instances.
//!
//! A session moves `Draft -> Submitting -> (Closed | DraftWithError)`.
//! Required fields are only checked for presence, the way a native form
//! input would; everything else is for the server to judge.

use std::collections::HashSet;

use catalog_shared::{
    domain::{Course, CourseId, InstanceScope, Semester},
    error::ServiceError,
};
use thiserror::Error;

use crate::instance_store::add_outcome_message;

/// Value of the "None" entry in the prerequisite picker.
pub const NO_PREREQUISITE: &str = "-";
pub const COURSE_ADD_FAILED: &str = "Error adding course.";
pub const COURSE_UPDATE_FAILED: &str = "Error updating course.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit { course_id: CourseId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Draft,
    Submitting,
    DraftWithError(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("the form has been closed")]
    Closed,
    #[error("no submission is in flight")]
    NotSubmitting,
    #[error("course id {0} cannot change while editing")]
    ImmutableCourseId(CourseId),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be a whole number, got `{value}`")]
    InvalidNumber { field: &'static str, value: String },
}

/// Field set backing an [`EditSession`].
pub trait FormModel: Default + Clone {
    type Payload;

    fn payload(&self, mode: &EditMode) -> Result<Self::Payload, EditError>;
    fn failure_message(mode: &EditMode, err: &ServiceError) -> String;
}

#[derive(Debug, Clone)]
pub struct EditSession<F: FormModel> {
    mode: EditMode,
    form: F,
    state: SessionState,
}

impl<F: FormModel> EditSession<F> {
    fn open(mode: EditMode, form: F) -> Self {
        Self {
            mode,
            form,
            state: SessionState::Draft,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SessionState::Submitting
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::DraftWithError(message) => Some(message),
            _ => None,
        }
    }

    fn editable(&mut self) -> Result<&mut F, EditError> {
        match self.state {
            SessionState::Submitting => Err(EditError::AlreadySubmitting),
            SessionState::Closed => Err(EditError::Closed),
            SessionState::Draft | SessionState::DraftWithError(_) => Ok(&mut self.form),
        }
    }

    /// Builds the payload and enters `Submitting`. A form with an empty
    /// required field stays where it was.
    pub fn begin_submit(&mut self) -> Result<F::Payload, EditError> {
        self.editable()?;
        let payload = self.form.payload(&self.mode)?;
        self.state = SessionState::Submitting;
        Ok(payload)
    }

    pub fn finish(&mut self, outcome: Result<(), ServiceError>) -> Result<&SessionState, EditError> {
        if self.state != SessionState::Submitting {
            return Err(EditError::NotSubmitting);
        }
        self.state = match outcome {
            Ok(()) => {
                self.form = F::default();
                SessionState::Closed
            }
            Err(err) => SessionState::DraftWithError(F::failure_message(&self.mode, &err)),
        };
        Ok(&self.state)
    }

    /// Discards the draft.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        if self.is_submitting() {
            return Err(EditError::AlreadySubmitting);
        }
        self.form = F::default();
        self.state = SessionState::Closed;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseForm {
    pub title: String,
    pub course_id: String,
    pub description: String,
    /// Raw text of the year input.
    pub academic_year: String,
    pub semester: Option<Semester>,
    prerequisite_ids: Vec<CourseId>,
}

impl CourseForm {
    pub fn prerequisite_ids(&self) -> &[CourseId] {
        &self.prerequisite_ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSubmission {
    pub mode: EditMode,
    pub course: Course,
}

impl FormModel for CourseForm {
    type Payload = CourseSubmission;

    fn payload(&self, mode: &EditMode) -> Result<CourseSubmission, EditError> {
        require("title", &self.title)?;
        require("courseId", &self.course_id)?;
        require("academicYear", &self.academic_year)?;
        require("description", &self.description)?;
        let semester = self.semester.ok_or(EditError::MissingField("semester"))?;
        let academic_year = self.academic_year.trim().parse::<i32>().map_err(|_| {
            EditError::InvalidNumber {
                field: "academicYear",
                value: self.academic_year.clone(),
            }
        })?;
        let course_id = match mode {
            EditMode::Create => CourseId::new(self.course_id.clone()),
            EditMode::Edit { course_id } => course_id.clone(),
        };

        Ok(CourseSubmission {
            mode: mode.clone(),
            course: Course {
                course_id,
                title: self.title.clone(),
                description: self.description.clone(),
                academic_year,
                semester,
                prerequisite_ids: Some(self.prerequisite_ids.clone()),
                prerequisites: None,
            },
        })
    }

    fn failure_message(mode: &EditMode, err: &ServiceError) -> String {
        match (err, mode) {
            (ServiceError::ValidationRejected(message), _) => message.clone(),
            (_, EditMode::Create) => COURSE_ADD_FAILED.to_string(),
            (_, EditMode::Edit { .. }) => COURSE_UPDATE_FAILED.to_string(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), EditError> {
    if value.is_empty() {
        return Err(EditError::MissingField(field));
    }
    Ok(())
}

impl EditSession<CourseForm> {
    pub fn create() -> Self {
        Self::open(EditMode::Create, CourseForm::default())
    }

    pub fn edit(course: &Course) -> Self {
        let form = CourseForm {
            title: course.title.clone(),
            course_id: course.course_id.0.clone(),
            description: course.description.clone(),
            academic_year: course.academic_year.to_string(),
            semester: Some(course.semester),
            prerequisite_ids: course.prerequisite_ids().into_iter().cloned().collect(),
        };
        Self::open(
            EditMode::Edit {
                course_id: course.course_id.clone(),
            },
            form,
        )
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), EditError> {
        self.editable()?.title = title.into();
        Ok(())
    }

    pub fn set_course_id(&mut self, course_id: impl Into<String>) -> Result<(), EditError> {
        if let EditMode::Edit { course_id: fixed } = &self.mode {
            return Err(EditError::ImmutableCourseId(fixed.clone()));
        }
        self.editable()?.course_id = course_id.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditError> {
        self.editable()?.description = description.into();
        Ok(())
    }

    pub fn set_academic_year(&mut self, year: impl Into<String>) -> Result<(), EditError> {
        self.editable()?.academic_year = year.into();
        Ok(())
    }

    pub fn set_semester(&mut self, semester: Option<Semester>) -> Result<(), EditError> {
        self.editable()?.semester = semester;
        Ok(())
    }

    /// Replaces the prerequisite selection with the picker's selected values.
    /// The "None" entry is dropped, so picking it next to real courses
    /// yields just those courses.
    pub fn select_prerequisites<I, S>(&mut self, selected: I) -> Result<(), EditError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let ids = selected
            .into_iter()
            .filter(|value| value.as_ref() != NO_PREREQUISITE)
            .map(|value| CourseId::new(value.as_ref()))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        self.editable()?.prerequisite_ids = ids;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceForm {
    pub academic_year: Option<i32>,
    pub semester: Option<Semester>,
    pub course_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSubmission {
    pub scope: InstanceScope,
    pub course_id: CourseId,
}

impl FormModel for InstanceForm {
    type Payload = InstanceSubmission;

    fn payload(&self, _mode: &EditMode) -> Result<InstanceSubmission, EditError> {
        let academic_year = self
            .academic_year
            .ok_or(EditError::MissingField("academicYear"))?;
        let semester = self.semester.ok_or(EditError::MissingField("semester"))?;
        require("courseId", &self.course_id)?;
        Ok(InstanceSubmission {
            scope: InstanceScope::new(academic_year, semester),
            course_id: CourseId::new(self.course_id.clone()),
        })
    }

    fn failure_message(_mode: &EditMode, err: &ServiceError) -> String {
        add_outcome_message(&Err(err.clone())).to_string()
    }
}

impl EditSession<InstanceForm> {
    /// Opens an add-instance form, pre-selecting the loaded scope if any.
    pub fn for_scope(scope: Option<InstanceScope>) -> Self {
        let form = InstanceForm {
            academic_year: scope.map(|s| s.academic_year),
            semester: scope.map(|s| s.semester),
            course_id: String::new(),
        };
        Self::open(EditMode::Create, form)
    }

    pub fn set_scope(
        &mut self,
        academic_year: Option<i32>,
        semester: Option<Semester>,
    ) -> Result<(), EditError> {
        let form = self.editable()?;
        form.academic_year = academic_year;
        form.semester = semester;
        Ok(())
    }

    pub fn select_course(&mut self, course_id: impl Into<String>) -> Result<(), EditError> {
        self.editable()?.course_id = course_id.into();
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/edit_session_tests.rs"]
mod tests;
