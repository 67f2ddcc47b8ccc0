//! Course deletion: plain request, conflict presentation and the optional
//! forced cascade.
//!
//! The remote call itself happens outside this type. Callers move the state
//! machine into an in-flight state with [`DeletionProtocol::request`] or
//! [`DeletionProtocol::confirm_force`], await the service, then feed the
//! outcome to [`DeletionProtocol::resolve`]. While a call is in flight every
//! other transition is refused with [`DeletionError::Busy`].

use catalog_shared::{
    domain::CourseId,
    error::{join_years, ServiceError},
};
use thiserror::Error;

use crate::catalog_store::CatalogStore;

pub const DELETE_SERVER_ERROR: &str = "Server error while deleting course.";
pub const FORCE_DELETE_SERVER_ERROR: &str = "Server error while force-deleting.";

pub fn offered_conflict_message(years_offered: &[i32]) -> String {
    format!(
        "This course has been offered in {}. Deleting it will remove the course from those \
         offerings as well. Do you want to proceed?",
        join_years(years_offered)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// Existing offerings block the delete; a forced delete removes them too.
    Offered { years_offered: Vec<i32> },
    /// The server refused with an explanation; not overridable here.
    Blocked,
    /// Transport or unexpected server failure.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionConflict {
    pub course_id: CourseId,
    pub message: String,
    pub kind: ConflictKind,
}

impl DeletionConflict {
    pub fn force_available(&self) -> bool {
        matches!(self.kind, ConflictKind::Offered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeletionState {
    #[default]
    Idle,
    ConfirmRequested {
        course_id: CourseId,
    },
    ConflictPresented(DeletionConflict),
    ForceConfirmed {
        course_id: CourseId,
        years_offered: Vec<i32>,
    },
    ResolvedSuccess {
        course_id: CourseId,
        forced: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeletionError {
    #[error("course {0} is a prerequisite for other courses")]
    ReferencedAsPrerequisite(CourseId),
    #[error("a deletion is already in flight for course {0}")]
    Busy(CourseId),
    #[error("the pending conflict cannot be overridden by a forced delete")]
    NoForceOption,
    #[error("no deletion is pending")]
    NothingPending,
}

#[derive(Debug, Default)]
pub struct DeletionProtocol {
    state: DeletionState,
}

impl DeletionProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<&CourseId> {
        match &self.state {
            DeletionState::ConfirmRequested { course_id }
            | DeletionState::ForceConfirmed { course_id, .. } => Some(course_id),
            _ => None,
        }
    }

    pub fn conflict(&self) -> Option<&DeletionConflict> {
        match &self.state {
            DeletionState::ConflictPresented(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Starts a plain delete of `course_id`. Courses other courses depend on
    /// never enter the protocol.
    pub fn request(
        &mut self,
        course_id: &CourseId,
        catalog: &CatalogStore,
    ) -> Result<(), DeletionError> {
        if let Some(pending) = self.in_flight() {
            return Err(DeletionError::Busy(pending.clone()));
        }
        if catalog.is_prerequisite_of_others(course_id) {
            return Err(DeletionError::ReferencedAsPrerequisite(course_id.clone()));
        }
        self.state = DeletionState::ConfirmRequested {
            course_id: course_id.clone(),
        };
        Ok(())
    }

    /// Accepts the cascade offered by the presented conflict and returns the
    /// course to force-delete.
    pub fn confirm_force(&mut self) -> Result<CourseId, DeletionError> {
        let conflict = match &self.state {
            DeletionState::ConflictPresented(conflict) => conflict,
            DeletionState::ConfirmRequested { course_id }
            | DeletionState::ForceConfirmed { course_id, .. } => {
                return Err(DeletionError::Busy(course_id.clone()))
            }
            _ => return Err(DeletionError::NothingPending),
        };
        let ConflictKind::Offered { years_offered } = &conflict.kind else {
            return Err(DeletionError::NoForceOption);
        };
        let course_id = conflict.course_id.clone();
        let years_offered = years_offered.clone();
        self.state = DeletionState::ForceConfirmed {
            course_id: course_id.clone(),
            years_offered,
        };
        Ok(course_id)
    }

    /// Applies the service outcome of the call currently in flight.
    pub fn resolve(
        &mut self,
        outcome: Result<(), ServiceError>,
    ) -> Result<&DeletionState, DeletionError> {
        let next = match (std::mem::take(&mut self.state), outcome) {
            (DeletionState::ConfirmRequested { course_id }, Ok(())) => {
                DeletionState::ResolvedSuccess {
                    course_id,
                    forced: false,
                }
            }
            (DeletionState::ConfirmRequested { course_id }, Err(err)) => {
                DeletionState::ConflictPresented(plain_conflict(course_id, err))
            }
            (DeletionState::ForceConfirmed { course_id, .. }, Ok(())) => {
                DeletionState::ResolvedSuccess {
                    course_id,
                    forced: true,
                }
            }
            (
                DeletionState::ForceConfirmed {
                    course_id,
                    years_offered,
                },
                Err(_),
            ) => DeletionState::ConflictPresented(DeletionConflict {
                course_id,
                message: FORCE_DELETE_SERVER_ERROR.to_string(),
                kind: ConflictKind::Offered { years_offered },
            }),
            (settled, _) => {
                self.state = settled;
                return Err(DeletionError::NothingPending);
            }
        };
        self.state = next;
        Ok(&self.state)
    }

    /// Dismisses a presented conflict or an acknowledged success.
    pub fn cancel(&mut self) -> Result<(), DeletionError> {
        if let Some(pending) = self.in_flight() {
            return Err(DeletionError::Busy(pending.clone()));
        }
        self.state = DeletionState::Idle;
        Ok(())
    }
}

fn plain_conflict(course_id: CourseId, err: ServiceError) -> DeletionConflict {
    let (message, kind) = match err {
        ServiceError::OfferedConflict { years_offered } => (
            offered_conflict_message(&years_offered),
            ConflictKind::Offered { years_offered },
        ),
        ServiceError::Conflict(message) => (message, ConflictKind::Blocked),
        _ => (DELETE_SERVER_ERROR.to_string(), ConflictKind::Failed),
    };
    DeletionConflict {
        course_id,
        message,
        kind,
    }
}

#[cfg(test)]
#[path = "tests/deletion_tests.rs"]
mod tests;
