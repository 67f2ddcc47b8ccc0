//! Delivery instances for the last loaded `(academicYear, semester)` scope.
//!
//! Loading a scope discards whatever the previous scope held. Uniqueness of
//! `(academicYear, semester, courseId)` is decided by the server; locally the
//! store only mirrors the listing it was given, keyed by that triple.

use std::collections::HashSet;

use catalog_shared::{
    domain::{CourseId, CourseInstance, InstanceKey, InstanceScope},
    error::ServiceError,
};
use tracing::warn;

pub const INSTANCE_ADDED: &str = "Course instance added successfully.";
pub const INSTANCE_ALREADY_EXISTS: &str = "Instance already exists.";
pub const INSTANCE_ADD_FAILED: &str = "Error adding instance.";
pub const INSTANCE_REMOVE_FAILED: &str = "Error deleting instance.";
pub const INSTANCE_LOAD_FAILED: &str = "Error loading instances.";

#[derive(Debug, Default, Clone)]
pub struct InstanceStore {
    scope: Option<InstanceScope>,
    instances: Vec<CourseInstance>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(&self) -> Option<InstanceScope> {
        self.scope
    }

    pub fn instances(&self) -> &[CourseInstance] {
        &self.instances
    }

    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.instances.iter().any(|i| &i.key() == key)
    }

    /// Replaces the held set with the listing for `scope`.
    pub fn load_scope(
        &mut self,
        scope: InstanceScope,
        instances: Vec<CourseInstance>,
    ) -> &[CourseInstance] {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(instances.len());
        for instance in instances {
            if instance.scope() != scope {
                warn!(
                    "instances: dropping out-of-scope record scope={} record={} course={}",
                    scope,
                    instance.scope(),
                    instance.course.course_id
                );
                continue;
            }
            if !seen.insert(instance.key()) {
                warn!(
                    "instances: duplicate record in listing scope={} course={}",
                    scope, instance.course.course_id
                );
                continue;
            }
            kept.push(instance);
        }
        self.scope = Some(scope);
        self.instances = kept;
        &self.instances
    }

    /// Drops every held instance of `course_id`, as after a cascading delete.
    pub fn forget_course(&mut self, course_id: &CourseId) -> usize {
        let before = self.instances.len();
        self.instances.retain(|i| &i.course.course_id != course_id);
        before - self.instances.len()
    }
}

/// User-facing wording for the outcome of an instance add.
pub fn add_outcome_message(result: &Result<(), ServiceError>) -> &'static str {
    match result {
        Ok(()) => INSTANCE_ADDED,
        Err(ServiceError::DuplicateKey) => INSTANCE_ALREADY_EXISTS,
        Err(_) => INSTANCE_ADD_FAILED,
    }
}

#[cfg(test)]
#[path = "tests/instance_store_tests.rs"]
mod tests;
