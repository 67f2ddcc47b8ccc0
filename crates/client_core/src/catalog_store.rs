//! Local working copy of the course catalog.
//!
//! The set is replaced wholesale on every reload. Facts derived from it,
//! such as whether a course is a prerequisite of another, are computed on
//! demand from the current set and never cached.

use catalog_shared::domain::{Course, CourseId};

pub const PREREQUISITE_DELETE_HINT: &str =
    "Cannot delete: course is a prerequisite for other courses.";

#[derive(Debug, Default, Clone)]
pub struct CatalogStore {
    courses: Vec<Course>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full set with a fresh server listing.
    pub fn load(&mut self, courses: Vec<Course>) -> &[Course] {
        self.courses = courses;
        &self.courses
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, course_id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| &c.course_id == course_id)
    }

    pub fn upsert(&mut self, course: Course) {
        match self
            .courses
            .iter_mut()
            .find(|c| c.course_id == course.course_id)
        {
            Some(existing) => *existing = course,
            None => self.courses.push(course),
        }
    }

    /// Drops a course locally. Only called once the server confirmed the delete.
    pub fn remove(&mut self, course_id: &CourseId) -> Option<Course> {
        let index = self.courses.iter().position(|c| &c.course_id == course_id)?;
        Some(self.courses.remove(index))
    }

    pub fn is_prerequisite_of_others(&self, course_id: &CourseId) -> bool {
        self.courses
            .iter()
            .filter(|c| &c.course_id != course_id)
            .any(|c| c.requires(course_id))
    }

    pub fn can_delete(&self, course_id: &CourseId) -> bool {
        !self.is_prerequisite_of_others(course_id)
    }

    /// Titles of the prerequisites that resolve in the current set.
    /// Dangling ids are skipped.
    pub fn prerequisite_titles<'a>(&'a self, course: &'a Course) -> Vec<&'a str> {
        course
            .prerequisite_ids()
            .into_iter()
            .filter_map(|id| self.get(id))
            .map(|c| c.title.as_str())
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/catalog_store_tests.rs"]
mod tests;
