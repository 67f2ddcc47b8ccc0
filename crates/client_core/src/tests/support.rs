use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use catalog_shared::{
    domain::{Course, CourseId, CourseInstance, InstanceScope, Semester},
    error::ServiceError,
};
use tokio::sync::{Mutex, Notify};

use crate::service::{CatalogService, ServiceResult};

pub(crate) fn semester(value: u8) -> Semester {
    Semester::new(value).expect("semester in range")
}

pub(crate) fn scope(year: i32, value: u8) -> InstanceScope {
    InstanceScope::new(year, semester(value))
}

pub(crate) fn course(id: &str, title: &str, description: &str, prerequisites: &[&str]) -> Course {
    Course {
        course_id: CourseId::from(id),
        title: title.to_string(),
        description: description.to_string(),
        academic_year: 2025,
        semester: semester(1),
        prerequisite_ids: Some(prerequisites.iter().map(|p| CourseId::from(*p)).collect()),
        prerequisites: None,
    }
}

pub(crate) fn instance(year: i32, value: u8, id: &str, title: &str) -> CourseInstance {
    CourseInstance {
        academic_year: year,
        semester: semester(value),
        course: catalog_shared::domain::CourseRef {
            course_id: CourseId::from(id),
            title: title.to_string(),
        },
    }
}

/// In-memory catalog server. Scripted replies take precedence over the
/// simulated behaviour, one per call.
#[derive(Default)]
pub(crate) struct ScriptedCatalogService {
    pub courses: Mutex<Vec<Course>>,
    pub instances: Mutex<Vec<CourseInstance>>,
    pub delete_replies: Mutex<VecDeque<ServiceResult<()>>>,
    pub save_failures: Mutex<VecDeque<ServiceError>>,
    pub delete_gate: Option<Arc<Notify>>,
    pub saved: Mutex<Vec<Course>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedCatalogService {
    pub(crate) fn with_catalog(courses: Vec<Course>, instances: Vec<CourseInstance>) -> Self {
        Self {
            courses: Mutex::new(courses),
            instances: Mutex::new(instances),
            ..Self::default()
        }
    }

    pub(crate) async fn script_delete(&self, reply: ServiceResult<()>) {
        self.delete_replies.lock().await.push_back(reply);
    }

    pub(crate) async fn script_save_failure(&self, err: ServiceError) {
        self.save_failures.lock().await.push_back(err);
    }

    pub(crate) async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }

    async fn cascade(&self, course_id: &CourseId) {
        self.courses
            .lock()
            .await
            .retain(|c| &c.course_id != course_id);
        self.instances
            .lock()
            .await
            .retain(|i| &i.course.course_id != course_id);
    }
}

#[async_trait]
impl CatalogService for ScriptedCatalogService {
    async fn list_courses(&self) -> ServiceResult<Vec<Course>> {
        self.record("list_courses".into()).await;
        Ok(self.courses.lock().await.clone())
    }

    async fn create_course(&self, course: &Course) -> ServiceResult<Course> {
        self.record(format!("create_course {}", course.course_id)).await;
        if let Some(err) = self.save_failures.lock().await.pop_front() {
            return Err(err);
        }
        let mut courses = self.courses.lock().await;
        if courses.iter().any(|c| c.course_id == course.course_id) {
            return Err(ServiceError::Conflict("course id already taken".into()));
        }
        courses.push(course.clone());
        self.saved.lock().await.push(course.clone());
        Ok(course.clone())
    }

    async fn update_course(&self, course_id: &CourseId, course: &Course) -> ServiceResult<Course> {
        self.record(format!("update_course {course_id}")).await;
        if let Some(err) = self.save_failures.lock().await.pop_front() {
            return Err(err);
        }
        let mut courses = self.courses.lock().await;
        let Some(existing) = courses.iter_mut().find(|c| &c.course_id == course_id) else {
            return Err(ServiceError::Server {
                status: 404,
                message: "no such course".into(),
            });
        };
        *existing = course.clone();
        self.saved.lock().await.push(course.clone());
        Ok(course.clone())
    }

    async fn delete_course(&self, course_id: &CourseId, force: bool) -> ServiceResult<()> {
        self.record(format!("delete_course {course_id} force={force}"))
            .await;
        if let Some(gate) = &self.delete_gate {
            gate.notified().await;
        }
        if let Some(reply) = self.delete_replies.lock().await.pop_front() {
            if reply.is_ok() {
                self.cascade(course_id).await;
            }
            return reply;
        }

        let mut years_offered: Vec<i32> = self
            .instances
            .lock()
            .await
            .iter()
            .filter(|i| &i.course.course_id == course_id)
            .map(|i| i.academic_year)
            .collect();
        years_offered.sort_unstable();
        years_offered.dedup();
        if !years_offered.is_empty() && !force {
            return Err(ServiceError::OfferedConflict { years_offered });
        }
        self.cascade(course_id).await;
        Ok(())
    }

    async fn list_instances(&self, scope: InstanceScope) -> ServiceResult<Vec<CourseInstance>> {
        self.record(format!("list_instances {scope}")).await;
        Ok(self
            .instances
            .lock()
            .await
            .iter()
            .filter(|i| i.scope() == scope)
            .cloned()
            .collect())
    }

    async fn create_instance(
        &self,
        scope: InstanceScope,
        course_id: &CourseId,
    ) -> ServiceResult<()> {
        self.record(format!("create_instance {scope} {course_id}"))
            .await;
        let title = self
            .courses
            .lock()
            .await
            .iter()
            .find(|c| &c.course_id == course_id)
            .map(|c| c.title.clone())
            .unwrap_or_default();
        let mut instances = self.instances.lock().await;
        if instances
            .iter()
            .any(|i| i.scope() == scope && &i.course.course_id == course_id)
        {
            return Err(ServiceError::DuplicateKey);
        }
        instances.push(CourseInstance {
            academic_year: scope.academic_year,
            semester: scope.semester,
            course: catalog_shared::domain::CourseRef {
                course_id: course_id.clone(),
                title,
            },
        });
        Ok(())
    }

    async fn delete_instance(
        &self,
        scope: InstanceScope,
        course_id: &CourseId,
    ) -> ServiceResult<()> {
        self.record(format!("delete_instance {scope} {course_id}"))
            .await;
        let mut instances = self.instances.lock().await;
        let before = instances.len();
        instances.retain(|i| !(i.scope() == scope && &i.course.course_id == course_id));
        if instances.len() == before {
            return Err(ServiceError::Server {
                status: 404,
                message: "no such instance".into(),
            });
        }
        Ok(())
    }
}
