use async_trait::async_trait;
use catalog_shared::{
    domain::{Course, CourseId, CourseInstance, InstanceScope},
    error::ServiceError,
};

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Authoritative remote store for courses and their delivery instances.
///
/// Implementations own transport concerns; callers only see the outcome
/// classes of [`ServiceError`].
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_courses(&self) -> ServiceResult<Vec<Course>>;
    async fn create_course(&self, course: &Course) -> ServiceResult<Course>;
    async fn update_course(&self, course_id: &CourseId, course: &Course) -> ServiceResult<Course>;
    /// Fails with [`ServiceError::OfferedConflict`] when the course still has
    /// offerings and `force` is false.
    async fn delete_course(&self, course_id: &CourseId, force: bool) -> ServiceResult<()>;
    async fn list_instances(&self, scope: InstanceScope) -> ServiceResult<Vec<CourseInstance>>;
    async fn create_instance(&self, scope: InstanceScope, course_id: &CourseId)
        -> ServiceResult<()>;
    async fn delete_instance(&self, scope: InstanceScope, course_id: &CourseId)
        -> ServiceResult<()>;
}

pub struct MissingCatalogService;

fn unavailable<T>() -> ServiceResult<T> {
    Err(ServiceError::Transport(
        "catalog service is unavailable".into(),
    ))
}

#[async_trait]
impl CatalogService for MissingCatalogService {
    async fn list_courses(&self) -> ServiceResult<Vec<Course>> {
        unavailable()
    }

    async fn create_course(&self, _course: &Course) -> ServiceResult<Course> {
        unavailable()
    }

    async fn update_course(
        &self,
        _course_id: &CourseId,
        _course: &Course,
    ) -> ServiceResult<Course> {
        unavailable()
    }

    async fn delete_course(&self, _course_id: &CourseId, _force: bool) -> ServiceResult<()> {
        unavailable()
    }

    async fn list_instances(&self, _scope: InstanceScope) -> ServiceResult<Vec<CourseInstance>> {
        unavailable()
    }

    async fn create_instance(
        &self,
        _scope: InstanceScope,
        _course_id: &CourseId,
    ) -> ServiceResult<()> {
        unavailable()
    }

    async fn delete_instance(
        &self,
        _scope: InstanceScope,
        _course_id: &CourseId,
    ) -> ServiceResult<()> {
        unavailable()
    }
}
