use std::sync::Arc;

use catalog_shared::{
    domain::{Course, CourseId, CourseInstance, InstanceScope},
    error::ServiceError,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod catalog_store;
pub mod config;
pub mod deletion;
pub mod edit_session;
pub mod http;
pub mod instance_store;
pub mod projection;
pub mod service;

pub use catalog_store::CatalogStore;
pub use deletion::{ConflictKind, DeletionConflict, DeletionError, DeletionProtocol, DeletionState};
pub use edit_session::{
    CourseForm, EditError, EditMode, EditSession, InstanceForm, InstanceSubmission, SessionState,
};
pub use http::HttpCatalogService;
pub use instance_store::InstanceStore;
pub use projection::{SortDirection, SortKey, SortOption, ViewQuery};
pub use service::{CatalogService, MissingCatalogService};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    CoursesReloaded {
        count: usize,
    },
    InstancesReloaded {
        scope: InstanceScope,
        count: usize,
    },
    CourseDeleted {
        course_id: CourseId,
        forced: bool,
    },
    Error(String),
}

/// One line of the course table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub course: Course,
    /// Titles of prerequisites that resolve in the loaded catalog.
    pub prerequisite_titles: Vec<String>,
    /// False when another course lists this one as a prerequisite.
    pub deletable: bool,
}

struct CatalogClientState {
    catalog: CatalogStore,
    instances: InstanceStore,
    deletion: DeletionProtocol,
}

/// Local working copy of the catalog kept consistent with a
/// [`CatalogService`].
///
/// Every successful mutation is followed by a full reload of the stores it
/// touched. The state lock is never held across a remote call; in-flight
/// work is tracked by the deletion protocol and the edit sessions instead,
/// so a late answer to an older request still lands (last reload wins).
pub struct CatalogClient {
    service: Arc<dyn CatalogService>,
    inner: Mutex<CatalogClientState>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogClient {
    pub fn new(service: Arc<dyn CatalogService>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            inner: Mutex::new(CatalogClientState {
                catalog: CatalogStore::new(),
                instances: InstanceStore::new(),
                deletion: DeletionProtocol::new(),
            }),
            events,
        }
    }

    pub fn disconnected() -> Self {
        Self::new(Arc::new(MissingCatalogService))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: CatalogEvent) {
        let _ = self.events.send(event);
    }

    pub async fn refresh_courses(&self) -> Result<usize, ServiceError> {
        let courses = match self.service.list_courses().await {
            Ok(courses) => courses,
            Err(err) => {
                warn!("catalog: course listing failed: {err}");
                self.emit(CatalogEvent::Error(format!("Error fetching courses: {err}")));
                return Err(err);
            }
        };
        let count = {
            let mut guard = self.inner.lock().await;
            guard.catalog.load(courses).len()
        };
        info!("catalog: reloaded courses count={count}");
        self.emit(CatalogEvent::CoursesReloaded { count });
        Ok(count)
    }

    async fn settle_courses(&self, cause: &str) {
        if let Err(err) = self.refresh_courses().await {
            warn!("catalog: reload after {cause} failed, local copy may be stale: {err}");
        }
    }

    pub async fn courses(&self) -> Vec<Course> {
        self.inner.lock().await.catalog.courses().to_vec()
    }

    pub async fn course(&self, course_id: &CourseId) -> Option<Course> {
        self.inner.lock().await.catalog.get(course_id).cloned()
    }

    pub async fn is_prerequisite_of_others(&self, course_id: &CourseId) -> bool {
        self.inner
            .lock()
            .await
            .catalog
            .is_prerequisite_of_others(course_id)
    }

    pub async fn visible_courses(&self, query: &ViewQuery) -> Vec<CourseRow> {
        let guard = self.inner.lock().await;
        let catalog = &guard.catalog;
        projection::project(catalog.courses(), query)
            .into_iter()
            .map(|course| CourseRow {
                course: course.clone(),
                prerequisite_titles: catalog
                    .prerequisite_titles(course)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                deletable: catalog.can_delete(&course.course_id),
            })
            .collect()
    }

    pub async fn deletion_state(&self) -> DeletionState {
        self.inner.lock().await.deletion.state().clone()
    }

    /// Issues a plain delete for `course_id`. Courses listed as another
    /// course's prerequisite are refused before anything is sent.
    pub async fn request_course_deletion(
        &self,
        course_id: &CourseId,
    ) -> Result<DeletionState, DeletionError> {
        {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            state.deletion.request(course_id, &state.catalog)?;
        }
        info!("delete: requested course={course_id}");
        let outcome = self.service.delete_course(course_id, false).await;
        self.settle_deletion(outcome).await
    }

    /// Retries the pending delete with `force`, cascading to the offerings
    /// named by the presented conflict.
    pub async fn confirm_force_delete(&self) -> Result<DeletionState, DeletionError> {
        let course_id = self.inner.lock().await.deletion.confirm_force()?;
        info!("delete: forcing course={course_id}");
        let outcome = self.service.delete_course(&course_id, true).await;
        self.settle_deletion(outcome).await
    }

    pub async fn cancel_deletion(&self) -> Result<(), DeletionError> {
        self.inner.lock().await.deletion.cancel()
    }

    async fn settle_deletion(
        &self,
        outcome: Result<(), ServiceError>,
    ) -> Result<DeletionState, DeletionError> {
        let (state, reload_scope) = {
            let mut guard = self.inner.lock().await;
            let state = guard.deletion.resolve(outcome)?.clone();
            let mut reload_scope = None;
            if let DeletionState::ResolvedSuccess { course_id, forced } = &state {
                guard.catalog.remove(course_id);
                if guard.instances.forget_course(course_id) > 0 || *forced {
                    reload_scope = guard.instances.scope();
                }
            }
            (state, reload_scope)
        };

        match &state {
            DeletionState::ResolvedSuccess { course_id, forced } => {
                info!("delete: resolved course={course_id} forced={forced}");
                self.emit(CatalogEvent::CourseDeleted {
                    course_id: course_id.clone(),
                    forced: *forced,
                });
                self.settle_courses("course deletion").await;
                if let Some(scope) = reload_scope {
                    if let Err(err) = self.load_instances(scope).await {
                        warn!("instances: reload after course deletion failed scope={scope}: {err}");
                    }
                }
            }
            DeletionState::ConflictPresented(conflict) => {
                warn!(
                    "delete: conflict course={} force_available={} message={}",
                    conflict.course_id,
                    conflict.force_available(),
                    conflict.message
                );
            }
            _ => {}
        }
        Ok(state)
    }

    pub async fn instances(&self) -> (Option<InstanceScope>, Vec<CourseInstance>) {
        let guard = self.inner.lock().await;
        (guard.instances.scope(), guard.instances.instances().to_vec())
    }

    /// Loads the instances of `scope`, discarding the previously held scope.
    pub async fn load_instances(
        &self,
        scope: InstanceScope,
    ) -> Result<Vec<CourseInstance>, ServiceError> {
        let listing = match self.service.list_instances(scope).await {
            Ok(listing) => listing,
            Err(err) => {
                warn!("instances: listing failed scope={scope}: {err}");
                self.emit(CatalogEvent::Error(format!(
                    "{} ({err})",
                    instance_store::INSTANCE_LOAD_FAILED
                )));
                return Err(err);
            }
        };
        let loaded = {
            let mut guard = self.inner.lock().await;
            guard.instances.load_scope(scope, listing).to_vec()
        };
        info!("instances: reloaded scope={scope} count={}", loaded.len());
        self.emit(CatalogEvent::InstancesReloaded {
            scope,
            count: loaded.len(),
        });
        Ok(loaded)
    }

    /// Asks the service to schedule `course_id` in `scope`, then reloads the
    /// scope. A duplicate comes back as [`ServiceError::DuplicateKey`] and
    /// leaves the held set as it was.
    pub async fn add_instance(
        &self,
        scope: InstanceScope,
        course_id: &CourseId,
    ) -> Result<(), ServiceError> {
        if let Err(err) = self.service.create_instance(scope, course_id).await {
            warn!("instances: add rejected scope={scope} course={course_id}: {err}");
            return Err(err);
        }
        info!("instances: added scope={scope} course={course_id}");
        if let Err(err) = self.load_instances(scope).await {
            warn!("instances: reload after add failed scope={scope}: {err}");
        }
        Ok(())
    }

    pub async fn remove_instance(
        &self,
        scope: InstanceScope,
        course_id: &CourseId,
    ) -> Result<(), ServiceError> {
        if let Err(err) = self.service.delete_instance(scope, course_id).await {
            warn!("instances: remove failed scope={scope} course={course_id}: {err}");
            self.emit(CatalogEvent::Error(
                instance_store::INSTANCE_REMOVE_FAILED.to_string(),
            ));
            return Err(err);
        }
        info!("instances: removed scope={scope} course={course_id}");
        if let Err(err) = self.load_instances(scope).await {
            warn!("instances: reload after remove failed scope={scope}: {err}");
        }
        Ok(())
    }

    /// Sends a course form to the service and applies the answer to the
    /// session. Returns the state the session settled in.
    pub async fn submit_course(
        &self,
        session: &mut EditSession<CourseForm>,
    ) -> Result<SessionState, EditError> {
        let submission = session.begin_submit()?;
        let saved = match &submission.mode {
            EditMode::Create => self.service.create_course(&submission.course).await,
            EditMode::Edit { course_id } => {
                self.service
                    .update_course(course_id, &submission.course)
                    .await
            }
        };

        let outcome = match saved {
            Ok(course) => {
                info!("catalog: saved course={}", course.course_id);
                self.inner.lock().await.catalog.upsert(course);
                self.settle_courses("course save").await;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "catalog: save rejected course={}: {err}",
                    submission.course.course_id
                );
                Err(err)
            }
        };
        Ok(session.finish(outcome)?.clone())
    }

    pub async fn submit_instance(
        &self,
        session: &mut EditSession<InstanceForm>,
    ) -> Result<SessionState, EditError> {
        let InstanceSubmission { scope, course_id } = session.begin_submit()?;
        let outcome = self.add_instance(scope, &course_id).await;
        Ok(session.finish(outcome)?.clone())
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
