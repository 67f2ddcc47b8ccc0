use anyhow::Context;
use async_trait::async_trait;
use catalog_shared::{
    domain::{Course, CourseId, CourseInstance, InstanceScope},
    error::ServiceError,
    protocol::{error_message_from_body, ConflictBody, CreateInstanceRequest, DeleteCourseQuery},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    service::{CatalogService, ServiceResult},
};

/// [`CatalogService`] over the catalog server's JSON API.
pub struct HttpCatalogService {
    http: Client,
    base_url: Url,
}

enum Reply {
    Accepted(Response),
    Rejected { status: StatusCode, body: String },
}

impl HttpCatalogService {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base_url = settings.server_url()?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build catalog http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::Transport(format!(
                    "catalog server url {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn dispatch(&self, request: RequestBuilder) -> ServiceResult<Reply> {
        let response = request.send().await.map_err(ServiceError::transport)?;
        let status = response.status();
        debug!("catalog: response status={} url={}", status, response.url());
        if status.is_success() {
            return Ok(Reply::Accepted(response));
        }
        let body = response.text().await.map_err(|err| {
            warn!("catalog: unreadable error body status={status}: {err}");
            ServiceError::transport(err)
        })?;
        Ok(Reply::Rejected { status, body })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ServiceResult<T> {
        match self.dispatch(request).await? {
            Reply::Accepted(response) => response.json().await.map_err(ServiceError::transport),
            Reply::Rejected { status, body } => Err(classify(status, &body)),
        }
    }

    async fn execute(&self, request: RequestBuilder) -> ServiceResult<()> {
        match self.dispatch(request).await? {
            Reply::Accepted(_) => Ok(()),
            Reply::Rejected { status, body } => Err(classify(status, &body)),
        }
    }
}

/// Maps a non-2xx answer onto the error taxonomy, absent any
/// operation-specific reading of 409.
fn classify(status: StatusCode, body: &str) -> ServiceError {
    let message = error_message_from_body(body);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::ValidationRejected(message)
        }
        StatusCode::CONFLICT => ServiceError::Conflict(message),
        _ => ServiceError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn list_courses(&self) -> ServiceResult<Vec<Course>> {
        let url = self.endpoint(&["courses"])?;
        self.fetch(self.http.get(url)).await
    }

    async fn create_course(&self, course: &Course) -> ServiceResult<Course> {
        let url = self.endpoint(&["courses"])?;
        self.fetch(self.http.post(url).json(course)).await
    }

    async fn update_course(&self, course_id: &CourseId, course: &Course) -> ServiceResult<Course> {
        let url = self.endpoint(&["courses", course_id.as_str()])?;
        self.fetch(self.http.put(url).json(course)).await
    }

    async fn delete_course(&self, course_id: &CourseId, force: bool) -> ServiceResult<()> {
        let url = self.endpoint(&["courses", course_id.as_str()])?;
        let mut request = self.http.delete(url);
        if force {
            request = request.query(&DeleteCourseQuery { force });
        }
        match self.dispatch(request).await? {
            Reply::Accepted(_) => Ok(()),
            Reply::Rejected { status, body } if status == StatusCode::CONFLICT => {
                Err(match ConflictBody::parse(&body) {
                    ConflictBody::OfferedYears(years_offered) => {
                        ServiceError::OfferedConflict { years_offered }
                    }
                    ConflictBody::Message(message) | ConflictBody::Detailed { message } => {
                        ServiceError::Conflict(message)
                    }
                })
            }
            Reply::Rejected { status, body } => Err(classify(status, &body)),
        }
    }

    async fn list_instances(&self, scope: InstanceScope) -> ServiceResult<Vec<CourseInstance>> {
        let year = scope.academic_year.to_string();
        let semester = scope.semester.get().to_string();
        let url = self.endpoint(&["instances", year.as_str(), semester.as_str()])?;
        self.fetch(self.http.get(url)).await
    }

    async fn create_instance(
        &self,
        scope: InstanceScope,
        course_id: &CourseId,
    ) -> ServiceResult<()> {
        let url = self.endpoint(&["instances"])?;
        let body = CreateInstanceRequest::new(scope, course_id.clone());
        match self.dispatch(self.http.post(url).json(&body)).await? {
            Reply::Accepted(_) => Ok(()),
            Reply::Rejected { status, .. } if status == StatusCode::CONFLICT => {
                Err(ServiceError::DuplicateKey)
            }
            Reply::Rejected { status, body } => Err(classify(status, &body)),
        }
    }

    async fn delete_instance(
        &self,
        scope: InstanceScope,
        course_id: &CourseId,
    ) -> ServiceResult<()> {
        let year = scope.academic_year.to_string();
        let semester = scope.semester.get().to_string();
        let url = self.endpoint(&[
            "instances",
            year.as_str(),
            semester.as_str(),
            course_id.as_str(),
        ])?;
        self.execute(self.http.delete(url)).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
