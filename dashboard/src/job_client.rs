//! Cliente del backend de jobs: `POST /create_task` y `GET /tasks/{id}`.

use async_trait::async_trait;
use common::{CreateJobResponse, JobId, JobStatusResponse, QueryParameters};
use reqwest::Client;
use tracing::debug;

use crate::error::JobClientError;

/// Lo que el controller necesita del backend. Cada llamada es una
/// petición independiente; no guarda estado de UI.
#[async_trait]
pub trait JobBackend: Send + Sync + 'static {
    async fn create_job(&self, params: &QueryParameters) -> Result<JobId, JobClientError>;

    async fn job_status(&self, id: &JobId) -> Result<JobStatusResponse, JobClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpJobClient {
    client: Client,
    base_url: String,
}

impl HttpJobClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl JobBackend for HttpJobClient {
    async fn create_job(&self, params: &QueryParameters) -> Result<JobId, JobClientError> {
        let url = format!("{}/create_task", self.base_url);
        let resp = self.client.post(&url).json(params).send().await?;

        if !resp.status().is_success() {
            return Err(JobClientError::Status(resp.status()));
        }

        let CreateJobResponse { task_id } = resp.json().await?;
        debug!("backend creó el job {}", task_id);
        Ok(task_id)
    }

    async fn job_status(&self, id: &JobId) -> Result<JobStatusResponse, JobClientError> {
        let url = format!("{}/tasks/{}", self.base_url, id);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(JobClientError::Status(resp.status()));
        }

        let status: JobStatusResponse = resp.json().await?;
        debug!("job {} -> {}", id, status.status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_sin_barra_final() {
        let c = HttpJobClient::new("http://127.0.0.1:5000/");
        assert_eq!(c.base_url(), "http://127.0.0.1:5000");
    }
}
