use common::{JobId, QueryError};
use reqwest::StatusCode;
use thiserror::Error;

/// Fallos de una petición individual al backend.
#[derive(Debug, Error)]
pub enum JobClientError {
    #[error("error HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("el backend respondió con status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("consulta inválida: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("no se pudo crear el job: {0}")]
    Submission(#[source] JobClientError),

    #[error("el backend reportó el job {job_id} como fallido")]
    JobFailed { job_id: JobId },

    #[error("se abandona el job {job_id} tras {failures} consultas fallidas seguidas")]
    PollGaveUp { job_id: JobId, failures: u32 },

    /// Otra consulta (o un cancel) llegó mientras se creaba el job.
    #[error("la consulta fue reemplazada antes de crearse el job")]
    Superseded,
}
