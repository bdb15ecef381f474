pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod job_client;

pub use config::ClientConfig;
pub use controller::{PollPolicy, TaskController, TaskSnapshot};
pub use dashboard::{AppState, Dashboard};
pub use error::{JobClientError, TaskError};
pub use job_client::{HttpJobClient, JobBackend};
