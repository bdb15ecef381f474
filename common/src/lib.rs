pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod job;
pub mod query;
pub mod record;
pub mod selection;

pub use aggregate::{count_by_make, count_by_year, group_count, summarize, GroupedCount, Summary};
pub use error::{ExportError, QueryError, SelectionError};
pub use filter::SelectionOptions;
pub use job::{CreateJobResponse, Job, JobId, JobStatus, JobStatusResponse};
pub use query::QueryParameters;
pub use record::{Record, Records};
pub use selection::{Choice, Selection};
