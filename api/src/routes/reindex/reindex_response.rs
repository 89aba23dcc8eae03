use reindexer::ReindexJob;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReindexStartResponse {
    pub job_id: String,
}

/// Polled job status. Unknown ids answer with `state = "not_found"` and
/// zeroed counters rather than an error.
#[derive(Debug, Serialize)]
pub struct ReindexStatusResponse {
    pub job_id: String,
    pub state: String,
    pub total: u64,
    pub processed: u64,
    pub errors: u64,
    pub enriched: u64,
    pub percent: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
}

impl ReindexStatusResponse {
    pub fn not_found(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            state: "not_found".to_string(),
            total: 0,
            processed: 0,
            errors: 0,
            enriched: 0,
            percent: 0,
            message: "unknown job id".to_string(),
            current: None,
        }
    }
}

impl From<ReindexJob> for ReindexStatusResponse {
    fn from(job: ReindexJob) -> Self {
        let percent = job.percent();
        Self {
            job_id: job.id.to_string(),
            state: format!("{:?}", job.state).to_lowercase(),
            total: job.total,
            processed: job.processed,
            errors: job.errors,
            enriched: job.enriched,
            percent,
            message: job.message,
            current: job.current,
        }
    }
}
