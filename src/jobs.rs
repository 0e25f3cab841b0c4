use scaffold_protocol::{InlineResource, JobStatus, ServiceError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

pub type JobId = String;

/// Result record for one request. Starts as `Started` and reaches exactly
/// one terminal status. Jobs run here are recorded in their service's
/// `JobSet` while still `Started`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceJob {
    pub id: JobId,
    pub name: String,
    pub description: String,
    /// Set when the job ran on a paired peer rather than locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<InlineResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ServiceError>,
}

impl ServiceJob {
    pub fn started(id: JobId, name: &str, description: &str) -> Self {
        let job = Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            provider: None,
            status: JobStatus::Started,
            result: None,
            errors: vec![],
        };
        info!(job = %job.id, name, description, "job started");
        job
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&InlineResource> {
        self.result.as_ref()
    }

    pub fn errors(&self) -> &[ServiceError] {
        &self.errors
    }

    /// Returns false, leaving the job untouched, if it already finished.
    pub fn succeed(&mut self, result: InlineResource) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Succeeded;
        self.result = Some(result);
        info!(job = %self.id, "job succeeded");
        true
    }

    /// Returns false, leaving the job untouched, if it already finished.
    pub fn fail(&mut self, err: ServiceError) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        error!(job = %self.id, code = ?err.code, "job failed: {}", err.message);
        self.status = JobStatus::Failed;
        self.result = None;
        self.errors.push(err);
        true
    }
}

/// Jobs recorded by one service instance, in submission order.
#[derive(Debug, Default)]
pub struct JobSet {
    counter: AtomicU64,
    jobs: Mutex<Vec<ServiceJob>>,
}

impl JobSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> JobId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("job-{n}")
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ServiceJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, job: ServiceJob) {
        self.lock().push(job);
    }

    /// Replaces the recorded job with the same id. Returns false if there is
    /// none.
    pub fn update(&self, job: &ServiceJob) -> bool {
        let mut jobs = self.lock();
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(slot) => {
                *slot = job.clone();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<ServiceJob> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_protocol::ErrorCode;

    #[test]
    fn test_exactly_one_terminal_status() {
        let mut job = ServiceJob::started("job-1".to_string(), "chr1A", "wheatA");
        assert_eq!(job.status(), JobStatus::Started);
        assert!(job.succeed(InlineResource::new("chr1A", ">chr1A\nACGT\n".to_string())));
        assert!(!job.fail(ServiceError::new(ErrorCode::BufferWriteFailed, "late")));
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert!(job.errors().is_empty());
        assert_eq!(job.result().unwrap().data, ">chr1A\nACGT\n");
    }

    #[test]
    fn test_failed_job_has_no_payload() {
        let mut job = ServiceJob::started("job-2".to_string(), "chr9", "wheatA");
        assert!(job.fail(ServiceError::new(ErrorCode::ScaffoldNotFound, "chr9")));
        assert!(!job.succeed(InlineResource::new("chr9", String::new())));
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.result().is_none());
        assert_eq!(job.errors()[0].code, ErrorCode::ScaffoldNotFound);
    }

    #[test]
    fn test_job_set_ids_and_order() {
        let set = JobSet::new();
        let a = set.next_id();
        let b = set.next_id();
        assert_eq!((a.as_str(), b.as_str()), ("job-1", "job-2"));
        set.record(ServiceJob::started(a, "x", "y"));
        set.record(ServiceJob::started(b, "x", "y"));
        let ids: Vec<String> = set.snapshot().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["job-1", "job-2"]);
    }

    #[test]
    fn test_started_job_is_visible_until_updated() {
        let set = JobSet::new();
        let mut job = ServiceJob::started(set.next_id(), "chr1A", "wheatA");
        set.record(job.clone());
        assert_eq!(set.snapshot()[0].status(), JobStatus::Started);

        job.succeed(InlineResource::new("chr1A", ">chr1A\n".to_string()));
        assert!(set.update(&job));
        let jobs = set.snapshot();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status(), JobStatus::Succeeded);

        let stray = ServiceJob::started("job-99".to_string(), "x", "y");
        assert!(!set.update(&stray));
        assert_eq!(set.snapshot().len(), 1);
    }

    #[test]
    fn test_job_json_shape() {
        let mut job = ServiceJob::started("job-3".to_string(), "chr1A", "wheatA");
        job.fail(ServiceError::new(ErrorCode::NoStoreAvailable, "nothing"));
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["status"], "Failed");
        assert_eq!(value["errors"][0]["code"], "NoStoreAvailable");
        assert!(value.get("result").is_none());
        assert!(value.get("provider").is_none());
    }
}
