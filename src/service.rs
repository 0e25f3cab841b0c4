use crate::config::ServiceConfig;
use crate::delegation::{NoPeers, PairedStore, PeerDispatcher};
use crate::error::{FetchError, OrchestrationError};
use crate::fasta_index::{ScaffoldIndex, ScaffoldInfo};
use crate::fetcher::{fetch_scaffold, FormattedRecord};
use crate::jobs::{JobSet, ServiceJob};
use crate::registry::{IndexEntry, IndexRegistry};
use crate::resolver;
use scaffold_protocol::{
    InlineResource, IndexOption, JobStatus, ParameterDescriptor, ParameterLevel, ParameterType,
    ScaffoldRequest, ServiceError, DEFAULT_LINE_BREAK, PARAM_INDEXES, PARAM_LINE_BREAK,
    PARAM_SCAFFOLD,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "SamTools service";
pub const SERVICE_ALIAS: &str = "samtools";
pub const SERVICE_DESCRIPTION: &str = "A service to get scaffolds from indexed FASTA files";

pub trait ScaffoldService {
    fn resolve(&self, requested_id: &str) -> Option<&IndexEntry>;
    fn fetch(
        &self,
        fasta_path: &Path,
        scaffold_name: &str,
        wrap_width: u32,
    ) -> Result<FormattedRecord, FetchError>;
    fn handle(&self, request: &ScaffoldRequest) -> HandleOutcome;
}

#[derive(Debug, Clone)]
pub enum HandleOutcome {
    /// Ran here, or was rejected here; exactly one job either way.
    Local(ServiceJob),
    /// Ran on one or more paired peers.
    Delegated(Vec<ServiceJob>),
}

impl HandleOutcome {
    pub fn jobs(&self) -> &[ServiceJob] {
        match self {
            Self::Local(job) => std::slice::from_ref(job),
            Self::Delegated(jobs) => jobs,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.jobs()
            .iter()
            .any(|job| job.status() == JobStatus::Succeeded)
    }
}

pub struct IndexedScaffoldService {
    registry: Arc<IndexRegistry>,
    provider: Option<String>,
    default_wrap_width: u32,
    max_record_bytes: Option<usize>,
    peers: Box<dyn PeerDispatcher>,
    jobs: JobSet,
}

impl IndexedScaffoldService {
    pub fn new(registry: Arc<IndexRegistry>) -> Self {
        Self {
            registry,
            provider: None,
            default_wrap_width: DEFAULT_LINE_BREAK,
            max_record_bytes: None,
            peers: Box::new(NoPeers),
            jobs: JobSet::new(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let mut service = Self::new(Arc::new(IndexRegistry::from_config(config)));
        service.provider = config.provider.clone();
        service.default_wrap_width = config.default_line_break;
        service.max_record_bytes = config.max_record_bytes;
        info!(
            indexes = service.registry.len(),
            provider = service.provider.as_deref().unwrap_or("-"),
            "scaffold service configured"
        );
        service
    }

    pub fn with_peers(mut self, peers: Box<dyn PeerDispatcher>) -> Self {
        self.peers = peers;
        self
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = Some(provider.to_string());
        self
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    pub fn jobs(&self) -> Vec<ServiceJob> {
        self.jobs.snapshot()
    }

    /// Store ids are only qualified when there are peers to tell apart.
    pub fn provider_namespace(&self) -> Option<&str> {
        if self.peers.peer_count() > 0 {
            self.provider.as_deref()
        } else {
            None
        }
    }

    pub fn index_options(&self) -> (Vec<IndexOption>, Option<String>) {
        resolver::index_options(&self.registry, self.provider_namespace())
    }

    pub fn parameters(&self) -> Vec<ParameterDescriptor> {
        let (options, default_index) = self.index_options();
        vec![
            ParameterDescriptor {
                name: PARAM_INDEXES.to_string(),
                display_name: "Indexes".to_string(),
                description: "The available databases".to_string(),
                param_type: ParameterType::String,
                level: ParameterLevel::All,
                required: true,
                default: default_index.map(|d| json!(d)),
                options,
            },
            ParameterDescriptor {
                name: PARAM_SCAFFOLD.to_string(),
                display_name: "Scaffold name".to_string(),
                description: "The name of the scaffold to find".to_string(),
                param_type: ParameterType::String,
                level: ParameterLevel::All,
                required: true,
                default: None,
                options: vec![],
            },
            ParameterDescriptor {
                name: PARAM_LINE_BREAK.to_string(),
                display_name: "Max Line Length".to_string(),
                description:
                    "If this is greater than 0, then add a newline after each block of this many letters"
                        .to_string(),
                param_type: ParameterType::UnsignedInt,
                level: ParameterLevel::Advanced,
                required: false,
                default: Some(json!(self.default_wrap_width)),
                options: vec![],
            },
        ]
    }

    /// Scaffold names and lengths of the store `requested_id` resolves to.
    pub fn list_scaffolds(&self, requested_id: &str) -> Result<Vec<ScaffoldInfo>, ServiceError> {
        let entry = self.resolve(requested_id).ok_or_else(|| {
            ServiceError::from(&OrchestrationError::NoStoreAvailable(
                requested_id.to_string(),
            ))
        })?;
        let index = ScaffoldIndex::open(entry.fasta_path())
            .map_err(|e| ServiceError::from(&e))?;
        Ok(index.scaffolds())
    }

    fn failed_job(&self, request: &ScaffoldRequest, err: &OrchestrationError) -> ServiceJob {
        let mut job = ServiceJob::started(
            self.jobs.next_id(),
            &request.scaffold_name,
            &request.requested_store_id,
        );
        job.fail(ServiceError::from(err));
        self.jobs.record(job.clone());
        job
    }

    /// Records the job as `Started`, runs the fetch, then records the
    /// terminal status.
    fn run_local(&self, entry: &IndexEntry, request: &ScaffoldRequest) -> ServiceJob {
        let wrap_width = request.wrap_width.unwrap_or(self.default_wrap_width);
        let mut job = ServiceJob::started(
            self.jobs.next_id(),
            &request.scaffold_name,
            entry.store_id(),
        );
        self.jobs.record(job.clone());
        match self.fetch(entry.fasta_path(), &request.scaffold_name, wrap_width) {
            Ok(record) => {
                job.succeed(InlineResource::new(
                    record.scaffold_name(),
                    record.to_text(),
                ));
            }
            Err(e) => {
                job.fail(ServiceError::from(&e));
            }
        }
        self.jobs.update(&job);
        job
    }
}

impl ScaffoldService for IndexedScaffoldService {
    fn resolve(&self, requested_id: &str) -> Option<&IndexEntry> {
        resolver::resolve(requested_id, &self.registry, self.provider_namespace())
    }

    fn fetch(
        &self,
        fasta_path: &Path,
        scaffold_name: &str,
        wrap_width: u32,
    ) -> Result<FormattedRecord, FetchError> {
        fetch_scaffold(fasta_path, scaffold_name, wrap_width, self.max_record_bytes)
    }

    fn handle(&self, request: &ScaffoldRequest) -> HandleOutcome {
        if request.scaffold_name.is_empty() {
            let err = OrchestrationError::InvalidRequest("missing scaffold name".to_string());
            return HandleOutcome::Local(self.failed_job(request, &err));
        }

        if let Some(entry) = self.resolve(&request.requested_store_id) {
            return HandleOutcome::Local(self.run_local(entry, request));
        }

        // the store may be held by a paired service
        let outcome = self.peers.dispatch(request);
        if outcome.attempted == 0 {
            warn!(store = %request.requested_store_id, "no local index and no peer ran request");
            let err = OrchestrationError::NoStoreAvailable(request.requested_store_id.clone());
            return HandleOutcome::Local(self.failed_job(request, &err));
        }
        for job in &outcome.jobs {
            self.jobs.record(job.clone());
        }
        HandleOutcome::Delegated(outcome.jobs)
    }
}

impl PairedStore for IndexedScaffoldService {
    fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or(SERVICE_ALIAS)
    }

    fn run(&self, request: &ScaffoldRequest) -> Option<ServiceJob> {
        if request.scaffold_name.is_empty() {
            return None;
        }
        // peers answer for their own stores only, never re-delegating
        let entry = resolver::resolve(
            &request.requested_store_id,
            &self.registry,
            self.provider.as_deref(),
        )?;
        Some(self.run_local(entry, request))
    }
}
