use crate::jobs::ServiceJob;
use scaffold_protocol::ScaffoldRequest;
use std::sync::Arc;
use tracing::debug;

/// What happened when a request was handed to the paired peers.
#[derive(Debug, Clone, Default)]
pub struct DelegationOutcome {
    /// Number of peers that actually ran a job for the request.
    pub attempted: usize,
    pub jobs: Vec<ServiceJob>,
}

/// Forwards requests that no local index can serve.
pub trait PeerDispatcher: Send + Sync {
    fn peer_count(&self) -> usize;
    fn dispatch(&self, request: &ScaffoldRequest) -> DelegationOutcome;
}

/// Dispatcher for a service with no paired peers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeers;

impl PeerDispatcher for NoPeers {
    fn peer_count(&self) -> usize {
        0
    }

    fn dispatch(&self, _request: &ScaffoldRequest) -> DelegationOutcome {
        DelegationOutcome::default()
    }
}

/// A separately configured store reachable through some transport.
pub trait PairedStore: Send + Sync {
    fn provider(&self) -> &str;

    /// `None` when the peer does not hold the requested store.
    fn run(&self, request: &ScaffoldRequest) -> Option<ServiceJob>;
}

/// Tries every paired store in order and collects the jobs they ran.
#[derive(Default, Clone)]
pub struct PeerSet {
    peers: Vec<Arc<dyn PairedStore>>,
}

impl PeerSet {
    pub fn new(peers: Vec<Arc<dyn PairedStore>>) -> Self {
        Self { peers }
    }

    pub fn push(&mut self, peer: Arc<dyn PairedStore>) {
        self.peers.push(peer);
    }
}

impl PeerDispatcher for PeerSet {
    fn peer_count(&self) -> usize {
        self.peers.len()
    }

    fn dispatch(&self, request: &ScaffoldRequest) -> DelegationOutcome {
        let mut outcome = DelegationOutcome::default();
        for peer in &self.peers {
            match peer.run(request) {
                Some(mut job) => {
                    job.provider = Some(peer.provider().to_string());
                    outcome.attempted += 1;
                    outcome.jobs.push(job);
                }
                None => debug!(
                    provider = peer.provider(),
                    store = %request.requested_store_id,
                    "peer does not hold store"
                ),
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_protocol::{InlineResource, JobStatus};

    struct FixedPeer {
        provider: String,
        store: String,
    }

    impl PairedStore for FixedPeer {
        fn provider(&self) -> &str {
            &self.provider
        }

        fn run(&self, request: &ScaffoldRequest) -> Option<ServiceJob> {
            if request.requested_store_id != self.store {
                return None;
            }
            let mut job = ServiceJob::started(
                "remote-1".to_string(),
                &request.scaffold_name,
                &request.requested_store_id,
            );
            job.succeed(InlineResource::new(&request.scaffold_name, ">x\nA\n".to_string()));
            Some(job)
        }
    }

    fn peer(provider: &str, store: &str) -> Arc<dyn PairedStore> {
        Arc::new(FixedPeer {
            provider: provider.to_string(),
            store: store.to_string(),
        })
    }

    #[test]
    fn test_no_peers_attempts_nothing() {
        let outcome = NoPeers.dispatch(&ScaffoldRequest::new("unknownX", "chr1"));
        assert_eq!(outcome.attempted, 0);
        assert!(outcome.jobs.is_empty());
    }

    #[test]
    fn test_peer_set_counts_only_peers_that_ran() {
        let mut peers = PeerSet::new(vec![peer("node-b", "barley")]);
        peers.push(peer("node-c", "oats"));
        assert_eq!(peers.peer_count(), 2);

        let outcome = peers.dispatch(&ScaffoldRequest::new("oats", "chr1"));
        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.jobs[0].provider.as_deref(), Some("node-c"));
        assert_eq!(outcome.jobs[0].status(), JobStatus::Succeeded);

        let outcome = peers.dispatch(&ScaffoldRequest::new("rye", "chr1"));
        assert_eq!(outcome.attempted, 0);
    }
}
