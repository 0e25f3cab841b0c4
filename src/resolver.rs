use crate::registry::{IndexEntry, IndexRegistry};
use scaffold_protocol::IndexOption;
use tracing::debug;

/// Name under which a store is advertised when this service is paired with
/// peers run by other providers.
pub fn qualified_name(store_id: &str, provider: &str) -> String {
    format!("{store_id} ({provider})")
}

/// Finds the first entry whose backing path, store id, or provider-qualified
/// store id equals `requested_id`.
pub fn resolve<'a>(
    requested_id: &str,
    registry: &'a IndexRegistry,
    provider_namespace: Option<&str>,
) -> Option<&'a IndexEntry> {
    if requested_id.is_empty() {
        return None;
    }
    registry
        .entries()
        .iter()
        .find(|entry| matches_entry(requested_id, entry, provider_namespace))
}

fn matches_entry(requested_id: &str, entry: &IndexEntry, provider: Option<&str>) -> bool {
    debug!(
        requested_id,
        fasta = entry.backing_path(),
        store_id = entry.store_id(),
        "checking index entry"
    );
    if entry.backing_path() == requested_id {
        return true;
    }
    if entry.store_id().is_empty() {
        return false;
    }
    if entry.store_id() == requested_id {
        return true;
    }
    provider.is_some_and(|p| qualified_name(entry.store_id(), p) == requested_id)
}

/// Selectable indexes and the default selection (the first entry).
pub fn index_options(
    registry: &IndexRegistry,
    provider_namespace: Option<&str>,
) -> (Vec<IndexOption>, Option<String>) {
    let options: Vec<IndexOption> = registry
        .entries()
        .iter()
        .map(|entry| {
            let label = match provider_namespace {
                Some(p) if !entry.store_id().is_empty() => qualified_name(entry.store_id(), p),
                _ if entry.store_id().is_empty() => entry.backing_path().to_string(),
                _ => entry.store_id().to_string(),
            };
            IndexOption {
                value: entry.backing_path().to_string(),
                label,
            }
        })
        .collect();
    let default = registry
        .entries()
        .first()
        .map(|entry| entry.backing_path().to_string());
    (options, default)
}
