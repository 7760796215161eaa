// Snapshot collectors, one per resource class

use tracing::instrument;

use super::{RequestError, ResourceClass, filter, normalize, sort};
use crate::models::{NormalizedRecord, Snapshot, SnapshotQuery};
use crate::runtime::NodeRuntime;

fn collect(
    class: ResourceClass,
    ids: Vec<u64>,
    normalize: impl Fn(u64) -> Option<NormalizedRecord>,
    query: &SnapshotQuery,
) -> Result<Snapshot, RequestError> {
    class.check_sort_field(&query.sort_by)?;
    let term = query.search_term();
    // Ids that vanished since enumeration normalize to None and drop out here.
    let matched: Vec<NormalizedRecord> = ids
        .into_iter()
        .filter_map(normalize)
        .filter(|r| filter::matches(class, r, term.as_deref()))
        .collect();
    let total = matched.len();
    let mut records = sort::sort_records(matched, &query.sort_by, query.sort_dir);
    records.truncate(query.limit);
    Ok(Snapshot { records, total })
}

/// Without a search term the total is the runtime's live process counter rather
/// than a recount, so it can differ from what the enumeration saw.
#[instrument(skip(rt, query), fields(node = rt.node_name(), operation = "fetch_processes"))]
pub fn fetch_processes(rt: &dyn NodeRuntime, query: &SnapshotQuery) -> Result<Snapshot, RequestError> {
    let mut snapshot = collect(
        ResourceClass::Process,
        rt.processes(),
        |id| normalize::process_record(rt, id),
        query,
    )?;
    if query.search_term().is_none() {
        snapshot.total = usize::try_from(rt.process_count()).unwrap_or(usize::MAX);
    }
    Ok(snapshot)
}

#[instrument(skip(rt, query), fields(node = rt.node_name(), operation = "fetch_ports"))]
pub fn fetch_ports(rt: &dyn NodeRuntime, query: &SnapshotQuery) -> Result<Snapshot, RequestError> {
    collect(
        ResourceClass::Port,
        rt.ports(),
        |id| normalize::port_record(rt, id),
        query,
    )
}

#[instrument(skip(rt, query), fields(node = rt.node_name(), operation = "fetch_tables"))]
pub fn fetch_tables(rt: &dyn NodeRuntime, query: &SnapshotQuery) -> Result<Snapshot, RequestError> {
    collect(
        ResourceClass::Table,
        rt.tables(),
        |id| normalize::table_record(rt, id),
        query,
    )
}

#[instrument(skip(rt, query), fields(node = rt.node_name(), operation = "fetch_sockets"))]
pub fn fetch_sockets(rt: &dyn NodeRuntime, query: &SnapshotQuery) -> Result<Snapshot, RequestError> {
    collect(
        ResourceClass::Socket,
        rt.ports(),
        |id| normalize::socket_record(rt, id),
        query,
    )
}
