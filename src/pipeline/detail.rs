// Single-resource lookups. Ok(None) means the handle no longer points at anything.

use tracing::instrument;

use super::{RequestError, ResourceClass, normalize};
use crate::models::{Attributes, ResourceHandle};
use crate::runtime::NodeRuntime;

fn local_id(
    rt: &dyn NodeRuntime,
    class: ResourceClass,
    handle: &ResourceHandle,
) -> Result<u64, RequestError> {
    if handle.kind != class.handle_kind() {
        return Err(RequestError::WrongHandleKind {
            class,
            handle: handle.to_string(),
        });
    }
    if handle.node != rt.node_name() {
        return Err(RequestError::ForeignHandle {
            node: rt.node_name().to_string(),
            handle: handle.to_string(),
        });
    }
    Ok(handle.id)
}

fn only(mut info: Attributes, keys: &[String]) -> Attributes {
    info.retain(|key, _| keys.iter().any(|k| k == key));
    info
}

#[instrument(skip(rt, keys), fields(handle = %handle, operation = "fetch_process_info"))]
pub fn fetch_process_info(
    rt: &dyn NodeRuntime,
    handle: &ResourceHandle,
    keys: &[String],
) -> Result<Option<Attributes>, RequestError> {
    let id = local_id(rt, ResourceClass::Process, handle)?;
    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    Ok(rt.process_info(id, &keys))
}

#[instrument(skip(rt, keys), fields(handle = %handle, operation = "fetch_port_info"))]
pub fn fetch_port_info(
    rt: &dyn NodeRuntime,
    handle: &ResourceHandle,
    keys: &[String],
) -> Result<Option<Attributes>, RequestError> {
    let id = local_id(rt, ResourceClass::Port, handle)?;
    Ok(rt.port_info(id).map(|info| only(info, keys)))
}

/// Full info set; tables have no field selection.
#[instrument(skip(rt), fields(handle = %handle, operation = "fetch_table_info"))]
pub fn fetch_table_info(
    rt: &dyn NodeRuntime,
    handle: &ResourceHandle,
) -> Result<Option<Attributes>, RequestError> {
    let id = local_id(rt, ResourceClass::Table, handle)?;
    Ok(rt.table_info(id))
}

/// Built from the same combined record as socket listings, then narrowed.
#[instrument(skip(rt, keys), fields(handle = %handle, operation = "fetch_socket_info"))]
pub fn fetch_socket_info(
    rt: &dyn NodeRuntime,
    handle: &ResourceHandle,
    keys: &[String],
) -> Result<Option<Attributes>, RequestError> {
    let id = local_id(rt, ResourceClass::Socket, handle)?;
    Ok(normalize::socket_record(rt, id).map(|record| only(record, keys)))
}
