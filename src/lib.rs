//! Runtime inspection for named nodes: snapshots of processes, ports, tables
//! and sockets, single-resource info, and system usage, served locally or
//! over HTTP between agents.
//!
//! The data comes from a [`runtime::Registry`]. The stock agent binary feeds it
//! only from the host sampler: memory, uptime, run queues, network io and
//! (optionally) OS processes. Ports, tables and sockets stay empty until the
//! embedding application registers them with `open_port`, `open_socket` and
//! `new_table`, and keeps them current with the matching update calls.

pub mod config;
pub mod dispatch;
pub mod host;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod runtime;
pub mod version;
pub mod worker;
