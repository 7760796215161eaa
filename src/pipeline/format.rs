// Display formatting for socket endpoints, socket states and initial calls.
// Output strings are consumed by existing dashboards; keep them byte-stable.

use std::net::IpAddr;

use crate::models::Value;
use crate::runtime::{AddressError, Endpoint};

/// `*:<port>` for the any-address, `localhost:<port>` for loopback, `local:<path>`
/// for unix-domain sockets, `*:*` when not connected and a single space for any
/// other read failure.
pub fn format_address(address: &Result<Endpoint, AddressError>) -> String {
    match address {
        Ok(Endpoint::Local(path)) => format!("local:{}", path),
        Ok(Endpoint::Inet { ip, port }) => {
            if ip.is_unspecified() {
                format!("*:{}", port)
            } else if is_loopback_literal(ip) {
                format!("localhost:{}", port)
            } else {
                format!("{}:{}", ip, port)
            }
        }
        Err(AddressError::NotConnected) => "*:*".into(),
        Err(AddressError::Other(_)) => " ".into(),
    }
}

// Only the canonical loopback addresses, not all of 127.0.0.0/8.
fn is_loopback_literal(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.octets() == [127, 0, 0, 1],
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

/// Connection state label from the socket's status flags, matched on the sorted
/// flag list in priority order. Unknown combinations print the sorted list.
pub fn format_socket_state(flags: &[String]) -> String {
    let mut sorted: Vec<&str> = flags.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let label = match sorted.as_slice() {
        ["accepting", ..] => "ACCEPTING",
        ["bound", "busy", "connected", ..] => "BUSY",
        ["bound", "connected", ..] => "CONNECTED",
        ["bound", "listen", "listening", ..] => "LISTENING",
        ["bound", "listen", ..] => "LISTEN",
        ["bound", "connecting", ..] => "CONNECTING",
        ["bound", "open"] => "BOUND",
        ["connected", "open"] => "CONNECTED",
        ["open"] => "IDLE",
        [] => "CLOSED",
        other => return format!("{:?}", other),
    };
    label.to_string()
}

/// `module.function/arity` for an initial-call tuple; other shapes print as-is.
pub fn format_call(call: &Value) -> String {
    match call {
        Value::Tuple(parts) => match parts.as_slice() {
            [module, function, Value::Int(arity)] => {
                format!("{}.{}/{}", module, function, arity)
            }
            _ => call.to_text(),
        },
        other => other.to_text(),
    }
}
