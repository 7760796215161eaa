// Build-time identity, reported by GET /version and in the node banner

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `name/version`, sent as the User-Agent of outgoing RPC calls.
pub fn user_agent() -> String {
    format!("{}/{}", NAME, VERSION)
}
