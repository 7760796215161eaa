// Fetch one snapshot from a running agent and print it as JSON.
//
// Usage: cargo run --example query -- NODE [CLASS] [SORT_BY] [LIMIT] [SEARCH]
//   NODE     node name listed under [transport.peers], e.g. alpha
//   CLASS    processes | ports | tables | sockets | usage   (default: processes)
//   SORT_BY  default: memory (processes), input (ports), size (tables), recv_oct (sockets)
//   LIMIT    default: 20
//
// Peer addresses and the call timeout come from the `[transport]` section of
// the config file (CONFIG_FILE, default config.toml).

use nodescope::config::AppConfig;
use nodescope::dispatch::{HttpTransport, Inspector};
use nodescope::models::{SnapshotQuery, SortDirection};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(node) = args.get(1) else {
        anyhow::bail!("usage: query NODE [CLASS] [SORT_BY] [LIMIT] [SEARCH]");
    };
    let class = args.get(2).map(String::as_str).unwrap_or("processes");
    let default_sort = match class {
        "ports" => "input",
        "tables" => "size",
        "sockets" => "recv_oct",
        _ => "memory",
    };
    let sort_by = args.get(3).map(String::as_str).unwrap_or(default_sort);
    let limit: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(20);

    let mut query = SnapshotQuery::new(sort_by, SortDirection::Desc, limit);
    if let Some(search) = args.get(5) {
        query = query.with_search(search.as_str());
    }

    let config = AppConfig::load()?;
    let inspector = Inspector::new(HttpTransport::from_config(&config.transport)?);

    let json = match class {
        "usage" => serde_json::to_string_pretty(&inspector.fetch_system_usage(node).await?)?,
        "ports" => serde_json::to_string_pretty(&inspector.fetch_ports(node, query).await?)?,
        "tables" => serde_json::to_string_pretty(&inspector.fetch_tables(node, query).await?)?,
        "sockets" => serde_json::to_string_pretty(&inspector.fetch_sockets(node, query).await?)?,
        _ => serde_json::to_string_pretty(&inspector.fetch_processes(node, query).await?)?,
    };
    println!("{}", json);
    Ok(())
}
