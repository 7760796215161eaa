// HTTP transport: POSTs the request as JSON to the target node's agent at
// `http://<peer>/rpc`.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{instrument, warn};

use super::{Request, Response, Transport, TransportError};
use crate::config::TransportConfig;
use crate::version;

pub struct HttpTransport {
    client: reqwest::Client,
    /// Node name -> `host:port` of its agent.
    peers: BTreeMap<String, String>,
}

impl HttpTransport {
    pub fn new(peers: BTreeMap<String, String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self { client, peers })
    }

    /// Peers and timeout from the `[transport]` config section.
    pub fn from_config(config: &TransportConfig) -> anyhow::Result<Self> {
        Self::new(config.peers.clone(), config.timeout())
    }

    fn endpoint(&self, node: &str) -> Result<String, TransportError> {
        self.peers
            .get(node)
            .map(|addr| format!("http://{}/rpc", addr))
            .ok_or_else(|| TransportError::Unreachable {
                node: node.to_string(),
                reason: "no peer address configured".into(),
            })
    }

    fn send_error(node: &str, e: reqwest::Error) -> TransportError {
        let node = node.to_string();
        if e.is_timeout() {
            TransportError::Timeout { node }
        } else if e.is_connect() {
            TransportError::Unreachable {
                node,
                reason: e.to_string(),
            }
        } else {
            TransportError::Remote {
                node,
                reason: e.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(transport = "http", operation = request.operation()))]
    async fn call(&self, node: &str, request: Request) -> Result<Response, TransportError> {
        let url = self.endpoint(node)?;
        let reply = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::send_error(node, e))?;

        let status = reply.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let reason = match reply.text().await {
                Ok(body) => body,
                Err(e) => format!("unreadable error body: {}", e),
            };
            return Err(TransportError::BadArguments {
                node: node.to_string(),
                reason,
            });
        }
        if !status.is_success() {
            warn!(node, %status, "rpc call failed");
            return Err(TransportError::Remote {
                node: node.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        reply.json::<Response>().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    node: node.to_string(),
                }
            } else {
                TransportError::Protocol {
                    node: node.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }
}
