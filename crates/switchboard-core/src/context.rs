use std::net::SocketAddr;

use http::HeaderMap;

/// Per-request identity carried from the gatekeeper into the engine
///
/// Built once by the server middleware and never shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identifier used to correlate log lines for one request
    pub request_id: String,
    /// Best-effort client address
    pub client_ip: String,
    /// Raw `User-Agent` header, if any
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Build a context from inbound request headers and the peer address
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let user_agent = headers
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        Self {
            request_id: new_request_id(),
            client_ip: client_ip(headers, peer),
            user_agent,
        }
    }

    /// Create a context for calls that do not originate from HTTP
    pub fn empty() -> Self {
        Self {
            request_id: new_request_id(),
            client_ip: "unknown".to_owned(),
            user_agent: None,
        }
    }

    /// Whether the user agent contains any of the given needles, ignoring case
    pub fn user_agent_matches(&self, needles: &[String]) -> bool {
        let Some(agent) = self.user_agent.as_deref() else {
            return false;
        };
        let agent = agent.to_ascii_lowercase();

        needles
            .iter()
            .any(|needle| !needle.is_empty() && agent.contains(&needle.to_ascii_lowercase()))
    }
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().simple())
}

/// Resolve the client address from proxy headers, falling back to the peer
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    // First hop of X-Forwarded-For is the original client
    if let Some(first) = header("x-forwarded-for").and_then(|xff| xff.split(',').next()) {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_owned();
        }
    }

    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_owned();
    }

    peer.map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string())
}
