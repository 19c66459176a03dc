use std::net::SocketAddr;
use std::time::Duration;

/// Transport settings. Artifact paths are not part of this; the server is
/// handed an already-loaded pipeline.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// The single origin allowed to call the API from a browser.
    pub allowed_origin: String,
    pub timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            allowed_origin: "http://localhost:5173".to_string(),
            timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
