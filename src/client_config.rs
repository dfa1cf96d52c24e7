use std::time::Duration;

use crate::aggregator::ResponseStrategy;

#[derive(Debug, Clone)]
pub struct RconClientConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub max_packet_size: usize,
    pub response_strategy: ResponseStrategy,
}

pub const DEFAULT_PORT: u16 = 27015;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_PACKET_SIZE: usize = 4096;

impl Default for RconClientConfig {
    fn default() -> Self {
        Self::new("127.0.0.1")
    }
}

impl RconClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            response_strategy: ResponseStrategy::default(),
        }
    }

    pub fn port(mut self, port: u16) -> Self { self.port = port; self }

    /// Upper bound for a whole `connect`, `authenticate` or `execute` call.
    pub fn timeout(mut self, t: Duration) -> Self { self.timeout = t; self }

    /// Largest encoded request the client will send. `0` disables the check.
    pub fn max_packet_size(mut self, v: usize) -> Self { self.max_packet_size = v; self }

    /// How the client decides that a multi-packet response is complete.
    pub fn response_strategy(mut self, s: ResponseStrategy) -> Self { self.response_strategy = s; self }
}
