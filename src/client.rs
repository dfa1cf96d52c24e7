use rand::{SeedableRng, rngs::StdRng};
use tokio::io::AsyncWriteExt;

use crate::{
    RconClientConfig,
    transport::{Connector, TcpConnector},
};

/// A single RCON connection and its authentication state.
///
/// The session moves from unconnected to connected (the first
/// [`authenticate`](RconSession::authenticate) or an explicit
/// [`connect`](RconSession::connect)) to authenticated.
/// [`disconnect`](RconSession::disconnect) returns it to unconnected from any
/// state. Calls take `&mut self`, so at most one request is in flight; wrap the
/// session in a [`SharedSession`](crate::SharedSession) to share it between tasks.
pub struct RconSession<C: Connector = TcpConnector> {
    pub(crate) connector: C,
    pub(crate) stream: Option<C::Stream>,
    pub(crate) inbound: Vec<u8>,
    pub(crate) authenticated: bool,
    pub(crate) rng: StdRng,
    pub(crate) client_config: RconClientConfig,
}

impl RconSession<TcpConnector> {
    pub fn new(client_config: RconClientConfig) -> Self {
        RconSession::with_connector(client_config, TcpConnector)
    }
}

impl<C: Connector> RconSession<C> {
    pub fn with_connector(client_config: RconClientConfig, connector: C) -> Self {
        RconSession {
            connector,
            stream: None,
            inbound: Vec::new(),
            authenticated: false,
            rng: StdRng::from_os_rng(),
            client_config,
        }
    }

    /// Seeds the generator for command ids, making them reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn config(&self) -> &RconClientConfig {
        &self.client_config
    }

    /// Drops authentication and closes the transport. Safe to call repeatedly.
    pub async fn disconnect(&mut self) {
        self.authenticated = false;
        self.inbound.clear();

        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                log::warn!("Failed to shut down rcon stream cleanly: {}", e);
            }
            log::debug!("Disconnected");
        }
    }
}
