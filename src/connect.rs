use tokio::time::timeout;

use crate::{
    client::RconSession,
    common::{ID_AUTH, ID_AUTH_FAILED, PacketType, SERVERDATA_AUTH_RESPONSE},
    errors::RconError,
    transport::Connector,
};

impl<C: Connector> RconSession<C> {
    /// Opens the transport if it is not open yet.
    pub async fn connect(&mut self) -> Result<(), RconError> {
        timeout(self.client_config.timeout, self.open())
            .await
            .map_err(|_| RconError::Timeout)?
    }

    async fn open(&mut self) -> Result<(), RconError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = self
            .connector
            .connect(&self.client_config.host, self.client_config.port)
            .await?;
        self.inbound.clear();
        self.stream = Some(stream);
        log::debug!("Connected to {}:{}", self.client_config.host, self.client_config.port);
        Ok(())
    }

    /// Authenticates with the server, connecting first if needed.
    ///
    /// Returns `Ok(false)` when the server rejects the password. Rejection,
    /// errors and timeouts all leave the session disconnected.
    pub async fn authenticate(&mut self, password: &str) -> Result<bool, RconError> {
        if self.authenticated {
            return Err(RconError::AlreadyAuthenticated);
        }

        log::debug!("Starting authentication...");
        let outcome = timeout(self.client_config.timeout, self.handshake(password))
            .await
            .unwrap_or(Err(RconError::Timeout));

        match outcome {
            Ok(true) => {
                self.authenticated = true;
                log::debug!("Authenticated");
                Ok(true)
            },
            Ok(false) => {
                log::debug!("Server rejected the password");
                self.disconnect().await;
                Ok(false)
            },
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self, password: &str) -> Result<bool, RconError> {
        self.open().await?;
        self.write_packet(PacketType::ServerDataAuth, ID_AUTH, password).await?;

        loop {
            let pkt = self.read_packet().await?;
            if pkt.kind() != SERVERDATA_AUTH_RESPONSE {
                log::debug!("Received non-auth response packet while waiting for auth response, ignoring: {:?}", pkt);
                continue;
            }

            return Ok(pkt.id() != ID_AUTH_FAILED);
        }
    }
}
