use tokio::time::timeout;

use crate::{
    aggregator::Step,
    client::RconSession,
    common::{ID_TERM, PacketType},
    errors::RconError,
    transport::Connector,
};

impl<C: Connector> RconSession<C> {
    /// Runs a console command and returns its complete output.
    ///
    /// Multi-packet responses are joined according to the configured
    /// [`ResponseStrategy`](crate::ResponseStrategy). A failure or timeout
    /// leaves the connection open; disconnect before reusing it after a
    /// timeout, since late packets may still be queued.
    pub async fn execute(&mut self, command: &str) -> Result<String, RconError> {
        if self.stream.is_none() {
            return Err(RconError::NotConnected);
        }
        if !self.authenticated {
            return Err(RconError::NotAuthenticated);
        }

        let cmd_id = self.next_command_id();
        timeout(self.client_config.timeout, self.exchange(cmd_id, command))
            .await
            .map_err(|_| RconError::Timeout)?
    }

    async fn exchange(&mut self, cmd_id: i32, command: &str) -> Result<String, RconError> {
        log::debug!("Executing command {:?} with id {}", command, cmd_id);
        self.write_packet(PacketType::ServerDataExecCommand, cmd_id, command).await?;

        let mut aggregator = self.client_config.response_strategy.aggregator(cmd_id);

        loop {
            let step = match aggregator.idle_window() {
                Some(window) => match timeout(window, self.read_packet()).await {
                    Ok(pkt) => aggregator.accept(&pkt?)?,
                    Err(_) => {
                        log::debug!("Idle window elapsed while waiting for more data");
                        aggregator.on_idle()
                    }
                },
                None => {
                    let pkt = self.read_packet().await?;
                    aggregator.accept(&pkt)?
                }
            };

            match step {
                Step::Pending => (),
                Step::Probe => {
                    log::debug!("Response may continue, sending termination probe");
                    self.write_packet(PacketType::ServerDataResponseValue, ID_TERM, "").await?;
                },
                Step::Complete => break,
            }
        }

        aggregator.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{RconClientConfig, ResponseStrategy};
    use crate::common::{ID_AUTH, SERVERDATA_AUTH_RESPONSE, SERVERDATA_EXECCOMMAND, SERVERDATA_RESPONSE_VALUE};
    use crate::packet::{Packet, decode, encode};
    use crate::transport::Preconnected;

    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

    const MAX_BUFFER_SIZE: usize = 65536;

    async fn read_request(stream: &mut DuplexStream) -> Packet {
        let mut size = [0u8; 4];
        stream.read_exact(&mut size).await.unwrap();
        let mut rest = vec![0u8; i32::from_le_bytes(size) as usize];
        stream.read_exact(&mut rest).await.unwrap();

        let mut frame = size.to_vec();
        frame.extend_from_slice(&rest);
        decode(&frame).unwrap()
    }

    async fn authenticated(config: RconClientConfig) -> (RconSession<Preconnected<DuplexStream>>, DuplexStream) {
        let (client_stream, mut server_stream) = duplex(MAX_BUFFER_SIZE);
        let mut client = RconSession::with_connector(config, Preconnected::new(client_stream));

        server_stream.write_all(&encode(SERVERDATA_AUTH_RESPONSE, ID_AUTH, "")).await.unwrap();
        assert!(client.authenticate("pw").await.unwrap());
        read_request(&mut server_stream).await;

        (client, server_stream)
    }

    #[tokio::test]
    async fn exec_resolves_single_packet_response() {
        let (mut client, mut server_stream) = authenticated(RconClientConfig::default()).await;

        let server = tokio::spawn(async move {
            let cmd = read_request(&mut server_stream).await;
            assert_eq!(cmd.kind(), SERVERDATA_EXECCOMMAND);
            assert_eq!(cmd.body_str(), Some("echo hello"));
            assert!((1..=255).contains(&cmd.id()));

            server_stream.write_all(&encode(SERVERDATA_RESPONSE_VALUE, cmd.id(), "hello")).await.unwrap();
            server_stream
        });

        let out = client.execute("echo hello").await.unwrap();
        assert_eq!(out, "hello");

        // No probe follows a small response.
        let mut server_stream = server.await.unwrap();
        drop(client);
        let mut rest = Vec::new();
        server_stream.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn exec_before_auth_fails_without_touching_network() {
        let (client_stream, mut server_stream) = duplex(MAX_BUFFER_SIZE);
        let mut client = RconSession::with_connector(RconClientConfig::default(), Preconnected::new(client_stream));

        assert!(matches!(client.execute("status").await, Err(RconError::NotConnected)));

        client.connect().await.unwrap();
        assert!(matches!(client.execute("status").await, Err(RconError::NotAuthenticated)));

        drop(client);
        let mut rest = Vec::new();
        server_stream.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn exec_times_out_but_stays_connected() {
        let config = RconClientConfig::default().timeout(Duration::from_millis(50));
        let (mut client, _server_stream) = authenticated(config).await;

        let err = client.execute("status").await.unwrap_err();

        assert!(matches!(err, RconError::Timeout));
        assert!(client.is_connected());
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn exec_fails_on_auth_failure_id_mid_response() {
        let (mut client, mut server_stream) = authenticated(RconClientConfig::default()).await;

        let server = tokio::spawn(async move {
            read_request(&mut server_stream).await;
            server_stream.write_all(&encode(SERVERDATA_RESPONSE_VALUE, -1, "")).await.unwrap();
            server_stream
        });

        let err = client.execute("status").await.unwrap_err();
        assert!(matches!(err, RconError::AuthenticationFailed));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn exec_rejects_oversized_command() {
        let config = RconClientConfig::default().max_packet_size(32);
        let (mut client, _server_stream) = authenticated(config).await;

        let err = client.execute(&"x".repeat(64)).await.unwrap_err();
        assert!(matches!(err, RconError::PacketTooLarge { size: 78, max: 32 }));
    }

    #[tokio::test]
    async fn exec_aggregates_multiple_packets_then_stops_on_idle() {
        const WINDOW: Duration = Duration::from_millis(100);
        let config = RconClientConfig::default()
            .timeout(Duration::from_secs(2))
            .response_strategy(ResponseStrategy::IdleGap(WINDOW));
        let (mut client, mut server_stream) = authenticated(config).await;

        let server = tokio::spawn(async move {
            let cmd = read_request(&mut server_stream).await;
            server_stream.write_all(&encode(SERVERDATA_RESPONSE_VALUE, cmd.id(), "hello ")).await.unwrap();
            server_stream.write_all(&encode(SERVERDATA_RESPONSE_VALUE, cmd.id(), "world")).await.unwrap();
            tokio::time::sleep(WINDOW * 3).await;
            server_stream
        });

        let out = client.execute("cmd").await.unwrap();
        assert_eq!(out, "hello world");
        server.await.unwrap();
    }
}
