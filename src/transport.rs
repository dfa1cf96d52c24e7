use std::sync::Mutex;

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

/// Opens the byte stream a session talks over.
///
/// The session only needs something it can write frames to and read chunks
/// from, so tests hand it in-memory streams instead of sockets.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn connect(&self, host: &str, port: u16) -> std::io::Result<Self::Stream>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> std::io::Result<TcpStream> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        log::debug!("Opened tcp stream to {}:{}", host, port);
        Ok(stream)
    }
}

/// Hands out a stream that is already open, once.
///
/// Useful when the caller manages the socket itself. A second `connect`
/// fails with [`std::io::ErrorKind::NotConnected`].
pub struct Preconnected<S> {
    stream: Mutex<Option<S>>,
}

impl<S> Preconnected<S> {
    pub fn new(stream: S) -> Self {
        Self { stream: Mutex::new(Some(stream)) }
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> Connector for Preconnected<S> {
    type Stream = S;

    async fn connect(&self, _host: &str, _port: u16) -> std::io::Result<S> {
        let taken = match self.stream.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => return Err(std::io::Error::other("stream slot poisoned")),
        };
        taken.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "stream was already handed out"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn preconnected_hands_out_stream_once() {
        let (client_stream, _server_stream) = duplex(64);
        let connector = Preconnected::new(client_stream);

        assert!(connector.connect("ignored", 0).await.is_ok());
        let err = connector.connect("ignored", 0).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
    }

    #[tokio::test]
    async fn tcp_connector_reports_refused_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(TcpConnector.connect("127.0.0.1", port).await.is_err());
    }
}
