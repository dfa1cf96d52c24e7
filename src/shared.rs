use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    client::RconSession,
    errors::RconError,
    transport::{Connector, TcpConnector},
};

/// Cloneable handle that lets several tasks use one session.
///
/// Each call holds the session lock until its response is complete, so
/// responses can never interleave between callers.
pub struct SharedSession<C: Connector = TcpConnector> {
    inner: Arc<Mutex<RconSession<C>>>,
}

impl<C: Connector> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Connector> From<RconSession<C>> for SharedSession<C> {
    fn from(session: RconSession<C>) -> Self {
        Self { inner: Arc::new(Mutex::new(session)) }
    }
}

impl<C: Connector> SharedSession<C> {
    pub async fn authenticate(&self, password: &str) -> Result<bool, RconError> {
        self.inner.lock().await.authenticate(password).await
    }

    pub async fn execute(&self, command: &str) -> Result<String, RconError> {
        self.inner.lock().await.execute(command).await
    }

    pub async fn disconnect(&self) {
        self.inner.lock().await.disconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_connected()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.is_authenticated()
    }
}
