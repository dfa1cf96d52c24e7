use thiserror::Error;

#[derive(Debug, Error)]
pub enum RconError {
    #[error("connection error: {0}")]
    Connection(std::io::Error),

    #[error("utf8 error: {0}")]
    Utf8(std::string::FromUtf8Error),

    #[error("already authenticated")]
    AlreadyAuthenticated,

    #[error("not connected")]
    NotConnected,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("packet size too big: {size} bytes exceeds the {max} byte limit")]
    PacketTooLarge { size: usize, max: usize },

    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("operation timed out")]
    Timeout,
}

impl From<std::io::Error> for RconError {
    fn from(e: std::io::Error) -> Self { RconError::Connection(e) }
}
impl From<std::string::FromUtf8Error> for RconError {
    fn from(e: std::string::FromUtf8Error) -> Self { RconError::Utf8(e) }
}
