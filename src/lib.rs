//! Async client for Valve's [Source RCON protocol](https://developer.valvesoftware.com/wiki/Source_RCON_Protocol).
//!
//! ```no_run
//! use valve_rcon::{RconClientConfig, RconSession};
//!
//! # async fn run() -> Result<(), valve_rcon::errors::RconError> {
//! let mut session = RconSession::new(RconClientConfig::new("127.0.0.1").port(27015));
//! if session.authenticate("password").await? {
//!     println!("{}", session.execute("status").await?);
//! }
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```
pub mod aggregator;
pub mod client;
pub mod client_config;
mod client_io;
pub mod common;
mod connect;
pub mod errors;
mod execute;
pub mod packet;
pub mod shared;
pub mod transport;

pub use aggregator::ResponseStrategy;
pub use client::RconSession;
pub use client_config::RconClientConfig;
pub use errors::RconError;
pub use shared::SharedSession;
pub use transport::{Connector, Preconnected, TcpConnector};
