//! GDB remote debugging over TCP

pub mod checksum;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod gdb;
pub mod packet;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use connection::{Connection, ConnectionState, Session};
pub use error::GdbError;
pub use gdb::{GdbServer, RegisterAccess, RegisterSnapshot, StopReason, MAX_PACKET_SIZE};

/// Parse `port`, listen on it and serve a single debug session.
///
/// Returns once the client disconnects; the listener is closed by then.
pub fn start<R: RegisterAccess + ?Sized>(port: &str, target: &R) -> Result<(), GdbError> {
    let config = ServerConfig::from_port_str(port)?;
    GdbServer::bind(config.port)?.serve_one(target)
}
