use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that stop the GDB server from serving a session
#[derive(Debug, Error)]
pub enum GdbError {
    #[error("invalid port {0:?}: expected an integer in 1..=65535")]
    InvalidPort(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("socket error: {0}")]
    Socket(#[from] io::Error),
}
