//! Per-connection request handling
//!
//! [`Session`] turns received buffers into bytes to send back and keeps
//! the last reply around for naks. [`Connection`] drives a session from
//! a non-blocking socket.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use log::{debug, info, trace, warn};

use super::dispatch::dispatch;
use super::gdb::{RegisterAccess, StopReason, MAX_PACKET_SIZE};
use super::packet::{self, Inbound, NAK};

/// How long to back off when the socket has nothing for us
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Socket-free protocol state for one client
pub struct Session<'a, R: ?Sized> {
    target: &'a R,
    stop_reason: StopReason,
    /// Last framed reply, resent verbatim on `-`
    last_reply: Option<Vec<u8>>,
}

impl<'a, R: RegisterAccess + ?Sized> Session<'a, R> {
    pub fn new(target: &'a R) -> Self {
        Self {
            target,
            stop_reason: StopReason::Halted,
            last_reply: None,
        }
    }

    /// Process one received buffer, returning what to write back (if anything)
    pub fn handle(&mut self, buf: &[u8]) -> Option<&[u8]> {
        match packet::parse(buf) {
            Inbound::Ack => None,
            Inbound::Nak => {
                if self.last_reply.is_none() {
                    debug!("Nak before any reply, nothing to resend");
                }
                self.last_reply.as_deref()
            }
            Inbound::Packet(pkt) => {
                debug!(
                    "checksum: {:02x}, payload: {}",
                    pkt.checksum,
                    String::from_utf8_lossy(pkt.payload)
                );
                let reply = dispatch(pkt.payload, self.target, self.stop_reason);
                self.last_reply = Some(packet::encode_reply(&reply));
                self.last_reply.as_deref()
            }
            Inbound::Corrupt { expected, received } => {
                warn!(
                    "Dropping packet with bad checksum {:02x} (expected {:02x})",
                    received, expected
                );
                None
            }
            Inbound::Malformed => {
                warn!("Malformed packet: {}", String::from_utf8_lossy(buf));
                Some(NAK)
            }
            Inbound::Noise => {
                trace!("Ignoring {} unframed bytes", buf.len());
                None
            }
        }
    }

    pub fn last_reply(&self) -> Option<&[u8]> {
        self.last_reply.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Just accepted
    Idle,
    /// Polling the socket
    Receiving,
    /// Writing a reply
    Replying,
    /// Peer gone or fatal error
    Closed,
}

/// Owns one accepted socket for its whole lifetime
pub struct Connection<'a, R: ?Sized> {
    stream: TcpStream,
    peer: SocketAddr,
    session: Session<'a, R>,
    state: ConnectionState,
}

impl<'a, R: RegisterAccess + ?Sized> Connection<'a, R> {
    pub fn new(stream: TcpStream, peer: SocketAddr, target: &'a R) -> Self {
        Self {
            stream,
            peer,
            session: Session::new(target),
            state: ConnectionState::Idle,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn transition(&mut self, next: ConnectionState) {
        trace!("{}: {:?} -> {:?}", self.peer, self.state, next);
        self.state = next;
    }

    /// Serve requests until the peer disconnects or the socket fails.
    /// The stream must already be non-blocking; it is closed when this returns.
    pub fn run(mut self) {
        self.transition(ConnectionState::Receiving);

        let mut buffer = [0u8; MAX_PACKET_SIZE];

        while self.state != ConnectionState::Closed {
            match self.stream.read(&mut buffer) {
                Ok(0) => {
                    info!("Client disconnected: {}", self.peer);
                    self.transition(ConnectionState::Closed);
                }
                Ok(n) => {
                    let received = &buffer[..n];
                    debug!("Received: {}", String::from_utf8_lossy(received));

                    if let Some(reply) = self.session.handle(received) {
                        self.state = ConnectionState::Replying;
                        trace!("{}: Receiving -> Replying", self.peer);
                        debug!("Send: {}", String::from_utf8_lossy(reply));
                        if let Err(e) = self.stream.write_all(reply) {
                            warn!("{}: write failed: {}", self.peer, e);
                        }
                        self.transition(ConnectionState::Receiving);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("{}: recv failed: {}", self.peer, e);
                    self.transition(ConnectionState::Closed);
                }
            }
        }
    }
}
