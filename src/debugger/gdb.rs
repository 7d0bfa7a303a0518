//! GDB Remote Serial Protocol Server
//!
//! Serves one GDB session against a 64-bit, 32-register CPU.
//! Connect with: `gdb-multiarch -ex "target remote :1234"`

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, RwLock};

use log::info;

use super::connection::Connection;
use super::error::GdbError;

/// Receive buffer size, the largest request accepted in one read
pub const MAX_PACKET_SIZE: usize = 1024;

/// GDB stop reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Target halted (initial state)
    Halted,
}

impl StopReason {
    /// Convert to GDB signal number
    pub fn signal(&self) -> u8 {
        match self {
            StopReason::Halted => 5, // SIGTRAP
        }
    }
}

/// Register state as GDB sees it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub gpr: [u64; 32],
    pub pc: u64,
}

/// Read-only view of the CPU registers handed to the server
pub trait RegisterAccess {
    fn snapshot(&self) -> RegisterSnapshot;
}

impl RegisterAccess for RegisterSnapshot {
    fn snapshot(&self) -> RegisterSnapshot {
        *self
    }
}

/// The read lock is held only while the registers are copied out
impl<T: RegisterAccess> RegisterAccess for RwLock<T> {
    fn snapshot(&self) -> RegisterSnapshot {
        match self.read() {
            Ok(guard) => guard.snapshot(),
            Err(poisoned) => poisoned.into_inner().snapshot(),
        }
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for Arc<T> {
    fn snapshot(&self) -> RegisterSnapshot {
        (**self).snapshot()
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn snapshot(&self) -> RegisterSnapshot {
        (**self).snapshot()
    }
}

/// GDB Server state
pub struct GdbServer {
    /// TCP listener
    listener: TcpListener,
}

impl GdbServer {
    /// Bind a listener on all interfaces
    pub fn bind(port: u16) -> Result<Self, GdbError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::bind(addr).map_err(|source| match source.kind() {
            io::ErrorKind::AddrInUse
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::PermissionDenied => GdbError::Bind { addr, source },
            _ => GdbError::Socket(source),
        })?;

        info!("Started a server at {}", listener.local_addr()?.port());

        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, GdbError> {
        Ok(self.listener.local_addr()?)
    }

    /// Block until a client connects
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr), GdbError> {
        loop {
            match self.listener.accept() {
                Ok(accepted) => return Ok(accepted),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(GdbError::Socket(e)),
            }
        }
    }

    /// Serve exactly one debug session, then close the listener
    pub fn serve_one<R: RegisterAccess + ?Sized>(self, target: &R) -> Result<(), GdbError> {
        let (stream, addr) = self.accept()?;
        info!("Connection accepted: {}", addr);

        stream.set_nonblocking(true)?;
        Connection::new(stream, addr, target).run();

        info!("Session with {} ended, closing listener", addr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::thread;

    #[test]
    fn test_stop_reason() {
        assert_eq!(StopReason::Halted.signal(), 5);
    }

    #[test]
    fn test_register_snapshot_default() {
        let regs = RegisterSnapshot::default();
        assert_eq!(regs.gpr[0], 0);
        assert_eq!(regs.gpr[31], 0);
        assert_eq!(regs.pc, 0);
    }

    #[test]
    fn test_register_access_wrappers() {
        let mut regs = RegisterSnapshot::default();
        regs.gpr[3] = 42;
        regs.pc = 0x8000_0000;

        let shared = Arc::new(RwLock::new(regs));
        assert_eq!(shared.snapshot(), regs);
        assert_eq!((&regs).snapshot(), regs);

        shared.write().unwrap().gpr[3] = 7;
        assert_eq!(shared.snapshot().gpr[3], 7);
    }

    #[test]
    fn test_poisoned_lock_still_readable() {
        let shared = Arc::new(RwLock::new(RegisterSnapshot::default()));
        let writer = Arc::clone(&shared);
        let _ = thread::spawn(move || {
            let mut guard = writer.write().unwrap();
            guard.pc = 0x100;
            panic!("poison the lock");
        })
        .join();

        assert!(shared.is_poisoned());
        assert_eq!(shared.snapshot().pc, 0x100);
    }

    #[test]
    fn test_bind_port_in_use() {
        let first = GdbServer::bind(0).expect("Failed to create GDB server");
        let port = first.local_addr().unwrap().port();

        match GdbServer::bind(port) {
            Err(GdbError::Bind { addr, .. }) => assert_eq!(addr.port(), port),
            Err(other) => panic!("expected a bind error, got {}", other),
            Ok(_) => panic!("second bind on port {} should fail", port),
        }
    }

    #[test]
    fn test_serve_one_session() {
        let server = GdbServer::bind(0).expect("Failed to create GDB server");
        let port = server.local_addr().unwrap().port();

        let handle = thread::spawn(move || server.serve_one(&RegisterSnapshot::default()));

        let mut client =
            TcpStream::connect(format!("127.0.0.1:{}", port)).expect("Failed to connect");
        client.write_all(b"$?#3f").unwrap();

        let mut buf = [0u8; 8];
        client.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"+$S05#b8");

        drop(client);
        assert!(handle.join().unwrap().is_ok());

        // The listener is gone once the session ends
        assert!(TcpStream::connect(format!("127.0.0.1:{}", port)).is_err());
    }
}
