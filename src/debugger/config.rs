use super::error::GdbError;

/// Default GDB server port
pub const DEFAULT_PORT: u16 = 1234;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    /// Parse the textual port given on the command line.
    ///
    /// Zero, negative and non-numeric ports are rejected.
    pub fn from_port_str(port: &str) -> Result<Self, GdbError> {
        let invalid = || GdbError::InvalidPort(port.to_string());
        let trimmed = port.trim();

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        match trimmed.parse::<u16>() {
            Ok(0) | Err(_) => Err(invalid()),
            Ok(port) => Ok(Self { port }),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}
