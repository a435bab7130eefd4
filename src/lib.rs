#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
//! `slping` is a client for the Minecraft Server List Ping protocol. It
//! connects to a Java edition server, asks for its status and returns the
//! MOTD, player counts, player sample, version, icon and mod list.
//!
//! `_minecraft._tcp` SRV records are honoured before connecting, and status
//! frames split across any number of reads are reassembled, up to a
//! configurable cap.
//!
//! The main API surface is [`tokio::get_server_status`].

pub mod packet;
pub mod session;
pub mod tokio;
pub mod varint;

mod query;
mod status;

use std::{fmt, str::FromStr};

pub use query::{DEFAULT_PROTOCOL_VERSION, DEFAULT_TIMEOUT, ListPing};
pub use session::Session;
pub use status::{Description, ModInfo, ModMetadata, Player, Players, ServerStatus, Version};

/// The default port of a Java edition server.
pub const DEFAULT_PORT: u16 = 25565;

/// Errors that can occur when pinging a server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("server status request to {0} timed out")]
    Timeout(Endpoint),
    #[error("server {0} not found")]
    HostUnresolvable(Endpoint),
    #[error("server {0} refused to connect, is the port correct?")]
    ConnectionRefused(Endpoint),
    #[error("invalid response: expected packet type {expected}, received {received}")]
    ProtocolMismatch { expected: i32, received: i32 },
    #[error("status frame was still incomplete after {iterations} reads")]
    FrameOverflow { iterations: usize },
    #[error("server sent {overrun} bytes past the end of the status frame")]
    FrameOverrun { overrun: u64 },
    #[error("status frame declared an invalid length of {0}")]
    InvalidFrameLength(i32),
    #[error("failed to parse server status JSON: {0}")]
    ResponseParse(#[from] serde_json::Error),
    #[error("VarInt is longer than 5 bytes")]
    MalformedVarint,
    #[error("string length prefix does not match its contents")]
    MalformedString,
    #[error("an I/O error occurred: {0}")]
    UnknownSocket(#[from] std::io::Error),
    #[error("an invalid address was provided")]
    InvalidAddress,
}

impl Error {
    /// Sorts a socket error raised while talking to `endpoint` into the taxonomy.
    #[must_use]
    pub fn from_io(error: std::io::Error, endpoint: &Endpoint) -> Self {
        match error.kind() {
            std::io::ErrorKind::ConnectionRefused => Self::ConnectionRefused(endpoint.clone()),
            std::io::ErrorKind::NotFound => Self::HostUnresolvable(endpoint.clone()),
            _ => Self::UnknownSocket(error),
        }
    }
}

/// A host and port to connect to.
///
/// Parses from `host`, `host:port` or `[ipv6]:port`, with the port defaulting
/// to [`DEFAULT_PORT`].
///
/// # Examples
///
/// ```
/// use slping::Endpoint;
///
/// let endpoint: Endpoint = "mc.example.com:25566".parse()?;
/// assert_eq!(endpoint, Endpoint::new("mc.example.com", 25566));
/// let endpoint: Endpoint = "mc.example.com".parse()?;
/// assert_eq!(endpoint.port, 25565);
/// # Ok::<(), slping::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let address = address.trim();
        if let Some(rest) = address.strip_prefix('[') {
            let (host, rest) = rest.split_once(']').ok_or(Error::InvalidAddress)?;
            let port = match rest.strip_prefix(':') {
                Some(port) => port.parse().map_err(|_| Error::InvalidAddress)?,
                None if rest.is_empty() => DEFAULT_PORT,
                None => return Err(Error::InvalidAddress),
            };
            if host.is_empty() {
                return Err(Error::InvalidAddress);
            }
            return Ok(Self::new(host, port));
        }
        let (host, port) = match address.split_once(':') {
            // More than one colon without brackets is a bare IPv6 address.
            Some((_, port)) if port.contains(':') => (address, DEFAULT_PORT),
            Some((host, port)) => (host, port.parse().map_err(|_| Error::InvalidAddress)?),
            None => (address, DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(Error::InvalidAddress);
        }
        Ok(Self::new(host, port))
    }
}
