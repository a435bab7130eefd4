use std::time::Duration;

use crate::{DEFAULT_PORT, session::DEFAULT_MAX_ITERATIONS};

/// The protocol version sent in the handshake when none is chosen (1.21).
///
/// Servers answer a status request regardless of the version a client
/// claims, it only changes what they report as compatible.
pub const DEFAULT_PROTOCOL_VERSION: i32 = 767;

/// How long a ping may take, from the first connection attempt until the
/// status is received.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for pinging a server.
///
/// # Examples
///
/// ```
/// use slping::ListPing;
/// use std::time::Duration;
///
/// let query = ListPing {
///     hostname: "mc.hypixel.net".to_string(),
///     timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ListPing {
    /// See [Protocol Version Numbers](https://wiki.vg/Protocol_version_numbers)
    pub protocol_version: i32,
    /// The server hostname or IP.
    ///
    /// A `_minecraft._tcp` SRV record for it takes precedence over both this
    /// and `port`.
    pub hostname: String,
    pub port: u16,
    /// Wall clock limit on connecting and receiving the status.
    pub timeout: Duration,
    /// The number of reads the status frame may span.
    pub max_iterations: usize,
}

impl Default for ListPing {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            hostname: String::new(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ListPing {
    /// A query with default settings for `hostname` and `port`.
    #[must_use]
    pub fn new(protocol_version: i32, hostname: impl Into<String>, port: u16) -> Self {
        Self {
            protocol_version,
            hostname: hostname.into(),
            port,
            ..Default::default()
        }
    }
}
