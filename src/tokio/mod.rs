mod list_ping;
mod resolve;

use std::sync::OnceLock;

use hickory_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

pub use resolve::{Resolve, resolve_endpoint};

use crate::{Error, ListPing, ServerStatus};

/// Retrieve the status of a Minecraft server.
///
/// SRV records are looked up with the shared [`resolver`].
///
/// # Examples
///
/// ```no_run
/// # async {
/// use std::time::Duration;
///
/// let status = slping::tokio::get_status(slping::ListPing {
///     hostname: "mc.hypixel.net".into(),
///     timeout: Duration::from_secs(10),
///     ..Default::default()
/// }).await?;
/// println!("{}", status.description.text());
/// # Ok::<(), slping::Error>(())
/// # };
/// ```
///
/// # Errors
/// If the server status cannot be recieved, see [`Error`].
pub async fn get_status(query: ListPing) -> Result<ServerStatus, Error> {
    get_status_with(resolver(), query).await
}

/// Like [`get_status`], with DNS lookups going through `resolver`.
///
/// # Errors
/// If the server status cannot be recieved, see [`Error`].
pub async fn get_status_with<R: Resolve + Sync>(
    resolver: &R,
    query: ListPing,
) -> Result<ServerStatus, Error> {
    list_ping::ping(resolver, query).await
}

/// Retrieve the status of the server at `hostname:port`, with the default
/// timeout and iteration cap.
///
/// Pass [`crate::DEFAULT_PORT`] when no port is known.
///
/// ```no_run
/// # async {
/// let status = slping::tokio::get_server_status(767, "mc.hypixel.net", slping::DEFAULT_PORT).await?;
/// println!("{}/{} online", status.players.online, status.players.max);
/// # Ok::<(), slping::Error>(())
/// # };
/// ```
///
/// # Errors
/// If the server status cannot be recieved, see [`Error`].
pub async fn get_server_status(
    protocol_version: i32,
    hostname: &str,
    port: u16,
) -> Result<ServerStatus, Error> {
    get_status(ListPing::new(protocol_version, hostname, port)).await
}

fn new_resolver() -> TokioAsyncResolver {
    let config = ResolverConfig::cloudflare();
    let mut opts = ResolverOpts::default();
    opts.cache_size = 64;
    opts.attempts = 3;
    TokioAsyncResolver::tokio(config, opts)
}

/// The process-wide DNS resolver, created on first use.
pub fn resolver() -> &'static TokioAsyncResolver {
    static RESOLVER: OnceLock<TokioAsyncResolver> = OnceLock::new();
    RESOLVER.get_or_init(new_resolver)
}
