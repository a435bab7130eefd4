use std::{
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
};

use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use crate::{Endpoint, Error};

/// DNS lookups needed to reach a server.
pub trait Resolve {
    /// Looks up the SRV records behind `name`, in the order they were returned.
    fn resolve_srv(&self, name: &str) -> impl Future<Output = io::Result<Vec<Endpoint>>> + Send;

    /// Looks up the addresses of `host`.
    fn resolve_host(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;
}

impl Resolve for TokioAsyncResolver {
    async fn resolve_srv(&self, name: &str) -> io::Result<Vec<Endpoint>> {
        let lookup = self.srv_lookup(name).await.map_err(io::Error::other)?;
        Ok(lookup
            .iter()
            .map(|srv| {
                let target = srv.target().to_utf8();
                Endpoint::new(target.trim_end_matches('.'), srv.port())
            })
            .collect())
    }

    async fn resolve_host(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let lookup = self.lookup_ip(host).await.map_err(io::Error::other)?;
        Ok(lookup.iter().collect())
    }
}

/// Swaps `endpoint` for the first `_minecraft._tcp` SRV record of its host.
///
/// Any lookup failure keeps the endpoint as it was, as do IP literals.
pub async fn resolve_endpoint<R: Resolve + Sync>(resolver: &R, endpoint: Endpoint) -> Endpoint {
    if endpoint.host.parse::<IpAddr>().is_ok() {
        return endpoint;
    }
    let name = format!("_minecraft._tcp.{}", endpoint.host);
    match resolver.resolve_srv(&name).await {
        Ok(records) => match records.into_iter().next() {
            Some(record) => {
                debug!(%endpoint, %record, "using SRV record");
                record
            }
            None => endpoint,
        },
        Err(error) => {
            debug!(%name, %error, "no usable SRV record");
            endpoint
        }
    }
}

/// Every address `endpoint` can be reached at.
///
/// # Errors
/// [`Error::HostUnresolvable`] if the lookup fails or comes back empty.
pub(crate) async fn socket_addrs<R: Resolve + Sync>(
    resolver: &R,
    endpoint: &Endpoint,
) -> Result<Vec<SocketAddr>, Error> {
    let ips = match endpoint.host.parse::<IpAddr>() {
        Ok(ip) => vec![ip],
        Err(_) => resolver
            .resolve_host(&endpoint.host)
            .await
            .map_err(|_| Error::HostUnresolvable(endpoint.clone()))?,
    };
    if ips.is_empty() {
        return Err(Error::HostUnresolvable(endpoint.clone()));
    }
    Ok(ips
        .into_iter()
        .map(|ip| SocketAddr::new(ip, endpoint.port))
        .collect())
}
