use std::io;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tracing::debug;

use super::resolve::{Resolve, resolve_endpoint, socket_addrs};
use crate::{Endpoint, Error, ListPing, ServerStatus, Session, packet};

const READ_BUFFER_SIZE: usize = 64 * 1024;

pub(super) async fn ping<R: Resolve + Sync>(
    resolver: &R,
    query: ListPing,
) -> Result<ServerStatus, Error> {
    let endpoint = resolve_endpoint(resolver, Endpoint::new(query.hostname, query.port)).await;
    let exchange = exchange(
        resolver,
        &endpoint,
        query.protocol_version,
        query.max_iterations,
    );
    // Dropping the exchange on timeout drops, and so closes, its socket.
    match tokio::time::timeout(query.timeout, exchange).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(endpoint)),
    }
}

async fn exchange<R: Resolve + Sync>(
    resolver: &R,
    endpoint: &Endpoint,
    protocol_version: i32,
    max_iterations: usize,
) -> Result<ServerStatus, Error> {
    let addrs = socket_addrs(resolver, endpoint).await?;
    debug!(%endpoint, ?addrs, "connecting for server status");
    let mut stream = TcpStream::connect(addrs.as_slice())
        .await
        .map_err(|e| Error::from_io(e, endpoint))?;

    let handshake = packet::handshake(protocol_version, &endpoint.host, endpoint.port);
    stream
        .write_all(&handshake)
        .await
        .map_err(|e| Error::from_io(e, endpoint))?;
    stream
        .write_all(&packet::status_request())
        .await
        .map_err(|e| Error::from_io(e, endpoint))?;

    let mut session = Session::new(max_iterations);
    let mut buf = vec![0; READ_BUFFER_SIZE];
    loop {
        let read = stream
            .read(&mut buf)
            .await
            .map_err(|e| Error::from_io(e, endpoint))?;
        if read == 0 {
            return Err(Error::UnknownSocket(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection before sending its full status",
            )));
        }
        if let Some(json) = session.feed(&buf[..read])? {
            let status = ServerStatus::from_json(&json)?;
            if let Err(error) = stream.shutdown().await {
                debug!(%endpoint, %error, "status connection did not shut down cleanly");
            }
            debug!(%endpoint, iterations = session.iterations(), "received server status");
            return Ok(status);
        }
    }
}
