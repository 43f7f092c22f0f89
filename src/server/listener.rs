// Listener module
// Resolves the configured host and binds the listening socket

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpListener};

use crate::error::ServerError;

/// Pending connections the kernel queues before `accept`
const LISTEN_BACKLOG: i32 = 1024;

/// Resolve `host` and bind the first address that accepts us.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    let addrs = lookup_host((host, port))
        .await
        .map_err(|e| ServerError::Resolve {
            host: host.to_string(),
            port,
            source: Some(e),
        })?;

    let mut last_err = None;
    for addr in addrs {
        match create_listener(addr) {
            Ok(listener) => return Ok(listener),
            Err(source) => last_err = Some(ServerError::Bind { addr, source }),
        }
    }

    Err(last_err.unwrap_or_else(|| ServerError::Resolve {
        host: host.to_string(),
        port,
        source: None,
    }))
}

/// Create a `TcpListener` with `SO_REUSEADDR` enabled.
///
/// `SO_REUSEADDR` lets a restarted server bind while old connections sit in
/// `TIME_WAIT`; a live listener on the same port still fails with `AddrInUse`.
pub fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
