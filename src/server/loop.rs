// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections until Ctrl-C
pub async fn serve(listener: TcpListener, state: Arc<AppState>) {
    serve_with_shutdown(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_warning(&format!("Cannot listen for Ctrl-C: {e}"));
            std::future::pending::<()>().await;
        }
    })
    .await;
}

/// Accept connections until `shutdown` resolves.
///
/// In-flight connections are not drained; they stop with the runtime.
pub async fn serve_with_shutdown<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                logger::log_shutdown();
                return;
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }
        }
    }
}
