//! Server lifecycle: binding, request loop, Ctrl+C shutdown.

use super::live::LiveSite;
use super::response;
use crate::log;
use crate::pipeline::release_active_lock;
use anyhow::{Context, Result, anyhow};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Request handler threads.
const WORKER_THREADS: usize = 4;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Exit status of a process interrupted outside the dev server.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Install the Ctrl+C handler. Call once at program start.
///
/// Before a server is registered the process releases any build lock and
/// exits with status 130; afterwards the server is unblocked so the request
/// loop returns.
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        } else {
            release_active_lock();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {e}"))
}

pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Bind to the interface and port, trying successive ports when taken.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.unwrap_or_default()
    ))
}

/// Serve requests until the server is unblocked.
pub fn run_request_loop(server: &Server, site: Arc<LiveSite>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKER_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let site = Arc::clone(&site);
        pool.spawn(move || {
            let reply = if is_shutdown() {
                response::unavailable()
            } else {
                site.handle(&response::to_request(&request))
            };
            if let Err(e) = response::send(request, reply) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}
