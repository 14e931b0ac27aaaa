//! Development server.
//!
//! Serves the active theme's page sources (or, with `--built`, the build
//! output) without transforming them, plus a generated index at `/`, the
//! route table at `/__routes` and raw API handler files under `/api/`.

mod handler;
mod index;
mod lifecycle;
mod live;
mod path;
mod response;

pub use handler::ServeContext;
pub use lifecycle::setup_shutdown_handler;
pub use path::ServeMode;

use crate::theme::ThemeResolver;
use crate::{debug, log};
use anyhow::{Result, bail};
use live::LiveSite;
use std::sync::Arc;

/// Bind and serve until Ctrl+C.
pub fn serve_site(resolver: ThemeResolver, mode: ServeMode) -> Result<()> {
    let resolved = resolver.current();
    let site = &resolved.site;
    let live = LiveSite::new(resolver, mode);
    let ctx = live.context();

    if !ctx.serve_root().is_dir() {
        match mode {
            ServeMode::Built => bail!(
                "build output `{}` does not exist; run `sitesmith build` first",
                site.root_relative(ctx.serve_root()).display()
            ),
            ServeMode::Source => log!(
                "warning";
                "page directory `{}` does not exist",
                site.root_relative(ctx.serve_root()).display()
            ),
        }
    }

    let (server, addr) = lifecycle::bind_with_retry(site.serve.interface, site.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "{} from {}", ctx.mode(), ctx.serve_root().display());

    lifecycle::run_request_loop(&server, Arc::new(live))
}
