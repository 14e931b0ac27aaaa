//! Serve context tied to the live theme snapshot.
//!
//! Requests for the index re-read the site config through
//! [`ThemeResolver::load`], so switching theme or output in `site.json`
//! takes effect on the next visit to `/` without restarting the server.

use super::handler::{ServeContext, handle};
use super::path::ServeMode;
use crate::log;
use crate::theme::ThemeResolver;
use crate::utils::http::{HttpRequest, HttpResponse};
use arc_swap::ArcSwap;
use std::sync::Arc;

pub struct LiveSite {
    resolver: ThemeResolver,
    mode: ServeMode,
    ctx: ArcSwap<ServeContext>,
}

impl LiveSite {
    pub fn new(resolver: ThemeResolver, mode: ServeMode) -> Self {
        let ctx = ServeContext::new(&resolver.current(), mode);
        Self {
            resolver,
            mode,
            ctx: ArcSwap::from_pointee(ctx),
        }
    }

    pub fn context(&self) -> Arc<ServeContext> {
        self.ctx.load_full()
    }

    /// Reload the theme and rebuild the context. A failed reload keeps the
    /// current one.
    pub fn refresh(&self) -> Arc<ServeContext> {
        match self.resolver.load() {
            Ok(resolved) => {
                let ctx = Arc::new(ServeContext::new(&resolved, self.mode));
                self.ctx.store(Arc::clone(&ctx));
                ctx
            }
            Err(e) => {
                log!("warning"; "keeping theme `{}`: {e}", self.resolver.current().theme.name);
                self.context()
            }
        }
    }

    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let ctx = if matches!(request.path(), "" | "/") {
            self.refresh()
        } else {
            self.context()
        };
        handle(&ctx, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in [
            ("themes/default/html/a.html", "<p>a</p>"),
            ("themes/dark/html/night.html", "<p>night</p>"),
        ] {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn live(dir: &TempDir) -> LiveSite {
        let resolver = ThemeResolver::new(dir.path(), "site.json", ConfigOverrides::default()).unwrap();
        LiveSite::new(resolver, ServeMode::Source)
    }

    #[test]
    fn test_index_request_picks_up_theme_change() {
        let dir = project();
        let site = live(&dir);
        assert!(site.handle(&HttpRequest::get("/")).body_text().contains("a.html"));

        fs::write(dir.path().join("site.json"), r#"{"theme": "dark"}"#).unwrap();
        // Other requests keep the current snapshot until the index is visited
        assert_eq!(site.handle(&HttpRequest::get("/a.html")).status, 200);

        let index = site.handle(&HttpRequest::get("/"));
        assert!(index.body_text().contains("night.html"));
        assert_eq!(site.handle(&HttpRequest::get("/a.html")).status, 404);
        assert_eq!(site.handle(&HttpRequest::get("/night.html")).status, 200);
    }

    #[test]
    fn test_failed_reload_keeps_previous_context() {
        let dir = project();
        let site = live(&dir);

        fs::write(dir.path().join("site.json"), r#"{"theme": "ghost"}"#).unwrap();
        let index = site.handle(&HttpRequest::get("/"));
        assert_eq!(index.status, 200);
        assert!(index.body_text().contains("a.html"));
        assert_eq!(site.handle(&HttpRequest::get("/a.html")).status, 200);
    }
}
