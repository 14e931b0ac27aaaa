//! `routes` command: print the route table the dev server would report.

use super::serve::{ServeContext, ServeMode};
use crate::theme::ResolvedSite;
use anyhow::Result;

pub fn print_routes(resolved: &ResolvedSite, pretty: bool) -> Result<()> {
    let ctx = ServeContext::new(resolved, ServeMode::Source);
    let table = ctx.routes()?;
    println!("{}", table.to_json(pretty));
    Ok(())
}
