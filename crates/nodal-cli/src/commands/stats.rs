//! Stats command

use crate::output::{self, OutputFormat};
use crate::AppContext;
use nodal_core::GraphStore;

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let stats = ctx.store.stats().await?;
    match ctx.format {
        OutputFormat::Json => println!("{}", output::to_json(&stats)?),
        OutputFormat::Table => print!("{}", output::stats_detail(&stats)),
    }
    Ok(())
}
