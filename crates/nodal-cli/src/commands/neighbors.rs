//! Neighbors command

use clap::Args;

use crate::output::{self, OutputFormat};
use crate::AppContext;
use nodal_core::{Direction, GraphStore, NodeId};

#[derive(Args)]
pub struct NeighborsArgs {
    /// Node id
    pub id: String,

    /// Edges to follow: out, in, both
    #[arg(long, default_value = "both")]
    pub direction: Direction,
}

pub async fn run(args: &NeighborsArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let neighbors = match NodeId::from_string(&args.id) {
        Ok(id) => ctx.store.get_neighbors(&id, args.direction).await?,
        Err(_) => {
            tracing::debug!("'{}' is not a node id", args.id);
            Vec::new()
        }
    };
    tracing::info!("Found {} neighbors of {}", neighbors.len(), args.id);

    match ctx.format {
        OutputFormat::Json => println!("{}", output::to_json(&neighbors)?),
        OutputFormat::Table if neighbors.is_empty() => println!("No neighbors found"),
        OutputFormat::Table => print!("{}", output::neighbor_table(&neighbors)),
    }

    Ok(())
}
