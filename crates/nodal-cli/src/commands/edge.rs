//! Edge commands

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use crate::AppContext;
use nodal_core::{Endpoint, Error, GraphStore, NewEdge, NodeId};

#[derive(Args)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommands,
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Add a directed edge between two existing nodes
    Add {
        /// Source node id
        source: String,
        /// Target node id
        target: String,
        /// Edge type
        #[arg(short = 't', long)]
        r#type: String,
        /// Relationship strength
        #[arg(short, long)]
        weight: Option<f64>,
    },
}

fn parse_endpoint(endpoint: Endpoint, raw: &str) -> Result<NodeId, Error> {
    NodeId::from_string(raw).map_err(|_| Error::reference(endpoint, raw))
}

pub async fn run(args: &EdgeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        EdgeCommands::Add {
            source,
            target,
            r#type,
            weight,
        } => {
            let mut data = NewEdge::new(
                parse_endpoint(Endpoint::Source, source)?,
                parse_endpoint(Endpoint::Target, target)?,
                r#type.as_str(),
            );
            data.weight = *weight;

            let edge = ctx.store.create_edge(data).await?;
            tracing::info!("Created edge {} ({} -> {})", edge.id, edge.source_id, edge.target_id);

            match ctx.format {
                OutputFormat::Json => println!("{}", output::to_json(&edge)?),
                OutputFormat::Table => print!("{}", output::edge_detail(&edge)),
            }
        }
    }

    Ok(())
}
