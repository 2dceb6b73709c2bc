//! Node commands

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use crate::AppContext;
use nodal_core::{GraphStore, NewNode, NodeFilter, Properties, PropertyValue};

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Add a new node
    Add {
        /// Node label
        label: String,
        /// Node type
        #[arg(short = 't', long)]
        r#type: String,
        /// Property as key=value (repeatable). Values are typed: true/false,
        /// null, integers, floats and JSON arrays/objects are parsed, anything
        /// else is a string. Wrap the value in double quotes to force a string,
        /// e.g. zip='"02134"'
        #[arg(short, long = "prop", value_parser = parse_property)]
        props: Vec<(String, PropertyValue)>,
    },
    /// Get node details
    Get {
        /// Node id
        id: String,
    },
    /// List nodes
    List {
        /// Filter by type
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// Filter by label
        #[arg(short, long)]
        label: Option<String>,
        /// Filter by property as key=value (repeatable, typed like `node add`)
        #[arg(short, long = "prop", value_parser = parse_property)]
        props: Vec<(String, PropertyValue)>,
    },
}

/// Parse `key=value`; the value is read as a JSON-ish literal
pub fn parse_property(raw: &str) -> Result<(String, PropertyValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err("property key must not be empty".to_string());
    }
    Ok((key.to_string(), PropertyValue::parse_literal(value)))
}

pub async fn run(args: &NodeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        NodeCommands::Add {
            label,
            r#type,
            props,
        } => {
            let mut data = NewNode::new(r#type.as_str(), label.as_str());
            if !props.is_empty() {
                data = data.with_properties(props.iter().cloned().collect::<Properties>());
            }

            let node = ctx.store.create_node(data).await?;
            tracing::info!("Created node {} (type: {})", node.id, node.node_type);

            match ctx.format {
                OutputFormat::Json => println!("{}", output::to_json(&node)?),
                OutputFormat::Table => {
                    println!("Created node: {} ({}: {})", node.id, node.node_type, node.label)
                }
            }
        }
        NodeCommands::Get { id } => {
            let node = ctx.store.get_node_by_str(id).await?;
            match (ctx.format, node) {
                (OutputFormat::Json, node) => println!("{}", output::to_json(&node)?),
                (OutputFormat::Table, Some(node)) => print!("{}", output::node_detail(&node)),
                (OutputFormat::Table, None) => println!("Node '{}' not found", id),
            }
        }
        NodeCommands::List {
            r#type,
            label,
            props,
        } => {
            let filter = NodeFilter {
                node_type: r#type.clone(),
                label: label.clone(),
                properties: props.iter().cloned().collect(),
            };
            let nodes = ctx.store.query_nodes(&filter).await?;
            tracing::info!("Found {} nodes", nodes.len());

            match ctx.format {
                OutputFormat::Json => println!("{}", output::to_json(&nodes)?),
                OutputFormat::Table if nodes.is_empty() => println!("No nodes found"),
                OutputFormat::Table => print!("{}", output::node_table(&nodes)),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        assert_eq!(
            parse_property("version=18.2").unwrap(),
            ("version".to_string(), PropertyValue::Float(18.2))
        );
        assert_eq!(
            parse_property("name=react=dom").unwrap(),
            ("name".to_string(), PropertyValue::String("react=dom".to_string()))
        );
        assert_eq!(
            parse_property("zip=\"02134\"").unwrap(),
            ("zip".to_string(), PropertyValue::String("02134".to_string()))
        );
        assert!(parse_property("novalue").is_err());
        assert!(parse_property("=1").is_err());
    }
}
