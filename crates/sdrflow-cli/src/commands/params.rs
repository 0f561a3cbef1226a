//! Block parameter listing command.

use super::common::load_config;
use clap::Args;
use sdrflow_core::{BlockParameter, FlowError};
use sdrflow_runtime::{BLOCKS, Flowgraph};
use std::path::PathBuf;

#[derive(Args)]
pub struct ParamsArgs {
    /// Configuration file (TOML); defaults are used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the configuration as TOML instead of the parameter table
    #[arg(long)]
    toml: bool,

    /// Print the parameter table as JSON
    #[arg(long, conflicts_with = "toml")]
    json: bool,
}

#[derive(serde::Serialize)]
struct BlockListing<'a> {
    block: u32,
    name: &'a str,
    parameters: Vec<BlockParameter>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;

    if args.toml {
        config.validate()?;
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let (_flowgraph, _gate, handle) = Flowgraph::new(config)?;
    let listings = BLOCKS
        .iter()
        .map(|&(block, name)| {
            Ok(BlockListing {
                block: block.0,
                name,
                parameters: handle.parameters(block)?,
            })
        })
        .collect::<Result<Vec<_>, FlowError>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    for listing in &listings {
        println!("Block {} ({})", listing.block, listing.name);
        println!(
            "  {:<4} {:<12} {:>14} {:>14} {:>10} {:>16}",
            "idx", "id", "min", "max", "step", "value"
        );
        for (index, p) in listing.parameters.iter().enumerate() {
            println!(
                "  {:<4} {:<12} {:>14} {:>14} {:>10} {:>16}",
                index,
                p.id(),
                p.min(),
                p.max(),
                p.step(),
                p.format_value()
            );
        }
        println!();
    }

    Ok(())
}
