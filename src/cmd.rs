//! Command-line surface.
//!
//! Entries come from positional arguments, or from the input reader when none
//! are given. Each command returns its rendered output so `main` only prints.

use std::error::Error;
use std::io::BufRead;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::Settings;
use crate::export::{export, render};
use crate::models::{AddressRange, AddressRangeVariant, CidrBlock};
use crate::output::{join_lines, to_json};
use crate::parser::parse_all;
use crate::processing::{sort_and_merge, subtract, AggregationMode};

/// Merge, subtract and export IP address ranges
#[derive(Parser, Debug)]
#[command(name = "cidr-merger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print the result as a JSON array
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge entries into minimal CIDR blocks
    Merge {
        /// Print merged `start-end` ranges instead of CIDR blocks
        #[arg(long)]
        ranges: bool,

        /// Addresses, CIDR blocks or `start-end` ranges (stdin when empty)
        entries: Vec<String>,
    },

    /// Remove the excluded entries from the given entries
    Subtract {
        /// Entries to remove; repeat or comma separate
        #[arg(short = 'x', long, required = true)]
        exclude: Vec<String>,

        /// Print remaining `start-end` ranges instead of CIDR blocks
        #[arg(long)]
        ranges: bool,

        /// Addresses, CIDR blocks or `start-end` ranges (stdin when empty)
        entries: Vec<String>,
    },

    /// Coarsen an address history into a short list of CIDR blocks
    Export {
        /// Aggregation mode (independent or cascading)
        #[arg(short, long)]
        mode: Option<AggregationMode>,

        /// Aggregation steps as `prefix:count` pairs, e.g. `24:1,16:3`
        #[arg(short, long)]
        policy: Option<String>,

        /// Keep private IPv4 networks in the result
        #[arg(long)]
        keep_private: bool,

        /// Entries removed from the result, added to the configured ones
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Separator between blocks in text output
        #[arg(short, long, default_value = ",")]
        separator: String,

        /// Address history entries (stdin when empty)
        entries: Vec<String>,
    },
}

/// Run `cli` against `settings`, reading entries from `input` when the
/// command line has none.
pub fn run(
    cli: &Cli,
    settings: &Settings,
    input: &mut dyn BufRead,
) -> Result<String, Box<dyn Error>> {
    log::debug!("run({})", format!("{:?}", cli.command).on_blue());

    match &cli.command {
        Command::Merge { ranges, entries } => {
            let entries = read_entries(entries, input)?;
            let merged = sort_and_merge(&to_ranges(&parse_all(&entries)));
            log::info!(
                "Merged {} entries into {} ranges",
                entries.len(),
                merged.len()
            );
            render_ranges(&merged, *ranges, cli.json)
        }
        Command::Subtract {
            exclude,
            ranges,
            entries,
        } => {
            let entries = read_entries(entries, input)?;
            let excluded = to_ranges(&parse_all(exclude));
            if excluded.is_empty() {
                log::warn!(
                    "{} no valid exclusions in {:?}",
                    "subtract".on_red(),
                    exclude
                );
            }
            let remainder = subtract(&to_ranges(&parse_all(&entries)), &excluded);
            render_ranges(&remainder, *ranges, cli.json)
        }
        Command::Export {
            mode,
            policy,
            keep_private,
            exclude,
            separator,
            entries,
        } => {
            let entries = read_entries(entries, input)?;
            let mut settings = settings.clone();
            if let Some(mode) = mode {
                settings.mode = *mode;
            }
            if let Some(policy) = policy {
                settings.policy = Some(policy.clone());
            }
            if *keep_private {
                settings.exclude_private = false;
            }
            settings.exclude.extend(parse_all(exclude));

            let blocks = export(&entries, &settings.export_options()?);
            if cli.json {
                Ok(to_json(&blocks)?)
            } else {
                Ok(render(&blocks, separator))
            }
        }
    }
}

fn read_entries(
    entries: &[String],
    input: &mut dyn BufRead,
) -> Result<Vec<String>, Box<dyn Error>> {
    if !entries.is_empty() {
        return Ok(entries.to_vec());
    }
    log::debug!("Reading entries from input");
    let mut lines = Vec::new();
    for line in input.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

fn to_ranges(variants: &[AddressRangeVariant]) -> Vec<AddressRange> {
    variants.iter().map(AddressRangeVariant::to_range).collect()
}

fn render_ranges(
    merged: &[AddressRange],
    as_ranges: bool,
    json: bool,
) -> Result<String, Box<dyn Error>> {
    if as_ranges {
        return Ok(if json {
            to_json(merged)?
        } else {
            join_lines(merged)
        });
    }
    let blocks: Vec<CidrBlock> = merged
        .iter()
        .flat_map(AddressRange::to_cidr_blocks)
        .collect();
    Ok(if json {
        to_json(&blocks)?
    } else {
        join_lines(&blocks)
    })
}
