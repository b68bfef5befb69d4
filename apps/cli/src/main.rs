//! DropCraft CLI
//!
//! Offline tooling for allow-list campaigns: build the Merkle tree from an
//! allow-list, export per-entry proofs, and check a proof against a root.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dropcraft_core::{load_allow_list, parse_hash, parse_row, to_hex, Hash};
use dropcraft_logging::{try_init, LogLevel};
use dropcraft_merkle::{merkle_leaf, process_proof, Distribution};

/// DropCraft - Merkle allow-list campaigns
#[derive(Parser)]
#[command(name = "dropcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Merkle tree and export the root with every proof
    BuildTree {
        /// Allow-list file (address,index,amount per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the distribution (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Optional output file containing only the root
        #[arg(short, long)]
        root_output: Option<PathBuf>,
    },

    /// Print the proof for one slot of an exported distribution
    Proof {
        /// Distribution file written by build-tree
        #[arg(short, long)]
        distribution: PathBuf,

        /// Claim slot
        #[arg(short, long)]
        index: u64,
    },

    /// Check a proof against a root
    Verify {
        /// Published root (hex)
        #[arg(long)]
        root: String,

        /// Leaf digest (hex)
        #[arg(long, conflicts_with = "entry", required_unless_present = "entry")]
        leaf: Option<String>,

        /// Derive the leaf from an allow-list row instead (address,index,amount)
        #[arg(long)]
        entry: Option<String>,

        /// Sibling digests, comma separated, leaf level first
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,
    },
}

/// Write through a temp file and rename, so readers never see a partial file.
fn write_file_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}

fn build_tree(input: &Path, output: &Path, root_output: Option<&Path>) -> Result<Hash> {
    info!("Reading allow-list from {:?}", input);
    let report = load_allow_list(input).context("Failed to read allow-list")?;
    if report.skipped > 0 {
        warn!("Skipped {} malformed rows", report.skipped);
    }

    let dist = Distribution::build(&report.entries).context("Failed to build Merkle tree")?;

    info!("Writing distribution to {:?}", output);
    let json = dist.to_json().context("Failed to serialize distribution")?;
    write_file_atomic(output, &json).context("Failed to write distribution")?;

    if let Some(path) = root_output {
        write_file_atomic(path, &format!("{}\n", to_hex(&dist.root)))
            .context("Failed to write root")?;
    }

    println!("Entries: {} ({} skipped)", dist.claims.len(), report.skipped);
    println!("Merkle root: {}", to_hex(&dist.root));
    Ok(dist.root)
}

fn show_proof(distribution: &Path, index: u64) -> Result<()> {
    let json = fs::read_to_string(distribution).context("Failed to read distribution file")?;
    let dist = Distribution::from_json(&json).context("Failed to parse distribution")?;
    let claim = dist
        .find(index)
        .with_context(|| format!("Index {} not in distribution", index))?;

    let out = serde_json::to_string_pretty(claim).context("Failed to serialize proof")?;
    println!("{}", out);
    Ok(())
}

fn verify_proof(root: &str, leaf: Option<&str>, entry: Option<&str>, proof: &[String]) -> Result<bool> {
    let root = parse_hash(root).context("Invalid root")?;
    let leaf = match (leaf, entry) {
        (Some(leaf), _) => parse_hash(leaf).context("Invalid leaf")?,
        (None, Some(row)) => {
            let entry = parse_row(row).context("Invalid entry: expected address,index,amount")?;
            merkle_leaf(&entry)
        }
        (None, None) => anyhow::bail!("Either --leaf or --entry is required"),
    };
    let siblings = proof
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_hash(s))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Invalid proof element")?;

    let computed = process_proof(&siblings, &leaf);
    println!("Leaf:          {}", to_hex(&leaf));
    println!("Computed root: {}", to_hex(&computed));
    println!("Expected root: {}", to_hex(&root));
    Ok(computed == root)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    try_init(LogLevel::from_verbosity(cli.verbose))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::BuildTree { input, output, root_output } => {
            build_tree(&input, &output, root_output.as_deref())?;
        }
        Commands::Proof { distribution, index } => {
            show_proof(&distribution, index)?;
        }
        Commands::Verify { root, leaf, entry, proof } => {
            if !verify_proof(&root, leaf.as_deref(), entry.as_deref(), &proof)? {
                anyhow::bail!("Proof does not match root");
            }
            println!("Proof valid");
        }
    }

    Ok(())
}
