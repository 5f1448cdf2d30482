//! Command Line Interface for LP TVL snapshots.
mod config;

use crate::config::SourceConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lp_tvl_data::{CsvReportWriter, PositionQuery, ReportSink, SourceKey, read_blocks};
use lp_tvl_domain::enums::{AmmType, Chain, Protocol};
use lp_tvl_snapshot::prelude::*;
use prettytable::{Table, row};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lp-tvl")]
#[command(about = "Historical TVL snapshots of concentrated liquidity LP positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value LP positions at every listed block and write a CSV snapshot
    Snapshot {
        /// Chain (mode, linea)
        #[arg(long, default_value = "mode")]
        chain: Chain,

        /// Protocol (poolshark, supswap)
        #[arg(long, default_value = "poolshark")]
        protocol: Protocol,

        /// AMM type (poolshark, uniswapv3)
        #[arg(long, default_value = "poolshark")]
        amm: AmmType,

        /// CSV file of block numbers (first line is a header)
        #[arg(short, long)]
        blocks: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Only positions owned by this address
        #[arg(long)]
        owner: Option<String>,

        /// Only positions in this pool
        #[arg(long)]
        pool: Option<String>,

        /// One row per owner and pool instead of one per position
        #[arg(long)]
        aggregate: bool,

        /// Subgraph endpoint, overrides SUBGRAPH_URL_<CHAIN>_<PROTOCOL>_<AMM>
        #[arg(long)]
        subgraph_url: Option<String>,
    },
    /// Write a CSV snapshot from a source that reports values itself
    Vaults {
        #[arg(long, default_value = "mode")]
        chain: Chain,

        #[arg(long, default_value = "airpuff")]
        protocol: Protocol,

        /// CSV file of block numbers (first line is a header)
        #[arg(short, long)]
        blocks: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Vault endpoint, overrides VAULT_URL_<CHAIN>_<PROTOCOL>
        #[arg(long)]
        vault_url: Option<String>,
    },
    /// Value a single position at one block
    Position {
        #[arg(long, default_value = "mode")]
        chain: Chain,

        #[arg(long, default_value = "poolshark")]
        protocol: Protocol,

        #[arg(long, default_value = "poolshark")]
        amm: AmmType,

        /// Block number, 0 for the latest indexed block
        #[arg(long, default_value_t = 0)]
        block: u64,

        /// Position id
        id: String,

        /// Subgraph endpoint, overrides SUBGRAPH_URL_<CHAIN>_<PROTOCOL>_<AMM>
        #[arg(long)]
        subgraph_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = SourceConfig::from_env().context("invalid endpoint configuration")?;

    match cli.command {
        Commands::Snapshot {
            chain,
            protocol,
            amm,
            blocks,
            output,
            owner,
            pool,
            aggregate,
            subgraph_url,
        } => {
            let key = SourceKey::new(chain, protocol, amm);
            if let Some(url) = subgraph_url {
                config.set_subgraph_url(key, url);
            }
            let url = config.subgraph_url(key)?;
            info!(source = %key, url, "Using subgraph");
            let source = config.registry().position_source(key)?;

            let query = PositionQuery {
                block: 0,
                owner: owner.map(|o| o.to_lowercase()),
                pool_id: pool.map(|p| p.to_lowercase()),
            };
            let mode = if aggregate {
                OutputMode::Aggregated
            } else {
                OutputMode::PerPosition
            };

            let block_list = load_blocks(&blocks)?;
            let orchestrator = SnapshotOrchestrator::new(source)
                .with_query(query)
                .with_mode(mode);
            watch_interrupt(orchestrator.cancel_flag());

            println!("📡 Snapshotting {} blocks from {key}...", block_list.len());
            let outcome = orchestrator.build_snapshot(&block_list).await;
            write_report(&output, &outcome)?;
            print_summary(&outcome, &output);
        }
        Commands::Vaults {
            chain,
            protocol,
            blocks,
            output,
            vault_url,
        } => {
            if let Some(url) = vault_url {
                config.set_vault_url(chain, protocol, url);
            }
            let url = config.vault_url(chain, protocol)?;
            info!(%chain, %protocol, url, "Using vault source");
            let source = config.registry().vault_source(chain, protocol)?;

            let block_list = load_blocks(&blocks)?;
            let orchestrator = SnapshotOrchestrator::for_vaults(source);
            watch_interrupt(orchestrator.cancel_flag());

            println!("📡 Snapshotting {} blocks of {chain}/{protocol} vaults...", block_list.len());
            let outcome = orchestrator.build_vault_snapshot(&block_list).await;
            write_report(&output, &outcome)?;
            print_summary(&outcome, &output);
        }
        Commands::Position {
            chain,
            protocol,
            amm,
            block,
            id,
            subgraph_url,
        } => {
            let key = SourceKey::new(chain, protocol, amm);
            if let Some(url) = subgraph_url {
                config.set_subgraph_url(key, url);
            }
            config.subgraph_url(key)?;
            let source = config.registry().position_source(key)?;

            let valued = SnapshotOrchestrator::new(source)
                .lookup_position(block, &id)
                .await
                .with_context(|| format!("failed to value position {id} at block {block}"))?;

            let position = &valued.position;
            println!("\n📊 Position {} (block {})", position.id, block);
            println!("Owner: {}", position.owner);
            println!("Pool:  {}", position.pool.id);
            println!(
                "Range: [{}, {}) at tick {}{}",
                position.tick_lower,
                position.tick_upper,
                position.pool.tick,
                if position.is_in_range() { "" } else { " (out of range)" }
            );

            let mut table = Table::new();
            table.add_row(row!["Token", "Raw amount", "Amount", "USD"]);
            table.add_row(row![
                position.token0.symbol,
                valued.token0_amount_raw,
                valued.token0_decimal_value,
                valued.token0_usd_value
            ]);
            table.add_row(row![
                position.token1.symbol,
                valued.token1_amount_raw,
                valued.token1_decimal_value,
                valued.token1_usd_value
            ]);
            table.printstd();
            println!("Total: ${:.4}", valued.total_usd());
        }
    }

    Ok(())
}

fn load_blocks(path: &Path) -> Result<Vec<u64>> {
    let list = read_blocks(path)
        .with_context(|| format!("failed to read block list {}", path.display()))?;
    for entry in &list.malformed {
        warn!(error = %entry, "Ignored block list entry");
    }
    Ok(list.blocks)
}

/// Cancels the run on Ctrl-C; the current block finishes first.
fn watch_interrupt(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current block");
            cancel.cancel();
        }
    });
}

fn write_report(path: &Path, outcome: &SnapshotOutcome) -> Result<()> {
    let mut writer = CsvReportWriter::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_rows(&outcome.rows)?;
    writer.finish()?;
    Ok(())
}

fn print_summary(outcome: &SnapshotOutcome, output: &Path) {
    let mut table = Table::new();
    table.add_row(row!["Block", "Positions", "Rows", "USD"]);
    for summary in &outcome.summaries {
        table.add_row(row![
            summary.block,
            summary.positions_fetched,
            summary.rows,
            format!("{:.4}", summary.usd_total)
        ]);
    }
    println!("\n📊 Snapshot Results");
    table.printstd();
    println!("Rows written:  {} → {}", outcome.rows.len(), output.display());
    println!("Total USD:     {:.4}", outcome.total_usd());

    if !outcome.block_failures.is_empty() {
        println!("\n❌ Skipped blocks:");
        for failure in &outcome.block_failures {
            println!("  {}: {}", failure.block, failure.error);
        }
    }
    if !outcome.position_failures.is_empty() {
        println!("\n⚠️  Skipped positions:");
        for failure in &outcome.position_failures {
            println!("  block {} position {}: {}", failure.block, failure.position_id, failure.reason);
        }
    }
    if !outcome.aggregation_failures.is_empty() {
        println!("\n⚠️  Dropped aggregated rows (liquidity overflow):");
        for failure in &outcome.aggregation_failures {
            println!(
                "  block {} owner {} pool {} ({} positions)",
                failure.block, failure.owner, failure.pool_id, failure.positions
            );
        }
    }
    if outcome.cancelled {
        println!("\n⚠️  Run cancelled before the last block");
    }
}
