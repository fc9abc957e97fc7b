use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::{load_script, run_script};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the run script JSON file
    #[arg(short, long)]
    script: PathBuf,

    /// Emit the full report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let script = load_script(&args.script)
        .map_err(|e| anyhow::anyhow!("Failed to load script {}: {:?}", args.script.display(), e))?;
    let report =
        run_script(&script).map_err(|e| anyhow::anyhow!("Run failed during execution: {:?}", e))?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Run complete.");
    println!("Turns: {}", report.turns);
    for verdict in &report.verdicts {
        println!("  {}: {}", verdict.objective, verdict.decision);
    }
    println!("Outcome: {}", report.merged);
    println!("Snapshot Hash: {}", report.snapshot_hash);

    Ok(())
}
