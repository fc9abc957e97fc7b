//! Breadth-first search for a winning action sequence on a level file.
//! Deterministic by construction: legal actions come out in a fixed order
//! and visited states are tracked by snapshot hash.

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::loader::{parse_level, parse_objectives};
use game_core::{Action, Decision, GameState, IdAlloc, apply_action, legal_actions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a level text file
    #[arg(short, long)]
    level: PathBuf,

    /// Comma-separated objective list
    #[arg(short, long, default_value = "LevelComplete")]
    objectives: String,

    /// Maximum number of actions to search
    #[arg(short, long, default_value_t = 24)]
    depth: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let text = fs::read_to_string(&args.level)
        .with_context(|| format!("Failed to read level file: {}", args.level.display()))?;
    let mut ids = IdAlloc::new();
    let initial =
        parse_level(&text, &mut ids).map_err(|e| anyhow::anyhow!("Bad level: {:?}", e))?;
    let objectives = parse_objectives(&args.objectives)
        .map_err(|e| anyhow::anyhow!("Bad objectives: {:?}", e))?;

    let mut visited = BTreeSet::new();
    visited.insert(initial.snapshot_hash());
    let mut queue: VecDeque<(GameState, Vec<Action>, u32)> = VecDeque::new();
    queue.push_back((initial.clone(), Vec::new(), 0));

    while let Some((state, actions, turns)) = queue.pop_front() {
        let merged = objectives
            .iter()
            .map(|objective| objective.judge(&initial, &state, turns))
            .fold(Decision::NotApplicable, |merged, decision| merged & decision);
        if merged == Decision::Success {
            let script: Vec<String> = actions.iter().map(ToString::to_string).collect();
            println!("Solved in {} turns: {}", turns, script.join(","));
            return Ok(());
        }
        if actions.len() >= args.depth {
            continue;
        }
        for action in legal_actions(&state) {
            let mut next = state.clone();
            if apply_action(&mut next, &action).is_err() {
                continue;
            }
            if visited.insert(next.snapshot_hash()) {
                let mut path = actions.clone();
                path.push(action);
                queue.push_back((next, path, turns + action.turns()));
            }
        }
    }

    anyhow::bail!("No solution within {} actions", args.depth)
}
