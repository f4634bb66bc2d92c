//! racer-users - Main entry point
//!
//! Simulates concurrent participants racing to answer "yes".

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use racer_common::config::DEFAULT_SUBMIT_URL;
use racer_common::logging::init_tracing;
use racer_users::{run, SimConfig};
use tracing::info;

/// Command-line arguments for racer-users
#[derive(Parser, Debug)]
#[command(name = "racer-users")]
#[command(about = "Simulates participants submitting yes/no answers")]
#[command(version)]
struct Args {
    /// Number of participants (prompted for when omitted)
    #[arg(short, long)]
    users: Option<usize>,

    /// Intake submission URL
    #[arg(short, long, default_value = DEFAULT_SUBMIT_URL, env = "RACER_SUBMIT_URL")]
    endpoint: String,

    /// Shortest random delay before answering
    #[arg(long, default_value_t = 10)]
    min_delay_ms: u64,

    /// Longest random delay before answering
    #[arg(long, default_value_t = 1000)]
    max_delay_ms: u64,

    /// Chance that a participant answers "yes"
    #[arg(long, default_value_t = 0.5)]
    yes_probability: f64,
}

/// Ask for the participant count on stdin
fn prompt_users() -> Result<usize> {
    print!("Enter number of users: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    line.trim()
        .parse()
        .context("Invalid input. Please enter a positive integer.")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("racer_users=info");

    let args = Args::parse();
    let users = match args.users {
        Some(users) => users,
        None => prompt_users()?,
    };

    let config = SimConfig {
        users,
        endpoint: args.endpoint,
        min_delay_ms: args.min_delay_ms,
        max_delay_ms: args.max_delay_ms,
        yes_probability: args.yes_probability,
    };

    info!("Simulating {} participants against {}", config.users, config.endpoint);
    let summary = run(&config).await?;
    info!(
        "All participants finished: {} sent, {} failed, {} answered yes",
        summary.sent, summary.failed, summary.yes_answers
    );

    Ok(())
}
