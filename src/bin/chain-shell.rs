#![forbid(unsafe_code)]
//! Interactive terminal front end for a single in-memory ledger

use blockchain_demo::blockchain::Blockchain;
use blockchain_demo::cli::{check_hash_text, render_chain, render_pending, Command, HELP};
use blockchain_demo::config::{load_config, load_config_from};
use blockchain_demo::crypto::hash_text;
use blockchain_demo::error::ChainError;
use blockchain_demo::miner::mine_pending;
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;

const BANNER: &str = r#"
╔═══════════════════════════════════════════════════════════════╗
║                    ⛓  BLOCKCHAIN DEMO  ⛓                      ║
║      queue transactions, mine blocks, watch the hashes link    ║
╚═══════════════════════════════════════════════════════════════╝
"#;

#[derive(Parser)]
#[command(version, about = "Play with an in-memory blockchain")]
struct Args {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Emit log output at the configured level instead of warnings only.
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<ShellCommand>,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Print the SHA-256 digest of TEXT and exit.
    Hash { text: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let level = if args.verbose {
        config.logging.tracing_level()?
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    if let Some(ShellCommand::Hash { text }) = args.command {
        check_hash_text(&text)?;
        println!("{}", hash_text(&text));
        return Ok(());
    }

    run_shell(config.mining.proof_range())
}

fn run_shell(proof_range: RangeInclusive<u64>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", BANNER.bright_cyan());
    println!("{}", HELP);
    println!();

    let mut chain = Blockchain::new();
    let mut rng = rand::thread_rng();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", "chain>".bright_green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{}", msg.red());
                continue;
            }
        };

        match command {
            Command::Transaction {
                sender,
                recipient,
                amount,
            } => match chain.submit_transaction(sender, recipient, amount) {
                Some(position) => println!(
                    "{}",
                    format!("Transaction added to pending transactions! (#{})", position).green()
                ),
                None => println!(
                    "{}",
                    "Pending transactions full. Mine a new block to add more.".red()
                ),
            },
            Command::Mine => match mine_pending(&mut chain, &mut rng, proof_range.clone()) {
                Ok(block) => {
                    println!(
                        "{}",
                        "New block mined and added to the blockchain!".green().bold()
                    );
                    println!("  index: {}", block.index());
                    println!("  proof: {}", block.proof());
                    println!("  hash:  {}", block.hash_hex().bright_white());
                }
                Err(ChainError::NothingToMine) => {
                    println!("{}", ChainError::NothingToMine.to_string().red())
                }
                Err(e) => return Err(e.into()),
            },
            Command::Pending => println!("{}", render_pending(&chain)),
            Command::Chain => println!("{}", render_chain(&chain)),
            Command::Verify => match chain.verify_links() {
                Ok(()) => println!(
                    "{}",
                    format!("All {} blocks are correctly linked.", chain.len()).green()
                ),
                Err(e) => println!("{}", e.to_string().red()),
            },
            Command::Hash(text) => {
                println!("SHA256 Hash: {}", hash_text(&text).bright_white());
                println!(
                    "{}",
                    "Notice how even a small change in the input produces a completely different hash!"
                        .cyan()
                );
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}
