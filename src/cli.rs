//! Presentation helpers shared by the binaries: input checks, command
//! parsing for the interactive shell, and table rendering.

use crate::blockchain::{Block, Blockchain};
use crate::error::{ChainError, Result};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

/// Smallest amount the front ends accept for a new transaction. The ledger
/// itself takes any number.
pub const MIN_AMOUNT: f64 = 0.1;

pub fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < MIN_AMOUNT {
        return Err(ChainError::InvalidAmount(format!(
            "amount must be a number no smaller than {}",
            MIN_AMOUNT
        )));
    }
    Ok(())
}

/// Refuses empty input to the hashing utility.
pub fn check_hash_text(text: &str) -> std::result::Result<(), String> {
    if text.is_empty() {
        return Err("Enter some text to hash".to_string());
    }
    Ok(())
}

/// Splits on whitespace, except inside double quotes. `\"` and `\\` escape
/// inside a quoted field; `""` is an empty field.
fn split_fields(input: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut field = String::new();
        if c == '"' {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped @ ('"' | '\\')) => field.push(escaped),
                        Some(other) => {
                            field.push('\\');
                            field.push(other);
                        }
                        None => return Err("unterminated quote".to_string()),
                    },
                    Some(other) => field.push(other),
                    None => return Err("unterminated quote".to_string()),
                }
            }
            if chars.peek().is_some_and(|next| !next.is_whitespace()) {
                return Err("expected a space after a closing quote".to_string());
            }
        } else {
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                field.push(next);
                chars.next();
            }
        }
        fields.push(field);
    }

    Ok(fields)
}

/// One line of input to the interactive shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Transaction {
        sender: String,
        recipient: String,
        amount: f64,
    },
    Mine,
    Pending,
    Chain,
    Verify,
    Hash(String),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "tx" | "transaction" => {
                let parts = split_fields(rest)?;
                if parts.len() != 3 {
                    return Err(
                        "usage: tx <sender> <recipient> <amount> (quote names with spaces)"
                            .to_string(),
                    );
                }
                let amount: f64 = parts[2]
                    .parse()
                    .map_err(|_| format!("'{}' is not a number", parts[2]))?;
                check_amount(amount).map_err(|e| e.to_string())?;
                let mut parts = parts.into_iter();
                Ok(Command::Transaction {
                    sender: parts.next().unwrap_or_default(),
                    recipient: parts.next().unwrap_or_default(),
                    amount,
                })
            }
            "mine" => Ok(Command::Mine),
            "pending" => Ok(Command::Pending),
            "chain" => Ok(Command::Chain),
            "verify" => Ok(Command::Verify),
            "hash" => {
                check_hash_text(rest)?;
                // Keep the text exactly as typed after the command word.
                Ok(Command::Hash(line["hash".len()..].trim_start().to_string()))
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

pub const HELP: &str = "\
Commands:
  tx <sender> <recipient> <amount>  queue a transaction (at most 3 pending);
                                    quote names containing spaces: tx \"Ann Lee\" Bob 2
  mine                              seal pending transactions into a block
  pending                           show pending transactions
  chain                             show every block
  verify                            check the hash links of the chain
  hash <text>                       SHA-256 of arbitrary text
  help                              this text
  quit                              leave";

pub fn render_pending(chain: &Blockchain) -> String {
    if chain.pending().is_empty() {
        return "No pending transactions.".yellow().to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Sender", "Recipient", "Amount"]);
    for (i, tx) in chain.pending().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(tx.sender()),
            Cell::new(tx.recipient()),
            Cell::new(tx.amount()),
        ]);
    }
    format!(
        "{}\n{}",
        format!(
            "Pending Transactions ({}/{})",
            chain.pending().len(),
            chain.pending_capacity()
        )
        .green()
        .bold(),
        table
    )
}

pub fn render_block(block: &Block) -> String {
    let title = match block.index() {
        1 => "Genesis Block".blue().bold().to_string(),
        0 => "Block 0".green().bold().to_string(),
        index => format!("Block {}", index - 1).green().bold().to_string(),
    };

    // Hashes stay on one line so they can be copied.
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.add_row(vec!["index".to_string(), block.index().to_string()]);
    table.add_row(vec!["timestamp".to_string(), block.timestamp().to_string()]);
    table.add_row(vec!["proof".to_string(), block.proof().to_string()]);
    table.add_row(vec![
        "previous_hash".to_string(),
        block.previous_hash().to_string(),
    ]);
    table.add_row(vec!["hash".to_string(), block.hash_hex()]);
    for (i, tx) in block.transactions().iter().enumerate() {
        table.add_row(vec![
            format!("transaction {}", i + 1),
            format!("{} -> {}: {}", tx.sender(), tx.recipient(), tx.amount()),
        ]);
    }
    format!("{}\n{}", title, table)
}

pub fn render_chain(chain: &Blockchain) -> String {
    chain
        .chain()
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n        ⬇\n")
}
