use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Linesift - incremental line filter over a Unix socket
#[derive(Parser, Debug)]
#[command(name = "lsift")]
#[command(version)]
#[command(about = "Incremental substring filter server over a Unix socket")]
#[command(long_about = "Linesift (lsift) serves incremental substring search over a Unix socket.

A client loads a text file into a session, then narrows it one keystroke at a
time with search messages; the server answers each message with the currently
selected line. One client is serviced at a time.

Quick start:
  1. Run 'lsift --init' to generate a config file (optional, defaults work)
  2. Run 'lsift' to start the server
  3. Run 'lsift query notes.txt apple' from another shell to try it")]
pub struct Cli {
    /// Path to config file (defaults to .linesift.toml)
    #[arg(short, long, default_value = ".linesift.toml")]
    pub config: String,

    /// Socket path (overrides config file setting)
    #[arg(short, long)]
    pub socket: Option<PathBuf>,

    /// Write a default .linesift.toml config file and exit
    #[arg(long)]
    pub init: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the filter server (the default when no subcommand is given)
    Serve,
    /// One-shot client: load a file, search it, print the selected line
    Query {
        /// Source file the server should load
        filename: String,
        /// The search pattern (substring match; empty shows the first line)
        pattern: String,
        /// Move the selection by this offset after searching
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        move_by: i64,
    },
}

/// Write a default config file at the given path
pub fn init_config(config_path: &str) -> anyhow::Result<()> {
    if Path::new(config_path).exists() {
        bail!("Config file {config_path} already exists");
    }

    Config::default().save(config_path)?;
    println!("Created {config_path}");
    Ok(())
}
