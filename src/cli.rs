//! CLI definitions and plumbing.

use std::path::Path;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source file to check. Starts a REPL when absent.
    pub input: Option<Box<Path>>,
}
