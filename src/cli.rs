//! Command-line surface, parsed with `clap`'s derive API.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "tinycc", about = "A small teaching-compiler middle end")]
pub struct Cli {
    /// Source file to compile. Reads from stdin when omitted.
    pub input: Option<PathBuf>,

    /// Increases diagnostic verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Optimization level: 0 disables rewriting, 1 runs folding and
    /// propagation to a fixed point, 2 additionally eliminates dead
    /// variables and constant conditions.
    #[arg(short = 'O', long = "opt-level", default_value_t = 2)]
    pub opt_level: u32,
}
