//! Command-line surface of the `nesteval` binary.
//!
//! Kept in the library so commands can be tested without spawning the
//! binary.

pub mod commands;
pub mod output;
pub mod parser;

pub use parser::{Cli, Commands};

/// Run a parsed command.
pub fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Eval(args) => commands::eval::run(args),
        Commands::Sample(args) => commands::sample::run(args),
        Commands::Breakdown(args) => commands::breakdown::run(args),
    }
}
