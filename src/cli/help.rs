//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log fields (e.g. "verify", "config").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Verify { .. } => "verify",
        Commands::Config { .. } => "config",
    }
}
