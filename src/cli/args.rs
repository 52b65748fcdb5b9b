//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--repo <path>`: Repository to operate on
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//! - `--testnet`: Render addresses with the testnet prefix

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// filminerctl - repair storage-miner repository metadata
#[derive(Parser, Debug)]
#[command(name = "filminerctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository to operate on (overrides $LOTUS_MINER_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Render addresses with the testnet prefix
    #[arg(long, global = true)]
    pub testnet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or repair the sector-number counter
    #[command(
        name = "fix-counter",
        alias = "fixcounter",
        long_about = "Inspect or repair the sector-number counter.\n\n\
            Without --set, prints the stored counter value and changes nothing. \
            With --set, replaces the stored value unconditionally. Only do this \
            when the counter is corrupt or lost: the next sector allocated will \
            get exactly this number.",
        after_help = "\
EXAMPLES:
    # Show the stored value (the next sector number to be allocated)
    filminerctl fix-counter

    # Repair a lost counter so allocation resumes at 1200
    filminerctl fix-counter --set 1200"
    )]
    FixCounter {
        /// Overwrite the counter with this value
        #[arg(long, value_name = "N")]
        set: Option<u64>,
    },

    /// Allocate one sector number from the counter
    #[command(name = "next-counter")]
    NextCounter,

    /// Replace the stored miner address
    #[command(
        name = "fix-address",
        long_about = "Replace the stored miner address.\n\n\
            The record holds the address the storage miner daemon runs as: \
            normally the miner actor's id address, so pass the same value twice \
            (filminerctl fix-address f01000 f01000). MINER_ID must be that id \
            address. ADDRESS is what gets stored; a different id address is \
            refused, while a key or actor address is stored as given. When \
            ADDRESS is omitted the owner address from $LOTUS_MINER_OWNER or the \
            config file is stored instead. Both are validated before the \
            repository is touched.",
        after_help = "\
EXAMPLES:
    # Restore the usual record: the miner actor's own id address
    filminerctl fix-address f01000 f01000

    # Store the configured owner address for miner f01000
    LOTUS_MINER_OWNER=f3... filminerctl fix-address f01000"
    )]
    FixAddress {
        /// Miner actor id address
        #[arg(value_name = "MINER_ID")]
        miner: String,

        /// Address to store (defaults to the owner address)
        #[arg(value_name = "ADDRESS")]
        address: Option<String>,
    },

    /// Print the stored miner address
    #[command(name = "get-address")]
    GetAddress,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_fix_counter_set() {
        let cli = Cli::parse_from(["filminerctl", "fix-counter", "--set", "100"]);
        assert!(matches!(cli.command, Command::FixCounter { set: Some(100) }));
    }

    #[test]
    fn legacy_fixcounter_alias() {
        let cli = Cli::parse_from(["filminerctl", "fixcounter"]);
        assert!(matches!(cli.command, Command::FixCounter { set: None }));
    }

    #[test]
    fn parse_fix_address_with_globals() {
        let cli = Cli::parse_from([
            "filminerctl",
            "fix-address",
            "f01000",
            "f01000",
            "--repo",
            "/srv/miner",
            "--json",
        ]);
        assert_eq!(cli.repo, Some(PathBuf::from("/srv/miner")));
        assert!(cli.json);
        match cli.command {
            Command::FixAddress { miner, address } => {
                assert_eq!(miner, "f01000");
                assert_eq!(address.as_deref(), Some("f01000"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn negative_counter_rejected() {
        let result = Cli::try_parse_from(["filminerctl", "fix-counter", "--set", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_json() {
        let result = Cli::try_parse_from(["filminerctl", "-q", "--json", "get-address"]);
        assert!(result.is_err());
    }
}
