//! Defines the CLI commands.

// Imports
use clap::{Args, Parser, Subcommand};
use url::Url;

pub mod prompt;

const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Main CLI struct
#[derive(Parser, Debug)]
#[command(
    author,
    version = VERSION_STRING,
    about,
    long_about = "Barrage deploys a contract from every configured account and fires randomized interactions at it."
)]
pub struct Cli {
    #[clap(flatten)]
    pub global_opts: GlobalOpts,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy the contract for every account and run the interactions.
    Shoot {},
    /// Manage the network registry.
    Networks {
        #[command(subcommand)]
        command: NetworksCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum NetworksCommand {
    /// List the known networks.
    List,
    /// Add a network, replacing any entry with the same chain id.
    Add {
        chain_id: String,
        rpc: Url,
        explorer: String,
    },
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file path, optional.
    #[clap(short, long, global = true)]
    pub config_path: Option<String>,
}
