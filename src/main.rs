#[macro_use]
extern crate log;
use barrage::{
    actions::shoot::shoot,
    cli::{Cli, Command, NetworksCommand},
    config::BarrageConfig,
    registry::NetworkRegistry,
};
use clap::Parser;
use color_eyre::eyre::Result;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger.
    env_logger::init();

    // Initialize the error handler.
    color_eyre::install()?;

    // Load the environment variables from the .env file.
    dotenv().ok();

    info!("Starting Barrage...");

    // Parse the command line arguments.
    let cli = Cli::parse();

    // Retrieve the application configuration.
    let cfg = match cli.global_opts.config_path {
        Some(path) => BarrageConfig::from_file(&path)?,
        None => BarrageConfig::new()?,
    };

    // Execute the command.
    match cli.command {
        Command::Shoot { .. } => {
            let summary = shoot(cfg).await?;
            info!(
                "Barrage completed: {} confirmed, {} failed",
                summary.total_confirmed, summary.total_failed
            );
        }
        Command::Networks { command } => {
            let mut registry = NetworkRegistry::load(&cfg.network.registry_path)?;
            match command {
                NetworksCommand::List => {
                    if registry.list_networks().is_empty() {
                        warn!("No networks registered in {}", registry.path().display());
                    }
                    for (chain_id, entry) in registry.list_networks() {
                        println!("{chain_id}\t{}\t{}", entry.rpc, entry.explorer);
                    }
                }
                NetworksCommand::Add {
                    chain_id,
                    rpc,
                    explorer,
                } => {
                    registry.add_network(chain_id, rpc, explorer)?;
                }
            }
        }
    }

    Ok(())
}
