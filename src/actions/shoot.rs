use std::io;

use color_eyre::eyre::Result;
use log::{error, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio_util::sync::CancellationToken;

use crate::{
    account::Account,
    artifact::ContractArtifact,
    cli::prompt::Prompt,
    config::{BarrageConfig, Workload},
    connector::{ChainConnector, RpcConnector},
    error::ChainError,
    keys::KeyStore,
    registry::NetworkRegistry,
    report::{self, AccountReport, RunSummary},
    utils::cancel_on_interrupt,
};

use super::{deploy::deploy, interact::InteractionLoop};

/// Shoot the interaction workload: deploy and interact for every configured account.
///
/// Everything interactive happens before the run starts. Ctrl-C is only
/// intercepted once the coordinator is running.
pub async fn shoot(config: BarrageConfig) -> Result<RunSummary> {
    let mut prompt = Prompt::new(io::stdin().lock(), io::stdout());

    let mut registry = NetworkRegistry::load(&config.network.registry_path)?;
    let network = match &config.network.chain_id {
        Some(chain_id) => registry.select(chain_id)?,
        None => prompt.select_network(&mut registry)?,
    };
    info!("Using network {} at {}", network.chain_id, network.rpc);

    let connector = RpcConnector::new(network.rpc.clone())
        .with_confirmation_timeout(config.run.confirmation_timeout())
        .with_poll_interval(config.run.poll_interval());

    let key_store = KeyStore::new(&config.keys.path);
    let keys = prompt.keys(&key_store)?;
    let accounts = key_store.accounts(&keys)?;

    let interactive = config.run.interaction_count.is_none()
        || config.run.min_delay.is_none()
        || config.run.max_delay.is_none();
    let mut workload = prompt.workload(&config.run)?;
    if interactive && workload.gas.is_none() {
        workload.gas = prompt.gas_settings(connector.current_gas_price().await?)?;
    }

    let artifact = config.contract.source.load()?;

    let mut rng = match config.run.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let cancel = cancel_on_interrupt(tokio::signal::ctrl_c, || {
        error!("Interrupted twice, aborting");
        std::process::exit(130);
    });

    let coordinator = RunCoordinator::new(&connector, &workload, &network.explorer, cancel);
    let summary = coordinator.execute(&accounts, &artifact, &mut rng).await?;

    println!("{summary}");

    if let Some(dir) = &config.report.output_dir {
        let path = summary.write_json(dir, &network.chain_id)?;
        info!("Report written to {}", path.display());
    }

    Ok(summary)
}

/// Drives the deployment step then the interaction loop, one account at a time.
pub struct RunCoordinator<'a, C> {
    connector: &'a C,
    workload: &'a Workload,
    explorer: &'a str,
    cancel: CancellationToken,
}

impl<'a, C: ChainConnector> RunCoordinator<'a, C> {
    pub fn new(
        connector: &'a C,
        workload: &'a Workload,
        explorer: &'a str,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            connector,
            workload,
            explorer,
            cancel,
        }
    }

    /// Process every account sequentially and accumulate the outcome counters.
    ///
    /// An unreachable network fails the whole run before any account is
    /// touched. A failed deployment is reported with zero confirmed and zero
    /// failed interactions and the run moves on to the next account.
    pub async fn execute<R: Rng + ?Sized>(
        &self,
        accounts: &[Account],
        artifact: &ContractArtifact,
        rng: &mut R,
    ) -> Result<RunSummary, ChainError> {
        if !self.connector.is_reachable().await {
            return Err(ChainError::Connectivity(
                "network did not answer, check the RPC URL".to_string(),
            ));
        }
        let chain_id = self.connector.chain_id().await?;
        info!("Connected to chain {chain_id}");

        let mut summary = RunSummary::default();
        let interactions = InteractionLoop::new(
            self.connector,
            chain_id,
            self.workload,
            self.explorer,
            self.cancel.clone(),
        );

        for account in accounts {
            if self.cancel.is_cancelled() {
                warn!("Run cancelled, skipping remaining accounts");
                summary.cancelled = true;
                break;
            }

            let address = account.address();
            report::print_banner(&format!("Processing wallet: {address}"));

            let contract = match deploy(
                self.connector,
                account,
                chain_id,
                artifact,
                self.explorer,
                self.workload.gas,
            )
            .await
            {
                Ok(contract) => contract,
                Err(err) => {
                    error!("Skipping {address}: {err}");
                    summary.record(AccountReport::deployment_failed(address, err));
                    continue;
                }
            };

            let report = interactions.run(account, &contract, rng).await;
            summary.cancelled |= report.cancelled;
            summary.record(AccountReport::interacted(address, contract.address, report));
        }

        Ok(summary)
    }
}
