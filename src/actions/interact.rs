//! The fixed-count trial runner driving calls against a deployed contract.

use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::{
    account::Account,
    catalog::{self, OperationSpec, ResolvedCall},
    config::Workload,
    connector::ChainConnector,
    report::{self, InteractionReport, TrialOutcome, TrialRecord},
};

use super::{deploy::DeployedContract, send_transaction};

/// Draw the pause following a trial, uniformly from `[min_secs, max_secs]`.
pub fn draw_delay<R: Rng + ?Sized>(rng: &mut R, min_secs: f64, max_secs: f64) -> Duration {
    let secs = if max_secs > min_secs {
        rng.gen_range(min_secs..=max_secs)
    } else {
        min_secs
    };
    Duration::from_secs_f64(secs)
}

pub struct InteractionLoop<'a, C> {
    connector: &'a C,
    chain_id: u64,
    workload: &'a Workload,
    explorer: &'a str,
    catalog: &'a [OperationSpec],
    cancel: CancellationToken,
}

impl<'a, C: ChainConnector> InteractionLoop<'a, C> {
    pub fn new(
        connector: &'a C,
        chain_id: u64,
        workload: &'a Workload,
        explorer: &'a str,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            connector,
            chain_id,
            workload,
            explorer,
            catalog: &catalog::OPERATIONS,
            cancel,
        }
    }

    pub fn with_catalog(mut self, catalog: &'a [OperationSpec]) -> Self {
        self.catalog = catalog;
        self
    }

    /// Run `workload.interaction_count` trials from `account` against `contract`.
    ///
    /// Failures are counted and never stop the loop. Cancellation is honored
    /// before a trial starts and while pausing between trials.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        account: &Account,
        contract: &DeployedContract,
        rng: &mut R,
    ) -> InteractionReport {
        let total = self.workload.interaction_count;
        let mut report = InteractionReport::default();

        info!(
            "Running {total} interactions from {} against {}",
            account.address(),
            contract.address
        );

        for index in 0..total {
            if self.cancel.is_cancelled() {
                warn!("Interactions cancelled after {index} of {total} trials");
                report.cancelled = true;
                break;
            }

            let record = self.trial(index, account, contract, rng).await;
            match &record.outcome {
                TrialOutcome::Confirmed { hash, .. } => report::print_confirmed(*hash, self.explorer),
                TrialOutcome::Failed { reason } => report::print_failed(reason),
            }
            report.record(record);

            let delay = draw_delay(rng, self.workload.min_delay, self.workload.max_delay);
            report::print_delay(delay);

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    if index + 1 < total {
                        warn!("Interactions cancelled after {} of {total} trials", index + 1);
                        report.cancelled = true;
                    }
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(
            "Interactions from {} done: {} confirmed, {} failed",
            account.address(),
            report.confirmed,
            report.failed
        );

        report
    }

    async fn trial<R: Rng + ?Sized>(
        &self,
        index: u64,
        account: &Account,
        contract: &DeployedContract,
        rng: &mut R,
    ) -> TrialRecord {
        let Some(operation) = catalog::select(self.catalog, rng) else {
            return TrialRecord {
                index,
                operation: "",
                nonce: None,
                outcome: TrialOutcome::Failed {
                    reason: "no operation to choose from".into(),
                },
            };
        };

        report::print_operation(index + 1, self.workload.interaction_count, operation.name);
        let call = operation.resolve(rng);
        debug!("Resolved {} with args {:?} and value {}", call.operation, call.args, call.value);

        let (nonce, outcome) = self.execute(account, contract, &call).await;

        TrialRecord {
            index,
            operation: operation.name,
            nonce,
            outcome,
        }
    }

    async fn execute(
        &self,
        account: &Account,
        contract: &DeployedContract,
        call: &ResolvedCall,
    ) -> (Option<u64>, TrialOutcome) {
        let input = match call.encode(&contract.abi) {
            Ok(input) => input,
            Err(err) => {
                return (
                    None,
                    TrialOutcome::Failed {
                        reason: err.to_string(),
                    },
                )
            }
        };

        let attempt = send_transaction(
            self.connector,
            account,
            self.chain_id,
            Some(contract.address),
            input,
            call.value,
            self.workload.gas,
        )
        .await;

        let outcome = match attempt.result {
            Ok(receipt) => TrialOutcome::Confirmed {
                hash: receipt.transaction_hash,
                contract_address: receipt.contract_address,
            },
            Err(err) => {
                debug!("{} from {} failed: {err:?}", call.operation, account.address());
                TrialOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        (attempt.nonce, outcome)
    }
}
