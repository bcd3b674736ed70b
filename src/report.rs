//! Outcomes of trials, per-account reports and the run summary.

use std::{fmt, path::{Path, PathBuf}, time::Duration};

use alloy::primitives::{Address, B256};
use color_eyre::{owo_colors::OwoColorize, Result};
use serde::Serialize;

use crate::utils::{explorer_link, sanitize_filename};

/// Result of a single trial. Every trial produces exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TrialOutcome {
    Confirmed {
        hash: B256,
        contract_address: Option<Address>,
    },
    Failed {
        reason: String,
    },
}

impl TrialOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TrialOutcome::Confirmed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialRecord {
    pub index: u64,
    pub operation: &'static str,
    /// Nonce the transaction was signed with, `None` when the trial failed before signing.
    pub nonce: Option<u64>,
    pub outcome: TrialOutcome,
}

/// What the interaction loop did for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionReport {
    pub confirmed: u64,
    pub failed: u64,
    pub trials: Vec<TrialRecord>,
    pub cancelled: bool,
}

impl InteractionReport {
    pub fn record(&mut self, record: TrialRecord) {
        if record.outcome.is_confirmed() {
            self.confirmed += 1;
        } else {
            self.failed += 1;
        }
        self.trials.push(record);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_error: Option<String>,
    pub confirmed: u64,
    pub failed: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trials: Vec<TrialRecord>,
}

impl AccountReport {
    pub fn deployment_failed(address: Address, error: impl ToString) -> Self {
        Self {
            address,
            contract: None,
            deployment_error: Some(error.to_string()),
            confirmed: 0,
            failed: 0,
            trials: Vec::new(),
        }
    }

    pub fn interacted(address: Address, contract: Address, report: InteractionReport) -> Self {
        Self {
            address,
            contract: Some(contract),
            deployment_error: None,
            confirmed: report.confirmed,
            failed: report.failed,
            trials: report.trials,
        }
    }
}

/// Totals accumulated over every account of a run. Counters only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_confirmed: u64,
    pub total_failed: u64,
    pub accounts: Vec<AccountReport>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn record(&mut self, account: AccountReport) {
        self.total_confirmed += account.confirmed;
        self.total_failed += account.failed;
        self.accounts.push(account);
    }

    /// Write the summary as pretty JSON into `dir`, returning the file path.
    pub fn write_json(&self, dir: &Path, network: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}-report.json", sanitize_filename(network)));

        let writer = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(writer, self)?;
        Ok(path)
    }
}

impl fmt::Display for AccountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.contract, &self.deployment_error) {
            (_, Some(error)) => write!(f, "{}: deployment failed ({error})", self.address),
            (Some(contract), None) => write!(
                f,
                "{} -> {contract}: {} confirmed, {} failed",
                self.address, self.confirmed, self.failed
            ),
            (None, None) => write!(f, "{}: not processed", self.address),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", boxed("Summary Report"))?;

        for account in &self.accounts {
            writeln!(f, "{account}")?;
        }

        if self.cancelled {
            writeln!(f, "Run cancelled before completion")?;
        }

        writeln!(f, "Total confirmed interactions: {}", self.total_confirmed)?;
        write!(f, "Total failed interactions: {}", self.total_failed)
    }
}

/// Frame `message` in an ascii box.
pub fn boxed(message: &str) -> String {
    let border = format!("+{}+", "-".repeat(message.chars().count() + 2));
    format!("{border}\n| {message} |\n{border}")
}

pub fn print_banner(message: &str) {
    println!("{}", boxed(message).cyan());
}

pub fn print_operation(index: u64, total: u64, name: &str) {
    println!("{}", format!("[{index}/{total}] Interacting with method: {name}").yellow());
}

pub fn print_confirmed(hash: B256, explorer: &str) {
    println!("{}", format!("Transaction confirmed: {hash}").green());
    println!("{}", format!("View on explorer: {}", explorer_link(explorer, "tx", hash)).cyan());
}

pub fn print_deployed(address: Address, explorer: &str) {
    println!("{}", format!("Contract deployed at address: {address}").green());
    println!(
        "{}",
        format!("View on explorer: {}", explorer_link(explorer, "address", address)).cyan()
    );
}

pub fn print_failed(reason: &str) {
    println!("{}", format!("Transaction failed: {reason}").red());
}

pub fn print_delay(delay: Duration) {
    println!(
        "{}",
        format!("Waiting for {:.2} seconds before next interaction...", delay.as_secs_f64()).yellow()
    );
}
