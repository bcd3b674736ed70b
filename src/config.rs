//! General configuration

use std::{path::PathBuf, time::Duration};

use color_eyre::eyre::{ensure, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, File};
use serde::Deserialize;

use crate::{
    artifact::{ContractSource, SoliditySource},
    connector::{DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL},
};

const WEI_PER_GWEI: f64 = 1_000_000_000.0;

/// Configuration for the application.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BarrageConfig {
    /// Which network to target and where known networks are stored.
    #[serde(default)]
    pub network: NetworkSelection,
    /// Where the private keys of the funded accounts are stored.
    #[serde(default)]
    pub keys: KeysConfig,
    /// The contract deployed for every account.
    #[serde(default)]
    pub contract: ContractConfig,
    /// The interaction phase configuration.
    #[serde(default)]
    pub run: RunConfig,
    /// Reporting configuration.
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkSelection {
    pub registry_path: PathBuf,
    /// Chain id of a registry entry. Prompted for when absent.
    pub chain_id: Option<String>,
}

impl Default for NetworkSelection {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("network_info.json"),
            chain_id: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeysConfig {
    pub path: PathBuf,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("private_keys.txt"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContractConfig {
    pub source: ContractSource,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            source: ContractSource::Solidity(SoliditySource {
                path: PathBuf::from("AdvancedInteraction.sol"),
                contract: "AdvancedInteraction".to_string(),
                solc: PathBuf::from("solc"),
            }),
        }
    }
}

/// Workload knobs. Missing values are asked for interactively.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RunConfig {
    /// Interactions performed per account.
    pub interaction_count: Option<u64>,
    /// Bounds, in seconds, of the pause after each interaction.
    pub min_delay: Option<f64>,
    pub max_delay: Option<f64>,
    /// Manual gas settings replacing estimation and the node gas price.
    pub gas: Option<GasOverride>,
    /// Seed of the generator picking operations, arguments and delays.
    pub seed: Option<u64>,
    pub confirmation_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl RunConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        self.confirmation_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct GasOverride {
    pub gas_price_gwei: f64,
    pub gas_limit: u64,
}

impl GasOverride {
    pub fn gas_price_wei(&self) -> u128 {
        (self.gas_price_gwei * WEI_PER_GWEI).round() as u128
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.gas_price_gwei.is_finite() && self.gas_price_gwei >= 0.0,
            "Gas price override must be a non-negative number, got {}",
            self.gas_price_gwei
        );
        ensure!(self.gas_limit > 0, "Gas limit override must be positive");
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    /// Directory receiving a JSON report of the run, none is written when unset.
    pub output_dir: Option<PathBuf>,
}

/// A fully resolved and validated workload.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub interaction_count: u64,
    pub min_delay: f64,
    pub max_delay: f64,
    pub gas: Option<GasOverride>,
}

impl Workload {
    pub fn new(
        interaction_count: u64,
        min_delay: f64,
        max_delay: f64,
        gas: Option<GasOverride>,
    ) -> Result<Self> {
        ensure!(interaction_count > 0, "Interaction count must be positive");
        ensure!(
            min_delay.is_finite() && max_delay.is_finite(),
            "Delays must be finite numbers"
        );
        ensure!(min_delay >= 0.0, "Minimum delay must not be negative");
        ensure!(
            min_delay <= max_delay,
            "Minimum delay {min_delay}s is greater than maximum delay {max_delay}s"
        );
        if let Some(gas) = &gas {
            gas.validate()?;
        }

        Ok(Self {
            interaction_count,
            min_delay,
            max_delay,
            gas,
        })
    }
}

impl BarrageConfig {
    /// Create a new configuration from environment variables.
    pub fn new() -> Result<Self> {
        Ok(base_config_builder().build()?.try_deserialize()?)
    }

    /// Create a new configuration from a file.
    pub fn from_file(path: &str) -> Result<Self> {
        Ok(base_config_builder()
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()?)
    }
}

fn base_config_builder() -> ConfigBuilder<DefaultState> {
    Config::builder()
        // Add in settings from the environment (with a prefix of BARRAGE)
        // Eg.. `BARRAGE_RUN__INTERACTION_COUNT=10 ./target/app` would set `run.interaction_count`
        .add_source(
            config::Environment::with_prefix("barrage")
                .prefix_separator("_")
                .separator("__"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_file_and_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barrage.toml");
        std::fs::write(
            &path,
            r#"
[network]
registry_path = "networks.json"
chain_id = "31337"

[contract.source]
artifact = "out/AdvancedInteraction.json"

[run]
interaction_count = 25
min_delay = 0.5
max_delay = 2.0
seed = 7

[run.gas]
gas_price_gwei = 1.5
gas_limit = 300000
"#,
        )
        .unwrap();

        let cfg = BarrageConfig::from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(cfg.network.chain_id.as_deref(), Some("31337"));
        assert_eq!(cfg.keys.path, PathBuf::from("private_keys.txt"));
        assert!(matches!(
            cfg.contract.source,
            ContractSource::Artifact(ref p) if p == &PathBuf::from("out/AdvancedInteraction.json")
        ));
        assert_eq!(cfg.run.interaction_count, Some(25));
        assert_eq!(cfg.run.seed, Some(7));
        assert_eq!(cfg.run.gas.unwrap().gas_price_wei(), 1_500_000_000);
        assert_eq!(cfg.run.confirmation_timeout(), DEFAULT_CONFIRMATION_TIMEOUT);
        assert!(cfg.report.output_dir.is_none());
    }

    #[test]
    fn default_contract_is_the_solidity_source() {
        let cfg = BarrageConfig::default();
        match cfg.contract.source {
            ContractSource::Solidity(source) => {
                assert_eq!(source.contract, "AdvancedInteraction");
                assert_eq!(source.path, PathBuf::from("AdvancedInteraction.sol"));
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn workload_validation() {
        assert!(Workload::new(3, 0.0, 0.0, None).is_ok());
        assert!(Workload::new(3, 1.0, 5.0, None).is_ok());
        assert!(Workload::new(0, 1.0, 5.0, None).is_err());
        assert!(Workload::new(3, 5.0, 1.0, None).is_err());
        assert!(Workload::new(3, -1.0, 1.0, None).is_err());
        assert!(Workload::new(3, 0.0, f64::INFINITY, None).is_err());

        let zero_limit = GasOverride {
            gas_price_gwei: 1.0,
            gas_limit: 0,
        };
        assert!(Workload::new(3, 0.0, 1.0, Some(zero_limit)).is_err());

        let negative_price = GasOverride {
            gas_price_gwei: -5.0,
            gas_limit: 30_000,
        };
        assert!(Workload::new(3, 0.0, 1.0, Some(negative_price)).is_err());
    }
}
