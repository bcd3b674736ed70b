//! Interactive questions asked when the configuration leaves something open.

use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use color_eyre::{
    eyre::{bail, eyre, Result},
    owo_colors::OwoColorize,
};
use url::Url;

use crate::{
    config::{GasOverride, RunConfig, Workload},
    keys::KeyStore,
    registry::{NetworkConfig, NetworkRegistry},
};

/// Base cost of a plain transfer, shown next to the node's gas price.
const BASE_GAS_LIMIT: u64 = 21_000;

pub struct Prompt<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> Prompt<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{} ", question.green())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input closed while waiting for an answer to: {question}");
        }
        Ok(line.trim().to_string())
    }

    fn ask_parsed<T: FromStr>(&mut self, question: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        loop {
            let answer = self.ask(question)?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{}", format!("Invalid value {answer:?}: {e}").red())?,
            }
        }
    }

    /// List the registry and let the operator pick an entry or add a new one.
    pub fn select_network(&mut self, registry: &mut NetworkRegistry) -> Result<NetworkConfig> {
        loop {
            writeln!(self.output, "{}", "Available networks:".yellow())?;
            for (i, (chain_id, entry)) in registry.list_networks().iter().enumerate() {
                writeln!(
                    self.output,
                    "{}",
                    format!("{}. Chain {chain_id} RPC: {}", i + 1, entry.rpc).cyan()
                )?;
            }

            let choice = self.ask("Enter the number to select a network, or 'a' to add a new one:")?;

            if choice.eq_ignore_ascii_case("a") {
                let chain_id = self.ask("Enter the new chain ID:")?;
                let rpc: Url = self.ask_parsed("Enter the RPC URL:")?;
                let explorer = self.ask("Enter the Explorer URL:")?;
                registry.add_network(chain_id.clone(), rpc, explorer)?;
                writeln!(
                    self.output,
                    "{}",
                    format!("Network with Chain ID {chain_id} added successfully.").green()
                )?;
                continue;
            }

            match choice.parse().ok().and_then(|n| registry.select_index(n)) {
                Some(network) => return Ok(network),
                None => writeln!(self.output, "{}", "Invalid choice. Please try again.".red())?,
            }
        }
    }

    /// Read the stored keys, asking for one when the store is empty.
    pub fn keys(&mut self, store: &KeyStore) -> Result<Vec<String>> {
        Ok(store.prompt_and_persist_if_empty(&mut self.input, &mut self.output)?)
    }

    /// Fill the workload values the configuration does not provide.
    pub fn workload(&mut self, run: &RunConfig) -> Result<Workload> {
        let interaction_count = match run.interaction_count {
            Some(count) => count,
            None => self.ask_parsed("Enter the number of interactions to perform per wallet:")?,
        };
        let min_delay = match run.min_delay {
            Some(delay) => delay,
            None => self.ask_parsed("Enter the minimum delay between interactions (in seconds):")?,
        };
        let max_delay = match run.max_delay {
            Some(delay) => delay,
            None => self.ask_parsed("Enter the maximum delay between interactions (in seconds):")?,
        };

        Workload::new(interaction_count, min_delay, max_delay, run.gas)
    }

    /// Show the node's gas price and offer a manual override.
    pub fn gas_settings(&mut self, current_gas_price: u128) -> Result<Option<GasOverride>> {
        writeln!(self.output, "{}", "Current gas settings:".yellow())?;
        writeln!(
            self.output,
            "{}",
            format!("Gas Price: {:.2} Gwei", current_gas_price as f64 / 1e9).cyan()
        )?;
        writeln!(
            self.output,
            "{}",
            format!("Gas Limit: estimated per transaction (at least {BASE_GAS_LIMIT})").cyan()
        )?;

        let answer = self.ask("Do you want to use these gas settings? (y/n):")?;
        if answer.eq_ignore_ascii_case("y") {
            return Ok(None);
        }

        let gas_price_gwei = self.ask_parsed("Enter new gas price (in Gwei):")?;
        let gas_limit = self.ask_parsed("Enter new gas limit:")?;
        let gas = GasOverride {
            gas_price_gwei,
            gas_limit,
        };

        gas.validate()?;
        if gas.gas_limit < BASE_GAS_LIMIT {
            return Err(eyre!(
                "Gas limit {} is below the {BASE_GAS_LIMIT} every transaction costs",
                gas.gas_limit
            ));
        }
        Ok(Some(gas))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompt(answers: &str) -> Prompt<Cursor<String>, Vec<u8>> {
        Prompt::new(Cursor::new(answers.to_string()), Vec::new())
    }

    #[test]
    fn adds_then_selects_a_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = NetworkRegistry::load(dir.path().join("network_info.json")).unwrap();

        let mut prompt = prompt("7\na\n31337\nhttp://localhost:8545\nhttp://localhost:4000\n1\n");
        let network = prompt.select_network(&mut registry).unwrap();

        assert_eq!(network.chain_id, "31337");
        assert_eq!(network.explorer, "http://localhost:4000");
        assert_eq!(registry.list_networks().len(), 1);

        let output = String::from_utf8(prompt.output).unwrap();
        assert!(output.contains("Invalid choice"));
        assert!(output.contains("added successfully"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = NetworkRegistry::load(dir.path().join("network_info.json")).unwrap();
        assert!(prompt("").select_network(&mut registry).is_err());
    }

    #[test]
    fn asks_only_for_missing_workload_values() {
        let run = RunConfig {
            interaction_count: Some(4),
            ..RunConfig::default()
        };

        let mut prompt = prompt("abc\n0.5\n2\n");
        let workload = prompt.workload(&run).unwrap();

        assert_eq!(workload.interaction_count, 4);
        assert_eq!(workload.min_delay, 0.5);
        assert_eq!(workload.max_delay, 2.0);
        assert!(String::from_utf8(prompt.output).unwrap().contains("Invalid value"));
    }

    #[test]
    fn rejects_inverted_delays() {
        let mut prompt = prompt("3\n5\n1\n");
        assert!(prompt.workload(&RunConfig::default()).is_err());
    }

    #[test]
    fn gas_settings_keep_or_override() {
        assert_eq!(prompt("y\n").gas_settings(1_000_000_000).unwrap(), None);

        let gas = prompt("n\n2.5\n150000\n")
            .gas_settings(1_000_000_000)
            .unwrap()
            .unwrap();
        assert_eq!(gas.gas_price_wei(), 2_500_000_000);
        assert_eq!(gas.gas_limit, 150_000);

        assert!(prompt("n\n1\n100\n").gas_settings(1).is_err());
    }

    #[test]
    fn gas_override_rejects_unusable_prices() {
        assert!(prompt("n\n-5\n30000\n").gas_settings(1_000_000_000).is_err());
        assert!(prompt("n\ninf\n30000\n").gas_settings(1_000_000_000).is_err());
        assert!(prompt("n\nNaN\n30000\n").gas_settings(1_000_000_000).is_err());
    }
}
