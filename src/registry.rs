//! Known networks, persisted as a JSON object keyed by chain id.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use url::Url;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub rpc: Url,
    pub explorer: String,
}

/// The network a run is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: String,
    pub rpc: Url,
    pub explorer: String,
}

#[derive(Debug)]
pub struct NetworkRegistry {
    path: PathBuf,
    networks: Vec<(String, NetworkEntry)>,
}

impl NetworkRegistry {
    /// Read the registry at `path`. A missing file is an empty registry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let networks = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let map: Map<String, serde_json::Value> = serde_json::from_str(&content)
                    .map_err(|e| StoreError::malformed(&path, e))?;

                map.into_iter()
                    .map(|(chain_id, entry)| {
                        serde_json::from_value(entry)
                            .map(|entry| (chain_id, entry))
                            .map_err(|e| StoreError::malformed(&path, e))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        Ok(Self { path, networks })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Networks in the order they were added.
    pub fn list_networks(&self) -> &[(String, NetworkEntry)] {
        &self.networks
    }

    /// Add or replace the network for `chain_id` and persist the registry.
    pub fn add_network(
        &mut self,
        chain_id: impl Into<String>,
        rpc: Url,
        explorer: impl Into<String>,
    ) -> Result<(), StoreError> {
        let chain_id = chain_id.into();
        let entry = NetworkEntry {
            rpc,
            explorer: explorer.into(),
        };

        match self.networks.iter_mut().find(|(id, _)| *id == chain_id) {
            Some((_, existing)) => *existing = entry,
            None => self.networks.push((chain_id.clone(), entry)),
        }

        self.save()?;
        info!("Network with chain id {chain_id} saved to {}", self.path.display());
        Ok(())
    }

    pub fn select(&self, chain_id: &str) -> Result<NetworkConfig, StoreError> {
        self.networks
            .iter()
            .find(|(id, _)| id == chain_id)
            .map(|(id, entry)| network_config(id, entry))
            .ok_or_else(|| StoreError::UnknownNetwork(chain_id.to_string()))
    }

    /// Select by 1-based position in [`Self::list_networks`].
    pub fn select_index(&self, position: usize) -> Option<NetworkConfig> {
        position
            .checked_sub(1)
            .and_then(|i| self.networks.get(i))
            .map(|(id, entry)| network_config(id, entry))
    }

    fn save(&self) -> Result<(), StoreError> {
        let map: Map<String, serde_json::Value> = self
            .networks
            .iter()
            .map(|(id, entry)| {
                serde_json::to_value(entry)
                    .map(|value| (id.clone(), value))
                    .map_err(|e| StoreError::malformed(&self.path, e))
            })
            .collect::<Result<_, _>>()?;

        let content =
            serde_json::to_string_pretty(&map).map_err(|e| StoreError::malformed(&self.path, e))?;
        std::fs::write(&self.path, content).map_err(|e| StoreError::io(&self.path, e))
    }
}

fn network_config(chain_id: &str, entry: &NetworkEntry) -> NetworkConfig {
    NetworkConfig {
        chain_id: chain_id.to_string(),
        rpc: entry.rpc.clone(),
        explorer: entry.explorer.clone(),
    }
}
