//! Loading the contract to deploy: a compiled JSON artifact or Solidity source run through `solc`.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use alloy::{hex, json_abi::JsonAbi, primitives::Bytes};
use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::error::StoreError;

/// Init code and interface of the contract deployed for every account.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub bytecode: Bytes,
    pub abi: JsonAbi,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum ContractSource {
    /// JSON file with `abi` and `bytecode` keys (Foundry and Hardhat layouts).
    Artifact(PathBuf),
    /// Solidity source compiled with the `solc` found on `PATH`.
    Solidity(SoliditySource),
}

#[derive(Debug, Deserialize, Clone)]
pub struct SoliditySource {
    pub path: PathBuf,
    pub contract: String,
    #[serde(default = "default_solc")]
    pub solc: PathBuf,
}

fn default_solc() -> PathBuf {
    PathBuf::from("solc")
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

impl RawBytecode {
    fn as_str(&self) -> &str {
        match self {
            RawBytecode::Hex(hex) => hex,
            RawBytecode::Object { object } => object,
        }
    }
}

impl ContractSource {
    pub fn load(&self) -> Result<ContractArtifact, StoreError> {
        match self {
            ContractSource::Artifact(path) => load_artifact(path),
            ContractSource::Solidity(source) => compile(source),
        }
    }
}

pub fn load_artifact(path: impl AsRef<Path>) -> Result<ContractArtifact, StoreError> {
    let path = path.as_ref();
    info!("Loading contract artifact from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    parse_artifact(&content).map_err(|reason| StoreError::malformed(path, reason))
}

fn parse_artifact(content: &str) -> Result<ContractArtifact, String> {
    let raw: RawArtifact = serde_json::from_str(content).map_err(|e| e.to_string())?;

    Ok(ContractArtifact {
        bytecode: decode_bytecode(raw.bytecode.as_str())?,
        abi: raw.abi,
    })
}

fn decode_bytecode(code: &str) -> Result<Bytes, String> {
    let bytes = hex::decode(code.trim()).map_err(|e| format!("invalid bytecode: {e}"))?;
    if bytes.is_empty() {
        return Err("empty bytecode, is the contract abstract?".into());
    }
    Ok(bytes.into())
}

/// Compile `source.path` with `solc --combined-json abi,bin` and pick `source.contract`.
pub fn compile(source: &SoliditySource) -> Result<ContractArtifact, StoreError> {
    info!(
        "Compiling {} from {} with {}",
        source.contract,
        source.path.display(),
        source.solc.display()
    );

    let output = Command::new(&source.solc)
        .arg("--combined-json")
        .arg("abi,bin")
        .arg(&source.path)
        .output()
        .map_err(|e| StoreError::io(&source.solc, e))?;

    if !output.status.success() {
        return Err(StoreError::Compilation(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    parse_combined_json(&output.stdout, &source.contract).map_err(StoreError::Compilation)
}

fn parse_combined_json(stdout: &[u8], contract: &str) -> Result<ContractArtifact, String> {
    let output: Value = serde_json::from_slice(stdout).map_err(|e| e.to_string())?;

    let contracts = output
        .get("contracts")
        .and_then(Value::as_object)
        .ok_or("no contracts in solc output")?;

    // Keys look like `path/to/File.sol:Name`.
    let (_, data) = contracts
        .iter()
        .find(|(full_name, _)| full_name.rsplit(':').next() == Some(contract))
        .ok_or_else(|| format!("contract {contract} not found in solc output"))?;

    // Older solc releases emit the ABI as a JSON string, newer ones as an array.
    let abi: JsonAbi = match data.get("abi").ok_or("no abi in solc output")? {
        Value::String(abi) => serde_json::from_str(abi),
        abi => serde_json::from_value(abi.clone()),
    }
    .map_err(|e| format!("invalid abi: {e}"))?;

    let bin = data
        .get("bin")
        .and_then(Value::as_str)
        .ok_or("no bin in solc output")?;

    Ok(ContractArtifact {
        bytecode: decode_bytecode(bin)?,
        abi,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ABI: &str = r#"[
        {"type":"function","name":"setValue","stateMutability":"nonpayable",
         "inputs":[{"name":"_value","type":"uint256"}],"outputs":[]},
        {"type":"function","name":"getValue","stateMutability":"view",
         "inputs":[],"outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"donate","stateMutability":"payable","inputs":[],"outputs":[]}
    ]"#;

    pub(crate) fn sample() -> ContractArtifact {
        parse_artifact(&format!(r#"{{"abi": {ABI}, "bytecode": "0x6080604052"}}"#)).unwrap()
    }

    #[test]
    fn parses_hardhat_layout() {
        let artifact = sample();
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(artifact.abi.function("setValue").is_some());
    }

    #[test]
    fn parses_foundry_layout() {
        let content = format!(r#"{{"abi": {ABI}, "bytecode": {{"object": "6080604052"}}}}"#);
        let artifact = parse_artifact(&content).unwrap();
        assert_eq!(artifact.bytecode.len(), 5);
        assert!(artifact.abi.function("donate").is_some());
    }

    #[test]
    fn rejects_empty_bytecode() {
        let content = format!(r#"{{"abi": {ABI}, "bytecode": "0x"}}"#);
        assert!(parse_artifact(&content).is_err());
    }

    #[test]
    fn loads_from_file_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Interaction.json");
        std::fs::write(&path, format!(r#"{{"abi": {ABI}, "bytecode": "0x6080"}}"#)).unwrap();

        let artifact = ContractSource::Artifact(path).load().unwrap();
        assert_eq!(artifact.bytecode.len(), 2);

        let missing = load_artifact(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(StoreError::Io { .. })));
    }

    #[test]
    fn picks_named_contract_from_combined_json() {
        let abi_string = serde_json::to_string(ABI).unwrap();
        let stdout = format!(
            r#"{{"contracts": {{
                "src/Other.sol:Other": {{"abi": [], "bin": "6001"}},
                "src/Interaction.sol:AdvancedInteraction": {{"abi": {abi_string}, "bin": "608060405234"}}
            }}, "version": "0.8.0"}}"#
        );

        let artifact = parse_combined_json(stdout.as_bytes(), "AdvancedInteraction").unwrap();
        assert_eq!(artifact.bytecode.len(), 6);
        assert!(artifact.abi.function("getValue").is_some());

        assert!(parse_combined_json(stdout.as_bytes(), "Missing").is_err());
    }
}
