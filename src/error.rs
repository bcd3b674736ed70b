use std::time::Duration;

use alloy::primitives::B256;

/// Failures reported while talking to the chain or preparing a transaction for it.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The node could not be reached at all.
    #[error("cannot reach the network: {0}")]
    Connectivity(String),
    /// The node refused to estimate the call, usually because it would revert.
    #[error("gas estimation failed: {0}")]
    Estimation(String),
    /// The node rejected the signed transaction (bad nonce, underpriced, malformed...).
    #[error("transaction rejected: {0}")]
    Submission(String),
    /// The transaction was not mined before the confirmation deadline.
    #[error("timed out after {waited:?} waiting for transaction {hash}")]
    ConfirmationTimeout { hash: B256, waited: Duration },
    /// The transaction was mined with a failed status.
    #[error("transaction {0} reverted")]
    Reverted(B256),
    /// The call could not be encoded against the contract interface.
    #[error("invalid call: {0}")]
    InvalidCall(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A deployment failure. Fatal to the account that attempted it, not to the run.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("deployment failed: {0}")]
    Chain(#[from] ChainError),
    #[error("receipt of deployment {0} carries no contract address")]
    MissingContractAddress(B256),
}

/// Failures of the file-backed collaborators (registry, key store, artifacts).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed content in {path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("unknown network {0}")]
    UnknownNetwork(String),
    #[error("contract compilation failed: {0}")]
    Compilation(String),
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        StoreError::Malformed {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}
