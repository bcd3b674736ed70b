//! Thin abstraction over a single JSON-RPC endpoint.
//!
//! Every method maps to one network round trip, except
//! [`ChainConnector::await_confirmation`] which polls until the transaction
//! is mined. Nothing is retried here: callers own the retry policy.

use std::time::{Duration, Instant};

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, B256, U256},
    providers::{Provider, RootProvider},
    rpc::types::TransactionRequest,
};
use log::debug;
use url::Url;

use crate::{account::SignedTransaction, error::ChainError};

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The fields of a call that matter for gas estimation.
///
/// `to == None` describes a contract creation whose `input` is the init code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSkeleton {
    pub from: Address,
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
}

/// What we keep from a mined transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
}

pub trait ChainConnector {
    async fn is_reachable(&self) -> bool;

    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Gas price in wei.
    async fn current_gas_price(&self) -> Result<u128, ChainError>;

    async fn estimate_gas(&self, call: &CallSkeleton) -> Result<u64, ChainError>;

    /// Number of transactions sent by `address`, pending ones included.
    async fn nonce_for(&self, address: Address) -> Result<u64, ChainError>;

    async fn submit(&self, tx: &SignedTransaction) -> Result<B256, ChainError>;

    /// Block until `hash` is mined or the connector's deadline elapses.
    async fn await_confirmation(&self, hash: B256) -> Result<Receipt, ChainError>;
}

/// [`ChainConnector`] backed by an alloy HTTP provider.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    provider: RootProvider,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl RpcConnector {
    pub fn new(rpc: Url) -> Self {
        Self {
            provider: RootProvider::new_http(rpc),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl ChainConnector for RpcConnector {
    async fn is_reachable(&self) -> bool {
        self.provider.get_chain_id().await.is_ok()
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainError::Connectivity(e.to_string()))
    }

    async fn current_gas_price(&self) -> Result<u128, ChainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ChainError::Connectivity(e.to_string()))
    }

    async fn estimate_gas(&self, call: &CallSkeleton) -> Result<u64, ChainError> {
        let mut request = TransactionRequest::default()
            .with_from(call.from)
            .with_value(call.value);

        request = match call.to {
            Some(to) => request.with_to(to).with_input(call.input.clone()),
            None => request.with_deploy_code(call.input.clone()),
        };

        self.provider
            .estimate_gas(request)
            .await
            .map_err(|e| ChainError::Estimation(e.to_string()))
    }

    async fn nonce_for(&self, address: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| ChainError::Connectivity(e.to_string()))
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<B256, ChainError> {
        let pending = self
            .provider
            .send_raw_transaction(&tx.raw)
            .await
            .map_err(|e| ChainError::Submission(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn await_confirmation(&self, hash: B256) -> Result<Receipt, ChainError> {
        let start = Instant::now();

        loop {
            let waited = start.elapsed();
            if waited >= self.confirmation_timeout {
                return Err(ChainError::ConfirmationTimeout { hash, waited });
            }

            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    if !receipt.status() {
                        return Err(ChainError::Reverted(hash));
                    }

                    return Ok(Receipt {
                        transaction_hash: receipt.transaction_hash,
                        contract_address: receipt.contract_address,
                        block_number: receipt.block_number,
                    });
                }
                Ok(None) => {
                    debug!("Waiting for transaction {hash} to be mined");
                }
                // The node may briefly fail to serve a receipt it does not index yet.
                Err(err) => {
                    debug!("Receipt lookup for {hash} failed, polling again: {err}");
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
