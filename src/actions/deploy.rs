use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, U256},
};
use log::{debug, info};

use crate::{
    account::Account,
    artifact::ContractArtifact,
    config::GasOverride,
    connector::ChainConnector,
    error::DeploymentError,
    report,
};

use super::send_transaction;

/// A contract deployed for one account, owned by that account's interaction loop.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub address: Address,
    pub abi: JsonAbi,
}

/// Deploy `artifact` from `account` and wait for the contract address.
pub async fn deploy<C: ChainConnector>(
    connector: &C,
    account: &Account,
    chain_id: u64,
    artifact: &ContractArtifact,
    explorer: &str,
    gas: Option<GasOverride>,
) -> Result<DeployedContract, DeploymentError> {
    info!(
        "Deploying contract from {} ({} bytes of init code)",
        account.address(),
        artifact.bytecode.len()
    );

    let attempt = send_transaction(
        connector,
        account,
        chain_id,
        None,
        artifact.bytecode.clone(),
        U256::ZERO,
        gas,
    )
    .await;

    let receipt = attempt.result?;
    debug!(
        "Deployment transaction {} accepted with nonce={:?}",
        receipt.transaction_hash, attempt.nonce
    );

    let address = receipt
        .contract_address
        .ok_or(DeploymentError::MissingContractAddress(receipt.transaction_hash))?;

    info!("Contract deployed at address {address}");
    report::print_deployed(address, explorer);

    Ok(DeployedContract {
        address,
        abi: artifact.abi.clone(),
    })
}
