use alloy::{
    consensus::TxLegacy,
    primitives::{Address, Bytes, TxKind, U256},
};
use log::debug;

use crate::{
    account::Account,
    config::GasOverride,
    connector::{CallSkeleton, ChainConnector, Receipt},
    error::ChainError,
};

pub mod deploy;
pub mod interact;
pub mod shoot;

/// A transaction that went through the estimate → sign → submit → confirm pipeline.
#[derive(Debug)]
pub struct Attempt {
    /// Set once the nonce was fetched, even if a later step failed.
    pub nonce: Option<u64>,
    pub result: Result<Receipt, ChainError>,
}

/// Send one transaction from `account`, blocking until it is mined or fails.
///
/// Gas limit, gas price and nonce are looked up for this attempt only, unless
/// `gas` overrides the first two. `to == None` deploys `input` as init code.
pub async fn send_transaction<C: ChainConnector>(
    connector: &C,
    account: &Account,
    chain_id: u64,
    to: Option<Address>,
    input: Bytes,
    value: U256,
    gas: Option<GasOverride>,
) -> Attempt {
    let mut nonce = None;
    let call = CallSkeleton {
        from: account.address(),
        to,
        input,
        value,
    };

    let result = attempt(connector, account, chain_id, call, gas, &mut nonce).await;

    Attempt { nonce, result }
}

async fn attempt<C: ChainConnector>(
    connector: &C,
    account: &Account,
    chain_id: u64,
    call: CallSkeleton,
    gas: Option<GasOverride>,
    nonce_slot: &mut Option<u64>,
) -> Result<Receipt, ChainError> {
    let gas_limit = match gas {
        Some(gas) => gas.gas_limit,
        None => connector.estimate_gas(&call).await?,
    };

    let gas_price = match gas {
        Some(gas) => gas.gas_price_wei(),
        None => connector.current_gas_price().await?,
    };

    let nonce = connector.nonce_for(call.from).await?;
    *nonce_slot = Some(nonce);

    let tx = TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to: call.to.map_or(TxKind::Create, TxKind::Call),
        value: call.value,
        input: call.input,
    };

    debug!(
        "Sending transaction from {} with nonce={nonce}, gas_limit={gas_limit}, gas_price={gas_price}",
        call.from
    );

    let signed = account.sign(tx)?;
    let hash = connector.submit(&signed).await?;
    connector.await_confirmation(hash).await
}
