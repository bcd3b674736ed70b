//! Funded accounts that sign the transactions of a run.

use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    primitives::{Address, Bytes, TxKind, B256},
    signers::{local::PrivateKeySigner, SignerSync},
};

use crate::error::{ChainError, StoreError};

/// A signing credential and the address derived from it.
#[derive(Debug, Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

/// A transaction ready to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: B256,
    pub from: Address,
    pub nonce: u64,
    pub to: TxKind,
    pub raw: Bytes,
}

impl Account {
    /// Parse a hex encoded private key, with or without the `0x` prefix.
    pub fn from_private_key(key: &str) -> Result<Self, StoreError> {
        let signer = key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| StoreError::InvalidKey(e.to_string()))?;

        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a legacy transaction and encode it for `eth_sendRawTransaction`.
    pub fn sign(&self, tx: TxLegacy) -> Result<SignedTransaction, ChainError> {
        let (nonce, to) = (tx.nonce, tx.to);
        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let envelope = TxEnvelope::from(signed);

        Ok(SignedTransaction {
            hash,
            from: self.address(),
            nonce,
            to,
            raw: envelope.encoded_2718().into(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloy::primitives::{address, U256};

    use super::*;

    /// First well known development key (anvil / hardhat).
    pub(crate) const DEV_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    pub(crate) const DEV_KEY_2: &str =
        "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn derives_address_from_key() {
        let account = Account::from_private_key(DEV_KEY).unwrap();
        assert_eq!(
            account.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );

        let account = Account::from_private_key(DEV_KEY_2).unwrap();
        assert_eq!(
            account.address(),
            address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")
        );
    }

    #[test]
    fn rejects_garbage_key() {
        let result = Account::from_private_key("not a key");
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn signed_transaction_keeps_nonce_and_differs_per_nonce() {
        let account = Account::from_private_key(DEV_KEY).unwrap();
        let tx = |nonce| TxLegacy {
            chain_id: Some(31337),
            nonce,
            gas_price: 1_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::ZERO),
            value: U256::from(1),
            input: Bytes::new(),
        };

        let first = account.sign(tx(0)).unwrap();
        let second = account.sign(tx(1)).unwrap();

        assert_eq!(first.from, account.address());
        assert_eq!(first.nonce, 0);
        assert_eq!(second.nonce, 1);
        assert_ne!(first.hash, second.hash);
        assert!(!first.raw.is_empty());
    }
}
