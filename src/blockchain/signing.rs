// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing.
//!
//! Transactions are signed as legacy (pre-EIP-155) transactions so the
//! recovery byte stays in the 27/28 range the privacy marker expects.

use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    primitives::{Address, TxKind},
    signers::{local::PrivateKeySigner, SignerSync},
};
use k256::SecretKey;

use super::types::RawTransaction;

/// Errors raised while loading keys or signing.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Something that can sign transactions for one account.
pub trait TransactionSigner: Send + Sync {
    /// Sign `tx` and return the RLP-encoded signed transaction.
    ///
    /// # Arguments
    /// * `tx` - The unsigned transaction, already carrying its final `data`
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - Signed transaction bytes, ending in `v`, `r`, `s`
    /// * `Err(SigningError)` - If the transaction cannot be encoded or signed
    fn sign(&self, tx: &RawTransaction) -> Result<Vec<u8>, SigningError>;

    /// Address of the signing account.
    fn address(&self) -> Address;
}

/// Signs with a secp256k1 key held in memory.
///
/// Output is a legacy transaction without a chain id, so `v` is 27 or 28.
/// `r` and `s` are RLP-encoded minimally: when either has a leading zero
/// byte the signature tail is shorter than 67 bytes, which
/// [`set_privacy_marker`](super::privacy::set_privacy_marker) refuses.
#[derive(Debug, Clone)]
pub struct LocalTransactionSigner {
    signer: PrivateKeySigner,
}

impl LocalTransactionSigner {
    /// Wrap an existing alloy signer.
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Create a signer from a hex private key.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex-encoded 32-byte key, with or without `0x`
    ///
    /// # Returns
    /// * `Ok(LocalTransactionSigner)` - A signer for the key's account
    /// * `Err(SigningError::InvalidPrivateKey)` - If the hex or the scalar is invalid
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SigningError> {
        let hex = private_key_hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let key_bytes = alloy::hex::decode(hex)
            .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map(Self::new)
            .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))
    }

    /// Create a signer from a PEM private key.
    ///
    /// SEC1 (`EC PRIVATE KEY`) is tried first, then PKCS#8 (`PRIVATE KEY`).
    ///
    /// # Arguments
    /// * `pem_bytes` - The PEM-encoded private key bytes
    ///
    /// # Returns
    /// * `Ok(LocalTransactionSigner)` - A signer for the key's account
    /// * `Err(SigningError::InvalidPrivateKey)` - If PEM or key parsing fails
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, SigningError> {
        let secret_key = secret_key_from_pem(pem_bytes)?;
        Self::from_hex(&alloy::hex::encode(secret_key.to_bytes()))
    }
}

impl TransactionSigner for LocalTransactionSigner {
    fn sign(&self, tx: &RawTransaction) -> Result<Vec<u8>, SigningError> {
        let gas_price = u128::try_from(tx.gas_price)
            .map_err(|_| SigningError::InvalidTransaction("gas price exceeds 128 bits".to_string()))?;

        let legacy = TxLegacy {
            chain_id: None,
            nonce: tx.nonce,
            gas_price,
            gas_limit: tx.gas_limit,
            to: tx.to.map_or(TxKind::Create, TxKind::Call),
            value: tx.value,
            input: tx.data.clone(),
        };

        let signature = self
            .signer
            .sign_hash_sync(&legacy.signature_hash())
            .map_err(|e| SigningError::Signing(e.to_string()))?;

        Ok(TxEnvelope::Legacy(legacy.into_signed(signature)).encoded_2718())
    }

    fn address(&self) -> Address {
        self.signer.address()
    }
}

/// Parse a PEM private key, trying SEC1 first and then PKCS#8.
fn secret_key_from_pem(pem_bytes: &[u8]) -> Result<SecretKey, SigningError> {
    use k256::pkcs8::DecodePrivateKey;

    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| SigningError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;
    let pem = pem::parse(pem_str)
        .map_err(|e| SigningError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| SecretKey::from_pkcs8_der(pem.contents()))
        .map_err(|e| SigningError::InvalidPrivateKey(format!("Invalid key format: {}", e)))
}
