// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Private transaction manager.
//!
//! Each send is one linear pass:
//!
//! 1. Build the transaction (nonce fetched once).
//! 2. If `private_for` is non-empty: store the payload in the enclave, swap
//!    `data` for the returned key, sign, and set the privacy marker.
//!    Otherwise sign the transaction as-is.
//! 3. Submit the signed bytes through the enclave.
//!
//! Any failure aborts the pass. Nothing is retried and nothing is kept
//! between sends.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use base64ct::{Base64, Encoding};
use tokio_util::sync::CancellationToken;

use super::nonce::{NonceError, NonceSource};
use super::privacy::{set_privacy_marker, SignatureLayoutError};
use super::signing::{SigningError, TransactionSigner};
use super::types::RawTransaction;
use crate::enclave::{Enclave, EnclaveChannel, EnclaveError, SendRawResponse, ENCLAVE_KEY_LEN};

/// Errors that abort a send.
#[derive(Debug, thiserror::Error)]
pub enum PrivateTxError {
    #[error("Enclave error: {0}")]
    Enclave(#[from] EnclaveError),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("Nonce lookup failed: {0}")]
    Nonce(#[from] NonceError),

    #[error("Invalid enclave key: {0}")]
    InvalidStoreKey(String),

    #[error(transparent)]
    SignatureLayout(#[from] SignatureLayoutError),

    #[error("Send cancelled before submission")]
    Cancelled,
}

/// Signs and submits transactions, routing private ones through the enclave.
pub struct PrivateTransactionManager<C, S, N> {
    enclave: Arc<Enclave<C>>,
    signer: S,
    nonces: N,
    /// Sender's enclave public key
    public_key: String,
    /// Recipient enclave keys; empty means public
    private_for: Vec<String>,
}

impl<C, S, N> PrivateTransactionManager<C, S, N>
where
    C: EnclaveChannel,
    S: TransactionSigner,
    N: NonceSource,
{
    /// Create a manager sending public transactions until recipients are set.
    pub fn new(enclave: Arc<Enclave<C>>, signer: S, nonces: N, public_key: impl Into<String>) -> Self {
        Self {
            enclave,
            signer,
            nonces,
            public_key: public_key.into(),
            private_for: Vec::new(),
        }
    }

    /// Builder-style recipient list.
    pub fn with_private_for(mut self, private_for: Vec<String>) -> Self {
        self.private_for = private_for;
        self
    }

    pub fn private_for(&self) -> &[String] {
        &self.private_for
    }

    pub fn set_private_for(&mut self, private_for: Vec<String>) {
        self.private_for = private_for;
    }

    /// Address transactions are sent from.
    pub fn from_address(&self) -> Address {
        self.signer.address()
    }

    /// Build a transaction at the account's next nonce and send it.
    pub async fn send_transaction(
        &self,
        gas_price: U256,
        gas_limit: u64,
        to: Option<Address>,
        data: Bytes,
        value: U256,
    ) -> Result<SendRawResponse, PrivateTxError> {
        let nonce = self.nonces.transaction_count(self.from_address()).await?;
        let raw = RawTransaction::new(nonce, gas_price, gas_limit, to, value, data);
        self.sign_and_send(&raw).await
    }

    /// Sign `raw` (storing its payload first if private) and submit it.
    pub async fn sign_and_send(&self, raw: &RawTransaction) -> Result<SendRawResponse, PrivateTxError> {
        self.sign_and_send_cancellable(raw, &CancellationToken::new())
            .await
    }

    /// Like [`sign_and_send`](Self::sign_and_send), checking `cancel` between
    /// steps.
    ///
    /// Cancellation is only observed between enclave round-trips: dropping a
    /// request mid-flight would leave its response unread on the channel. A
    /// send cancelled before submission returns [`PrivateTxError::Cancelled`]
    /// and nothing reaches `sendraw`.
    pub async fn sign_and_send_cancellable(
        &self,
        raw: &RawTransaction,
        cancel: &CancellationToken,
    ) -> Result<SendRawResponse, PrivateTxError> {
        ensure_not_cancelled(cancel)?;

        let signed = if self.private_for.is_empty() {
            self.signer.sign(raw)?
        } else {
            let private_tx = self.store_payload(raw).await?;
            ensure_not_cancelled(cancel)?;

            let mut signed = self.signer.sign(&private_tx)?;
            let marker = set_privacy_marker(&mut signed)?;
            tracing::debug!(marker, "Marked signature as private");
            signed
        };

        ensure_not_cancelled(cancel)?;
        let signed_hex = alloy::hex::encode_prefixed(&signed);
        let response = self
            .enclave
            .send_raw(&signed_hex, &self.public_key, &self.private_for)
            .await?;
        Ok(response)
    }

    /// Store `raw.data` in the enclave and return a copy of `raw` whose data
    /// is the enclave key.
    async fn store_payload(&self, raw: &RawTransaction) -> Result<RawTransaction, PrivateTxError> {
        let payload = Base64::encode_string(&raw.data);
        let stored = self
            .enclave
            .store_raw(&payload, &self.public_key, &self.private_for)
            .await?;
        let key = decode_enclave_key(&stored.key)?;
        Ok(raw.with_data(key))
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), PrivateTxError> {
    if cancel.is_cancelled() {
        tracing::warn!("Private transaction send cancelled");
        return Err(PrivateTxError::Cancelled);
    }
    Ok(())
}

/// Decode a base64 enclave key, requiring the full digest length.
fn decode_enclave_key(key: &str) -> Result<Vec<u8>, PrivateTxError> {
    let bytes = Base64::decode_vec(key.trim())
        .map_err(|e| PrivateTxError::InvalidStoreKey(format!("not base64: {e}")))?;
    if bytes.len() != ENCLAVE_KEY_LEN {
        return Err(PrivateTxError::InvalidStoreKey(format!(
            "expected {ENCLAVE_KEY_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
