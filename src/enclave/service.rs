// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path-addressed enclave operations built on the IPC client.

use super::channel::EnclaveChannel;
use super::client::EnclaveIpcClient;
use super::error::{EnclaveError, EnclaveResult};
use super::types::*;

/// The enclave's REST surface: up-check, payload storage and raw submission.
pub struct Enclave<C> {
    client: EnclaveIpcClient<C>,
}

impl<C: EnclaveChannel> Enclave<C> {
    /// Wrap an IPC client.
    pub fn new(client: EnclaveIpcClient<C>) -> Self {
        Self { client }
    }

    /// Shortcut for `Enclave::new(EnclaveIpcClient::new(channel))`.
    pub fn over(channel: C) -> Self {
        Self::new(EnclaveIpcClient::new(channel))
    }

    /// Underlying IPC client.
    pub fn client(&self) -> &EnclaveIpcClient<C> {
        &self.client
    }

    /// Whether the enclave reports itself healthy.
    pub async fn up_check(&self) -> EnclaveResult<bool> {
        let body = self.client.get(UPCHECK_PATH).await?;
        Ok(body.trim() == UPCHECK_BODY)
    }

    /// Store a base64 `payload` from `from` for recipients `to`.
    ///
    /// Every call stores again; the enclave decides whether identical
    /// payloads share a key.
    pub async fn store_raw(
        &self,
        payload: &str,
        from: &str,
        to: &[String],
    ) -> EnclaveResult<StoreRawResponse> {
        let body = self
            .client
            .send_raw_json(payload, STORE_RAW_PATH, from, to)
            .await?;
        let response: StoreRawResponse =
            serde_json::from_str(&body).map_err(EnclaveError::decode)?;
        tracing::info!(recipients = to.len(), key = %response.key, "Stored private payload");
        Ok(response)
    }

    /// Submit a hex-encoded signed transaction, distributing it to `to`.
    ///
    /// The status line is not inspected, so the body itself must look like a
    /// transaction hash (`0x` and 64 hex digits). Anything else, such as an
    /// error page, is a [`EnclaveError::MalformedResponse`].
    pub async fn send_raw(
        &self,
        signed_hex: &str,
        from: &str,
        to: &[String],
    ) -> EnclaveResult<SendRawResponse> {
        let body = self
            .client
            .send_raw_json(signed_hex, SEND_RAW_PATH, from, to)
            .await?;
        let transaction_hash = body.trim().to_string();
        if !is_transaction_hash(&transaction_hash) {
            return Err(EnclaveError::malformed(format!(
                "send-raw acknowledgement is not a transaction hash: {transaction_hash:?}"
            )));
        }
        tracing::info!(tx_hash = %transaction_hash, private = !to.is_empty(), "Submitted transaction");
        Ok(SendRawResponse { transaction_hash })
    }
}

/// `0x` followed by the hex of a 32-byte hash.
fn is_transaction_hash(ack: &str) -> bool {
    ack.strip_prefix("0x")
        .filter(|digits| digits.len() == 2 * TX_HASH_LEN)
        .and_then(|digits| alloy::hex::decode(digits).ok())
        .is_some()
}
