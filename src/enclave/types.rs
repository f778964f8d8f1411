// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enclave endpoint paths and payload types.

use serde::{Deserialize, Serialize};

/// Liveness endpoint; answers [`UPCHECK_BODY`] when healthy.
pub const UPCHECK_PATH: &str = "upcheck";

/// Body returned by a healthy enclave on [`UPCHECK_PATH`].
pub const UPCHECK_BODY: &str = "I'm up!";

/// Stores a base64 payload and returns its reference key.
pub const STORE_RAW_PATH: &str = "storeraw";

/// Accepts a signed, hex-encoded transaction for distribution and submission.
pub const SEND_RAW_PATH: &str = "sendraw";

/// Decoded length of an enclave reference key (a SHA3-512 digest).
pub const ENCLAVE_KEY_LEN: usize = 64;

/// Length of a transaction hash acknowledged by `sendraw`.
pub const TX_HASH_LEN: usize = 32;

/// Response of the `storeraw` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRawResponse {
    /// Base64 reference to the stored payload.
    pub key: String,
}

/// Acknowledgement of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRawResponse {
    /// Transaction hash reported by the node behind the enclave.
    pub transaction_hash: String,
}
