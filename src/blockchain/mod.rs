// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM transaction integration.
//!
//! This module provides functionality for:
//! - Building and signing legacy transactions
//! - Looking up account nonces
//! - Marking signatures of private transactions
//! - Storing private payloads in the enclave and submitting transactions

pub mod manager;
pub mod nonce;
pub mod privacy;
pub mod signing;
pub mod types;

pub use manager::{PrivateTransactionManager, PrivateTxError};
pub use nonce::{NonceError, NonceSource, RpcNonceSource};
pub use privacy::{is_privacy_marker, set_privacy_marker, SignatureLayoutError};
pub use signing::{LocalTransactionSigner, SigningError, TransactionSigner};
pub use types::RawTransaction;
