// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction value types.

use alloy::primitives::{Address, Bytes, U256};

/// An unsigned legacy transaction as handed to the signer.
///
/// Values are never mutated in place; the private path derives a copy with
/// [`RawTransaction::with_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// Recipient; `None` deploys a contract
    pub to: Option<Address>,
    pub value: U256,
    /// Call data (already hex-decoded)
    pub data: Bytes,
}

impl RawTransaction {
    /// Create a transaction from its parts.
    pub fn new(
        nonce: u64,
        gas_price: U256,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data: data.into(),
        }
    }

    /// Same transaction with `data` replaced.
    pub fn with_data(&self, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..self.clone()
        }
    }

    /// Whether this transaction creates a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}
