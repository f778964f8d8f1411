// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account nonce lookup.

use std::future::Future;

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

/// HTTP provider type (with the default fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Errors from nonce lookups.
#[derive(Debug, thiserror::Error)]
pub enum NonceError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    RpcError(String),
}

/// Source of the next nonce for an account.
pub trait NonceSource: Send + Sync {
    /// Number of transactions sent from `account`, including pending ones.
    ///
    /// # Arguments
    /// * `account` - Address whose next nonce is wanted
    ///
    /// # Returns
    /// * `Ok(u64)` - The nonce to use for the account's next transaction
    /// * `Err(NonceError)` - If the lookup fails
    fn transaction_count(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<u64, NonceError>> + Send;
}

/// Reads nonces from a node over JSON-RPC (`eth_getTransactionCount` at the
/// `pending` block tag).
pub struct RpcNonceSource {
    provider: HttpProvider,
}

impl RpcNonceSource {
    /// Create a nonce source for the node at `rpc_url`.
    ///
    /// No request is made until the first lookup.
    ///
    /// # Arguments
    /// * `rpc_url` - HTTP(S) JSON-RPC endpoint, e.g. `http://localhost:8545`
    ///
    /// # Returns
    /// * `Ok(RpcNonceSource)` - A source bound to that node
    /// * `Err(NonceError::InvalidRpcUrl)` - If the URL does not parse
    pub fn new(rpc_url: &str) -> Result<Self, NonceError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| NonceError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { provider })
    }
}

impl NonceSource for RpcNonceSource {
    async fn transaction_count(&self, account: Address) -> Result<u64, NonceError> {
        self.provider
            .get_transaction_count(account)
            .pending()
            .await
            .map_err(|e| NonceError::RpcError(e.to_string()))
    }
}
