// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use enclave_bridge::blockchain::{LocalTransactionSigner, TransactionSigner};
use enclave_bridge::config::BridgeConfig;
use enclave_bridge::enclave::{Enclave, UnixSocketChannel};
use enclave_bridge::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = BridgeConfig::from_env();
    logging::init(config.log_format);

    tracing::info!(
        ipc_path = %config.ipc_path.display(),
        rpc_url = %config.rpc_url,
        recipients = config.private_for.len(),
        "Starting enclave bridge"
    );

    if let Some(path) = &config.signer_key_pem {
        match std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|pem| LocalTransactionSigner::from_pem(&pem).map_err(|e| e.to_string()))
        {
            Ok(signer) => tracing::info!(address = %signer.address(), "Loaded signing key"),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load signing key");
                return ExitCode::FAILURE;
            }
        }
    }

    let enclave = Enclave::over(UnixSocketChannel::new(&config.ipc_path));
    match enclave.up_check().await {
        Ok(true) => {
            tracing::info!("Enclave is up");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            tracing::error!("Enclave answered the up-check but is not ready");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Enclave up-check failed");
            ExitCode::FAILURE
        }
    }
}
