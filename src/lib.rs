// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enclave Bridge - Private Transaction Client
//!
//! This crate connects an EVM node to a privacy enclave that keeps
//! transaction payloads off-chain. Private payloads are stored in the enclave
//! over IPC, the transaction is signed against the returned reference key, and
//! the signature is marked so other participants know the payload is private.
//!
//! ## Modules
//!
//! - `enclave` - HTTP-over-IPC client for the enclave
//! - `blockchain` - Transaction signing and the private transaction manager
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod blockchain;
pub mod config;
pub mod enclave;
pub mod logging;
