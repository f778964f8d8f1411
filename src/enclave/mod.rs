// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Privacy enclave IPC integration.
//!
//! This module provides:
//! - HTTP/1.1 request frames written straight to an IPC channel
//! - Chunked response parsing
//! - A pluggable channel capability with a Unix socket implementation
//! - The IPC client and the enclave's up-check / store / send endpoints

pub mod channel;
pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod service;
pub mod types;

pub use channel::{EnclaveChannel, UnixSocketChannel};
pub use client::EnclaveIpcClient;
pub use error::{EnclaveError, EnclaveResult, SerdeDirection};
pub use service::Enclave;
pub use types::*;
