// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enclave IPC errors.

use std::fmt;

/// Which side of a JSON round-trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerdeDirection {
    /// Request value could not be serialized.
    Encode,
    /// Response body could not be deserialized.
    Decode,
}

impl fmt::Display for SerdeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerdeDirection::Encode => write!(f, "encode"),
            SerdeDirection::Decode => write!(f, "decode"),
        }
    }
}

/// Errors that can occur while talking to the enclave.
///
/// None of these are retried; each one aborts the call that produced it.
#[derive(Debug, thiserror::Error)]
pub enum EnclaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path or header value that would break the request framing.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error ({direction}): {source}")]
    Serialization {
        direction: SerdeDirection,
        #[source]
        source: serde_json::Error,
    },
}

impl EnclaveError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        EnclaveError::MalformedResponse(message.into())
    }

    pub(crate) fn encode(source: serde_json::Error) -> Self {
        EnclaveError::Serialization {
            direction: SerdeDirection::Encode,
            source,
        }
    }

    pub(crate) fn decode(source: serde_json::Error) -> Self {
        EnclaveError::Serialization {
            direction: SerdeDirection::Decode,
            source,
        }
    }
}

/// Result alias for enclave operations.
pub type EnclaveResult<T> = Result<T, EnclaveError>;
