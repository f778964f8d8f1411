// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Privacy marker on the signature recovery byte.
//!
//! A private transaction is signed like any other, then its `v` byte is moved
//! from the legacy 27/28 range to 37/38 so nodes know the visible `data` is an
//! enclave reference rather than the real payload.

/// Length of the `v`, `r`, `s` tail of an RLP-encoded legacy signed
/// transaction: `v` (1 byte), then `r` and `s` as 32-byte strings with a
/// one-byte length prefix each.
pub const SIGNATURE_SUFFIX_LEN: usize = 67;

/// Legacy `v` for an odd-parity signature.
pub const LEGACY_V_ODD: u8 = 28;

/// Private marker replacing `v = 27`.
pub const PRIVATE_V_EVEN: u8 = 37;

/// Private marker replacing `v = 28`.
pub const PRIVATE_V_ODD: u8 = 38;

/// RLP prefix of a 32-byte string.
const SCALAR_PREFIX: u8 = 0xa0;

/// A signed message whose tail is not `v`, `0xa0 r`, `0xa0 s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureLayoutError {
    #[error("signed message is {0} bytes, shorter than the 67-byte signature tail")]
    TooShort(usize),

    /// `r` or `s` was encoded in fewer than 32 bytes, so `v` is not at
    /// `len - 67`.
    #[error("signature scalars at offset {offset} are not both 32 bytes long")]
    ShortScalar { offset: usize },
}

/// Whether `v` carries the privacy flag.
pub fn is_privacy_marker(v: u8) -> bool {
    matches!(v, PRIVATE_V_EVEN | PRIVATE_V_ODD)
}

/// Rewrite the `v` byte of a signed message to its private counterpart.
///
/// Only the byte at `len - 67` changes. The tail must hold two full 32-byte
/// scalars; an RLP encoder strips leading zeros from `r` and `s`, and a
/// shorter tail would put some other byte at that offset. The message is
/// left untouched on error.
///
/// # Returns
/// * `Ok(u8)` - The marker written (37 or 38)
/// * `Err(SignatureLayoutError)` - If the tail does not have the fixed layout
pub fn set_privacy_marker(message: &mut [u8]) -> Result<u8, SignatureLayoutError> {
    let offset = message
        .len()
        .checked_sub(SIGNATURE_SUFFIX_LEN)
        .ok_or(SignatureLayoutError::TooShort(message.len()))?;

    if message[offset + 1] != SCALAR_PREFIX || message[offset + 34] != SCALAR_PREFIX {
        return Err(SignatureLayoutError::ShortScalar { offset });
    }

    let marker = if message[offset] == LEGACY_V_ODD {
        PRIVATE_V_ODD
    } else {
        PRIVATE_V_EVEN
    };
    message[offset] = marker;
    Ok(marker)
}
