// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `X-Line-Signature` verification.
//!
//! The header is the base64 HMAC-SHA256 of the raw request body keyed by the
//! channel secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use concierge_core::ConciergeError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Signs `body` the way LINE does.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Checks `signature` against `body` in constant time.
pub fn verify(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), ConciergeError> {
    let invalid = || ConciergeError::Signature {
        platform: "line".to_string(),
    };

    let decoded = signature
        .map(str::trim)
        .and_then(|s| STANDARD.decode(s).ok())
        .ok_or_else(invalid)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).map_err(|_| invalid())?;
    mac.update(body);
    mac.verify_slice(&decoded).map_err(|_| invalid())
}
