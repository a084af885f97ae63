// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `X-Hub-Signature-256` verification.
//!
//! The header is `sha256=` followed by the hex HMAC-SHA256 of the raw body
//! keyed by the app secret.

use concierge_core::ConciergeError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Signs `body` the way Meta does, including the `sha256=` prefix.
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Checks `header` against `body` in constant time.
pub fn verify(app_secret: &str, body: &[u8], header: Option<&str>) -> Result<(), ConciergeError> {
    let invalid = || ConciergeError::Signature {
        platform: "messenger".to_string(),
    };

    let digest = header
        .map(str::trim)
        .and_then(|h| h.strip_prefix("sha256="))
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or_else(invalid)?;

    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).map_err(|_| invalid())?;
    mac.update(body);
    mac.verify_slice(&digest).map_err(|_| invalid())
}
