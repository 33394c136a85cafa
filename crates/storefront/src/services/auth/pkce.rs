//! PKCE (RFC 7636) primitives for the customer login flow.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

/// Generate a PKCE code verifier (32 random bytes, 43 base64url chars).
#[must_use]
pub fn generate_code_verifier() -> String {
    URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
}

/// Derive the S256 code challenge for a verifier.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generate an opaque OAuth `state` value (16 random bytes).
#[must_use]
pub fn generate_state() -> String {
    URL_SAFE_NO_PAD.encode(rand::random::<[u8; 16]>())
}

/// Accept only same-site relative paths, falling back to `default`.
///
/// Rejects absolute URLs, protocol-relative paths (`//host`) and backslashes,
/// which browsers may normalize into `//`.
#[must_use]
pub fn sanitize_return_to(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => default.to_string(),
    }
}
