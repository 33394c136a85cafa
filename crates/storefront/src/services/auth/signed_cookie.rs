//! HMAC-signed cookie values.
//!
//! Format: `<base64url(payload)>.<base64url(HMAC-SHA256(secret, encoded))>`.
//! The MAC covers the encoded text, not the raw payload bytes.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// PKCE login state kept in the browser between login and callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkceCookie {
    pub state: String,
    pub code_verifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
}

/// Signs and verifies cookie values with the server secret.
///
/// The keyed MAC is built once and cloned per operation.
#[derive(Clone)]
pub struct CookieCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCodec")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl CookieCodec {
    /// Create a codec keyed with the server secret.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLength` if the key is rejected by the MAC.
    pub fn new(secret: &SecretString) -> Result<Self, InvalidLength> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;
        Ok(Self { mac })
    }

    fn mac(&self) -> HmacSha256 {
        self.mac.clone()
    }

    /// Sign raw payload bytes.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> String {
        let encoded = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac();
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{encoded}.{signature}")
    }

    /// Verify a signed value and return its payload bytes.
    ///
    /// The value has exactly one `.` separator; anything after it is the
    /// signature, so extra dots fail decoding or verification.
    ///
    /// Returns `None` for a missing separator, bad base64 or a signature
    /// mismatch. The comparison is constant time.
    #[must_use]
    pub fn verify(&self, value: &str) -> Option<Vec<u8>> {
        let (encoded, signature) = value.split_once('.')?;
        if encoded.is_empty() || signature.is_empty() {
            return None;
        }
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature).ok()?;

        URL_SAFE_NO_PAD.decode(encoded).ok()
    }

    /// Encode the PKCE cookie value.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn encode_pkce(&self, pkce: &PkceCookie) -> Result<String, serde_json::Error> {
        Ok(self.sign(&serde_json::to_vec(pkce)?))
    }

    /// Decode the PKCE cookie value. Empty `state` or `codeVerifier` is invalid.
    #[must_use]
    pub fn decode_pkce(&self, value: &str) -> Option<PkceCookie> {
        let payload = self.verify(value)?;
        let pkce: PkceCookie = serde_json::from_slice(&payload).ok()?;
        if pkce.state.is_empty() || pkce.code_verifier.is_empty() {
            return None;
        }
        Some(pkce)
    }

    /// Encode the customer session cookie (the raw access token).
    #[must_use]
    pub fn encode_session(&self, access_token: &str) -> String {
        self.sign(access_token.as_bytes())
    }

    /// Decode the customer session cookie into the access token.
    #[must_use]
    pub fn decode_session(&self, value: &str) -> Option<String> {
        let token = String::from_utf8(self.verify(value)?).ok()?;
        (!token.is_empty()).then_some(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> CookieCodec {
        CookieCodec::new(&SecretString::from(secret.to_string())).unwrap()
    }

    fn pkce() -> PkceCookie {
        PkceCookie {
            state: "state-123".to_string(),
            code_verifier: "verifier-abc".to_string(),
            return_to: Some("/account/orders".to_string()),
        }
    }

    const SECRET: &str = "k3J9#mQ2$vL8@pX5&nR7*tW1^yZ4!bC6";

    #[test]
    fn test_session_round_trip() {
        let codec = codec(SECRET);
        let value = codec.encode_session("shcat_token");
        assert_eq!(codec.decode_session(&value).as_deref(), Some("shcat_token"));
    }

    #[test]
    fn test_pkce_round_trip() {
        let codec = codec(SECRET);
        let value = codec.encode_pkce(&pkce()).unwrap();
        assert_eq!(codec.decode_pkce(&value), Some(pkce()));
    }

    #[test]
    fn test_pkce_payload_is_camel_case_json() {
        let codec = codec(SECRET);
        let value = codec.encode_pkce(&pkce()).unwrap();
        let payload = codec.verify(&value).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["codeVerifier"], "verifier-abc");
        assert_eq!(json["returnTo"], "/account/orders");
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec(SECRET);
        let value = codec.encode_session("shcat_token");
        let (_, signature) = value.split_once('.').unwrap();
        let forged = format!("{}.{signature}", URL_SAFE_NO_PAD.encode("shcat_other"));
        assert_eq!(codec.decode_session(&forged), None);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = codec(SECRET);
        let value = codec.encode_session("shcat_token");
        let (encoded, _) = value.split_once('.').unwrap();
        let forged = format!("{encoded}.{}", URL_SAFE_NO_PAD.encode([0u8; 32]));
        assert_eq!(codec.decode_session(&forged), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let value = codec(SECRET).encode_session("shcat_token");
        let other = codec("z9Y8#x7W6$v5U4@t3S2&r1Q0*pOnMlKj");
        assert_eq!(other.decode_session(&value), None);
    }

    #[test]
    fn test_malformed_values_rejected() {
        let codec = codec(SECRET);
        assert_eq!(codec.decode_session(""), None);
        assert_eq!(codec.decode_session("no-separator"), None);
        assert_eq!(codec.decode_session(".sig"), None);
        assert_eq!(codec.decode_session("payload."), None);
        assert_eq!(codec.decode_session("payload.!!!"), None);
    }

    #[test]
    fn test_extra_separator_rejected() {
        let codec = codec(SECRET);
        let value = codec.encode_session("shcat_token");
        assert_eq!(codec.decode_session(&format!("{value}.extra")), None);

        let (encoded, signature) = value.split_once('.').unwrap();
        assert_eq!(
            codec.decode_session(&format!("{encoded}.x.{signature}")),
            None
        );
    }

    #[test]
    fn test_pkce_requires_state_and_verifier() {
        let codec = codec(SECRET);
        let empty_state = codec.sign(br#"{"state":"","codeVerifier":"v"}"#);
        assert_eq!(codec.decode_pkce(&empty_state), None);

        let not_json = codec.sign(b"not json");
        assert_eq!(codec.decode_pkce(&not_json), None);

        let no_return_to = codec.sign(br#"{"state":"s","codeVerifier":"v"}"#);
        assert_eq!(
            codec.decode_pkce(&no_return_to).unwrap().return_to,
            None
        );
    }
}
