// Shared-secret request token
// A lightweight HMAC substitute: a short-lived JSON payload XOR-encrypted
// with the shared key and base62-encoded, carried in the
// `matscraft-secret` header

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

const BASE62: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Unix seconds after which the backend rejects the token.
    pub expires: i64,
}

impl TokenPayload {
    pub fn is_expired(&self, now_seconds: i64) -> bool {
        self.expires <= now_seconds
    }
}

/// Issue a token valid for `ttl_seconds` from `now_seconds`.
pub fn issue_token(key: &str, ttl_seconds: i64, now_seconds: i64) -> Result<String> {
    if key.is_empty() {
        return Err(anyhow!("secret key is empty"));
    }
    let payload = serde_json::to_vec(&TokenPayload {
        expires: now_seconds + ttl_seconds,
    })?;
    Ok(encode_base62(&xor_cipher(&payload, key.as_bytes())))
}

/// Invert `issue_token`; used by tests and by the backend contract.
pub fn decode_token(token: &str, key: &str) -> Result<TokenPayload> {
    if key.is_empty() {
        return Err(anyhow!("secret key is empty"));
    }
    let encrypted = decode_base62(token)?;
    let payload = xor_cipher(&encrypted, key.as_bytes());
    Ok(serde_json::from_slice(&payload)?)
}

/// Symmetric: applying the cipher twice with the same key is the identity.
fn xor_cipher(input: &[u8], key: &[u8]) -> Vec<u8> {
    input
        .iter()
        .enumerate()
        .map(|(i, byte)| byte ^ key[i % key.len()])
        .collect()
}

/// Two base62 digits per byte (62^2 > 255).
fn encode_base62(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(BASE62[(*byte as usize) / 62] as char);
        out.push(BASE62[(*byte as usize) % 62] as char);
    }
    out
}

fn decode_base62(encoded: &str) -> Result<Vec<u8>> {
    let chars = encoded.as_bytes();
    if chars.len() % 2 != 0 {
        return Err(anyhow!("base62 payload has odd length"));
    }
    let mut out = Vec::with_capacity(chars.len() / 2);
    for pair in chars.chunks_exact(2) {
        let high = digit_value(pair[0])?;
        let low = digit_value(pair[1])?;
        let value = high * 62 + low;
        if value > u8::MAX as usize {
            return Err(anyhow!("base62 pair out of byte range"));
        }
        out.push(value as u8);
    }
    Ok(out)
}

fn digit_value(digit: u8) -> Result<usize> {
    BASE62
        .iter()
        .position(|candidate| *candidate == digit)
        .ok_or_else(|| anyhow!("invalid base62 digit '{}'", digit as char))
}
