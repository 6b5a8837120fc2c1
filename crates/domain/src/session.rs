//! Signed session tokens: `base64url(json(actor)).hex(hmac_sha256(payload))`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SessionError;
use crate::models::Actor;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(payload: &str, secret: &str) -> Result<HmacSha256, SessionError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SessionError::BadSecret)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

pub fn sign(actor: &Actor, secret: &str) -> Result<String, SessionError> {
    let json = serde_json::to_vec(actor).map_err(|_| SessionError::Malformed)?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = mac_for(&payload, secret)?.finalize().into_bytes();
    Ok(format!("{}.{}", payload, hex::encode(signature)))
}

pub fn verify(token: &str, secret: &str) -> Result<Actor, SessionError> {
    let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
    let signature = hex::decode(signature).map_err(|_| SessionError::Malformed)?;

    mac_for(payload, secret)?
        .verify_slice(&signature)
        .map_err(|_| SessionError::BadSignature)?;

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| SessionError::Malformed)?;
    serde_json::from_slice(&json).map_err(|_| SessionError::Malformed)
}
