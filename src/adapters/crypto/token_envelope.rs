//! Token envelope codec (spec §6): three dot-separated segments, each a
//! base64url-encoded (no padding) JSON object. The signature segment is
//! opaque and unchecked — a production implementation replaces it with a
//! real MAC/signature without altering the segment layout.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub alg: String,
    pub typ: String,
    pub kid: String,
}

impl Default for EnvelopeHeader {
    fn default() -> Self {
        Self {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
            kid: "default".to_string(),
        }
    }
}

fn encode_segment<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_vec(value).expect("envelope segments are always serializable");
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_segment(segment: &str) -> Option<Value> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Build the three-segment envelope. `signature_seed` is an opaque string
/// placed in the signature segment verbatim — no MAC is computed.
pub fn encode_envelope(header: &EnvelopeHeader, payload: &Value, signature_seed: &str) -> String {
    let header_segment = encode_segment(header);
    let payload_segment = encode_segment(payload);
    let signature_segment = URL_SAFE_NO_PAD.encode(signature_seed.as_bytes());
    format!("{header_segment}.{payload_segment}.{signature_segment}")
}

#[derive(Debug, Clone)]
pub struct DecodedEnvelope {
    pub header: Value,
    pub payload: Value,
}

/// Decode an envelope's header and payload without checking the signature
/// segment, matching spec §6's explicit "opaque and unchecked" contract.
pub fn decode_envelope(envelope: &str) -> Option<DecodedEnvelope> {
    let mut parts = envelope.split('.');
    let header = decode_segment(parts.next()?)?;
    let payload = decode_segment(parts.next()?)?;
    parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(DecodedEnvelope { header, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_then_decode_round_trips_payload() {
        let header = EnvelopeHeader::default();
        let payload = json!({"sub": "u1", "iss": "iam-core"});
        let envelope = encode_envelope(&header, &payload, "unsigned");
        let decoded = decode_envelope(&envelope).unwrap();
        assert_eq!(decoded.payload["sub"], "u1");
    }

    #[test]
    fn malformed_envelope_fails_to_decode() {
        assert!(decode_envelope("not-an-envelope").is_none());
    }
}
