//! Reversible codec for personal-data fields.
//!
//! The booking engine stores notes, diagnoses and instructions as opaque
//! payloads; this crate is the collaborator that produces and consumes them.
//! Payloads are hex-encoded so they travel safely as SQL text.

use thiserror::Error;

/// Codec errors.
#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("payload is not valid hex: {0}")]
    Transport(String),

    #[error("decoded payload is not valid UTF-8")]
    Malformed,
}

/// A reversible transform applied to personal-data fields before storage and
/// after retrieval.
pub trait Codec {
    /// Transform plaintext into an opaque payload.
    fn encode(&self, plaintext: &str) -> String;

    /// Recover plaintext from a payload produced by [`encode`](Codec::encode).
    fn decode(&self, payload: &str) -> Result<String, CodecError>;
}

/// Key-stream XOR obfuscation with hex transport encoding.
///
/// Not cryptography - a stand-in with the right shape (deterministic,
/// reversible, keyed) so the engine and its callers exercise the real data
/// flow. Swap in a proper cipher behind the same trait for production.
pub struct XorCodec {
    key: Vec<u8>,
}

impl XorCodec {
    /// Build a codec from a non-empty key.
    pub fn new(key: &str) -> Self {
        assert!(!key.is_empty(), "codec key must not be empty");
        Self {
            key: key.as_bytes().to_vec(),
        }
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key_byte)| byte ^ key_byte)
            .collect()
    }
}

impl Codec for XorCodec {
    fn encode(&self, plaintext: &str) -> String {
        hex::encode(self.xor(plaintext.as_bytes()))
    }

    fn decode(&self, payload: &str) -> Result<String, CodecError> {
        let bytes = hex::decode(payload).map_err(|e| CodecError::Transport(e.to_string()))?;
        String::from_utf8(self.xor(&bytes)).map_err(|_| CodecError::Malformed)
    }
}
