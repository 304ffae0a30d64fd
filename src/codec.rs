//! Record codecs: the pluggable serialize/deserialize boundary.
//!
//! The record store consumes exactly two operations from a codec and is
//! agnostic to the representation; anything that fits on one line of UTF-8
//! text works.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Codec failure; carries the underlying encoder/decoder message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

/// Two-operation capability: record to line of text and back.
pub trait Codec {
    fn encode<T: Serialize>(&self, record: &T) -> Result<String, CodecError>;
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError>;
}

/// JSON lines via serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, record: &T) -> Result<String, CodecError> {
        serde_json::to_string(record).map_err(|e| CodecError(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError> {
        serde_json::from_str(text).map_err(|e| CodecError(e.to_string()))
    }
}

/// Binary-to-text codec: bincode bytes, hex-armored to stay line-safe.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode<T: Serialize>(&self, record: &T) -> Result<String, CodecError> {
        let bytes = bincode::serialize(record).map_err(|e| CodecError(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError> {
        let bytes = hex::decode(text.trim()).map_err(|e| CodecError(e.to_string()))?;
        bincode::deserialize(&bytes).map_err(|e| CodecError(e.to_string()))
    }
}
