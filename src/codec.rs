//! # Value Codec
//!
//! Purpose: Decide how an application value travels over the wire and how a
//! raw reply is reconstituted into a structured value on the way back.
//!
//! ## Design Principles
//! 1. **Bounded Sum Type**: Callers hand over a [`Value`], not an erased
//!    any-type; the encoder is total over its variants.
//! 2. **Never Double-Encode**: Raw bytes pass through untouched.
//! 3. **Named Fallback Policy**: Reply sniffing is an explicit tagged result
//!    ([`Sniffed`]), not a silent heuristic buried in a helper.
//! 4. **Order Preservation**: Sequence replies keep the server's element
//!    order; mapping replies treat field order as insignificant.

use serde::Serialize;

use crate::error::{Error, Result};

/// An application value bound for the store.
///
/// Structural values (mappings, sequences, records) are rendered to
/// canonical JSON text before transmission; scalars travel in their natural
/// textual form; raw bytes pass through as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. Rejected by every write operation before any IO.
    Nil,
    /// Stored as the fixed tokens `1` / `0`.
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Raw payload, transmitted unmodified.
    Bytes(Vec<u8>),
    /// Mapping, sequence, or record; rendered as canonical JSON.
    Structured(serde_json::Value),
}

impl Value {
    /// Builds a structural value from any serializable record.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Value::Structured(serde_json::to_value(value)?))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Structured(value)
    }
}

/// Encodes a value into its wire form.
///
/// `Nil` fails with [`Error::InvalidValue`]; the caller must not have opened
/// a connection yet.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Nil => Err(Error::InvalidValue),
        Value::Bool(true) => Ok(b"1".to_vec()),
        Value::Bool(false) => Ok(b"0".to_vec()),
        Value::Int(n) => Ok(n.to_string().into_bytes()),
        Value::Float(n) => Ok(n.to_string().into_bytes()),
        Value::Text(text) => Ok(text.clone().into_bytes()),
        Value::Bytes(raw) => Ok(raw.clone()),
        Value::Structured(json) => Ok(serde_json::to_vec(json)?),
    }
}

/// Outcome of the parse-or-literal sniff applied to one raw payload.
///
/// Raw text that happens to be valid JSON is reconstructed as that
/// structure, not as the original string. Call sites that need the original
/// text can match on the tag instead of collapsing it.
#[derive(Debug, Clone, PartialEq)]
pub enum Sniffed {
    /// Payload parsed as canonical JSON.
    Structured(serde_json::Value),
    /// Payload kept as literal text.
    Literal(String),
}

impl Sniffed {
    /// Attempts a strict JSON parse, keeping the literal text on failure.
    pub fn sniff(raw: &[u8]) -> Self {
        match serde_json::from_slice(raw) {
            Ok(json) => Sniffed::Structured(json),
            Err(_) => Sniffed::Literal(String::from_utf8_lossy(raw).into_owned()),
        }
    }

    /// Collapses the tag into a JSON value.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Sniffed::Structured(json) => json,
            Sniffed::Literal(text) => serde_json::Value::String(text),
        }
    }
}

/// Reconstitutes a field→payload mapping reply into one JSON object.
///
/// Each payload is sniffed independently; field order is not significant.
pub fn decode_map(pairs: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>> {
    let mut object = serde_json::Map::with_capacity(pairs.len());
    for (field, raw) in pairs {
        object.insert(field, Sniffed::sniff(&raw).into_json());
    }
    Ok(serde_json::to_vec(&serde_json::Value::Object(object))?)
}

/// Reconstitutes a single raw payload into one JSON value.
pub fn decode_scalar(raw: &[u8]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&Sniffed::sniff(raw).into_json())?)
}

/// Reconstitutes a sequence-of-payloads reply into one JSON array.
///
/// Element order mirrors the server's reply order.
pub fn decode_list(items: Vec<Vec<u8>>) -> Result<Vec<u8>> {
    let elements: Vec<serde_json::Value> = items
        .iter()
        .map(|raw| Sniffed::sniff(raw).into_json())
        .collect();
    Ok(serde_json::to_vec(&serde_json::Value::Array(elements))?)
}
