//! Validation of JSON payloads into typed records.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Ids7Error, Ids7Result};

/// A JSON object as exchanged with IDS7.
pub type JsonPayload = serde_json::Map<String, serde_json::Value>;

/// A record type that IDS7 responses are validated into.
pub trait Schema: DeserializeOwned {
    /// Record name reported in validation errors.
    const NAME: &'static str;

    /// Build the record, rejecting missing or mistyped fields.
    fn validate(payload: JsonPayload) -> Ids7Result<Self> {
        serde_json::from_value(serde_json::Value::Object(payload)).map_err(|source| {
            Ids7Error::Validation {
                record: Self::NAME,
                source,
            }
        })
    }

    /// Parse a response body into the record.
    ///
    /// A body that is not a JSON object is reported under [`Self::NAME`].
    fn parse(body: &[u8]) -> Ids7Result<Self> {
        Self::validate(parse_payload(body, Self::NAME)?)
    }
}

/// Untyped records: any JSON object is accepted as is.
impl Schema for JsonPayload {
    const NAME: &'static str = "JSON object";

    fn validate(payload: JsonPayload) -> Ids7Result<Self> {
        Ok(payload)
    }
}

/// Parse a response body that must be a JSON object.
pub fn parse_payload(body: &[u8], record: &'static str) -> Ids7Result<JsonPayload> {
    serde_json::from_slice(body).map_err(|source| Ids7Error::Validation { record, source })
}

/// Serialize an outgoing value, which must produce a JSON object.
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Ids7Result<JsonPayload> {
    match serde_json::to_value(value).map_err(Ids7Error::Serialization)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Ids7Error::Serialization(serde::ser::Error::custom(
            format!("expected a JSON object, got {}", json_kind(&other)),
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
