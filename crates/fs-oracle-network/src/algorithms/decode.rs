//! # Request Decoding
//!
//! Turns a raw `OracleRequest` ledger event into a validated
//! `StatusRequest`. Ledger clients emit numeric fields either as JSON
//! numbers or as decimal strings, so both are accepted.

use serde_json::Value;
use shared_bus::{event_names, LedgerEvent};
use shared_types::Address;

use crate::domain::{DecodeError, OracleIndex, StatusRequest};

/// Decode one `OracleRequest` event.
pub fn decode_oracle_request(event: &LedgerEvent) -> Result<StatusRequest, DecodeError> {
    if event.event != event_names::ORACLE_REQUEST {
        return Err(DecodeError::UnexpectedEvent(event.event.clone()));
    }

    let values = &event.return_values;

    let raw_index = numeric_field(values, "index")?;
    let index = OracleIndex::try_from(raw_index).map_err(|e| DecodeError::InvalidField {
        field: "index",
        reason: e.to_string(),
    })?;

    let airline = string_field(values, "airline")?
        .parse::<Address>()
        .map_err(|e| DecodeError::InvalidField {
            field: "airline",
            reason: e.to_string(),
        })?;

    let flight = string_field(values, "flight")?;
    if flight.trim().is_empty() {
        return Err(DecodeError::InvalidField {
            field: "flight",
            reason: "empty".to_string(),
        });
    }

    let timestamp = numeric_field(values, "timestamp")?;

    Ok(StatusRequest {
        index,
        airline,
        flight: flight.to_string(),
        timestamp,
        block_number: event.block_number,
    })
}

fn field<'a>(values: &'a Value, name: &'static str) -> Result<&'a Value, DecodeError> {
    match values.get(name) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn numeric_field(values: &Value, name: &'static str) -> Result<u64, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        field: name,
        reason,
    };

    match field(values, name)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| invalid(format!("not an unsigned integer: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(format!("{s:?}: {e}"))),
        other => Err(invalid(format!("unexpected type: {other}"))),
    }
}

fn string_field<'a>(values: &'a Value, name: &'static str) -> Result<&'a str, DecodeError> {
    field(values, name)?
        .as_str()
        .ok_or_else(|| DecodeError::InvalidField {
            field: name,
            reason: "expected a string".to_string(),
        })
}
