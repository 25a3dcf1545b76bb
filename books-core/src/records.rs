//! Decoding of provider rows into typed records
//!
//! The remote provider answers with JSON arrays. Every row is validated
//! against the typed record (exhaustive account kinds, required fields);
//! a single bad row rejects the whole payload.

use crate::types::{Account, Category, Delegation, Transaction};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A record served by the provider
pub trait Record: DeserializeOwned {
    /// Table the rows come from
    const ENTITY: &'static str;
}

impl Record for Delegation {
    const ENTITY: &'static str = "delegations";
}

impl Record for Account {
    const ENTITY: &'static str = "accounts";
}

impl Record for Category {
    const ENTITY: &'static str = "categories";
}

impl Record for Transaction {
    const ENTITY: &'static str = "transactions";
}

/// Decode a JSON array of rows
pub fn decode_rows<T: Record>(payload: Value) -> Result<Vec<T>> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(Error::InvalidRecord {
                entity: T::ENTITY,
                row: 0,
                reason: format!("expected an array of rows, got {}", kind_of(&other)),
            })
        }
    };

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            serde_json::from_value(value).map_err(|e| Error::InvalidRecord {
                entity: T::ENTITY,
                row,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<T>>>()?;

    tracing::debug!("Decoded {} {} rows", records.len(), T::ENTITY);
    Ok(records)
}

/// Decode rows from raw JSON text
pub fn decode_rows_str<T: Record>(payload: &str) -> Result<Vec<T>> {
    decode_rows(serde_json::from_str(payload)?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
