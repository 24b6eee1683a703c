//! JSON helpers shared by report storage.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};

pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(data)?)
}

/// Deserializes data from a JSON string; blank input is rejected up front.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::EmptyDocument);
    }
    Ok(serde_json::from_str(json)?)
}
