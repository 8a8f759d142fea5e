//! Command DTOs for the cache driver
//!
//! One JSON object per input line, tagged by `op`.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheOptions;

/// A cache operation read from the driver input.
///
/// A missing `type` deserializes as an empty string so the cache itself
/// reports the parameter error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Command {
    Has {
        #[serde(rename = "type", default)]
        resource_type: String,
        #[serde(default)]
        options: CacheOptions,
    },
    Get {
        #[serde(rename = "type", default)]
        resource_type: String,
        #[serde(default)]
        options: CacheOptions,
    },
    Set {
        #[serde(rename = "type", default)]
        resource_type: String,
        #[serde(default)]
        options: CacheOptions,
        data: Value,
    },
    Update {
        #[serde(rename = "type", default)]
        resource_type: String,
        #[serde(default)]
        options: CacheOptions,
        data: Value,
    },
    Delete {
        #[serde(rename = "type", default)]
        resource_type: String,
        #[serde(default)]
        options: CacheOptions,
    },
    Clear,
    Stats,
    /// Rebuilds the key structure behind an identifier
    Parse { identifier: String },
}

impl Command {
    /// Name of the operation, for logging.
    pub fn op(&self) -> &'static str {
        match self {
            Command::Has { .. } => "has",
            Command::Get { .. } => "get",
            Command::Set { .. } => "set",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::Clear => "clear",
            Command::Stats => "stats",
            Command::Parse { .. } => "parse",
        }
    }
}
