//! Reply DTOs for the cache driver
//!
//! One JSON object per output line.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CacheError, CODE_INVALID_PARAMS};

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// False only for errors; misses and refused writes are still ok
    pub ok: bool,
    /// Whether a get found a live entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl Reply {
    /// Reply to a get.
    pub fn lookup(value: Option<Value>) -> Self {
        Self {
            ok: true,
            hit: Some(value.is_some()),
            result: value,
            error: None,
            code: None,
        }
    }

    /// Reply carrying a result.
    pub fn success(result: impl Into<Value>) -> Self {
        Self {
            ok: true,
            hit: None,
            result: Some(result.into()),
            error: None,
            code: None,
        }
    }

    /// Reply with nothing to report.
    pub fn done() -> Self {
        Self {
            ok: true,
            hit: None,
            result: None,
            error: None,
            code: None,
        }
    }

    /// Reply to a call the cache rejected.
    pub fn failure(err: &CacheError) -> Self {
        Self {
            ok: false,
            hit: None,
            result: None,
            error: Some(err.to_string()),
            code: Some(err.code()),
        }
    }

    /// Reply to an input line that is not a command.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            hit: None,
            result: None,
            error: Some(reason.into()),
            code: Some(CODE_INVALID_PARAMS),
        }
    }
}
