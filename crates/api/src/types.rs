//! API request and response types
//!
//! Query parameters and helpers shared by several route groups.

use gitadora_skill::InstrumentType;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// `?instrument=` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct InstrumentParams {
    /// Instrument name, case-insensitive (default guitar)
    pub instrument: Option<String>,
}

impl InstrumentParams {
    /// Parse the instrument, defaulting to guitar when absent or blank
    pub fn instrument(&self) -> Result<InstrumentType> {
        parse_instrument(self.instrument.as_deref())
    }
}

/// Parse an optional instrument name, defaulting to guitar
pub fn parse_instrument(raw: Option<&str>) -> Result<InstrumentType> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => Ok(InstrumentType::parse(name)?),
        None => Ok(InstrumentType::default()),
    }
}

/// Parse a numeric path id
///
/// Ids arrive as strings so that a malformed id yields the JSON error body
/// instead of the extractor's plain-text rejection.
pub fn parse_id(name: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("{} must be numeric, got '{}'", name, raw)))
}

/// Generic list wrapper
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
