//! Response envelopes of the dashboard backend.
//!
//! Every endpoint wraps its payload in `{ success, data, error }`; decoding
//! is split from the transport so the parsing rules are testable off the
//! browser.

use serde::Deserialize;

use crate::application::fetch_coordinator::{KlineRecord, TickerRecord};
use crate::domain::errors::{FetchError, FetchResult};

#[derive(Debug, Deserialize)]
pub struct KlinesResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<KlineRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PricesResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<TickerRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

fn unwrap_envelope<T>(success: bool, data: T, error: Option<String>) -> FetchResult<T> {
    if success {
        Ok(data)
    } else {
        Err(FetchError::Network(error.unwrap_or_else(|| "backend reported failure".to_string())))
    }
}

pub fn parse_klines_response(body: &str) -> FetchResult<Vec<KlineRecord>> {
    let response: KlinesResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Data(format!("malformed klines payload: {}", e)))?;
    unwrap_envelope(response.success, response.data, response.error)
}

pub fn parse_prices_response(body: &str) -> FetchResult<Vec<TickerRecord>> {
    let response: PricesResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Data(format!("malformed price listing: {}", e)))?;
    unwrap_envelope(response.success, response.data, response.error)
}
