//! Base64 encoding and decoding utilities

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64 string to binary data
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(strip_data_url_prefix(encoded).trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid base64 data: {}", e)))
}

/// Drop a data URL prefix (e.g. "data:image/png;base64,") if present
pub fn strip_data_url_prefix(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        encoded
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or(encoded)
    } else {
        encoded
    }
}

/// Size in bytes of the data a base64 payload decodes to
pub fn decoded_len(encoded: &str) -> usize {
    let payload = strip_data_url_prefix(encoded).trim();
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    (payload.len() / 4 * 3).saturating_sub(padding)
}
