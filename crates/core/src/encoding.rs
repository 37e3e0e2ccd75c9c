// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text ↔ base64 transcoding for the remote contents API.
//!
//! Text is always UTF-8 encoded before base64 mapping, so every Unicode
//! scalar value survives the trip. The remote wraps base64 payloads with
//! newlines; [`from_wire`] ignores ASCII whitespace.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Encodes text as base64 over its UTF-8 bytes.
pub fn to_wire(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes a base64 payload into UTF-8 text.
///
/// Fails with [`Error::Encoding`] on malformed base64 or invalid UTF-8.
pub fn from_wire(wire: &str) -> Result<String> {
    let bytes = decode_bytes(wire)?;
    String::from_utf8(bytes).map_err(|e| Error::Encoding(format!("invalid utf-8: {e}")))
}

/// Best-effort decode for payloads written by older clients.
///
/// Malformed base64 is still an error, but invalid UTF-8 sequences are
/// replaced with U+FFFD instead of failing.
pub fn from_wire_lossy(wire: &str) -> Result<String> {
    let bytes = decode_bytes(wire)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn decode_bytes(wire: &str) -> Result<Vec<u8>> {
    let compact: String = wire.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::Encoding(format!("invalid base64: {e}")))
}

#[cfg(test)]
#[path = "encoding_tests.rs"]
mod tests;
