// Entropy Engine Stream - Line codec
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Newline-delimited sample codec.
//!
//! Each line is either a bare decimal number (`0.42`) or a JSON envelope
//! (`{"value": 0.42}`). Blank lines are skipped. Anything else is a
//! [`DecodeError`] and the line is dropped.

use crate::error::DecodeError;

/// Default cap on a single line, in bytes.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Decode one line, without its terminator.
pub fn decode_line(line: &[u8]) -> Result<f64, DecodeError> {
    let text = std::str::from_utf8(line).map_err(|_| DecodeError::InvalidUtf8)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value = if text.starts_with('{') {
        decode_envelope(text)?
    } else {
        text.parse::<f64>()
            .map_err(|_| DecodeError::NotANumber(text.to_string()))?
    };

    if !value.is_finite() {
        return Err(DecodeError::NonFinite(value));
    }
    Ok(value)
}

fn decode_envelope(text: &str) -> Result<f64, DecodeError> {
    let doc: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DecodeError::Envelope(e.to_string()))?;
    match doc.get("value") {
        Some(v) => v
            .as_f64()
            .ok_or_else(|| DecodeError::Envelope(format!("value is not a number: {}", v))),
        None => Err(DecodeError::Envelope("missing 'value'".to_string())),
    }
}

/// Splits a byte stream into decoded lines.
///
/// Bytes are buffered until a `\n` arrives. A line that grows past the
/// cap is reported once as [`DecodeError::LineTooLong`] and the rest of
/// it is skipped up to the next newline.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_len: usize,
    discarding: bool,
}

impl LineBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_len: max_len.max(1),
            discarding: false,
        }
    }

    /// Feed a chunk and decode every line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<f64, DecodeError>> {
        let mut out = Vec::new();
        for segment in chunk.split_inclusive(|&b| b == b'\n') {
            let complete = segment.last() == Some(&b'\n');
            let body = if complete {
                &segment[..segment.len() - 1]
            } else {
                segment
            };

            if self.discarding {
                if complete {
                    self.discarding = false;
                }
                continue;
            }

            if self.pending.len() + body.len() > self.max_len {
                self.pending.clear();
                self.discarding = !complete;
                out.push(Err(DecodeError::LineTooLong { max: self.max_len }));
                continue;
            }

            self.pending.extend_from_slice(body);
            if complete {
                match decode_line(&self.pending) {
                    Err(DecodeError::Empty) => {}
                    decoded => out.push(decoded),
                }
                self.pending.clear();
            }
        }
        out
    }

    /// Bytes waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.discarding = false;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}
