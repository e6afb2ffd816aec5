// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-tick output record.

use serde::{Deserialize, Serialize};

/// One engine tick, serialized as `{"t", "H", "Y", "Z"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Logical time in seconds (`tick × dt`, first tick at `dt`).
    pub t: f64,
    /// Smoothed normalized entropy H̃.
    #[serde(rename = "H")]
    pub h: f64,
    /// Slope of H̃.
    #[serde(rename = "Y")]
    pub y: f64,
    /// Curvature of H̃.
    #[serde(rename = "Z")]
    pub z: f64,
    /// Unsmoothed normalized entropy for this tick.
    #[serde(skip)]
    pub raw: f64,
}

impl TickRecord {
    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON. `raw` is not part of the wire format and reads as 0.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys() {
        let record = TickRecord {
            t: 0.5,
            h: 0.25,
            y: -1.0,
            z: 2.0,
            raw: 0.3,
        };
        let json = record.to_json().unwrap();
        assert_eq!(json, r#"{"t":0.5,"H":0.25,"Y":-1.0,"Z":2.0}"#);
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let json = r#"{"t":1.0,"H":0.5,"Y":0.0,"Z":0.0,"profile":"calm"}"#;
        let record = TickRecord::from_json(json).unwrap();
        assert_eq!(record.h, 0.5);
        assert_eq!(record.raw, 0.0);
    }
}
