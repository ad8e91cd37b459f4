// src/features/parse.rs
//! Tolerant readers for the two stringified structures bills carry around:
//! seat-count mappings (`"{'Labour': 353, ...}"`) and probability arrays
//! (`"[0.1 0.2 0.3 0.7]"`, numpy's print form).
//!
//! `parse_*` keeps missing (`Ok(None)`) apart from broken (`Err`);
//! `*_or_empty` applies the zero/empty policy used by the extractor.

use serde_json::Value;

use crate::bill::SeatCounts;
use crate::core::literal::{self, Literal};
use crate::error::ParseError;

fn blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Literal-dict text → seat counts.
pub fn parse_seat_counts(raw: Option<&str>) -> Result<Option<SeatCounts>, ParseError> {
    let Some(text) = blank(raw) else { return Ok(None) };
    match literal::parse(text)? {
        Literal::None => Ok(None),
        Literal::Dict(pairs) => {
            let mut out = SeatCounts::new();
            for (key, value) in pairs {
                let Some(party) = key.as_str() else {
                    logd!("seat counts: skipping non-string key {key:?}");
                    continue;
                };
                match value.as_i64().and_then(|v| u32::try_from(v).ok()) {
                    Some(seats) => out.insert(party, seats),
                    None => logd!("seat counts: skipping {party:?} with value {value:?}"),
                }
            }
            Ok(Some(out))
        }
        other => Err(ParseError::Type { expected: "dict", found: s!(other.kind()) }),
    }
}

/// Same contract for a value that may already be a native JSON object.
pub fn seat_counts_from_json(value: &Value) -> Result<Option<SeatCounts>, ParseError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => parse_seat_counts(Some(text)),
        Value::Object(map) => {
            let mut out = SeatCounts::new();
            for (party, seats) in map {
                let n = seats
                    .as_u64()
                    .or_else(|| seats.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
                    .and_then(|v| u32::try_from(v).ok());
                match n {
                    Some(n) => out.insert(party, n),
                    None => logd!("seat counts: skipping {party:?} with value {seats}"),
                }
            }
            Ok(Some(out))
        }
        other => Err(ParseError::Type { expected: "dict", found: other.to_string() }),
    }
}

pub fn seat_counts_or_empty(raw: Option<&str>) -> SeatCounts {
    match parse_seat_counts(raw) {
        Ok(Some(counts)) => counts,
        Ok(None) => SeatCounts::new(),
        Err(e) => {
            logd!("seat counts {raw:?} unreadable: {e}");
            SeatCounts::new()
        }
    }
}

/// `"[0.1 0.2 0.3 0.7]"` → `[0.1, 0.2, 0.3, 0.7]`. Brackets are stripped
/// from both ends, tokens split on whitespace. A bare number is a
/// one-element vector.
pub fn parse_probs(raw: Option<&str>) -> Result<Option<Vec<f64>>, ParseError> {
    let Some(text) = blank(raw) else { return Ok(None) };
    text.trim_matches(|c| c == '[' || c == ']')
        .split_whitespace()
        .map(|tok| tok.parse::<f64>().map_err(|_| ParseError::Number(s!(tok))))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

pub fn probs_or_empty(raw: Option<&str>) -> Vec<f64> {
    match parse_probs(raw) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => {
            logd!("probability vector {raw:?} unreadable: {e}");
            Vec::new()
        }
    }
}
