// src/specs/parties.rs
//! Spec for the Members API "state of the parties" snapshot.
//!
//! Purpose:
//! - `GET /Parties/StateOfTheParties/commons/{date}` → `SeatCounts` (party name → total seats).
//!
//! Responsibilities:
//! - Build the request URL from an already formatted `YYYY-MM-DD` date.
//! - Read `items[].value.party.name` / `items[].value.total`, defaulting to
//!   `"Unknown"` / `0` when a key is missing.
//!
//! Non-Responsibilities:
//! - Date normalization (`core::dates`).

use serde_json::Value;

use crate::bill::SeatCounts;
use crate::config::consts::UNKNOWN_PARTY;
use crate::core::net::ApiClient;
use crate::error::FetchError;

pub fn seat_counts_url(client: &ApiClient, date: &str) -> String {
    client.members_url(&join!("Parties/StateOfTheParties/commons/", date))
}

pub fn fetch_seat_counts(client: &ApiClient, date: &str) -> Result<SeatCounts, FetchError> {
    let url = seat_counts_url(client, date);
    let data = client.get_json(&url)?;
    seat_counts_from_json(&data).map_err(|detail| FetchError::Shape { url, detail })
}

/// Pure half of [`fetch_seat_counts`].
pub fn seat_counts_from_json(data: &Value) -> Result<SeatCounts, String> {
    let items = data
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| s!("no items array"))?;

    let mut counts = SeatCounts::new();
    for item in items {
        let value = item.get("value").unwrap_or(&Value::Null);
        let name = value
            .get("party")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_PARTY);
        let total = value
            .get("total")
            .and_then(Value::as_u64)
            .and_then(|t| u32::try_from(t).ok())
            .unwrap_or(0);
        counts.insert(name, total);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_party_totals_in_order() {
        let data = json!({
            "items": [
                { "value": { "party": { "name": "Labour" }, "total": 353 } },
                { "value": { "party": { "name": "Conservative" }, "total": 196 } },
                { "value": { "party": {}, "total": 7 } },
                { "value": { "party": { "name": "Green Party" } } }
            ]
        });
        let counts = seat_counts_from_json(&data).unwrap();
        assert_eq!(counts.get("Labour"), Some(353));
        assert_eq!(counts.get("Conservative"), Some(196));
        assert_eq!(counts.get("Unknown"), Some(7));
        assert_eq!(counts.get("Green Party"), Some(0));
        assert_eq!(counts.iter().next().map(|(p, _)| p), Some("Labour"));
    }

    #[test]
    fn missing_items_is_a_shape_error() {
        assert!(seat_counts_from_json(&json!({ "value": 1 })).is_err());
    }
}
