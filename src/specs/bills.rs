// src/specs/bills.rs
//! Spec for the Bills API.
//!
//! Purpose:
//! - `GET /Bills/{id}` → [`BillInfo`] (titles, house, session, sponsor party).
//! - The two progress heuristics (`isAct` flag, news-article phrases).
//! - The three introduced-date heuristics (`lastUpdate`, current stage, first stage).
//!
//! Responsibilities:
//! - Default-on-missing-key reads: titles/house/session fall back to `"N/A"`.
//! - One request per call; `/Stages` and `/NewsArticles` only when the chosen
//!   strategy needs them.
//!
//! Non-Responsibilities:
//! - Seat counts (`specs::parties`) and date formatting (`core::dates`).
//! - Deciding what a failure means for the run (`collect`).

use serde_json::Value;

use crate::bill::{ProgressStatus, SeatCounts};
use crate::config::consts::*;
use crate::core::net::ApiClient;
use crate::error::FetchError;
use crate::table::Row;

/// One collected bill, in output-column order.
#[derive(Clone, Debug, PartialEq)]
pub struct BillInfo {
    pub bill_id: u32,
    pub long_title: String,
    pub short_title: String,
    pub originating_house: String,
    pub progress_status: Option<ProgressStatus>,
    pub session_id: String,
    pub introduced_date: Option<String>,
    pub sponsor_party: String,
    pub formatted_date: Option<String>,
    pub seat_counts: Option<SeatCounts>,
}

impl BillInfo {
    /// Static fields of a bill document; heuristics are filled in by the caller.
    pub fn from_json(bill_id: u32, data: &Value) -> Self {
        Self {
            bill_id,
            long_title: text_or_na(data, "longTitle"),
            short_title: text_or_na(data, "shortTitle"),
            originating_house: text_or_na(data, "originatingHouse"),
            progress_status: None,
            session_id: text_or_na(data, "introducedSessionId"),
            introduced_date: None,
            sponsor_party: sponsor_party(data),
            formatted_date: None,
            seat_counts: None,
        }
    }

    pub fn headers() -> Vec<String> {
        cols![
            ID_COLUMN,
            "long_title",
            "short_title",
            "originating_house",
            STATUS_COLUMN,
            "sessionID",
            "introduced_date",
            SPONSOR_COLUMN,
            "formatted_date",
            SEATS_COLUMN,
        ]
    }

    pub fn to_row(&self) -> Row {
        vec![
            Some(self.bill_id.to_string()),
            Some(self.long_title.clone()),
            Some(self.short_title.clone()),
            Some(self.originating_house.clone()),
            self.progress_status.map(|p| p.to_string()),
            Some(self.session_id.clone()),
            self.introduced_date.clone(),
            Some(self.sponsor_party.clone()),
            self.formatted_date.clone(),
            self.seat_counts.as_ref().map(SeatCounts::to_literal),
        ]
    }
}

fn text_or_na(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => s!(NOT_AVAILABLE),
    }
}

/* ---------------- Bill document ---------------- */

pub fn fetch_bill(client: &ApiClient, bill_id: u32) -> Result<Value, FetchError> {
    let url = client.bills_url(&bill_id.to_string());
    let data = client.get_json(&url)?;
    if !data.is_object() {
        return Err(FetchError::Shape { url, detail: s!("bill is not an object") });
    }
    Ok(data)
}

/// `sponsors[0].member.party`, else `"N/A"`.
pub fn sponsor_party(data: &Value) -> String {
    data.get("sponsors")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(|first| first.get("member"))
        .and_then(|member| member.get("party"))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| s!(NOT_AVAILABLE))
}

/* ---------------- Progress heuristics ---------------- */

/// `isAct` present → 2 (true) or 1 (anything else, null included); absent → 3.
pub fn is_act_status(data: &Value) -> ProgressStatus {
    match data.get("isAct") {
        Some(Value::Bool(true)) => ProgressStatus::Act,
        Some(_) => ProgressStatus::InProgress,
        None => ProgressStatus::Unknown,
    }
}

pub fn fetch_news_status(client: &ApiClient, bill_id: u32) -> Result<ProgressStatus, FetchError> {
    let url = client.bills_url(&join!(&bill_id.to_string(), "/NewsArticles"));
    let data = client.get_json(&url)?;
    news_status(&data).map_err(|detail| FetchError::Shape { url, detail })
}

/// First article (in order) containing a known phrase decides; none → Unknown.
pub fn news_status(data: &Value) -> Result<ProgressStatus, String> {
    let items = data
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| s!("no items array"))?;

    for article in items {
        let content = article
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_uppercase();
        for (phrase, code) in NEWS_PHRASES {
            if content.contains(&phrase.to_uppercase()) {
                return Ok(ProgressStatus::from_code(i64::from(*code)).unwrap_or(ProgressStatus::Unknown));
            }
        }
    }
    Ok(ProgressStatus::Unknown)
}

/* ---------------- Date heuristics ---------------- */

pub fn last_update(data: &Value) -> Option<String> {
    data.get("lastUpdate").and_then(Value::as_str).map(String::from)
}

/// Date of the first sitting of a stage object. The API has used both
/// `stageSittings` and `stageSitting`.
fn first_sitting_date(stage: &Value) -> Option<String> {
    let sittings = stage
        .get("stageSittings")
        .or_else(|| stage.get("stageSitting"))
        .and_then(Value::as_array)?;
    sittings
        .first()?
        .get("date")
        .and_then(Value::as_str)
        .map(String::from)
}

pub fn current_stage_date(data: &Value) -> Option<String> {
    data.get("currentStage").and_then(first_sitting_date)
}

/// Pure half of [`fetch_first_stage_date`]: `items[0]`'s first sitting.
pub fn first_stage_date(stages: &Value) -> Option<String> {
    stages
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(first_sitting_date)
}

pub fn fetch_first_stage_date(client: &ApiClient, bill_id: u32) -> Result<Option<String>, FetchError> {
    let url = client.bills_url(&join!(&bill_id.to_string(), "/Stages"));
    let data = client.get_json(&url)?;
    Ok(first_stage_date(&data))
}
