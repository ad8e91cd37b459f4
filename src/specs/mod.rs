// src/specs/mod.rs
//! # Endpoint “specs” module
//!
//! Each spec knows **one remote endpoint family** of the parliament APIs and how
//! to turn its JSON into typed values.
//!
//! ## What lives here
//! - **Request shaping** (`/Bills/{id}`, `/Bills/{id}/Stages`, `/Bills/{id}/NewsArticles`,
//!   `/Parties/StateOfTheParties/commons/{date}`) via `core::net::ApiClient`.
//! - **Tolerant reads** with default-on-missing-key semantics (`"N/A"`, `"Unknown"`, `0`).
//! - **Named heuristics** for fields the API does not state directly
//!   (introduced date, progress label).
//!
//! ## What does **not** live here
//! - **Looping, checkpoints, resume**: that is `collect`.
//! - **Files**: specs never touch the disk.
//! - **Skip policy**: specs return `Result`; the caller decides whether a failure
//!   drops the bill or blanks one field.
//!
//! ## Typical call chain
//! ```text
//! cli → collect::collect → collect::collect_one → specs::bills::fetch_bill
//!                                                 ↘ specs::parties::fetch_seat_counts
//!                  file::append_rows + store::Cursor (outside of specs)
//! ```
//!
//! ## Testing notes
//! - The pure halves (`*_from_json`, `news_status`, ...) are tested offline against
//!   `serde_json::json!` fixtures; the HTTP halves against `httpmock` in `tests/`.
pub mod bills;
pub mod parties;
