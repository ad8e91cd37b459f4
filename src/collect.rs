// src/collect.rs
//! Sequential bill collector.
//!
//! For each id, in order: bill document → progress → sponsor → introduced date
//! → formatted date → seat counts. A bill whose document cannot be fetched is
//! dropped; any later failure only leaves that field unset. Rows are appended
//! to the output every `checkpoint_every` bills together with a [`Cursor`], so
//! an interrupted run can be picked up with `resume`.

use std::path::{Path, PathBuf};

use crate::config::options::{BillSelector, CollectOptions, DateStrategy, ExportOptions, ProgressStrategy};
use crate::core::dates::format_date_for_api;
use crate::core::net::ApiClient;
use crate::core::sanitize::parse_id;
use crate::error::{Error, FetchError, Result};
use crate::file::{append_rows, read_table, write_table_with};
use crate::progress::Progress;
use crate::specs::bills::{self, BillInfo};
use crate::specs::parties;
use crate::store::Cursor;
use crate::table::{DataSet, Row};

/// Summary of what was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectSummary {
    pub out: PathBuf,
    pub processed: usize,
    pub written: usize,
    pub skipped: Vec<u32>,
    pub resumed_after: Option<u32>,
}

/* ---------------- Bill ids ---------------- */

/// `"1-3,7, 9-10"` → `[1, 2, 3, 7, 9, 10]` (sorted, unique).
pub fn parse_ids_list(s: &str) -> Result<Vec<u32>> {
    let bad = |part: &str| Error::Invalid(format!("Invalid id or range: {part}"));
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() { continue; }
        if let Some(dash) = part.find('-') {
            let a: u32 = part[..dash].trim().parse().map_err(|_| bad(part))?;
            let b: u32 = part[dash + 1..].trim().parse().map_err(|_| bad(part))?;
            if a > b { return Err(Error::Invalid(format!("Invalid range: {part}"))); }
            out.extend(a..=b);
        } else {
            out.push(part.parse().map_err(|_| bad(part))?);
        }
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

/// Union of an id column across files; non-numeric ids are skipped with a warning.
pub fn ids_from_files(files: &[PathBuf], column: &str) -> Result<Vec<u32>> {
    let mut out = Vec::new();
    for path in files {
        let table = read_table(path)?;
        let col = table.require(column)?;
        for row in &table.rows {
            let Some(raw) = row[col].as_deref() else { continue };
            match parse_id(raw) {
                Some(id) => out.push(id),
                None => logw!("{}: skipping non-numeric id {raw:?}", path.display()),
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

pub fn resolve_ids(selector: &BillSelector) -> Result<Vec<u32>> {
    match selector {
        BillSelector::Ids(ids) => {
            let mut ids = ids.clone();
            ids.sort_unstable();
            ids.dedup();
            Ok(ids)
        }
        BillSelector::FromFiles { files, column } => ids_from_files(files, column),
    }
}

/* ---------------- One bill ---------------- */

/// Collect everything for one bill. Only the bill document itself is fatal.
pub fn collect_one(client: &ApiClient, bill_id: u32, opts: &CollectOptions) -> std::result::Result<BillInfo, FetchError> {
    let data = bills::fetch_bill(client, bill_id)?;
    let mut info = BillInfo::from_json(bill_id, &data);

    info.progress_status = match opts.progress {
        ProgressStrategy::IsAct => Some(bills::is_act_status(&data)),
        ProgressStrategy::News => bills::fetch_news_status(client, bill_id)
            .map_err(|e| logw!("bill {bill_id}: progress unknown: {e}"))
            .ok(),
    };

    info.introduced_date = match opts.date {
        DateStrategy::LastUpdate => bills::last_update(&data),
        DateStrategy::CurrentStage => bills::current_stage_date(&data),
        DateStrategy::FirstStage => bills::fetch_first_stage_date(client, bill_id)
            .map_err(|e| logw!("bill {bill_id}: stages unavailable: {e}"))
            .ok()
            .flatten(),
    };

    info.formatted_date = info.introduced_date.as_deref().and_then(|raw| {
        format_date_for_api(raw)
            .map_err(|e| logw!("bill {bill_id}: {e}"))
            .ok()
    });

    if let Some(date) = info.formatted_date.as_deref() {
        info.seat_counts = parties::fetch_seat_counts(client, date)
            .map_err(|e| logw!("bill {bill_id}: seat counts unavailable: {e}"))
            .ok();
    }

    logd!("bill {bill_id}: {:?} / {} / {:?}", info.progress_status, info.sponsor_party, info.formatted_date);
    Ok(info)
}

/* ---------------- Loop ---------------- */

struct Sink<'a> {
    out: &'a Path,
    headers: Vec<String>,
    delim: u8,
    buffer: Vec<Row>,
    cursor: Cursor,
}

impl Sink<'_> {
    fn flush(&mut self) -> Result<()> {
        append_rows(self.out, &self.headers, &self.buffer, self.delim)?;
        self.cursor.written += self.buffer.len();
        self.buffer.clear();
        self.cursor.save(self.out)?;
        logd!("checkpoint: {} processed, {} written, last id {:?}",
            self.cursor.processed, self.cursor.written, self.cursor.last_id);
        Ok(())
    }
}

/// Top-level collect. `progress` can be None (no UI updates) or Some(&mut impl Progress).
pub fn collect(
    opts: &CollectOptions,
    export: &ExportOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<CollectSummary> {
    let ids = resolve_ids(&opts.bills)?;
    let out = export.out_path();
    let headers = BillInfo::headers();

    let cursor = if opts.resume {
        let loaded = Cursor::load(&out)?;
        if loaded.is_none() {
            logw!("no cursor next to {}; starting from the first id", out.display());
        }
        loaded.unwrap_or_default()
    } else {
        Cursor::default()
    };
    let resumed_after = cursor.last_id;
    let todo = cursor.remaining(&ids).to_vec();

    if resumed_after.is_none() {
        // fresh output: header only
        Cursor::remove(&out)?;
        write_table_with(&out, &DataSet::with_headers(headers.clone()), export.delim())?;
    }

    if let Some(p) = progress.as_deref_mut() {
        match resumed_after {
            Some(last) => p.log(&format!("Resuming after bill {last}: {} of {} ids left", todo.len(), ids.len())),
            None => p.log(&format!("Collecting {} bills into {}", todo.len(), out.display())),
        }
        p.begin(todo.len());
    }

    let client = ApiClient::new(&opts.api)?;
    let mut sink = Sink { out: &out, headers, delim: export.delim(), buffer: Vec::new(), cursor };
    let mut skipped = Vec::new();

    for (i, &id) in todo.iter().enumerate() {
        match collect_one(&client, id, opts) {
            Ok(info) => {
                sink.buffer.push(info.to_row());
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(id);
                }
            }
            Err(e) => {
                logw!("bill {id}: skipped: {e}");
                skipped.push(id);
                if let Some(p) = progress.as_deref_mut() {
                    p.item_skipped(id, &e.to_string());
                }
            }
        }
        sink.cursor.processed += 1;
        sink.cursor.last_id = Some(id);

        if opts.checkpoint_every > 0 && (i + 1) % opts.checkpoint_every == 0 {
            sink.flush()?;
        }
    }
    sink.flush()?;

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    logf!("collected {} bills ({} skipped) into {}", sink.cursor.written, skipped.len(), out.display());

    Ok(CollectSummary {
        processed: sink.cursor.processed,
        written: sink.cursor.written,
        skipped,
        resumed_after,
        out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_list_ranges() {
        assert_eq!(parse_ids_list("1-3,7, 9-10").unwrap(), vec![1, 2, 3, 7, 9, 10]);
        assert_eq!(parse_ids_list("5,5,4").unwrap(), vec![4, 5]);
        assert!(parse_ids_list("3-1").is_err());
        assert!(parse_ids_list("x").is_err());
        assert!(parse_ids_list("").unwrap().is_empty());
    }

    #[test]
    fn ids_from_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "Bill Id,Title\n12,x\n3.0,y\nabc,z\n").unwrap();
        std::fs::write(&b, "Title,Bill Id\nq, 12 \nr,40\ns,\n").unwrap();
        let ids = ids_from_files(&[a, b], "Bill Id").unwrap();
        assert_eq!(ids, vec![3, 12, 40]);
    }
}
