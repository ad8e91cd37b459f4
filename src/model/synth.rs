// src/model/synth.rs
//! Synthetic bills for the `demo` evaluation: seat counts drawn around a
//! fixed parliament, label = Act iff the sponsor is Labour.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::bill::{BillRecord, ProgressStatus, SeatCounts};
use crate::config::consts::{PARTY_CONSERVATIVE, PARTY_LABOUR, PARTY_LIBDEM};
use crate::error::{Error, Result};

const PARTIES: [&str; 3] = [PARTY_LABOUR, PARTY_CONSERVATIVE, PARTY_LIBDEM];

fn normal(mean: f64, sd: f64) -> Result<Normal<f64>> {
    Normal::new(mean, sd).map_err(|e| Error::Invalid(format!("normal({mean}, {sd}): {e}")))
}

fn record(id: usize, labour: u32, conservative: u32, libdem: u32, sponsor: &str, status: ProgressStatus) -> BillRecord {
    let seats: SeatCounts = [(PARTY_LABOUR, labour), (PARTY_CONSERVATIVE, conservative), (PARTY_LIBDEM, libdem)]
        .into_iter()
        .collect();
    BillRecord {
        id: id.to_string(),
        status: Some(status),
        sponsor_party: Some(s!(sponsor)),
        seat_counts: Some(seats),
        ..Default::default()
    }
}

/// `n` bills, ids starting at `first_id`.
pub fn synthetic_bills(n: usize, first_id: usize, seed: u64) -> Result<Vec<BillRecord>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (lab, con, lib) = (normal(350.0, 10.0)?, normal(200.0, 10.0)?, normal(60.0, 5.0)?);

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let sponsor = PARTIES.choose(&mut rng).copied().unwrap_or(PARTY_LABOUR);
        let seats = |d: &Normal<f64>, rng: &mut ChaCha8Rng| d.sample(rng).round().max(0.0) as u32;
        let (l, c, d) = (seats(&lab, &mut rng), seats(&con, &mut rng), seats(&lib, &mut rng));
        let status = if sponsor == PARTY_LABOUR { ProgressStatus::Act } else { ProgressStatus::InProgress };
        out.push(record(first_id + i, l, c, d, sponsor, status));
    }
    Ok(out)
}

/// A Labour bill that did not pass, with an unusual parliament.
pub fn outlier(id: usize) -> BillRecord {
    record(id, 400, 180, 70, PARTY_LABOUR, ProgressStatus::InProgress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_sponsor() {
        let bills = synthetic_bills(200, 1, 42).unwrap();
        assert_eq!(bills.len(), 200);
        for b in &bills {
            let labour = b.sponsor_party.as_deref() == Some(PARTY_LABOUR);
            assert_eq!(b.status == Some(ProgressStatus::Act), labour);
            let seats = b.seat_counts.as_ref().and_then(|s| s.get(PARTY_LABOUR)).unwrap();
            assert!((300..400).contains(&seats));
        }
        assert_eq!(synthetic_bills(5, 1, 7).unwrap(), synthetic_bills(5, 1, 7).unwrap());
    }
}
