// src/features/extract.rs
//! Named numeric fields pulled out of parsed bill attributes. This is the
//! one place where an absent seat count or probability becomes zero.

use crate::bill::SeatCounts;
use crate::config::consts::{DOC_PROB_COLUMN, PARTY_CONSERVATIVE, PARTY_LABOUR, PARTY_LIBDEM};
use crate::config::options::SlotPolicy;
use crate::error::FeatureError;

/// Output column → party key in the seat-count mapping.
pub const SEAT_FEATURES: [(&str, &str); 3] = [
    ("Labour_seats", PARTY_LABOUR),
    ("Conservative_seats", PARTY_CONSERVATIVE),
    ("LibDem_seats", PARTY_LIBDEM),
];

pub fn seat_feature_names() -> Vec<String> {
    SEAT_FEATURES.iter().map(|(name, _)| s!(*name)).collect()
}

/// Three seat counts, zero for an absent mapping or party.
pub fn seat_features(counts: Option<&SeatCounts>) -> [f64; 3] {
    SEAT_FEATURES.map(|(_, party)| counts.and_then(|c| c.get(party)).unwrap_or(0) as f64)
}

/// `doc_prob1..doc_probN`
pub fn slot_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{DOC_PROB_COLUMN}{i}")).collect()
}

/// Exactly `n` probability slots.
///
/// `Pad`: missing slots are zero, extra values ignored.
/// `Strict`: fewer than `n` values (including none) is an error.
pub fn prob_slots(id: &str, probs: Option<&[f64]>, n: usize, policy: SlotPolicy) -> Result<Vec<f64>, FeatureError> {
    let probs = probs.unwrap_or(&[]);
    if policy == SlotPolicy::Strict && probs.len() < n {
        return Err(FeatureError::ProbsTooShort { id: s!(id), expected: n, got: probs.len() });
    }
    let mut out: Vec<f64> = probs.iter().copied().take(n).collect();
    out.resize(n, 0.0);
    Ok(out)
}

/// Final element only (the positive-class probability).
pub fn last_prob(id: &str, probs: Option<&[f64]>) -> Result<f64, FeatureError> {
    probs
        .and_then(|p| p.last().copied())
        .ok_or_else(|| FeatureError::ProbsEmpty { id: s!(id) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_default_to_zero() {
        let counts: SeatCounts = [("Labour", 353), ("Conservative", 196)].into_iter().collect();
        assert_eq!(seat_features(Some(&counts)), [353.0, 196.0, 0.0]);
        assert_eq!(seat_features(None), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn slots_pad_and_strict() {
        let p = [0.1, 0.2];
        assert_eq!(prob_slots("1", Some(&p), 4, SlotPolicy::Pad).unwrap(), vec![0.1, 0.2, 0.0, 0.0]);
        assert_eq!(prob_slots("1", None, 2, SlotPolicy::Pad).unwrap(), vec![0.0, 0.0]);
        assert_eq!(
            prob_slots("1", Some(&[0.1, 0.2, 0.3, 0.4, 0.5]), 4, SlotPolicy::Strict).unwrap(),
            vec![0.1, 0.2, 0.3, 0.4]
        );
        let err = prob_slots("9", Some(&p), 4, SlotPolicy::Strict).unwrap_err();
        assert_eq!(err, FeatureError::ProbsTooShort { id: s!("9"), expected: 4, got: 2 });
        assert_eq!(slot_names(2), vec!["doc_prob1", "doc_prob2"]);
    }

    #[test]
    fn last_element() {
        assert_eq!(last_prob("1", Some(&[0.1, 0.2, 0.3, 0.7])).unwrap(), 0.7);
        assert!(last_prob("1", Some(&[])).is_err());
        assert!(last_prob("1", None).is_err());
    }
}
