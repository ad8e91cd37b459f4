// tests/join_dedup.rs
use std::fs;

use bill_scrape::file::read_table;
use bill_scrape::runner::{JoinRequest, join_files};
use bill_scrape::table::{DataSet, JoinHow};
use bill_scrape::{cells, cols};

#[test]
fn left_join_three_rows_two_matches() {
    let primary = DataSet::new(
        cols!["bill_id", "short_title"],
        vec![cells![1, "Alpha Bill"], cells![2, "Beta Bill"], cells![3, "Gamma Bill"]],
    );
    let secondary = DataSet::new(cols!["bill_id", "status"], vec![cells![1, 2], cells![3, 1]]);

    let out = primary.join(&secondary, "bill_id", "bill_id", JoinHow::Left).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out.headers, cols!["bill_id", "short_title", "status"]);
    assert_eq!(out.rows[1], vec![Some("2".into()), Some("Beta Bill".into()), None]);
}

#[test]
fn outer_join_keeps_both_sides() {
    let rf = DataSet::new(cols!["bill_id", "RF_Probability"], vec![cells![1, 0.9], cells![2, 0.3]]);
    let lr = DataSet::new(cols!["bill_id", "LogReg_Probability"], vec![cells![2, 0.4], cells![7, 0.6]]);
    let out = rf.join(&lr, "bill_id", "bill_id", JoinHow::Outer).unwrap();

    let ids: Vec<_> = out.rows.iter().map(|r| r[0].clone().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "7"]);
    assert_eq!(out.rows[0][2], None);
    assert_eq!(out.rows[2][1], None);
    assert_eq!(out.rows[2][2].as_deref(), Some("0.6"));
}

#[test]
fn dedup_after_many_to_many_keeps_first() {
    let left = DataSet::new(cols!["bill_id", "a"], vec![cells![5, "x"], cells![5, "y"]]);
    let right = DataSet::new(cols!["bill_id", "b"], vec![cells!["5.0", "p"], cells![5, "q"]]);
    let mut out = left.join(&right, "bill_id", "bill_id", JoinHow::Left).unwrap();
    assert_eq!(out.len(), 4);

    assert_eq!(out.dedup_by("bill_id").unwrap(), 3);
    assert_eq!(out.rows, vec![cells![5, "x", "p"]]);
}

#[test]
fn join_files_renames_keeps_and_drops() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("data.csv");
    let scored_a = dir.path().join("a_withTitleScores.csv");
    let scored_b = dir.path().join("b_withTitleScores.csv");
    let out = dir.path().join("joined.csv");
    fs::write(&main, "bill_id,title\n10,ten\n11,eleven\n12,twelve\n").unwrap();
    fs::write(&scored_a, "Bill Id,Status,doc_probs,noise\n10,2,[0.1 0.9],x\n").unwrap();
    fs::write(&scored_b, "Bill Id,Status,doc_probs,noise\n12,1,[0.7 0.3],y\n10,1,[0.5 0.5],z\n").unwrap();

    let req = JoinRequest {
        left: main,
        right: vec![scored_a, scored_b],
        on: "bill_id".into(),
        right_on: None,
        how: JoinHow::Left,
        rename: vec![
            ("Bill Id".into(), "bill_id".into()),
            ("Status".into(), "status".into()),
            ("doc_probs".into(), "doc_prob".into()),
        ],
        keep: vec!["status".into(), "doc_prob".into()],
        dedup: true,
        drop: vec!["title".into()],
        out: out.clone(),
    };
    let joined = join_files(&req).unwrap();
    assert_eq!(joined.headers, cols!["bill_id", "status", "doc_prob"]);
    assert_eq!(joined.len(), 3);

    let back = read_table(&out).unwrap();
    assert_eq!(back, joined);
    assert_eq!(back.rows[0], cells![10, 2, "[0.1 0.9]"]);
    assert_eq!(back.rows[1], vec![Some("11".into()), None, None]);
}
