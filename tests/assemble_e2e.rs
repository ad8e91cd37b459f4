// tests/assemble_e2e.rs
use std::fs;

use bill_scrape::bill::{BillRecord, RecordColumns};
use bill_scrape::config::options::{FeatureSet, ModelKind, SlotPolicy, TrainOptions};
use bill_scrape::features::parse::{parse_probs, parse_seat_counts, probs_or_empty, seat_counts_or_empty};
use bill_scrape::features::{Assembler, assemble_numeric};
use bill_scrape::file::read_table;
use bill_scrape::runner::{TrainRequest, train};
use bill_scrape::{cells, cols};
use bill_scrape::table::DataSet;

const SEATS: &str = "{'Labour': 353, 'Conservative': 196, 'Liberal Democrat': 63}";

#[test]
fn literal_and_array_parsing() {
    let seats = parse_seat_counts(Some(SEATS)).unwrap().unwrap();
    assert_eq!(seats.get("Liberal Democrat"), Some(63));
    assert!(seat_counts_or_empty(Some("{'Labour': ")).is_empty());

    assert_eq!(parse_probs(Some("[0.1 0.2 0.3 0.7]")).unwrap(), Some(vec![0.1, 0.2, 0.3, 0.7]));
    assert_eq!(probs_or_empty(Some("[0.1 x]")), Vec::<f64>::new());
}

#[test]
fn labour_sample_end_to_end() {
    let table = DataSet::new(
        cols!["bill_id", "progress_status", "sponsor_party", "seat_counts", "doc_prob"],
        vec![
            cells!["101", "2", "Labour", SEATS, "[0.1 0.2 0.3 0.7]"],
            cells!["102", "1", "Conservative", SEATS, "[0.6 0.1 0.2 0.1]"],
            cells!["103", "3", "Liberal Democrat", SEATS, "[0.2 0.2 0.2 0.4]"],
        ],
    );
    let records = BillRecord::from_table(&table, &RecordColumns::default()).unwrap();
    let assembled = Assembler::default().fit(&records).unwrap();
    let m = &assembled.matrix;

    assert_eq!(m.ids, vec!["101", "102"]);
    assert_eq!(m.value(0, "Labour_seats"), Some(353.0));
    assert_eq!(m.value(0, "Conservative_seats"), Some(196.0));
    assert_eq!(m.value(0, "LibDem_seats"), Some(63.0));
    assert_eq!(m.value(0, "doc_prob4"), Some(0.7));
    assert_eq!(assembled.encoder.reference(), Some("Labour"));
    assert_eq!(m.value(0, "sponsor_party_Conservative"), Some(0.0));
    assert_eq!(m.value(1, "sponsor_party_Conservative"), Some(1.0));
    assert!(!m.columns.contains(&"sponsor_party_Labour".to_string()));
}

#[test]
fn strict_slots_abort_on_short_vectors() {
    let table = DataSet::new(
        cols!["bill_id", "progress_status", "sponsor_party", "doc_prob"],
        vec![cells!["1", "2", "Labour", "[0.3 0.7]"], cells!["2", "1", "Conservative", "[0.1 0.2 0.3 0.4]"]],
    );
    let records = BillRecord::from_table(&table, &RecordColumns::default()).unwrap();

    let padded = Assembler::default().fit(&records).unwrap();
    assert_eq!(padded.matrix.value(0, "doc_prob3"), Some(0.0));

    let strict = Assembler { slots: SlotPolicy::Strict, ..Default::default() };
    assert!(strict.fit(&records).is_err());

    let last = Assembler { features: FeatureSet::SeatsLastProb, ..Default::default() };
    assert_eq!(last.fit(&records).unwrap().matrix.value(0, "doc_prob"), Some(0.7));
}

#[test]
fn numeric_tables_reduce_arrays_to_last_element() {
    let table = DataSet::new(
        cols!["bill_id", "RF_Probability", "doc_probs", "status"],
        vec![
            cells!["1", "0.9", "[0.2 0.8]", "2"],
            vec![Some("2".into()), None, Some("[0.6 0.4]".into()), Some("1".into())],
            cells!["3", "0.5", "[0.5 0.5]", ""],
        ],
    );
    let m = assemble_numeric(&table, "bill_id", "status").unwrap();
    assert_eq!(m.columns, vec!["RF_Probability", "doc_probs"]);
    assert_eq!(m.n_rows(), 2);
    assert_eq!(m.value(0, "doc_probs"), Some(0.8));
    assert_eq!(m.value(1, "RF_Probability"), Some(0.0));
}

fn bills_csv(n: usize) -> String {
    let mut text = String::from("bill_id,progress_status,sponsor_party,seat_counts,doc_prob\n");
    for i in 0..n {
        let (party, status, p) = match i % 3 {
            0 => ("Labour", 2, "[0.1 0.2 0.3 0.9]"),
            1 => ("Conservative", 1, "[0.4 0.3 0.2 0.1]"),
            _ => ("Liberal Democrat", 1, "[0.5 0.2 0.2 0.2]"),
        };
        text.push_str(&format!("{i},{status},{party},\"{SEATS}\",{p}\n"));
    }
    text
}

#[test]
fn train_writes_predictions_report_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bills.csv");
    fs::write(&data, bills_csv(60)).unwrap();

    let mut req = TrainRequest::new(&data);
    req.options = TrainOptions { model: ModelKind::Logistic, ..Default::default() };
    req.predictions = Some(dir.path().join("predictions_lr.csv"));
    req.test_report = Some(dir.path().join("test_predictions.csv"));
    req.model_out = Some(dir.path().join("model.json"));

    let summary = train(&req).unwrap();
    assert_eq!((summary.n_train, summary.n_test), (48, 12));
    assert!(summary.evaluation.accuracy > 0.9);
    assert_eq!(summary.written.len(), 3);

    // logistic regression scores every labelled bill
    let preds = read_table(req.predictions.as_ref().unwrap()).unwrap();
    assert_eq!(preds.headers, cols!["bill_id", "LogReg_Probability"]);
    assert_eq!(preds.len(), 60);

    let report = read_table(req.test_report.as_ref().unwrap()).unwrap();
    assert_eq!(report.len(), 12);
    assert_eq!(report.headers.last().map(String::as_str), Some("Prediction_Correct"));
}

#[test]
fn forest_predicts_test_rows_only() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bills.csv");
    fs::write(&data, bills_csv(30)).unwrap();

    let mut req = TrainRequest::new(&data);
    req.options = TrainOptions { model: ModelKind::Forest, forest_trees: 10, ..Default::default() };
    req.predictions = Some(dir.path().join("predictions_rf.csv"));

    let summary = train(&req).unwrap();
    let preds = read_table(req.predictions.as_ref().unwrap()).unwrap();
    assert_eq!(preds.headers, cols!["bill_id", "RF_Probability"]);
    assert_eq!(preds.len(), summary.n_test);
}
