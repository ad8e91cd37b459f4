// src/runner.rs
//! Pipeline stages behind the CLI subcommands: join, merge-and-split of
//! probability files, train, predict, demo. Collection lives in `collect`.

use std::path::{Path, PathBuf};

use ndarray::Array1;

use crate::bill::{BillRecord, ProgressStatus, RecordColumns};
use crate::config::consts::*;
use crate::config::options::{ExportOptions, FeatureSet, ModelKind, PredictScope, TrainOptions};
use crate::error::{Error, Result};
use crate::features::{Assembler, FeatureMatrix, FeatureSchema, assemble_numeric};
use crate::file::{read_table, write_table, write_table_with};
use crate::model::split::train_test_split;
use crate::model::{Classifier, Evaluation, FeatureMode, Model, RandomForest, TrainedModel, evaluate, is_act, synth};
use crate::table::{DataSet, JoinHow};

/* ---------------- Join ---------------- */

#[derive(Clone, Debug)]
pub struct JoinRequest {
    pub left: PathBuf,
    /// Concatenated before joining.
    pub right: Vec<PathBuf>,
    pub on: String,
    pub right_on: Option<String>,
    pub how: JoinHow,
    /// Applied to the right table before the join (missing names are ignored).
    pub rename: Vec<(String, String)>,
    /// Right-table columns to bring over; empty means all.
    pub keep: Vec<String>,
    pub dedup: bool,
    pub drop: Vec<String>,
    pub out: PathBuf,
}

pub fn join_files(req: &JoinRequest) -> Result<DataSet> {
    let left = read_table(&req.left)?;
    let parts = req.right.iter().map(|p| read_table(p)).collect::<Result<Vec<_>>>()?;
    if parts.is_empty() {
        return Err(Error::Invalid(s!("join needs at least one right-hand file")));
    }
    let mut right = DataSet::concat(&parts);

    for (from, to) in &req.rename {
        if right.column(from).is_some() {
            right.rename_column(from, to)?;
        }
    }

    let right_on = req.right_on.as_deref().unwrap_or(&req.on);
    if !req.keep.is_empty() {
        let mut names = vec![right_on];
        names.extend(req.keep.iter().map(String::as_str).filter(|k| *k != right_on));
        right = right.select_columns(&names)?;
    }

    let mut out = left.join(&right, &req.on, right_on, req.how)?;
    if req.dedup {
        let dropped = out.dedup_by(&req.on)?;
        if dropped > 0 {
            logf!("dropped {dropped} rows with a repeated {}", req.on);
        }
    }
    for col in &req.drop {
        out.drop_column(col)?;
    }

    write_table(&req.out, &out)?;
    logf!("joined {} + {} rows into {} rows at {}", left.len(), right.len(), out.len(), req.out.display());
    Ok(out)
}

/* ---------------- Merge + split of probability files ---------------- */

#[derive(Clone, Debug)]
pub struct SplitRequest {
    /// Per-model prediction files (`bill_id` + one probability column each).
    pub predictions: Vec<PathBuf>,
    /// Text-probability files tagged `training` / `validation`.
    pub training: Vec<PathBuf>,
    pub validation: Vec<PathBuf>,
    pub text_id_column: String,
    pub text_probs_column: String,
    /// Optional file with `bill_id` + a status column, attached to both outputs.
    pub status: Option<PathBuf>,
    pub status_column: String,
    pub merged_out: Option<PathBuf>,
    /// Output directory and format; file stems are fixed.
    pub export: ExportOptions,
}

impl Default for SplitRequest {
    fn default() -> Self {
        Self {
            predictions: Vec::new(),
            training: Vec::new(),
            validation: Vec::new(),
            text_id_column: s!(TEXT_ID_COLUMN),
            text_probs_column: s!(TEXT_PROBS_COLUMN),
            status: None,
            status_column: s!(LABEL_COLUMN),
            merged_out: None,
            export: ExportOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSummary {
    pub merged_rows: usize,
    /// Bills with no text probabilities, left out of both outputs.
    pub untagged: usize,
    pub written: Vec<(PathBuf, usize)>,
}

/// Outer join of all prediction files on `bill_id`.
pub fn merge_predictions(files: &[PathBuf]) -> Result<DataSet> {
    let mut iter = files.iter();
    let first = iter.next().ok_or_else(|| Error::Invalid(s!("no prediction files given")))?;
    let mut merged = read_table(first)?;
    for path in iter {
        merged = merged.join(&read_table(path)?, ID_COLUMN, ID_COLUMN, JoinHow::Outer)?;
    }
    Ok(merged)
}

/// Id + probability columns of every text file, with a `split` tag column.
pub fn tag_text_probabilities(training: &[PathBuf], validation: &[PathBuf], id_col: &str, probs_col: &str) -> Result<DataSet> {
    let mut parts = Vec::new();
    for (tag, files) in [(SPLIT_TRAINING, training), (SPLIT_VALIDATION, validation)] {
        for path in files {
            let mut part = read_table(path)?.select_columns(&[id_col, probs_col])?;
            part.add_constant_column(SPLIT_COLUMN, tag);
            parts.push(part);
        }
    }
    Ok(DataSet::concat(&parts))
}

pub fn split_probabilities(req: &SplitRequest) -> Result<SplitSummary> {
    let merged = merge_predictions(&req.predictions)?;
    if let Some(path) = &req.merged_out {
        write_table(path, &merged)?;
    }

    let tagged = tag_text_probabilities(&req.training, &req.validation, &req.text_id_column, &req.text_probs_column)?;
    let mut full = merged.join(&tagged, ID_COLUMN, &req.text_id_column, JoinHow::Left)?;
    if req.text_id_column != ID_COLUMN {
        full.drop_column(&req.text_id_column)?;
    }

    let status = match &req.status {
        Some(path) => Some(read_table(path)?.select_columns(&[ID_COLUMN, &req.status_column])?),
        None => None,
    };

    let part_headers: Vec<String> = full.headers.iter().filter(|h| *h != SPLIT_COLUMN).cloned().collect();
    let mut groups = full.partition(SPLIT_COLUMN)?;
    let untagged = groups.shift_remove("").map(|g| g.len()).unwrap_or(0);
    if untagged > 0 {
        logw!("{untagged} bills have no text probabilities and are left out");
    }

    let mut written = Vec::new();
    for (tag, stem) in [(SPLIT_TRAINING, DEFAULT_TRAINING_FILE), (SPLIT_VALIDATION, DEFAULT_VALIDATION_FILE)] {
        let mut part = groups
            .shift_remove(tag)
            .unwrap_or_else(|| DataSet::with_headers(part_headers.clone()));
        if let Some(st) = &status {
            part = part.join(st, ID_COLUMN, ID_COLUMN, JoinHow::Left)?;
        }
        let path = req.export.sibling(stem);
        write_table_with(&path, &part, req.export.delim())?;
        logf!("{tag}: {} rows → {}", part.len(), path.display());
        written.push((path, part.len()));
    }
    for (tag, rest) in &groups {
        logw!("ignoring {} rows tagged {tag:?}", rest.len());
    }

    Ok(SplitSummary { merged_rows: merged.len(), untagged, written })
}

/* ---------------- Train ---------------- */

#[derive(Clone, Debug)]
pub struct TrainRequest {
    pub data: PathBuf,
    /// Separate validation table; switches to prepared numeric-column mode.
    pub valid: Option<PathBuf>,
    pub columns: RecordColumns,
    /// Label column in numeric mode.
    pub label_column: String,
    pub options: TrainOptions,
    pub predictions: Option<PathBuf>,
    pub test_report: Option<PathBuf>,
    pub model_out: Option<PathBuf>,
}

impl TrainRequest {
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            valid: None,
            columns: RecordColumns::default(),
            label_column: s!(LABEL_COLUMN),
            options: TrainOptions::default(),
            predictions: None,
            test_report: None,
            model_out: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub model: ModelKind,
    pub columns: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub train_accuracy: f64,
    pub evaluation: Evaluation,
    /// Held-out rows with true/predicted labels.
    pub test_report: DataSet,
    pub written: Vec<PathBuf>,
}

struct Prepared {
    train: FeatureMatrix,
    test: FeatureMatrix,
    schema: FeatureSchema,
    mode: FeatureMode,
}

fn prepare_records(req: &TrainRequest) -> Result<Prepared> {
    let opts = &req.options;
    let table = read_table(&req.data)?;
    let records = BillRecord::from_table(&table, &req.columns)?;
    let assembler = Assembler { features: opts.features, slots: opts.slots, categories: opts.categories };
    let assembled = assembler.fit(&records)?;

    let n = assembled.matrix.n_rows();
    if n < 2 {
        return Err(Error::Invalid(format!("need at least two labelled bills, found {n}")));
    }
    let (train_ix, test_ix) = train_test_split(n, opts.test_size, opts.split_seed);
    Ok(Prepared {
        train: assembled.matrix.select(&train_ix),
        test: assembled.matrix.select(&test_ix),
        schema: assembled.schema,
        mode: FeatureMode::Records(assembler),
    })
}

fn prepare_numeric(req: &TrainRequest, valid: &Path) -> Result<Prepared> {
    let id = &req.columns.id;
    let train = assemble_numeric(&read_table(&req.data)?, id, &req.label_column)?;
    let schema = FeatureSchema::new(train.columns.clone(), Vec::new());
    let test = schema.reconcile(assemble_numeric(&read_table(valid)?, id, &req.label_column)?);
    logf!("using features: {}", train.columns.join(", "));
    Ok(Prepared {
        train,
        test,
        schema,
        mode: FeatureMode::Numeric { id_column: id.clone(), label_column: req.label_column.clone() },
    })
}

/// `bill_id` + the model's probability column, first row per bill kept.
pub fn predictions_table(kind: ModelKind, ids: &[String], proba: &Array1<f64>) -> Result<DataSet> {
    let rows = ids.iter().zip(proba.iter()).map(|(id, p)| cells![id, p]).collect();
    let mut table = DataSet::new(cols![ID_COLUMN, kind.probability_column()], rows);
    table.dedup_by(ID_COLUMN)?;
    Ok(table)
}

/// Held-out rows as features + `True_Label`, `Predicted_Label`, `Prediction_Correct`.
pub fn test_report_table(m: &FeatureMatrix, eval: &Evaluation) -> DataSet {
    let mut headers = cols![ID_COLUMN];
    headers.extend(m.columns.iter().cloned());
    headers.extend(cols!["True_Label", "Predicted_Label", "Prediction_Correct"]);

    let mut table = DataSet::with_headers(headers);
    for (i, id) in m.ids.iter().enumerate() {
        let truth = m.labels.get(i).copied();
        let predicted = if eval.predicted[i] > 0.5 { ProgressStatus::Act } else { ProgressStatus::InProgress };
        let correct = if truth == Some(predicted) { "True" } else { "False" };

        let mut row = vec![Some(id.clone())];
        row.extend(m.values.row(i).iter().map(|v| Some(v.to_string())));
        row.push(truth.map(|t| t.to_string()));
        row.push(Some(predicted.to_string()));
        row.push(Some(s!(correct)));
        table.push_row(row);
    }
    table
}

/// First `n` report rows whose `Prediction_Correct` equals `correct`.
pub fn report_samples(report: &DataSet, correct: bool, n: usize) -> DataSet {
    let want = if correct { "True" } else { "False" };
    let ix = report.column("Prediction_Correct");
    let mut out = report.filter(|row| ix.and_then(|i| row.get(i)).and_then(|c| c.as_deref()) == Some(want));
    out.rows.truncate(n);
    out
}

pub fn train(req: &TrainRequest) -> Result<TrainSummary> {
    let opts = &req.options;
    let prepared = match &req.valid {
        Some(valid) => prepare_numeric(req, valid)?,
        None => prepare_records(req)?,
    };
    let Prepared { train, test, schema, mode } = prepared;
    logf!("training {:?} on {} rows, testing on {}", opts.model, train.n_rows(), test.n_rows());

    let mut model = Model::new(opts);
    model.fit(&train.values, &train.targets())?;

    let train_accuracy = evaluate(&model, &train)?.accuracy;
    let evaluation = evaluate(&model, &test)?;
    let test_report = test_report_table(&test, &evaluation);
    let mut written = Vec::new();

    if let Some(path) = &req.predictions {
        let table = match opts.scope() {
            PredictScope::Test => predictions_table(model.kind(), &test.ids, &evaluation.proba)?,
            PredictScope::All => {
                let ids: Vec<String> = train.ids.iter().chain(&test.ids).cloned().collect();
                let mut proba = model.predict_proba(&train.values)?.to_vec();
                proba.extend(evaluation.proba.iter());
                predictions_table(model.kind(), &ids, &Array1::from(proba))?
            }
        };
        write_table(path, &table)?;
        written.push(path.clone());
    }
    if let Some(path) = &req.test_report {
        write_table(path, &test_report)?;
        written.push(path.clone());
    }

    let kind = model.kind();
    let columns = schema.columns.clone();
    if let Some(path) = &req.model_out {
        TrainedModel { model, schema, mode }.save(path)?;
        written.push(path.clone());
    }

    Ok(TrainSummary {
        model: kind,
        columns,
        n_train: train.n_rows(),
        n_test: test.n_rows(),
        train_accuracy,
        evaluation,
        test_report,
        written,
    })
}

/* ---------------- Predict ---------------- */

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub status: ProgressStatus,
    pub p_act: f64,
}

fn record_assembler(trained: &TrainedModel) -> Result<Assembler> {
    match &trained.mode {
        FeatureMode::Records(assembler) => Ok(*assembler),
        FeatureMode::Numeric { .. } => Err(Error::Invalid(s!(
            "model was trained on a prepared numeric table; bill records cannot be encoded for it"
        ))),
    }
}

/// Records → matrix in the model's column order.
pub fn encode_for(trained: &TrainedModel, records: &[BillRecord]) -> Result<FeatureMatrix> {
    let assembler = record_assembler(trained)?;
    Ok(assembler.transform(records, &trained.schema)?)
}

pub fn predict_one(trained: &TrainedModel, sample: &BillRecord) -> Result<Prediction> {
    let m = encode_for(trained, std::slice::from_ref(sample))?;
    let p_act = trained.predict_proba(&m)?[0];
    let status = if is_act(p_act) { ProgressStatus::Act } else { ProgressStatus::InProgress };
    Ok(Prediction { status, p_act })
}

/// Score every bill of a table; writes `bill_id`, probability, predicted status.
pub fn predict_table(trained: &TrainedModel, input: &Path, columns: &RecordColumns, out: &Path) -> Result<DataSet> {
    let records = BillRecord::from_table(&read_table(input)?, columns)?;
    let m = encode_for(trained, &records)?;
    let proba = trained.predict_proba(&m)?;

    let rows = m
        .ids
        .iter()
        .zip(proba.iter())
        .map(|(id, &p)| {
            let status = if is_act(p) { ProgressStatus::Act } else { ProgressStatus::InProgress };
            cells![id, p, status]
        })
        .collect();
    let table = DataSet::new(cols![ID_COLUMN, trained.model.kind().probability_column(), "Predicted_Label"], rows);
    write_table(out, &table)?;
    Ok(table)
}

/* ---------------- Demo ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoRequest {
    pub n_train: usize,
    pub n_test: usize,
    pub seed: u64,
    pub trees: usize,
}

impl Default for DemoRequest {
    fn default() -> Self {
        Self { n_train: DEMO_TRAIN_SAMPLES, n_test: DEMO_TEST_SAMPLES, seed: DEMO_SEED, trees: FOREST_TREES }
    }
}

#[derive(Debug, Clone)]
pub struct DemoSummary {
    pub n_test: usize,
    pub evaluation: Evaluation,
    pub outlier: Prediction,
}

/// Synthetic seat counts, label Act iff the sponsor is Labour, plus one
/// Labour outlier that did not pass; forest on seats + sponsor.
pub fn demo(req: &DemoRequest) -> Result<DemoSummary> {
    let train = synth::synthetic_bills(req.n_train, 1, req.seed)?;
    let mut test = synth::synthetic_bills(req.n_test, req.n_train + 1, req.seed.wrapping_add(1))?;
    test.push(synth::outlier(req.n_train + req.n_test + 1));

    let assembler = Assembler { features: FeatureSet::Seats, ..Default::default() };
    let fitted = assembler.fit(&train)?;
    let test_m = assembler.transform(&test, &fitted.schema)?;

    let mut forest = RandomForest::with_trees(req.trees, req.seed);
    forest.fit(&fitted.matrix.values, &fitted.matrix.targets())?;
    let evaluation = evaluate(&forest, &test_m)?;

    let last = test_m.n_rows() - 1;
    let p_act = evaluation.proba[last];
    let outlier = Prediction {
        status: if is_act(p_act) { ProgressStatus::Act } else { ProgressStatus::InProgress },
        p_act,
    };
    logf!("demo: accuracy {:.4} on {} bills", evaluation.accuracy, test_m.n_rows());
    Ok(DemoSummary { n_test: test_m.n_rows(), evaluation, outlier })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::SeatCounts;
    use crate::model::ForestConfig;

    fn write(dir: &std::path::Path, name: &str, text: &str) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, text).unwrap();
        p
    }

    #[test]
    fn predictions_dedup_by_bill() {
        let ids = vec![s!("1"), s!("2"), s!("1")];
        let t = predictions_table(ModelKind::Logistic, &ids, &Array1::from(vec![0.25, 0.5, 0.75])).unwrap();
        assert_eq!(t.headers, cols!["bill_id", "LogReg_Probability"]);
        assert_eq!(t.rows, vec![cells!["1", 0.25], cells!["2", 0.5]]);
    }

    #[test]
    fn split_pipeline_partitions_and_attaches_status() {
        let dir = tempfile::tempdir().unwrap();
        let rf = write(dir.path(), "rf.csv", "bill_id,RF_Probability\n1,0.9\n2,0.1\n");
        let lr = write(dir.path(), "lr.csv", "bill_id,LogReg_Probability\n2,0.2\n3,0.8\n4,0.4\n");
        let tr = write(dir.path(), "tr.csv", "id,title,doc_probs\n1,a,[0.2 0.8]\n3,c,[0.6 0.4]\n");
        let va = write(dir.path(), "va.csv", "id,title,doc_probs\n2,b,[0.5 0.5]\n");
        let st = write(dir.path(), "status.csv", "bill_id,status,other\n1,2,x\n2,1,y\n3,1,z\n");

        let mut export = ExportOptions::default();
        export.set_path(&dir.path().join("ignored.csv").to_string_lossy());
        let req = SplitRequest {
            predictions: vec![rf, lr],
            training: vec![tr],
            validation: vec![va],
            status: Some(st),
            export,
            ..Default::default()
        };
        let summary = split_probabilities(&req).unwrap();
        assert_eq!(summary.merged_rows, 4);
        assert_eq!(summary.untagged, 1);

        let training = read_table(&summary.written[0].0).unwrap();
        assert_eq!(training.headers, cols!["bill_id", "RF_Probability", "LogReg_Probability", "doc_probs", "status"]);
        assert_eq!(training.len(), 2);
        assert_eq!(training.rows[0], vec![Some(s!("1")), Some(s!("0.9")), None, Some(s!("[0.2 0.8]")), Some(s!("2"))]);

        let validation = read_table(&summary.written[1].0).unwrap();
        assert_eq!(validation.len(), 1);
        assert_eq!(validation.rows[0][4].as_deref(), Some("1"));
    }

    #[test]
    fn predict_one_reconciles_reference_party() {
        let records: Vec<BillRecord> = (0..40)
            .map(|i| {
                let party = ["Labour", "Conservative", "Liberal Democrat"][i % 3];
                BillRecord {
                    id: i.to_string(),
                    status: Some(if party == "Labour" { ProgressStatus::Act } else { ProgressStatus::InProgress }),
                    sponsor_party: Some(s!(party)),
                    seat_counts: Some(SeatCounts::from_iter([("Labour", 350u32)])),
                    ..Default::default()
                }
            })
            .collect();
        let assembler = Assembler { features: FeatureSet::Seats, ..Default::default() };
        let fitted = assembler.fit(&records).unwrap();
        let config = ForestConfig { n_trees: 5, max_features: Some(5), bootstrap: false, ..Default::default() };
        let mut model = Model::Forest(RandomForest::new(config));
        model.fit(&fitted.matrix.values, &fitted.matrix.targets()).unwrap();
        let trained = TrainedModel { model, schema: fitted.schema, mode: FeatureMode::Records(assembler) };

        let sample = BillRecord {
            id: s!("new"),
            sponsor_party: Some(s!("Labour")),
            seat_counts: Some([("Labour", 353u32), ("Conservative", 196), ("Liberal Democrat", 63)].into_iter().collect()),
            ..Default::default()
        };
        let m = encode_for(&trained, std::slice::from_ref(&sample)).unwrap();
        assert_eq!(m.columns, trained.schema.columns);
        assert_eq!(m.value(0, "sponsor_party_Conservative"), Some(0.0));
        assert_eq!(predict_one(&trained, &sample).unwrap().status, ProgressStatus::Act);
    }

    #[test]
    fn small_demo_learns_the_rule() {
        let summary = demo(&DemoRequest { n_train: 200, n_test: 300, seed: 42, trees: 15 }).unwrap();
        assert_eq!(summary.n_test, 301);
        assert!(summary.evaluation.accuracy > 0.95);
        assert!((0.0..=1.0).contains(&summary.outlier.p_act));
    }
}
