// src/config/options.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AppOptions {
    pub collect: CollectOptions,
    pub export: ExportOptions,
    pub train: TrainOptions,
}

/* ---------------- Collect ---------------- */

/// Where a bill's "introduced date" comes from. The sources disagree, so each
/// heuristic stays a named strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DateStrategy {
    /// Top-level `lastUpdate` field of the bill.
    #[default]
    LastUpdate,
    /// First sitting of the bill's current stage.
    CurrentStage,
    /// First sitting of the first stage (extra request to `/Stages`).
    FirstStage,
}

/// How the progress label is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ProgressStrategy {
    /// `isAct` flag on the bill.
    #[default]
    IsAct,
    /// Keyword search over the bill's news articles.
    News,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BillSelector {
    Ids(Vec<u32>),
    FromFiles { files: Vec<PathBuf>, column: String },
}

impl Default for BillSelector {
    fn default() -> Self {
        BillSelector::Ids(Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiOptions {
    pub bills_base: String,
    pub members_base: String,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            bills_base: s!(BILLS_API_BASE),
            members_base: s!(MEMBERS_API_BASE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectOptions {
    pub bills: BillSelector,
    pub date: DateStrategy,
    pub progress: ProgressStrategy,
    pub api: ApiOptions,
    pub resume: bool,
    pub checkpoint_every: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            bills: BillSelector::default(),
            date: DateStrategy::default(),
            progress: ProgressStrategy::default(),
            api: ApiOptions::default(),
            resume: false,
            checkpoint_every: CHECKPOINT_EVERY,
        }
    }
}

/* ---------------- Export ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> u8 {
        match self { ExportFormat::Csv => b',', ExportFormat::Tsv => b'\t' }
    }

    /// Guess from a path's extension; anything but `.tsv`/`.tab` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
            Some(e) if e == "tsv" || e == "tab" => ExportFormat::Tsv,
            _ => ExportFormat::Csv,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPath {
    dir: PathBuf,
    file_stem: OsString, // without extension
    ext: Option<OsString>, // user-pasted extension wins over the format's
}

impl Default for OutputPath {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUT_DIR),
            file_stem: OsString::from(DEFAULT_BILLS_FILE),
            ext: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    out_path: OutputPath,
}

impl ExportOptions {
    pub fn out_path(&self) -> PathBuf {
        let mut path = self.out_path.dir.clone();
        let stem = self.out_path.file_stem.to_string_lossy();
        let ext = match &self.out_path.ext {
            Some(e) => e.to_string_lossy().into_owned(),
            None => s!(self.format.ext()),
        };
        path.push(join!(stem, ".", &ext));
        path
    }

    /// Split user text into dir + stem (+ extension, kept if given).
    pub fn set_path(&mut self, text: &str) {
        let p = Path::new(text.trim());
        if let Some(parent) = p.parent() {
            self.out_path.dir = parent.to_path_buf();
        }
        if let Some(stem) = p.file_stem() {
            self.out_path.file_stem = stem.to_os_string();
        }
        self.out_path.ext = p.extension().map(|e| e.to_os_string());
        if self.out_path.ext.is_some() {
            self.format = ExportFormat::from_path(p);
        }
    }

    /// Keep stem and format, move to `dir`.
    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.out_path.dir = dir.into();
    }

    /// Same directory and format, different stem (for sibling outputs).
    pub fn sibling(&self, stem: &str) -> PathBuf {
        let mut other = self.clone();
        other.out_path.file_stem = OsString::from(stem);
        other.out_path()
    }

    pub fn delim(&self) -> u8 {
        self.format.delim()
    }
}

/* ---------------- Train ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelKind {
    #[default]
    Logistic,
    Forest,
}

impl ModelKind {
    /// Column name for P(Act) in prediction files.
    pub fn probability_column(&self) -> &'static str {
        match self {
            ModelKind::Logistic => "LogReg_Probability",
            ModelKind::Forest => "RF_Probability",
        }
    }
}

/// Which rows go into the predictions file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PredictScope {
    /// Every labelled row (deduplicated by bill id).
    All,
    /// Held-out rows only.
    Test,
}

impl ModelKind {
    /// Logistic regression scores every bill, the forest only its test rows.
    pub fn default_scope(&self) -> PredictScope {
        match self {
            ModelKind::Logistic => PredictScope::All,
            ModelKind::Forest => PredictScope::Test,
        }
    }
}

/// Which columns the assembler derives from a bill record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum FeatureSet {
    /// Three seat counts + sponsor party.
    Seats,
    /// Seats + sponsor + four doc_prob slots.
    #[default]
    SeatsProbs,
    /// Seats + sponsor + the last doc_prob element only.
    SeatsLastProb,
}

/// What to do when a probability vector does not have the expected arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SlotPolicy {
    /// Zero-fill missing slots, ignore extras.
    #[default]
    Pad,
    /// Short vectors are an error (fixed-arity unpacking).
    Strict,
}

/// Which category becomes the dropped reference column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CategoryOrder {
    /// First value encountered in the training column.
    #[default]
    FirstSeen,
    /// Lexicographically smallest value.
    Sorted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainOptions {
    pub model: ModelKind,
    pub features: FeatureSet,
    pub slots: SlotPolicy,
    pub categories: CategoryOrder,
    pub test_size: f64,
    pub split_seed: u64,
    pub forest_seed: u64,
    pub forest_trees: usize,
    pub max_iter: usize,
    pub predict_on: Option<PredictScope>,
}

impl TrainOptions {
    pub fn scope(&self) -> PredictScope {
        self.predict_on.unwrap_or_else(|| self.model.default_scope())
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            features: FeatureSet::default(),
            slots: SlotPolicy::default(),
            categories: CategoryOrder::default(),
            test_size: TEST_SIZE,
            split_seed: SPLIT_SEED,
            forest_seed: FOREST_SEED,
            forest_trees: FOREST_TREES,
            max_iter: LOGISTIC_MAX_ITER,
            predict_on: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_out_path_follows_format() {
        let mut export = ExportOptions::default();
        assert!(export.out_path().to_string_lossy().ends_with("bills_data.csv"));
        export.format = ExportFormat::Tsv;
        assert!(export.out_path().to_string_lossy().ends_with("bills_data.tsv"));
    }

    #[test]
    fn user_extension_is_kept() {
        let mut export = ExportOptions::default();
        export.set_path("data/hello.tsv");
        assert_eq!(export.format, ExportFormat::Tsv);
        assert_eq!(export.out_path(), PathBuf::from("data").join("hello.tsv"));
        assert_eq!(export.sibling("other"), PathBuf::from("data").join("other.tsv"));
    }
}
