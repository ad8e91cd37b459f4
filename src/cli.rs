// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};

use crate::bill::{BillRecord, RecordColumns, SeatCounts};
use crate::config::consts::*;
use crate::config::options::*;
use crate::core::net::ApiClient;
use crate::features::parse::parse_probs;
use crate::log::{self, Verbosity};
use crate::model::TrainedModel;
use crate::progress::Progress;
use crate::table::{DataSet, JoinHow};
use crate::{collect, runner};

/// Collect UK Parliament bills, assemble datasets, train outcome classifiers.
#[derive(Parser, Debug)]
#[command(name = "bill_scrape", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More stderr output (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug log file (default: .store/debug.log)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Do not write a debug log file
    #[arg(long, global = true, conflicts_with = "log_file")]
    no_log_file: bool,
}

#[derive(Args, Debug, Clone)]
struct ApiArgs {
    /// Bills API base URL
    #[arg(long, env = BILLS_API_ENV, default_value = BILLS_API_BASE)]
    bills_api: String,

    /// Members API base URL
    #[arg(long, env = MEMBERS_API_ENV, default_value = MEMBERS_API_BASE)]
    members_api: String,
}

impl ApiArgs {
    fn options(&self) -> ApiOptions {
        ApiOptions { bills_base: self.bills_api.clone(), members_base: self.members_api.clone() }
    }
}

#[derive(Args, Debug, Clone)]
struct HeuristicArgs {
    /// Where the introduced date comes from
    #[arg(long, value_enum, default_value = "last-update")]
    date: DateStrategy,

    /// How the progress label is derived
    #[arg(long, value_enum, default_value = "is-act")]
    progress: ProgressStrategy,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch bills one by one and write one row per bill
    Collect {
        /// Bill ids and ranges, e.g. "1-1000" or "5,7,9-12"
        #[arg(long, required_unless_present = "from_csv", conflicts_with = "from_csv")]
        ids: Option<String>,

        /// Take ids from a column of these CSV files
        #[arg(long, num_args = 1..)]
        from_csv: Vec<PathBuf>,

        /// Id column in --from-csv files
        #[arg(long, default_value = DEFAULT_ID_COLUMN)]
        id_column: String,

        /// Output file (default: out/bills_data.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Continue after the last bill recorded in the cursor file
        #[arg(long)]
        resume: bool,

        /// Append rows and save the cursor every N bills (0: only at the end)
        #[arg(long, default_value_t = CHECKPOINT_EVERY)]
        checkpoint_every: usize,

        #[command(flatten)]
        heuristics: HeuristicArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Look up a single bill and print what collect would record
    Bill {
        id: u32,

        #[command(flatten)]
        heuristics: HeuristicArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Join two tables on an id column
    Join {
        #[arg(long)]
        left: PathBuf,

        /// One or more files, stacked before joining
        #[arg(long, num_args = 1.., required = true)]
        right: Vec<PathBuf>,

        #[arg(long, default_value = ID_COLUMN)]
        on: String,

        /// Key column on the right side (default: same as --on)
        #[arg(long)]
        right_on: Option<String>,

        #[arg(long, value_enum, default_value = "left")]
        how: JoinHow,

        /// Rename right-hand columns first, FROM=TO
        #[arg(long, value_parser = parse_rename)]
        rename: Vec<(String, String)>,

        /// Right-hand columns to bring over (default: all)
        #[arg(long, num_args = 1..)]
        keep: Vec<String>,

        /// Keep only the first row per id after joining
        #[arg(long)]
        dedup: bool,

        /// Columns to drop from the result
        #[arg(long)]
        drop: Vec<String>,

        #[arg(short, long)]
        out: PathBuf,
    },

    /// Merge model predictions, attach text probabilities, split training/validation
    Split {
        /// Per-model prediction files (outer-joined on bill_id)
        #[arg(long, num_args = 1.., required = true)]
        predictions: Vec<PathBuf>,

        /// Text-probability files of the training split
        #[arg(long, num_args = 1..)]
        training: Vec<PathBuf>,

        /// Text-probability files of the validation split
        #[arg(long, num_args = 1..)]
        validation: Vec<PathBuf>,

        #[arg(long, default_value = TEXT_ID_COLUMN)]
        text_id_column: String,

        #[arg(long, default_value = TEXT_PROBS_COLUMN)]
        text_probs_column: String,

        /// File with bill_id + status to attach to both outputs
        #[arg(long)]
        status: Option<PathBuf>,

        #[arg(long, default_value = LABEL_COLUMN)]
        status_column: String,

        /// Also write the merged predictions here
        #[arg(long)]
        merged_out: Option<PathBuf>,

        #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Assemble features, fit a classifier, report held-out scores
    Train(TrainArgs),

    /// Score one bill (from flags) or every bill of a table with a saved model
    Predict {
        /// Model file written by `train --model-out`
        #[arg(long)]
        model: PathBuf,

        /// Table of bills to score (instead of the single-sample flags)
        #[arg(long, requires = "out")]
        input: Option<PathBuf>,

        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, default_value_t = 0)]
        labour: u32,

        #[arg(long, default_value_t = 0)]
        conservative: u32,

        #[arg(long, default_value_t = 0)]
        libdem: u32,

        #[arg(long)]
        sponsor: Option<String>,

        /// Probability array, e.g. "[0.1 0.2 0.3 0.7]"
        #[arg(long)]
        doc_probs: Option<String>,
    },

    /// Forest on synthetic bills (label: Act iff Labour sponsor) plus one outlier
    Demo {
        #[arg(long, default_value_t = DEMO_TRAIN_SAMPLES)]
        train: usize,

        #[arg(long, default_value_t = DEMO_TEST_SAMPLES)]
        test: usize,

        #[arg(long, default_value_t = DEMO_SEED)]
        seed: u64,

        #[arg(long, default_value_t = FOREST_TREES)]
        trees: usize,
    },
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Bill table (records mode) or prepared training table (with --valid)
    data: PathBuf,

    /// Prepared validation table; all columns but id/label are features
    #[arg(long)]
    valid: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "logistic")]
    model: ModelKind,

    #[arg(long, value_enum, default_value = "seats-probs")]
    features: FeatureSet,

    #[arg(long, value_enum, default_value = "pad")]
    slots: SlotPolicy,

    /// Which sponsor party becomes the dropped reference column
    #[arg(long, value_enum, default_value = "first-seen")]
    categories: CategoryOrder,

    #[arg(long, default_value_t = TEST_SIZE)]
    test_size: f64,

    #[arg(long, default_value_t = SPLIT_SEED)]
    seed: u64,

    #[arg(long, default_value_t = FOREST_SEED)]
    forest_seed: u64,

    #[arg(long, default_value_t = FOREST_TREES)]
    trees: usize,

    #[arg(long, default_value_t = LOGISTIC_MAX_ITER)]
    max_iter: usize,

    /// Rows in the predictions file (default: all for logistic, test for forest)
    #[arg(long, value_enum)]
    predict_on: Option<PredictScope>,

    /// Write bill_id + P(Act)
    #[arg(long)]
    predictions: Option<PathBuf>,

    /// Write held-out rows with true/predicted labels
    #[arg(long)]
    test_report: Option<PathBuf>,

    /// Save the fitted model (JSON)
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Print this many correct and incorrect held-out samples
    #[arg(long, default_value_t = 3)]
    samples: usize,

    #[command(flatten)]
    columns: ColumnArgs,
}

#[derive(Args, Debug, Clone)]
struct ColumnArgs {
    #[arg(long, default_value = ID_COLUMN)]
    id_column: String,

    #[arg(long, default_value = STATUS_COLUMN)]
    status_column: String,

    #[arg(long, default_value = SPONSOR_COLUMN)]
    sponsor_column: String,

    #[arg(long, default_value = SEATS_COLUMN)]
    seats_column: String,

    #[arg(long, default_value = DOC_PROB_COLUMN)]
    probs_column: String,

    /// Label column of prepared tables (--valid mode)
    #[arg(long, default_value = LABEL_COLUMN)]
    label_column: String,
}

impl ColumnArgs {
    fn record_columns(&self) -> RecordColumns {
        RecordColumns {
            id: self.id_column.clone(),
            status: self.status_column.clone(),
            sponsor: self.sponsor_column.clone(),
            seats: self.seats_column.clone(),
            doc_probs: self.probs_column.clone(),
        }
    }
}

fn parse_rename(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => Ok((s!(from.trim()), s!(to.trim()))),
        _ => Err(format!("expected FROM=TO, got {s:?}")),
    }
}

/* ---------------- Console progress ---------------- */

struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    fn new(quiet: bool) -> Self {
        Self { bar: if quiet { ProgressBar::hidden() } else { ProgressBar::new(0) } }
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}") {
            self.bar.set_style(style.progress_chars("#>-"));
        }
    }
    fn log(&mut self, msg: &str) {
        self.bar.println(msg);
    }
    fn item_done(&mut self, id: u32) {
        self.bar.set_message(format!("bill {id}"));
        self.bar.inc(1);
    }
    fn item_skipped(&mut self, id: u32, _reason: &str) {
        self.bar.set_message(format!("bill {id} skipped"));
        self.bar.inc(1);
    }
    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/* ---------------- Output helpers ---------------- */

fn print_table(t: &DataSet) {
    println!("{}", t.headers.join("\t"));
    for row in &t.rows {
        let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
        println!("{}", cells.join("\t"));
    }
}

fn print_seats(seats: &SeatCounts) {
    for (party, n) in seats.iter() {
        println!("  {party}: {n} seats");
    }
}

/* ---------------- Entry ---------------- */

pub fn run() -> color_eyre::Result<()> {
    let cli = Cli::parse();

    let log_file = if cli.no_log_file {
        None
    } else {
        Some(cli.log_file.clone().unwrap_or_else(|| PathBuf::from(STORE_DIR).join(LOG_FILE)))
    };
    log::init(Verbosity::from_count(cli.quiet, cli.verbose), log_file.as_deref());

    match cli.command {
        Command::Collect { ids, from_csv, id_column, out, format, resume, checkpoint_every, heuristics, api } => {
            let bills = match ids {
                Some(list) => BillSelector::Ids(collect::parse_ids_list(&list)?),
                None => BillSelector::FromFiles { files: from_csv, column: id_column },
            };
            let mut app = AppOptions::default();
            app.collect = CollectOptions {
                bills,
                date: heuristics.date,
                progress: heuristics.progress,
                api: api.options(),
                resume,
                checkpoint_every,
            };
            if let Some(out) = &out {
                app.export.set_path(&out.to_string_lossy());
            }
            if let Some(f) = format {
                app.export.format = f;
            }

            let mut progress = ConsoleProgress::new(cli.quiet);
            let summary = collect::collect(&app.collect, &app.export, Some(&mut progress))?;
            println!(
                "Wrote {} bills to {} ({} processed, {} skipped)",
                summary.written,
                summary.out.display(),
                summary.processed,
                summary.skipped.len()
            );
        }

        Command::Bill { id, heuristics, api } => {
            let opts = CollectOptions {
                date: heuristics.date,
                progress: heuristics.progress,
                api: api.options(),
                ..Default::default()
            };
            let client = ApiClient::new(&opts.api)?;
            let info = collect::collect_one(&client, id, &opts).wrap_err_with(|| format!("bill {id}"))?;
            let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| s!("-"));

            println!("Bill ID: {}", info.bill_id);
            println!("Long Title: {}", info.long_title);
            println!("Short Title: {}", info.short_title);
            println!("Originating House: {}", info.originating_house);
            println!("Progress Status: {}", info.progress_status.map(|p| p.to_string()).unwrap_or_else(|| s!("-")));
            println!("Introduced Session ID: {}", info.session_id);
            println!("First Sponsor's Party: {}", info.sponsor_party);
            println!("Introduced Date (raw): {}", or_dash(&info.introduced_date));
            println!("Formatted Date: {}", or_dash(&info.formatted_date));
            match &info.seat_counts {
                Some(seats) if !seats.is_empty() => {
                    println!("Commons seat counts on that day:");
                    print_seats(seats);
                }
                _ => println!("No seat data available."),
            }
        }

        Command::Join { left, right, on, right_on, how, rename, keep, dedup, drop, out } => {
            let req = runner::JoinRequest { left, right, on, right_on, how, rename, keep, dedup, drop, out };
            let table = runner::join_files(&req)?;
            println!("Wrote {} rows x {} columns to {}", table.len(), table.headers.len(), req.out.display());
        }

        Command::Split {
            predictions,
            training,
            validation,
            text_id_column,
            text_probs_column,
            status,
            status_column,
            merged_out,
            out_dir,
            format,
        } => {
            if training.is_empty() && validation.is_empty() {
                return Err(eyre!("give at least one --training or --validation file"));
            }
            let mut export = ExportOptions::default();
            export.set_dir(out_dir);
            export.format = format;
            let req = runner::SplitRequest {
                predictions,
                training,
                validation,
                text_id_column,
                text_probs_column,
                status,
                status_column,
                merged_out,
                export,
            };
            let summary = runner::split_probabilities(&req)?;
            println!("Merged predictions: {} bills ({} without text probabilities)", summary.merged_rows, summary.untagged);
            for (path, rows) in &summary.written {
                println!("  {} rows → {}", rows, path.display());
            }
        }

        Command::Train(args) => run_train(args)?,

        Command::Predict { model, input, out, labour, conservative, libdem, sponsor, doc_probs } => {
            let trained = TrainedModel::load(&model).wrap_err_with(|| format!("loading {}", model.display()))?;
            match (input, out) {
                (Some(input), Some(out)) => {
                    let table = runner::predict_table(&trained, &input, &RecordColumns::default(), &out)?;
                    println!("Scored {} bills → {}", table.len(), out.display());
                }
                _ => {
                    let seats: SeatCounts =
                        [(PARTY_LABOUR, labour), (PARTY_CONSERVATIVE, conservative), (PARTY_LIBDEM, libdem)]
                            .into_iter()
                            .collect();
                    let sample = BillRecord {
                        id: s!("sample"),
                        sponsor_party: sponsor,
                        seat_counts: Some(seats),
                        doc_probs: parse_probs(doc_probs.as_deref())?,
                        ..Default::default()
                    };
                    let prediction = runner::predict_one(&trained, &sample)?;
                    println!("Prediction for the sample (Progress Status): {}", prediction.status);
                    println!("P(Act): {:.4}", prediction.p_act);
                }
            }
        }

        Command::Demo { train, test, seed, trees } => {
            let summary = runner::demo(&runner::DemoRequest { n_train: train, n_test: test, seed, trees })?;
            println!("Accuracy on {} test samples: {:.2}%", summary.n_test, summary.evaluation.accuracy * 100.0);
            println!(
                "Outlier (Labour 400 / Conservative 180 / LibDem 70, did not pass): predicted {} with P(Act) {:.2}",
                summary.outlier.status, summary.outlier.p_act
            );
        }
    }
    Ok(())
}

fn run_train(args: TrainArgs) -> color_eyre::Result<()> {
    let options = TrainOptions {
        model: args.model,
        features: args.features,
        slots: args.slots,
        categories: args.categories,
        test_size: args.test_size,
        split_seed: args.seed,
        forest_seed: args.forest_seed,
        forest_trees: args.trees,
        max_iter: args.max_iter,
        predict_on: args.predict_on,
    };
    let req = runner::TrainRequest {
        data: args.data,
        valid: args.valid,
        columns: args.columns.record_columns(),
        label_column: args.columns.label_column.clone(),
        options,
        predictions: args.predictions,
        test_report: args.test_report,
        model_out: args.model_out,
    };
    let summary = runner::train(&req)?;
    let eval = &summary.evaluation;

    println!("Features: {}", summary.columns.join(", "));
    println!("Rows: {} train / {} test", summary.n_train, summary.n_test);
    println!("Training Accuracy: {:.2}%", summary.train_accuracy * 100.0);
    println!("Test Accuracy: {:.2}%", eval.accuracy * 100.0);
    match eval.log_loss {
        Some(ll) => println!("Test Log Loss: {ll:.4}"),
        None => println!("Test Log Loss: nan"),
    }
    println!("\nClassification Report (Test Data):\n{}", eval.report);

    if args.samples > 0 {
        for (correct, title) in [(true, "Correct"), (false, "Incorrect")] {
            println!("\n--- {} Sample {title} Predictions ---", args.samples);
            let rows = runner::report_samples(&summary.test_report, correct, args.samples);
            if rows.is_empty() {
                println!("No {} predictions found.", title.to_lowercase());
            } else {
                print_table(&rows);
            }
        }
    }
    for path in &summary.written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
