// src/config/consts.rs

// Net config
pub const BILLS_API_BASE: &str = "https://bills-api.parliament.uk/api/v1";
pub const MEMBERS_API_BASE: &str = "https://members-api.parliament.uk/api";
pub const BILLS_API_ENV: &str = "BILLS_API_URL";
pub const MEMBERS_API_ENV: &str = "MEMBERS_API_URL";
pub const USER_AGENT: &str = concat!("bill_scrape/", env!("CARGO_PKG_VERSION"));
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// Local store
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const CURSOR_SUFFIX: &str = ".cursor.json";

// Collect
pub const CHECKPOINT_EVERY: usize = 50;
pub const DEFAULT_ID_COLUMN: &str = "Bill Id";
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_PARTY: &str = "Unknown";

// News-article phrases, matched case-insensitively in article order.
pub const NEWS_PHRASES: &[(&str, u8)] = &[
    ("bill will make no further progress", 1),
    ("bill is now an Act of Parliament", 2),
    ("not progress any further", 1),
];

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_BILLS_FILE: &str = "bills_data";
pub const DEFAULT_TRAINING_FILE: &str = "merged_probabilities_training";
pub const DEFAULT_VALIDATION_FILE: &str = "validation_probabilities_training";

// Columns
pub const ID_COLUMN: &str = "bill_id";
pub const STATUS_COLUMN: &str = "progress_status";
pub const SPONSOR_COLUMN: &str = "sponsor_party";
pub const SEATS_COLUMN: &str = "seat_counts";
pub const DOC_PROB_COLUMN: &str = "doc_prob";
pub const SPLIT_COLUMN: &str = "split";
pub const TEXT_ID_COLUMN: &str = "id";
pub const TEXT_PROBS_COLUMN: &str = "doc_probs";
pub const LABEL_COLUMN: &str = "status";
pub const SPLIT_TRAINING: &str = "training";
pub const SPLIT_VALIDATION: &str = "validation";

// Features
pub const PARTY_LABOUR: &str = "Labour";
pub const PARTY_CONSERVATIVE: &str = "Conservative";
pub const PARTY_LIBDEM: &str = "Liberal Democrat";
pub const DOC_PROB_SLOTS: usize = 4;

// Train
pub const TEST_SIZE: f64 = 0.2;
pub const SPLIT_SEED: u64 = 42;
pub const FOREST_SEED: u64 = 32;
pub const FOREST_TREES: usize = 100;
pub const LOGISTIC_MAX_ITER: usize = 1000;

// Demo
pub const DEMO_TRAIN_SAMPLES: usize = 1000;
pub const DEMO_TEST_SAMPLES: usize = 10_000;
pub const DEMO_SEED: u64 = 42;
