//! # epochlabel - epoch-level seizure labels for EEG recordings
//!
//! A pure Rust preprocessing front end for seizure-detection pipelines:
//! it reads an EDF recording and the matching term-level clinical
//! annotation file, cuts the recording into fixed-length epochs, and
//! produces one binary ground-truth label per epoch (1 = the epoch
//! overlaps annotated seizure activity).
//!
//! ## Pipeline overview
//!
//! ```text
//! recording.edf ──► RecordingReader ──► [C, T] matrix, fs, channels, n_epochs
//!                                                          │
//! recording.csv_bi ──► read_annotations ──► AnnotationTable│
//!                                                │         │
//!                                                ▼         ▼
//!                                          label_epochs(n, L, table)
//!                                                │
//!                                                ▼
//!                                          [0, 0, 1, 1, 0, ...]
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use epochlabel::load_labeled_recording;
//!
//! # // Generate fixture files (hidden from docs)
//! # epochlabel::doctest_utils::create_test_recording("quickstart.edf")?;
//! # epochlabel::doctest_utils::create_test_annotations("quickstart.csv_bi")?;
//! // One call: read the recording, read the annotations, label every epoch
//! let recording = load_labeled_recording("quickstart.edf", "quickstart.csv_bi", 2, 0)?;
//!
//! println!("{} epochs at {} Hz", recording.num_epochs, recording.sampling_frequency);
//! assert_eq!(recording.labels, vec![0, 0, 1, 1, 0]);
//! assert_eq!(recording.channel_names, vec!["Fp1", "Cz"]);
//!
//! # // Cleanup (hidden from docs)
//! # std::fs::remove_file("quickstart.edf").ok();
//! # std::fs::remove_file("quickstart.csv_bi").ok();
//! # Ok::<(), epochlabel::LabelError>(())
//! ```
//!
//! ## Labeling without files
//!
//! The core labeler is a pure function over a table of intervals; no I/O
//! is involved and inputs assembled in memory work the same way:
//!
//! ```rust
//! use epochlabel::{label_epochs, AnnotationTable, CellValue};
//!
//! let mut annotations = AnnotationTable::new(["start_time", "stop_time", "category"]);
//! annotations.push_row(vec![
//!     CellValue::Int(10),
//!     CellValue::Int(60),
//!     CellValue::Text("seiz".to_string()),
//! ])?;
//!
//! let labels = label_epochs(5, 30, &annotations)?;
//! assert_eq!(labels, vec![1, 1, 0, 0, 0]);
//! # Ok::<(), epochlabel::LabelError>(())
//! ```
//!
//! ## Validation
//!
//! Annotation input is validated once, at the table boundary: required
//! columns are checked first (every missing name reported in a single
//! error), then the time columns are converted to integral seconds -
//! values that would need truncation are rejected, and parse failures
//! carry the underlying error as their source. Nothing is coerced
//! silently and no label is ever defaulted on error.

pub mod annotations;
pub mod dataset;
pub mod error;
pub mod labeler;
pub mod reader;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use annotations::{read_annotation_set, read_annotations};
pub use dataset::{load_labeled_recording, LabeledRecording};
pub use error::{LabelError, Result};
pub use labeler::label_epochs;
pub use reader::RecordingReader;
pub use types::{
    AnnotationInterval, AnnotationSet, AnnotationTable, CellValue, RecordingHeader, SignalParam,
    COLUMN_CATEGORY, COLUMN_START_TIME, COLUMN_STOP_TIME, REQUIRED_COLUMNS,
};

// Important constants
pub const EDF_TIME_DIMENSION: i64 = 10_000_000; // 100 nanoseconds unit
pub const EDF_MAX_SIGNALS: usize = 4096;

/// Category string that marks an interval as seizure activity.
pub const SEIZURE_CATEGORY: &str = "seiz";

/// Metadata lines before the header row of a term-level annotation file.
pub const ANNOTATION_SKIP_LINES: usize = 5;

/// Conventional prefix on EEG channel labels, stripped by the reader.
pub const CHANNEL_LABEL_PREFIX: &str = "EEG ";

/// Default epoch length in seconds.
pub const DEFAULT_EPOCH_LENGTH: i64 = 30;

/// Default overlap between consecutive epochs in seconds.
pub const DEFAULT_EPOCH_OVERLAP: i64 = 0;

/// Library version
///
/// # Examples
///
/// ```rust
/// let version = epochlabel::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
