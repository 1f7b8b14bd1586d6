use std::io;
use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Annotation file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid header size")]
    InvalidHeader,

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number of signals: {0}")]
    InvalidSignalCount(i32),

    #[error("Physical min equals physical max")]
    PhysicalMinEqualsMax,

    #[error("Digital min equals digital max")]
    DigitalMinEqualsMax,

    #[error("Signals have different sampling rates")]
    MixedSamplingRates,

    #[error("num_epochs should be a positive integer, got {0}")]
    InvalidEpochCount(i64),

    #[error("epoch_length should be a positive integer, got {0}")]
    InvalidEpochLength(i64),

    #[error("epoch_overlap should be non-negative and smaller than one epoch, got {0}")]
    InvalidEpochOverlap(i64),

    #[error("Annotation table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Category value in row {row} is not text")]
    CategoryNotText { row: usize },

    #[error("Cannot convert {column} value {value:?} to an integer")]
    TimeParse {
        column: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("{column} value {value:?} is not representable as an integer")]
    TimeNotIntegral { column: &'static str, value: String },

    #[error("Invalid annotation interval: start {start} must be non-negative and below stop {stop}")]
    InvalidInterval { start: i64, stop: i64 },

    #[error("Row {row} has {found} cells, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Recording shorter than one epoch: {total_samples} samples, one epoch needs {samples_per_epoch}")]
    RecordingTooShort {
        total_samples: i64,
        samples_per_epoch: i64,
    },
}

pub type Result<T> = std::result::Result<T, LabelError>;
