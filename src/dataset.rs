//! End-to-end assembly of a labeled recording.

use std::path::Path;

use ndarray::Array2;

use crate::annotations::read_annotations;
use crate::error::Result;
use crate::labeler::label_epochs;
use crate::reader::RecordingReader;

/// A recording segmented into epochs with per-epoch ground truth.
///
/// `labels[i]` belongs to the epoch spanning
/// `[i * epoch_length, (i+1) * epoch_length)` seconds; `data` is the raw
/// `[channels, samples]` physical sample matrix, unsegmented, for
/// downstream feature extraction to window as it sees fit.
#[derive(Debug, Clone)]
pub struct LabeledRecording {
    pub num_epochs: i64,
    pub data: Array2<f64>,
    pub labels: Vec<u8>,
    pub channel_names: Vec<String>,
    pub sampling_frequency: f64,
}

/// Loads a recording and its annotation file, and labels every epoch.
///
/// The epoch count comes from the recording (sample count, sampling
/// frequency, epoch length and overlap); the labels come from the
/// annotation intervals. Any failure in either loader or in the labeler
/// propagates unchanged - there is no partial result.
///
/// # Arguments
///
/// * `recording_path` - EDF recording
/// * `annotations_path` - term-level annotation file for the same recording
/// * `epoch_length` - epoch duration in seconds
/// * `epoch_overlap` - overlap between consecutive epochs in seconds
///   (0 for the standard non-overlapping grid)
///
/// # Examples
///
/// ```rust
/// use epochlabel::load_labeled_recording;
///
/// # epochlabel::doctest_utils::create_test_recording("dataset_demo.edf")?;
/// # epochlabel::doctest_utils::create_test_annotations("dataset_demo.csv_bi")?;
/// let recording = load_labeled_recording("dataset_demo.edf", "dataset_demo.csv_bi", 2, 0)?;
///
/// assert_eq!(recording.labels.len(), recording.num_epochs as usize);
/// assert_eq!(recording.data.nrows(), recording.channel_names.len());
/// # std::fs::remove_file("dataset_demo.edf").ok();
/// # std::fs::remove_file("dataset_demo.csv_bi").ok();
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
pub fn load_labeled_recording<P: AsRef<Path>, Q: AsRef<Path>>(
    recording_path: P,
    annotations_path: Q,
    epoch_length: i64,
    epoch_overlap: i64,
) -> Result<LabeledRecording> {
    let mut reader = RecordingReader::open(recording_path)?;
    let num_epochs = reader.epoch_count(epoch_length, epoch_overlap)?;
    let sampling_frequency = reader.sampling_frequency()?;
    let channel_names = reader.channel_names();
    let data = reader.read_matrix()?;

    let annotations = read_annotations(annotations_path)?;
    let labels = label_epochs(num_epochs, epoch_length, &annotations)?;

    Ok(LabeledRecording {
        num_epochs,
        data,
        labels,
        channel_names,
        sampling_frequency,
    })
}
