//! Epoch labeling against clinically annotated intervals.
//!
//! Maps a set of `(start, stop, category)` intervals onto the fixed,
//! non-overlapping windows `[i * epoch_length, (i+1) * epoch_length)` and
//! marks each window 1 when it overlaps at least one seizure interval.
//! The scan is `O(num_epochs * num_intervals)`; annotation sets are tiny
//! next to epoch counts in clinical recordings, so a plain sweep stays
//! auditable.

use crate::error::{LabelError, Result};
use crate::types::{AnnotationSet, AnnotationTable};
use crate::SEIZURE_CATEGORY;

/// Labels each epoch 1 or 0 by seizure overlap.
///
/// Validates the epoch arguments, converts the table into a typed
/// [`AnnotationSet`] (one pass of schema and value checks, see
/// [`AnnotationSet::from_table`]), then scans the windows.
///
/// An epoch is labeled 1 iff some interval has category `"seiz"` and
/// overlaps the half-open window: `epoch_start < stop && epoch_end > start`.
/// Touching endpoints never count. The scan of an epoch stops at the first
/// seizure match; non-seizure intervals never stop it, so a seizure
/// interval listed after an overlapping background interval is still found.
///
/// The result always has exactly `num_epochs` entries; an empty table
/// yields all zeros. The computation is pure - no I/O, no shared state,
/// safe to call concurrently on independent inputs.
///
/// # Arguments
///
/// * `num_epochs` - Total number of epochs. Must be positive.
/// * `epoch_length` - Epoch duration in seconds, the same time base as the
///   annotation timestamps. Must be positive.
/// * `annotations` - Table exposing at least `start_time`, `stop_time`
///   and `category`.
///
/// # Errors
///
/// * `LabelError::InvalidEpochCount` / `LabelError::InvalidEpochLength` -
///   non-positive arguments, raised before any label is computed
/// * any error of [`AnnotationSet::from_table`] - schema or value
///   validation failure; never downgraded to a default label
///
/// # Examples
///
/// ```rust
/// use epochlabel::{label_epochs, AnnotationTable, CellValue};
///
/// let mut annotations = AnnotationTable::new(["start_time", "stop_time", "category"]);
/// annotations.push_row(vec![
///     CellValue::Int(10),
///     CellValue::Int(60),
///     CellValue::Text("seiz".to_string()),
/// ])?;
///
/// // Five 30-second epochs; the interval covers the first two windows.
/// let labels = label_epochs(5, 30, &annotations)?;
/// assert_eq!(labels, vec![1, 1, 0, 0, 0]);
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
///
/// Background intervals never label, no matter how much they overlap:
///
/// ```rust
/// use epochlabel::{label_epochs, AnnotationTable, CellValue};
///
/// let mut annotations = AnnotationTable::new(["start_time", "stop_time", "category"]);
/// annotations.push_row(vec![
///     CellValue::Int(0),
///     CellValue::Int(150),
///     CellValue::Text("bckg".to_string()),
/// ])?;
///
/// assert_eq!(label_epochs(5, 30, &annotations)?, vec![0, 0, 0, 0, 0]);
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
pub fn label_epochs(
    num_epochs: i64,
    epoch_length: i64,
    annotations: &AnnotationTable,
) -> Result<Vec<u8>> {
    check_epoch_args(num_epochs, epoch_length)?;
    let set = AnnotationSet::from_table(annotations)?;
    Ok(scan_epochs(num_epochs, epoch_length, &set))
}

impl AnnotationSet {
    /// Labels epochs against an already converted set.
    ///
    /// Same contract as [`label_epochs`], minus the boundary conversion.
    /// Useful when one annotation set labels several epoch grids.
    ///
    /// # Errors
    ///
    /// * `LabelError::InvalidEpochCount` / `LabelError::InvalidEpochLength`
    pub fn label_epochs(&self, num_epochs: i64, epoch_length: i64) -> Result<Vec<u8>> {
        check_epoch_args(num_epochs, epoch_length)?;
        Ok(scan_epochs(num_epochs, epoch_length, self))
    }
}

fn check_epoch_args(num_epochs: i64, epoch_length: i64) -> Result<()> {
    if num_epochs <= 0 {
        return Err(LabelError::InvalidEpochCount(num_epochs));
    }
    if epoch_length <= 0 {
        return Err(LabelError::InvalidEpochLength(epoch_length));
    }
    Ok(())
}

fn scan_epochs(num_epochs: i64, epoch_length: i64, set: &AnnotationSet) -> Vec<u8> {
    let mut labels = vec![0u8; num_epochs as usize];

    for i in 0..num_epochs {
        let epoch_start = i * epoch_length;
        let epoch_end = (i + 1) * epoch_length;

        for interval in set.iter() {
            // 半开区间重叠测试；命中第一个发作区间后停止扫描
            if interval.category == SEIZURE_CATEGORY && interval.overlaps(epoch_start, epoch_end) {
                labels[i as usize] = 1;
                break;
            }
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn table(rows: &[(i64, i64, &str)]) -> AnnotationTable {
        let mut t = AnnotationTable::new(["start_time", "stop_time", "category"]);
        for &(start, stop, category) in rows {
            t.push_row(vec![
                CellValue::Int(start),
                CellValue::Int(stop),
                CellValue::Text(category.to_string()),
            ])
            .unwrap();
        }
        t
    }

    #[test]
    fn seizure_interval_labels_overlapping_epochs() {
        let labels = label_epochs(5, 30, &table(&[(10, 60, "seiz")])).unwrap();
        assert_eq!(labels, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn background_interval_never_labels() {
        let labels = label_epochs(5, 30, &table(&[(0, 150, "bckg")])).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn multiple_intervals() {
        let rows = [(10, 30, "seiz"), (50, 70, "bckg"), (90, 110, "seiz")];
        let labels = label_epochs(5, 30, &table(&rows)).unwrap();
        assert_eq!(labels, vec![1, 0, 0, 1, 0]);
    }

    #[test]
    fn empty_table_yields_all_zeros() {
        let labels = label_epochs(4, 30, &table(&[])).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 0]);
    }

    #[test]
    fn result_length_always_matches_num_epochs() {
        for n in 1..=7 {
            let labels = label_epochs(n, 30, &table(&[(0, 10, "seiz")])).unwrap();
            assert_eq!(labels.len(), n as usize);
        }
    }

    #[test]
    fn touching_endpoints_do_not_label() {
        // 区间 [30, 60)：与窗口 [0,30) 和 [60,90) 只接触端点
        let labels = label_epochs(3, 30, &table(&[(30, 60, "seiz")])).unwrap();
        assert_eq!(labels, vec![0, 1, 0]);
    }

    #[test]
    fn scan_continues_past_nonseizure_overlap() {
        // 背景区间先覆盖整个窗口，后面的发作区间仍然要被找到
        let rows = [(0, 150, "bckg"), (10, 40, "seiz")];
        let labels = label_epochs(5, 30, &table(&rows)).unwrap();
        assert_eq!(labels, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn non_positive_num_epochs_rejected() {
        let t = table(&[(10, 30, "seiz")]);
        assert!(matches!(
            label_epochs(-5, 20, &t),
            Err(LabelError::InvalidEpochCount(-5))
        ));
        assert!(matches!(
            label_epochs(0, 20, &t),
            Err(LabelError::InvalidEpochCount(0))
        ));
    }

    #[test]
    fn non_positive_epoch_length_rejected() {
        let t = table(&[(10, 30, "seiz")]);
        assert!(matches!(
            label_epochs(5, -20, &t),
            Err(LabelError::InvalidEpochLength(-20))
        ));
        assert!(matches!(
            label_epochs(5, 0, &t),
            Err(LabelError::InvalidEpochLength(0))
        ));
    }

    #[test]
    fn missing_columns_all_reported() {
        let mut t = AnnotationTable::new(["start_time", "confidence"]);
        t.push_row(vec![CellValue::Int(10), CellValue::Float(1.0)])
            .unwrap();

        match label_epochs(5, 30, &t) {
            Err(LabelError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["stop_time".to_string(), "category".to_string()]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn category_must_be_text() {
        let mut t = AnnotationTable::new(["start_time", "stop_time", "category"]);
        t.push_row(vec![
            CellValue::Int(10),
            CellValue::Int(30),
            CellValue::Int(1),
        ])
        .unwrap();

        assert!(matches!(
            label_epochs(5, 30, &t),
            Err(LabelError::CategoryNotText { row: 0 })
        ));
    }

    #[test]
    fn conversion_failure_raised_not_defaulted() {
        let mut t = AnnotationTable::new(["start_time", "stop_time", "category"]);
        t.push_row(vec![
            CellValue::Text("ten".to_string()),
            CellValue::Int(30),
            CellValue::Text("seiz".to_string()),
        ])
        .unwrap();

        assert!(matches!(
            label_epochs(5, 30, &t),
            Err(LabelError::TimeParse { .. })
        ));
    }

    #[test]
    fn labeling_from_typed_set() {
        let set = AnnotationSet::from_table(&table(&[(10, 60, "seiz")])).unwrap();
        assert_eq!(set.label_epochs(5, 30).unwrap(), vec![1, 1, 0, 0, 0]);
        // 同一个集合可以反复使用
        assert_eq!(set.label_epochs(2, 30).unwrap(), vec![1, 1]);
    }
}
