use chrono::{NaiveDate, NaiveTime};

use crate::error::{LabelError, Result};

/// Column names every annotation table must provide before labeling.
///
/// On-disk annotation files call the category column `label`; the
/// interval loader renames it while reading (see
/// [`read_annotations`](crate::annotations::read_annotations)).
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_START_TIME, COLUMN_STOP_TIME, COLUMN_CATEGORY];

pub const COLUMN_START_TIME: &str = "start_time";
pub const COLUMN_STOP_TIME: &str = "stop_time";
pub const COLUMN_CATEGORY: &str = "category";

/// A single cell of an [`AnnotationTable`].
///
/// Annotation sources are loosely typed (CSV text, or whatever a caller
/// assembled programmatically), so the table models cells as a small value
/// enum and defers conversion to [`AnnotationSet::from_table`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// Columnar annotation input as it comes off disk or out of a caller.
///
/// This is the loosely typed boundary representation: named columns and
/// rows of [`CellValue`]. Extra columns (e.g. `channel`, `confidence`)
/// are carried along and ignored by the labeler. Nothing is validated
/// beyond row arity; schema and value checks happen once, in
/// [`AnnotationSet::from_table`].
///
/// # Examples
///
/// ```rust
/// use epochlabel::{AnnotationTable, CellValue};
///
/// let mut table = AnnotationTable::new(["start_time", "stop_time", "category"]);
/// table.push_row(vec![
///     CellValue::Int(10),
///     CellValue::Int(60),
///     CellValue::Text("seiz".to_string()),
/// ])?;
///
/// assert_eq!(table.n_rows(), 1);
/// assert!(table.has_column("category"));
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl AnnotationTable {
    /// Creates an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnnotationTable {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. The cell count must match the column count.
    ///
    /// # Errors
    ///
    /// * `LabelError::RowLengthMismatch` - wrong number of cells
    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(LabelError::RowLengthMismatch {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 已检查的列查找，列缺失时返回 MissingColumns
    pub(crate) fn require_column(&self, name: &'static str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| LabelError::MissingColumns(vec![name.to_string()]))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One clinically annotated time span, in seconds of recording time.
///
/// Invariants: `start_time >= 0` and `stop_time > start_time`. Construct
/// through [`AnnotationInterval::new`] (or a conversion from a table) so
/// the invariant is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInterval {
    pub start_time: i64,
    pub stop_time: i64,
    pub category: String,
}

impl AnnotationInterval {
    /// Builds an interval, rejecting empty or negative spans.
    ///
    /// # Errors
    ///
    /// * `LabelError::InvalidInterval` - `start_time < 0` or `stop_time <= start_time`
    pub fn new<S: Into<String>>(start_time: i64, stop_time: i64, category: S) -> Result<Self> {
        if start_time < 0 || stop_time <= start_time {
            return Err(LabelError::InvalidInterval {
                start: start_time,
                stop: stop_time,
            });
        }
        Ok(AnnotationInterval {
            start_time,
            stop_time,
            category: category.into(),
        })
    }

    /// Half-open overlap test against the window `[window_start, window_end)`.
    ///
    /// Touching endpoints on either side do not count as overlap:
    ///
    /// ```rust
    /// use epochlabel::AnnotationInterval;
    ///
    /// let iv = AnnotationInterval::new(30, 60, "seiz")?;
    /// assert!(iv.overlaps(30, 60));
    /// assert!(iv.overlaps(59, 90));
    /// assert!(!iv.overlaps(0, 30));   // window ends where the interval starts
    /// assert!(!iv.overlaps(60, 90));  // window starts where the interval stops
    /// # Ok::<(), epochlabel::LabelError>(())
    /// ```
    pub fn overlaps(&self, window_start: i64, window_end: i64) -> bool {
        window_start < self.stop_time && window_end > self.start_time
    }
}

/// An immutable, order-preserving collection of annotation intervals.
///
/// This is the fully typed form the epoch labeler actually scans.
/// Duplicate and mutually overlapping intervals are permitted; order is
/// preserved from the source because the labeler stops at the first
/// seizure match per epoch.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    intervals: Vec<AnnotationInterval>,
}

impl AnnotationSet {
    /// Converts a loosely typed table into a typed annotation set.
    ///
    /// This is the single validation boundary: structural checks run
    /// before any value is touched, and every failure is reported to the
    /// caller instead of being coerced away.
    ///
    /// Validation order:
    /// 1. All required columns present (`start_time`, `stop_time`,
    ///    `category`); every missing name is reported in one error.
    /// 2. Per row: the category cell must be text.
    /// 3. Per row: the time cells must convert to integers. Float cells
    ///    and float-formatted text (`"30.0000"`) are accepted only when
    ///    integral; anything that would need truncation is rejected, and
    ///    unparseable text carries the parse failure as its source.
    /// 4. Per row: `0 <= start_time < stop_time`.
    ///
    /// # Errors
    ///
    /// * `LabelError::MissingColumns` - one or more required columns absent
    /// * `LabelError::CategoryNotText` - category cell is not text
    /// * `LabelError::TimeParse` / `LabelError::TimeNotIntegral` - time cell
    ///   does not convert to an integer
    /// * `LabelError::InvalidInterval` - interval invariant violated
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epochlabel::{AnnotationSet, AnnotationTable, LabelError};
    ///
    /// let table = AnnotationTable::new(["start_time"]);
    /// match AnnotationSet::from_table(&table) {
    ///     Err(LabelError::MissingColumns(cols)) => {
    ///         assert_eq!(cols, vec!["stop_time".to_string(), "category".to_string()]);
    ///     }
    ///     other => panic!("expected MissingColumns, got {:?}", other),
    /// }
    /// ```
    pub fn from_table(table: &AnnotationTable) -> Result<Self> {
        // 先做结构检查，一次性报告所有缺失列
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| !table.has_column(name))
            .map(|&name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LabelError::MissingColumns(missing));
        }

        let start_col = table.require_column(COLUMN_START_TIME)?;
        let stop_col = table.require_column(COLUMN_STOP_TIME)?;
        let category_col = table.require_column(COLUMN_CATEGORY)?;

        let mut intervals = Vec::with_capacity(table.n_rows());
        for (row, cells) in table.rows().enumerate() {
            let category = match &cells[category_col] {
                CellValue::Text(s) => s.clone(),
                _ => return Err(LabelError::CategoryNotText { row }),
            };
            let start_time = cell_to_seconds(&cells[start_col], COLUMN_START_TIME)?;
            let stop_time = cell_to_seconds(&cells[stop_col], COLUMN_STOP_TIME)?;
            intervals.push(AnnotationInterval::new(start_time, stop_time, category)?);
        }

        Ok(AnnotationSet { intervals })
    }

    /// Builds a set from already typed intervals.
    ///
    /// Intervals made through [`AnnotationInterval::new`] are already
    /// valid; the invariant is re-checked here because the fields are
    /// public.
    pub fn from_intervals(intervals: Vec<AnnotationInterval>) -> Result<Self> {
        for iv in &intervals {
            if iv.start_time < 0 || iv.stop_time <= iv.start_time {
                return Err(LabelError::InvalidInterval {
                    start: iv.start_time,
                    stop: iv.stop_time,
                });
            }
        }
        Ok(AnnotationSet { intervals })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnotationInterval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// 将单元格转换为秒数（整数）；拒绝需要截断的值
fn cell_to_seconds(cell: &CellValue, column: &'static str) -> Result<i64> {
    match cell {
        CellValue::Int(v) => Ok(*v),
        CellValue::Float(v) => {
            float_to_i64(*v).ok_or_else(|| LabelError::TimeNotIntegral {
                column,
                value: v.to_string(),
            })
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(v);
            }
            let v: f64 = trimmed.parse().map_err(|e| LabelError::TimeParse {
                column,
                value: s.clone(),
                source: e,
            })?;
            float_to_i64(v).ok_or_else(|| LabelError::TimeNotIntegral {
                column,
                value: s.clone(),
            })
        }
    }
}

fn float_to_i64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Per-signal parameters from an EDF header.
#[derive(Debug, Clone)]
pub struct SignalParam {
    pub label: String,
    pub physical_max: f64,
    pub physical_min: f64,
    pub digital_max: i32,
    pub digital_min: i32,
    pub samples_per_record: i32,
    pub physical_dimension: String,
    pub prefilter: String,
    pub transducer: String,
}

impl SignalParam {
    /// 计算物理值转换参数
    pub fn bit_value(&self) -> f64 {
        (self.physical_max - self.physical_min) / (self.digital_max - self.digital_min) as f64
    }

    /// 计算偏移量
    pub fn offset(&self) -> f64 {
        self.physical_max / self.bit_value() - self.digital_max as f64
    }

    /// 将数字值转换为物理值
    pub fn to_physical(&self, digital_value: i32) -> f64 {
        self.bit_value() * (self.offset() + digital_value as f64)
    }

    /// 将物理值转换为数字值
    pub fn to_digital(&self, physical_value: f64) -> i32 {
        let digital = (physical_value / self.bit_value()) - self.offset();
        digital.round() as i32
    }
}

/// Recording-level metadata from an EDF header.
#[derive(Debug, Clone)]
pub struct RecordingHeader {
    /// Data signals only; `EDF Annotations` signals never appear here.
    pub signals: Vec<SignalParam>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub datarecords_in_file: i64,
    /// 数据记录持续时间（100纳秒为单位）
    pub datarecord_duration: i64,
    /// 文件持续时间（100纳秒为单位）
    pub file_duration: i64,
    pub patient: String,
    pub recording: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_conversion_accepts_integral_values() {
        assert_eq!(cell_to_seconds(&CellValue::Int(42), "start_time").unwrap(), 42);
        assert_eq!(
            cell_to_seconds(&CellValue::Float(30.0), "start_time").unwrap(),
            30
        );
        assert_eq!(
            cell_to_seconds(&CellValue::Text("  30.0000 ".to_string()), "start_time").unwrap(),
            30
        );
        assert_eq!(
            cell_to_seconds(&CellValue::Text("-7".to_string()), "start_time").unwrap(),
            -7
        );
    }

    #[test]
    fn cell_conversion_rejects_truncation() {
        // 30.5 需要截断才能成为整数，必须拒绝
        assert!(matches!(
            cell_to_seconds(&CellValue::Float(30.5), "stop_time"),
            Err(LabelError::TimeNotIntegral { column: "stop_time", .. })
        ));
        assert!(matches!(
            cell_to_seconds(&CellValue::Text("30.5".to_string()), "stop_time"),
            Err(LabelError::TimeNotIntegral { .. })
        ));
    }

    #[test]
    fn cell_conversion_chains_parse_failure() {
        let err = cell_to_seconds(&CellValue::Text("abc".to_string()), "start_time").unwrap_err();
        match &err {
            LabelError::TimeParse { column, value, .. } => {
                assert_eq!(*column, "start_time");
                assert_eq!(value, "abc");
            }
            other => panic!("expected TimeParse, got {:?}", other),
        }
        // 底层解析错误必须作为 source 链接，不能吞掉
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn interval_invariant() {
        assert!(AnnotationInterval::new(0, 1, "seiz").is_ok());
        assert!(matches!(
            AnnotationInterval::new(10, 10, "seiz"),
            Err(LabelError::InvalidInterval { .. })
        ));
        assert!(matches!(
            AnnotationInterval::new(-1, 5, "bckg"),
            Err(LabelError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn push_row_checks_arity() {
        let mut table = AnnotationTable::new(["start_time", "stop_time", "category"]);
        let err = table
            .push_row(vec![CellValue::Int(0), CellValue::Int(1)])
            .unwrap_err();
        assert!(matches!(
            err,
            LabelError::RowLengthMismatch {
                row: 0,
                expected: 3,
                found: 2
            }
        ));
    }
}
