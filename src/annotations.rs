//! Interval loader for clinical annotation tables.
//!
//! Reads the binary (term-level) annotation files that ship with clinical
//! EEG corpora: a fixed preamble of metadata lines, then a CSV header and
//! one row per annotated interval. The on-disk category column is named
//! `label`; it is presented as `category` so the table matches the schema
//! the labeler validates against.

use std::fs;
use std::path::Path;

use crate::error::{LabelError, Result};
use crate::types::{AnnotationSet, AnnotationTable, CellValue, COLUMN_CATEGORY};
use crate::ANNOTATION_SKIP_LINES;

/// On-disk name of the category column.
const FILE_CATEGORY_COLUMN: &str = "label";

/// Reads an annotation file into a loosely typed table.
///
/// Skips the fixed [`ANNOTATION_SKIP_LINES`](crate::ANNOTATION_SKIP_LINES)
/// metadata lines, then parses the header row and the data rows. Every
/// cell is loaded as text; conversion and validation happen later, in
/// [`AnnotationSet::from_table`]. Columns beyond the required three
/// (`channel`, `confidence`, ...) are kept and ignored downstream.
///
/// # Errors
///
/// * `LabelError::FileNotFound` - file can't be opened
/// * `LabelError::InvalidFormat` - file ends inside the metadata preamble
/// * `LabelError::Csv` - malformed CSV after the preamble
///
/// # Examples
///
/// ```rust
/// use epochlabel::read_annotations;
///
/// # epochlabel::doctest_utils::create_test_annotations("read_table.csv_bi")?;
/// let table = read_annotations("read_table.csv_bi")?;
///
/// // The on-disk `label` column shows up as `category`.
/// assert!(table.has_column("category"));
/// assert!(table.has_column("start_time"));
/// # std::fs::remove_file("read_table.csv_bi").ok();
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
pub fn read_annotations<P: AsRef<Path>>(path: P) -> Result<AnnotationTable> {
    let raw = fs::read_to_string(&path)
        .map_err(|e| LabelError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;

    // 跳过前5行元数据，再把剩余部分交给CSV解析
    let mut offset = 0usize;
    for _ in 0..ANNOTATION_SKIP_LINES {
        match raw[offset..].find('\n') {
            Some(pos) => offset += pos + 1,
            None => {
                return Err(LabelError::InvalidFormat(
                    "Annotation file ends inside the metadata preamble".to_string(),
                ))
            }
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw[offset..].as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| {
            if name == FILE_CATEGORY_COLUMN {
                COLUMN_CATEGORY.to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut table = AnnotationTable::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|value| CellValue::Text(value.to_string()))
                .collect(),
        )?;
    }

    Ok(table)
}

/// Reads an annotation file straight into a typed [`AnnotationSet`].
///
/// Convenience over [`read_annotations`] followed by
/// [`AnnotationSet::from_table`]; all errors of both steps propagate
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use epochlabel::read_annotation_set;
///
/// # epochlabel::doctest_utils::create_test_annotations("read_set.csv_bi")?;
/// let set = read_annotation_set("read_set.csv_bi")?;
/// let labels = set.label_epochs(5, 2)?;
/// assert_eq!(labels.len(), 5);
/// # std::fs::remove_file("read_set.csv_bi").ok();
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
pub fn read_annotation_set<P: AsRef<Path>>(path: P) -> Result<AnnotationSet> {
    AnnotationSet::from_table(&read_annotations(path)?)
}
