use epochlabel::doctest_utils::{create_test_annotations, write_test_annotations};
use epochlabel::{
    label_epochs, read_annotation_set, read_annotations, AnnotationSet, LabelError,
};
use std::fs;
use std::io::Write;
use std::path::Path;

// 清理测试文件的辅助函数
fn cleanup_test_file(filename: &str) {
    if Path::new(filename).exists() {
        fs::remove_file(filename).ok();
    }
}

#[test]
fn test_read_annotation_table() {
    let filename = "test_read_table.csv_bi";
    create_test_annotations(filename).unwrap();

    let table = read_annotations(filename).unwrap();

    // 磁盘上的 label 列以 category 呈现
    assert!(table.has_column("category"));
    assert!(!table.has_column("label"));
    assert!(table.has_column("start_time"));
    assert!(table.has_column("stop_time"));
    // 额外的列被保留但不参与标注
    assert!(table.has_column("channel"));
    assert!(table.has_column("confidence"));
    assert_eq!(table.n_rows(), 3);

    cleanup_test_file(filename);
}

#[test]
fn test_metadata_preamble_skipped_regardless_of_content() {
    let filename = "test_odd_preamble.csv_bi";
    {
        let mut file = fs::File::create(filename).unwrap();
        // 前5行不以 # 开头也必须被跳过
        writeln!(file, "version csv_v1.0.0").unwrap();
        writeln!(file, "bname fixture").unwrap();
        writeln!(file, "duration 10 secs").unwrap();
        writeln!(file, "montage none").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "channel,start_time,stop_time,label,confidence").unwrap();
        writeln!(file, "TERM,2.0000,6.0000,seiz,1.0000").unwrap();
    }

    let table = read_annotations(filename).unwrap();
    assert_eq!(table.n_rows(), 1);

    let labels = label_epochs(5, 2, &table).unwrap();
    assert_eq!(labels, vec![0, 1, 1, 0, 0]);

    cleanup_test_file(filename);
}

#[test]
fn test_truncated_preamble_rejected() {
    let filename = "test_short_preamble.csv_bi";
    {
        let mut file = fs::File::create(filename).unwrap();
        writeln!(file, "# version = csv_v1.0.0").unwrap();
        writeln!(file, "# bname = fixture").unwrap();
    }

    match read_annotations(filename) {
        Err(LabelError::InvalidFormat(msg)) => {
            println!("truncated preamble rejected: {}", msg);
        }
        other => panic!("expected InvalidFormat, got {:?}", other.map(|_| ())),
    }

    cleanup_test_file(filename);
}

#[test]
fn test_missing_file() {
    match read_annotations("no_such_annotations.csv_bi") {
        Err(LabelError::FileNotFound(msg)) => {
            assert!(msg.contains("no_such_annotations.csv_bi"));
        }
        other => panic!("expected FileNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_read_typed_annotation_set() {
    let filename = "test_read_set.csv_bi";
    create_test_annotations(filename).unwrap();

    let set = read_annotation_set(filename).unwrap();
    assert_eq!(set.len(), 3);

    let seizure: Vec<_> = set.iter().filter(|iv| iv.category == "seiz").collect();
    assert_eq!(seizure.len(), 1);
    assert_eq!(seizure[0].start_time, 4);
    assert_eq!(seizure[0].stop_time, 8);

    cleanup_test_file(filename);
}

#[test]
fn test_labels_from_annotation_file() {
    let filename = "test_label_from_file.csv_bi";
    create_test_annotations(filename).unwrap();

    // 10秒记录、2秒窗口：发作区间 [4, 8) 覆盖第2、3个窗口
    let table = read_annotations(filename).unwrap();
    let labels = label_epochs(5, 2, &table).unwrap();
    assert_eq!(labels, vec![0, 0, 1, 1, 0]);

    cleanup_test_file(filename);
}

#[test]
fn test_float_formatted_times_accepted_when_integral() {
    let filename = "test_integral_times.csv_bi";
    write_test_annotations(filename, &[(2.0, 6.0, "seiz")]).unwrap();

    // 文件中的时间写作 "2.0000" / "6.0000"，仍然是可表示的整数
    let set = read_annotation_set(filename).unwrap();
    assert_eq!(set.iter().next().unwrap().start_time, 2);
    assert_eq!(set.iter().next().unwrap().stop_time, 6);

    cleanup_test_file(filename);
}

#[test]
fn test_fractional_times_rejected() {
    let filename = "test_fractional_times.csv_bi";
    write_test_annotations(filename, &[(36.8866, 183.3055, "seiz")]).unwrap();

    match read_annotation_set(filename) {
        Err(LabelError::TimeNotIntegral { column, value }) => {
            assert_eq!(column, "start_time");
            assert_eq!(value, "36.8866");
        }
        other => panic!("expected TimeNotIntegral, got {:?}", other.map(|_| ())),
    }

    cleanup_test_file(filename);
}

#[test]
fn test_unparseable_time_chains_cause() {
    let filename = "test_bad_time.csv_bi";
    {
        let mut file = fs::File::create(filename).unwrap();
        for _ in 0..5 {
            writeln!(file, "#").unwrap();
        }
        writeln!(file, "channel,start_time,stop_time,label,confidence").unwrap();
        writeln!(file, "TERM,ten,30.0000,seiz,1.0000").unwrap();
    }

    let err = read_annotation_set(filename).unwrap_err();
    match &err {
        LabelError::TimeParse { column, value, .. } => {
            assert_eq!(*column, "start_time");
            assert_eq!(value, "ten");
        }
        other => panic!("expected TimeParse, got {:?}", other),
    }
    // 底层解析失败必须作为 source 保留
    assert!(std::error::Error::source(&err).is_some());

    cleanup_test_file(filename);
}

#[test]
fn test_missing_columns_in_file_all_reported() {
    let filename = "test_missing_cols.csv_bi";
    {
        let mut file = fs::File::create(filename).unwrap();
        for _ in 0..5 {
            writeln!(file, "#").unwrap();
        }
        writeln!(file, "channel,start_time,confidence").unwrap();
        writeln!(file, "TERM,0.0000,1.0000").unwrap();
    }

    let table = read_annotations(filename).unwrap();
    match AnnotationSet::from_table(&table) {
        Err(LabelError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["stop_time".to_string(), "category".to_string()]);
        }
        other => panic!("expected MissingColumns, got {:?}", other.map(|_| ())),
    }

    cleanup_test_file(filename);
}

#[test]
fn test_header_only_file_labels_all_zero() {
    let filename = "test_header_only.csv_bi";
    write_test_annotations(filename, &[]).unwrap();

    let table = read_annotations(filename).unwrap();
    assert!(table.is_empty());

    let labels = label_epochs(4, 30, &table).unwrap();
    assert_eq!(labels, vec![0, 0, 0, 0]);

    cleanup_test_file(filename);
}

#[test]
fn test_invalid_interval_in_file() {
    let filename = "test_empty_interval.csv_bi";
    write_test_annotations(filename, &[(5.0, 5.0, "seiz")]).unwrap();

    assert!(matches!(
        read_annotation_set(filename),
        Err(LabelError::InvalidInterval { start: 5, stop: 5 })
    ));

    cleanup_test_file(filename);
}
