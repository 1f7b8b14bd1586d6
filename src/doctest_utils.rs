// Internal utilities for documentation tests
// This file contains helper functions to generate fixture files for
// doctests and integration tests

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::types::SignalParam;

/// 写入定宽ASCII字段（左对齐，空格填充，超长截断）
fn field(buf: &mut Vec<u8>, text: &str, width: usize) {
    let mut bytes: Vec<u8> = text.bytes().take(width).collect();
    bytes.resize(width, b' ');
    buf.extend_from_slice(&bytes);
}

/// Writes a synthetic EDF recording with one-second data records.
///
/// `channels` is a list of `(label, samples_per_record)` pairs; with
/// one-second records the per-record sample count doubles as the
/// sampling rate. `reserved` fills the 44-byte reserved field of the
/// main header: `""` produces a plain EDF file, `"EDF+C"` a continuous
/// EDF+ file. Each channel carries a 10 Hz sine plus a per-channel DC
/// offset so channels are distinguishable when read back.
pub fn write_test_recording<P: AsRef<Path>>(
    path: P,
    channels: &[(&str, i32)],
    records: i64,
    reserved: &str,
) -> Result<()> {
    let signals: Vec<SignalParam> = channels
        .iter()
        .map(|&(label, samples_per_record)| SignalParam {
            label: label.to_string(),
            physical_max: 200.0,
            physical_min: -200.0,
            digital_max: 32767,
            digital_min: -32768,
            samples_per_record,
            physical_dimension: "uV".to_string(),
            prefilter: "HP:0.1Hz LP:70Hz".to_string(),
            transducer: "AgAgCl electrodes".to_string(),
        })
        .collect();

    let ns = signals.len();
    let mut header = Vec::with_capacity((ns + 1) * 256);

    // 主头部（256字节）
    field(&mut header, "0", 8);
    field(&mut header, "X X X X", 80);
    field(&mut header, "Startdate 02-JAN-2023 X X X", 80);
    field(&mut header, "02.01.23", 8);
    field(&mut header, "10.30.00", 8);
    field(&mut header, &((ns + 1) * 256).to_string(), 8);
    field(&mut header, reserved, 44);
    field(&mut header, &records.to_string(), 8);
    field(&mut header, "1", 8);
    field(&mut header, &ns.to_string(), 4);

    // 信号头部：按字段分组，每组覆盖所有信号
    for s in &signals {
        field(&mut header, &s.label, 16);
    }
    for s in &signals {
        field(&mut header, &s.transducer, 80);
    }
    for s in &signals {
        field(&mut header, &s.physical_dimension, 8);
    }
    for s in &signals {
        field(&mut header, &s.physical_min.to_string(), 8);
    }
    for s in &signals {
        field(&mut header, &s.physical_max.to_string(), 8);
    }
    for s in &signals {
        field(&mut header, &s.digital_min.to_string(), 8);
    }
    for s in &signals {
        field(&mut header, &s.digital_max.to_string(), 8);
    }
    for s in &signals {
        field(&mut header, &s.prefilter, 80);
    }
    for s in &signals {
        field(&mut header, &s.samples_per_record.to_string(), 8);
    }
    for _ in &signals {
        field(&mut header, "", 32);
    }

    let mut file = File::create(path)?;
    file.write_all(&header)?;

    // 数据记录：小端序16位样本，按信号顺序排列
    for r in 0..records {
        for (ch, s) in signals.iter().enumerate() {
            let mut bytes = Vec::with_capacity(s.samples_per_record as usize * 2);
            for k in 0..s.samples_per_record {
                let t = (r * s.samples_per_record as i64 + k as i64) as f64
                    / s.samples_per_record as f64;
                let physical = 50.0 * (2.0 * std::f64::consts::PI * 10.0 * t).sin()
                    + 10.0 * (ch as f64 + 1.0);
                let digital = s.to_digital(physical) as i16;
                bytes.extend_from_slice(&digital.to_le_bytes());
            }
            file.write_all(&bytes)?;
        }
    }

    Ok(())
}

/// Creates the standard test recording: two EEG channels at 256 Hz,
/// 10 seconds, plain EDF.
pub fn create_test_recording<P: AsRef<Path>>(path: P) -> Result<()> {
    write_test_recording(path, &[("EEG Fp1", 256), ("EEG Cz", 256)], 10, "")
}

/// Writes a term-level annotation file: 5 metadata lines, a header row,
/// one data row per `(start_time, stop_time, label)` interval.
pub fn write_test_annotations<P: AsRef<Path>>(path: P, rows: &[(f64, f64, &str)]) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "# version = csv_v1.0.0")?;
    writeln!(file, "# bname = fixture_s001_t000")?;
    writeln!(file, "# duration = 10.0000 secs")?;
    writeln!(file, "# montage_file = nedc_eas_default_montage.txt")?;
    writeln!(file, "#")?;
    writeln!(file, "channel,start_time,stop_time,label,confidence")?;
    for &(start, stop, label) in rows {
        writeln!(file, "TERM,{:.4},{:.4},{},1.0000", start, stop, label)?;
    }
    Ok(())
}

/// Creates the standard annotation fixture for the 10-second test
/// recording: background, a 4-8 s seizure, background again.
pub fn create_test_annotations<P: AsRef<Path>>(path: P) -> Result<()> {
    write_test_annotations(
        path,
        &[(0.0, 4.0, "bckg"), (4.0, 8.0, "seiz"), (8.0, 10.0, "bckg")],
    )
}
