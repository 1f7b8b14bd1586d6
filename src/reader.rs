use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use ndarray::Array2;

use crate::error::{LabelError, Result};
use crate::types::{RecordingHeader, SignalParam};
use crate::utils::{atof_nonlocalized, atoi_nonlocalized, parse_edf_time};
use crate::{CHANNEL_LABEL_PREFIX, EDF_MAX_SIGNALS, EDF_TIME_DIMENSION};

/// EDF recording reader feeding the epoch labeler.
///
/// Opens plain EDF and continuous EDF+ (EDF+C) files - clinical seizure
/// corpora ship both - and exposes exactly what the labeling pipeline
/// needs: the sample matrix, the sampling frequency, cleaned channel
/// names, and the epoch count for a given epoch length and overlap.
///
/// # Examples
///
/// ```rust
/// use epochlabel::RecordingReader;
///
/// # epochlabel::doctest_utils::create_test_recording("reader_basic.edf")?;
/// let mut reader = RecordingReader::open("reader_basic.edf")?;
///
/// let fs = reader.sampling_frequency()?;
/// let names = reader.channel_names();
/// let data = reader.read_matrix()?;
///
/// assert_eq!(data.nrows(), names.len());
/// assert_eq!(data.ncols() as f64 % fs, 0.0);
/// # std::fs::remove_file("reader_basic.edf").ok();
/// # Ok::<(), epochlabel::LabelError>(())
/// ```
pub struct RecordingReader {
    file: BufReader<File>,
    header: RecordingHeader,
    /// 文件中每个信号的布局，包括被跳过的注释信号
    layout: Vec<SignalSlot>,
    /// 文件的头部大小（字节）
    header_size: usize,
    /// 每个数据记录的大小（字节）
    record_size: usize,
}

#[derive(Debug, Clone)]
struct SignalSlot {
    /// 每个数据记录中的样本数
    samples_per_record: i32,
    /// 数据通道在 header.signals 中的下标；注释信号为 None
    channel: Option<usize>,
}

impl RecordingReader {
    /// Opens an EDF recording and parses its header.
    ///
    /// Accepts plain EDF and EDF+C files; discontinuous EDF+D files are
    /// rejected. `EDF Annotations` signals are recognized and skipped -
    /// they never appear among the data channels.
    ///
    /// # Errors
    ///
    /// * `LabelError::FileNotFound` - file doesn't exist or can't be opened
    /// * `LabelError::UnsupportedFileType` - not an EDF file, or EDF+D
    /// * `LabelError::InvalidHeader` - header size field inconsistent
    /// * `LabelError::InvalidSignalCount` - no usable signals
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epochlabel::{LabelError, RecordingReader};
    ///
    /// # epochlabel::doctest_utils::create_test_recording("reader_open.edf")?;
    /// let reader = RecordingReader::open("reader_open.edf")?;
    /// println!("Signals: {}", reader.header().signals.len());
    ///
    /// match RecordingReader::open("nonexistent.edf") {
    ///     Err(LabelError::FileNotFound(msg)) => println!("missing: {}", msg),
    ///     other => panic!("expected FileNotFound, got {:?}", other.map(|_| ())),
    /// }
    /// # std::fs::remove_file("reader_open.edf").ok();
    /// # Ok::<(), epochlabel::LabelError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|e| LabelError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;

        let mut reader = BufReader::new(file);
        let (header, layout, record_size) = Self::parse_header(&mut reader)?;
        let header_size = (layout.len() + 1) * 256;

        Ok(RecordingReader {
            file: reader,
            header,
            layout,
            header_size,
            record_size,
        })
    }

    /// Recording metadata: signals, start date and time, record layout.
    pub fn header(&self) -> &RecordingHeader {
        &self.header
    }

    /// Channel names with the conventional `"EEG "` prefix stripped.
    ///
    /// Labels without the prefix are returned unchanged.
    ///
    /// ```rust
    /// use epochlabel::RecordingReader;
    ///
    /// # epochlabel::doctest_utils::create_test_recording("reader_names.edf")?;
    /// let reader = RecordingReader::open("reader_names.edf")?;
    /// assert_eq!(reader.channel_names(), vec!["Fp1", "Cz"]);
    /// # std::fs::remove_file("reader_names.edf").ok();
    /// # Ok::<(), epochlabel::LabelError>(())
    /// ```
    pub fn channel_names(&self) -> Vec<String> {
        self.header
            .signals
            .iter()
            .map(|s| {
                s.label
                    .strip_prefix(CHANNEL_LABEL_PREFIX)
                    .unwrap_or(&s.label)
                    .to_string()
            })
            .collect()
    }

    /// Sampling frequency in Hz, uniform across data channels.
    ///
    /// # Errors
    ///
    /// * `LabelError::MixedSamplingRates` - channels disagree; a
    ///   rectangular sample matrix needs one rate
    pub fn sampling_frequency(&self) -> Result<f64> {
        let samples_per_record = self.uniform_samples_per_record()?;
        Ok(samples_per_record as f64 * EDF_TIME_DIMENSION as f64
            / self.header.datarecord_duration as f64)
    }

    /// Number of fixed-length epochs the recording holds.
    ///
    /// With `fs` the sampling frequency, `samples_per_epoch =
    /// floor(fs * epoch_length)` and `overlap_samples =
    /// floor(fs * epoch_overlap)`:
    ///
    /// ```text
    /// n_epochs = floor((total_samples - overlap_samples)
    ///                  / (samples_per_epoch - overlap_samples))
    /// ```
    ///
    /// # Errors
    ///
    /// * `LabelError::InvalidEpochLength` - non-positive epoch length
    /// * `LabelError::InvalidEpochOverlap` - negative, or at least one
    ///   epoch long
    /// * `LabelError::RecordingTooShort` - recording holds no full epoch
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epochlabel::RecordingReader;
    ///
    /// # epochlabel::doctest_utils::create_test_recording("reader_epochs.edf")?;
    /// let reader = RecordingReader::open("reader_epochs.edf")?;
    ///
    /// // 10 s of data at 256 Hz: five 2-second epochs without overlap,
    /// // nine with 1 s of overlap.
    /// assert_eq!(reader.epoch_count(2, 0)?, 5);
    /// assert_eq!(reader.epoch_count(2, 1)?, 9);
    /// # std::fs::remove_file("reader_epochs.edf").ok();
    /// # Ok::<(), epochlabel::LabelError>(())
    /// ```
    pub fn epoch_count(&self, epoch_length: i64, epoch_overlap: i64) -> Result<i64> {
        if epoch_length <= 0 {
            return Err(LabelError::InvalidEpochLength(epoch_length));
        }
        if epoch_overlap < 0 || epoch_overlap >= epoch_length {
            return Err(LabelError::InvalidEpochOverlap(epoch_overlap));
        }

        let fs = self.sampling_frequency()?;
        let samples_per_epoch = (fs * epoch_length as f64).floor() as i64;
        let overlap_samples = (fs * epoch_overlap as f64).floor() as i64;
        if samples_per_epoch <= overlap_samples {
            return Err(LabelError::InvalidEpochOverlap(epoch_overlap));
        }

        let total_samples = self.samples_per_channel()?;
        let n_epochs = (total_samples - overlap_samples) / (samples_per_epoch - overlap_samples);
        if n_epochs < 1 {
            return Err(LabelError::RecordingTooShort {
                total_samples,
                samples_per_epoch,
            });
        }

        Ok(n_epochs)
    }

    /// Reads the whole recording as a `[channels, samples]` matrix of
    /// physical values.
    ///
    /// Records are demultiplexed in file order; annotation signals are
    /// skipped. Digital values are clamped to the declared digital range
    /// before calibration, as acquisition software occasionally writes
    /// values just outside it.
    ///
    /// # Errors
    ///
    /// * `LabelError::MixedSamplingRates` - data channels disagree on rate
    /// * `LabelError::Io` - file truncated mid-record
    pub fn read_matrix(&mut self) -> Result<Array2<f64>> {
        let n_samples = self.samples_per_channel()? as usize;
        let n_channels = self.header.signals.len();
        let mut data = Array2::<f64>::zeros((n_channels, n_samples));

        self.file.seek(SeekFrom::Start(self.header_size as u64))?;
        let mut record = vec![0u8; self.record_size];

        for r in 0..self.header.datarecords_in_file as usize {
            self.file.read_exact(&mut record)?;

            // 逐信号拆分当前记录
            let mut offset = 0usize;
            for slot in &self.layout {
                let n = slot.samples_per_record as usize;
                if let Some(ch) = slot.channel {
                    let param = &self.header.signals[ch];
                    let base = r * n;
                    for k in 0..n {
                        let raw = [record[offset + 2 * k], record[offset + 2 * k + 1]];
                        let digital = i16::from_le_bytes(raw) as i32;
                        let clamped = digital.clamp(param.digital_min, param.digital_max);
                        data[[ch, base + k]] = param.to_physical(clamped);
                    }
                }
                offset += 2 * n;
            }
        }

        Ok(data)
    }

    fn uniform_samples_per_record(&self) -> Result<i32> {
        let mut rates = self.header.signals.iter().map(|s| s.samples_per_record);
        let first = rates.next().ok_or(LabelError::InvalidSignalCount(0))?;
        if rates.any(|n| n != first) {
            return Err(LabelError::MixedSamplingRates);
        }
        Ok(first)
    }

    fn samples_per_channel(&self) -> Result<i64> {
        Ok(self.uniform_samples_per_record()? as i64 * self.header.datarecords_in_file)
    }

    /// 解析EDF文件头部
    fn parse_header(
        reader: &mut BufReader<File>,
    ) -> Result<(RecordingHeader, Vec<SignalSlot>, usize)> {
        // 读取主头部（256字节）
        reader.seek(SeekFrom::Start(0))?;
        let mut main_header = vec![0u8; 256];
        reader.read_exact(&mut main_header)?;

        // 验证EDF标识
        let version = String::from_utf8_lossy(&main_header[0..8]);
        if version.trim() != "0" {
            return Err(LabelError::UnsupportedFileType(format!(
                "Not an EDF file: version field {:?}",
                version.trim()
            )));
        }

        // 解析信号数量
        let signals_str = String::from_utf8_lossy(&main_header[252..256]);
        let total_signal_count = atoi_nonlocalized(&signals_str);
        if total_signal_count < 1 || total_signal_count as usize > EDF_MAX_SIGNALS {
            return Err(LabelError::InvalidSignalCount(total_signal_count));
        }

        // 验证头部大小
        let header_size_str = String::from_utf8_lossy(&main_header[184..192]);
        let expected_header_size = (total_signal_count + 1) * 256;
        if atoi_nonlocalized(&header_size_str) != expected_header_size {
            return Err(LabelError::InvalidHeader);
        }

        // 保留字段：普通EDF为空白，EDF+C连续文件也接受；EDF+D不支持
        let reserved = String::from_utf8_lossy(&main_header[192..236]);
        if reserved.trim_start().starts_with("EDF+D") {
            return Err(LabelError::UnsupportedFileType(
                "Discontinuous EDF+D files are not supported".to_string(),
            ));
        }

        let patient = String::from_utf8_lossy(&main_header[8..88]).trim().to_string();
        let recording = String::from_utf8_lossy(&main_header[88..168]).trim().to_string();

        // 解析日期和时间
        let date_str = String::from_utf8_lossy(&main_header[168..176]);
        let time_str = String::from_utf8_lossy(&main_header[176..184]);
        let (start_date, start_time) = Self::parse_datetime(&date_str, &time_str)?;

        // 解析数据记录信息
        let datarecords_str = String::from_utf8_lossy(&main_header[236..244]);
        let datarecords = atoi_nonlocalized(&datarecords_str) as i64;
        if datarecords < 1 {
            return Err(LabelError::InvalidFormat(
                "File contains no data records".to_string(),
            ));
        }

        let duration_str = String::from_utf8_lossy(&main_header[244..252]);
        let datarecord_duration = if duration_str.trim() == "1" {
            EDF_TIME_DIMENSION
        } else {
            parse_edf_time(&duration_str)?
        };
        if datarecord_duration <= 0 {
            return Err(LabelError::InvalidFormat(
                "Non-positive data record duration".to_string(),
            ));
        }

        // 读取信号头部信息
        let signal_header_size = total_signal_count as usize * 256;
        let mut signal_header = vec![0u8; signal_header_size];
        reader.read_exact(&mut signal_header)?;

        let (signals, layout, record_size) =
            Self::parse_signals(&signal_header, total_signal_count as usize)?;
        if signals.is_empty() {
            // 文件只含注释信号，没有可用的数据通道
            return Err(LabelError::InvalidSignalCount(0));
        }

        let header = RecordingHeader {
            signals,
            start_date,
            start_time,
            datarecords_in_file: datarecords,
            datarecord_duration,
            file_duration: datarecord_duration * datarecords,
            patient,
            recording,
        };

        Ok((header, layout, record_size))
    }

    /// 解析日期时间
    fn parse_datetime(date_str: &str, time_str: &str) -> Result<(NaiveDate, NaiveTime)> {
        // 解析日期 "dd.mm.yy"
        let date_parts: Vec<&str> = date_str.split('.').collect();
        if date_parts.len() != 3 {
            return Err(LabelError::InvalidFormat(format!(
                "Invalid start date: {:?}",
                date_str
            )));
        }

        let day = atoi_nonlocalized(date_parts[0]);
        let month = atoi_nonlocalized(date_parts[1]);
        let year = {
            let yy = atoi_nonlocalized(date_parts[2]);
            // EDF约定：85-99为19xx，00-84为20xx
            if yy > 84 {
                1900 + yy
            } else {
                2000 + yy
            }
        };

        let start_date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
            .ok_or_else(|| LabelError::InvalidFormat(format!("Invalid start date: {:?}", date_str)))?;

        // 解析时间 "hh.mm.ss"
        let time_parts: Vec<&str> = time_str.split('.').collect();
        if time_parts.len() != 3 {
            return Err(LabelError::InvalidFormat(format!(
                "Invalid start time: {:?}",
                time_str
            )));
        }

        let hour = atoi_nonlocalized(time_parts[0]);
        let minute = atoi_nonlocalized(time_parts[1]);
        let second = atoi_nonlocalized(time_parts[2]);

        let start_time = NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
            .ok_or_else(|| LabelError::InvalidFormat(format!("Invalid start time: {:?}", time_str)))?;

        Ok((start_date, start_time))
    }

    /// 解析信号参数
    fn parse_signals(
        signal_header: &[u8],
        total_signal_count: usize,
    ) -> Result<(Vec<SignalParam>, Vec<SignalSlot>, usize)> {
        let mut signals = Vec::new();
        let mut layout = Vec::new();
        let mut record_size = 0usize;

        for i in 0..total_signal_count {
            // 标签 (16字节)
            let label_start = i * 16;
            let label = String::from_utf8_lossy(&signal_header[label_start..label_start + 16])
                .trim()
                .to_string();

            // 检查是否是注释信号
            let is_annotation = label == "EDF Annotations";

            // 传感器类型 (80字节)
            let transducer_start = total_signal_count * 16 + i * 80;
            let transducer =
                String::from_utf8_lossy(&signal_header[transducer_start..transducer_start + 80])
                    .trim()
                    .to_string();

            // 物理单位 (8字节)
            let unit_start = total_signal_count * 96 + i * 8;
            let physical_dimension =
                String::from_utf8_lossy(&signal_header[unit_start..unit_start + 8])
                    .trim()
                    .to_string();

            // 物理最小值/最大值 (各8字节)
            let phys_min_start = total_signal_count * 104 + i * 8;
            let physical_min = atof_nonlocalized(&String::from_utf8_lossy(
                &signal_header[phys_min_start..phys_min_start + 8],
            ));

            let phys_max_start = total_signal_count * 112 + i * 8;
            let physical_max = atof_nonlocalized(&String::from_utf8_lossy(
                &signal_header[phys_max_start..phys_max_start + 8],
            ));

            // 数字最小值/最大值 (各8字节)
            let dig_min_start = total_signal_count * 120 + i * 8;
            let digital_min = atoi_nonlocalized(&String::from_utf8_lossy(
                &signal_header[dig_min_start..dig_min_start + 8],
            ));

            let dig_max_start = total_signal_count * 128 + i * 8;
            let digital_max = atoi_nonlocalized(&String::from_utf8_lossy(
                &signal_header[dig_max_start..dig_max_start + 8],
            ));

            // 预滤波 (80字节)
            let prefilter_start = total_signal_count * 136 + i * 80;
            let prefilter =
                String::from_utf8_lossy(&signal_header[prefilter_start..prefilter_start + 80])
                    .trim()
                    .to_string();

            // 每个数据记录中的样本数 (8字节)
            let samples_start = total_signal_count * 216 + i * 8;
            let samples_per_record = atoi_nonlocalized(&String::from_utf8_lossy(
                &signal_header[samples_start..samples_start + 8],
            ));
            if samples_per_record < 1 {
                return Err(LabelError::InvalidFormat(format!(
                    "Signal {:?} has non-positive samples per record",
                    label
                )));
            }

            // 只有数据信号才进入用户可见的通道列表
            let channel = if is_annotation {
                None
            } else {
                if physical_min == physical_max {
                    return Err(LabelError::PhysicalMinEqualsMax);
                }
                if digital_min == digital_max {
                    return Err(LabelError::DigitalMinEqualsMax);
                }

                signals.push(SignalParam {
                    label,
                    physical_max,
                    physical_min,
                    digital_max,
                    digital_min,
                    samples_per_record,
                    physical_dimension,
                    prefilter,
                    transducer,
                });
                Some(signals.len() - 1)
            };

            layout.push(SignalSlot {
                samples_per_record,
                channel,
            });

            // 每个样本2字节
            record_size += samples_per_record as usize * 2;
        }

        Ok((signals, layout, record_size))
    }
}
