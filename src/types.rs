use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{EdfError, Result};
use crate::ANNOTATION_LABEL;

/// Record duration as kept in the header.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDuration {
    /// Parsed seconds.
    Seconds(f64),
    /// The raw field text, untouched.
    Text(String),
}

impl RecordDuration {
    /// Duration in seconds, if the field is numeric.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            RecordDuration::Seconds(s) => Some(*s),
            RecordDuration::Text(t) => t.trim().parse().ok(),
        }
    }
}

/// Scalar fields of the fixed 256-byte header.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingInfo {
    pub version: i64,
    pub patient_id: String,
    pub recording_id: String,
    /// 原始文本 "dd.mm.yy"
    pub start_date: String,
    /// 原始文本 "hh.mm.ss"
    pub start_time: String,
    /// 头部声明的字节数
    pub header_bytes: i64,
    pub reserved: String,
    /// 声明的数据记录数，可能为 -1
    pub records: i64,
    pub duration: RecordDuration,
    pub signal_count: usize,
}

impl RecordingInfo {
    /// Start of the recording, parsed from the `dd.mm.yy` / `hh.mm.ss` fields.
    ///
    /// Two-digit years use the EDF clipping rule: 85-99 map to 19xx, the rest to 20xx.
    /// Returns `None` when either field is not a valid date or time.
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        let date = parse_triplet(&self.start_date)?;
        let time = parse_triplet(&self.start_time)?;

        let year = if date.2 > 84 { 1900 + date.2 } else { 2000 + date.2 };
        let start_date = NaiveDate::from_ymd_opt(year as i32, date.1, date.0)?;
        let start_time = NaiveTime::from_hms_opt(time.0, time.1, time.2)?;

        Some(NaiveDateTime::new(start_date, start_time))
    }
}

fn parse_triplet(s: &str) -> Option<(u32, u32, u32)> {
    let mut parts = s.trim().split('.');
    let a = parts.next()?.trim().parse().ok()?;
    let b = parts.next()?.trim().parse().ok()?;
    let c = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((a, b, c))
}

/// Per-channel header metadata. Text fields other than the label keep their padding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelParam {
    /// 已去除首尾空白
    pub label: String,
    pub transducer: String,
    pub physical_unit: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i64,
    pub digital_max: i64,
    pub prefilter: String,
    pub samples_per_record: usize,
    pub reserved: String,
    /// samples_per_record / record duration
    pub sample_rate: f64,
}

impl ChannelParam {
    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }

    /// Size in bytes of this channel's block within one record.
    pub fn block_size(&self) -> usize {
        self.samples_per_record * 2
    }
}

/// A decoded EDF header.
///
/// The per-channel metadata always holds exactly `info.signal_count` entries;
/// [`EdfHeader::new`] refuses anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfHeader {
    pub(crate) info: RecordingInfo,
    pub(crate) channels: Vec<ChannelParam>,
}

impl EdfHeader {
    pub fn new(info: RecordingInfo, channels: Vec<ChannelParam>) -> Result<Self> {
        if channels.len() != info.signal_count {
            return Err(EdfError::InvalidHeader(format!(
                "header declares {} signals but {} channel entries were given",
                info.signal_count,
                channels.len()
            )));
        }
        Ok(EdfHeader { info, channels })
    }

    pub fn info(&self) -> &RecordingInfo {
        &self.info
    }

    pub fn channels(&self) -> &[ChannelParam] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Result<&ChannelParam> {
        self.channels.get(index).ok_or(EdfError::InvalidSignalIndex(index))
    }

    pub fn signal_count(&self) -> usize {
        self.info.signal_count
    }

    /// Number of records to decode; a negative declared count yields zero.
    pub fn record_count(&self) -> usize {
        self.info.records.max(0) as usize
    }

    pub fn labels(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.label.as_str()).collect()
    }

    /// Indices of every "EDF Annotations" channel, in file order.
    pub fn annotation_indices(&self) -> Vec<usize> {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_annotation())
            .map(|(i, _)| i)
            .collect()
    }

    /// Header view restricted to `indices`. Scalar fields are left unchanged,
    /// including `signal_count`.
    pub fn restrict(&self, indices: &[usize]) -> Result<TargetHeader> {
        let channels = indices
            .iter()
            .map(|&i| self.channel(i).cloned())
            .collect::<Result<Vec<_>>>()?;

        Ok(TargetHeader {
            info: self.info.clone(),
            indices: indices.to_vec(),
            channels,
        })
    }
}

/// Header fields for a channel selection.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetHeader {
    pub info: RecordingInfo,
    /// Original channel index of each entry in `channels`.
    pub indices: Vec<usize>,
    pub channels: Vec<ChannelParam>,
}

impl TargetHeader {
    pub fn labels(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.label.as_str()).collect()
    }
}

/// Column names of an annotation triplet.
pub const ANNOTATION_SCHEMA: [&str; 3] = ["onset", "duration", "label"];

/// One TAL entry. Values stay as the text stored in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub onset: String,
    pub duration: String,
    pub label: String,
}

impl Annotation {
    pub fn new(
        onset: impl Into<String>,
        duration: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Annotation {
            onset: onset.into(),
            duration: duration.into(),
            label: label.into(),
        }
    }

    pub fn schema() -> [&'static str; 3] {
        ANNOTATION_SCHEMA
    }

    /// Onset in seconds, when the text is a plain decimal number.
    pub fn onset_seconds(&self) -> Option<f64> {
        self.onset.trim().parse().ok()
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration.trim().parse().ok()
    }
}

/// Output of the signal decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSignals {
    /// Channel indices, in file order, matching `signals`.
    pub indices: Vec<usize>,
    /// Physical samples, one sequence per selected channel.
    pub signals: Vec<Vec<f64>>,
    pub target_header: Option<TargetHeader>,
}

impl DecodedSignals {
    /// Samples of the channel at original file index `index`, if it was selected.
    pub fn by_index(&self, index: usize) -> Option<&[f64]> {
        self.indices
            .iter()
            .position(|&i| i == index)
            .map(|pos| self.signals[pos].as_slice())
    }
}

/// Everything read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfRecording {
    pub header: EdfHeader,
    pub signals: DecodedSignals,
    pub annotations: Vec<Annotation>,
}
