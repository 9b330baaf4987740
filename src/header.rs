use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::error::{EdfError, Result};
use crate::options::{DecodeOptions, DurationMode};
use crate::types::{ChannelParam, EdfHeader, RecordDuration, RecordingInfo};
use crate::utils::{latin1_to_string, parse_float_field, parse_int_field, read_exact_or_truncated};

/// Sequential reader over the fixed-width ASCII fields of the header.
struct FieldReader<'a, R> {
    inner: &'a mut R,
}

impl<'a, R: Read> FieldReader<'a, R> {
    fn text(&mut self, width: usize, field: &'static str) -> Result<String> {
        let bytes = read_exact_or_truncated(&mut *self.inner, width, field)?;
        Ok(latin1_to_string(&bytes))
    }

    fn int(&mut self, width: usize, field: &'static str) -> Result<i64> {
        let text = self.text(width, field)?;
        parse_int_field(&text, field)
    }

    fn float(&mut self, width: usize, field: &'static str) -> Result<f64> {
        let text = self.text(width, field)?;
        parse_float_field(&text, field)
    }

    /// 读取 ns 个同类字段（每个数组在下一个数组之前读完）
    fn array<T>(
        &mut self,
        ns: usize,
        mut read_one: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        (0..ns).map(|_| read_one(self)).collect()
    }
}

/// Decodes the header of an EDF stream.
///
/// The reader is rewound to offset 0 first. Returns the header and the byte
/// offset of the data region, i.e. the position right after the last
/// per-channel field.
///
/// # Errors
///
/// * [`EdfError::Truncated`] if the stream ends inside a field
/// * [`EdfError::NumericFormat`] if a numeric field does not parse
/// * [`EdfError::InvalidSignalCount`] if the channel count is negative
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfdecode::{decode_header, DecodeOptions};
/// # use edfdecode::doctest_utils::EdfBuilder;
/// # let bytes = EdfBuilder::new().signal("EEG Fpz-Cz", 4).records(1).build();
///
/// let (header, data_offset) = decode_header(&mut Cursor::new(&bytes), DecodeOptions::default())?;
/// assert_eq!(header.labels(), vec!["EEG Fpz-Cz"]);
/// assert_eq!(data_offset, 512);
/// # Ok::<(), edfdecode::EdfError>(())
/// ```
pub fn decode_header<R: Read + Seek>(
    reader: &mut R,
    options: DecodeOptions,
) -> Result<(EdfHeader, u64)> {
    reader.seek(SeekFrom::Start(0))?;
    let mut fields = FieldReader { inner: &mut *reader };

    let version = fields.int(8, "version")?;
    let patient_id = fields.text(80, "patient_id")?;
    let recording_id = fields.text(80, "recording_id")?;
    let start_date = fields.text(8, "start_date")?;
    let start_time = fields.text(8, "start_time")?;
    let header_bytes = fields.int(8, "header_bytes")?;
    let reserved = fields.text(44, "reserved")?;
    let records = fields.int(8, "records")?;

    let duration_text = fields.text(8, "duration")?;
    let duration_seconds = parse_float_field(&duration_text, "duration")?;
    let duration = match options.duration_mode() {
        DurationMode::Seconds => RecordDuration::Seconds(duration_seconds),
        DurationMode::Text => RecordDuration::Text(duration_text),
    };

    let signal_count = fields.int(4, "signal_count")?;
    if signal_count < 0 {
        return Err(EdfError::InvalidSignalCount(signal_count));
    }
    let ns = signal_count as usize;

    let labels = fields.array(ns, |f| Ok(f.text(16, "label")?.trim().to_string()))?;
    let transducers = fields.array(ns, |f| f.text(80, "transducer"))?;
    let units = fields.array(ns, |f| f.text(8, "physical_unit"))?;
    let physical_mins = fields.array(ns, |f| f.float(8, "physical_min"))?;
    let physical_maxs = fields.array(ns, |f| f.float(8, "physical_max"))?;
    let digital_mins = fields.array(ns, |f| f.int(8, "digital_min"))?;
    let digital_maxs = fields.array(ns, |f| f.int(8, "digital_max"))?;
    let prefilters = fields.array(ns, |f| f.text(80, "prefilter"))?;
    let samples = fields.array(ns, |f| {
        let text = f.text(8, "samples_per_record")?;
        let value = parse_int_field(&text, "samples_per_record")?;
        usize::try_from(value).map_err(|_| EdfError::NumericFormat {
            field: "samples_per_record",
            value: text,
        })
    })?;
    let reserved2 = fields.array(ns, |f| f.text(32, "reserved2"))?;

    let data_offset = reader.stream_position()?;

    if duration_seconds == 0.0 {
        warn!("record duration is zero, sampling rates reported as 0");
    }
    if header_bytes != data_offset as i64 {
        warn!(
            "declared header size {} differs from decoded data offset {}",
            header_bytes, data_offset
        );
    }
    if records < 0 {
        warn!("negative record count {}, no records will be decoded", records);
    }

    let mut channels = Vec::with_capacity(ns);
    let per_channel = labels
        .into_iter()
        .zip(transducers)
        .zip(units)
        .zip(prefilters)
        .zip(reserved2)
        .enumerate();
    for (i, ((((label, transducer), physical_unit), prefilter), reserved)) in per_channel {
        let samples_per_record = samples[i];
        let sample_rate = if duration_seconds == 0.0 {
            0.0
        } else {
            samples_per_record as f64 / duration_seconds
        };

        channels.push(ChannelParam {
            label,
            transducer,
            physical_unit,
            physical_min: physical_mins[i],
            physical_max: physical_maxs[i],
            digital_min: digital_mins[i],
            digital_max: digital_maxs[i],
            prefilter,
            samples_per_record,
            reserved,
            sample_rate,
        });
    }

    let info = RecordingInfo {
        version,
        patient_id,
        recording_id,
        start_date,
        start_time,
        header_bytes,
        reserved,
        records,
        duration,
        signal_count: ns,
    };

    let header = EdfHeader::new(info, channels)?;
    debug!(
        "decoded EDF header: {} channels, {} records, data at offset {}",
        ns, records, data_offset
    );

    Ok((header, data_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::EdfBuilder;
    use std::io::Cursor;

    fn decode(bytes: &[u8]) -> Result<(EdfHeader, u64)> {
        decode_header(&mut Cursor::new(bytes), DecodeOptions::default())
    }

    #[test]
    fn test_decode_basic_header() {
        let bytes = EdfBuilder::new()
            .patient("P001 M 01-JAN-1990 Test")
            .record_duration("0.5")
            .signal("EEG Fpz-Cz", 50)
            .signal("EDF Annotations", 30)
            .records(3)
            .build();

        let (header, offset) = decode(&bytes).unwrap();
        let info = header.info();
        assert_eq!(info.version, 0);
        assert!(info.patient_id.starts_with("P001 M 01-JAN-1990 Test"));
        assert_eq!(info.patient_id.len(), 80);
        assert_eq!(info.records, 3);
        assert_eq!(info.duration, RecordDuration::Seconds(0.5));
        assert_eq!(header.signal_count(), 2);
        assert_eq!(offset, 768);
        assert_eq!(info.header_bytes, offset as i64);

        let eeg = header.channel(0).unwrap();
        assert_eq!(eeg.label, "EEG Fpz-Cz");
        assert_eq!(eeg.samples_per_record, 50);
        assert_eq!(eeg.sample_rate, 100.0);
        assert_eq!(eeg.physical_unit.trim(), "uV");
        assert_eq!(eeg.transducer.len(), 80);
        assert!(header.channel(1).unwrap().is_annotation());
    }

    #[test]
    fn test_duration_text_mode() {
        let bytes = EdfBuilder::new().record_duration("1").signal("A", 1).build();
        let options = DecodeOptions::new().duration(DurationMode::Text);
        let (header, _) = decode_header(&mut Cursor::new(&bytes), options).unwrap();
        assert_eq!(header.info().duration, RecordDuration::Text("1       ".to_string()));
        assert_eq!(header.channel(0).unwrap().sample_rate, 1.0);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = EdfBuilder::new().signal("A", 1).signal("B", 1).build();
        // 截断在信号头部中间
        let err = decode(&bytes[..300]).unwrap_err();
        assert!(err.is_truncation());

        let err = decode(&bytes[..4]).unwrap_err();
        match err {
            EdfError::Truncated { field, expected, found } => {
                assert_eq!(field, "version");
                assert_eq!(expected, 8);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field() {
        let mut bytes = EdfBuilder::new().signal("A", 1).build();
        bytes[236..244].copy_from_slice(b"abc     ");
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, EdfError::NumericFormat { field: "records", .. }));
    }

    #[test]
    fn test_negative_samples_per_record() {
        let mut bytes = EdfBuilder::new().signal("A", 1).build();
        // samples_per_record 字段位于 256 + 216
        bytes[472..480].copy_from_slice(b"-4      ");
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, EdfError::NumericFormat { field: "samples_per_record", .. }));
    }

    #[test]
    fn test_zero_channels() {
        let bytes = EdfBuilder::new().records(0).build();
        let (header, offset) = decode(&bytes).unwrap();
        assert_eq!(header.signal_count(), 0);
        assert_eq!(offset, 256);
    }

    #[test]
    fn test_reserved_field_kept_as_text() {
        let bytes = EdfBuilder::new().reserved("EDF+C").signal("A", 1).build();
        let (header, _) = decode(&bytes).unwrap();
        let reserved = &header.info().reserved;
        assert_eq!(reserved.len(), 44);
        assert!(reserved.starts_with("EDF+C"));
        assert_eq!(reserved.trim_end(), "EDF+C");
    }
}
