use assert_approx_eq::assert_approx_eq;
use edfdecode::doctest_utils::EdfBuilder;
use edfdecode::{
    decode_header, decode_signals, read_edf, select_channels, DecodeOptions, DurationMode,
    EdfError, EdfReader, RecordDuration, RecordLayout, TargetHeaderMode,
};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

// 把测试文件写入临时目录的辅助函数
fn write_fixture(dir: &TempDir, name: &str, builder: &EdfBuilder) -> PathBuf {
    let path = dir.path().join(name);
    builder.write_to(&path).unwrap();
    path
}

// 类似睡眠记录的测试文件：两个 EEG、一个 EOG 和一个注释通道
fn sleep_recording() -> EdfBuilder {
    let fpz: Vec<i16> = (0..300).map(|i| ((i as f64 * 0.3).sin() * 20000.0) as i16).collect();
    let pz: Vec<i16> = (0..300).map(|i| (i % 100) as i16 * 300 - 15000).collect();
    let eog: Vec<i16> = (0..30).map(|i| i as i16 * 10).collect();

    EdfBuilder::new()
        .patient("SC4001 F 01-JAN-1933 Subject_1")
        .recording("Startdate 24-APR-1989 X X Sleep_lab")
        .start("24.04.89", "16.13.00")
        .record_duration("1")
        .signal("EEG Fpz-Cz", 100)
        .signal("EEG Pz-Oz", 100)
        .signal("EOG horizontal", 10)
        .calibration(2, (-1000.0, 1000.0), (-2048, 2047))
        .annotation_signal(30)
        .records(3)
        .digital(0, &fpz)
        .digital(1, &pz)
        .digital(2, &eog)
}

#[test]
fn test_per_channel_arrays_match_signal_count() {
    let bytes = sleep_recording().build();
    let (header, _) = decode_header(&mut Cursor::new(&bytes), DecodeOptions::default()).unwrap();

    assert_eq!(header.signal_count(), 4);
    assert_eq!(header.channels().len(), 4);
    assert_eq!(
        header.labels(),
        vec!["EEG Fpz-Cz", "EEG Pz-Oz", "EOG horizontal", "EDF Annotations"]
    );

    let rates: Vec<f64> = header.channels().iter().map(|c| c.sample_rate).collect();
    assert_eq!(rates, vec![100.0, 100.0, 10.0, 30.0]);
    assert_eq!(header.annotation_indices(), vec![3]);
}

#[test]
fn test_data_offset_matches_declared_header_size() {
    let bytes = sleep_recording().build();
    let (header, data_offset) =
        decode_header(&mut Cursor::new(&bytes), DecodeOptions::default()).unwrap();
    assert_eq!(data_offset as i64, header.info().header_bytes);
    assert_eq!(data_offset, 256 * 5);
}

#[test]
fn test_accepted_file_holds_all_records() {
    let bytes = sleep_recording().build();
    let mut cursor = Cursor::new(&bytes);
    let (header, data_offset) = decode_header(&mut cursor, DecodeOptions::default()).unwrap();
    let indices = select_channels::<&str>(&header, &[]);
    decode_signals(&mut cursor, &header, data_offset, &indices, DecodeOptions::default()).unwrap();

    let layout = RecordLayout::from_header(&header);
    assert!(bytes.len() as u64 >= data_offset + layout.data_len(header.record_count()));
}

#[test]
fn test_single_channel_path_equals_full_path() {
    for records in [0, 1, 3] {
        let bytes = sleep_recording().records(records).build();
        let mut cursor = Cursor::new(&bytes);
        let (header, offset) = decode_header(&mut cursor, DecodeOptions::default()).unwrap();

        let options = DecodeOptions::default();
        let all_indices = select_channels::<&str>(&header, &[]);
        let all = decode_signals(&mut cursor, &header, offset, &all_indices, options).unwrap();

        for (position, &index) in all_indices.iter().enumerate() {
            let single = decode_signals(&mut cursor, &header, offset, &[index], options).unwrap();
            assert_eq!(single.signals[0], all.signals[position]);
            assert_eq!(
                single.signals[0].len(),
                records as usize * header.channels()[index].samples_per_record
            );
        }
    }
}

#[test]
fn test_eog_scaling_with_reduced_digital_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "eog.edf", &sleep_recording());

    let mut reader = EdfReader::open(&path).unwrap();
    let eog = reader.read_signal("EOG horizontal").unwrap().unwrap();
    assert_eq!(eog.len(), 30);

    let scale = 2000.0 / 4095.0;
    let offset = 1000.0 - scale * 2047.0;
    for (i, value) in eog.iter().enumerate() {
        assert_approx_eq!(*value, (i as f64 * 10.0) * scale + offset, 1e-9);
    }
}

#[test]
fn test_reader_subset_has_target_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "subset.edf", &sleep_recording());

    let mut reader = EdfReader::open(&path).unwrap();
    let decoded = reader.read_signals(&["EOG horizontal", "EEG Fpz-Cz", "Resp oro-nasal"]).unwrap();

    assert_eq!(decoded.indices, vec![0, 2]);
    let target = decoded.target_header.unwrap();
    assert_eq!(target.labels(), vec!["EEG Fpz-Cz", "EOG horizontal"]);
    assert_eq!(target.info.signal_count, 4);
    assert_eq!(target.channels[1].digital_max, 2047);

    let all = reader.read_signals::<&str>(&[]).unwrap();
    assert!(all.target_header.is_none());
    assert_eq!(all.signals.len(), 4);
}

#[test]
fn test_target_header_never() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "never.edf", &sleep_recording());
    let options = DecodeOptions::new().target_header(TargetHeaderMode::Never);

    let recording = read_edf(&path, &["EEG Pz-Oz"], options).unwrap();
    assert!(recording.signals.target_header.is_none());
    assert_eq!(recording.signals.signals[0].len(), 300);
}

#[test]
fn test_duration_modes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "duration.edf", &sleep_recording().record_duration("0.5"));

    let seconds = EdfReader::open(&path).unwrap().into_header();
    assert_eq!(seconds.info().duration, RecordDuration::Seconds(0.5));
    assert_eq!(seconds.channels()[0].sample_rate, 200.0);

    let options = DecodeOptions::new().duration(DurationMode::Text);
    let text = EdfReader::open_with(&path, options).unwrap().into_header();
    assert_eq!(text.info().duration, RecordDuration::Text("0.5     ".to_string()));
    assert_eq!(text.info().duration.seconds(), Some(0.5));
    assert_eq!(text.channels(), seconds.channels());
}

#[test]
fn test_start_datetime_from_header() {
    let bytes = sleep_recording().build();
    let (header, _) = decode_header(&mut Cursor::new(&bytes), DecodeOptions::default()).unwrap();
    let start = header.info().start_datetime().unwrap();
    assert_eq!(start.to_string(), "1989-04-24 16:13:00");
    assert!(header.info().patient_id.starts_with("SC4001"));
}

#[test]
fn test_calibration_error_for_selected_channel_only() {
    let builder = sleep_recording().calibration(2, (-1.0, 1.0), (100, 100));
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "flat.edf", &builder);

    let mut reader = EdfReader::open(&path).unwrap();
    let err = reader.read_signals(&["EOG horizontal"]).unwrap_err();
    match err {
        EdfError::Calibration { channel, label } => {
            assert_eq!(channel, 2);
            assert_eq!(label, "EOG horizontal");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // 其他通道不受影响
    let ok = reader.read_signals(&["EEG Fpz-Cz", "EEG Pz-Oz"]).unwrap();
    assert_eq!(ok.signals.len(), 2);
    assert!(ok.signals.iter().flatten().all(|v| v.is_finite()));
}

#[test]
fn test_truncated_data_region() {
    let bytes = sleep_recording().build();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.edf");
    std::fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();

    let mut reader = EdfReader::open(&path).unwrap();
    assert!(reader.read_signals::<&str>(&[]).unwrap_err().is_truncation());
    assert!(reader.read_annotations().unwrap_err().is_truncation());

    let parallel = read_edf::<_, &str>(&path, &[], DecodeOptions::new().parallel(true));
    assert!(parallel.unwrap_err().is_truncation());
}

#[test]
fn test_non_numeric_header_field() {
    let mut bytes = sleep_recording().build();
    // 第一个通道的 physical_min 字段
    let ns = 4;
    let start = 256 + ns * 104;
    bytes[start..start + 8].copy_from_slice(b"low     ");

    let err = decode_header(&mut Cursor::new(&bytes), DecodeOptions::default()).unwrap_err();
    match err {
        EdfError::NumericFormat { field, value } => {
            assert_eq!(field, "physical_min");
            assert_eq!(value, "low     ");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_negative_record_count_reads_nothing() {
    let mut bytes = sleep_recording().build();
    bytes[236..244].copy_from_slice(b"-1      ");

    let mut cursor = Cursor::new(&bytes);
    let (header, offset) = decode_header(&mut cursor, DecodeOptions::default()).unwrap();
    assert_eq!(header.info().records, -1);
    let decoded =
        decode_signals(&mut cursor, &header, offset, &[0], DecodeOptions::default()).unwrap();
    assert!(decoded.signals[0].is_empty());
}
