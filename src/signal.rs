use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;
use rayon::prelude::*;

use crate::error::{EdfError, Result};
use crate::layout::{RecordLayout, Scaling};
use crate::options::DecodeOptions;
use crate::types::{DecodedSignals, EdfHeader};
use crate::utils::read_exact_or_truncated;

/// Fails with [`EdfError::Truncated`] unless the stream holds every block of
/// channel `index` for `records` records.
///
/// Runs before any block is read or any buffer is sized from header counts.
fn ensure_blocks_present<R: Seek>(
    reader: &mut R,
    layout: &RecordLayout,
    data_offset: u64,
    index: usize,
    records: usize,
) -> Result<()> {
    let block_size = layout.channel(index)?.block_size;
    if records == 0 || block_size == 0 {
        return Ok(());
    }

    let last = layout.block_position(data_offset, index, records - 1)?;
    let needed = last.saturating_add(block_size as u64);
    let available = reader.seek(SeekFrom::End(0))?;
    if available < needed {
        return Err(EdfError::Truncated {
            field: format!("channel {index} data"),
            expected: usize::try_from(needed - data_offset).unwrap_or(usize::MAX),
            found: usize::try_from(available.saturating_sub(data_offset)).unwrap_or(usize::MAX),
        });
    }

    Ok(())
}

fn visit_blocks<R, F>(
    reader: &mut R,
    layout: &RecordLayout,
    data_offset: u64,
    index: usize,
    records: usize,
    mut visit: F,
) -> Result<()>
where
    R: Read + Seek,
    F: FnMut(&[u8]),
{
    let block_size = layout.channel(index)?.block_size;
    let stride = (layout.bytes_per_record - block_size) as i64;

    reader.seek(SeekFrom::Start(layout.block_position(data_offset, index, 0)?))?;
    for record in 0..records {
        let field = format!("channel {index} record {record}");
        let block = read_exact_or_truncated(reader, block_size, &field)?;
        visit(&block);
        if stride > 0 {
            // BufReader keeps its buffer for a relative seek
            reader.seek_relative(stride)?;
        }
    }

    Ok(())
}

/// Visits every record's block of channel `index`, in record order.
///
/// Checks the stream length first, then seeks to the channel's block in
/// record 0, reads the whole block and skips the other channels' data to
/// reach the next record.
pub(crate) fn for_each_block<R, F>(
    reader: &mut R,
    layout: &RecordLayout,
    data_offset: u64,
    index: usize,
    records: usize,
    visit: F,
) -> Result<()>
where
    R: Read + Seek,
    F: FnMut(&[u8]),
{
    ensure_blocks_present(reader, layout, data_offset, index, records)?;
    visit_blocks(reader, layout, data_offset, index, records, visit)
}

/// Decodes every record of one channel into physical units.
pub fn decode_channel<R: Read + Seek>(
    reader: &mut R,
    header: &EdfHeader,
    layout: &RecordLayout,
    data_offset: u64,
    index: usize,
) -> Result<Vec<f64>> {
    let scaling = layout.scaling(header, index)?;
    read_scaled(reader, header, layout, data_offset, index, scaling)
}

fn read_scaled<R: Read + Seek>(
    reader: &mut R,
    header: &EdfHeader,
    layout: &RecordLayout,
    data_offset: u64,
    index: usize,
    scaling: Scaling,
) -> Result<Vec<f64>> {
    let records = header.record_count();
    ensure_blocks_present(reader, layout, data_offset, index, records)?;
    // 数据区已确认足够长，容量由真实字节数支撑
    let block_samples = layout.channel(index)?.block_size / 2;
    let mut samples = Vec::with_capacity(records * block_samples);

    visit_blocks(reader, layout, data_offset, index, records, |block| {
        // 小端序 16 位有符号整数
        samples.extend(
            block
                .chunks_exact(2)
                .map(|b| scaling.to_physical(i16::from_le_bytes([b[0], b[1]]))),
        );
    })?;

    debug!("decoded channel {} ({} samples)", index, samples.len());
    Ok(samples)
}

/// Resolves the scaling of every selected channel before any sample is read.
fn scalings_for(
    header: &EdfHeader,
    layout: &RecordLayout,
    indices: &[usize],
) -> Result<Vec<Scaling>> {
    indices.iter().map(|&i| layout.scaling(header, i)).collect()
}

fn assemble(
    header: &EdfHeader,
    indices: &[usize],
    signals: Vec<Vec<f64>>,
    options: DecodeOptions,
) -> Result<DecodedSignals> {
    let target_header = if options.wants_target_header(indices.len(), header.signal_count()) {
        Some(header.restrict(indices)?)
    } else {
        None
    };

    Ok(DecodedSignals {
        indices: indices.to_vec(),
        signals,
        target_header,
    })
}

/// Decodes the channels at `indices` (as returned by [`select_channels`](crate::select_channels)).
///
/// Each selected channel yields `records * samples_per_record` physical values.
/// A restricted header is attached according to `options`.
///
/// # Errors
///
/// * [`EdfError::InvalidSignalIndex`] for an index outside the header
/// * [`EdfError::Calibration`] if a selected channel has `digital_max == digital_min`;
///   this is checked before any data is read
/// * [`EdfError::Truncated`] if a block is cut short
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfdecode::{decode_header, decode_signals, select_channels, DecodeOptions};
/// # use edfdecode::doctest_utils::EdfBuilder;
/// # let bytes = EdfBuilder::new().signal("EEG", 2).signal("ECG", 1).records(2)
/// #     .digital(0, &[0, 32767, -32768, 0]).build();
/// let mut cursor = Cursor::new(&bytes);
/// let options = DecodeOptions::default();
///
/// let (header, data_offset) = decode_header(&mut cursor, options)?;
/// let indices = select_channels(&header, &["EEG"]);
/// let decoded = decode_signals(&mut cursor, &header, data_offset, &indices, options)?;
///
/// assert_eq!(decoded.signals[0].len(), 4);
/// assert!((decoded.signals[0][1] - 200.0).abs() < 1e-3);
/// assert_eq!(decoded.target_header.unwrap().labels(), vec!["EEG"]);
/// # Ok::<(), edfdecode::EdfError>(())
/// ```
pub fn decode_signals<R: Read + Seek>(
    reader: &mut R,
    header: &EdfHeader,
    data_offset: u64,
    indices: &[usize],
    options: DecodeOptions,
) -> Result<DecodedSignals> {
    let layout = RecordLayout::from_header(header);
    let scalings = scalings_for(header, &layout, indices)?;

    let signals = indices
        .iter()
        .zip(scalings)
        .map(|(&index, scaling)| read_scaled(reader, header, &layout, data_offset, index, scaling))
        .collect::<Result<Vec<_>>>()?;

    assemble(header, indices, signals, options)
}

/// Same as [`decode_signals`], with one rayon task and one file handle per channel.
///
/// The output is identical to the sequential path and keeps the order of `indices`.
pub fn decode_signals_parallel<P: AsRef<Path>>(
    path: P,
    header: &EdfHeader,
    data_offset: u64,
    indices: &[usize],
    options: DecodeOptions,
) -> Result<DecodedSignals> {
    let layout = RecordLayout::from_header(header);
    let scalings = scalings_for(header, &layout, indices)?;
    let path = path.as_ref();

    let signals = indices
        .par_iter()
        .zip(scalings.into_par_iter())
        .map(|(&index, scaling)| {
            let file = File::open(path)
                .map_err(|e| EdfError::FileNotFound(format!("{}: {}", path.display(), e)))?;
            let mut reader = BufReader::new(file);
            read_scaled(&mut reader, header, &layout, data_offset, index, scaling)
        })
        .collect::<Result<Vec<_>>>()?;

    assemble(header, indices, signals, options)
}
