//! TAL (Time-stamped Annotation List) decoding.
//!
//! An annotation channel stores text instead of samples. Entries end with the
//! byte pair `0x14 0x00`; inside an entry `0x15` separates onset from duration
//! and `0x14` separates the onset/duration group from the label.

use std::io::{Read, Seek};

use log::debug;

use crate::error::Result;
use crate::layout::RecordLayout;
use crate::signal::for_each_block;
use crate::types::{Annotation, EdfHeader};
use crate::utils::{latin1_to_string, split_bytes};

const TAL_END: [u8; 2] = [0x14, 0x00];
const LABEL_SEPARATOR: u8 = 0x14;
const DURATION_SEPARATOR: u8 = 0x15;

/// Tokenizes raw annotation-channel bytes into onset/duration/label triplets.
///
/// * A missing label becomes the empty string.
/// * A missing duration becomes `"0"`.
/// * An onset holding a NUL byte (record padding) becomes `"0"`.
/// * Entries made only of NUL padding produce nothing.
///
/// ```rust
/// use edfdecode::{parse_tal, Annotation};
///
/// let annotations = parse_tal(b"+0\x151.5\x14Spindle\x14\x00");
/// assert_eq!(annotations, vec![Annotation::new("+0", "1.5", "Spindle")]);
///
/// let annotations = parse_tal(b"+12\x14\x14\x00");
/// assert_eq!(annotations, vec![Annotation::new("+12", "0", "")]);
/// ```
pub fn parse_tal(bytes: &[u8]) -> Vec<Annotation> {
    split_bytes(bytes, &TAL_END)
        .into_iter()
        .filter(|entry| entry.iter().any(|&b| b != 0))
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &[u8]) -> Annotation {
    let mut parts = entry.split(|&b| b == LABEL_SEPARATOR);
    // split 至少产生一个元素
    let timing = parts.next().unwrap_or_default();
    let label = parts.next().map(latin1_to_string).unwrap_or_default();

    let mut timing_parts = timing.split(|&b| b == DURATION_SEPARATOR);
    let onset = timing_parts.next().unwrap_or_default();
    let duration = timing_parts
        .next()
        .map(latin1_to_string)
        .unwrap_or_else(|| "0".to_string());

    let onset = if onset.contains(&0) {
        "0".to_string()
    } else {
        latin1_to_string(onset)
    };

    Annotation { onset, duration, label }
}

/// Reads the raw bytes of every "EDF Annotations" channel.
///
/// Channels are read one after the other in file order, each across all
/// records, and concatenated into one buffer.
pub fn read_annotation_bytes<R: Read + Seek>(
    reader: &mut R,
    header: &EdfHeader,
    data_offset: u64,
) -> Result<Vec<u8>> {
    let layout = RecordLayout::from_header(header);
    let records = header.record_count();
    let mut buffer = Vec::new();

    for index in header.annotation_indices() {
        for_each_block(reader, &layout, data_offset, index, records, |block| {
            buffer.extend_from_slice(block);
        })?;
    }

    Ok(buffer)
}

/// Decodes all annotations of a file, in file order.
///
/// A file without an annotation channel yields an empty list.
/// The column names are not part of the result; see [`Annotation::schema`].
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfdecode::{decode_annotations, decode_header, DecodeOptions};
/// # use edfdecode::doctest_utils::{tal, EdfBuilder};
/// # let bytes = EdfBuilder::new().signal("EEG", 4).annotation_signal(16).records(1)
/// #     .blocks(1, &[&tal("+0", Some("30"), "Sleep stage W")]).build();
/// let mut cursor = Cursor::new(&bytes);
/// let (header, data_offset) = decode_header(&mut cursor, DecodeOptions::default())?;
///
/// let annotations = decode_annotations(&mut cursor, &header, data_offset)?;
/// assert_eq!(annotations[0].label, "Sleep stage W");
/// assert_eq!(annotations[0].duration, "30");
/// # Ok::<(), edfdecode::EdfError>(())
/// ```
pub fn decode_annotations<R: Read + Seek>(
    reader: &mut R,
    header: &EdfHeader,
    data_offset: u64,
) -> Result<Vec<Annotation>> {
    let buffer = read_annotation_bytes(reader, header, data_offset)?;
    let annotations = parse_tal(&buffer);

    debug!(
        "decoded {} annotations from {} annotation bytes",
        annotations.len(),
        buffer.len()
    );
    Ok(annotations)
}
