use std::collections::HashSet;

use log::{debug, warn};

use crate::error::{EdfError, Result};
use crate::types::EdfHeader;

/// Maps requested labels to channel indices.
///
/// The result is in file order, never request order, and holds at most one
/// index per distinct label: when the header repeats a label, only its first
/// channel is selected. An empty request selects every distinct label,
/// annotation channels included.
///
/// Labels that match no channel are dropped without error. This is the
/// intended contract; such labels are only reported through `log::warn!`.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfdecode::{decode_header, select_channels, DecodeOptions};
/// # use edfdecode::doctest_utils::EdfBuilder;
/// # let bytes = EdfBuilder::new()
/// #     .signal("EEG Fpz-Cz", 1)
/// #     .signal("EOG", 1)
/// #     .annotation_signal(1)
/// #     .build();
/// let (header, _) = decode_header(&mut Cursor::new(&bytes), DecodeOptions::default())?;
///
/// assert_eq!(select_channels(&header, &["EOG", "EEG Fpz-Cz"]), vec![0, 1]);
/// assert_eq!(select_channels(&header, &["Missing"]), Vec::<usize>::new());
/// assert_eq!(select_channels::<&str>(&header, &[]), vec![0, 1, 2]);
/// # Ok::<(), edfdecode::EdfError>(())
/// ```
pub fn select_channels<S: AsRef<str>>(header: &EdfHeader, requested: &[S]) -> Vec<usize> {
    let wanted: Option<HashSet<&str>> = if requested.is_empty() {
        None
    } else {
        Some(requested.iter().map(|s| s.as_ref()).collect())
    };

    let mut seen = HashSet::new();
    let mut indices = Vec::new();

    for (i, label) in header.labels().into_iter().enumerate() {
        let matches = wanted.as_ref().map_or(true, |w| w.contains(label));
        // 同名通道只取第一个
        if matches && seen.insert(label) {
            indices.push(i);
        }
    }

    if let Some(wanted) = &wanted {
        let missing: Vec<&&str> = wanted.iter().filter(|l| !seen.contains(**l)).collect();
        if !missing.is_empty() {
            warn!("requested channels not present in header, ignored: {:?}", missing);
        }
    }

    debug!("selected channel indices {:?}", indices);
    indices
}

/// Validates raw channel indices and returns them sorted in file order without repeats.
///
/// Unlike [`select_channels`], this can address channels that share a label.
pub fn select_indices(header: &EdfHeader, requested: &[usize]) -> Result<Vec<usize>> {
    let mut indices = requested.to_vec();
    if let Some(&bad) = indices.iter().find(|&&i| i >= header.signal_count()) {
        return Err(EdfError::InvalidSignalIndex(bad));
    }
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}
