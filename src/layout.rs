use log::debug;

use crate::error::{EdfError, Result};
use crate::types::{ChannelParam, EdfHeader};

/// Linear digital → physical transform of one channel.
///
/// ```rust
/// use edfdecode::Scaling;
///
/// let scaling = Scaling::new(-200.0, 200.0, -32768, 32767).unwrap();
/// assert!((scaling.to_physical(32767) - 200.0).abs() < 1e-3);
/// assert!(Scaling::new(-200.0, 200.0, 5, 5).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub scale: f64,
    pub offset: f64,
}

impl Scaling {
    /// `None` when `digital_max == digital_min`.
    pub fn new(
        physical_min: f64,
        physical_max: f64,
        digital_min: i64,
        digital_max: i64,
    ) -> Option<Self> {
        if digital_max == digital_min {
            return None;
        }
        let scale = (physical_max - physical_min) / (digital_max - digital_min) as f64;
        let offset = physical_max - scale * digital_max as f64;
        Some(Scaling { scale, offset })
    }

    pub fn for_channel(channel: &ChannelParam) -> Option<Self> {
        Scaling::new(
            channel.physical_min,
            channel.physical_max,
            channel.digital_min,
            channel.digital_max,
        )
    }

    #[inline]
    pub fn to_physical(&self, digital: i16) -> f64 {
        digital as f64 * self.scale + self.offset
    }
}

/// Where one channel lives inside a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelLayout {
    /// samples_per_record * 2
    pub block_size: usize,
    /// 记录内的字节偏移 = 之前所有通道块大小之和
    pub offset: usize,
    /// `None` if the channel cannot be calibrated.
    pub scaling: Option<Scaling>,
}

/// Byte layout of the data region, derived from the header alone.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    pub channels: Vec<ChannelLayout>,
    pub bytes_per_record: usize,
}

impl RecordLayout {
    pub fn from_header(header: &EdfHeader) -> Self {
        let mut channels = Vec::with_capacity(header.signal_count());
        let mut offset = 0;

        for channel in header.channels() {
            let block_size = channel.block_size();
            channels.push(ChannelLayout {
                block_size,
                offset,
                scaling: Scaling::for_channel(channel),
            });
            offset += block_size;
        }

        debug!("record layout: {} channels, {} bytes per record", channels.len(), offset);

        RecordLayout {
            channels,
            bytes_per_record: offset,
        }
    }

    pub fn channel(&self, index: usize) -> Result<&ChannelLayout> {
        self.channels.get(index).ok_or(EdfError::InvalidSignalIndex(index))
    }

    /// Scaling of channel `index`, or [`EdfError::Calibration`] if its digital range is empty.
    pub fn scaling(&self, header: &EdfHeader, index: usize) -> Result<Scaling> {
        match self.channel(index)?.scaling {
            Some(scaling) => Ok(scaling),
            None => Err(EdfError::Calibration {
                channel: index,
                label: header.channel(index)?.label.clone(),
            }),
        }
    }

    /// Absolute file offset of channel `index` in record `record`.
    ///
    /// Saturates at `u64::MAX` for header counts no file can hold.
    pub fn block_position(&self, data_offset: u64, index: usize, record: usize) -> Result<u64> {
        let channel = self.channel(index)?;
        Ok(data_offset
            .saturating_add(self.data_len(record))
            .saturating_add(channel.offset as u64))
    }

    /// Bytes the data region must hold for `records` records.
    pub fn data_len(&self, records: usize) -> u64 {
        (records as u64).saturating_mul(self.bytes_per_record as u64)
    }
}
