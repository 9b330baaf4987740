use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;

use crate::annotation::decode_annotations;
use crate::error::{EdfError, Result};
use crate::header::decode_header;
use crate::layout::RecordLayout;
use crate::options::DecodeOptions;
use crate::select::select_channels;
use crate::signal::{decode_channel, decode_signals, decode_signals_parallel};
use crate::types::{Annotation, DecodedSignals, EdfHeader, EdfRecording};

/// EDF file reader
///
/// `EdfReader` opens a file, decodes its header once, and then decodes signals
/// and annotations on demand. The file handle is owned by the reader and
/// closed when it is dropped; if the header cannot be decoded, `open` closes
/// it before returning the error.
///
/// # Examples
///
/// ## Basic usage
///
/// ```rust
/// use edfdecode::EdfReader;
///
/// # // Generate test file (hidden from docs)
/// # edfdecode::doctest_utils::EdfBuilder::new()
/// #     .signal("EEG Fpz-Cz", 100).signal("EEG Pz-Oz", 100).annotation_signal(30)
/// #     .records(10)
/// #     .write_to("recording.edf")?;
/// #
/// let mut reader = EdfReader::open("recording.edf")?;
///
/// let header = reader.header();
/// println!("Signals: {}", header.signal_count());
/// println!("Records: {}", header.record_count());
///
/// // Read one channel by label
/// let decoded = reader.read_signals(&["EEG Fpz-Cz"])?;
/// assert_eq!(decoded.signals[0].len(), 1000);
///
/// // Annotations are returned without a column-name row
/// let annotations = reader.read_annotations()?;
/// println!("{} annotations", annotations.len());
///
/// # // Cleanup (hidden from docs)
/// # drop(reader);
/// # std::fs::remove_file("recording.edf").ok();
/// # Ok::<(), edfdecode::EdfError>(())
/// ```
///
/// ## Reading everything at once
///
/// ```rust
/// use edfdecode::{DecodeOptions, EdfReader};
///
/// # edfdecode::doctest_utils::EdfBuilder::new()
/// #     .signal("EEG C3", 256).signal("ECG", 256).records(2)
/// #     .write_to("full_read.edf")?;
/// let options = DecodeOptions::new().parallel(true);
/// let mut reader = EdfReader::open_with("full_read.edf", options)?;
///
/// let recording = reader.read_all::<&str>(&[])?;
/// for (index, samples) in recording.signals.indices.iter().zip(&recording.signals.signals) {
///     let channel = &recording.header.channels()[*index];
///     println!("{}: {} samples at {} Hz", channel.label, samples.len(), channel.sample_rate);
/// }
/// # drop(reader);
/// # std::fs::remove_file("full_read.edf").ok();
/// # Ok::<(), edfdecode::EdfError>(())
/// ```
pub struct EdfReader {
    file: BufReader<File>,
    path: PathBuf,
    header: EdfHeader,
    /// 数据区起始字节偏移
    data_offset: u64,
    options: DecodeOptions,
}

impl EdfReader {
    /// Opens a file with default [`DecodeOptions`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, DecodeOptions::default())
    }

    /// Opens a file and decodes its header.
    ///
    /// # Errors
    ///
    /// * [`EdfError::FileNotFound`] if the file cannot be opened
    /// * any header error from [`decode_header`](crate::decode_header)
    pub fn open_with<P: AsRef<Path>>(path: P, options: DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| EdfError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let mut reader = BufReader::new(file);

        // 读取并解析头部；失败时 reader 在此处被释放
        let (header, data_offset) = decode_header(&mut reader, options)?;

        debug!("opened {} ({} channels)", path.display(), header.signal_count());

        Ok(EdfReader {
            file: reader,
            path: path.to_path_buf(),
            header,
            data_offset,
            options,
        })
    }

    pub fn header(&self) -> &EdfHeader {
        &self.header
    }

    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    pub fn layout(&self) -> RecordLayout {
        RecordLayout::from_header(&self.header)
    }

    /// Channel indices for `labels`; see [`select_channels`](crate::select_channels).
    pub fn select<S: AsRef<str>>(&self, labels: &[S]) -> Vec<usize> {
        select_channels(&self.header, labels)
    }

    /// Decodes the channels named in `labels`, or every channel if `labels` is empty.
    ///
    /// Unknown labels are ignored.
    pub fn read_signals<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<DecodedSignals> {
        let indices = self.select(labels);
        self.read_indices(&indices)
    }

    /// Decodes channels by index. Indices must be in file order to match
    /// [`select_channels`](crate::select_channels) output; see
    /// [`select_indices`](crate::select_indices).
    pub fn read_indices(&mut self, indices: &[usize]) -> Result<DecodedSignals> {
        let (header, data_offset, options) = (&self.header, self.data_offset, self.options);
        if options.is_parallel() {
            decode_signals_parallel(&self.path, header, data_offset, indices, options)
        } else {
            decode_signals(&mut self.file, header, data_offset, indices, options)
        }
    }

    /// Decodes the first channel labelled `label`, or `None` if there is none.
    pub fn read_signal(&mut self, label: &str) -> Result<Option<Vec<f64>>> {
        match self.select(&[label]).first() {
            Some(&index) => {
                let layout = self.layout();
                let samples =
                    decode_channel(&mut self.file, &self.header, &layout, self.data_offset, index)?;
                Ok(Some(samples))
            }
            None => Ok(None),
        }
    }

    /// Decodes every TAL entry of every "EDF Annotations" channel.
    pub fn read_annotations(&mut self) -> Result<Vec<Annotation>> {
        decode_annotations(&mut self.file, &self.header, self.data_offset)
    }

    /// Decodes the selected signals and all annotations.
    pub fn read_all<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<EdfRecording> {
        let signals = self.read_signals(labels)?;
        let annotations = self.read_annotations()?;

        Ok(EdfRecording {
            header: self.header.clone(),
            signals,
            annotations,
        })
    }

    /// Consumes the reader, closing the file, and returns the header.
    pub fn into_header(self) -> EdfHeader {
        self.header
    }
}

/// Opens `path`, reads the selected signals and all annotations, and closes the file.
pub fn read_edf<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    labels: &[S],
    options: DecodeOptions,
) -> Result<EdfRecording> {
    let mut reader = EdfReader::open_with(path, options)?;
    reader.read_all(labels)
}
