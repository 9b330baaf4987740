//! # EDF decoder for Rust
//!
//! A pure Rust library for decoding EDF (European Data Format) recordings:
//! the fixed ASCII header, per-channel calibration, interleaved 16-bit sample
//! records and the TAL text carried by "EDF Annotations" channels.
//!
//! ## Quick Start
//!
//! ### Reading a file
//!
//! ```rust
//! use edfdecode::{EdfReader, Result};
//!
//! fn main() -> Result<()> {
//!     # // Create a test file first
//!     # edfdecode::doctest_utils::EdfBuilder::new()
//!     #     .signal("EEG Fpz-Cz", 100)
//!     #     .signal("EEG Pz-Oz", 100)
//!     #     .annotation_signal(30)
//!     #     .records(30)
//!     #     .write_to("sleep.edf")?;
//!     // Open an EDF file; the header is decoded immediately
//!     let mut reader = EdfReader::open("sleep.edf")?;
//!
//!     for channel in reader.header().channels() {
//!         println!("{:<16} {:>6} Hz", channel.label, channel.sample_rate);
//!     }
//!
//!     // Decode two channels, in file order
//!     let decoded = reader.read_signals(&["EEG Pz-Oz", "EEG Fpz-Cz"])?;
//!     assert_eq!(decoded.indices, vec![0, 1]);
//!
//!     // Onset, duration and label stay as stored text
//!     for annotation in reader.read_annotations()? {
//!         println!("{} {} {}", annotation.onset, annotation.duration, annotation.label);
//!     }
//!
//!     # drop(reader);
//!     # std::fs::remove_file("sleep.edf").ok();
//!     Ok(())
//! }
//! ```
//!
//! ### Decoding from memory
//!
//! The free functions work on any `Read + Seek` source:
//!
//! ```rust
//! use std::io::Cursor;
//! use edfdecode::{
//!     decode_annotations, decode_header, decode_signals, select_channels, DecodeOptions,
//! };
//!
//! # fn load() -> Vec<u8> {
//! #     edfdecode::doctest_utils::EdfBuilder::new().signal("EMG", 8).records(4).build()
//! # }
//! let bytes: Vec<u8> = load();
//! let mut cursor = Cursor::new(&bytes);
//! let options = DecodeOptions::default();
//!
//! let (header, data_offset) = decode_header(&mut cursor, options)?;
//! let indices = select_channels::<&str>(&header, &[]);
//! let decoded = decode_signals(&mut cursor, &header, data_offset, &indices, options)?;
//! let annotations = decode_annotations(&mut cursor, &header, data_offset)?;
//!
//! assert_eq!(decoded.signals[0].len(), 32);
//! assert!(annotations.is_empty());
//! # Ok::<(), edfdecode::EdfError>(())
//! ```
//!
//! ## Physical vs Digital Values
//!
//! Samples are stored as little-endian 16-bit integers. Each channel maps them
//! to physical units with
//! `scale = (physical_max - physical_min) / (digital_max - digital_min)` and
//! `offset = physical_max - scale * digital_max`:
//!
//! ```rust
//! use edfdecode::Scaling;
//!
//! let scaling = Scaling::new(-100.0, 100.0, -32768, 32767).unwrap();
//! let physical = scaling.to_physical(16384);
//! assert!((physical - 50.0).abs() < 0.1);
//! ```
//!
//! A channel whose digital range is empty cannot be scaled; decoding it fails
//! with [`EdfError::Calibration`] instead of producing NaN or infinity.

pub mod annotation;
pub mod error;
pub mod header;
pub mod layout;
pub mod options;
pub mod reader;
pub mod select;
pub mod signal;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub mod doctest_utils; // For doctest and integration test support

// Re-export main types for convenience
pub use annotation::{decode_annotations, parse_tal, read_annotation_bytes};
pub use error::{EdfError, Result};
pub use header::decode_header;
pub use layout::{ChannelLayout, RecordLayout, Scaling};
pub use options::{DecodeOptions, DurationMode, TargetHeaderMode};
pub use reader::{read_edf, EdfReader};
pub use select::{select_channels, select_indices};
pub use signal::{decode_channel, decode_signals, decode_signals_parallel};
pub use types::{
    Annotation, ChannelParam, DecodedSignals, EdfHeader, EdfRecording, RecordDuration,
    RecordingInfo, TargetHeader, ANNOTATION_SCHEMA,
};

/// Label reserved for annotation channels.
pub const ANNOTATION_LABEL: &str = "EDF Annotations";

/// Library version
///
/// Returns the current version of the edfdecode library.
///
/// # Examples
///
/// ```rust
/// let version = edfdecode::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
