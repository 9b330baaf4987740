/// How the record duration field is kept in the decoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationMode {
    /// Parse to seconds (`RecordDuration::Seconds`).
    #[default]
    Seconds,
    /// Keep the raw 8-byte field (`RecordDuration::Text`).
    Text,
}

/// When a header restricted to the selected channels accompanies decoded signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetHeaderMode {
    Never,
    /// Only when fewer channels than the file holds were selected.
    #[default]
    WhenSubset,
    Always,
}

/// Decoding options
///
/// The defaults parse the record duration as seconds, attach a target header
/// only to partial selections, and decode channels sequentially.
///
/// ```rust
/// use edfdecode::{DecodeOptions, DurationMode, TargetHeaderMode};
///
/// let options = DecodeOptions::new()
///     .duration(DurationMode::Text)
///     .target_header(TargetHeaderMode::Always)
///     .parallel(true);
///
/// assert_eq!(options.duration_mode(), DurationMode::Text);
/// assert!(options.is_parallel());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    duration: DurationMode,
    target_header: TargetHeaderMode,
    parallel: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, mode: DurationMode) -> Self {
        self.duration = mode;
        self
    }

    pub fn target_header(mut self, mode: TargetHeaderMode) -> Self {
        self.target_header = mode;
        self
    }

    /// Decode channels on the rayon thread pool, one file handle per channel.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn duration_mode(&self) -> DurationMode {
        self.duration
    }

    pub fn target_header_mode(&self) -> TargetHeaderMode {
        self.target_header
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Whether a target header should be built for `selected` out of `total` channels.
    pub(crate) fn wants_target_header(&self, selected: usize, total: usize) -> bool {
        match self.target_header {
            TargetHeaderMode::Never => false,
            TargetHeaderMode::WhenSubset => selected < total,
            TargetHeaderMode::Always => true,
        }
    }
}
