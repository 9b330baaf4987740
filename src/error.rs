use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// 文件比字段或数据块所需的字节数短
    #[error("Truncated file: {field} needs {expected} bytes, only {found} available")]
    Truncated {
        field: String,
        expected: usize,
        found: usize,
    },

    /// 数值字段无法解析
    #[error("Invalid numeric value in field '{field}': {value:?}")]
    NumericFormat {
        field: &'static str,
        value: String,
    },

    #[error("Digital min equals digital max for channel {channel} ({label})")]
    Calibration {
        channel: usize,
        label: String,
    },

    #[error("Invalid number of signals: {0}")]
    InvalidSignalCount(i64),

    #[error("Signal index {0} out of range")]
    InvalidSignalIndex(usize),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl EdfError {
    /// True for errors caused by the file ending early.
    pub fn is_truncation(&self) -> bool {
        matches!(self, EdfError::Truncated { .. })
    }
}

pub type Result<T> = std::result::Result<T, EdfError>;
