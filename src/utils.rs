use std::io::Read;

use crate::error::{EdfError, Result};

/// 按 Latin-1 解码字节，每个字节映射为一个字符，不会失败
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// 读取恰好 `len` 个字节；不足时返回 `Truncated`
///
/// `field` 仅用于错误信息。
pub fn read_exact_or_truncated<R: Read>(
    reader: &mut R,
    len: usize,
    field: &str,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len);
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;

    if buf.len() < len {
        return Err(EdfError::Truncated {
            field: field.to_string(),
            expected: len,
            found: buf.len(),
        });
    }

    Ok(buf)
}

/// 非本地化的整数解析，允许前后空格
pub fn parse_int_field(s: &str, field: &'static str) -> Result<i64> {
    s.trim().parse::<i64>().map_err(|_| EdfError::NumericFormat {
        field,
        value: s.to_string(),
    })
}

/// 非本地化的浮点数解析，允许前后空格
pub fn parse_float_field(s: &str, field: &'static str) -> Result<f64> {
    s.trim().parse::<f64>().map_err(|_| EdfError::NumericFormat {
        field,
        value: s.to_string(),
    })
}

/// Splits `haystack` on every occurrence of `delimiter`, like `str::split`
/// but over raw bytes. An empty trailing piece is kept.
pub fn split_bytes<'a>(haystack: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    debug_assert!(!delimiter.is_empty());

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i + delimiter.len() <= haystack.len() {
        if &haystack[i..i + delimiter.len()] == delimiter {
            pieces.push(&haystack[start..i]);
            i += delimiter.len();
            start = i;
        } else {
            i += 1;
        }
    }
    pieces.push(&haystack[start..]);

    pieces
}
