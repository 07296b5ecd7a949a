//! Line decoder for sidecar records.
//!
//! A sidecar line is `<key>\t<offset>\t<length>` followed by an optional
//! line terminator. Numeric fields are decoded by scanning ASCII digits
//! directly; parsing stops at the first non-digit byte and an empty field
//! decodes to zero.
//!
//! Overflow is not checked. Values wider than the target integer wrap
//! silently, so `18446744073709551616` decodes to `0` as an offset. The
//! producing system is expected to stay within range.

const TAB: u8 = b'\t';

/// One decoded line, borrowing the key bytes from the line buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Key bytes, untrimmed and possibly empty
    pub key: &'a [u8],
    /// Byte offset of the payload in the data file
    pub offset: u64,
    /// Byte length of the payload
    pub length: u32,
}

/// Strip one trailing `\n` and then one trailing `\r`.
#[inline]
pub fn trim_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Decode a single sidecar line.
///
/// Returns `None` for blank lines and for lines missing either tab
/// separator.
pub fn decode_line(line: &[u8]) -> Option<RawRecord<'_>> {
    let line = trim_line_terminator(line);
    if line.is_empty() {
        return None;
    }

    let key_end = line.iter().position(|&b| b == TAB)?;
    let rest = &line[key_end + 1..];
    let offset_end = rest.iter().position(|&b| b == TAB)?;

    Some(RawRecord {
        key: &line[..key_end],
        offset: parse_u64_prefix(&rest[..offset_end]),
        length: parse_u32_prefix(&rest[offset_end + 1..]),
    })
}

/// Decode the leading decimal digits of `field` as a `u64`, wrapping on
/// overflow.
#[inline]
pub fn parse_u64_prefix(field: &[u8]) -> u64 {
    let mut value: u64 = 0;
    for &b in field {
        let digit = b.wrapping_sub(b'0');
        if digit > 9 {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add(digit as u64);
    }
    value
}

/// Decode the leading decimal digits of `field` as a `u32`, wrapping on
/// overflow.
#[inline]
pub fn parse_u32_prefix(field: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for &b in field {
        let digit = b.wrapping_sub(b'0');
        if digit > 9 {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add(digit as u32);
    }
    value
}
