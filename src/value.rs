//! Marker-driven scalar decoding.
//!
//! Every scalar on the wire is introduced by a single marker byte that says
//! how the following bytes are read. Unknown markers are not an error: the
//! marker byte itself is the value, which is what the feed relies on for
//! small flags like `HasLevels`. This lossy fallback is deliberate and must
//! stay — the fixtures depend on it.
use crate::cursor::Cursor;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use tracing::trace;

/// Structural bytes that end a free-running string value. The terminator is
/// left in place for the enclosing container to see.
const STRING_STOP: [u8; 6] = [0x00, 0x01, 0x02, 0x0C, 0x08, 0x09];

/// A decoded scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Str(String),
    Time(OffsetDateTime),
    /// Timestamp bytes that did not convert to a representable instant.
    Raw(Vec<u8>),
    /// Literal marker byte kept as-is (unknown-marker fallback).
    Byte(u8),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Byte(b) => Some(*b as i64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Raw(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Byte(b) => write!(f, "{b}"),
        }
    }
}

/// One-byte decode rule shared by the list decoders: an ASCII digit is its
/// numeric value, `:` encodes 10, anything else is the raw byte value.
pub fn single_byte_value(b: u8) -> i64 {
    match b {
        b'0'..=b'9' => (b - b'0') as i64,
        b':' => 10,
        _ => b as i64,
    }
}

fn le_uint(bytes: &[u8]) -> i64 {
    bytes.iter().rev().fold(0, |acc, &b| (acc << 8) | b as i64)
}

/// Decode one scalar at the cursor. Returns `None` only when the buffer ends
/// before the marker byte; a truncated body decodes from whatever is left.
pub fn decode_value(cur: &mut Cursor<'_>) -> Option<Value> {
    let marker = cur.read_byte()?;
    let value = match marker {
        // 24-bit little-endian integer (frame/record ids)
        0x22 => {
            let t = cur.read(3);
            if t.truncated {
                trace!(got = t.bytes.len(), "id integer truncated by end of buffer");
            }
            Value::Int(le_uint(t.bytes))
        }
        // free-running string, ends at the next structural byte
        0x8A | 0x85 => {
            let start = cur.mark();
            while let Some(b) = cur.peek() {
                if STRING_STOP.contains(&b) {
                    break;
                }
                cur.read_byte();
            }
            Value::Str(String::from_utf8_lossy(cur.since(start)).trim().to_string())
        }
        // ASCII integer run, ends at the (unconsumed) 0x00 sentinel
        0x81 | 0x82 => {
            let start = cur.mark();
            while let Some(b) = cur.peek() {
                if b == 0x00 {
                    break;
                }
                cur.read_byte();
            }
            let run = String::from_utf8_lossy(cur.since(start));
            if run.is_empty() {
                Value::Int(0)
            } else {
                match run.parse() {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Str(run.into_owned()),
                }
            }
        }
        // single raw byte
        0x20 => Value::Int(cur.read_byte().unwrap_or(0) as i64),
        // 6-byte big-endian milliseconds since epoch, then 2 padding bytes
        0x07 => {
            let t = cur.read(6);
            let body = t.bytes.to_vec();
            cur.read(2);
            if t.truncated {
                trace!(got = body.len(), "timestamp truncated by end of buffer");
                Value::Raw(body)
            } else {
                let ms = body.iter().fold(0i128, |acc, &b| (acc << 8) | b as i128);
                match OffsetDateTime::from_unix_timestamp_nanos(ms * 1_000_000) {
                    Ok(ts) => Value::Time(ts),
                    Err(_) => Value::Raw(body),
                }
            }
        }
        // anything else: the marker byte is the value
        b => match b {
            b'0'..=b'9' | b':' => Value::Int(single_byte_value(b)),
            _ => Value::Byte(b),
        },
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn decode(bytes: &[u8]) -> Value {
        decode_value(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn id_is_three_bytes_little_endian() {
        assert_eq!(decode(&[0x22, 0x82, 0x36, 0x17]), Value::Int(1_521_282));
    }

    #[test]
    fn id_truncated_decodes_available_bytes() {
        assert_eq!(decode(&[0x22, 0x05]), Value::Int(5));
    }

    #[test]
    fn string_stops_at_structural_byte_and_trims() {
        let mut cur = Cursor::new(b"\x8aSpinAndWin\x02\x04Time");
        assert_eq!(decode_value(&mut cur).unwrap(), Value::Str("SpinAndWin".into()));
        // terminator is not consumed
        assert_eq!(cur.peek(), Some(0x02));

        assert_eq!(decode(b"\x85 89304 \x00"), Value::Str("89304".into()));
    }

    #[test]
    fn integer_run_leaves_sentinel() {
        let mut cur = Cursor::new(b"\x8236\x00");
        assert_eq!(decode_value(&mut cur).unwrap(), Value::Int(36));
        assert_eq!(cur.peek(), Some(0x00));

        assert_eq!(decode(b"\x812\x00"), Value::Int(2));
        // empty run defaults to zero
        assert_eq!(decode(b"\x81\x00"), Value::Int(0));
        // non-numeric run is kept, not erased
        assert_eq!(decode(b"\x82ab\x00"), Value::Str("ab".into()));
    }

    #[test]
    fn raw_byte_marker() {
        assert_eq!(decode(&[0x20, 0x14]), Value::Int(20));
    }

    #[test]
    fn timestamp_in_range() {
        // 1_000_000 ms => 1970-01-01T00:16:40Z, plus two padding bytes
        let mut cur = Cursor::new(&[0x07, 0, 0, 0, 0x0F, 0x42, 0x40, 0, 0]);
        assert_eq!(
            decode_value(&mut cur).unwrap(),
            Value::Time(datetime!(1970-01-01 00:16:40 UTC))
        );
        assert!(cur.at_end());
    }

    #[test]
    fn timestamp_out_of_range_keeps_raw_bytes() {
        let body = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut wire = vec![0x07];
        wire.extend_from_slice(&body);
        wire.extend_from_slice(&[0, 0]);
        assert_eq!(decode(&wire), Value::Raw(body.to_vec()));
    }

    #[test]
    fn unknown_marker_is_the_value() {
        assert_eq!(decode(&[0x01]), Value::Byte(1));
        assert_eq!(decode(b"7"), Value::Int(7));
        assert_eq!(decode(b":"), Value::Int(10));
        assert_eq!(decode(&[0xF3]), Value::Byte(0xF3));
    }

    #[test]
    fn single_byte_rule() {
        assert_eq!(single_byte_value(b'0'), 0);
        assert_eq!(single_byte_value(b'9'), 9);
        assert_eq!(single_byte_value(b':'), 10);
        assert_eq!(single_byte_value(0x21), 33);
    }
}
