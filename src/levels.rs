//! Decoder for the standalone per-number levels message.
//!
//! This payload arrives on a side channel without the usual frame header:
//! a label string, a few session bytes, then a `data` object carrying an ID
//! and one level figure per wheel number. The first entry is a verbose
//! object (`Number { N L }`) declaring the two field codes; every later
//! entry is compact: `0x05`, field code, key, field code, level, `0x00`.
use crate::cursor::Cursor;
use crate::object::read_name;
use crate::value::decode_value;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLevel {
    pub number: i64,
    pub level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub id: i64,
    pub numbers: Vec<NumberLevel>,
}

const DATA_MARKER: &[u8] = b"\x01\x04data";

/// Extended one-byte code used by this message: digits are themselves,
/// `:`..`?` cover 10..15, and 0x20 escapes the raw byte for 16 and up.
fn level_value(cur: &mut Cursor<'_>) -> Option<i64> {
    let b = cur.read_byte()?;
    Some(match b {
        b'0'..=b'9' => (b - b'0') as i64,
        b':'..=b'?' => (b - b':') as i64 + 10,
        0x20 => cur.read_byte()? as i64,
        _ => b as i64,
    })
}

/// Locate and decode the `data` object. Returns `None` when the buffer
/// carries no such object at all; a truncated list yields what was read.
pub fn parse_levels(buf: &[u8]) -> Option<Levels> {
    let at = buf.windows(DATA_MARKER.len()).position(|w| w == DATA_MARKER)?;
    let mut cur = Cursor::new(&buf[at..]);
    cur.read_byte();
    let _ = read_name(&mut cur);

    let mut levels = Levels { id: 0, numbers: Vec::new() };
    loop {
        let entry = cur.mark();
        match cur.read_byte() {
            None | Some(0x00) => break,
            // ID field
            Some(0x02) => {
                let Some(name) = read_name(&mut cur) else { break };
                let value = decode_value(&mut cur).and_then(|v| v.as_int()).unwrap_or(0);
                if name == "ID" {
                    levels.id = value;
                }
            }
            // verbose first entry declares the field codes
            Some(0x01) => {
                let Some(name) = read_name(&mut cur) else { break };
                if name != "Number" {
                    trace!(name = %name, "unexpected object inside data, ending list");
                    cur.reset(entry);
                    break;
                }
                cur.read_byte();
                let _ = read_name(&mut cur);
                let Some(number) = level_value(&mut cur) else { break };
                cur.read_byte();
                let _ = read_name(&mut cur);
                let Some(level) = level_value(&mut cur) else { break };
                levels.numbers.push(NumberLevel { number, level });
                cur.read_byte(); // entry terminator
            }
            // compact entry
            Some(0x05) => {
                cur.read_byte(); // number field code
                let Some(number) = level_value(&mut cur) else { break };
                cur.read_byte(); // level field code
                let Some(level) = level_value(&mut cur) else { break };
                levels.numbers.push(NumberLevel { number, level });
                cur.read_byte(); // entry terminator
            }
            Some(other) => {
                trace!(marker = other, "unexpected byte inside data object, ending list");
                cur.reset(entry);
                break;
            }
        }
    }
    Some(levels)
}
