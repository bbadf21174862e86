//! Specialized decoders for the three irregular list shapes inside info
//! records.
//!
//! None of these lists carry a length. LastGames learns its field schema
//! from a verbose first entry and switches to a compact positional shape for
//! the rest; Hot/Cold entries are key/tab/draw triples with a hits field
//! whose name can be declared once and then persists; Hits mixes implicit
//! positional keys with explicit string keys. All three treat a malformed
//! item the same way: rewind to the position before the item and end the
//! current list — never the whole decode.
use crate::cursor::Cursor;
use crate::model::{Game, HitsItem, HotColdItem, HotColdList};
use crate::object::read_name;
use crate::value::{Value, decode_value, single_byte_value};
use tracing::{debug, trace};

/// Sub-list names that end the LastGames run (checked by lookahead, the
/// bytes are left for the info pipeline to dispatch on).
const SIBLING_LISTS: [&str; 4] = ["Hot", "Cold", "Hits", "PreviousResults"];

/// Consume the per-item 0x00 terminator. A missing terminator ends the list:
/// the unexpected byte is put back and `false` is returned.
fn item_terminator(cur: &mut Cursor<'_>) -> bool {
    let mark = cur.mark();
    match cur.read_byte() {
        Some(0x00) => true,
        Some(b) => {
            trace!(byte = b, "missing item terminator, ending list");
            cur.reset(mark);
            false
        }
        None => {
            trace!("list closed by end of buffer");
            false
        }
    }
}

/// Bytes up to the next 0x00. `consume_nul` eats the sentinel as well, which
/// is how the verbose Draw field is terminated on the wire.
fn run_until_nul<'a>(cur: &mut Cursor<'a>, consume_nul: bool) -> &'a [u8] {
    let start = cur.mark();
    while let Some(b) = cur.peek() {
        if b == 0x00 {
            break;
        }
        cur.read_byte();
    }
    let run = cur.since(start);
    if consume_nul && cur.peek() == Some(0x00) {
        cur.read_byte();
    }
    run
}

fn parse_draw_run(run: &[u8]) -> Value {
    let s = String::from_utf8_lossy(run);
    let s = s.trim();
    if s.is_empty() {
        Value::Int(0)
    } else {
        match s.parse() {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Str(s.to_string()),
        }
    }
}

/// Decode the LastGames list. The first entry is verbose and declares the
/// field order; every later entry uses the compact `0x08 number 0x09 draw`
/// shape. Entry names are the numeric list index, kept as-is.
pub fn parse_last_games(cur: &mut Cursor<'_>) -> Vec<Game> {
    let mut games = Vec::new();
    let mut learned = false;
    loop {
        let entry = cur.mark();
        if cur.read_byte() != Some(0x01) {
            cur.reset(entry);
            break;
        }
        let Some(len) = cur.read_byte() else {
            cur.reset(entry);
            break;
        };
        let t = cur.read(len as usize);
        if t.truncated {
            cur.reset(entry);
            break;
        }
        let name = String::from_utf8_lossy(t.bytes).into_owned();
        if SIBLING_LISTS.contains(&name.as_str()) {
            cur.reset(entry);
            break;
        }

        let mut game = Game { name, number: 0, draw: Value::Int(0) };
        if !learned {
            // verbose first entry: explicit Number and Draw fields declare
            // the schema for the rest of the list
            cur.read_byte();
            let number_field = read_name(cur).unwrap_or_default();
            game.number = decode_value(cur).and_then(|v| v.as_int()).unwrap_or(0);
            cur.read_byte();
            let draw_field = read_name(cur).unwrap_or_default();
            game.draw = parse_draw_run(run_until_nul(cur, true));
            trace!(number = %number_field, draw = %draw_field, "learned game list schema");
            learned = true;
        } else {
            if cur.read_byte() != Some(0x08) {
                cur.reset(entry);
                break;
            }
            game.number = decode_value(cur).and_then(|v| v.as_int()).unwrap_or(0);
            if cur.read_byte() != Some(0x09) {
                cur.reset(entry);
                break;
            }
            let Some(d) = cur.read_byte() else {
                games.push(game);
                break;
            };
            game.draw = Value::Int(single_byte_value(d));
        }
        games.push(game);
        if !item_terminator(cur) {
            break;
        }
    }
    games
}

/// Decode a Hot or Cold list: one `key TAB draw` triple per entry followed
/// by the hits value, whose field name is implicit (`Hits`) under the 0x10
/// marker or declared once with 0x02 and kept for the rest of the list.
pub fn parse_hot_cold(cur: &mut Cursor<'_>) -> HotColdList {
    let mut list = HotColdList::default();
    loop {
        let entry = cur.mark();
        match cur.peek() {
            None | Some(0x00) | Some(0x01) => break,
            _ => {}
        }
        let Some(k) = cur.read_byte() else { break };
        let key = single_byte_value(k);
        if cur.read_byte() != Some(0x09) {
            cur.reset(entry);
            break;
        }
        let Some(d) = cur.read_byte() else {
            cur.reset(entry);
            break;
        };
        let draw = single_byte_value(d);
        let hits = match cur.read_byte() {
            Some(0x02) => {
                let Some(field) = read_name(cur) else {
                    cur.reset(entry);
                    break;
                };
                list.hits_field = field;
                let Some(h) = cur.read_byte() else {
                    cur.reset(entry);
                    break;
                };
                single_byte_value(h)
            }
            Some(0x10) => {
                let Some(h) = cur.read_byte() else {
                    cur.reset(entry);
                    break;
                };
                single_byte_value(h)
            }
            other => {
                debug!(?other, "unexpected hits marker, ending hot/cold list");
                cur.reset(entry);
                break;
            }
        };
        list.items.push(HotColdItem { key, draw, hits });
        if !item_terminator(cur) {
            break;
        }
    }
    list
}

/// Hits value: one byte is the common case; a longer run before the
/// sentinel is accepted when it parses as an integer, otherwise only the
/// first byte is taken.
fn read_hits_value(cur: &mut Cursor<'_>) -> Option<i64> {
    let start = cur.mark();
    let run = run_until_nul(cur, false);
    match run {
        [] => None,
        [b] => Some(single_byte_value(*b)),
        _ => match std::str::from_utf8(run).ok().and_then(|s| s.parse().ok()) {
            Some(v) => Some(v),
            None => {
                cur.reset(start);
                cur.read_byte().map(single_byte_value)
            }
        },
    }
}

/// Decode the keyed Hits list. A key is either the byte itself (positional,
/// single-byte rule) or an explicit length-prefixed name behind 0x01. The
/// list ends at 0x00, at end of buffer, or right before `PreviousResults`.
pub fn parse_hits(cur: &mut Cursor<'_>) -> Vec<HitsItem> {
    let mut items = Vec::new();
    loop {
        let entry = cur.mark();
        let Some(first) = cur.peek() else { break };
        if first == 0x00 {
            break;
        }
        let key = if first == 0x01 {
            cur.read_byte();
            let Some(len) = cur.read_byte() else {
                cur.reset(entry);
                break;
            };
            let t = cur.read(len as usize);
            if t.truncated {
                cur.reset(entry);
                break;
            }
            let name = String::from_utf8_lossy(t.bytes).into_owned();
            if name == "PreviousResults" {
                cur.reset(entry);
                break;
            }
            Value::Str(name)
        } else {
            cur.read_byte();
            Value::Int(single_byte_value(first))
        };
        if cur.read_byte() != Some(0x10) {
            cur.reset(entry);
            break;
        }
        let Some(hits) = read_hits_value(cur) else {
            cur.reset(entry);
            break;
        };
        items.push(HitsItem { key, hits });
        if !item_terminator(cur) {
            break;
        }
    }
    items
}
