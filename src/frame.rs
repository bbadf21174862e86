//! Top-level frame scanning and record assembly.
//!
//! A frame starts with 0x22, a 24-bit little-endian id, and the 0x01 object
//! marker introducing a named body. Anything that does not line up is
//! skipped byte by byte until the next candidate start, so one corrupted
//! region never costs more than itself. Decoding is best effort end to end:
//! [`decode`] always returns the frames it could read, in input order.
use crate::cursor::Cursor;
use crate::list::{parse_hits, parse_hot_cold, parse_last_games};
use crate::model::{Event, Frame, FrameBody, HotColdList, Info, Market};
use crate::object::{Node, parse_object, read_name};
use crate::value::decode_value;
use tracing::{debug, trace};

const FRAME_START: u8 = 0x22;

/// Decode a complete capture buffer into ordered frames.
pub fn decode(buf: &[u8]) -> Vec<Frame> {
    let mut cur = Cursor::new(buf);
    let mut frames = Vec::new();
    while let Some(b) = cur.read_byte() {
        if b != FRAME_START {
            continue;
        }
        let t = cur.read(3);
        if t.truncated {
            trace!("frame id truncated by end of buffer");
            break;
        }
        let id = u32::from_le_bytes([t.bytes[0], t.bytes[1], t.bytes[2], 0]);
        match cur.read_byte() {
            Some(0x01) => {}
            Some(marker) => {
                debug!(id, marker, "no object marker after frame id, resyncing");
                continue;
            }
            None => break,
        }
        let Some(name) = read_name(&mut cur) else { break };
        match name.as_str() {
            "event" => {
                let event = parse_event(&mut cur, id);
                frames.push(Frame { id, body: FrameBody::Event(event) });
            }
            "info" => {
                let info = parse_info(&mut cur);
                frames.push(Frame { id, body: FrameBody::Info(info) });
            }
            other => trace!(id, name = other, "unknown frame kind, skipped"),
        }
    }
    frames
}

fn parse_event(cur: &mut Cursor<'_>, id: u32) -> Event {
    let (map, _) = parse_object(cur, None);
    let mut markets = Vec::new();
    if let Some(tree) = map.child("Market") {
        for (name, node) in tree.iter() {
            match node {
                Node::Object(data) => {
                    markets.push(Market { name: name.to_string(), data: data.clone() })
                }
                Node::Value(_) => debug!(market = name, "scalar child under Market, skipped"),
            }
        }
    }
    Event {
        id,
        event_type: map.text("Type").map(str::to_string),
        time: map.value("Time").cloned(),
        number: map.int("Number"),
        duration: map.int("Duration"),
        has_levels: map.int("HasLevels"),
        markets,
    }
}

fn parse_info(cur: &mut Cursor<'_>) -> Info {
    // the two leading fields are fixed: ID then ValidFrom
    cur.read_byte();
    let _ = read_name(cur);
    let id = decode_value(cur).and_then(|v| v.as_int()).unwrap_or(0);
    cur.read_byte();
    let _ = read_name(cur);
    let valid_from = decode_value(cur);

    let mut info = Info {
        id,
        valid_from,
        last_games: Vec::new(),
        hot: HotColdList::default(),
        cold: HotColdList::default(),
        hits: Vec::new(),
        previous_results: Vec::new(),
    };
    loop {
        match cur.peek() {
            None => break,
            // separator between sub-lists
            Some(0x00) => {
                cur.read_byte();
            }
            Some(0x01) => {
                cur.read_byte();
                let Some(name) = read_name(cur) else { break };
                match name.as_str() {
                    "LastGames" => info.last_games = parse_last_games(cur),
                    "Hot" => info.hot = parse_hot_cold(cur),
                    "Cold" => info.cold = parse_hot_cold(cur),
                    "Hits" => info.hits = parse_hits(cur),
                    // carried on the wire but always empty: just the terminator
                    "PreviousResults" => {
                        cur.read_byte();
                    }
                    other => debug!(list = other, "unknown info sub-list, skipped"),
                }
            }
            Some(_) => break,
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn field(wire: &mut Vec<u8>, name: &str, value: &[u8]) {
        wire.push(0x02);
        wire.push(name.len() as u8);
        wire.extend_from_slice(name.as_bytes());
        wire.extend_from_slice(value);
    }

    fn frame_header(wire: &mut Vec<u8>, id: u32, name: &str) {
        wire.push(FRAME_START);
        wire.extend_from_slice(&id.to_le_bytes()[..3]);
        wire.push(0x01);
        wire.push(name.len() as u8);
        wire.extend_from_slice(name.as_bytes());
    }

    fn event_frame(id: u32, number: &str) -> Vec<u8> {
        let mut w = Vec::new();
        frame_header(&mut w, id, "event");
        field(&mut w, "ID", &{
            let mut v = vec![0x22];
            v.extend_from_slice(&id.to_le_bytes()[..3]);
            v
        });
        field(&mut w, "Type", b"\x8aSpinAndWin");
        field(&mut w, "Number", &{
            let mut v = vec![0x85];
            v.extend_from_slice(number.as_bytes());
            v
        });
        field(&mut w, "Duration", &[0x20, 0x14]);
        field(&mut w, "HasLevels", &[0x01]);
        // Market { Win { Odds=36 } Red { repeat=2 } }
        w.extend_from_slice(b"\x01\x06Market\x01\x03Win\x02\x04Odds\x8236\x00\x01\x03Red\x0c\x812\x00");
        w.extend_from_slice(&[0x00, 0x00]); // close Market, close event
        w
    }

    #[test]
    fn event_frame_assembles() {
        let wire = event_frame(1_521_282, "89304");
        let frames = decode(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id, 1_521_282);
        let FrameBody::Event(ev) = &frames[0].body else { panic!("expected event") };
        assert_eq!(ev.event_type.as_deref(), Some("SpinAndWin"));
        assert_eq!(ev.number, Some(89_304));
        assert_eq!(ev.duration, Some(20));
        assert_eq!(ev.has_levels, Some(1));
        assert_eq!(ev.markets.len(), 2);
        assert_eq!(ev.markets[0].name, "Win");
        assert_eq!(ev.markets[0].data.int("Odds"), Some(36));
        // repeat entry resolved through the scope propagated out of Win
        assert_eq!(ev.markets[1].name, "Red");
        assert_eq!(ev.markets[1].data.int("Odds"), Some(2));
    }

    #[test]
    fn resync_skips_junk_between_frames() {
        let mut wire = event_frame(10, "1");
        wire.extend_from_slice(&[0x30, 0x30, 0x07]); // junk
        wire.extend(event_frame(11, "2"));
        let frames = decode(&wire);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].id, 10);
        assert_eq!(frames[1].id, 11);
        let FrameBody::Event(ev) = &frames[1].body else { panic!("expected event") };
        assert_eq!(ev.number, Some(2));
        assert_eq!(ev.markets.len(), 2);
    }

    #[test]
    fn candidate_start_without_object_marker_is_discarded() {
        let mut wire = vec![FRAME_START, 1, 0, 0, 0x55]; // 0x55 where 0x01 belongs
        wire.extend(event_frame(12, "3"));
        let frames = decode(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id, 12);
    }

    #[test]
    fn unknown_frame_kind_is_tolerated() {
        let mut wire = Vec::new();
        frame_header(&mut wire, 5, "ping");
        wire.push(0x00);
        wire.extend(event_frame(6, "4"));
        let frames = decode(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id, 6);
    }

    #[test]
    fn info_frame_assembles() {
        let mut wire = Vec::new();
        frame_header(&mut wire, 8_338_447, "info");
        field(&mut wire, "ID", &[0x22, 0x82, 0x36, 0x17]);
        field(&mut wire, "ValidFrom", &[0x07, 0, 0, 0, 0x0F, 0x42, 0x40, 0, 0]);
        // LastGames: one verbose entry, one compact entry
        wire.extend_from_slice(b"\x01\x09LastGames");
        wire.extend_from_slice(b"\x01\x010\x02\x06Number\x8589303\x02\x04Draw\x00\x00");
        wire.extend_from_slice(b"\x01\x011\x08\x8589302\x09\x21\x00");
        wire.push(0x00);
        // Hot: one entry with the explicit field declaration
        wire.extend_from_slice(b"\x01\x03Hot");
        wire.extend_from_slice(&[0x07, 0x09, 0x1A, 0x02, 4]);
        wire.extend_from_slice(b"Hits");
        wire.extend_from_slice(&[b':', 0x00, 0x00]);
        // Cold: one implicit entry
        wire.extend_from_slice(b"\x01\x04Cold");
        wire.extend_from_slice(&[0x0D, 0x09, 0x1B, 0x10, b'1', 0x00, 0x00]);
        // Hits: implicit then explicit keys
        wire.extend_from_slice(b"\x01\x04Hits");
        wire.extend_from_slice(&[0x07, 0x10, b':', 0x00]);
        wire.extend_from_slice(b"\x01\x02Lo\x10\x60\x00");
        wire.push(0x00);
        wire.extend_from_slice(b"\x01\x0fPreviousResults\x00\x00");

        let frames = decode(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id, 8_338_447);
        let FrameBody::Info(info) = &frames[0].body else { panic!("expected info") };
        // the ID field references the related event, not this frame
        assert_eq!(info.id, 1_521_282);
        assert!(matches!(info.valid_from, Some(Value::Time(_))));
        assert_eq!(info.last_games.len(), 2);
        assert_eq!(info.last_games[0].number, 89_303);
        assert_eq!(info.last_games[1].draw, Value::Int(33));
        assert_eq!(info.hot.items.len(), 1);
        assert_eq!(info.hot.hits_field, "Hits");
        assert_eq!(info.cold.items.len(), 1);
        assert_eq!(info.cold.items[0], crate::model::HotColdItem { key: 13, draw: 27, hits: 1 });
        assert_eq!(info.hits.len(), 2);
        assert_eq!(info.hits[1].key, Value::Str("Lo".into()));
        assert_eq!(info.hits[1].hits, 96);
        assert!(info.previous_results.is_empty());
    }

    #[test]
    fn truncated_tail_keeps_earlier_frames() {
        let mut wire = event_frame(20, "5");
        wire.extend_from_slice(&[FRAME_START, 0x01]); // id cut off
        let frames = decode(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id, 20);
    }

    #[test]
    fn decoding_twice_is_identical() {
        let mut wire = event_frame(30, "6");
        wire.extend(event_frame(31, "7"));
        assert_eq!(decode(&wire), decode(&wire));
    }
}
