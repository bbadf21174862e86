//! Decoder for a proprietary live-game telemetry feed.
//!
//! The wire format is a non-self-describing binary stream: single-byte type
//! markers, length-prefixed names, nested containers closed by a 0x00
//! sentinel, a repeat shorthand that reuses the last declared field name,
//! and a handful of positional compact encodings inside the statistics
//! lists. This crate turns a complete captured buffer into ordered, typed
//! records:
//!
//! - `cursor`: bounded byte reader with mark/rewind
//! - `value`: marker-driven scalar decoding
//! - `object`: the generic recursive container parser
//! - `list`: the LastGames / Hot / Cold / Hits list decoders
//! - `frame`: frame scanning, resync, and record assembly
//! - `levels`: the standalone per-number level statistics message
//! - `model`: the assembled Event / Info records
//! - `record`: CRC-checked on-disk container for decoded frames
//!
//! Decoding is best effort: malformed input never aborts the run. The
//! framer resynchronizes on the next frame start and returns every frame it
//! could read, and the list decoders end only the list a bad item sits in.
pub mod cursor;
pub mod frame;
pub mod levels;
pub mod list;
pub mod model;
pub mod object;
pub mod record;
pub mod value;
