//! Typed records assembled from the generic parse trees.
//!
//! Each record is owned by its frame; markets by their event, list items by
//! their info. There are no cross-record references, so frames can be handed
//! off or persisted independently.
use crate::object::ObjectNode;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One top-level message: a 24-bit id plus an event or info body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: u32,
    pub body: FrameBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameBody {
    Event(Event),
    Info(Info),
}

/// A spin event. Fields the wire did not carry stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub event_type: Option<String>,
    /// Decoded timestamp, or the raw bytes when conversion was impossible.
    pub time: Option<Value>,
    pub number: Option<i64>,
    pub duration: Option<i64>,
    pub has_levels: Option<i64>,
    pub markets: Vec<Market>,
}

/// One market of an event, with its odds fields in wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    pub data: ObjectNode,
}

/// A statistics record accompanying an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Value of the leading ID field. It references the related event;
    /// resolving that reference is up to the consumer.
    pub id: i64,
    pub valid_from: Option<Value>,
    pub last_games: Vec<Game>,
    pub hot: HotColdList,
    pub cold: HotColdList,
    pub hits: Vec<HitsItem>,
    /// Present on the wire but always delivered empty.
    pub previous_results: Vec<Value>,
}

/// One recent game from the LastGames list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    pub number: i64,
    /// Winning draw; an unparseable verbose entry keeps the raw string.
    pub draw: Value,
}

/// Hot or Cold list plus the hits field name it was declared with. An
/// explicit declaration on any entry persists for the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotColdList {
    pub hits_field: String,
    pub items: Vec<HotColdItem>,
}

impl Default for HotColdList {
    fn default() -> Self {
        Self { hits_field: "Hits".to_string(), items: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotColdItem {
    pub key: i64,
    pub draw: i64,
    pub hits: i64,
}

/// One entry of the keyed Hits list: positional (`Int`) or named (`Str`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitsItem {
    pub key: Value,
    pub hits: i64,
}
