//! Generic recursive container parsing.
//!
//! A container is a run of length-prefixed declarations closed by a 0x00
//! sentinel (or by the end of the buffer — a legal end of stream, logged
//! separately). Three declarations exist: a named sub-object (`0x01`), a
//! named field with one scalar (`0x02`), and a repeat shorthand (`0x0C`)
//! that reuses the most recently declared field name in scope. The scope is
//! shared bidirectionally: a child inherits it from its parent, and a field
//! declared inside the child renames the scope the parent continues with.
use crate::cursor::Cursor;
use crate::value::{Value, decode_value};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// One entry of a parsed container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Value(Value),
    Object(ObjectNode),
}

/// Insertion-ordered name→node map. Order is significant: consumers render
/// records exactly in wire order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectNode {
    entries: Vec<(String, Node)>,
}

impl ObjectNode {
    /// Insert under `name`, replacing an existing entry in place so the
    /// original position is kept.
    pub fn insert(&mut self, name: &str, node: Node) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = node,
            None => self.entries.push((name.to_string(), node)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, n)| n)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            Node::Value(v) => Some(v),
            Node::Object(_) => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&ObjectNode> {
        match self.get(name)? {
            Node::Object(o) => Some(o),
            Node::Value(_) => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.value(name)?.as_int()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.value(name)?.as_str()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read one length-prefixed name. Invalid UTF-8 decodes with replacement
/// characters; a name cut short by the buffer end keeps what was there.
pub(crate) fn read_name(cur: &mut Cursor<'_>) -> Option<String> {
    let len = cur.read_byte()? as usize;
    let t = cur.read(len);
    if t.truncated {
        trace!(want = len, got = t.bytes.len(), "name truncated by end of buffer");
    }
    Some(String::from_utf8_lossy(t.bytes).into_owned())
}

/// Parse one container starting right after its name. `inherited` is the
/// field name in scope at entry; the returned name is whatever the scope is
/// after this container, so the caller can pick up renames made inside.
pub fn parse_object(
    cur: &mut Cursor<'_>,
    inherited: Option<String>,
) -> (ObjectNode, Option<String>) {
    let mut obj = ObjectNode::default();
    let mut last_field = inherited;
    loop {
        let Some(marker) = cur.read_byte() else {
            trace!("container closed by end of buffer");
            break;
        };
        match marker {
            0x00 => break,
            0x01 => {
                let Some(name) = read_name(cur) else { break };
                let (child, child_scope) = parse_object(cur, last_field.clone());
                obj.insert(&name, Node::Object(child));
                if child_scope.is_some() {
                    last_field = child_scope;
                }
            }
            0x02 => {
                let Some(name) = read_name(cur) else { break };
                if let Some(v) = decode_value(cur) {
                    obj.insert(&name, Node::Value(v));
                }
                last_field = Some(name);
            }
            0x0C => {
                // the value is consumed either way so a bad repeat cannot
                // shift every later read
                let value = decode_value(cur);
                match (&last_field, value) {
                    (Some(name), Some(v)) => obj.insert(name, Node::Value(v)),
                    (None, _) => warn!("repeat shorthand with no field in scope, skipped"),
                    _ => {}
                }
            }
            other => trace!(marker = other, "unexpected byte inside container, skipped"),
        }
    }
    (obj, last_field)
}
