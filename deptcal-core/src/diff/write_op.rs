use std::fmt;

use serde_json::{Map, Value};

use crate::error::DeptCalResult;
use crate::event::Event;

/// Effect of a write on its document. A patch counts as an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            WriteKind::Create => "+",
            WriteKind::Update => "~",
            WriteKind::Delete => "-",
        };
        f.write_str(symbol)
    }
}

/// Payload of a single-document write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteAction {
    /// Write a new document (overwrites if the id is taken).
    Create(Value),
    /// Replace an existing document.
    Update(Value),
    /// Merge top-level fields into an existing document.
    Patch(Map<String, Value>),
    Delete,
}

/// A write touching exactly one document.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    pub collection: String,
    pub id: String,
    pub action: WriteAction,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind(), self.collection, self.id)
    }
}

impl WriteOp {
    pub fn create(collection: &str, event: &Event) -> DeptCalResult<Self> {
        Ok(WriteOp {
            collection: collection.to_string(),
            id: event.id.clone(),
            action: WriteAction::Create(serde_json::to_value(event)?),
        })
    }

    pub fn update(collection: &str, event: &Event) -> DeptCalResult<Self> {
        Ok(WriteOp {
            collection: collection.to_string(),
            id: event.id.clone(),
            action: WriteAction::Update(serde_json::to_value(event)?),
        })
    }

    pub fn patch(collection: &str, id: &str, fields: Map<String, Value>) -> Self {
        WriteOp {
            collection: collection.to_string(),
            id: id.to_string(),
            action: WriteAction::Patch(fields),
        }
    }

    pub fn delete(collection: &str, id: &str) -> Self {
        WriteOp {
            collection: collection.to_string(),
            id: id.to_string(),
            action: WriteAction::Delete,
        }
    }

    pub fn kind(&self) -> WriteKind {
        match self.action {
            WriteAction::Create(_) => WriteKind::Create,
            WriteAction::Update(_) | WriteAction::Patch(_) => WriteKind::Update,
            WriteAction::Delete => WriteKind::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn displays_kind_and_path() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let event = Event::new("evt", "Open class", "math", day, day);

        assert_eq!(WriteOp::create("events", &event).unwrap().to_string(), "+ events/evt");
        assert_eq!(WriteOp::delete("events", "evt_art").to_string(), "- events/evt_art");
        assert_eq!(WriteOp::patch("events", "evt", Map::new()).kind(), WriteKind::Update);
    }
}
