//! Entity identity: per-kind monotonic id sequences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive integer identifying an entity, unique within its kind for the
/// lifetime of the session. Ids are never reclaimed or reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kinds of entity that carry their own id sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Node,
    Link,
    ControlPoint,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Link => "link",
            Self::ControlPoint => "controlPoint",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hands out ids per entity kind. Each sequence starts at 1 on its first
/// request and counts up independently of the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdAllocator {
    node: u32,
    link: u32,
    control_point: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, kind: EntityKind) -> EntityId {
        let counter = match kind {
            EntityKind::Node => &mut self.node,
            EntityKind::Link => &mut self.link,
            EntityKind::ControlPoint => &mut self.control_point,
        };
        *counter += 1;
        EntityId::new(*counter)
    }
}
