//! The event vocabulary shared by entities and the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every notification the engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    /// Raised on the scene itself when a click lands on no entity.
    ClickedEmptyArea,
    Click,
    Select,
    Unselect,
    Hover,
    HoverEnd,
    DragStart,
    Dragging,
    DragEnd,
}

impl EventName {
    pub const ALL: [Self; 9] = [
        Self::ClickedEmptyArea,
        Self::Click,
        Self::Select,
        Self::Unselect,
        Self::Hover,
        Self::HoverEnd,
        Self::DragStart,
        Self::Dragging,
        Self::DragEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClickedEmptyArea => "clickedEmptyArea",
            Self::Click => "click",
            Self::Select => "select",
            Self::Unselect => "unselect",
            Self::Hover => "hover",
            Self::HoverEnd => "hoverend",
            Self::DragStart => "dragstart",
            Self::Dragging => "dragging",
            Self::DragEnd => "dragend",
        }
    }

    /// The enter-style event whose latches this event re-arms.
    ///
    /// Latched listeners form a two-state machine per listener: armed until
    /// the enter event fires them, fired until the paired exit event re-arms
    /// them. Exit events themselves (and per-frame events like `Dragging`)
    /// re-arm nothing.
    pub fn rearms(self) -> Option<Self> {
        match self {
            Self::HoverEnd => Some(Self::Hover),
            Self::Unselect => Some(Self::Select),
            Self::DragEnd => Some(Self::DragStart),
            _ => None,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a listener fires while its condition keeps holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FiringMode {
    /// Fire on every evaluation, i.e. once per frame while hovered/selected.
    #[default]
    Continuous,
    /// Fire once on entering the condition; stay silent until the paired
    /// exit event re-arms the listener.
    Latch,
}

/// Events a node accepts listeners for.
pub const NODE_EVENTS: &[EventName] = &[
    EventName::Click,
    EventName::DragStart,
    EventName::Dragging,
    EventName::DragEnd,
    EventName::Hover,
    EventName::HoverEnd,
    EventName::Select,
    EventName::Unselect,
];

/// Events a link accepts listeners for.
pub const LINK_EVENTS: &[EventName] = &[
    EventName::Hover,
    EventName::HoverEnd,
    EventName::Click,
    EventName::Select,
    EventName::Unselect,
];

/// Events a control point accepts listeners for.
pub const CONTROL_POINT_EVENTS: &[EventName] = &[
    EventName::Hover,
    EventName::HoverEnd,
    EventName::Click,
    EventName::DragStart,
    EventName::Dragging,
    EventName::DragEnd,
];

/// Events the scene itself accepts listeners for.
pub const SCENE_EVENTS: &[EventName] = &[EventName::ClickedEmptyArea];
