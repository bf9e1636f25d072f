//! Pointer input as delivered by the embedder's input source.
//!
//! Positions are in surface-local coordinates; timestamps come from the
//! input source's clock and are only ever compared against each other.

use serde::{Deserialize, Serialize};
use tr_core::geom::Point;
use tr_core::surface::PointerKind;

/// Press-to-release times below these classify a pointer-up/click as a
/// click rather than the tail of a drag.
pub const MOUSE_CLICK_MS: f64 = 150.0;
pub const TOUCH_CLICK_MS: f64 = 350.0;

pub fn click_threshold(kind: PointerKind) -> f64 {
    match kind {
        PointerKind::Mouse => MOUSE_CLICK_MS,
        PointerKind::Touch => TOUCH_CLICK_MS,
    }
}

/// One raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum InputEvent {
    PointerDown {
        pos: Point,
        kind: PointerKind,
        time_ms: f64,
    },
    PointerMove {
        pos: Point,
        kind: PointerKind,
        time_ms: f64,
    },
    PointerUp {
        pos: Point,
        kind: PointerKind,
        time_ms: f64,
    },
    /// The input source's click notification, delivered after the matching
    /// pointer-up. The engine decides whether it really was a click by
    /// elapsed time since pointer-down.
    Click {
        pos: Point,
        kind: PointerKind,
        time_ms: f64,
    },
}

impl InputEvent {
    pub fn pos(&self) -> Point {
        match *self {
            Self::PointerDown { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerUp { pos, .. }
            | Self::Click { pos, .. } => pos,
        }
    }

    pub fn kind(&self) -> PointerKind {
        match *self {
            Self::PointerDown { kind, .. }
            | Self::PointerMove { kind, .. }
            | Self::PointerUp { kind, .. }
            | Self::Click { kind, .. } => kind,
        }
    }
}
