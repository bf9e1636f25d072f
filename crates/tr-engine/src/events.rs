//! The listener registry and notification fan-out.
//!
//! Listeners are stored per event name and matched to a concrete target at
//! dispatch time. A listener fires either continuously (every evaluation of
//! its condition, i.e. every frame while hovered/selected) or as a latch:
//! once on entering the condition, then not again until the paired exit
//! event re-arms it. Re-arming edges are defined by
//! [`EventName::rearms`]: `hoverend` re-arms `hover`, `unselect` re-arms
//! `select`, `dragend` re-arms `dragstart`, always for the same target.

use std::collections::HashMap;
use thiserror::Error;
use tr_core::event::{self, EventName, FiringMode};
use tr_core::geom::Point;
use tr_core::id::EntityId;
use tr_core::model::{ControlPoint, Link, Node};
use tr_core::surface::Surface;

/// Fatal listener-registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("event `{event}` is not listenable for a {target}")]
    NotListenable {
        event: EventName,
        target: &'static str,
    },
}

/// What a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Node(EntityId),
    Link(EntityId),
    /// Control points are addressed by their owning link.
    ControlPoint { link: EntityId },
    /// The scene itself; matches every scene-level notification.
    Scene,
}

impl ListenerTarget {
    pub fn listenable(self) -> &'static [EventName] {
        match self {
            Self::Node(_) => event::NODE_EVENTS,
            Self::Link(_) => event::LINK_EVENTS,
            Self::ControlPoint { .. } => event::CONTROL_POINT_EVENTS,
            Self::Scene => event::SCENE_EVENTS,
        }
    }

    fn kind_label(self) -> &'static str {
        match self {
            Self::Node(_) => "node",
            Self::Link(_) => "link",
            Self::ControlPoint { .. } => "control point",
            Self::Scene => "scene",
        }
    }
}

/// The entity an event fired on, borrowed for the duration of the dispatch.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Node(&'a Node),
    Link(&'a Link),
    ControlPoint(&'a ControlPoint),
    Scene,
}

impl Target<'_> {
    fn matches(&self, listener: ListenerTarget) -> bool {
        match (self, listener) {
            (Self::Node(node), ListenerTarget::Node(id)) => node.id == id,
            (Self::Link(link), ListenerTarget::Link(id)) => link.id == id,
            (Self::ControlPoint(cp), ListenerTarget::ControlPoint { link }) => cp.link == link,
            (Self::Scene, ListenerTarget::Scene) => true,
            _ => false,
        }
    }
}

/// Listener callbacks receive the pointer position that raised the event (if
/// any), the target entity, and the surface, scoped by a save/restore pair so
/// highlight drawing cannot leak render state.
pub type Callback = Box<dyn FnMut(Option<Point>, Target<'_>, &mut dyn Surface)>;

struct ListenerRecord {
    target: ListenerTarget,
    mode: FiringMode,
    fired: bool,
    callback: Callback,
}

/// Per-event listener registry with continuous/latch firing semantics.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<EventName, Vec<ListenerRecord>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. The event must be in the target's listenable
    /// set.
    pub fn add_listener(
        &mut self,
        target: ListenerTarget,
        event: EventName,
        mode: FiringMode,
        callback: Callback,
    ) -> Result<(), RegisterError> {
        if !target.listenable().contains(&event) {
            return Err(RegisterError::NotListenable {
                event,
                target: target.kind_label(),
            });
        }
        self.listeners.entry(event).or_default().push(ListenerRecord {
            target,
            mode,
            fired: false,
            callback,
        });
        Ok(())
    }

    /// Drop every listener attached to `target`. Called when its entity
    /// leaves the scene.
    pub fn remove_listeners_for(&mut self, target: ListenerTarget) {
        for records in self.listeners.values_mut() {
            records.retain(|record| record.target != target);
        }
    }

    /// Number of listeners registered for `event`, across all targets.
    pub fn listener_count(&self, event: EventName) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    /// Fire `event` on `target`: invoke every matching listener (skipping
    /// latched ones that already fired), then re-arm whatever latches this
    /// event resets.
    pub fn execute(
        &mut self,
        event: EventName,
        target: Target<'_>,
        options: Option<Point>,
        surface: &mut dyn Surface,
    ) {
        if let Some(records) = self.listeners.get_mut(&event) {
            for record in records.iter_mut().filter(|r| target.matches(r.target)) {
                if record.mode == FiringMode::Latch && record.fired {
                    continue;
                }
                surface.save();
                (record.callback)(options, target, surface);
                surface.restore();
                record.fired = true;
            }
        }

        if let Some(enter) = event.rearms()
            && let Some(records) = self.listeners.get_mut(&enter)
        {
            for record in records.iter_mut().filter(|r| target.matches(r.target)) {
                record.fired = false;
            }
        }
    }
}
