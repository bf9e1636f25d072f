//! Hover tracking: at most one of {node, link, control point} at a time.
//!
//! Mutual exclusivity is a convention of the caller: the pointer-move
//! handler promotes exactly one hit-test winner and clears the losers. The
//! slots themselves only manage enter/exit notifications and the per-frame
//! re-raise.

use crate::events::{EventDispatcher, Target};
use tr_core::event::EventName;
use tr_core::id::EntityId;
use tr_core::model::{Link, Node};
use tr_core::store::EntityStore;
use tr_core::surface::Surface;

#[derive(Debug, Default)]
pub struct HoverState {
    node: Option<EntityId>,
    link: Option<EntityId>,
    /// The control point's own id; resolved back through its link on refresh.
    control_point: Option<EntityId>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_node(&self) -> Option<EntityId> {
        self.node
    }

    pub fn hovered_link(&self) -> Option<EntityId> {
        self.link
    }

    pub fn hovered_control_point(&self) -> Option<EntityId> {
        self.control_point
    }

    pub fn hover_node(
        &mut self,
        node: &Node,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        self.node = Some(node.id);
        events.execute(EventName::Hover, Target::Node(node), None, surface);
    }

    pub fn hover_link(
        &mut self,
        link: &Link,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        self.link = Some(link.id);
        events.execute(EventName::Hover, Target::Link(link), None, surface);
    }

    pub fn hover_control_point(
        &mut self,
        link: &Link,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        self.control_point = Some(link.control_point.id);
        events.execute(
            EventName::Hover,
            Target::ControlPoint(&link.control_point),
            None,
            surface,
        );
    }

    /// Raise `hoverend` and clear the node slot, only if it was set.
    pub fn unhover_node(
        &mut self,
        nodes: &EntityStore<Node>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.node.take()
            && let Some(node) = nodes.get(id)
        {
            events.execute(EventName::HoverEnd, Target::Node(node), None, surface);
        }
    }

    /// Raise `hoverend` and clear the link slot, only if it was set.
    pub fn unhover_link(
        &mut self,
        links: &EntityStore<Link>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.link.take()
            && let Some(link) = links.get(id)
        {
            events.execute(EventName::HoverEnd, Target::Link(link), None, surface);
        }
    }

    /// Raise `hoverend` and clear the control-point slot, only if it was set.
    pub fn unhover_control_point(
        &mut self,
        links: &EntityStore<Link>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.control_point.take()
            && let Some(link) = links.iter().find(|l| l.control_point.id == id)
        {
            events.execute(
                EventName::HoverEnd,
                Target::ControlPoint(&link.control_point),
                None,
                surface,
            );
        }
    }

    /// Once per frame: re-raise `hover` for whichever slot is set. Links are
    /// checked before nodes, then control points.
    pub fn refresh(
        &self,
        nodes: &EntityStore<Node>,
        links: &EntityStore<Link>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.link {
            if let Some(link) = links.get(id) {
                events.execute(EventName::Hover, Target::Link(link), None, surface);
            }
        } else if let Some(id) = self.node {
            if let Some(node) = nodes.get(id) {
                events.execute(EventName::Hover, Target::Node(node), None, surface);
            }
        } else if let Some(id) = self.control_point
            && let Some(link) = links.iter().find(|l| l.control_point.id == id)
        {
            events.execute(
                EventName::Hover,
                Target::ControlPoint(&link.control_point),
                None,
                surface,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ListenerTarget;
    use std::cell::Cell;
    use std::rc::Rc;
    use tr_core::config::EngineConfig;
    use tr_core::event::FiringMode;
    use tr_core::geom::Point;
    use tr_core::model::{Color, ControlPoint, NodeSpec, Shape, ShapeKind};
    use tr_harness::RecordingSurface;

    fn node(id: u32) -> Node {
        let spec = NodeSpec {
            x: Some(0.0),
            y: Some(0.0),
            radius: Some(10.0),
            fill: Some(Color::rgb(0, 0, 0)),
            ..Default::default()
        };
        Node::new(
            EntityId::new(id),
            Shape::from_spec(ShapeKind::Circle, &spec, &EngineConfig::default()).unwrap(),
            true,
        )
    }

    #[test]
    fn hoverend_only_fires_if_hover_was_set() {
        let mut events = EventDispatcher::new();
        let mut surface = RecordingSurface::new();
        let mut nodes = EntityStore::new("node");
        nodes.add(node(1));

        let ends = Rc::new(Cell::new(0));
        let sink = ends.clone();
        events
            .add_listener(
                ListenerTarget::Node(EntityId::new(1)),
                EventName::HoverEnd,
                FiringMode::Continuous,
                Box::new(move |_, _, _| sink.set(sink.get() + 1)),
            )
            .unwrap();

        let mut hover = HoverState::new();
        hover.unhover_node(&nodes, &mut events, &mut surface);
        assert_eq!(ends.get(), 0);

        hover.hover_node(nodes.get(EntityId::new(1)).unwrap(), &mut events, &mut surface);
        hover.unhover_node(&nodes, &mut events, &mut surface);
        hover.unhover_node(&nodes, &mut events, &mut surface);
        assert_eq!(ends.get(), 1);
        assert_eq!(hover.hovered_node(), None);
    }

    #[test]
    fn refresh_prefers_link_then_node() {
        let mut events = EventDispatcher::new();
        let mut surface = RecordingSurface::new();
        let mut nodes = EntityStore::new("node");
        let mut links = EntityStore::new("link");
        nodes.add(node(1));
        let cp = ControlPoint::new(
            EntityId::new(1),
            EntityId::new(4),
            Point::new(0.0, 0.0),
            Color::rgb(0, 0, 0),
        );
        links.add(Link::new(
            EntityId::new(4),
            EntityId::new(1),
            EntityId::new(2),
            Color::rgb(0, 0, 0),
            cp,
        ));

        let node_hovers = Rc::new(Cell::new(0));
        let link_hovers = Rc::new(Cell::new(0));
        let node_sink = node_hovers.clone();
        let link_sink = link_hovers.clone();
        events
            .add_listener(
                ListenerTarget::Node(EntityId::new(1)),
                EventName::Hover,
                FiringMode::Continuous,
                Box::new(move |_, _, _| node_sink.set(node_sink.get() + 1)),
            )
            .unwrap();
        events
            .add_listener(
                ListenerTarget::Link(EntityId::new(4)),
                EventName::Hover,
                FiringMode::Continuous,
                Box::new(move |_, _, _| link_sink.set(link_sink.get() + 1)),
            )
            .unwrap();

        let mut hover = HoverState::new();
        hover.hover_node(nodes.get(EntityId::new(1)).unwrap(), &mut events, &mut surface);
        hover.hover_link(links.get(EntityId::new(4)).unwrap(), &mut events, &mut surface);
        node_hovers.set(0);
        link_hovers.set(0);

        hover.refresh(&nodes, &links, &mut events, &mut surface);
        assert_eq!(link_hovers.get(), 1);
        assert_eq!(node_hovers.get(), 0);
    }
}
