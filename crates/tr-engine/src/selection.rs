//! Selection tracking with enter/exit notifications.
//!
//! The node and link slots are independent channels: selecting a node does
//! not clear a selected link, and vice versa. Callers that want exclusive
//! selection deselect the other slot explicitly, or call
//! [`SelectionState::clear`].

use crate::events::{EventDispatcher, Target};
use tr_core::event::EventName;
use tr_core::id::EntityId;
use tr_core::model::{Link, Node};
use tr_core::store::EntityStore;
use tr_core::surface::Surface;

#[derive(Debug, Default)]
pub struct SelectionState {
    selected_node: Option<EntityId>,
    selected_link: Option<EntityId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_node(&self) -> Option<EntityId> {
        self.selected_node
    }

    pub fn selected_link(&self) -> Option<EntityId> {
        self.selected_link
    }

    pub fn select_node(
        &mut self,
        node: &Node,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        self.selected_node = Some(node.id);
        events.execute(EventName::Select, Target::Node(node), None, surface);
    }

    pub fn select_link(
        &mut self,
        link: &Link,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        self.selected_link = Some(link.id);
        events.execute(EventName::Select, Target::Link(link), None, surface);
    }

    /// Clear the node slot, raising `unselect` exactly once if it was set.
    pub fn deselect_node(
        &mut self,
        nodes: &EntityStore<Node>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.selected_node.take() {
            match nodes.get(id) {
                Some(node) => events.execute(EventName::Unselect, Target::Node(node), None, surface),
                None => log::debug!("selected node {id} already left the scene"),
            }
        }
    }

    /// Clear the link slot, raising `unselect` exactly once if it was set.
    pub fn deselect_link(
        &mut self,
        links: &EntityStore<Link>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.selected_link.take() {
            match links.get(id) {
                Some(link) => events.execute(EventName::Unselect, Target::Link(link), None, surface),
                None => log::debug!("selected link {id} already left the scene"),
            }
        }
    }

    /// Clear both slots.
    pub fn clear(
        &mut self,
        nodes: &EntityStore<Node>,
        links: &EntityStore<Link>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        self.deselect_node(nodes, events, surface);
        self.deselect_link(links, events, surface);
    }

    /// Once per frame: re-assert the highlight of whichever slot is active,
    /// node before link, by re-raising `select`. Continuous listeners repaint
    /// every frame; latched ones stay quiet until re-armed.
    pub fn refresh(
        &self,
        nodes: &EntityStore<Node>,
        links: &EntityStore<Link>,
        events: &mut EventDispatcher,
        surface: &mut dyn Surface,
    ) {
        if let Some(id) = self.selected_node {
            if let Some(node) = nodes.get(id) {
                events.execute(EventName::Select, Target::Node(node), None, surface);
            }
        } else if let Some(id) = self.selected_link
            && let Some(link) = links.get(id)
        {
            events.execute(EventName::Select, Target::Link(link), None, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tr_core::config::EngineConfig;
    use tr_core::event::FiringMode;
    use tr_core::model::{Color, NodeSpec, Shape, ShapeKind};
    use tr_harness::RecordingSurface;

    use crate::events::ListenerTarget;

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
    fn deselect_fires_unselect_once_and_only_when_selected() {
        let mut events = EventDispatcher::new();
        let mut surface = RecordingSurface::new();
        let mut nodes = EntityStore::new("node");
        nodes.add(node(1));

        let fired: Rc<RefCell<Vec<EventName>>> = Rc::default();
        let sink = fired.clone();
        events
            .add_listener(
                ListenerTarget::Node(EntityId::new(1)),
                EventName::Unselect,
                FiringMode::Continuous,
                Box::new(move |_, _, _| sink.borrow_mut().push(EventName::Unselect)),
            )
            .unwrap();

        let mut selection = SelectionState::new();
        selection.deselect_node(&nodes, &mut events, &mut surface);
        assert!(fired.borrow().is_empty());

        selection.select_node(nodes.get(EntityId::new(1)).unwrap(), &mut events, &mut surface);
        selection.deselect_node(&nodes, &mut events, &mut surface);
        selection.deselect_node(&nodes, &mut events, &mut surface);
        assert_eq!(fired.borrow().len(), 1);
        assert_eq!(selection.selected_node(), None);
    }

    #[test]
    fn node_and_link_slots_are_independent() {
        let mut events = EventDispatcher::new();
        let mut surface = RecordingSurface::new();
        let n = node(1);

        let cp = tr_core::model::ControlPoint::new(
            EntityId::new(1),
            EntityId::new(9),
            tr_core::geom::Point::new(0.0, 0.0),
            Color::rgb(0, 0, 0),
        );
        let link = Link::new(
            EntityId::new(9),
            EntityId::new(1),
            EntityId::new(2),
            Color::rgb(0, 0, 0),
            cp,
        );

        let mut selection = SelectionState::new();
        selection.select_node(&n, &mut events, &mut surface);
        selection.select_link(&link, &mut events, &mut surface);
        assert_eq!(selection.selected_node(), Some(EntityId::new(1)));
        assert_eq!(selection.selected_link(), Some(EntityId::new(9)));
    }

    #[test]
    fn refresh_prefers_the_node_slot() {
        let mut events = EventDispatcher::new();
        let mut surface = RecordingSurface::new();
        let mut nodes = EntityStore::new("node");
        let mut links = EntityStore::new("link");
        nodes.add(node(1));
        let cp = tr_core::model::ControlPoint::new(
            EntityId::new(1),
            EntityId::new(9),
            tr_core::geom::Point::new(0.0, 0.0),
            Color::rgb(0, 0, 0),
        );
        links.add(Link::new(
            EntityId::new(9),
            EntityId::new(1),
            EntityId::new(2),
            Color::rgb(0, 0, 0),
            cp,
        ));

        let selects: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let node_sink = selects.clone();
        let link_sink = selects.clone();
        events
            .add_listener(
                ListenerTarget::Node(EntityId::new(1)),
                EventName::Select,
                FiringMode::Continuous,
                Box::new(move |_, _, _| node_sink.borrow_mut().push("node")),
            )
            .unwrap();
        events
            .add_listener(
                ListenerTarget::Link(EntityId::new(9)),
                EventName::Select,
                FiringMode::Continuous,
                Box::new(move |_, _, _| link_sink.borrow_mut().push("link")),
            )
            .unwrap();

        let mut selection = SelectionState::new();
        selection.select_node(nodes.get(EntityId::new(1)).unwrap(), &mut events, &mut surface);
        selection.select_link(links.get(EntityId::new(9)).unwrap(), &mut events, &mut surface);
        selects.borrow_mut().clear();

        // Both slots set: per-frame refresh re-asserts the node only.
        selection.refresh(&nodes, &links, &mut events, &mut surface);
        assert_eq!(*selects.borrow(), vec!["node"]);
    }
}
