//! The scene aggregate: every store and tracker the frame driver owns,
//! plus the pointer state machine that ties them together.
//!
//! One `Scene` is the single authority for a drawing surface. All state
//! mutation happens synchronously inside its methods; the only suspension
//! points are image loads, which surface through [`Scene::pump_assets`].
//!
//! The per-frame contract (`draw`) deliberately rebuilds the stores:
//! snapshot, truncate, render links then nodes, each render re-appending its
//! entity. Append order is draw order and next-frame hit priority, so there
//! is no z-index anywhere; do not replace this with an in-place sort.

use crate::events::{Callback, EventDispatcher, ListenerTarget, RegisterError, Target};
use crate::hover::HoverState;
use crate::input::{InputEvent, click_threshold};
use crate::selection::SelectionState;
use thiserror::Error;
use tr_core::config::EngineConfig;
use tr_core::error::ShapeError;
use tr_core::event::{EventName, FiringMode};
use tr_core::geom::{Point, Viewport};
use tr_core::id::{EntityId, EntityKind, IdAllocator};
use tr_core::model::{
    AssetOutcome, ControlPoint, ControlPointPatch, Link, Node, NodeSpec, Shape, ShapeKind,
    ShapePatch,
};
use tr_core::store::EntityStore;
use tr_core::surface::{DragBinding, ImageLoader, PointerKind, StyleResolver, Surface};
use tr_render::{hit, paint};

/// Scene-level operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error("no node {0} in the scene")]
    UnknownNode(EntityId),

    #[error("no link {0} in the scene")]
    UnknownLink(EntityId),

    #[error("nodes {0} and {1} are already linked")]
    LinkExists(EntityId, EntityId),

    #[error("a drag session is already active")]
    DragInProgress,
}

/// The entity currently being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    Node(EntityId),
    /// A control point, addressed by its owning link.
    ControlPoint { link: EntityId },
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    handle: DragHandle,
    /// `pointer - entity origin`, captured at pointer-down; every move puts
    /// the entity at `pointer - offset`.
    offset: Point,
}

pub struct Scene {
    pub config: EngineConfig,
    pub viewport: Viewport,
    pub nodes: EntityStore<Node>,
    pub links: EntityStore<Link>,
    pub selection: SelectionState,
    pub hover: HoverState,
    pub events: EventDispatcher,
    ids: IdAllocator,
    /// Nodes whose first render is gated on an asset load. They join the
    /// store when the load lands.
    staged: Vec<Node>,
    drag: Option<DragSession>,
    pointer_down_at: Option<f64>,
}

impl Scene {
    pub fn new(config: EngineConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport,
            nodes: EntityStore::new("node"),
            links: EntityStore::new("link"),
            selection: SelectionState::new(),
            hover: HoverState::new(),
            events: EventDispatcher::new(),
            ids: IdAllocator::new(),
            staged: Vec::new(),
            drag: None,
            pointer_down_at: None,
        }
    }

    /// The active drag target, if a session is running.
    pub fn drag_handle(&self) -> Option<DragHandle> {
        self.drag.map(|session| session.handle)
    }

    // ─── Entity lifecycle ────────────────────────────────────────────────

    /// Create a node. Fails on an unsupported shape kind or missing
    /// geometry. A node whose spec carries a background image or markup only
    /// becomes visible (and hit-testable) once its assets resolve.
    pub fn create_node(
        &mut self,
        kind: ShapeKind,
        spec: &NodeSpec,
        loader: &mut dyn ImageLoader,
        styles: &dyn StyleResolver,
    ) -> Result<EntityId, SceneError> {
        if !self.config.shape_kinds.contains(&kind) {
            return Err(ShapeError::UnsupportedShape(kind.to_string()).into());
        }
        let mut shape = Shape::from_spec(kind, spec, &self.config)?;
        let deferred = shape.request_assets(loader, styles);
        let id = self.ids.next(EntityKind::Node);
        let node = Node::new(id, shape, spec.draggable.unwrap_or(true));
        if deferred {
            self.staged.push(node);
        } else {
            self.nodes.add(node);
        }
        Ok(id)
    }

    /// Create a link between two existing nodes. The unordered pair must not
    /// already be linked. The control point is synthesized immediately at
    /// the midpoint of the endpoint centers.
    pub fn create_link(&mut self, a: EntityId, b: EntityId) -> Result<EntityId, SceneError> {
        let center_a = self
            .nodes
            .get(a)
            .map(Node::center)
            .ok_or(SceneError::UnknownNode(a))?;
        let center_b = self
            .nodes
            .get(b)
            .map(Node::center)
            .ok_or(SceneError::UnknownNode(b))?;
        if !hit::no_link_between(&self.links, a, b) {
            return Err(SceneError::LinkExists(a, b));
        }

        let id = self.ids.next(EntityKind::Link);
        let cp_id = self.ids.next(EntityKind::ControlPoint);
        let control_point = ControlPoint::new(
            cp_id,
            id,
            center_a.midpoint(center_b),
            self.config.palette.control_point,
        );
        self.links.add(Link::new(
            id,
            a,
            b,
            self.config.palette.link_stroke,
            control_point,
        ));
        Ok(id)
    }

    /// Remove a node: every link touching it goes too, its selection is
    /// cleared (raising `unselect` exactly once), and all listeners of the
    /// node and the removed links are purged.
    pub fn remove_node(&mut self, id: EntityId, surface: &mut dyn Surface) {
        let touching: Vec<EntityId> = self
            .links
            .iter()
            .filter(|link| link.touches(id))
            .map(|link| link.id)
            .collect();
        for link_id in touching {
            self.remove_link(link_id, surface);
        }

        if self.selection.selected_node() == Some(id) {
            let Self {
                nodes,
                selection,
                events,
                ..
            } = self;
            selection.deselect_node(nodes, events, surface);
        }

        let Self { nodes, events, .. } = self;
        let removed = nodes.remove_with(id, |_| {
            events.remove_listeners_for(ListenerTarget::Node(id));
        });
        if !removed {
            self.staged.retain(|node| node.id != id);
        }
    }

    /// Remove a link, clearing its selection if selected and purging its
    /// listeners (including control-point listeners keyed on it).
    pub fn remove_link(&mut self, id: EntityId, surface: &mut dyn Surface) {
        if self.selection.selected_link() == Some(id) {
            let Self {
                links,
                selection,
                events,
                ..
            } = self;
            selection.deselect_link(links, events, surface);
        }
        let Self { links, events, .. } = self;
        links.remove_with(id, |_| {
            events.remove_listeners_for(ListenerTarget::Link(id));
            events.remove_listeners_for(ListenerTarget::ControlPoint { link: id });
        });
    }

    /// Merge a patch into a node's shape. Synchronous fields apply
    /// immediately; a supplied background image or markup becomes visible
    /// only after its load completes.
    pub fn update_shape(
        &mut self,
        id: EntityId,
        patch: &ShapePatch,
        loader: &mut dyn ImageLoader,
        styles: &dyn StyleResolver,
    ) -> Result<(), SceneError> {
        let node = match self.nodes.get_mut(id) {
            Some(node) => node,
            None => self
                .staged
                .iter_mut()
                .find(|node| node.id == id)
                .ok_or(SceneError::UnknownNode(id))?,
        };
        node.shape.update(patch, loader, styles, &self.config);
        Ok(())
    }

    /// Reposition or re-style a link's control point. This is the only way a
    /// control point moves; dragging the link's endpoints never touches it.
    pub fn update_control_point(
        &mut self,
        link_id: EntityId,
        patch: &ControlPointPatch,
    ) -> Result<(), SceneError> {
        let link = self
            .links
            .get_mut(link_id)
            .ok_or(SceneError::UnknownLink(link_id))?;
        link.control_point.apply(patch);
        Ok(())
    }

    // ─── Listener registration ───────────────────────────────────────────

    pub fn add_node_listener(
        &mut self,
        id: EntityId,
        event: EventName,
        mode: FiringMode,
        callback: Callback,
    ) -> Result<(), SceneError> {
        if !self.nodes.contains(id) && !self.staged.iter().any(|node| node.id == id) {
            return Err(SceneError::UnknownNode(id));
        }
        self.events
            .add_listener(ListenerTarget::Node(id), event, mode, callback)?;
        Ok(())
    }

    pub fn add_link_listener(
        &mut self,
        id: EntityId,
        event: EventName,
        mode: FiringMode,
        callback: Callback,
    ) -> Result<(), SceneError> {
        if !self.links.contains(id) {
            return Err(SceneError::UnknownLink(id));
        }
        self.events
            .add_listener(ListenerTarget::Link(id), event, mode, callback)?;
        Ok(())
    }

    pub fn add_control_point_listener(
        &mut self,
        link_id: EntityId,
        event: EventName,
        mode: FiringMode,
        callback: Callback,
    ) -> Result<(), SceneError> {
        if !self.links.contains(link_id) {
            return Err(SceneError::UnknownLink(link_id));
        }
        self.events
            .add_listener(ListenerTarget::ControlPoint { link: link_id }, event, mode, callback)?;
        Ok(())
    }

    pub fn add_scene_listener(
        &mut self,
        event: EventName,
        mode: FiringMode,
        callback: Callback,
    ) -> Result<(), SceneError> {
        self.events
            .add_listener(ListenerTarget::Scene, event, mode, callback)?;
        Ok(())
    }

    // ─── Selection passthroughs ──────────────────────────────────────────

    pub fn select_node(&mut self, id: EntityId, surface: &mut dyn Surface) -> Result<(), SceneError> {
        let Self {
            nodes,
            selection,
            events,
            ..
        } = self;
        let node = nodes.get(id).ok_or(SceneError::UnknownNode(id))?;
        selection.select_node(node, events, surface);
        Ok(())
    }

    pub fn select_link(&mut self, id: EntityId, surface: &mut dyn Surface) -> Result<(), SceneError> {
        let Self {
            links,
            selection,
            events,
            ..
        } = self;
        let link = links.get(id).ok_or(SceneError::UnknownLink(id))?;
        selection.select_link(link, events, surface);
        Ok(())
    }

    pub fn deselect_node(&mut self, surface: &mut dyn Surface) {
        let Self {
            nodes,
            selection,
            events,
            ..
        } = self;
        selection.deselect_node(nodes, events, surface);
    }

    pub fn deselect_link(&mut self, surface: &mut dyn Surface) {
        let Self {
            links,
            selection,
            events,
            ..
        } = self;
        selection.deselect_link(links, events, surface);
    }

    // ─── Asset resolution ────────────────────────────────────────────────

    /// Drain completed image loads and route each to the shape that issued
    /// it. Staged nodes join the store once their last pending load applies;
    /// stale completions (superseded by a later update) are dropped.
    pub fn pump_assets(&mut self, loader: &mut dyn ImageLoader) {
        for (ticket, result) in loader.take_ready() {
            let mut routed = false;

            let mut staged_index = 0;
            while staged_index < self.staged.len() {
                match self.staged[staged_index]
                    .shape
                    .resolve_asset(ticket, result.clone())
                {
                    AssetOutcome::Unknown => staged_index += 1,
                    AssetOutcome::Applied => {
                        if !self.staged[staged_index].shape.has_pending_assets() {
                            let node = self.staged.remove(staged_index);
                            self.nodes.add(node);
                        }
                        routed = true;
                        break;
                    }
                    AssetOutcome::Stale | AssetOutcome::Failed => {
                        routed = true;
                        break;
                    }
                }
            }
            if routed {
                continue;
            }

            for node in self.nodes.iter_mut() {
                if node.shape.resolve_asset(ticket, result.clone()) != AssetOutcome::Unknown {
                    routed = true;
                    break;
                }
            }
            if !routed {
                log::debug!("image load {ticket:?} completed for a shape no longer in the scene");
            }
        }
    }

    // ─── The frame loop ──────────────────────────────────────────────────

    /// Redraw the whole scene. Call once per animation frame.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        surface.clear(self.viewport.width, self.viewport.height);

        let Self {
            nodes,
            links,
            selection,
            hover,
            events,
            ..
        } = self;
        hover.refresh(nodes, links, events, surface);
        selection.refresh(nodes, links, events, surface);

        let node_snapshot = nodes.snapshot();
        let link_snapshot = links.snapshot();
        nodes.truncate();
        links.truncate();

        for link in link_snapshot {
            paint::render_link(link, &node_snapshot, surface, links);
        }
        for node in node_snapshot {
            paint::render_node(node, surface, nodes);
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one raw input event through the interaction state machine.
    pub fn handle_event(
        &mut self,
        event: InputEvent,
        surface: &mut dyn Surface,
        binding: &mut dyn DragBinding,
    ) -> Result<(), SceneError> {
        match event {
            InputEvent::PointerDown { pos, kind, time_ms } => {
                self.on_pointer_down(pos, kind, time_ms, surface, binding)
            }
            InputEvent::PointerMove { pos, kind, .. } => {
                self.on_pointer_move(pos, kind, surface);
                Ok(())
            }
            InputEvent::PointerUp { pos, .. } => {
                self.on_pointer_up(pos, surface, binding);
                Ok(())
            }
            InputEvent::Click { pos, kind, time_ms } => {
                self.on_click(pos, kind, time_ms, surface);
                Ok(())
            }
        }
    }

    fn on_pointer_down(
        &mut self,
        pos: Point,
        kind: PointerKind,
        time_ms: f64,
        surface: &mut dyn Surface,
        binding: &mut dyn DragBinding,
    ) -> Result<(), SceneError> {
        if self.drag.is_some() {
            return Err(SceneError::DragInProgress);
        }
        self.pointer_down_at = Some(time_ms);

        let Self {
            nodes,
            links,
            events,
            drag,
            ..
        } = self;
        let link_hit = hit::hit_link(links, &*surface, pos).map(|link| link.id);
        let cp_hit = hit::hit_control_point(links, &*surface, pos)
            .map(|cp| (cp.link, cp.draggable, cp.pos));
        let node_hit = hit::hit_node(nodes, &*surface, pos)
            .map(|node| (node.id, node.draggable, node.shape.geometry.origin()));

        if let Some((id, true, origin)) = node_hit {
            *drag = Some(DragSession {
                handle: DragHandle::Node(id),
                offset: pos - origin,
            });
            binding.bind_drag(kind);
            if let Some(node) = nodes.get(id) {
                events.execute(EventName::DragStart, Target::Node(node), Some(pos), surface);
            }
        } else if let Some((link_id, true, cp_pos)) = cp_hit {
            *drag = Some(DragSession {
                handle: DragHandle::ControlPoint { link: link_id },
                offset: pos - cp_pos,
            });
            binding.bind_drag(kind);
            if let Some(link) = links.get(link_id) {
                events.execute(
                    EventName::DragStart,
                    Target::ControlPoint(&link.control_point),
                    Some(pos),
                    surface,
                );
            }
        } else if link_hit.is_some() {
            // Links carry no draggable flag; a link hit starts no session.
        }
        Ok(())
    }

    fn on_pointer_move(&mut self, pos: Point, kind: PointerKind, surface: &mut dyn Surface) {
        if let Some(session) = self.drag {
            let dest = pos - session.offset;
            match session.handle {
                DragHandle::Node(id) => {
                    let Self { nodes, events, .. } = self;
                    if let Some(node) = nodes.get_mut(id) {
                        node.shape.geometry.set_origin(dest);
                    }
                    if let Some(node) = nodes.get(id) {
                        events.execute(EventName::Dragging, Target::Node(node), Some(pos), surface);
                    }
                }
                DragHandle::ControlPoint { link } => {
                    let Self { links, events, .. } = self;
                    if let Some(owner) = links.get_mut(link) {
                        owner.control_point.pos = dest;
                    }
                    if let Some(owner) = links.get(link) {
                        events.execute(
                            EventName::Dragging,
                            Target::ControlPoint(&owner.control_point),
                            Some(pos),
                            surface,
                        );
                    }
                }
            }
        }

        // Hover runs on every mouse move, drag or not. Precedence: node over
        // link over control point. Stale node and link hover are cleared;
        // a hovered control point keeps its slot until another target takes
        // hover (or the slot is cleared explicitly).
        if kind == PointerKind::Mouse {
            let Self {
                nodes,
                links,
                hover,
                events,
                ..
            } = self;
            let node_hit = hit::hit_node(nodes, &*surface, pos).map(|node| node.id);
            let link_hit = hit::hit_link(links, &*surface, pos).map(|link| link.id);
            let cp_hit = hit::hit_control_point(links, &*surface, pos).map(|cp| cp.link);

            if let Some(id) = node_hit {
                if let Some(node) = nodes.get(id) {
                    hover.hover_node(node, events, surface);
                }
            } else if let Some(id) = link_hit {
                if let Some(link) = links.get(id) {
                    hover.hover_link(link, events, surface);
                }
            } else if let Some(link_id) = cp_hit
                && let Some(link) = links.get(link_id)
            {
                hover.hover_control_point(link, events, surface);
            }

            if node_hit.is_none() {
                hover.unhover_node(nodes, events, surface);
            }
            if link_hit.is_none() {
                hover.unhover_link(links, events, surface);
            }
        }
    }

    fn on_pointer_up(
        &mut self,
        pos: Point,
        surface: &mut dyn Surface,
        binding: &mut dyn DragBinding,
    ) {
        if let Some(session) = self.drag.take() {
            let Self {
                nodes,
                links,
                events,
                ..
            } = self;
            match session.handle {
                DragHandle::Node(id) => {
                    if let Some(node) = nodes.get(id) {
                        events.execute(EventName::DragEnd, Target::Node(node), Some(pos), surface);
                    }
                }
                DragHandle::ControlPoint { link } => {
                    if let Some(owner) = links.get(link) {
                        events.execute(
                            EventName::DragEnd,
                            Target::ControlPoint(&owner.control_point),
                            Some(pos),
                            surface,
                        );
                    }
                }
            }
            binding.unbind_drag();
        }
    }

    fn on_click(&mut self, pos: Point, kind: PointerKind, time_ms: f64, surface: &mut dyn Surface) {
        let Some(down_at) = self.pointer_down_at else {
            return;
        };
        if time_ms - down_at >= click_threshold(kind) {
            // Tail of a drag, not a click.
            return;
        }

        let Self {
            nodes,
            links,
            events,
            ..
        } = self;
        if let Some(node) = hit::hit_node(nodes, &*surface, pos) {
            events.execute(EventName::Click, Target::Node(node), Some(pos), surface);
        } else if let Some(cp) = hit::hit_control_point(links, &*surface, pos) {
            events.execute(EventName::Click, Target::ControlPoint(cp), Some(pos), surface);
        } else if let Some(link) = hit::hit_link(links, &*surface, pos) {
            events.execute(EventName::Click, Target::Link(link), Some(pos), surface);
        } else {
            events.execute(EventName::ClickedEmptyArea, Target::Scene, Some(pos), surface);
        }
    }
}
