//! Hit testing: point → entity lookup against last-rendered paths.
//!
//! Each predicate scans its store in order and returns the first hit, so
//! store order (which is render order) decides which of two overlapping
//! entities wins.

use tr_core::geom::Point;
use tr_core::id::EntityId;
use tr_core::model::{ControlPoint, Link, Node};
use tr_core::store::EntityStore;
use tr_core::surface::Surface;

/// First node whose fill region contains `p`.
pub fn hit_node<'a>(
    nodes: &'a EntityStore<Node>,
    surface: &dyn Surface,
    p: Point,
) -> Option<&'a Node> {
    nodes.iter().find(|node| {
        node.shape
            .last_path
            .as_ref()
            .is_some_and(|path| surface.point_in_fill(path, p))
    })
}

/// First control point whose fill region contains `p`. Only control points
/// that have rendered at least once have a path to test.
pub fn hit_control_point<'a>(
    links: &'a EntityStore<Link>,
    surface: &dyn Surface,
    p: Point,
) -> Option<&'a ControlPoint> {
    links
        .iter()
        .map(|link| &link.control_point)
        .find(|cp| {
            cp.last_path
                .as_ref()
                .is_some_and(|path| surface.point_in_fill(path, p))
        })
}

/// First link whose stroked curve contains `p`, tested at the link stroke
/// width.
pub fn hit_link<'a>(
    links: &'a EntityStore<Link>,
    surface: &dyn Surface,
    p: Point,
) -> Option<&'a Link> {
    links.iter().find(|link| {
        link.last_path
            .as_ref()
            .is_some_and(|path| surface.point_in_stroke(path, p, Link::STROKE_WIDTH))
    })
}

/// True iff no existing link joins `a` and `b`, in either orientation.
pub fn no_link_between(links: &EntityStore<Link>, a: EntityId, b: EntityId) -> bool {
    !links.iter().any(|link| link.joins(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::model::{Color, ControlPoint};
    use tr_core::surface::RenderPath;
    use tr_harness::RecordingSurface;

    fn node_with_path(id: u32, path: RenderPath) -> Node {
        use tr_core::config::EngineConfig;
        use tr_core::model::{NodeSpec, Shape, ShapeKind};
        let spec = NodeSpec {
            x: Some(0.0),
            y: Some(0.0),
            radius: Some(1.0),
            fill: Some(Color::rgb(0, 0, 0)),
            ..Default::default()
        };
        let mut shape = Shape::from_spec(ShapeKind::Circle, &spec, &EngineConfig::default()).unwrap();
        shape.last_path = Some(path);
        Node::new(EntityId::new(id), shape, true)
    }

    fn link_between(id: u32, a: u32, b: u32, path: Option<RenderPath>) -> Link {
        let cp = ControlPoint::new(
            EntityId::new(id),
            EntityId::new(id),
            Point::new(0.0, 0.0),
            Color::rgb(0, 0, 0),
        );
        let mut link = Link::new(
            EntityId::new(id),
            EntityId::new(a),
            EntityId::new(b),
            Color::rgb(0, 0, 0),
            cp,
        );
        link.last_path = path;
        link
    }

    #[test]
    fn store_order_decides_overlapping_hits() {
        let surface = RecordingSurface::new();
        let mut nodes = EntityStore::new("node");
        // Two concentric circles; the first added wins.
        nodes.add(node_with_path(
            1,
            RenderPath::Circle {
                cx: 0.0,
                cy: 0.0,
                radius: 10.0,
            },
        ));
        nodes.add(node_with_path(
            2,
            RenderPath::Circle {
                cx: 0.0,
                cy: 0.0,
                radius: 20.0,
            },
        ));
        let hit = hit_node(&nodes, &surface, Point::new(1.0, 1.0)).unwrap();
        assert_eq!(hit.id, EntityId::new(1));
    }

    #[test]
    fn unrendered_entities_are_never_hit() {
        let surface = RecordingSurface::new();
        let mut nodes = EntityStore::new("node");
        let mut node = node_with_path(
            1,
            RenderPath::Circle {
                cx: 0.0,
                cy: 0.0,
                radius: 10.0,
            },
        );
        node.shape.last_path = None;
        nodes.add(node);
        assert!(hit_node(&nodes, &surface, Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn link_stroke_hit_respects_width() {
        let surface = RecordingSurface::new();
        let mut links = EntityStore::new("link");
        // Straight horizontal curve from (0,0) to (100,0).
        links.add(link_between(
            1,
            10,
            11,
            Some(RenderPath::Quad {
                from: Point::new(0.0, 0.0),
                ctrl: Point::new(50.0, 0.0),
                to: Point::new(100.0, 0.0),
            }),
        ));
        assert!(hit_link(&links, &surface, Point::new(50.0, 1.0)).is_some());
        assert!(hit_link(&links, &surface, Point::new(50.0, 9.0)).is_none());
    }

    #[test]
    fn adjacency_predicate_is_undirected() {
        let mut links = EntityStore::new("link");
        let (a, b, c) = (EntityId::new(10), EntityId::new(11), EntityId::new(12));
        assert!(no_link_between(&links, a, b));

        links.add(link_between(1, 10, 11, None));
        assert!(!no_link_between(&links, a, b));
        assert!(!no_link_between(&links, b, a));
        assert!(no_link_between(&links, a, c));
    }
}
