//! Entity painting through the [`Surface`] interface.
//!
//! Rendering doubles as the store commit step: the frame loop snapshots the
//! stores, empties them, and each `render_*` call paints its entity, refreshes
//! the entity's cached path, and appends it back. Append order during this
//! frame is draw order, and draw order is hit-test priority next frame.

use tr_core::geom::Point;
use tr_core::model::{BackgroundImage, ControlPoint, Geometry, Link, Node, Shape};
use tr_core::store::EntityStore;
use tr_core::surface::{PatternFill, RenderPath, Surface};

fn shape_path(geometry: &Geometry) -> RenderPath {
    match *geometry {
        Geometry::Circle { x, y, radius } => RenderPath::Circle { cx: x, cy: y, radius },
        Geometry::Rect {
            x,
            y,
            width,
            height,
        } => RenderPath::Rect {
            x,
            y,
            width,
            height,
        },
    }
}

/// Pattern placement for a background image: the image is scaled by
/// `scale`% of its natural size and anchored at the shape's top-left,
/// optionally centered within the shape's extent, then shifted by the
/// configured offsets.
fn pattern_for(shape: &Shape, bg: &BackgroundImage) -> Option<PatternFill> {
    let image = bg.image?;
    let scale = bg.scale / 100.0;
    let (anchor, extent) = match shape.geometry {
        Geometry::Circle { x, y, radius } => (
            Point::new(x - radius, y - radius),
            Point::new(radius * 2.0, radius * 2.0),
        ),
        Geometry::Rect {
            x,
            y,
            width,
            height,
        } => (Point::new(x, y), Point::new(width, height)),
    };
    let centering = if bg.center {
        Point::new(
            extent.x / 2.0 - image.width * scale / 2.0,
            extent.y / 2.0 - image.height * scale / 2.0,
        )
    } else {
        Point::default()
    };
    Some(PatternFill {
        image,
        dx: anchor.x + centering.x + bg.x_offset,
        dy: anchor.y + centering.y + bg.y_offset,
        scale,
    })
}

/// Paint a node and commit it back into the store.
pub fn render_node(mut node: Node, surface: &mut dyn Surface, nodes: &mut EntityStore<Node>) {
    let path = shape_path(&node.shape.geometry);

    if let Some(stroke) = node.shape.stroke {
        surface.stroke_path(&path, &stroke, 1.0);
    }

    match node.shape.background.as_ref().and_then(|bg| pattern_for(&node.shape, bg)) {
        Some(pattern) => surface.fill_path_pattern(&path, &pattern),
        None => surface.fill_path(&path, &node.shape.fill),
    }

    if let Some(markup) = &node.shape.markup
        && let Some(image) = markup.image
    {
        let (x, y, w, h) = match node.shape.geometry {
            Geometry::Circle { x, y, radius } => {
                (x - radius, y - radius, radius * 2.0, radius * 2.0)
            }
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => (x, y, width, height),
        };
        surface.draw_image(&image, x, y, w, h);
    }

    node.shape.last_path = Some(path);
    nodes.add(node);
}

/// Paint a link (curve, then its control point) and commit it back.
///
/// Endpoint centers come from the node snapshot taken at the start of the
/// frame; a link whose endpoint vanished from the snapshot is dropped rather
/// than re-committed.
pub fn render_link(
    mut link: Link,
    node_snapshot: &[Node],
    surface: &mut dyn Surface,
    links: &mut EntityStore<Link>,
) {
    let center_of = |id| node_snapshot.iter().find(|n| n.id == id).map(Node::center);
    let (Some(a), Some(b)) = (center_of(link.node_a), center_of(link.node_b)) else {
        log::warn!("link {} lost an endpoint; dropping it from the scene", link.id);
        return;
    };

    let path = RenderPath::Quad {
        from: a,
        ctrl: link.control_point.pos,
        to: b,
    };
    surface.save();
    surface.stroke_path(&path, &link.stroke, Link::STROKE_WIDTH);
    surface.restore();
    link.last_path = Some(path);

    render_control_point(&mut link.control_point, surface);

    links.add(link);
}

/// A control point only paints (and only refreshes its path) while visible.
/// An invisible one keeps the path from its last visible frame, so it stays
/// hittable for dragging.
fn render_control_point(cp: &mut ControlPoint, surface: &mut dyn Surface) {
    if !cp.visible {
        return;
    }
    let path = RenderPath::Circle {
        cx: cp.pos.x,
        cy: cp.pos.y,
        radius: cp.radius,
    };
    surface.fill_path(&path, &cp.color);
    cp.last_path = Some(path);
}
