//! The frame commit loop: snapshot, truncate, render links under nodes,
//! re-append. Draw order during one frame is hit priority for the next.

use tr_core::config::EngineConfig;
use tr_core::geom::{Point, Viewport};
use tr_core::id::EntityId;
use tr_core::model::{Color, NodeSpec, ShapeKind};
use tr_core::surface::{PointerKind, RenderPath};
use tr_engine::input::InputEvent;
use tr_engine::scene::Scene;
use tr_harness::{ManualLoader, RecordingBinding, RecordingSurface, StaticStyles, SurfaceOp};

fn scene() -> Scene {
    Scene::new(
        EngineConfig::default(),
        Viewport {
            width: 800.0,
            height: 600.0,
        },
    )
}

fn circle(scene: &mut Scene, x: f64, y: f64, radius: f64) -> EntityId {
    let mut loader = ManualLoader::new();
    let styles = StaticStyles::new();
    scene
        .create_node(
            ShapeKind::Circle,
            &NodeSpec {
                x: Some(x),
                y: Some(y),
                radius: Some(radius),
                fill: Some(Color::rgb(0xCF, 0x33, 0x33)),
                ..Default::default()
            },
            &mut loader,
            &styles,
        )
        .unwrap()
}

#[test]
fn links_paint_under_nodes_every_frame() {
    let mut scene = scene();
    let mut surface = RecordingSurface::new();
    let a = circle(&mut scene, 0.0, 0.0, 10.0);
    let b = circle(&mut scene, 100.0, 0.0, 10.0);
    scene.create_link(a, b).unwrap();

    scene.draw(&mut surface);

    assert!(matches!(surface.ops[0], SurfaceOp::Clear { .. }));
    let first_link_stroke = surface
        .ops
        .iter()
        .position(|op| matches!(op, SurfaceOp::StrokePath { path: RenderPath::Quad { .. }, .. }))
        .expect("link stroked");
    let first_node_fill = surface
        .ops
        .iter()
        .position(|op| matches!(op, SurfaceOp::FillPath { path: RenderPath::Circle { .. }, .. }))
        .expect("node filled");
    assert!(first_link_stroke < first_node_fill);
}

#[test]
fn stores_are_rebuilt_in_render_order() {
    let mut scene = scene();
    let mut surface = RecordingSurface::new();
    let a = circle(&mut scene, 0.0, 0.0, 10.0);
    let b = circle(&mut scene, 100.0, 0.0, 10.0);
    let link = scene.create_link(a, b).unwrap();

    for _ in 0..3 {
        scene.draw(&mut surface);
    }

    // Same membership, same order, frame after frame.
    assert_eq!(scene.nodes.len(), 2);
    assert_eq!(scene.links.len(), 1);
    let order: Vec<EntityId> = scene.nodes.iter().map(|node| node.id).collect();
    assert_eq!(order, vec![a, b]);
    assert!(scene.links.get(link).unwrap().last_path.is_some());
}

#[test]
fn rendered_paths_track_entity_movement() {
    let mut scene = scene();
    let mut surface = RecordingSurface::new();
    let mut binding = RecordingBinding::new();
    let id = circle(&mut scene, 10.0, 10.0, 10.0);

    scene.draw(&mut surface);
    assert_eq!(
        scene.nodes.get(id).unwrap().shape.last_path,
        Some(RenderPath::Circle {
            cx: 10.0,
            cy: 10.0,
            radius: 10.0
        })
    );

    // Drag the node; the cached path only moves on the next frame's render.
    scene
        .handle_event(
            InputEvent::PointerDown {
                pos: Point::new(10.0, 10.0),
                kind: PointerKind::Mouse,
                time_ms: 0.0,
            },
            &mut surface,
            &mut binding,
        )
        .unwrap();
    scene
        .handle_event(
            InputEvent::PointerMove {
                pos: Point::new(60.0, 30.0),
                kind: PointerKind::Mouse,
                time_ms: 16.0,
            },
            &mut surface,
            &mut binding,
        )
        .unwrap();
    assert_eq!(
        scene.nodes.get(id).unwrap().shape.last_path,
        Some(RenderPath::Circle {
            cx: 10.0,
            cy: 10.0,
            radius: 10.0
        })
    );

    scene.draw(&mut surface);
    assert_eq!(
        scene.nodes.get(id).unwrap().shape.last_path,
        Some(RenderPath::Circle {
            cx: 60.0,
            cy: 30.0,
            radius: 10.0
        })
    );
}

#[test]
fn curve_follows_its_endpoints_frame_by_frame() {
    let mut scene = scene();
    let mut surface = RecordingSurface::new();
    let mut binding = RecordingBinding::new();
    let a = circle(&mut scene, 0.0, 0.0, 10.0);
    let b = circle(&mut scene, 100.0, 0.0, 10.0);
    let link = scene.create_link(a, b).unwrap();
    scene.draw(&mut surface);

    // Drag node a; the curve endpoint follows on the next frame, while the
    // control point stays where it was synthesized.
    scene
        .handle_event(
            InputEvent::PointerDown {
                pos: Point::new(0.0, 0.0),
                kind: PointerKind::Mouse,
                time_ms: 0.0,
            },
            &mut surface,
            &mut binding,
        )
        .unwrap();
    scene
        .handle_event(
            InputEvent::PointerMove {
                pos: Point::new(0.0, 60.0),
                kind: PointerKind::Mouse,
                time_ms: 16.0,
            },
            &mut surface,
            &mut binding,
        )
        .unwrap();
    scene.draw(&mut surface);

    let refreshed = scene.links.get(link).unwrap();
    assert_eq!(
        refreshed.last_path,
        Some(RenderPath::Quad {
            from: Point::new(0.0, 60.0),
            ctrl: Point::new(50.0, 0.0),
            to: Point::new(100.0, 0.0),
        })
    );
}
