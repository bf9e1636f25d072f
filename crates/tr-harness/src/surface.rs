//! A recording surface with geometric hit tests.
//!
//! Every drawing call is appended to `ops`, so tests can assert on draw
//! order (links under nodes, stroke before fill) as well as content. The
//! point-in-fill/point-in-stroke queries are answered geometrically with
//! kurbo instead of asking a rasterizer.

use kurbo::{BezPath, Circle, ParamCurveNearest, Point as KPoint, QuadBez, Rect, Shape};
use tr_core::geom::Point;
use tr_core::model::Color;
use tr_core::surface::{ImageHandle, PatternFill, RenderPath, Surface};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear {
        width: f64,
        height: f64,
    },
    Save,
    Restore,
    FillPath {
        path: RenderPath,
        color: Color,
    },
    FillPattern {
        path: RenderPath,
        pattern: PatternFill,
    },
    StrokePath {
        path: RenderPath,
        color: Color,
        width: f64,
    },
    DrawImage {
        image: ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
    save_depth: usize,
}

/// Accuracy for the quadratic nearest-point search.
const NEAREST_ACCURACY: f64 = 1e-6;

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the recorded ops (typically between frames under test).
    pub fn reset(&mut self) {
        self.ops.clear();
    }

    /// Current save/restore nesting. Zero when balanced.
    pub fn save_depth(&self) -> usize {
        self.save_depth
    }

    fn to_kurbo(p: Point) -> KPoint {
        KPoint::new(p.x, p.y)
    }

    fn quad(from: Point, ctrl: Point, to: Point) -> QuadBez {
        QuadBez::new(Self::to_kurbo(from), Self::to_kurbo(ctrl), Self::to_kurbo(to))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(SurfaceOp::Clear { width, height });
    }

    fn save(&mut self) {
        self.save_depth += 1;
        self.ops.push(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.save_depth = self.save_depth.saturating_sub(1);
        self.ops.push(SurfaceOp::Restore);
    }

    fn fill_path(&mut self, path: &RenderPath, color: &Color) {
        self.ops.push(SurfaceOp::FillPath {
            path: *path,
            color: *color,
        });
    }

    fn fill_path_pattern(&mut self, path: &RenderPath, pattern: &PatternFill) {
        self.ops.push(SurfaceOp::FillPattern {
            path: *path,
            pattern: *pattern,
        });
    }

    fn stroke_path(&mut self, path: &RenderPath, color: &Color, width: f64) {
        self.ops.push(SurfaceOp::StrokePath {
            path: *path,
            color: *color,
            width,
        });
    }

    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(SurfaceOp::DrawImage {
            image: *image,
            x,
            y,
            width,
            height,
        });
    }

    fn point_in_fill(&self, path: &RenderPath, p: Point) -> bool {
        let p = Self::to_kurbo(p);
        match *path {
            RenderPath::Circle { cx, cy, radius } => {
                Circle::new((cx, cy), radius).contains(p)
            }
            RenderPath::Rect {
                x,
                y,
                width,
                height,
            } => Rect::new(x, y, x + width, y + height).contains(p),
            RenderPath::Quad { from, ctrl, to } => {
                // An open path is closed by the chord, as a rasterizer would.
                let mut bez = BezPath::new();
                bez.move_to(Self::to_kurbo(from));
                bez.quad_to(Self::to_kurbo(ctrl), Self::to_kurbo(to));
                bez.close_path();
                bez.contains(p)
            }
        }
    }

    fn point_in_stroke(&self, path: &RenderPath, p: Point, width: f64) -> bool {
        let half = width / 2.0;
        let kp = Self::to_kurbo(p);
        match *path {
            RenderPath::Circle { cx, cy, radius } => {
                let dist = kp.distance(KPoint::new(cx, cy));
                (dist - radius).abs() <= half
            }
            RenderPath::Rect {
                x,
                y,
                width: w,
                height: h,
            } => {
                let rect = Rect::new(x, y, x + w, y + h);
                rect.inflate(half, half).contains(kp) && !rect.inflate(-half, -half).contains(kp)
            }
            RenderPath::Quad { from, ctrl, to } => {
                let nearest = Self::quad(from, ctrl, to).nearest(kp, NEAREST_ACCURACY);
                nearest.distance_sq <= half * half
            }
        }
    }
}
