//! Capability interfaces the engine consumes from its collaborators.
//!
//! The engine owns none of these: rasterization, image decoding, and
//! stylesheet lookup are provided by the embedder. The traits here are the
//! complete contract; the `tr-harness` crate ships deterministic
//! implementations for tests.

use crate::error::ImageError;
use crate::geom::Point;
use crate::model::Color;
use serde::{Deserialize, Serialize};

/// A path as handed to the rendering backend, kept per entity as its
/// "last rendered path" for hit testing until the next frame rebuilds it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RenderPath {
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Move-to `from`, then a quadratic curve through `ctrl` to `to`.
    Quad {
        from: Point,
        ctrl: Point,
        to: Point,
    },
}

/// A decoded image as reported by the loader. `width`/`height` are the
/// natural dimensions; pattern centering math depends on them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageHandle {
    pub id: u64,
    pub width: f64,
    pub height: f64,
}

/// Identifies one in-flight load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTicket(pub u64);

/// A positioned, scaled image used as a fill source.
///
/// `dx`/`dy` translate the pattern origin in surface coordinates; `scale` is
/// the final multiplier applied to the image's natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternFill {
    pub image: ImageHandle,
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

/// The rasterization backend.
///
/// Paths are described by [`RenderPath`]; hit tests run against whatever the
/// backend last built for that description. `save`/`restore` scope any
/// drawing state a listener callback mutates.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);

    fn save(&mut self);

    fn restore(&mut self);

    fn fill_path(&mut self, path: &RenderPath, color: &Color);

    fn fill_path_pattern(&mut self, path: &RenderPath, pattern: &PatternFill);

    fn stroke_path(&mut self, path: &RenderPath, color: &Color, width: f64);

    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64);

    /// Point containment against the path's fill region.
    fn point_in_fill(&self, path: &RenderPath, p: Point) -> bool;

    /// Point containment against the path's stroke outline at `width`.
    fn point_in_stroke(&self, path: &RenderPath, p: Point, width: f64) -> bool;
}

/// Asynchronous image decoding.
///
/// `request` registers interest and returns a ticket; completions surface
/// through `take_ready`, which the scene drains once per frame. A URL may be
/// anything the embedder can decode, including `data:` URLs synthesized for
/// embedded markup.
pub trait ImageLoader {
    fn request(&mut self, url: &str) -> ImageTicket;

    fn take_ready(&mut self) -> Vec<(ImageTicket, Result<ImageHandle, ImageError>)>;
}

/// Stylesheet lookup for embedded markup.
///
/// Given a markup fragment, returns the concatenated text of every CSS rule
/// in the hosting document whose selector matches a class referenced by the
/// fragment. The result is inlined into the offscreen SVG wrapper before
/// rasterization.
pub trait StyleResolver {
    fn css_for_markup(&self, markup: &str) -> String;
}

/// Whether a pointer event originated from a mouse-class or touch-class
/// device. Click timing thresholds and drag-capture event names differ
/// between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Temporary pointer capture on the input source for the duration of a drag
/// session.
///
/// The bound move/up listeners are process-wide, not scoped to the session;
/// the engine guarantees `unbind_drag` is called on drag end so they never
/// accumulate.
pub trait DragBinding {
    fn bind_drag(&mut self, kind: PointerKind);

    fn unbind_drag(&mut self);
}
