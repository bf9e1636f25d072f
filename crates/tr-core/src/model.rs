//! Scene entities: nodes with circle/rectangle shapes, links with their
//! control points, and the patch types that update them.
//!
//! Shapes carry everything needed to paint them (fill, stroke, background
//! image, embedded markup) plus the path the renderer last built for them,
//! which is what hit testing runs against. Updates that involve an image or
//! markup defer their visual effect behind asset resolution; a per-slot
//! sequence token makes overlapping updates resolve last-writer-wins.

use crate::config::EngineConfig;
use crate::error::{ImageError, ShapeError};
use crate::event::{self, EventName};
use crate::geom::Point;
use crate::id::EntityId;
use crate::store::Entity;
use crate::surface::{ImageHandle, ImageLoader, ImageTicket, RenderPath, StyleResolver};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`. The leading `#` is
    /// optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let nibble = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v * 17);
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 | 4 => Some(Self {
                r: nibble(&hex[0..1])?,
                g: nibble(&hex[1..2])?,
                b: nibble(&hex[2..3])?,
                a: if hex.len() == 4 { nibble(&hex[3..4])? } else { 255 },
            }),
            6 | 8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: if hex.len() == 8 { byte(&hex[6..8])? } else { 255 },
            }),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

// ─── Shape kinds and geometry ────────────────────────────────────────────

/// The closed set of supported node shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(Self::Circle),
            "rectangle" => Ok(Self::Rectangle),
            other => Err(ShapeError::UnsupportedShape(other.to_string())),
        }
    }
}

/// Shape geometry. A circle's origin is its center; a rectangle's is its
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Circle { x: f64, y: f64, radius: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Rect { .. } => ShapeKind::Rectangle,
        }
    }

    /// The point drag offsets are measured from.
    pub fn origin(&self) -> Point {
        match *self {
            Self::Circle { x, y, .. } | Self::Rect { x, y, .. } => Point::new(x, y),
        }
    }

    pub fn set_origin(&mut self, p: Point) {
        match self {
            Self::Circle { x, y, .. } | Self::Rect { x, y, .. } => {
                *x = p.x;
                *y = p.y;
            }
        }
    }

    /// Link endpoints attach here: a circle's center, a rectangle's middle.
    pub fn center(&self) -> Point {
        match *self {
            Self::Circle { x, y, .. } => Point::new(x, y),
            Self::Rect {
                x,
                y,
                width,
                height,
            } => Point::new(x + width / 2.0, y + height / 2.0),
        }
    }
}

// ─── Background image and embedded markup ────────────────────────────────

/// An image painted as the shape's fill pattern instead of the solid color.
/// `scale` is a percentage of the image's natural size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
    pub scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub center: bool,
    #[serde(skip)]
    pub image: Option<ImageHandle>,
}

/// Partial update for a shape's background image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackgroundPatch {
    pub url: Option<String>,
    pub scale: Option<f64>,
    pub x_offset: Option<f64>,
    pub y_offset: Option<f64>,
    pub center: Option<bool>,
}

impl BackgroundImage {
    fn from_patch(patch: &BackgroundPatch, config: &EngineConfig) -> Self {
        Self {
            url: patch.url.clone().unwrap_or_else(|| config.node_image.clone()),
            scale: patch.scale.unwrap_or(config.node_image_scale),
            x_offset: patch.x_offset.unwrap_or(0.0),
            y_offset: patch.y_offset.unwrap_or(0.0),
            center: patch.center.unwrap_or(false),
            image: None,
        }
    }

    fn merge(&mut self, patch: &BackgroundPatch) {
        if let Some(url) = &patch.url {
            if *url != self.url {
                // Any previously decoded image belongs to the old URL.
                self.image = None;
            }
            self.url = url.clone();
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        if let Some(dx) = patch.x_offset {
            self.x_offset = dx;
        }
        if let Some(dy) = patch.y_offset {
            self.y_offset = dy;
        }
        if let Some(center) = patch.center {
            self.center = center;
        }
    }
}

/// A markup fragment drawn on top of the shape, rasterized offscreen via the
/// style resolver and image loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markup {
    pub source: String,
    #[serde(skip)]
    pub image: Option<ImageHandle>,
}

impl Markup {
    /// Wrap the fragment in a standalone SVG document with the resolved CSS
    /// inlined, sized to the shape's extent. Circles clip to a round mask.
    pub fn svg_document(&self, css: &str, width: f64, height: f64, round: bool) -> String {
        let clip = if round {
            "border-radius:50%;overflow:hidden;"
        } else {
            "overflow:hidden;"
        };
        format!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{width}' height='{height}'>\
             <style>{css}</style>\
             <foreignObject width='100%' height='100%' style=\"{clip}\">\
             <div xmlns='http://www.w3.org/1999/xhtml' style='width:100%;height:100%;'>{}</div>\
             </foreignObject></svg>",
            self.source
        )
    }

    /// The URL handed to the image loader for a composed SVG document.
    pub fn data_url(svg: &str) -> String {
        format!("data:image/svg+xml;utf8,{svg}")
    }
}

// ─── Pending asset loads ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetSlot {
    Background,
    Markup,
}

#[derive(Debug, Clone, Copy)]
struct PendingLoad {
    ticket: ImageTicket,
    seq: u64,
    slot: AssetSlot,
}

/// What became of a load completion routed to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    /// The image was attached; the entity should be re-rendered.
    Applied,
    /// A newer update superseded this load; the result was dropped.
    Stale,
    /// The loader reported failure; the pending slot was dropped.
    Failed,
    /// The ticket does not belong to this shape.
    Unknown,
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// The visual body of a node. Owned exclusively by its node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: Geometry,
    pub fill: Color,
    pub stroke: Option<Color>,
    pub background: Option<BackgroundImage>,
    pub markup: Option<Markup>,
    /// Path the renderer last built for this shape; hit tests run against it.
    #[serde(skip)]
    pub last_path: Option<RenderPath>,
    #[serde(skip)]
    background_seq: u64,
    #[serde(skip)]
    markup_seq: u64,
    #[serde(skip)]
    pending: SmallVec<[PendingLoad; 2]>,
}

impl Shape {
    /// Validate a spec against the required geometry for `kind` and build the
    /// shape. Background image and markup are recorded but not yet loaded;
    /// callers issue the loads via [`Shape::update`] or
    /// [`Shape::request_assets`].
    pub fn from_spec(
        kind: ShapeKind,
        spec: &NodeSpec,
        config: &EngineConfig,
    ) -> Result<Self, ShapeError> {
        let require = |field: Option<f64>, name: &'static str| {
            field.ok_or(ShapeError::MissingGeometry { shape: kind, field: name })
        };
        let geometry = match kind {
            ShapeKind::Circle => Geometry::Circle {
                x: require(spec.x, "x")?,
                y: require(spec.y, "y")?,
                radius: require(spec.radius, "radius")?,
            },
            ShapeKind::Rectangle => Geometry::Rect {
                x: require(spec.x, "x")?,
                y: require(spec.y, "y")?,
                width: require(spec.width, "width")?,
                height: require(spec.height, "height")?,
            },
        };
        let fill = spec.fill.ok_or(ShapeError::MissingGeometry {
            shape: kind,
            field: "fill",
        })?;

        Ok(Self {
            geometry,
            fill,
            stroke: spec.stroke,
            background: spec
                .background
                .as_ref()
                .map(|p| BackgroundImage::from_patch(p, config)),
            markup: spec.markup.as_ref().map(|source| Markup {
                source: source.clone(),
                image: None,
            }),
            last_path: None,
            background_seq: 0,
            markup_seq: 0,
            pending: SmallVec::new(),
        })
    }

    /// Merge a patch and issue any asset loads it calls for. Returns `true`
    /// when the visual effect is deferred behind a load completion; `false`
    /// means the shape can repaint on the next frame as-is.
    pub fn update(
        &mut self,
        patch: &ShapePatch,
        loader: &mut dyn ImageLoader,
        styles: &dyn StyleResolver,
        config: &EngineConfig,
    ) -> bool {
        self.merge(patch, config);

        let mut deferred = false;
        if patch.markup.is_some() {
            deferred |= self.request_markup(loader, styles);
        }
        if patch.background.as_ref().is_some_and(|b| b.url.is_some()) {
            deferred |= self.request_background(loader);
        }
        deferred
    }

    /// Issue loads for whatever background/markup the shape already carries
    /// without a decoded image. Used at construction time.
    pub fn request_assets(
        &mut self,
        loader: &mut dyn ImageLoader,
        styles: &dyn StyleResolver,
    ) -> bool {
        let mut issued = false;
        if self.markup.as_ref().is_some_and(|m| m.image.is_none()) {
            issued |= self.request_markup(loader, styles);
        }
        if self
            .background
            .as_ref()
            .is_some_and(|b| b.image.is_none() && !b.url.is_empty())
        {
            issued |= self.request_background(loader);
        }
        issued
    }

    fn merge(&mut self, patch: &ShapePatch, config: &EngineConfig) {
        match &mut self.geometry {
            Geometry::Circle { x, y, radius } => {
                if let Some(nx) = patch.x {
                    *x = nx;
                }
                if let Some(ny) = patch.y {
                    *y = ny;
                }
                if let Some(r) = patch.radius {
                    *radius = r;
                }
            }
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => {
                if let Some(nx) = patch.x {
                    *x = nx;
                }
                if let Some(ny) = patch.y {
                    *y = ny;
                }
                if let Some(w) = patch.width {
                    *width = w;
                }
                if let Some(h) = patch.height {
                    *height = h;
                }
            }
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = Some(stroke);
        }
        if let Some(bg) = &patch.background {
            match &mut self.background {
                Some(existing) => existing.merge(bg),
                None => self.background = Some(BackgroundImage::from_patch(bg, config)),
            }
        }
        if let Some(source) = &patch.markup {
            match &mut self.markup {
                Some(markup) if markup.source == *source => {}
                _ => {
                    self.markup = Some(Markup {
                        source: source.clone(),
                        image: None,
                    });
                }
            }
        }
    }

    fn request_markup(
        &mut self,
        loader: &mut dyn ImageLoader,
        styles: &dyn StyleResolver,
    ) -> bool {
        let Some(markup) = &self.markup else {
            return false;
        };
        let (width, height, round) = match self.geometry {
            Geometry::Circle { radius, .. } => (radius * 2.0, radius * 2.0, true),
            Geometry::Rect { width, height, .. } => (width, height, false),
        };
        let css = styles.css_for_markup(&markup.source);
        let url = Markup::data_url(&markup.svg_document(&css, width, height, round));
        self.markup_seq += 1;
        let ticket = loader.request(&url);
        self.pending.push(PendingLoad {
            ticket,
            seq: self.markup_seq,
            slot: AssetSlot::Markup,
        });
        true
    }

    fn request_background(&mut self, loader: &mut dyn ImageLoader) -> bool {
        let Some(bg) = &self.background else {
            return false;
        };
        if bg.url.is_empty() {
            return false;
        }
        let url = bg.url.clone();
        self.background_seq += 1;
        let ticket = loader.request(&url);
        self.pending.push(PendingLoad {
            ticket,
            seq: self.background_seq,
            slot: AssetSlot::Background,
        });
        true
    }

    /// Route a load completion to this shape. Only the completion bearing the
    /// latest sequence token for its slot is applied; anything older was
    /// superseded by a later update and is dropped.
    pub fn resolve_asset(
        &mut self,
        ticket: ImageTicket,
        result: Result<ImageHandle, ImageError>,
    ) -> AssetOutcome {
        let Some(pos) = self.pending.iter().position(|p| p.ticket == ticket) else {
            return AssetOutcome::Unknown;
        };
        let pending = self.pending.remove(pos);
        let latest = match pending.slot {
            AssetSlot::Background => self.background_seq,
            AssetSlot::Markup => self.markup_seq,
        };
        if pending.seq != latest {
            log::debug!("dropping superseded asset load (seq {} < {latest})", pending.seq);
            return AssetOutcome::Stale;
        }
        match result {
            Ok(image) => {
                match pending.slot {
                    AssetSlot::Background => {
                        if let Some(bg) = &mut self.background {
                            bg.image = Some(image);
                        }
                    }
                    AssetSlot::Markup => {
                        if let Some(markup) = &mut self.markup {
                            markup.image = Some(image);
                        }
                    }
                }
                AssetOutcome::Applied
            }
            Err(err) => {
                log::warn!("{err}");
                AssetOutcome::Failed
            }
        }
    }

    /// True while at least one asset load is outstanding.
    pub fn has_pending_assets(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Partial update for a shape. Only supplied fields are applied; geometry
/// fields that do not exist on the shape's kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub background: Option<BackgroundPatch>,
    pub markup: Option<String>,
}

// ─── Node ────────────────────────────────────────────────────────────────

/// Construction options for a node. Geometry requirements depend on the
/// shape kind and are validated by [`Shape::from_spec`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub background: Option<BackgroundPatch>,
    pub markup: Option<String>,
    /// Defaults to `true`.
    pub draggable: Option<bool>,
}

/// A draggable shape in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: EntityId,
    pub shape: Shape,
    pub draggable: bool,
}

impl Node {
    pub fn new(id: EntityId, shape: Shape, draggable: bool) -> Self {
        Self {
            id,
            shape,
            draggable,
        }
    }

    pub fn listenable(&self) -> &'static [EventName] {
        event::NODE_EVENTS
    }

    pub fn center(&self) -> Point {
        self.shape.geometry.center()
    }
}

impl Entity for Node {
    fn id(&self) -> EntityId {
        self.id
    }
}

// ─── Link and control point ──────────────────────────────────────────────

/// A curved connector between two nodes. The endpoint pair is unordered and
/// unique: at most one link may join a given pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: EntityId,
    pub node_a: EntityId,
    pub node_b: EntityId,
    pub stroke: Color,
    pub control_point: ControlPoint,
    #[serde(skip)]
    pub last_path: Option<RenderPath>,
}

impl Link {
    pub const STROKE_WIDTH: f64 = 3.0;

    pub fn new(
        id: EntityId,
        node_a: EntityId,
        node_b: EntityId,
        stroke: Color,
        control_point: ControlPoint,
    ) -> Self {
        Self {
            id,
            node_a,
            node_b,
            stroke,
            control_point,
            last_path: None,
        }
    }

    /// True if this link joins `a` and `b` in either orientation.
    pub fn joins(&self, a: EntityId, b: EntityId) -> bool {
        (self.node_a == a && self.node_b == b) || (self.node_a == b && self.node_b == a)
    }

    /// True if either endpoint is `node`.
    pub fn touches(&self, node: EntityId) -> bool {
        self.node_a == node || self.node_b == node
    }

    pub fn listenable(&self) -> &'static [EventName] {
        event::LINK_EVENTS
    }
}

impl Entity for Link {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// The single curve-shaping handle of a link. Always exists once the link
/// does, defaulting to the midpoint of the endpoint centers. Visibility and
/// draggability are independent: an invisible control point can still be
/// dragged if it has a rendered path from an earlier visible frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: EntityId,
    /// The owning link. Listener matching for control points keys on this.
    pub link: EntityId,
    pub pos: Point,
    pub radius: f64,
    pub color: Color,
    pub visible: bool,
    pub draggable: bool,
    #[serde(skip)]
    pub last_path: Option<RenderPath>,
}

impl ControlPoint {
    pub const DEFAULT_RADIUS: f64 = 8.0;

    pub fn new(id: EntityId, link: EntityId, pos: Point, color: Color) -> Self {
        Self {
            id,
            link,
            pos,
            radius: Self::DEFAULT_RADIUS,
            color,
            visible: false,
            draggable: true,
            last_path: None,
        }
    }

    pub fn apply(&mut self, patch: &ControlPointPatch) {
        if let Some(x) = patch.x {
            self.pos.x = x;
        }
        if let Some(y) = patch.y {
            self.pos.y = y;
        }
        if let Some(radius) = patch.radius {
            self.radius = radius;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
    }

    pub fn listenable(&self) -> &'static [EventName] {
        event::CONTROL_POINT_EVENTS
    }
}

/// Partial update for a control point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPointPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius: Option<f64>,
    pub color: Option<Color>,
    pub visible: Option<bool>,
}
