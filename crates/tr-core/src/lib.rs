pub mod config;
pub mod error;
pub mod event;
pub mod geom;
pub mod id;
pub mod model;
pub mod store;
pub mod surface;

pub use config::{EngineConfig, Palette};
pub use error::{ImageError, ShapeError};
pub use event::{EventName, FiringMode};
pub use geom::{Point, Viewport};
pub use id::{EntityId, EntityKind, IdAllocator};
pub use model::*;
pub use store::{Entity, EntityStore};
pub use surface::{
    DragBinding, ImageHandle, ImageLoader, ImageTicket, PatternFill, PointerKind, RenderPath,
    StyleResolver, Surface,
};
