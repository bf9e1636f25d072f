//! Deterministic stand-ins for the engine's collaborators, shared by the
//! test suites of every crate in the workspace.
//!
//! Nothing here is a production implementation: the surface records instead
//! of rasterizing, the loader completes only when a test says so, and the
//! style resolver reads from an in-memory rule table.

pub mod binding;
pub mod loader;
pub mod styles;
pub mod surface;

pub use binding::RecordingBinding;
pub use loader::ManualLoader;
pub use styles::StaticStyles;
pub use surface::{RecordingSurface, SurfaceOp};
