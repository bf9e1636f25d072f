pub mod events;
pub mod hover;
pub mod input;
pub mod scene;
pub mod selection;

pub use events::{Callback, EventDispatcher, ListenerTarget, RegisterError, Target};
pub use hover::HoverState;
pub use input::{InputEvent, click_threshold};
pub use scene::{DragHandle, Scene, SceneError};
pub use selection::SelectionState;
