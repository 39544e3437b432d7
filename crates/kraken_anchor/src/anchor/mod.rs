//! Anchor: the windowing abstraction
//!
//! Platform backends implement the traits in [`backend`]; everything above
//! them ([`AnchorWindow`], [`AnchorSystem`], cursor grabs and context
//! arbitration) is platform independent.

pub mod backend;
pub mod context;
pub mod cursor;
pub mod event;
#[cfg(feature = "glfw-backend")]
pub mod glfw;
pub mod headless;
pub mod rect;
pub mod system;
pub mod types;
pub mod window;

pub use backend::{DrawingContext, SystemBackend, WindowBackend};
pub use context::{ContextArbiter, ContextBinding};
pub use cursor::CursorState;
pub use event::{AnchorEvent, BackendEvent, EventConsumer, EventKind};
pub use headless::{HeadlessProbe, HeadlessSystem};
pub use rect::Rect;
pub use system::AnchorSystem;
pub use types::{
    DragId, DrawingContextType, GrabAxis, GrabMode, Key, MouseButton, NativeHandle, StandardCursor,
    WindowId, WindowState,
};
pub use window::{AnchorWindow, WindowSettings};
