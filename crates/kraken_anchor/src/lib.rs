//! # Kraken Anchor
//!
//! The windowing layer of the Kraken editor: native windows behind a
//! backend interface, a single process-wide drawing-context binding, pointer
//! grabs with edge wrapping, and window-manager drag and drop.
//!
//! ## Features
//!
//! - **Backend interface**: platform layers implement [`anchor::SystemBackend`]
//!   and [`anchor::WindowBackend`]; a headless backend is always available and
//!   a GLFW backend sits behind the `glfw-backend` feature
//! - **Context arbitration**: at most one window's drawing context is current
//! - **Cursor grabs**: normal, hidden and wrapping grabs with continuous
//!   logical motion
//! - **Drag and drop**: drags that outlive their source window and are ticked
//!   to a terminal state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kraken_anchor::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnchorConfig::load_or_default("kraken.toml")?;
//!     kraken_anchor::foundation::logging::init_with_level(&config.log_level);
//!
//!     let mut system = AnchorSystem::from_config(Box::new(HeadlessSystem::new()), &config);
//!     let window = system.create_window(&config.window)?;
//!     system.set_drawing_context_type(window, DrawingContextType::OpenGL)?;
//!     system.swap_buffers(window)?;
//!     system.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod anchor;
pub mod config;
pub mod error;
pub mod foundation;
pub mod kernel;
pub mod wm;

#[cfg(test)]
mod tests;

pub use error::{AnchorError, AnchorResult, Status};

/// Common imports for Anchor users
pub mod prelude {
    pub use crate::{
        anchor::{
            AnchorEvent, AnchorSystem, AnchorWindow, ContextBinding, DrawingContextType, EventConsumer,
            EventKind, GrabAxis, GrabMode, HeadlessSystem, Key, MouseButton, Rect, StandardCursor,
            WindowId, WindowSettings, WindowState,
        },
        config::{AnchorConfig, Config, ConfigError},
        error::{AnchorError, AnchorResult, Status},
        kernel::{ReportList, ReportType},
        wm::{Drag, DragFlags, DragItem, DragKind, DragOutcome, DragState, DropBox},
    };
}
