//! Platform backend contract
//!
//! This module defines the traits a platform layer implements to host Anchor
//! windows. The system and window types drive these traits and never touch a
//! native API directly.
//!
//! # Layering
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │  AnchorSystem / AnchorWindow    │ ← state machines (system.rs, window.rs)
//! └─────────────┬───────────────────┘
//!               │ drives
//!   ┌───────────▼───────────┐
//!   │ SystemBackend         │ ← window creation, event pump
//!   │ WindowBackend         │ ← per-window capabilities
//!   │ DrawingContext        │ ← per-window graphics binding
//!   └───────────┬───────────┘
//!               │ implemented by
//!   ┌───────────▼───────────┐
//!   │ headless::*           │ ← offscreen, always available
//!   │ glfw::*               │ ← `glfw-backend` feature
//!   └───────────────────────┘
//! ```
//!
//! # Threading
//! None of these traits require `Send`. Every call happens on the thread
//! that created the [`AnchorSystem`](super::system::AnchorSystem).

use std::any::Any;

use crate::error::{AnchorError, AnchorResult};

use super::event::BackendEvent;
use super::rect::Rect;
use super::types::{DrawingContextType, GrabMode, NativeHandle, StandardCursor, WindowState};
use super::window::WindowSettings;

/// A graphics-API binding owned by one window
pub trait DrawingContext {
    /// API this context binds
    fn context_type(&self) -> DrawingContextType;

    /// Make this context the one draw calls go to
    fn activate(&mut self) -> AnchorResult<()>;

    /// Unbind this context
    fn release(&mut self) -> AnchorResult<()>;

    /// Present the back buffer
    fn swap_buffers(&mut self) -> AnchorResult<()>;

    /// Set the swap interval (vsync); unsupported by default
    fn set_swap_interval(&mut self, _interval: i32) -> AnchorResult<()> {
        Err(AnchorError::BackendFailure(format!(
            "{} context does not support swap intervals",
            self.context_type().name()
        )))
    }
}

/// Capabilities of a single native window
///
/// Optional capabilities have default bodies: a backend without a native
/// progress bar or modified indicator keeps the defaults.
pub trait WindowBackend {
    /// Native handle, `None` for windows without one
    fn native_handle(&self) -> Option<NativeHandle> {
        None
    }

    /// Create a fresh drawing context of the given type for this window
    ///
    /// The returned context is not yet active.
    fn new_drawing_context(&mut self, context_type: DrawingContextType) -> AnchorResult<Box<dyn DrawingContext>>;

    /// Title bar text
    fn title(&self) -> String;

    /// Change the title bar text
    fn set_title(&mut self, title: &str);

    /// Client area size in pixels
    fn client_size(&self) -> (u32, u32);

    /// Resize the client area
    fn set_client_size(&mut self, width: u32, height: u32) -> AnchorResult<()>;

    /// Minimize, maximize, restore or go fullscreen
    fn set_state(&mut self, state: WindowState) -> AnchorResult<()>;

    /// Show or hide the pointer
    fn set_cursor_visibility(&mut self, visible: bool) -> AnchorResult<()>;

    /// Change the pointer shape
    fn set_cursor_shape(&mut self, shape: StandardCursor) -> AnchorResult<()>;

    /// Capture (`mode` active) or release (`GrabMode::Disable`) the pointer
    fn set_cursor_grab(&mut self, mode: GrabMode, bounds: Option<Rect>) -> AnchorResult<()>;

    /// Move the pointer to client coordinates
    fn warp_cursor(&mut self, x: i32, y: i32) -> AnchorResult<()>;

    /// Reflect unsaved changes in the native chrome
    fn set_modified_state(&mut self, _modified: bool) -> AnchorResult<()> {
        Ok(())
    }

    /// Show a native progress indicator at `progress` in `[0, 1]`
    fn set_progress_bar(&mut self, _progress: f32) -> AnchorResult<()> {
        Err(AnchorError::BackendFailure("native progress bar not supported".to_string()))
    }

    /// Hide the native progress indicator
    fn end_progress_bar(&mut self) -> AnchorResult<()> {
        Err(AnchorError::BackendFailure("native progress bar not supported".to_string()))
    }

    /// DPI scale factor
    fn native_pixel_size(&self) -> f32 {
        1.0
    }

    /// Access to the concrete type for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Mutable access to the concrete type for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Process-level platform services
pub trait SystemBackend {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Create a native window
    ///
    /// `settings.exclusive` is advisory; backends may ignore it.
    fn create_window(&mut self, settings: &WindowSettings) -> AnchorResult<Box<dyn WindowBackend>>;

    /// Destroy a native window
    fn dispose_window(&mut self, window: Box<dyn WindowBackend>) -> AnchorResult<()>;

    /// Pump native events
    ///
    /// When `wait` is set the call may block until at least one event
    /// arrives. Events carry their native timestamps; ordering is fixed up
    /// by the system.
    fn process_events(&mut self, wait: bool) -> Vec<BackendEvent>;

    /// Seconds since the backend started, the time base of event stamps
    fn time(&self) -> f64;

    /// Size of the main display, if known
    fn main_display_size(&self) -> Option<(u32, u32)> {
        None
    }
}
