//! Events flowing from backends through the system to consumers
//!
//! Backends produce [`BackendEvent`]s addressed by native handle. The system
//! resolves them to [`WindowId`]s, orders them per window by timestamp and
//! hands [`AnchorEvent`]s to registered [`EventConsumer`]s.

use super::types::{Key, MouseButton, NativeHandle, WindowId};

/// Event payload shared by backend and dispatched events
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Pointer moved, client coordinates
    CursorMove {
        /// Horizontal position
        x: i32,
        /// Vertical position
        y: i32,
    },
    /// Mouse button pressed
    ButtonDown(MouseButton),
    /// Mouse button released
    ButtonUp(MouseButton),
    /// Scroll wheel or trackpad
    Wheel {
        /// Horizontal scroll delta
        delta_x: f32,
        /// Vertical scroll delta
        delta_y: f32,
    },
    /// Key pressed
    KeyDown(Key),
    /// Key released
    KeyUp(Key),
    /// The user asked to close the window
    WindowClose,
    /// The window gained focus
    WindowActivate,
    /// The window lost focus
    WindowDeactivate,
    /// Client area resized
    WindowSize {
        /// New client width
        width: u32,
        /// New client height
        height: u32,
    },
    /// DPI scale factor changed
    DpiChanged(f32),
    /// Files dropped onto the window from outside the application
    DropFiles(Vec<String>),
    /// The platform asked the application to quit
    QuitRequest,
}

impl EventKind {
    /// Whether the event belongs to the application rather than a window
    pub fn is_system_level(&self) -> bool {
        matches!(self, Self::QuitRequest)
    }

    /// Whether the event comes from an input device
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::CursorMove { .. }
                | Self::ButtonDown(_)
                | Self::ButtonUp(_)
                | Self::Wheel { .. }
                | Self::KeyDown(_)
                | Self::KeyUp(_)
        )
    }
}

/// Event as reported by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendEvent {
    /// Backend timestamp in seconds
    pub time: f64,
    /// Native window the event targets, `None` for application events
    pub handle: Option<NativeHandle>,
    /// Payload
    pub kind: EventKind,
}

impl BackendEvent {
    /// Create an event for a native window
    pub fn new(time: f64, handle: NativeHandle, kind: EventKind) -> Self {
        Self { time, handle: Some(handle), kind }
    }

    /// Create an application-level event
    pub fn system(time: f64, kind: EventKind) -> Self {
        Self { time, handle: None, kind }
    }
}

/// Event after resolution to a window
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorEvent {
    /// Timestamp in seconds, non-decreasing per window
    pub time: f64,
    /// Target window, `None` for application events
    pub window: Option<WindowId>,
    /// Payload
    pub kind: EventKind,
}

/// Receiver of dispatched events
///
/// Consumers are called in registration order. Returning `true` marks the
/// event consumed and stops forwarding.
pub trait EventConsumer {
    /// Handle an event, return true if consumed
    fn process_event(&mut self, event: &AnchorEvent) -> bool;
}
