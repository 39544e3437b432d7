//! Identifiers and small enums shared by the Anchor layer

use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Generational handle of a window owned by the system
    ///
    /// A stale id (window destroyed) never resolves to a newer window that
    /// reused the slot.
    pub struct WindowId;

    /// Generational handle of a drag session
    pub struct DragId;
}

/// Opaque native window handle reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

/// Window presentation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowState {
    /// Regular decorated window
    #[default]
    Normal,
    /// Iconified
    Minimized,
    /// Maximized on its monitor
    Maximized,
    /// Covers the whole screen
    FullScreen,
}

/// Graphics API a drawing context binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawingContextType {
    /// No context
    #[default]
    None,
    /// OpenGL
    OpenGL,
    /// Vulkan
    Vulkan,
    /// Metal
    Metal,
}

impl DrawingContextType {
    /// Human readable name for reports
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::OpenGL => "OpenGL",
            Self::Vulkan => "Vulkan",
            Self::Metal => "Metal",
        }
    }
}

/// Built-in cursor shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardCursor {
    /// Platform default arrow
    #[default]
    Default,
    /// Text insertion beam
    Text,
    /// Busy indicator
    Wait,
    /// Help arrow
    Help,
    /// Precise crosshair
    Crosshair,
    /// Four-way move
    Move,
    /// Vertical resize
    UpDown,
    /// Horizontal resize
    LeftRight,
    /// Open hand
    HandOpen,
    /// Closed hand, used while dragging
    HandClosed,
    /// Arrow with a plus, used for copy drops
    Copy,
    /// Forbidden drop
    Stop,
    /// Pencil
    Pencil,
    /// Eraser
    Eraser,
    /// Zoom in
    ZoomIn,
    /// Zoom out
    ZoomOut,
}

/// Pointer grab mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GrabMode {
    /// No grab
    #[default]
    Disable,
    /// Capture the pointer without constraining it
    Normal,
    /// Capture and wrap the pointer at the grab bounds
    Wrap,
    /// Capture and hide the pointer
    Hide,
}

impl GrabMode {
    /// Whether the pointer is captured in this mode
    pub fn is_active(self) -> bool {
        self != Self::Disable
    }
}

bitflags::bitflags! {
    /// Axes the wrap grab acts on
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GrabAxis: u8 {
        /// Horizontal wrapping
        const X = 1 << 0;
        /// Vertical wrapping
        const Y = 1 << 1;
    }
}

impl Default for GrabAxis {
    fn default() -> Self {
        Self::all()
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Keys the core cares about; everything else arrives as `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key
    Escape,
    /// Enter key
    Enter,
    /// Space key
    Space,
    /// Tab key
    Tab,
    /// Left or right shift
    Shift,
    /// Left or right control
    Control,
    /// Left or right alt
    Alt,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Any other key, by platform scancode
    Other(i32),
}
