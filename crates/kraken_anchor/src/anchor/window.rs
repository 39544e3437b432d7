//! A single top-level Anchor window
//!
//! [`AnchorWindow`] keeps the platform-independent state of a window
//! (dimensions, fullscreen cache, modified flag, progress indicator, cursor
//! and grab state, drawing context) and forwards native work to its
//! [`WindowBackend`]. Windows are owned by the
//! [`AnchorSystem`](super::system::AnchorSystem); context binding goes
//! through the system so that only one window is current at a time.

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, AnchorResult};
use crate::wm::{Drag, DropBox};

use super::backend::{DrawingContext, WindowBackend};
use super::cursor::{CursorState, GrabTransition};
use super::rect::Rect;
use super::types::{DrawingContextType, GrabAxis, GrabMode, NativeHandle, StandardCursor, WindowState};

/// Parameters for creating a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSettings {
    /// Title bar text
    pub title: String,
    /// Screen position of the left edge
    pub left: i32,
    /// Screen position of the top edge
    pub top: i32,
    /// Client width in pixels
    pub width: u32,
    /// Client height in pixels
    pub height: u32,
    /// Initial presentation state
    pub state: WindowState,
    /// Request a stereo visual
    pub want_stereo: bool,
    /// Advisory exclusive-fullscreen hint for the backend
    pub exclusive: bool,
    /// Drawing context created right after the window
    pub context_type: DrawingContextType,
}

impl WindowSettings {
    /// Normal window with no drawing context
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            left: 0,
            top: 0,
            width,
            height,
            state: WindowState::Normal,
            want_stereo: false,
            exclusive: false,
            context_type: DrawingContextType::None,
        }
    }

    /// Set the screen position
    pub fn with_position(mut self, left: i32, top: i32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Set the initial state
    pub fn with_state(mut self, state: WindowState) -> Self {
        self.state = state;
        self
    }

    /// Request a stereo visual
    pub fn with_stereo(mut self, want_stereo: bool) -> Self {
        self.want_stereo = want_stereo;
        self
    }

    /// Set the exclusive hint
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Create a drawing context of this type with the window
    pub fn with_context(mut self, context_type: DrawingContextType) -> Self {
        self.context_type = context_type;
        self
    }

    /// Check the settings can produce a window
    pub fn validate(&self) -> AnchorResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AnchorError::InvalidArgument(format!(
                "window size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::new("Kraken", 1280, 720)
    }
}

/// Platform-independent window state plus its backend
pub struct AnchorWindow {
    backend: Box<dyn WindowBackend>,
    context: Option<Box<dyn DrawingContext>>,
    drawing_context_type: DrawingContextType,

    width: u32,
    height: u32,
    state: WindowState,
    want_stereo: bool,
    exclusive: bool,

    cursor: CursorState,
    wrap_margin: i32,

    modified: bool,
    can_accept_drag: bool,
    progress_visible: bool,
    native_pixel_scale: f32,

    full_screen: bool,
    full_screen_width: u32,
    full_screen_height: u32,
    restore_size: (u32, u32),

    drop_boxes: Vec<Box<dyn DropBox>>,
    last_event_time: f64,
}

impl AnchorWindow {
    /// Wrap a backend window
    ///
    /// A window constructed in [`WindowState::FullScreen`] caches the given
    /// size as its fullscreen size.
    pub fn new(
        backend: Box<dyn WindowBackend>,
        width: u32,
        height: u32,
        state: WindowState,
        want_stereo: bool,
        exclusive: bool,
    ) -> Self {
        let full_screen = state == WindowState::FullScreen;
        let native_pixel_scale = backend.native_pixel_size();
        Self {
            backend,
            context: None,
            drawing_context_type: DrawingContextType::None,
            width,
            height,
            state,
            want_stereo,
            exclusive,
            cursor: CursorState::new(),
            wrap_margin: 0,
            modified: false,
            can_accept_drag: false,
            progress_visible: false,
            native_pixel_scale,
            full_screen,
            full_screen_width: if full_screen { width } else { 0 },
            full_screen_height: if full_screen { height } else { 0 },
            restore_size: (width, height),
            drop_boxes: Vec::new(),
            last_event_time: f64::NEG_INFINITY,
        }
    }

    /// Client width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Client height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Client rectangle in window coordinates
    pub fn client_rect(&self) -> Rect {
        Rect::from_size(clamp_to_i32(self.width), clamp_to_i32(self.height))
    }

    /// Presentation state
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Whether a stereo visual was requested
    pub fn want_stereo(&self) -> bool {
        self.want_stereo
    }

    /// Exclusive hint given at construction
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Whether the window is fullscreen
    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Cached fullscreen size, `(0, 0)` if never fullscreen
    pub fn full_screen_size(&self) -> (u32, u32) {
        (self.full_screen_width, self.full_screen_height)
    }

    /// Title bar text
    pub fn title(&self) -> String {
        self.backend.title()
    }

    /// Change the title bar text
    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Resize the client area
    pub fn set_client_size(&mut self, width: u32, height: u32) -> AnchorResult<()> {
        if width == 0 || height == 0 {
            return Err(AnchorError::InvalidArgument(format!("client size {width}x{height}")));
        }
        self.backend.set_client_size(width, height)?;
        self.width = width;
        self.height = height;
        if self.full_screen {
            self.full_screen_width = width;
            self.full_screen_height = height;
        }
        Ok(())
    }

    /// Change the presentation state
    ///
    /// Entering fullscreen remembers the windowed size; leaving fullscreen
    /// restores it.
    pub fn set_state(&mut self, state: WindowState) -> AnchorResult<()> {
        if state == self.state {
            return Ok(());
        }
        self.backend.set_state(state)?;

        let entering = state == WindowState::FullScreen;
        if entering && !self.full_screen {
            self.restore_size = (self.width, self.height);
            if self.full_screen_width == 0 || self.full_screen_height == 0 {
                self.full_screen_width = self.width;
                self.full_screen_height = self.height;
            }
            self.width = self.full_screen_width;
            self.height = self.full_screen_height;
        } else if !entering && self.full_screen {
            (self.width, self.height) = self.restore_size;
        }
        self.full_screen = entering;
        self.state = state;
        Ok(())
    }

    /// Record a resize reported by the platform
    pub(crate) fn note_resized(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        if self.full_screen {
            self.full_screen_width = width;
            self.full_screen_height = height;
        }
    }

    /// Set the unsaved-changes flag
    pub fn set_modified_state(&mut self, modified: bool) -> AnchorResult<()> {
        self.modified = modified;
        self.backend.set_modified_state(modified)
    }

    /// Unsaved-changes flag
    pub fn modified_state(&self) -> bool {
        self.modified
    }

    /// Native handle, `None` if the backend has none
    pub fn os_window(&self) -> Option<NativeHandle> {
        self.backend.native_handle()
    }

    /// Show or update the native progress indicator
    pub fn set_progress_bar(&mut self, progress: f32) -> AnchorResult<()> {
        if progress.is_nan() {
            return Err(AnchorError::InvalidArgument("progress is NaN".to_string()));
        }
        self.backend.set_progress_bar(progress.clamp(0.0, 1.0))?;
        self.progress_visible = true;
        Ok(())
    }

    /// Hide the native progress indicator
    pub fn end_progress_bar(&mut self) -> AnchorResult<()> {
        if !self.progress_visible {
            return Ok(());
        }
        self.progress_visible = false;
        self.backend.end_progress_bar()
    }

    /// Whether the progress indicator is shown
    pub fn is_progress_visible(&self) -> bool {
        self.progress_visible
    }

    /// Allow drag-and-drop sessions to drop onto this window
    pub fn set_accept_drag_operation(&mut self, accept: bool) {
        self.can_accept_drag = accept;
    }

    /// Whether drops are accepted
    pub fn can_accept_drag_operation(&self) -> bool {
        self.can_accept_drag
    }

    /// DPI scale factor
    pub fn native_pixel_size(&self) -> f32 {
        self.native_pixel_scale
    }

    pub(crate) fn set_native_pixel_size(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.native_pixel_scale = scale;
        }
    }

    /// Cursor and grab state
    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    /// Show or hide the cursor; repeated calls with the same value do nothing
    pub fn set_cursor_visibility(&mut self, visible: bool) -> AnchorResult<()> {
        if self.cursor.is_visible() == visible {
            return Ok(());
        }
        self.backend.set_cursor_visibility(visible)?;
        self.cursor.set_visible(visible);
        Ok(())
    }

    /// Change the cursor shape; no-op if unchanged
    pub fn set_cursor_shape(&mut self, shape: StandardCursor) -> AnchorResult<()> {
        if self.cursor.shape() == shape {
            return Ok(());
        }
        self.backend.set_cursor_shape(shape)?;
        self.cursor.set_shape(shape);
        Ok(())
    }

    /// Change the pointer grab, wrapping on both axes
    ///
    /// Returns the accumulated warp offset when a wrap grab is released.
    pub fn set_cursor_grab(&mut self, mode: GrabMode, bounds: Option<Rect>) -> AnchorResult<Option<(i32, i32)>> {
        self.set_cursor_grab_axis(mode, GrabAxis::all(), bounds)
    }

    /// Change the pointer grab with an explicit wrap axis
    pub fn set_cursor_grab_axis(
        &mut self,
        mode: GrabMode,
        axis: GrabAxis,
        bounds: Option<Rect>,
    ) -> AnchorResult<Option<(i32, i32)>> {
        match self.cursor.plan_grab(mode, bounds, self.client_rect())? {
            GrabTransition::Unchanged => Ok(None),
            GrabTransition::Release => Ok(self.release_grab()),
            GrabTransition::Capture(rect) => {
                self.capture(mode, axis, rect)?;
                Ok(None)
            }
            GrabTransition::Regrab(rect) => {
                let accum = self.release_grab();
                self.capture(mode, axis, rect)?;
                Ok(accum)
            }
        }
    }

    /// Current grab bounds; fails while no grab is active
    pub fn cursor_grab_bounds(&self) -> AnchorResult<Rect> {
        self.cursor.grab_bounds()
    }

    /// Margin kept free on each side when wrapping
    pub fn set_wrap_margin(&mut self, margin: i32) {
        self.wrap_margin = margin.max(0);
    }

    fn capture(&mut self, mode: GrabMode, axis: GrabAxis, bounds: Rect) -> AnchorResult<()> {
        self.backend.set_cursor_grab(mode, Some(bounds))?;
        self.cursor.begin_grab(mode, axis, bounds);
        Ok(())
    }

    fn release_grab(&mut self) -> Option<(i32, i32)> {
        let accum = self.cursor.end_grab();
        if let Err(e) = self.backend.set_cursor_grab(GrabMode::Disable, None) {
            log::warn!("Releasing cursor grab failed: {}", e);
        }
        accum
    }

    /// Run wrap-grab handling for a raw pointer position
    ///
    /// Returns the logical position to report to consumers.
    pub(crate) fn handle_cursor_motion(&mut self, x: i32, y: i32) -> (i32, i32) {
        let logical = self.cursor.logical_position(x, y);
        if let Some((wx, wy)) = self.cursor.wrap(x, y, self.wrap_margin) {
            if let Err(e) = self.backend.warp_cursor(wx, wy) {
                log::warn!("Cursor warp to ({}, {}) failed: {}", wx, wy, e);
            }
        }
        logical
    }

    /// API of the attached drawing context, `None` if there is none
    pub fn drawing_context_type(&self) -> DrawingContextType {
        self.drawing_context_type
    }

    /// Whether a backend context is attached
    pub fn has_drawing_context(&self) -> bool {
        self.context.is_some()
    }

    pub(crate) fn new_drawing_context(
        &mut self,
        context_type: DrawingContextType,
    ) -> AnchorResult<Box<dyn DrawingContext>> {
        self.backend.new_drawing_context(context_type)
    }

    pub(crate) fn attach_context(&mut self, context: Box<dyn DrawingContext>) {
        self.drawing_context_type = context.context_type();
        self.context = Some(context);
    }

    pub(crate) fn drop_context(&mut self) {
        self.context = None;
        self.drawing_context_type = DrawingContextType::None;
    }

    pub(crate) fn context_mut(&mut self) -> Option<&mut (dyn DrawingContext + 'static)> {
        self.context.as_deref_mut()
    }

    /// Register a drop handler probed for drags hovering this window
    pub fn add_drop_box(&mut self, drop_box: Box<dyn DropBox>) {
        self.drop_boxes.push(drop_box);
    }

    /// Number of registered drop handlers
    pub fn drop_box_count(&self) -> usize {
        self.drop_boxes.len()
    }

    /// Whether `drag` could be dropped here right now
    pub(crate) fn accepts_drag(&self, drag: &Drag) -> bool {
        self.can_accept_drag
            && (self.drop_boxes.is_empty() || self.drop_boxes.iter().any(|b| b.poll(drag)))
    }

    /// Hand `drag` to the first drop handler that accepts it
    pub(crate) fn deliver_drop(&mut self, drag: &Drag) -> bool {
        match self.drop_boxes.iter_mut().find(|b| b.poll(drag)) {
            Some(drop_box) => {
                log::debug!("Drop delivered to '{}'", drop_box.name());
                drop_box.on_drop(drag);
                true
            }
            None => false,
        }
    }

    /// Clamp an event time so this window sees non-decreasing timestamps
    pub(crate) fn stamp_event(&mut self, time: f64) -> f64 {
        let time = if time.is_nan() { self.last_event_time } else { time.max(self.last_event_time) };
        self.last_event_time = time;
        time
    }

    /// Release the grab and the context ahead of destruction
    ///
    /// Never fails; backend errors are logged.
    pub(crate) fn prepare_for_destruction(&mut self) {
        if self.cursor.grab_mode().is_active() {
            self.release_grab();
        }
        if self.progress_visible {
            self.progress_visible = false;
            if let Err(e) = self.backend.end_progress_bar() {
                log::debug!("Ending progress bar during teardown failed: {}", e);
            }
        }
        self.drop_context();
        self.drop_boxes.clear();
    }

    pub(crate) fn into_backend(self) -> Box<dyn WindowBackend> {
        self.backend
    }

    /// Backend window, for downcasting to the concrete platform type
    pub fn backend(&self) -> &dyn WindowBackend {
        self.backend.as_ref()
    }

    /// Mutable backend window
    pub fn backend_mut(&mut self) -> &mut dyn WindowBackend {
        self.backend.as_mut()
    }
}

impl std::fmt::Debug for AnchorWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorWindow")
            .field("handle", &self.os_window())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("state", &self.state)
            .field("drawing_context_type", &self.drawing_context_type)
            .field("cursor", &self.cursor)
            .field("modified", &self.modified)
            .field("full_screen", &self.full_screen)
            .finish_non_exhaustive()
    }
}

fn clamp_to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::headless::HeadlessSystem;
    use crate::anchor::backend::SystemBackend;

    fn make_window(settings: &WindowSettings) -> (AnchorWindow, crate::anchor::headless::HeadlessProbe) {
        let mut system = HeadlessSystem::new();
        let probe = system.probe();
        let backend = system.create_window(settings).unwrap();
        let window = AnchorWindow::new(
            backend,
            settings.width,
            settings.height,
            settings.state,
            settings.want_stereo,
            settings.exclusive,
        );
        (window, probe)
    }

    #[test]
    fn test_modified_state_round_trip() {
        let (mut window, _probe) = make_window(&WindowSettings::new("doc", 1280, 720));
        assert!(!window.modified_state());
        window.set_modified_state(true).unwrap();
        assert!(window.modified_state());
    }

    #[test]
    fn test_fullscreen_construction_caches_size() {
        let settings = WindowSettings::new("fs", 1920, 1080).with_state(WindowState::FullScreen);
        let (window, _probe) = make_window(&settings);
        assert!(window.is_full_screen());
        assert_eq!(window.full_screen_size(), (1920, 1080));
    }

    #[test]
    fn test_fullscreen_round_trip_restores_size() {
        let (mut window, _probe) = make_window(&WindowSettings::new("doc", 800, 600));
        window.set_state(WindowState::FullScreen).unwrap();
        window.note_resized(1920, 1080);
        assert_eq!(window.full_screen_size(), (1920, 1080));

        window.set_state(WindowState::Normal).unwrap();
        assert!(!window.is_full_screen());
        assert_eq!((window.width(), window.height()), (800, 600));

        window.set_state(WindowState::FullScreen).unwrap();
        assert_eq!((window.width(), window.height()), (1920, 1080));
    }

    #[test]
    fn test_cursor_visibility_is_idempotent() {
        let (mut window, probe) = make_window(&WindowSettings::default());
        window.set_cursor_visibility(false).unwrap();
        window.set_cursor_visibility(false).unwrap();
        assert_eq!(probe.stats().cursor_visibility_calls, 1);
        assert!(!window.cursor().is_visible());
        assert_eq!(window.cursor().shape(), StandardCursor::Default);
    }

    #[test]
    fn test_cursor_shape_noop_when_equal() {
        let (mut window, probe) = make_window(&WindowSettings::default());
        window.set_cursor_shape(StandardCursor::Default).unwrap();
        assert_eq!(probe.stats().cursor_shape_calls, 0);
        window.set_cursor_shape(StandardCursor::Crosshair).unwrap();
        assert_eq!(window.cursor().shape(), StandardCursor::Crosshair);
        assert_eq!(probe.stats().cursor_shape_calls, 1);
    }

    #[test]
    fn test_grab_bounds_fail_on_fresh_window() {
        let (window, _probe) = make_window(&WindowSettings::default());
        assert!(window.cursor_grab_bounds().is_err());
    }

    #[test]
    fn test_grab_defaults_to_client_rect() {
        let (mut window, probe) = make_window(&WindowSettings::new("grab", 320, 200));
        window.set_cursor_grab(GrabMode::Normal, None).unwrap();
        assert_eq!(window.cursor_grab_bounds().unwrap(), Rect::new(0, 0, 320, 200));
        assert!(probe.is_captured(window.os_window().unwrap()));

        window.set_cursor_grab(GrabMode::Disable, None).unwrap();
        assert!(!probe.is_captured(window.os_window().unwrap()));
        assert!(window.cursor().raw_grab_bounds().is_unset());
    }

    #[test]
    fn test_wrap_motion_warps_backend() {
        let (mut window, probe) = make_window(&WindowSettings::default());
        window
            .set_cursor_grab(GrabMode::Wrap, Some(Rect::new(0, 0, 100, 100)))
            .unwrap();

        let logical = window.handle_cursor_motion(105, 50);
        assert_eq!(logical, (105, 50));
        assert_eq!(window.cursor().grab_accum(), (-100, 0));
        assert_eq!(probe.stats().warps, vec![(window.os_window().unwrap(), 5, 50)]);

        let accum = window.set_cursor_grab(GrabMode::Disable, None).unwrap();
        assert_eq!(accum, Some((-100, 0)));
        assert_eq!(window.cursor().grab_accum(), (0, 0));
    }

    #[test]
    fn test_regrab_preserves_bounds() {
        let (mut window, _probe) = make_window(&WindowSettings::default());
        let bounds = Rect::new(10, 10, 50, 50);
        window.set_cursor_grab(GrabMode::Normal, Some(bounds)).unwrap();
        window.set_cursor_grab(GrabMode::Hide, None).unwrap();
        assert_eq!(window.cursor().grab_mode(), GrabMode::Hide);
        assert_eq!(window.cursor_grab_bounds().unwrap(), bounds);
    }

    #[test]
    fn test_progress_bar_lifecycle() {
        let (mut window, _probe) = make_window(&WindowSettings::default());
        window.set_progress_bar(1.5).unwrap();
        assert!(window.is_progress_visible());
        window.end_progress_bar().unwrap();
        assert!(!window.is_progress_visible());
        assert!(window.set_progress_bar(f32::NAN).is_err());
    }

    #[test]
    fn test_event_stamps_never_go_backwards() {
        let (mut window, _probe) = make_window(&WindowSettings::default());
        assert_eq!(window.stamp_event(2.0), 2.0);
        assert_eq!(window.stamp_event(1.0), 2.0);
        assert_eq!(window.stamp_event(3.5), 3.5);
    }

    #[test]
    fn test_default_pixel_size() {
        let (window, _probe) = make_window(&WindowSettings::default());
        approx::assert_relative_eq!(window.native_pixel_size(), 1.0);
    }

    #[test]
    fn test_settings_validation() {
        assert!(WindowSettings::new("bad", 0, 10).validate().is_err());
        assert!(WindowSettings::default().validate().is_ok());
    }
}
