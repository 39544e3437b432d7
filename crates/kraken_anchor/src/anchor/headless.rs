//! Offscreen backend
//!
//! Windows exist only as bookkeeping and drawing contexts bind to nothing.
//! Used for batch runs without a display and as the backend of the test
//! suite: a [`HeadlessProbe`] shares the backend state, injects events and
//! reads back what the core asked the platform to do.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::error::{AnchorError, AnchorResult};
use crate::foundation::time::EventClock;

use super::backend::{DrawingContext, SystemBackend, WindowBackend};
use super::event::{BackendEvent, EventKind};
use super::rect::Rect;
use super::types::{DrawingContextType, GrabMode, NativeHandle, StandardCursor, WindowState};
use super::window::WindowSettings;

/// Counters of backend calls made by the core
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Windows created
    pub windows_created: usize,
    /// Windows disposed through the system backend
    pub windows_disposed: usize,
    /// Handles of disposed windows, in disposal order
    pub disposed: Vec<NativeHandle>,
    /// Drawing contexts created
    pub contexts_created: usize,
    /// Drawing contexts not yet dropped
    pub contexts_live: usize,
    /// Context activations
    pub activations: usize,
    /// Context releases
    pub releases: usize,
    /// Buffer swaps
    pub swaps: usize,
    /// Cursor visibility changes
    pub cursor_visibility_calls: usize,
    /// Cursor shape changes
    pub cursor_shape_calls: usize,
    /// Grab and ungrab requests
    pub grab_calls: usize,
    /// Pointer warps, in order
    pub warps: Vec<(NativeHandle, i32, i32)>,
}

#[derive(Debug)]
struct Shared {
    next_handle: u64,
    next_context: u64,
    pending: VecDeque<BackendEvent>,
    supported: Vec<DrawingContextType>,
    max_windows: Option<usize>,
    live_windows: usize,
    captured: HashSet<NativeHandle>,
    bound: Option<u64>,
    display_size: (u32, u32),
    stats: HeadlessStats,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            next_handle: 1,
            next_context: 1,
            pending: VecDeque::new(),
            supported: vec![DrawingContextType::OpenGL, DrawingContextType::Vulkan],
            max_windows: None,
            live_windows: 0,
            captured: HashSet::new(),
            bound: None,
            display_size: (1920, 1080),
            stats: HeadlessStats::default(),
        }
    }
}

type SharedRef = Rc<RefCell<Shared>>;

/// System backend without a display
pub struct HeadlessSystem {
    shared: SharedRef,
    clock: EventClock,
}

impl HeadlessSystem {
    /// Backend supporting OpenGL and Vulkan contexts
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared::default())),
            clock: EventClock::start(),
        }
    }

    /// Handle for injecting events and inspecting calls
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe { shared: Rc::clone(&self.shared) }
    }
}

impl Default for HeadlessSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBackend for HeadlessSystem {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_window(&mut self, settings: &WindowSettings) -> AnchorResult<Box<dyn WindowBackend>> {
        let mut shared = self.shared.borrow_mut();
        if shared.max_windows.is_some_and(|max| shared.live_windows >= max) {
            return Err(AnchorError::ResourceExhausted(format!(
                "headless backend is limited to {} windows",
                shared.live_windows
            )));
        }
        let handle = NativeHandle(shared.next_handle);
        shared.next_handle += 1;
        shared.live_windows += 1;
        shared.stats.windows_created += 1;
        drop(shared);

        Ok(Box::new(HeadlessWindow {
            shared: Rc::clone(&self.shared),
            handle,
            title: settings.title.clone(),
            size: (settings.width, settings.height),
            state: settings.state,
            modified: false,
            progress: None,
            cursor_visible: true,
            cursor_shape: StandardCursor::Default,
        }))
    }

    fn dispose_window(&mut self, window: Box<dyn WindowBackend>) -> AnchorResult<()> {
        let Some(handle) = window.as_any().downcast_ref::<HeadlessWindow>().map(|w| w.handle) else {
            return Err(AnchorError::InvalidArgument("window was not created by the headless backend".to_string()));
        };
        {
            let mut shared = self.shared.borrow_mut();
            shared.stats.windows_disposed += 1;
            shared.stats.disposed.push(handle);
        }
        drop(window);
        Ok(())
    }

    fn process_events(&mut self, _wait: bool) -> Vec<BackendEvent> {
        self.shared.borrow_mut().pending.drain(..).collect()
    }

    fn time(&self) -> f64 {
        self.clock.seconds()
    }

    fn main_display_size(&self) -> Option<(u32, u32)> {
        Some(self.shared.borrow().display_size)
    }
}

/// Shared view of a [`HeadlessSystem`] for tests and batch drivers
#[derive(Clone)]
pub struct HeadlessProbe {
    shared: SharedRef,
}

impl HeadlessProbe {
    /// Queue an event for a window
    pub fn push_event(&self, time: f64, handle: NativeHandle, kind: EventKind) {
        self.shared.borrow_mut().pending.push_back(BackendEvent::new(time, handle, kind));
    }

    /// Queue an application-level event
    pub fn push_system_event(&self, time: f64, kind: EventKind) {
        self.shared.borrow_mut().pending.push_back(BackendEvent::system(time, kind));
    }

    /// Snapshot of the call counters
    pub fn stats(&self) -> HeadlessStats {
        self.shared.borrow().stats.clone()
    }

    /// Windows created and not yet dropped
    pub fn live_windows(&self) -> usize {
        self.shared.borrow().live_windows
    }

    /// Whether the pointer is captured by this window
    pub fn is_captured(&self, handle: NativeHandle) -> bool {
        self.shared.borrow().captured.contains(&handle)
    }

    /// Whether any headless context is bound
    pub fn has_bound_context(&self) -> bool {
        self.shared.borrow().bound.is_some()
    }

    /// Restrict the context types the backend can create
    pub fn set_supported_contexts(&self, supported: &[DrawingContextType]) {
        self.shared.borrow_mut().supported = supported.to_vec();
    }

    /// Make window creation fail once this many windows are alive
    pub fn set_max_windows(&self, max: Option<usize>) {
        self.shared.borrow_mut().max_windows = max;
    }
}

/// Headless window
pub struct HeadlessWindow {
    shared: SharedRef,
    handle: NativeHandle,
    title: String,
    size: (u32, u32),
    state: WindowState,
    modified: bool,
    progress: Option<f32>,
    cursor_visible: bool,
    cursor_shape: StandardCursor,
}

impl HeadlessWindow {
    /// Presentation state last requested
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Modified flag last requested
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Progress last shown, `None` when hidden
    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    /// Cursor visibility last requested
    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Cursor shape last requested
    pub fn cursor_shape(&self) -> StandardCursor {
        self.cursor_shape
    }
}

impl WindowBackend for HeadlessWindow {
    fn native_handle(&self) -> Option<NativeHandle> {
        Some(self.handle)
    }

    fn new_drawing_context(&mut self, context_type: DrawingContextType) -> AnchorResult<Box<dyn DrawingContext>> {
        let mut shared = self.shared.borrow_mut();
        if !shared.supported.contains(&context_type) {
            return Err(AnchorError::BackendFailure(format!(
                "{} is not available",
                context_type.name()
            )));
        }
        let id = shared.next_context;
        shared.next_context += 1;
        shared.stats.contexts_created += 1;
        shared.stats.contexts_live += 1;
        drop(shared);

        Ok(Box::new(HeadlessContext {
            shared: Rc::clone(&self.shared),
            id,
            context_type,
        }))
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn client_size(&self) -> (u32, u32) {
        self.size
    }

    fn set_client_size(&mut self, width: u32, height: u32) -> AnchorResult<()> {
        self.size = (width, height);
        Ok(())
    }

    fn set_state(&mut self, state: WindowState) -> AnchorResult<()> {
        self.state = state;
        Ok(())
    }

    fn set_cursor_visibility(&mut self, visible: bool) -> AnchorResult<()> {
        self.cursor_visible = visible;
        self.shared.borrow_mut().stats.cursor_visibility_calls += 1;
        Ok(())
    }

    fn set_cursor_shape(&mut self, shape: StandardCursor) -> AnchorResult<()> {
        self.cursor_shape = shape;
        self.shared.borrow_mut().stats.cursor_shape_calls += 1;
        Ok(())
    }

    fn set_cursor_grab(&mut self, mode: GrabMode, _bounds: Option<Rect>) -> AnchorResult<()> {
        let mut shared = self.shared.borrow_mut();
        shared.stats.grab_calls += 1;
        if mode.is_active() {
            shared.captured.insert(self.handle);
        } else {
            shared.captured.remove(&self.handle);
        }
        Ok(())
    }

    fn warp_cursor(&mut self, x: i32, y: i32) -> AnchorResult<()> {
        self.shared.borrow_mut().stats.warps.push((self.handle, x, y));
        Ok(())
    }

    fn set_modified_state(&mut self, modified: bool) -> AnchorResult<()> {
        self.modified = modified;
        Ok(())
    }

    fn set_progress_bar(&mut self, progress: f32) -> AnchorResult<()> {
        self.progress = Some(progress);
        Ok(())
    }

    fn end_progress_bar(&mut self) -> AnchorResult<()> {
        self.progress = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        let mut shared = self.shared.borrow_mut();
        shared.live_windows = shared.live_windows.saturating_sub(1);
        shared.captured.remove(&self.handle);
    }
}

/// Context that binds to nothing
pub struct HeadlessContext {
    shared: SharedRef,
    id: u64,
    context_type: DrawingContextType,
}

impl DrawingContext for HeadlessContext {
    fn context_type(&self) -> DrawingContextType {
        self.context_type
    }

    fn activate(&mut self) -> AnchorResult<()> {
        let mut shared = self.shared.borrow_mut();
        shared.bound = Some(self.id);
        shared.stats.activations += 1;
        Ok(())
    }

    fn release(&mut self) -> AnchorResult<()> {
        let mut shared = self.shared.borrow_mut();
        if shared.bound == Some(self.id) {
            shared.bound = None;
        }
        shared.stats.releases += 1;
        Ok(())
    }

    fn swap_buffers(&mut self) -> AnchorResult<()> {
        let mut shared = self.shared.borrow_mut();
        if shared.bound != Some(self.id) {
            return Err(AnchorError::InvalidState("swapping an unbound headless context".to_string()));
        }
        shared.stats.swaps += 1;
        Ok(())
    }

    fn set_swap_interval(&mut self, _interval: i32) -> AnchorResult<()> {
        Ok(())
    }
}

impl Drop for HeadlessContext {
    fn drop(&mut self) {
        let mut shared = self.shared.borrow_mut();
        if shared.bound == Some(self.id) {
            shared.bound = None;
        }
        shared.stats.contexts_live = shared.stats.contexts_live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_lifecycle_counts() {
        let mut system = HeadlessSystem::new();
        let probe = system.probe();

        let window = system.create_window(&WindowSettings::default()).unwrap();
        assert_eq!(probe.live_windows(), 1);
        assert!(window.native_handle().is_some());

        system.dispose_window(window).unwrap();
        assert_eq!(probe.live_windows(), 0);
        assert_eq!(probe.stats().windows_disposed, 1);
    }

    #[test]
    fn test_window_limit() {
        let mut system = HeadlessSystem::new();
        system.probe().set_max_windows(Some(1));
        let _first = system.create_window(&WindowSettings::default()).unwrap();
        let second = system.create_window(&WindowSettings::default());
        assert!(matches!(second, Err(AnchorError::ResourceExhausted(_))));
    }

    #[test]
    fn test_unsupported_context_type() {
        let mut system = HeadlessSystem::new();
        let mut window = system.create_window(&WindowSettings::default()).unwrap();
        assert!(window.new_drawing_context(DrawingContextType::Metal).is_err());
        assert!(window.new_drawing_context(DrawingContextType::OpenGL).is_ok());
    }

    #[test]
    fn test_context_binding_tracking() {
        let mut system = HeadlessSystem::new();
        let probe = system.probe();
        let mut window = system.create_window(&WindowSettings::default()).unwrap();

        let mut context = window.new_drawing_context(DrawingContextType::OpenGL).unwrap();
        assert!(context.swap_buffers().is_err());
        context.activate().unwrap();
        assert!(probe.has_bound_context());
        context.swap_buffers().unwrap();

        drop(context);
        assert!(!probe.has_bound_context());
        assert_eq!(probe.stats().contexts_live, 0);
    }

    #[test]
    fn test_events_drain_in_push_order() {
        let mut system = HeadlessSystem::new();
        let probe = system.probe();
        probe.push_event(0.2, NativeHandle(1), EventKind::WindowActivate);
        probe.push_system_event(0.1, EventKind::QuitRequest);

        let events = system.process_events(false);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::WindowActivate);
        assert!(system.process_events(false).is_empty());
    }
}
