//! The Anchor system: window registry, event pump and context arbiter
//!
//! [`AnchorSystem`] exclusively owns every window, the process-wide
//! drawing-context binding and the running drags. Every call is expected on
//! the thread that created the system; debug builds assert it.
//!
//! A typical event loop:
//!
//! ```no_run
//! use kraken_anchor::prelude::*;
//!
//! # fn main() -> AnchorResult<()> {
//! let mut system = AnchorSystem::new(Box::new(HeadlessSystem::new()));
//! let window = system.create_window(&WindowSettings::default().with_context(DrawingContextType::OpenGL))?;
//! while !system.quit_requested() {
//!     system.process_events(true);
//!     system.dispatch_events();
//!     system.tick();
//!     system.activate_drawing_context(window)?;
//!     system.swap_buffers(window)?;
//! #   break;
//! }
//! system.shutdown();
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use slotmap::SlotMap;

use crate::config::AnchorConfig;
use crate::error::{AnchorError, AnchorResult};
use crate::kernel::report::{ReportList, ReportType};
use crate::wm::{Drag, DragFlags, DragItem, DragKind, DragManager, DragOutcome};

use super::backend::SystemBackend;
use super::context::{ContextArbiter, ContextBinding};
use super::event::{AnchorEvent, EventConsumer, EventKind};
use super::types::{DragId, DrawingContextType, Key, MouseButton, NativeHandle, WindowId};
use super::window::{AnchorWindow, WindowSettings};

/// Process-wide window system
pub struct AnchorSystem {
    backend: Box<dyn SystemBackend>,
    windows: SlotMap<WindowId, AnchorWindow>,
    creation_order: Vec<WindowId>,
    contexts: ContextArbiter,
    drags: DragManager,
    consumers: Vec<Box<dyn EventConsumer>>,
    queue: VecDeque<AnchorEvent>,
    active_window: Option<WindowId>,
    cursor_position: (i32, i32),
    reports: Arc<ReportList>,
    main_thread: ThreadId,
    wrap_margin: i32,
    quit_requested: bool,
}

impl AnchorSystem {
    /// System on top of a platform backend, with its own report list
    pub fn new(backend: Box<dyn SystemBackend>) -> Self {
        Self::with_reports(backend, Arc::new(ReportList::default()))
    }

    /// System reporting failures into a shared report list
    pub fn with_reports(backend: Box<dyn SystemBackend>, reports: Arc<ReportList>) -> Self {
        log::info!("Anchor system starting on the {} backend", backend.name());
        Self {
            backend,
            windows: SlotMap::with_key(),
            creation_order: Vec::new(),
            contexts: ContextArbiter::new(),
            drags: DragManager::new(),
            consumers: Vec::new(),
            queue: VecDeque::new(),
            active_window: None,
            cursor_position: (0, 0),
            reports,
            main_thread: thread::current().id(),
            wrap_margin: 0,
            quit_requested: false,
        }
    }

    /// System configured from an [`AnchorConfig`]
    pub fn from_config(backend: Box<dyn SystemBackend>, config: &AnchorConfig) -> Self {
        let reports = Arc::new(ReportList::default());
        reports.set_print_level(config.report_print_level);
        reports.set_store_level(config.report_store_level);
        let mut system = Self::with_reports(backend, reports);
        system.wrap_margin = config.wrap_margin;
        system
    }

    fn assert_main_thread(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.main_thread,
            "Anchor system used off the thread that created it"
        );
    }

    fn report(&self, level: ReportType, what: &str, error: &AnchorError) {
        self.reports.format(level, format_args!("{what}: {error}"));
    }

    /// Report list receiving failure details
    pub fn reports(&self) -> &Arc<ReportList> {
        &self.reports
    }

    /// Name of the platform backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Backend clock in seconds
    pub fn time(&self) -> f64 {
        self.backend.time()
    }

    /// Size of the main display, if the backend knows it
    pub fn main_display_size(&self) -> Option<(u32, u32)> {
        self.backend.main_display_size()
    }

    /// Open a window
    ///
    /// The drawing context requested in `settings` is created and bound
    /// right away. Failing to create it leaves the window without a context
    /// and reports a warning; the window itself is still returned.
    pub fn create_window(&mut self, settings: &WindowSettings) -> AnchorResult<WindowId> {
        self.assert_main_thread();
        let backend = settings
            .validate()
            .and_then(|()| self.backend.create_window(settings))
            .map_err(|e| {
                self.report(ReportType::Error, "Creating window failed", &e);
                e
            })?;

        let mut window = AnchorWindow::new(
            backend,
            settings.width,
            settings.height,
            settings.state,
            settings.want_stereo,
            settings.exclusive,
        );
        window.set_wrap_margin(self.wrap_margin);
        let id = self.windows.insert(window);
        self.creation_order.push(id);
        if self.active_window.is_none() {
            self.active_window = Some(id);
        }

        if settings.context_type != DrawingContextType::None {
            if let Err(e) = self.contexts.set_context_type(&mut self.windows, id, settings.context_type) {
                self.report(ReportType::Warning, "Window opened without a drawing context", &e);
            }
        }

        log::info!(
            "Created window {:?} '{}' {}x{}",
            id,
            settings.title,
            settings.width,
            settings.height
        );
        Ok(id)
    }

    /// Close a window
    ///
    /// Releases the current binding if the window owns it, releases its
    /// pointer grab and cancels the drags it started. Backend errors during
    /// teardown are reported, never returned; only an unknown id fails.
    pub fn dispose_window(&mut self, id: WindowId) -> AnchorResult<()> {
        self.assert_main_thread();
        if !self.windows.contains_key(id) {
            return Err(AnchorError::NotFound(format!("window {id:?}")));
        }

        self.contexts.forget(&mut self.windows, id);
        self.drags.cancel_from_source(id);
        let Some(mut window) = self.windows.remove(id) else {
            return Err(AnchorError::NotFound(format!("window {id:?}")));
        };
        window.prepare_for_destruction();

        self.creation_order.retain(|&other| other != id);
        if self.active_window == Some(id) {
            self.active_window = self.creation_order.last().copied();
        }
        self.queue.retain(|event| event.window != Some(id));

        if let Err(e) = self.backend.dispose_window(window.into_backend()) {
            log::warn!("Backend failed to dispose window {:?}: {}", id, e);
            self.report(ReportType::Warning, "Disposing window failed", &e);
        }
        if self.windows.is_empty() {
            self.contexts.reset();
        }
        log::debug!("Disposed window {:?}", id);
        Ok(())
    }

    /// Look up a window
    pub fn window(&self, id: WindowId) -> Option<&AnchorWindow> {
        self.windows.get(id)
    }

    /// Look up a window for modification
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut AnchorWindow> {
        self.assert_main_thread();
        self.windows.get_mut(id)
    }

    /// Windows in creation order
    pub fn windows(&self) -> impl Iterator<Item = (WindowId, &AnchorWindow)> + '_ {
        self.creation_order
            .iter()
            .filter_map(|&id| self.windows.get(id).map(|window| (id, window)))
    }

    /// Number of open windows
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Whether `id` names an open window
    pub fn valid_window(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    /// Window wrapping the given native handle
    pub fn find_window_by_native(&self, handle: NativeHandle) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, window)| window.os_window() == Some(handle))
            .map(|(id, _)| id)
    }

    /// Window with keyboard focus
    pub fn active_window(&self) -> Option<WindowId> {
        self.active_window
    }

    /// Mark a window as focused
    pub fn set_active_window(&mut self, id: WindowId) -> AnchorResult<()> {
        if !self.valid_window(id) {
            return Err(AnchorError::NotFound(format!("window {id:?}")));
        }
        self.active_window = Some(id);
        Ok(())
    }

    /// Give a window a fresh drawing context of `context_type`
    ///
    /// See [`ContextArbiter`] for the exact semantics. On failure the window
    /// is left with [`DrawingContextType::None`] and the binding is neutral.
    pub fn set_drawing_context_type(
        &mut self,
        id: WindowId,
        context_type: DrawingContextType,
    ) -> AnchorResult<()> {
        self.assert_main_thread();
        self.contexts
            .set_context_type(&mut self.windows, id, context_type)
            .map_err(|e| {
                self.report(ReportType::Error, "Setting drawing context failed", &e);
                e
            })
    }

    /// Make a window's context current
    pub fn activate_drawing_context(&mut self, id: WindowId) -> AnchorResult<()> {
        self.assert_main_thread();
        self.contexts.activate(&mut self.windows, id).map_err(|e| {
            self.report(ReportType::Error, "Activating drawing context failed", &e);
            e
        })
    }

    /// Unbind whatever context is current
    pub fn release_drawing_context(&mut self) {
        self.assert_main_thread();
        self.contexts.release(&mut self.windows);
    }

    /// Present a window whose context is current
    pub fn swap_buffers(&mut self, id: WindowId) -> AnchorResult<()> {
        self.assert_main_thread();
        self.contexts.swap_buffers(&mut self.windows, id).map_err(|e| {
            self.report(ReportType::Error, "Swapping buffers failed", &e);
            e
        })
    }

    /// The process-wide binding
    pub fn current_context(&self) -> ContextBinding {
        self.contexts.current()
    }

    /// Window whose context is current
    pub fn context_owner(&self) -> Option<WindowId> {
        self.contexts.owner()
    }

    /// Register a consumer; consumers see events in registration order
    pub fn add_event_consumer(&mut self, consumer: Box<dyn EventConsumer>) {
        self.consumers.push(consumer);
    }

    /// Pull events from the backend into the dispatch queue
    ///
    /// Events are ordered by timestamp, events for unknown native handles
    /// are dropped and wrap-grab motion is translated to logical positions.
    /// Returns whether any event is waiting to be dispatched.
    pub fn process_events(&mut self, wait: bool) -> bool {
        self.assert_main_thread();
        let mut events = self.backend.process_events(wait);
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        for event in events {
            let window = match event.handle {
                Some(handle) => match self.find_window_by_native(handle) {
                    Some(id) => Some(id),
                    None => {
                        log::trace!("Dropping {:?} for unknown window {:?}", event.kind, handle);
                        continue;
                    }
                },
                None => None,
            };

            let mut time = event.time;
            let mut kind = event.kind;
            if let Some(window) = window.and_then(|id| self.windows.get_mut(id)) {
                time = window.stamp_event(time);
                if let EventKind::CursorMove { x, y } = kind {
                    let (x, y) = window.handle_cursor_motion(x, y);
                    kind = EventKind::CursorMove { x, y };
                }
            }
            self.queue.push_back(AnchorEvent { time, window, kind });
        }
        !self.queue.is_empty()
    }

    /// Number of events waiting for dispatch
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Deliver queued events to the window layer, drags and consumers
    pub fn dispatch_events(&mut self) {
        self.assert_main_thread();
        while let Some(event) = self.queue.pop_front() {
            self.dispatch_event(&event);
        }
    }

    fn dispatch_event(&mut self, event: &AnchorEvent) {
        match (&event.kind, event.window) {
            (EventKind::CursorMove { x, y }, Some(id)) => {
                self.cursor_position = (*x, *y);
                self.drags.motion(id, *x, *y);
            }
            (EventKind::ButtonUp(MouseButton::Left), Some(id)) => {
                self.drags.release(id, &mut self.windows);
            }
            (EventKind::KeyDown(Key::Escape), _) => self.drags.escape(),
            (EventKind::WindowActivate, Some(id)) => self.active_window = Some(id),
            (EventKind::WindowDeactivate, Some(id)) => {
                if self.active_window == Some(id) {
                    self.active_window = None;
                }
            }
            (EventKind::WindowSize { width, height }, Some(id)) => {
                if let Some(window) = self.windows.get_mut(id) {
                    window.note_resized(*width, *height);
                }
            }
            (EventKind::DpiChanged(scale), Some(id)) => {
                if let Some(window) = self.windows.get_mut(id) {
                    window.set_native_pixel_size(*scale);
                }
            }
            (EventKind::DropFiles(paths), Some(id)) => {
                if let Err(e) = self.drags.external_drop(id, paths, &mut self.windows) {
                    self.report(ReportType::Warning, "Dropping files failed", &e);
                }
            }
            (EventKind::QuitRequest, _) => self.quit_requested = true,
            _ => {}
        }

        for consumer in &mut self.consumers {
            if consumer.process_event(event) {
                break;
            }
        }
    }

    /// Advance drags by one event loop iteration
    ///
    /// Drags whose source window is gone are cancelled and hovered windows
    /// are probed for acceptance. Returns every drag that reached a terminal
    /// state since the previous tick; those drags stay queryable until the
    /// next tick.
    pub fn tick(&mut self) -> Vec<DragOutcome> {
        self.assert_main_thread();
        self.drags.begin_tick();
        self.drags.update(&self.windows);
        self.drags.take_outcomes()
    }

    /// Start a drag from the active window
    pub fn start_drag(
        &mut self,
        icon: i32,
        kind: DragKind,
        payload: Option<DragItem>,
        value: f64,
        flags: DragFlags,
    ) -> AnchorResult<DragId> {
        let source = self
            .active_window
            .ok_or_else(|| AnchorError::InvalidState("no active window to drag from".to_string()))?;
        self.start_drag_from(source, icon, kind, payload, value, flags)
    }

    /// Start a drag from a given window
    pub fn start_drag_from(
        &mut self,
        source: WindowId,
        icon: i32,
        kind: DragKind,
        payload: Option<DragItem>,
        value: f64,
        flags: DragFlags,
    ) -> AnchorResult<DragId> {
        self.assert_main_thread();
        if !self.valid_window(source) {
            return Err(AnchorError::NotFound(format!("window {source:?}")));
        }
        self.drags
            .start(source, icon, kind, payload, value, flags, self.cursor_position)
            .map_err(|e| {
                self.report(ReportType::Warning, "Starting drag failed", &e);
                e
            })
    }

    /// Look up a drag
    pub fn drag(&self, id: DragId) -> Option<&Drag> {
        self.drags.get(id)
    }

    /// Look up a drag to add payload items
    pub fn drag_mut(&mut self, id: DragId) -> Option<&mut Drag> {
        self.drags.get_mut(id)
    }

    /// Cancel a drag
    pub fn cancel_drag(&mut self, id: DragId) -> AnchorResult<()> {
        self.drags.cancel(id)
    }

    /// All drags, including ones that finished since the last tick
    pub fn drags(&self) -> &DragManager {
        &self.drags
    }

    /// Ask the event loop to stop
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Whether a quit was requested by the platform or the application
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Close every window, newest first, and leave nothing bound
    pub fn shutdown(&mut self) {
        self.assert_main_thread();
        self.drags.cancel_all();
        let order: Vec<WindowId> = self.creation_order.iter().rev().copied().collect();
        for id in order {
            if let Err(e) = self.dispose_window(id) {
                log::warn!("Shutdown skipped window {:?}: {}", id, e);
            }
        }
        self.contexts.reset();
        self.queue.clear();
        log::info!("Anchor system shut down");
    }
}

impl Drop for AnchorSystem {
    fn drop(&mut self) {
        if !self.windows.is_empty() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for AnchorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorSystem")
            .field("backend", &self.backend.name())
            .field("windows", &self.windows.len())
            .field("current_context", &self.contexts.current())
            .field("active_window", &self.active_window)
            .field("drags", &self.drags.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::headless::{HeadlessProbe, HeadlessSystem};
    use crate::wm::{accept_kind, DragState};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn system() -> (AnchorSystem, HeadlessProbe) {
        let backend = HeadlessSystem::new();
        let probe = backend.probe();
        (AnchorSystem::new(Box::new(backend)), probe)
    }

    fn handle(system: &AnchorSystem, id: WindowId) -> NativeHandle {
        system.window(id).and_then(AnchorWindow::os_window).unwrap()
    }

    struct Recorder {
        seen: Rc<RefCell<Vec<AnchorEvent>>>,
        consume: bool,
    }

    impl EventConsumer for Recorder {
        fn process_event(&mut self, event: &AnchorEvent) -> bool {
            self.seen.borrow_mut().push(event.clone());
            self.consume
        }
    }

    fn recorder(system: &mut AnchorSystem, consume: bool) -> Rc<RefCell<Vec<AnchorEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        system.add_event_consumer(Box::new(Recorder { seen: Rc::clone(&seen), consume }));
        seen
    }

    #[test]
    fn test_first_window_becomes_active() {
        let (mut system, _probe) = system();
        let first = system.create_window(&WindowSettings::default()).unwrap();
        let second = system.create_window(&WindowSettings::default()).unwrap();
        assert_eq!(system.active_window(), Some(first));
        system.set_active_window(second).unwrap();
        assert_eq!(system.active_window(), Some(second));
        assert_eq!(system.windows().map(|(id, _)| id).collect::<Vec<_>>(), vec![first, second]);
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let (mut system, probe) = system();
        let result = system.create_window(&WindowSettings::new("empty", 0, 0));
        assert!(matches!(result, Err(AnchorError::InvalidArgument(_))));
        assert_eq!(probe.stats().windows_created, 0);
        assert_eq!(system.reports().reports(ReportType::Error).len(), 1);
    }

    #[test]
    fn test_backend_refusal_is_resource_exhausted() {
        let (mut system, probe) = system();
        probe.set_max_windows(Some(1));
        system.create_window(&WindowSettings::default()).unwrap();
        let second = system.create_window(&WindowSettings::default());
        assert!(matches!(second, Err(AnchorError::ResourceExhausted(_))));
        assert_eq!(system.window_count(), 1);
    }

    #[test]
    fn test_unavailable_context_still_opens_window() {
        let (mut system, probe) = system();
        probe.set_supported_contexts(&[]);
        let id = system
            .create_window(&WindowSettings::default().with_context(DrawingContextType::OpenGL))
            .unwrap();
        let window = system.window(id).unwrap();
        assert_eq!(window.drawing_context_type(), DrawingContextType::None);
        assert!(!window.has_drawing_context());
        assert_eq!(system.current_context(), ContextBinding::Neutral);
        assert_eq!(system.reports().reports(ReportType::Warning).len(), 1);
    }

    #[test]
    fn test_dispose_unknown_window() {
        let (mut system, _probe) = system();
        let id = system.create_window(&WindowSettings::default()).unwrap();
        system.dispose_window(id).unwrap();
        assert!(matches!(system.dispose_window(id), Err(AnchorError::NotFound(_))));
        assert!(!system.valid_window(id));
    }

    #[test]
    fn test_events_sorted_and_unknown_handles_dropped() {
        let (mut system, probe) = system();
        let id = system.create_window(&WindowSettings::default()).unwrap();
        let native = handle(&system, id);
        let seen = recorder(&mut system, false);

        probe.push_event(0.3, native, EventKind::KeyDown(Key::Space));
        probe.push_event(0.1, native, EventKind::ButtonDown(MouseButton::Left));
        probe.push_event(0.2, NativeHandle(999), EventKind::WindowClose);
        probe.push_event(0.2, native, EventKind::ButtonUp(MouseButton::Left));

        assert!(system.process_events(false));
        assert_eq!(system.pending_events(), 3);
        system.dispatch_events();

        let seen = seen.borrow();
        let times: Vec<f64> = seen.iter().map(|event| event.time).collect();
        assert_eq!(times, vec![0.1, 0.2, 0.3]);
        assert!(seen.iter().all(|event| event.window == Some(id)));
    }

    #[test]
    fn test_consumed_events_stop_propagation() {
        let (mut system, probe) = system();
        let first = recorder(&mut system, true);
        let second = recorder(&mut system, false);

        probe.push_system_event(0.0, EventKind::QuitRequest);
        system.process_events(false);
        system.dispatch_events();

        assert_eq!(first.borrow().len(), 1);
        assert!(second.borrow().is_empty());
        assert!(system.quit_requested());
    }

    #[test]
    fn test_window_events_update_state() {
        let (mut system, probe) = system();
        let first = system.create_window(&WindowSettings::default()).unwrap();
        let second = system.create_window(&WindowSettings::default()).unwrap();
        let native = handle(&system, second);

        probe.push_event(0.0, native, EventKind::WindowActivate);
        probe.push_event(0.1, native, EventKind::WindowSize { width: 800, height: 600 });
        probe.push_event(0.2, native, EventKind::DpiChanged(2.0));
        system.process_events(false);
        system.dispatch_events();

        assert_eq!(system.active_window(), Some(second));
        let window = system.window(second).unwrap();
        assert_eq!((window.width(), window.height()), (800, 600));
        approx::assert_relative_eq!(window.native_pixel_size(), 2.0);
        approx::assert_relative_eq!(system.window(first).unwrap().native_pixel_size(), 1.0);

        probe.push_event(0.3, native, EventKind::WindowDeactivate);
        system.process_events(false);
        system.dispatch_events();
        assert_eq!(system.active_window(), None);
    }

    #[test]
    fn test_drop_files_reach_drop_box() {
        let (mut system, probe) = system();
        let id = system.create_window(&WindowSettings::default()).unwrap();
        let native = handle(&system, id);
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);

        let window = system.window_mut(id).unwrap();
        window.set_accept_drag_operation(true);
        window.add_drop_box(accept_kind("importer", DragKind::Path, move |drag: &Drag| {
            for item in drag.items() {
                if let DragItem::ExternalPath(path) = item {
                    sink.borrow_mut().push(path.clone());
                }
            }
        }));

        let paths = vec!["/tmp/shot.usda".to_string(), "/tmp/set.usda".to_string()];
        probe.push_event(0.0, native, EventKind::DropFiles(paths.clone()));
        system.process_events(false);
        system.dispatch_events();

        assert_eq!(*received.borrow(), paths);
        let outcomes = system.tick();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].state, DragState::Dropped(id));
        assert!(outcomes[0].delivered);
    }

    #[test]
    fn test_drag_dropped_on_accepting_window() {
        let (mut system, probe) = system();
        let source = system.create_window(&WindowSettings::default()).unwrap();
        let target = system.create_window(&WindowSettings::default()).unwrap();
        let target_native = handle(&system, target);
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&dropped);

        let window = system.window_mut(target).unwrap();
        window.set_accept_drag_operation(true);
        window.add_drop_box(accept_kind("outliner", DragKind::Id, move |drag: &Drag| {
            sink.borrow_mut().extend(drag.local_ids().map(str::to_string));
        }));

        let drag = system
            .start_drag(0, DragKind::Id, None, 0.0, DragFlags::default())
            .unwrap();
        system.drag_mut(drag).unwrap().add_local_id("/root/foo", "/root").unwrap();
        assert_eq!(system.drag(drag).unwrap().source(), source);

        probe.push_event(0.0, target_native, EventKind::CursorMove { x: 10, y: 20 });
        system.process_events(false);
        system.dispatch_events();
        assert_eq!(system.drag(drag).unwrap().state(), DragState::Hovering(target));

        assert!(system.tick().is_empty());
        assert_eq!(system.drag(drag).unwrap().state(), DragState::Acceptable(target));

        probe.push_event(0.1, target_native, EventKind::ButtonUp(MouseButton::Left));
        system.process_events(false);
        system.dispatch_events();

        let drag_ref = system.drag(drag).unwrap();
        assert_eq!(drag_ref.state(), DragState::Dropped(target));
        assert!(drag_ref.is_payload_freed());
        assert_eq!(*dropped.borrow(), vec!["/root/foo".to_string()]);
    }

    #[test]
    fn test_release_over_refusing_window_cancels() {
        let (mut system, probe) = system();
        system.create_window(&WindowSettings::default()).unwrap();
        let target = system.create_window(&WindowSettings::default()).unwrap();
        let target_native = handle(&system, target);

        let drag = system
            .start_drag(0, DragKind::Value, Some(DragItem::Value(0.5)), 0.5, DragFlags::COPY)
            .unwrap();
        probe.push_event(0.0, target_native, EventKind::CursorMove { x: 1, y: 1 });
        system.process_events(false);
        system.dispatch_events();
        system.tick();
        assert_eq!(system.drag(drag).unwrap().state(), DragState::Rejected(target));

        probe.push_event(0.1, target_native, EventKind::ButtonUp(MouseButton::Left));
        system.process_events(false);
        system.dispatch_events();
        assert_eq!(system.drag(drag).unwrap().state(), DragState::Cancelled);
    }

    #[test]
    fn test_escape_cancels_drag() {
        let (mut system, probe) = system();
        let id = system.create_window(&WindowSettings::default()).unwrap();
        let native = handle(&system, id);
        let drag = system.start_drag(0, DragKind::Id, None, 0.0, DragFlags::default()).unwrap();

        probe.push_event(0.0, native, EventKind::KeyDown(Key::Escape));
        system.process_events(false);
        system.dispatch_events();

        assert_eq!(system.drag(drag).unwrap().state(), DragState::Cancelled);
        let outcomes = system.tick();
        assert_eq!(outcomes[0].drag, drag);
        assert!(system.drag(drag).is_some());
        system.tick();
        assert!(system.drag(drag).is_none());
    }

    #[test]
    fn test_start_drag_needs_active_window() {
        let (mut system, _probe) = system();
        let result = system.start_drag(0, DragKind::Id, None, 0.0, DragFlags::default());
        assert!(matches!(result, Err(AnchorError::InvalidState(_))));
    }

    #[test]
    fn test_wrap_motion_reports_logical_position() {
        let (mut system, probe) = system();
        let id = system.create_window(&WindowSettings::default()).unwrap();
        let native = handle(&system, id);
        let seen = recorder(&mut system, false);
        system
            .window_mut(id)
            .unwrap()
            .set_cursor_grab(crate::anchor::types::GrabMode::Wrap, Some(crate::anchor::rect::Rect::new(0, 0, 100, 100)))
            .unwrap();

        probe.push_event(0.0, native, EventKind::CursorMove { x: 105, y: 50 });
        probe.push_event(0.1, native, EventKind::CursorMove { x: 10, y: 50 });
        system.process_events(false);
        system.dispatch_events();

        let kinds: Vec<EventKind> = seen.borrow().iter().map(|event| event.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![EventKind::CursorMove { x: 105, y: 50 }, EventKind::CursorMove { x: 110, y: 50 }]
        );
        assert_eq!(probe.stats().warps, vec![(native, 5, 50)]);
    }

    #[test]
    fn test_drop_shuts_down() {
        let (mut system, probe) = system();
        system.create_window(&WindowSettings::default()).unwrap();
        system.create_window(&WindowSettings::default()).unwrap();
        drop(system);
        assert_eq!(probe.live_windows(), 0);
        assert_eq!(probe.stats().windows_disposed, 2);
    }
}
