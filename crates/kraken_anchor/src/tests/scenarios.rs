use super::{headless_system, native};
use crate::anchor::context::ContextBinding;
use crate::anchor::event::EventKind;
use crate::anchor::rect::Rect;
use crate::anchor::types::{DrawingContextType, GrabMode, WindowState};
use crate::anchor::window::WindowSettings;
use crate::error::{AnchorError, Status};
use crate::wm::{DragFlags, DragItem, DragKind, DragState};

#[test]
fn test_modified_flag_on_normal_window() {
    let (mut system, _probe) = headless_system();
    let id = system.create_window(&WindowSettings::new("Untitled", 1280, 720)).unwrap();
    let window = system.window_mut(id).unwrap();

    assert_eq!(window.state(), WindowState::Normal);
    assert!(!window.want_stereo());
    assert!(!window.is_exclusive());
    assert!(!window.modified_state());
    window.set_modified_state(true).unwrap();
    assert!(window.modified_state());
}

#[test]
fn test_fullscreen_window_caches_size() {
    let (mut system, _probe) = headless_system();
    let settings = WindowSettings::new("Viewport", 1920, 1080).with_state(WindowState::FullScreen);
    let id = system.create_window(&settings).unwrap();
    let window = system.window(id).unwrap();

    assert!(window.is_full_screen());
    assert_eq!(window.full_screen_size(), (1920, 1080));
}

#[test]
fn test_second_window_takes_the_context() {
    let (mut system, probe) = headless_system();
    let w1 = system.create_window(&WindowSettings::default()).unwrap();
    let w2 = system.create_window(&WindowSettings::default()).unwrap();

    assert!(system.set_drawing_context_type(w1, DrawingContextType::OpenGL).is_ok());
    assert_eq!(system.context_owner(), Some(w1));
    assert!(system.set_drawing_context_type(w2, DrawingContextType::OpenGL).is_ok());
    assert_eq!(system.current_context(), ContextBinding::Window(w2));

    assert!(system.swap_buffers(w2).is_ok());
    let result = system.swap_buffers(w1);
    assert!(matches!(result, Err(AnchorError::InvalidState(_))));
    assert_eq!(Status::from(&result), Status::Failure);
    assert_eq!(probe.stats().swaps, 1);

    system.activate_drawing_context(w1).unwrap();
    assert!(system.swap_buffers(w1).is_ok());
}

#[test]
fn test_drag_cancelled_after_source_destroyed() {
    let (mut system, probe) = headless_system();
    let id = system.create_window(&WindowSettings::default()).unwrap();
    let drag = system
        .start_drag(
            0,
            DragKind::Id,
            Some(DragItem::LocalId { path: "/root/foo".into(), from_parent: "/root".into() }),
            0.0,
            DragFlags::default(),
        )
        .unwrap();
    assert_eq!(system.drag(drag).unwrap().items().len(), 1);

    system.dispose_window(id).unwrap();
    assert_eq!(probe.live_windows(), 0);
    let outcomes = system.tick();

    let drag_ref = system.drag(drag).unwrap();
    assert_eq!(drag_ref.state(), DragState::Cancelled);
    assert!(drag_ref.is_payload_freed());
    assert!(drag_ref.items().is_empty());
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].source, id);
    assert_eq!(outcomes[0].state, DragState::Cancelled);
}

#[test]
fn test_wrap_grab_accumulates_warp() {
    let (mut system, probe) = headless_system();
    let id = system.create_window(&WindowSettings::default()).unwrap();
    let handle = native(&system, id);
    system
        .window_mut(id)
        .unwrap()
        .set_cursor_grab(GrabMode::Wrap, Some(Rect::new(0, 0, 100, 100)))
        .unwrap();
    assert!(probe.is_captured(handle));

    probe.push_event(0.0, handle, EventKind::CursorMove { x: 105, y: 50 });
    system.process_events(false);
    system.dispatch_events();

    let window = system.window_mut(id).unwrap();
    assert_eq!(window.cursor().grab_accum().0, -100);

    let reported = window.set_cursor_grab(GrabMode::Disable, None).unwrap();
    assert_eq!(reported, Some((-100, 0)));
    assert_eq!(window.cursor().grab_accum(), (0, 0));
    assert!(window.cursor().raw_grab_bounds().is_unset());
    assert!(!probe.is_captured(handle));
}

#[test]
fn test_reverse_shutdown_leaves_nothing_bound() {
    let (mut system, probe) = headless_system();
    let settings = WindowSettings::default().with_context(DrawingContextType::OpenGL);
    let ids: Vec<_> = (0..3).map(|_| system.create_window(&settings).unwrap()).collect();
    assert_eq!(system.context_owner(), Some(ids[2]));

    for &id in ids.iter().rev() {
        system.dispose_window(id).unwrap();
    }

    assert_eq!(system.current_context(), ContextBinding::Unbound);
    assert_eq!(system.window_count(), 0);
    let stats = probe.stats();
    assert_eq!(probe.live_windows(), 0);
    assert_eq!(stats.windows_disposed, 3);
    assert_eq!(stats.contexts_created, 3);
    assert_eq!(stats.contexts_live, 0);
    assert!(!probe.has_bound_context());
}

#[test]
fn test_shutdown_disposes_newest_first() {
    let (mut system, probe) = headless_system();
    let settings = WindowSettings::default().with_context(DrawingContextType::Vulkan);
    let mut handles = Vec::new();
    for _ in 0..3 {
        let id = system.create_window(&settings).unwrap();
        handles.push(native(&system, id));
    }
    system.shutdown();

    handles.reverse();
    assert_eq!(probe.stats().disposed, handles);
    assert_eq!(system.window_count(), 0);
    assert_eq!(system.current_context(), ContextBinding::Unbound);
    assert_eq!(probe.stats().contexts_live, 0);
    assert_eq!(probe.live_windows(), 0);
}
