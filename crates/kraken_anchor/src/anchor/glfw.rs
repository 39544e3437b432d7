//! GLFW backend
//!
//! Native windows with OpenGL contexts through GLFW. Each window keeps its
//! GLFW event receiver in the system so events can be tagged with the
//! window's native handle. Windows asked for a Vulkan or Metal context are
//! created without a client API and cannot host an OpenGL context later.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use ::glfw::{Context as _, Glfw, GlfwReceiver, PWindow, WindowEvent};

use crate::error::{AnchorError, AnchorResult};

use super::backend::{DrawingContext, SystemBackend, WindowBackend};
use super::event::{BackendEvent, EventKind};
use super::rect::Rect;
use super::types::{DrawingContextType, GrabMode, Key, MouseButton, NativeHandle, StandardCursor, WindowState};
use super::window::WindowSettings;

type SharedWindow = Rc<RefCell<PWindow>>;

/// System backend on top of GLFW
pub struct GlfwSystem {
    glfw: Glfw,
    receivers: Vec<(NativeHandle, GlfwReceiver<(f64, WindowEvent)>)>,
    next_handle: u64,
}

impl GlfwSystem {
    /// Initialize GLFW
    pub fn new() -> AnchorResult<Self> {
        let glfw = ::glfw::init(::glfw::fail_on_errors)
            .map_err(|e| AnchorError::BackendFailure(format!("GLFW initialization failed: {e:?}")))?;
        log::info!("GLFW {} initialized", ::glfw::get_version_string());
        Ok(Self {
            glfw,
            receivers: Vec::new(),
            next_handle: 1,
        })
    }
}

impl SystemBackend for GlfwSystem {
    fn name(&self) -> &'static str {
        "glfw"
    }

    fn create_window(&mut self, settings: &WindowSettings) -> AnchorResult<Box<dyn WindowBackend>> {
        let has_gl = matches!(settings.context_type, DrawingContextType::None | DrawingContextType::OpenGL);
        let api = if has_gl { ::glfw::ClientApiHint::OpenGl } else { ::glfw::ClientApiHint::NoApi };
        self.glfw.window_hint(::glfw::WindowHint::ClientApi(api));
        self.glfw.window_hint(::glfw::WindowHint::Stereo(settings.want_stereo));
        self.glfw.window_hint(::glfw::WindowHint::Resizable(true));

        let (mut window, events) = self
            .glfw
            .create_window(settings.width, settings.height, &settings.title, ::glfw::WindowMode::Windowed)
            .ok_or_else(|| AnchorError::BackendFailure(format!("GLFW could not create window '{}'", settings.title)))?;
        window.set_all_polling(true);
        window.set_pos(settings.left, settings.top);

        let handle = NativeHandle(self.next_handle);
        self.next_handle += 1;
        self.receivers.push((handle, events));

        let mut backend = GlfwWindow {
            glfw: self.glfw.clone(),
            window: Rc::new(RefCell::new(window)),
            handle,
            has_gl,
            title: settings.title.clone(),
            cursor_visible: true,
            grab: GrabMode::Disable,
            windowed: (settings.left, settings.top, settings.width, settings.height),
            full_screen: false,
        };
        if settings.state != WindowState::Normal {
            if let Err(e) = backend.set_state(settings.state) {
                log::warn!("Window '{}' opened in normal state: {}", settings.title, e);
            }
        }
        Ok(Box::new(backend))
    }

    fn dispose_window(&mut self, window: Box<dyn WindowBackend>) -> AnchorResult<()> {
        let handle = window
            .as_any()
            .downcast_ref::<GlfwWindow>()
            .map(|window| window.handle)
            .ok_or_else(|| AnchorError::InvalidArgument("window was not created by the GLFW backend".to_string()))?;
        self.receivers.retain(|(other, _)| *other != handle);
        drop(window);
        Ok(())
    }

    fn process_events(&mut self, wait: bool) -> Vec<BackendEvent> {
        if wait {
            self.glfw.wait_events_timeout(0.1);
        } else {
            self.glfw.poll_events();
        }

        let mut events = Vec::new();
        for (handle, receiver) in &self.receivers {
            for (time, event) in ::glfw::flush_messages(receiver) {
                if let Some(kind) = translate_event(event) {
                    events.push(BackendEvent::new(time, *handle, kind));
                }
            }
        }
        events
    }

    fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    fn main_display_size(&self) -> Option<(u32, u32)> {
        let mut glfw = self.glfw.clone();
        glfw.with_primary_monitor(|_, monitor| {
            monitor
                .and_then(|monitor| monitor.get_video_mode())
                .map(|mode| (mode.width, mode.height))
        })
    }
}

/// A GLFW window
pub struct GlfwWindow {
    glfw: Glfw,
    window: SharedWindow,
    handle: NativeHandle,
    has_gl: bool,
    title: String,
    cursor_visible: bool,
    grab: GrabMode,
    windowed: (i32, i32, u32, u32),
    full_screen: bool,
}

impl GlfwWindow {
    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.borrow().should_close()
    }

    fn apply_cursor_mode(&mut self) {
        let mode = if self.grab == GrabMode::Hide {
            ::glfw::CursorMode::Disabled
        } else if self.cursor_visible {
            ::glfw::CursorMode::Normal
        } else {
            ::glfw::CursorMode::Hidden
        };
        self.window.borrow_mut().set_cursor_mode(mode);
    }

    fn enter_full_screen(&mut self) -> AnchorResult<()> {
        if self.full_screen {
            return Ok(());
        }
        {
            let window = self.window.borrow();
            let (left, top) = window.get_pos();
            let (width, height) = window.get_size();
            self.windowed = (left, top, to_u32(width), to_u32(height));
        }

        let window = &self.window;
        let entered = self.glfw.with_primary_monitor(|_, monitor| {
            let Some(monitor) = monitor else {
                return false;
            };
            let Some(mode) = monitor.get_video_mode() else {
                return false;
            };
            window.borrow_mut().set_monitor(
                ::glfw::WindowMode::FullScreen(monitor),
                0,
                0,
                mode.width,
                mode.height,
                Some(mode.refresh_rate),
            );
            true
        });
        if !entered {
            return Err(AnchorError::BackendFailure("no primary monitor for fullscreen".to_string()));
        }
        self.full_screen = true;
        Ok(())
    }

    fn leave_full_screen(&mut self) {
        if !self.full_screen {
            return;
        }
        let (left, top, width, height) = self.windowed;
        self.window
            .borrow_mut()
            .set_monitor(::glfw::WindowMode::Windowed, left, top, width, height, None);
        self.full_screen = false;
    }
}

impl WindowBackend for GlfwWindow {
    fn native_handle(&self) -> Option<NativeHandle> {
        Some(self.handle)
    }

    fn new_drawing_context(&mut self, context_type: DrawingContextType) -> AnchorResult<Box<dyn DrawingContext>> {
        match context_type {
            DrawingContextType::OpenGL if self.has_gl => Ok(Box::new(GlfwContext {
                glfw: self.glfw.clone(),
                window: Rc::clone(&self.window),
            })),
            DrawingContextType::OpenGL => Err(AnchorError::BackendFailure(
                "window was created without an OpenGL client API".to_string(),
            )),
            other => Err(AnchorError::BackendFailure(format!(
                "{} contexts are not provided by the GLFW backend",
                other.name()
            ))),
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.window.borrow_mut().set_title(title);
        self.title = title.to_string();
    }

    fn client_size(&self) -> (u32, u32) {
        let (width, height) = self.window.borrow().get_size();
        (to_u32(width), to_u32(height))
    }

    fn set_client_size(&mut self, width: u32, height: u32) -> AnchorResult<()> {
        let width = i32::try_from(width).map_err(|_| AnchorError::InvalidArgument(format!("width {width}")))?;
        let height = i32::try_from(height).map_err(|_| AnchorError::InvalidArgument(format!("height {height}")))?;
        self.window.borrow_mut().set_size(width, height);
        Ok(())
    }

    fn set_state(&mut self, state: WindowState) -> AnchorResult<()> {
        match state {
            WindowState::FullScreen => return self.enter_full_screen(),
            WindowState::Normal => {
                self.leave_full_screen();
                self.window.borrow_mut().restore();
            }
            WindowState::Maximized => {
                self.leave_full_screen();
                self.window.borrow_mut().maximize();
            }
            WindowState::Minimized => self.window.borrow_mut().iconify(),
        }
        Ok(())
    }

    fn set_cursor_visibility(&mut self, visible: bool) -> AnchorResult<()> {
        self.cursor_visible = visible;
        self.apply_cursor_mode();
        Ok(())
    }

    fn set_cursor_shape(&mut self, shape: StandardCursor) -> AnchorResult<()> {
        let cursor = ::glfw::Cursor::standard(glfw_cursor(shape));
        self.window.borrow_mut().set_cursor(Some(cursor));
        Ok(())
    }

    fn set_cursor_grab(&mut self, mode: GrabMode, _bounds: Option<Rect>) -> AnchorResult<()> {
        // GLFW cannot confine the pointer; wrapping is done with warps.
        self.grab = mode;
        self.apply_cursor_mode();
        Ok(())
    }

    fn warp_cursor(&mut self, x: i32, y: i32) -> AnchorResult<()> {
        self.window.borrow_mut().set_cursor_pos(f64::from(x), f64::from(y));
        Ok(())
    }

    fn native_pixel_size(&self) -> f32 {
        self.window.borrow().get_content_scale().0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// OpenGL context of a GLFW window
pub struct GlfwContext {
    glfw: Glfw,
    window: SharedWindow,
}

impl DrawingContext for GlfwContext {
    fn context_type(&self) -> DrawingContextType {
        DrawingContextType::OpenGL
    }

    fn activate(&mut self) -> AnchorResult<()> {
        self.window.borrow_mut().make_current();
        Ok(())
    }

    fn release(&mut self) -> AnchorResult<()> {
        ::glfw::make_context_current(None);
        Ok(())
    }

    fn swap_buffers(&mut self) -> AnchorResult<()> {
        self.window.borrow_mut().swap_buffers();
        Ok(())
    }

    fn set_swap_interval(&mut self, interval: i32) -> AnchorResult<()> {
        let interval = match u32::try_from(interval) {
            Ok(0) => ::glfw::SwapInterval::None,
            Ok(frames) => ::glfw::SwapInterval::Sync(frames),
            Err(_) => ::glfw::SwapInterval::Adaptive,
        };
        self.glfw.set_swap_interval(interval);
        Ok(())
    }
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn glfw_cursor(shape: StandardCursor) -> ::glfw::StandardCursor {
    match shape {
        StandardCursor::Text => ::glfw::StandardCursor::IBeam,
        StandardCursor::Crosshair => ::glfw::StandardCursor::Crosshair,
        StandardCursor::Move | StandardCursor::HandOpen | StandardCursor::HandClosed => {
            ::glfw::StandardCursor::Hand
        }
        StandardCursor::UpDown => ::glfw::StandardCursor::VResize,
        StandardCursor::LeftRight => ::glfw::StandardCursor::HResize,
        _ => ::glfw::StandardCursor::Arrow,
    }
}

fn translate_key(key: ::glfw::Key, scancode: i32) -> Key {
    use ::glfw::Key as G;
    match key {
        G::Escape => Key::Escape,
        G::Enter | G::KpEnter => Key::Enter,
        G::Space => Key::Space,
        G::Tab => Key::Tab,
        G::LeftShift | G::RightShift => Key::Shift,
        G::LeftControl | G::RightControl => Key::Control,
        G::LeftAlt | G::RightAlt => Key::Alt,
        G::Up => Key::Up,
        G::Down => Key::Down,
        G::Left => Key::Left,
        G::Right => Key::Right,
        _ => Key::Other(scancode),
    }
}

fn translate_button(button: ::glfw::MouseButton) -> Option<MouseButton> {
    match button {
        ::glfw::MouseButton::Button1 => Some(MouseButton::Left),
        ::glfw::MouseButton::Button2 => Some(MouseButton::Right),
        ::glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn translate_event(event: WindowEvent) -> Option<EventKind> {
    use ::glfw::Action;
    let kind = match event {
        WindowEvent::CursorPos(x, y) => EventKind::CursorMove {
            x: x.round() as i32,
            y: y.round() as i32,
        },
        WindowEvent::MouseButton(button, Action::Press, _) => EventKind::ButtonDown(translate_button(button)?),
        WindowEvent::MouseButton(button, Action::Release, _) => EventKind::ButtonUp(translate_button(button)?),
        WindowEvent::Scroll(dx, dy) => EventKind::Wheel {
            delta_x: dx as f32,
            delta_y: dy as f32,
        },
        WindowEvent::Key(key, scancode, Action::Press | Action::Repeat, _) => {
            EventKind::KeyDown(translate_key(key, scancode))
        }
        WindowEvent::Key(key, scancode, Action::Release, _) => EventKind::KeyUp(translate_key(key, scancode)),
        WindowEvent::Close => EventKind::WindowClose,
        WindowEvent::Focus(true) => EventKind::WindowActivate,
        WindowEvent::Focus(false) => EventKind::WindowDeactivate,
        WindowEvent::Size(width, height) => EventKind::WindowSize {
            width: to_u32(width),
            height: to_u32(height),
        },
        WindowEvent::ContentScale(scale, _) => EventKind::DpiChanged(scale),
        WindowEvent::FileDrop(paths) => {
            EventKind::DropFiles(paths.iter().map(|path| path.to_string_lossy().into_owned()).collect())
        }
        _ => return None,
    };
    Some(kind)
}
