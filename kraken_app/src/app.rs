//! Application lifecycle around the Anchor system

use std::cell::RefCell;
use std::rc::Rc;

use kraken_anchor::anchor::SystemBackend;
use kraken_anchor::foundation::logging;
use kraken_anchor::foundation::time::Timer;
use kraken_anchor::kernel::{IconRegistry, SystemPaths};
use kraken_anchor::prelude::*;
use thiserror::Error;

/// Frames rendered by the headless backend before stopping
#[cfg(not(feature = "glfw-backend"))]
const HEADLESS_FRAMES: u64 = 3;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Window system error
    #[error("Window system error: {0}")]
    Anchor(#[from] AnchorError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Closes windows whose close button was pressed
struct CloseRequests(Rc<RefCell<Vec<WindowId>>>);

impl EventConsumer for CloseRequests {
    fn process_event(&mut self, event: &AnchorEvent) -> bool {
        match (&event.kind, event.window) {
            (EventKind::WindowClose, Some(window)) => {
                self.0.borrow_mut().push(window);
                true
            }
            _ => false,
        }
    }
}

/// The running application
pub struct App {
    system: AnchorSystem,
    icons: IconRegistry,
    close_requests: Rc<RefCell<Vec<WindowId>>>,
    max_frames: Option<u64>,
}

impl App {
    /// Load configuration, start logging and the window system
    pub fn new(config_path: &str) -> Result<Self, AppError> {
        let config = AnchorConfig::load_or_default(config_path)?;
        config.validate()?;
        logging::init_with_level(&config.log_level);

        let (backend, max_frames) = select_backend()?;
        let mut system = AnchorSystem::from_config(backend, &config);

        let icons = IconRegistry::new();
        let icons_dir = config
            .icons_dir
            .clone()
            .unwrap_or_else(|| SystemPaths::detect().icons_path.as_str().into());
        if let Err(e) = icons.load_dir(&icons_dir) {
            log::warn!("No icons loaded from {:?}: {}", icons_dir, e);
        }

        for index in 0..config.initial_windows {
            let mut settings = config.window.clone();
            if index > 0 {
                settings.title = format!("{} ({})", settings.title, index + 1);
            }
            system.create_window(&settings)?;
        }

        let close_requests = Rc::new(RefCell::new(Vec::new()));
        system.add_event_consumer(Box::new(CloseRequests(Rc::clone(&close_requests))));

        Ok(Self {
            system,
            icons,
            close_requests,
            max_frames,
        })
    }

    /// Run the event loop until quit
    pub fn run(&mut self) -> Result<(), AppError> {
        log::info!(
            "Running on the {} backend with {} windows and {} icons",
            self.system.backend_name(),
            self.system.window_count(),
            self.icons.len()
        );
        let mut timer = Timer::new();

        while !self.system.quit_requested() && self.system.window_count() > 0 {
            self.system.process_events(self.max_frames.is_none());
            self.system.dispatch_events();
            for outcome in self.system.tick() {
                log::debug!("Drag {:?} ended as {:?}", outcome.drag, outcome.state);
            }

            let closing: Vec<WindowId> = self.close_requests.borrow_mut().drain(..).collect();
            for window in closing {
                self.system.dispose_window(window)?;
            }

            self.present();
            timer.update();
            if self.max_frames.is_some_and(|max| timer.frame_count() >= max) {
                self.system.request_quit();
            }
        }

        log::info!("Stopping after {} frames", timer.frame_count());
        self.system.shutdown();
        let errors = self.system.reports().to_string(ReportType::Error);
        if !errors.is_empty() {
            log::warn!("Session reported errors:\n{}", errors);
        }
        Ok(())
    }

    fn present(&mut self) {
        let windows: Vec<WindowId> = self
            .system
            .windows()
            .filter(|(_, window)| window.has_drawing_context())
            .map(|(id, _)| id)
            .collect();
        for window in windows {
            let presented = self
                .system
                .activate_drawing_context(window)
                .and_then(|()| self.system.swap_buffers(window));
            if let Err(e) = presented {
                log::trace!("Skipped presenting window {:?}: {}", window, e);
            }
        }
    }
}

#[cfg(feature = "glfw-backend")]
fn select_backend() -> Result<(Box<dyn SystemBackend>, Option<u64>), AppError> {
    let backend = kraken_anchor::anchor::glfw::GlfwSystem::new()?;
    Ok((Box::new(backend), None))
}

#[cfg(not(feature = "glfw-backend"))]
fn select_backend() -> Result<(Box<dyn SystemBackend>, Option<u64>), AppError> {
    Ok((Box::new(HeadlessSystem::new()), Some(HEADLESS_FRAMES)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_app_runs_to_completion() {
        let path = std::env::temp_dir().join(format!("kraken_app_{}.toml", std::process::id()));
        let config = AnchorConfig::default()
            .with_initial_windows(2)
            .with_window(WindowSettings::new("Kraken", 640, 480).with_context(DrawingContextType::OpenGL));
        config.save_to_file(&path.to_string_lossy()).unwrap();

        let mut app = App::new(&path.to_string_lossy()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(app.system.window_count(), 2);
        if app.max_frames.is_some() {
            app.run().unwrap();
            assert_eq!(app.system.window_count(), 0);
        }
    }

    #[test]
    fn test_close_requests_are_consumed() {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let mut consumer = CloseRequests(Rc::clone(&requests));
        let resize = AnchorEvent { time: 0.0, window: None, kind: EventKind::WindowSize { width: 1, height: 1 } };
        assert!(!consumer.process_event(&resize));
        assert!(requests.borrow().is_empty());
    }
}
