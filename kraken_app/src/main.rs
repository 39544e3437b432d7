//! Kraken window host
//!
//! Loads `kraken.toml` (or the file given as the first argument), opens the
//! configured windows and runs the event loop until every window is closed
//! or the platform asks to quit. Without the `glfw-backend` feature the
//! headless backend is used and the loop stops after a few frames.

mod app;

use app::{App, AppError};

fn main() {
    if let Err(e) = run() {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "kraken.toml".to_string());
    let mut app = App::new(&config_path)?;
    app.run()
}
