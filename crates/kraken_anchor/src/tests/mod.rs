//! Cross-module behavior tests driven through the headless backend

mod scenarios;

use crate::anchor::headless::{HeadlessProbe, HeadlessSystem};
use crate::anchor::system::AnchorSystem;
use crate::anchor::types::{NativeHandle, WindowId};
use crate::anchor::window::AnchorWindow;

fn headless_system() -> (AnchorSystem, HeadlessProbe) {
    let backend = HeadlessSystem::new();
    let probe = backend.probe();
    (AnchorSystem::new(Box::new(backend)), probe)
}

fn native(system: &AnchorSystem, id: WindowId) -> NativeHandle {
    system.window(id).and_then(AnchorWindow::os_window).unwrap()
}
