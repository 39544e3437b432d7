//! Drop handlers attached to windows
//!
//! While a drag hovers a window, the window's drop boxes are polled to find
//! out whether the drag is acceptable. On release, the first drop box whose
//! poll succeeds receives the drag.

use super::drag::{Drag, DragKind};

/// A drop target registered on a window
pub trait DropBox {
    /// Whether this handler would take `drag`
    fn poll(&self, drag: &Drag) -> bool;

    /// Receive the drop; the payload is released after this returns
    fn on_drop(&mut self, drag: &Drag);

    /// Name for logs
    fn name(&self) -> &str {
        "dropbox"
    }
}

/// Drop box built from closures
pub struct FnDropBox<P, D>
where
    P: Fn(&Drag) -> bool,
    D: FnMut(&Drag),
{
    name: String,
    poll: P,
    on_drop: D,
}

impl<P, D> FnDropBox<P, D>
where
    P: Fn(&Drag) -> bool,
    D: FnMut(&Drag),
{
    /// Create a named drop box
    pub fn new(name: impl Into<String>, poll: P, on_drop: D) -> Self {
        Self { name: name.into(), poll, on_drop }
    }
}

impl<P, D> DropBox for FnDropBox<P, D>
where
    P: Fn(&Drag) -> bool,
    D: FnMut(&Drag),
{
    fn poll(&self, drag: &Drag) -> bool {
        (self.poll)(drag)
    }

    fn on_drop(&mut self, drag: &Drag) {
        (self.on_drop)(drag);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Drop box accepting drags of one kind and handing them to a callback
pub fn accept_kind<D>(name: impl Into<String>, kind: DragKind, on_drop: D) -> Box<dyn DropBox>
where
    D: FnMut(&Drag) + 'static,
{
    Box::new(FnDropBox::new(name, move |drag: &Drag| drag.kind() == kind, on_drop))
}
