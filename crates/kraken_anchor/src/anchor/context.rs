//! Drawing-context arbitration
//!
//! The process has exactly one current graphics binding. [`ContextArbiter`]
//! is that binding made explicit: the system owns one arbiter, and every
//! bind, unbind and swap goes through it so at most one window is current.
//!
//! A failed bind leaves the arbiter in [`ContextBinding::Neutral`] rather
//! than unbound, so draw code always finds a defined binding. No backend
//! context is attached to any window in that state.

use slotmap::SlotMap;

use crate::error::{AnchorError, AnchorResult};

use super::types::{DrawingContextType, WindowId};
use super::window::AnchorWindow;

/// The process-wide current binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextBinding {
    /// Nothing bound
    #[default]
    Unbound,
    /// Placeholder left by a failed bind
    Neutral,
    /// This window's context is current
    Window(WindowId),
}

/// Owner of the current binding
#[derive(Debug, Default)]
pub struct ContextArbiter {
    current: ContextBinding,
}

impl ContextArbiter {
    /// Arbiter with nothing bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Current binding
    pub fn current(&self) -> ContextBinding {
        self.current
    }

    /// Window whose context is current, if any
    pub fn owner(&self) -> Option<WindowId> {
        match self.current {
            ContextBinding::Window(id) => Some(id),
            _ => None,
        }
    }

    /// Unbind whatever is current
    pub(crate) fn release(&mut self, windows: &mut SlotMap<WindowId, AnchorWindow>) {
        if let ContextBinding::Window(owner) = self.current {
            if let Some(context) = windows.get_mut(owner).and_then(AnchorWindow::context_mut) {
                if let Err(e) = context.release() {
                    log::warn!("Releasing drawing context failed: {}", e);
                }
            }
        }
        self.current = ContextBinding::Unbound;
    }

    /// Forget a window that is being destroyed
    pub(crate) fn forget(&mut self, windows: &mut SlotMap<WindowId, AnchorWindow>, id: WindowId) {
        if self.current == ContextBinding::Window(id) {
            self.release(windows);
        }
    }

    /// Drop back to nothing bound, e.g. after the last window went away
    pub(crate) fn reset(&mut self) {
        self.current = ContextBinding::Unbound;
    }

    /// Replace a window's drawing context with a fresh one of `context_type`
    ///
    /// Succeeds without side effects if the window already has that type.
    /// Otherwise the current binding is released, the window's old context
    /// discarded and a new one created and bound. If no context ends up
    /// bound, the neutral placeholder takes over, the window records
    /// [`DrawingContextType::None`] and the call fails unless `None` was
    /// what was asked for.
    pub(crate) fn set_context_type(
        &mut self,
        windows: &mut SlotMap<WindowId, AnchorWindow>,
        id: WindowId,
        context_type: DrawingContextType,
    ) -> AnchorResult<()> {
        let current_type = windows
            .get(id)
            .ok_or_else(|| AnchorError::NotFound(format!("window {id:?}")))?
            .drawing_context_type();
        if current_type == context_type {
            return Ok(());
        }

        self.release(windows);
        let window = windows
            .get_mut(id)
            .ok_or_else(|| AnchorError::NotFound(format!("window {id:?}")))?;
        window.drop_context();

        let mut failure = None;
        if context_type != DrawingContextType::None {
            match window.new_drawing_context(context_type) {
                Ok(mut context) => match context.activate() {
                    Ok(()) => {
                        window.attach_context(context);
                        self.current = ContextBinding::Window(id);
                    }
                    Err(e) => failure = Some(e),
                },
                Err(e) => failure = Some(e),
            }
        }

        if self.current == ContextBinding::Window(id) {
            log::debug!("Window {:?} now owns a {} context", id, context_type.name());
            return Ok(());
        }

        self.current = ContextBinding::Neutral;
        match failure {
            None => Ok(()),
            Some(e) => Err(AnchorError::BackendFailure(format!(
                "could not create {} context: {}",
                context_type.name(),
                e
            ))),
        }
    }

    /// Make a window's context current; no-op if it already is
    pub(crate) fn activate(
        &mut self,
        windows: &mut SlotMap<WindowId, AnchorWindow>,
        id: WindowId,
    ) -> AnchorResult<()> {
        if self.current == ContextBinding::Window(id) {
            return Ok(());
        }
        let has_context = windows
            .get(id)
            .ok_or_else(|| AnchorError::NotFound(format!("window {id:?}")))?
            .has_drawing_context();
        if !has_context {
            return Err(AnchorError::InvalidState(format!("window {id:?} has no drawing context")));
        }

        self.release(windows);
        let result = match windows.get_mut(id).and_then(AnchorWindow::context_mut) {
            Some(context) => context.activate(),
            None => Err(AnchorError::InvalidState(format!("window {id:?} has no drawing context"))),
        };
        match result {
            Ok(()) => {
                self.current = ContextBinding::Window(id);
                Ok(())
            }
            Err(e) => {
                self.current = ContextBinding::Neutral;
                Err(e)
            }
        }
    }

    /// Present the back buffer of a window whose context is current
    pub(crate) fn swap_buffers(
        &self,
        windows: &mut SlotMap<WindowId, AnchorWindow>,
        id: WindowId,
    ) -> AnchorResult<()> {
        let window = windows
            .get_mut(id)
            .ok_or_else(|| AnchorError::NotFound(format!("window {id:?}")))?;
        if window.drawing_context_type() == DrawingContextType::None {
            return Err(AnchorError::InvalidState(format!("window {id:?} has no drawing context")));
        }
        if self.current != ContextBinding::Window(id) {
            return Err(AnchorError::InvalidState(format!(
                "drawing context of window {id:?} is not current"
            )));
        }
        match window.context_mut() {
            Some(context) => context.swap_buffers(),
            None => Err(AnchorError::InvalidState(format!("window {id:?} has no drawing context"))),
        }
    }
}
