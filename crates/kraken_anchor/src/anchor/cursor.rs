//! Cursor visibility, shape and pointer-grab state
//!
//! [`CursorState`] is pure bookkeeping. The window drives the backend and
//! asks this type which transition a grab request amounts to, so the grab
//! FSM can be exercised without a platform.
//!
//! Invariant: while the grab mode is [`GrabMode::Disable`] the bounds are the
//! unset sentinel and the warp accumulator is `(0, 0)`.

use crate::error::{AnchorError, AnchorResult};

use super::rect::Rect;
use super::types::{GrabAxis, GrabMode, StandardCursor};

/// What a grab request does to the current grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabTransition {
    /// Same mode and bounds, nothing to do
    Unchanged,
    /// Disabled to active: capture with these bounds
    Capture(Rect),
    /// Active to disabled: release the capture
    Release,
    /// Active to a different active mode: release then capture again
    Regrab(Rect),
}

/// Per-window cursor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    visible: bool,
    shape: StandardCursor,
    grab: GrabMode,
    grab_axis: GrabAxis,
    grab_bounds: Rect,
    grab_accum: (i32, i32),
}

impl CursorState {
    /// Visible default cursor, no grab
    pub fn new() -> Self {
        Self {
            visible: true,
            shape: StandardCursor::Default,
            grab: GrabMode::Disable,
            grab_axis: GrabAxis::all(),
            grab_bounds: Rect::UNSET,
            grab_accum: (0, 0),
        }
    }

    /// Whether the cursor is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current cursor shape
    pub fn shape(&self) -> StandardCursor {
        self.shape
    }

    /// Current grab mode
    pub fn grab_mode(&self) -> GrabMode {
        self.grab
    }

    /// Axes the wrap grab acts on
    pub fn grab_axis(&self) -> GrabAxis {
        self.grab_axis
    }

    /// Net displacement applied by wrap warps since the grab started
    pub fn grab_accum(&self) -> (i32, i32) {
        self.grab_accum
    }

    /// Raw grab bounds, possibly the unset sentinel
    pub fn raw_grab_bounds(&self) -> Rect {
        self.grab_bounds
    }

    /// Grab bounds, failing while no grab is active
    pub fn grab_bounds(&self) -> AnchorResult<Rect> {
        if self.grab_bounds.is_unset() {
            Err(AnchorError::InvalidState("cursor grab bounds are not set".to_string()))
        } else {
            Ok(self.grab_bounds)
        }
    }

    /// Record visibility, returns whether it changed
    pub(crate) fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    /// Record shape, returns whether it changed
    pub(crate) fn set_shape(&mut self, shape: StandardCursor) -> bool {
        let changed = self.shape != shape;
        self.shape = shape;
        changed
    }

    /// Decide what a grab request means given the current state
    ///
    /// `client` is the window client rectangle used when no bounds are given
    /// and none can be preserved.
    pub fn plan_grab(
        &self,
        mode: GrabMode,
        bounds: Option<Rect>,
        client: Rect,
    ) -> AnchorResult<GrabTransition> {
        let requested = match bounds {
            Some(rect) => Some(Self::normalize_bounds(rect)?),
            None => None,
        };

        if mode == self.grab {
            let unchanged = match requested {
                None => true,
                Some(rect) => !mode.is_active() || rect == self.grab_bounds,
            };
            if unchanged {
                return Ok(GrabTransition::Unchanged);
            }
        }

        Ok(match (self.grab.is_active(), mode.is_active()) {
            (_, false) => GrabTransition::Release,
            (false, true) => GrabTransition::Capture(requested.unwrap_or(client)),
            (true, true) => GrabTransition::Regrab(requested.unwrap_or(self.grab_bounds)),
        })
    }

    fn normalize_bounds(rect: Rect) -> AnchorResult<Rect> {
        if rect.is_unset() {
            return Err(AnchorError::InvalidState("grab bounds are the unset sentinel".to_string()));
        }
        let rect = rect.normalized();
        if rect.is_empty() {
            return Err(AnchorError::InvalidState(format!("grab bounds {rect:?} have no area")));
        }
        Ok(rect)
    }

    /// Enter an active grab
    pub(crate) fn begin_grab(&mut self, mode: GrabMode, axis: GrabAxis, bounds: Rect) {
        debug_assert!(mode.is_active());
        self.grab = mode;
        self.grab_axis = if axis.is_empty() { GrabAxis::all() } else { axis };
        self.grab_bounds = bounds;
        self.grab_accum = (0, 0);
    }

    /// Leave any grab, returning the accumulated warp when leaving a wrap grab
    pub(crate) fn end_grab(&mut self) -> Option<(i32, i32)> {
        let accum = (self.grab == GrabMode::Wrap).then_some(self.grab_accum);
        self.grab = GrabMode::Disable;
        self.grab_axis = GrabAxis::all();
        self.grab_bounds = Rect::UNSET;
        self.grab_accum = (0, 0);
        accum
    }

    /// Apply wrap-grab semantics to a raw pointer position
    ///
    /// Returns the position the backend must warp the pointer to, or `None`
    /// if no warp is needed. The accumulator absorbs the jump so that
    /// [`CursorState::logical_position`] keeps moving continuously.
    pub(crate) fn wrap(&mut self, x: i32, y: i32, margin: i32) -> Option<(i32, i32)> {
        if self.grab != GrabMode::Wrap {
            return None;
        }
        let (wx, wy) = self.grab_bounds.wrap_point(x, y, margin, self.grab_axis);
        if (wx, wy) == (x, y) {
            return None;
        }
        self.grab_accum.0 = self.grab_accum.0.saturating_add(wx.saturating_sub(x));
        self.grab_accum.1 = self.grab_accum.1.saturating_add(wy.saturating_sub(y));
        Some((wx, wy))
    }

    /// Pointer position with the wrap displacement removed
    pub fn logical_position(&self, x: i32, y: i32) -> (i32, i32) {
        (x.saturating_sub(self.grab_accum.0), y.saturating_sub(self.grab_accum.1))
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}
