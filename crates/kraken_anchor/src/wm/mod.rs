//! Window-manager drag and drop
//!
//! [`DragManager`] owns every running [`Drag`] and moves it through its
//! lifecycle as the system dispatches motion, release and escape events and
//! ticks the manager once per event loop iteration.
//!
//! ```text
//! Started ──motion──► Hovering(w) ──tick──► Acceptable(w) / Rejected(w)
//!    │                     │                        │
//!    └─────── escape / cancel / source lost ────────┴──► Cancelled
//!                          release over accepting w ───► Dropped(w)
//! ```
//!
//! A drag holds its source as a generational [`WindowId`], so destroying the
//! source leaves a stale id that the next tick detects. Terminal drags stay
//! queryable until the tick after the one that reported them.

pub mod drag;
pub mod dropbox;
pub mod path;

pub use drag::{free, free_list, CustomPayload, Drag, DragFlags, DragItem, DragKind, DragState};
pub use dropbox::{accept_kind, DropBox, FnDropBox};
pub use path::{is_valid_prim_path, validate_prim_path};

use slotmap::SlotMap;

use crate::anchor::types::{DragId, WindowId};
use crate::anchor::window::AnchorWindow;
use crate::error::{AnchorError, AnchorResult};

/// Report of a drag reaching a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    /// The drag
    pub drag: DragId,
    /// Window it started in
    pub source: WindowId,
    /// Terminal state reached
    pub state: DragState,
    /// Whether a drop box received the payload
    pub delivered: bool,
}

/// Registry of drag sessions
#[derive(Debug, Default)]
pub struct DragManager {
    drags: SlotMap<DragId, Drag>,
    epoch: u64,
    outcomes: Vec<DragOutcome>,
}

impl DragManager {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag from `source`
    ///
    /// Fails with [`AnchorError::DragInProgress`] while `source` already has
    /// a running drag.
    pub fn start(
        &mut self,
        source: WindowId,
        icon: i32,
        kind: DragKind,
        payload: Option<DragItem>,
        value: f64,
        flags: DragFlags,
        position: (i32, i32),
    ) -> AnchorResult<DragId> {
        if self.active_for(source).is_some() {
            return Err(AnchorError::DragInProgress);
        }
        let mut drag = Drag::new(source, icon, kind, payload, value, flags)?;
        drag.set_position(position.0, position.1);
        let id = self.drags.insert(drag);
        log::debug!("Drag {:?} started from window {:?} ({:?})", id, source, kind);
        Ok(id)
    }

    /// Look up a drag
    pub fn get(&self, id: DragId) -> Option<&Drag> {
        self.drags.get(id)
    }

    /// Look up a drag for adding items
    pub fn get_mut(&mut self, id: DragId) -> Option<&mut Drag> {
        self.drags.get_mut(id)
    }

    /// Running drag started from `source`
    pub fn active_for(&self, source: WindowId) -> Option<DragId> {
        self.drags
            .iter()
            .find(|(_, drag)| drag.source() == source && !drag.state().is_terminal())
            .map(|(id, _)| id)
    }

    /// Number of running (non-terminal) drags
    pub fn active_count(&self) -> usize {
        self.drags.values().filter(|drag| !drag.state().is_terminal()).count()
    }

    /// Number of drags held, terminal ones included
    pub fn len(&self) -> usize {
        self.drags.len()
    }

    /// Whether no drags are held
    pub fn is_empty(&self) -> bool {
        self.drags.is_empty()
    }

    /// Iterate over all held drags
    pub fn iter(&self) -> impl Iterator<Item = (DragId, &Drag)> {
        self.drags.iter()
    }

    /// Cancel a drag; cancelling a finished drag does nothing
    pub fn cancel(&mut self, id: DragId) -> AnchorResult<()> {
        let drag = self
            .drags
            .get(id)
            .ok_or_else(|| AnchorError::NotFound(format!("drag {id:?}")))?;
        if !drag.state().is_terminal() {
            self.finish(id, DragState::Cancelled, false);
        }
        Ok(())
    }

    /// Cancel every running drag started from `source`
    pub(crate) fn cancel_from_source(&mut self, source: WindowId) {
        for id in self.active_ids() {
            if self.drags[id].source() == source {
                log::debug!("Cancelling drag {:?}: source window destroyed", id);
                self.finish(id, DragState::Cancelled, false);
            }
        }
    }

    /// Cancel every running drag
    pub(crate) fn cancel_all(&mut self) {
        for id in self.active_ids() {
            self.finish(id, DragState::Cancelled, false);
        }
    }

    /// Pointer moved over `target`
    pub(crate) fn motion(&mut self, target: WindowId, x: i32, y: i32) {
        for id in self.active_ids() {
            let drag = &mut self.drags[id];
            drag.set_position(x, y);
            let state = drag.state();
            if state == DragState::Started || state.target() != Some(target) {
                drag.set_state(DragState::Hovering(target));
            }
        }
    }

    /// Escape pressed
    pub(crate) fn escape(&mut self) {
        for id in self.active_ids() {
            if self.drags[id].flags().contains(DragFlags::AUTO_CANCEL_ON_ESCAPE) {
                self.finish(id, DragState::Cancelled, false);
            }
        }
    }

    /// Pointer released over `target`: drop where accepted, cancel elsewhere
    pub(crate) fn release(&mut self, target: WindowId, windows: &mut SlotMap<WindowId, AnchorWindow>) {
        for id in self.active_ids() {
            self.drop_on(id, target, windows);
        }
    }

    /// Files dropped onto `target` from outside the application
    pub(crate) fn external_drop(
        &mut self,
        target: WindowId,
        paths: &[String],
        windows: &mut SlotMap<WindowId, AnchorWindow>,
    ) -> AnchorResult<DragId> {
        let mut drag = Drag::new(target, 0, DragKind::Path, None, 0.0, DragFlags::COPY)?;
        for path in paths {
            drag.push_item(DragItem::ExternalPath(path.clone()))?;
        }
        let id = self.drags.insert(drag);
        self.drop_on(id, target, windows);
        Ok(id)
    }

    fn drop_on(&mut self, id: DragId, target: WindowId, windows: &mut SlotMap<WindowId, AnchorWindow>) {
        let drag = &self.drags[id];
        let accepted = windows.get(target).is_some_and(|window| window.accepts_drag(drag));
        if accepted {
            let delivered = windows
                .get_mut(target)
                .is_some_and(|window| window.deliver_drop(drag));
            self.finish(id, DragState::Dropped(target), delivered);
        } else {
            self.finish(id, DragState::Cancelled, false);
        }
    }

    /// Start a new tick: forget drags that finished before the previous one
    pub(crate) fn begin_tick(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        self.drags
            .retain(|_, drag| drag.finished_epoch().map_or(true, |finished| finished + 1 >= epoch));
    }

    /// Cancel drags whose source is gone and probe hovered windows
    pub(crate) fn update(&mut self, windows: &SlotMap<WindowId, AnchorWindow>) {
        for id in self.active_ids() {
            let drag = &self.drags[id];
            if !windows.contains_key(drag.source()) {
                log::debug!("Cancelling drag {:?}: source window lost", id);
                self.finish(id, DragState::Cancelled, false);
                continue;
            }
            let Some(target) = drag.state().target() else {
                continue;
            };
            let next = match windows.get(target) {
                Some(window) if window.accepts_drag(drag) => DragState::Acceptable(target),
                Some(_) => DragState::Rejected(target),
                None => DragState::Started,
            };
            self.drags[id].set_state(next);
        }
    }

    /// Terminal transitions since the last call
    pub(crate) fn take_outcomes(&mut self) -> Vec<DragOutcome> {
        std::mem::take(&mut self.outcomes)
    }

    fn active_ids(&self) -> Vec<DragId> {
        self.drags
            .iter()
            .filter(|(_, drag)| !drag.state().is_terminal())
            .map(|(id, _)| id)
            .collect()
    }

    fn finish(&mut self, id: DragId, state: DragState, delivered: bool) {
        let drag = &mut self.drags[id];
        drag.finish(state, self.epoch);
        log::debug!("Drag {:?} finished as {:?}", id, state);
        self.outcomes.push(DragOutcome {
            drag: id,
            source: drag.source(),
            state,
            delivered,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_id() -> WindowId {
        let mut ids: SlotMap<WindowId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    fn start_id_drag(manager: &mut DragManager, source: WindowId) -> AnchorResult<DragId> {
        manager.start(source, 0, DragKind::Id, None, 0.0, DragFlags::default(), (10, 10))
    }

    #[test]
    fn test_one_running_drag_per_source() {
        let mut manager = DragManager::new();
        let source = window_id();
        let first = start_id_drag(&mut manager, source).unwrap();
        assert_eq!(start_id_drag(&mut manager, source), Err(AnchorError::DragInProgress));

        manager.cancel(first).unwrap();
        assert!(start_id_drag(&mut manager, source).is_ok());
    }

    #[test]
    fn test_cancel_reports_once() {
        let mut manager = DragManager::new();
        let id = start_id_drag(&mut manager, window_id()).unwrap();
        manager.cancel(id).unwrap();
        manager.cancel(id).unwrap();

        let outcomes = manager.take_outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].state, DragState::Cancelled);
        assert!(!outcomes[0].delivered);
        assert!(manager.take_outcomes().is_empty());
    }

    #[test]
    fn test_lost_source_cancels_on_update() {
        let mut manager = DragManager::new();
        let id = start_id_drag(&mut manager, window_id()).unwrap();
        let windows: SlotMap<WindowId, AnchorWindow> = SlotMap::with_key();

        manager.begin_tick();
        manager.update(&windows);
        let drag = manager.get(id).unwrap();
        assert_eq!(drag.state(), DragState::Cancelled);
        assert!(drag.is_payload_freed());
    }

    #[test]
    fn test_finished_drags_survive_one_more_tick() {
        let mut manager = DragManager::new();
        let id = start_id_drag(&mut manager, window_id()).unwrap();
        manager.cancel(id).unwrap();

        manager.begin_tick();
        assert!(manager.get(id).is_some());
        manager.begin_tick();
        assert!(manager.get(id).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_motion_hovers_target() {
        let mut manager = DragManager::new();
        let source = window_id();
        let id = start_id_drag(&mut manager, source).unwrap();
        manager.motion(source, 42, 7);

        let drag = manager.get(id).unwrap();
        assert_eq!(drag.state(), DragState::Hovering(source));
        assert_eq!(drag.position(), (42, 7));
    }

    #[test]
    fn test_escape_respects_flag() {
        let mut ids: SlotMap<WindowId, ()> = SlotMap::with_key();
        let (first, second) = (ids.insert(()), ids.insert(()));
        let mut manager = DragManager::new();
        let sticky = manager
            .start(first, 0, DragKind::Value, None, 1.0, DragFlags::COPY, (0, 0))
            .unwrap();
        let cancellable = start_id_drag(&mut manager, second).unwrap();

        manager.escape();
        assert_eq!(manager.get(sticky).unwrap().state(), DragState::Started);
        assert_eq!(manager.get(cancellable).unwrap().state(), DragState::Cancelled);
        assert_eq!(manager.active_count(), 1);
    }
}
