//! Drag sessions and their payloads
//!
//! A [`Drag`] carries an ordered list of [`DragItem`]s from a source window
//! to a drop target. The payload is released exactly once: either when the
//! drag reaches a terminal state or when it is passed to [`free`] /
//! [`free_list`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::anchor::types::WindowId;
use crate::error::{AnchorError, AnchorResult};

use super::path::validate_prim_path;

bitflags::bitflags! {
    /// Drag behavior flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DragFlags: u32 {
        /// Drop copies the payload
        const COPY = 1 << 0;
        /// Drop moves the payload
        const MOVE = 1 << 1;
        /// Drop links the payload
        const LINK = 1 << 2;
        /// Escape cancels the drag
        const AUTO_CANCEL_ON_ESCAPE = 1 << 3;
    }
}

impl Default for DragFlags {
    fn default() -> Self {
        Self::AUTO_CANCEL_ON_ESCAPE
    }
}

/// What a drag carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKind {
    /// Scene prims by path
    Id,
    /// Files from disk
    Path,
    /// A numeric value
    Value,
    /// Application-defined data
    Custom,
}

/// Opaque application payload
pub struct CustomPayload(Box<dyn Any>);

impl CustomPayload {
    /// Wrap any value
    pub fn new<T: Any>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for CustomPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPayload(..)")
    }
}

/// One element of a drag payload
#[derive(Debug)]
pub enum DragItem {
    /// A prim of the open stage
    LocalId {
        /// Prim path
        path: String,
        /// Path of the prim it was dragged out of, empty if none
        from_parent: String,
    },
    /// A file outside the stage
    ExternalPath(String),
    /// A plain number
    Value(f64),
    /// Application-defined data
    Custom(CustomPayload),
}

impl DragItem {
    /// Kind of drag this item belongs in
    pub fn kind(&self) -> DragKind {
        match self {
            Self::LocalId { .. } => DragKind::Id,
            Self::ExternalPath(_) => DragKind::Path,
            Self::Value(_) => DragKind::Value,
            Self::Custom(_) => DragKind::Custom,
        }
    }
}

/// Lifecycle of a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragState {
    /// Created, not over any window yet
    Started,
    /// Over a window whose acceptance has not been probed
    Hovering(WindowId),
    /// Over a window that would accept a drop
    Acceptable(WindowId),
    /// Over a window that refuses the drop
    Rejected(WindowId),
    /// Terminal: aborted
    Cancelled,
    /// Terminal: dropped on a window
    Dropped(WindowId),
}

impl DragState {
    /// Whether the drag is over
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Dropped(_))
    }

    /// Window the pointer is over, if any
    pub fn target(self) -> Option<WindowId> {
        match self {
            Self::Hovering(id) | Self::Acceptable(id) | Self::Rejected(id) | Self::Dropped(id) => Some(id),
            Self::Started | Self::Cancelled => None,
        }
    }
}

/// A drag session
#[derive(Debug)]
pub struct Drag {
    source: WindowId,
    icon: i32,
    kind: DragKind,
    items: Vec<DragItem>,
    start_value: f64,
    flags: DragFlags,
    state: DragState,
    position: (i32, i32),
    payload_freed: bool,
    finished_epoch: Option<u64>,
}

impl Drag {
    /// New drag from `source`
    ///
    /// A non-empty initial `payload` must match `kind`; LocalId paths are
    /// validated.
    pub fn new(
        source: WindowId,
        icon: i32,
        kind: DragKind,
        payload: Option<DragItem>,
        start_value: f64,
        flags: DragFlags,
    ) -> AnchorResult<Self> {
        let mut drag = Self {
            source,
            icon,
            kind,
            items: Vec::new(),
            start_value,
            flags,
            state: DragState::Started,
            position: (0, 0),
            payload_freed: false,
            finished_epoch: None,
        };
        if let Some(item) = payload {
            drag.push_item(item)?;
        }
        Ok(drag)
    }

    /// Window the drag started in
    pub fn source(&self) -> WindowId {
        self.source
    }

    /// Icon hint for the drag image
    pub fn icon(&self) -> i32 {
        self.icon
    }

    /// Payload kind
    pub fn kind(&self) -> DragKind {
        self.kind
    }

    /// Payload items in insertion order
    pub fn items(&self) -> &[DragItem] {
        &self.items
    }

    /// Value at the start of a value drag
    pub fn start_value(&self) -> f64 {
        self.start_value
    }

    /// Behavior flags
    pub fn flags(&self) -> DragFlags {
        self.flags
    }

    /// Lifecycle state
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Last pointer position seen by the drag
    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Whether the payload has been released
    pub fn is_payload_freed(&self) -> bool {
        self.payload_freed
    }

    /// Append an item of the drag's kind
    pub fn push_item(&mut self, item: DragItem) -> AnchorResult<()> {
        if self.payload_freed {
            return Err(AnchorError::InvalidState("drag payload was already freed".to_string()));
        }
        if item.kind() != self.kind {
            return Err(AnchorError::InvalidArgument(format!(
                "{:?} item in a {:?} drag",
                item.kind(),
                self.kind
            )));
        }
        if let DragItem::LocalId { path, from_parent } = item {
            return self.add_local_id(&path, &from_parent);
        }
        self.items.push(item);
        Ok(())
    }

    /// Append a prim to an Id drag
    ///
    /// Adding a path already in the drag does not duplicate it; an empty
    /// `from_parent` on the existing item is filled in instead.
    pub fn add_local_id(&mut self, path: &str, from_parent: &str) -> AnchorResult<()> {
        if self.payload_freed {
            return Err(AnchorError::InvalidState("drag payload was already freed".to_string()));
        }
        if self.kind != DragKind::Id {
            return Err(AnchorError::InvalidArgument(format!("local ID in a {:?} drag", self.kind)));
        }
        validate_prim_path(path, "path")?;
        if !from_parent.is_empty() {
            validate_prim_path(from_parent, "from_parent")?;
        }

        for item in &mut self.items {
            if let DragItem::LocalId { path: existing, from_parent: existing_parent } = item {
                if existing == path {
                    if existing_parent.is_empty() {
                        *existing_parent = from_parent.to_string();
                    }
                    return Ok(());
                }
            }
        }

        self.items.push(DragItem::LocalId {
            path: path.to_string(),
            from_parent: from_parent.to_string(),
        });
        Ok(())
    }

    /// Paths of all LocalId items
    pub fn local_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            DragItem::LocalId { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32) {
        self.position = (x, y);
    }

    pub(crate) fn set_state(&mut self, state: DragState) {
        debug_assert!(!self.state.is_terminal(), "terminal drag state changed");
        self.state = state;
    }

    /// Move to a terminal state and release the payload
    pub(crate) fn finish(&mut self, state: DragState, epoch: u64) {
        debug_assert!(state.is_terminal());
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
        self.finished_epoch = Some(epoch);
        if panic::catch_unwind(AssertUnwindSafe(|| self.free_payload())).is_err() {
            log::error!("Drag payload destructor panicked while finishing as {:?}", state);
        }
    }

    pub(crate) fn finished_epoch(&self) -> Option<u64> {
        self.finished_epoch
    }

    /// Release every payload item; later calls release nothing
    ///
    /// Returns how many items were released.
    pub fn free_payload(&mut self) -> usize {
        if self.payload_freed {
            return 0;
        }
        self.payload_freed = true;
        let items = std::mem::take(&mut self.items);
        let count = items.len();
        drop(items);
        count
    }
}

/// Release a drag and its payload; `None` is a no-op
pub fn free(drag: Option<Drag>) -> usize {
    match drag {
        Some(mut drag) => drag.free_payload(),
        None => 0,
    }
}

/// Release every drag in `drags`
///
/// A payload destructor that panics does not stop the others from being
/// released. Returns how many drags were released cleanly.
pub fn free_list(drags: impl IntoIterator<Item = Drag>) -> usize {
    let mut freed = 0;
    for drag in drags {
        match panic::catch_unwind(AssertUnwindSafe(move || free(Some(drag)))) {
            Ok(_) => freed += 1,
            Err(_) => log::error!("Drag payload destructor panicked while freeing a drag list"),
        }
    }
    freed
}
