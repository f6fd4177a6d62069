//! Pointer drag bookkeeping for moving a scope along the hill.
//!
//! 1) [`DragSession::start`] with the scope id under the pointer.
//! 2) On each move, [`DragSession::move_to`] converts the pointer's chart X into a position via
//!    [`HillCurve::normalize`] and forwards it to [`Store::update_scope`].
//! 3) [`DragSession::end`] on release. A debounced persist scheduled by the last move still
//!    fires on the store's next poll.

use crate::clock::Clock;
use crate::curve::HillCurve;
use crate::location::Location;
use crate::model::ScopePatch;
use crate::store::Store;

/// At most one scope is dragged at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    active: Option<String>,
}

impl DragSession {
    /// Starts dragging `scope_id`. Ignored (returns `false`) while another drag is active.
    pub fn start(&mut self, scope_id: impl Into<String>) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(scope_id.into());
        true
    }

    /// Moves the active scope to the position under `chart_x`.
    ///
    /// Returns the normalized position written, or `None` when no drag is active.
    pub fn move_to<L: Location, C: Clock>(
        &self,
        store: &mut Store<L, C>,
        curve: &HillCurve,
        chart_x: f64,
        width: f64,
    ) -> Option<f64> {
        let id = self.active.as_deref()?;
        let position = curve.normalize(chart_x, width);
        store.update_scope(id, ScopePatch::position(position));
        Some(position)
    }

    /// Ends the drag, returning the id that was being dragged.
    pub fn end(&mut self) -> Option<String> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}
