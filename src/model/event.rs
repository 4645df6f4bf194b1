//! Structural change notifications sent to the display layer

use super::ModelIndex;

/// Notification emitted by the model.
///
/// Row ranges are inclusive. "About to" events are emitted before the tree
/// changes shape and their counterparts after, so a listener keeping an
/// index cache can stay consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    RowsAboutToBeRemoved {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsAboutToBeInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    DataChanged {
        top_left: ModelIndex,
        bottom_right: ModelIndex,
    },
    LayoutAboutToBeChanged,
    LayoutChanged,
}

/// Receiver of model notifications
pub trait ModelListener {
    fn on_event(&mut self, event: &ModelEvent);
}

impl<F> ModelListener for F
where
    F: FnMut(&ModelEvent),
{
    fn on_event(&mut self, event: &ModelEvent) {
        self(event)
    }
}
