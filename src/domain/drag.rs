//! Transient drag state, kept apart from the committed store position.

use tracing::debug;

use crate::domain::node::{ClusterNode, NodeId, Position};
use crate::domain::store::ClusterTreeStore;

/// One in-progress drag gesture.
///
/// The store only learns about the drag on [`DragSession::commit`];
/// dropping the session abandons it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    node: NodeId,
    start: Position,
    translation: Position,
}

impl DragSession {
    pub fn begin(node: &ClusterNode) -> Self {
        Self {
            node: node.id,
            start: node.position,
            translation: Position::default(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Set the cumulative gesture translation; returns the live position.
    pub fn update(&mut self, dx: f64, dy: f64) -> Position {
        self.translation = Position::new(dx, dy);
        self.live_position()
    }

    pub fn live_position(&self) -> Position {
        self.start + self.translation
    }

    /// Write the final position into the store. False if the node is gone.
    pub fn commit(self, store: &mut ClusterTreeStore) -> bool {
        let end = self.live_position();
        debug!(node = %self.node, from = %self.start, to = %end, "drag commit");
        store.update_position(self.node, end.x, end.y)
    }
}
