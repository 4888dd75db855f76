//! The authoritative cluster list and its edit history.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::color::Color;
use crate::domain::history::HistoryStack;
use crate::domain::node::{ClusterNode, NodeId, Position};

/// Which mutations produce an undo snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Only create and delete are undoable.
    #[default]
    Structural,
    /// Color, label, position and expand edits are undoable too.
    AllEdits,
}

/// Where a new root node lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootPlacement {
    /// Centered in a viewport of the given size.
    Center { width: f64, height: f64 },
    /// Scattered around `origin` by up to `radius` on each axis.
    Scatter { origin: Position, radius: f64 },
}

/// Creation-time layout and styling rules.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Child placement relative to its parent, applied on both axes.
    pub child_offset: f64,
    /// Lightness added to a child's color, relative to the parent.
    pub lighten_step: f64,
    /// Child size = parent size * shrink_factor, floored at `min_size`.
    pub shrink_factor: f64,
    pub min_size: f64,
    pub root_placement: RootPlacement,
    pub history_policy: HistoryPolicy,
    /// Maximum number of retained snapshots; `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            child_offset: 100.0,
            lighten_step: 0.1,
            shrink_factor: 0.9,
            min_size: 20.0,
            root_placement: RootPlacement::Center {
                width: 400.0,
                height: 800.0,
            },
            history_policy: HistoryPolicy::Structural,
            history_limit: Some(256),
        }
    }
}

/// A drawable parent→child connection between two visible nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub parent: NodeId,
    pub child: NodeId,
}

/// Owns the node list (insertion order) and its undo/redo history.
///
/// Every operation is total: unknown ids, empty labels and history
/// boundaries are no-ops that report `false`/`None`.
#[derive(Debug, Clone)]
pub struct ClusterTreeStore {
    nodes: Vec<ClusterNode>,
    history: HistoryStack<Vec<ClusterNode>>,
    options: StoreOptions,
}

impl Default for ClusterTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterTreeStore {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        let mut history = HistoryStack::new(Vec::new());
        if let Some(limit) = options.history_limit {
            history = history.with_limit(limit);
        }
        Self {
            nodes: Vec::new(),
            history,
            options,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Create a node and record a snapshot.
    ///
    /// A child of an existing `parent` is placed at the parent's position plus
    /// the child offset, takes a lightened parent color and a shrunken parent
    /// size; `color` and `size` are then ignored. A root (or a child whose
    /// parent no longer exists) uses the caller's color and size.
    #[instrument(level = "debug", skip(self))]
    pub fn create(
        &mut self,
        label: &str,
        color: Color,
        size: f64,
        parent: Option<NodeId>,
    ) -> Option<&ClusterNode> {
        let label = label.trim();
        if label.is_empty() {
            debug!("create: empty label ignored");
            return None;
        }

        let id = NodeId::new();
        let parent_node = parent.and_then(|p| self.get(p));
        let node = match parent_node {
            Some(p) => ClusterNode {
                id,
                label: label.to_string(),
                color: p.color.lighten(self.options.lighten_step),
                size: (p.size * self.options.shrink_factor).max(self.options.min_size),
                position: p.position
                    + Position::new(self.options.child_offset, self.options.child_offset),
                parent_id: Some(p.id),
                expanded: true,
            },
            None => {
                if let Some(p) = parent {
                    debug!(parent = %p, "create: unknown parent, creating root");
                }
                ClusterNode {
                    id,
                    label: label.to_string(),
                    color,
                    size,
                    position: self.root_position(&id, size),
                    parent_id: None,
                    expanded: true,
                }
            }
        };

        debug!(id = %node.id, label = %node.label, parent = ?node.parent_id, "create");
        self.nodes.push(node);
        self.snapshot();
        self.nodes.last()
    }

    /// Remove `id` together with all its transitive descendants in one step.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: NodeId) -> bool {
        let doomed = self.subtree(id);
        let before = self.nodes.len();
        self.nodes.retain(|n| !doomed.contains(&n.id));
        let removed = before - self.nodes.len();
        debug!(removed, "delete");
        if removed == 0 {
            return false;
        }
        self.snapshot();
        true
    }

    #[instrument(level = "debug", skip(self))]
    pub fn update_color(&mut self, id: NodeId, color: Color) -> bool {
        self.edit(id, |n| n.color = color)
    }

    /// Labels are stored trimmed; a blank label is ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn update_label(&mut self, id: NodeId, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            debug!("update_label: empty label ignored");
            return false;
        }
        self.edit(id, |n| n.label = label.to_string())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn update_position(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        self.edit(id, |n| n.position = Position::new(x, y))
    }

    /// Flip the `expanded` flag of the immediate children of `id`.
    ///
    /// If every child is currently collapsed they all expand; otherwise they
    /// all collapse. The target's own flag is untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_expand(&mut self, id: NodeId) -> bool {
        let children: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent_id == Some(id))
            .map(|(i, _)| i)
            .collect();
        if children.is_empty() {
            return false;
        }

        let all_hidden = children.iter().all(|&i| !self.nodes[i].expanded);
        for &i in &children {
            self.nodes[i].expanded = all_hidden;
        }
        debug!(children = children.len(), expanded = all_hidden, "toggle_expand");

        if self.options.history_policy == HistoryPolicy::AllEdits {
            self.snapshot();
        }
        true
    }

    #[instrument(level = "debug", skip(self))]
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.nodes = snapshot.clone();
                debug!(index = self.history.index(), "undo");
                true
            }
            None => false,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.nodes = snapshot.clone();
                debug!(index = self.history.index(), "redo");
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[ClusterNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&ClusterNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Immediate children of `id`, in insertion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ClusterNode> {
        self.nodes.iter().filter(move |n| n.parent_id == Some(id))
    }

    /// `id` plus every transitive descendant.
    ///
    /// Accumulates over parent back-references until no new node joins, so
    /// the result does not depend on list order.
    pub fn subtree(&self, id: NodeId) -> HashSet<NodeId> {
        let mut members = HashSet::from([id]);
        loop {
            let before = members.len();
            for node in &self.nodes {
                if let Some(parent) = node.parent_id {
                    if members.contains(&parent) {
                        members.insert(node.id);
                    }
                }
            }
            if members.len() == before {
                break;
            }
        }
        trace!(size = members.len(), "subtree");
        members
    }

    /// A node is visible iff it and every ancestor have `expanded` set.
    ///
    /// Unknown ids are not visible. The walk is bounded by the node count,
    /// so a corrupted cyclic chain reports `false` instead of spinning.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let index: HashMap<NodeId, &ClusterNode> = self.nodes.iter().map(|n| (n.id, n)).collect();
        Self::visible_in(&index, id)
    }

    /// Nodes to hand to the renderer, in insertion order.
    pub fn visible_nodes(&self) -> Vec<&ClusterNode> {
        let index: HashMap<NodeId, &ClusterNode> = self.nodes.iter().map(|n| (n.id, n)).collect();
        self.nodes
            .iter()
            .filter(|n| Self::visible_in(&index, n.id))
            .collect()
    }

    /// Parent→child connections whose endpoints are both visible.
    pub fn visible_links(&self) -> Vec<Link> {
        let index: HashMap<NodeId, &ClusterNode> = self.nodes.iter().map(|n| (n.id, n)).collect();
        self.nodes
            .iter()
            .filter_map(|n| n.parent_id.map(|p| Link { parent: p, child: n.id }))
            .filter(|link| {
                Self::visible_in(&index, link.child) && Self::visible_in(&index, link.parent)
            })
            .collect()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn visible_in(index: &HashMap<NodeId, &ClusterNode>, id: NodeId) -> bool {
        let mut current = index.get(&id).copied();
        let mut steps = 0;
        while let Some(node) = current {
            if !node.expanded || steps > index.len() {
                return false;
            }
            steps += 1;
            current = node.parent_id.and_then(|p| index.get(&p).copied());
        }
        steps > 0
    }

    fn edit(&mut self, id: NodeId, apply: impl FnOnce(&mut ClusterNode)) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            trace!(%id, "edit: unknown id");
            return false;
        };
        let before = node.clone();
        apply(&mut *node);
        if *node == before {
            trace!(%id, "edit: unchanged");
            return false;
        }
        if self.options.history_policy == HistoryPolicy::AllEdits {
            self.snapshot();
        }
        true
    }

    fn snapshot(&mut self) {
        self.history.record(self.nodes.clone());
    }

    fn root_position(&self, id: &NodeId, size: f64) -> Position {
        match self.options.root_placement {
            RootPlacement::Center { width, height } => {
                Position::new((width - size) / 2.0, (height - size) / 2.0)
            }
            RootPlacement::Scatter { origin, radius } => {
                // v4 ids are random; reuse their bytes as the jitter source
                let bytes = id.as_bytes();
                let jitter = |b: u8| (f64::from(b) / 255.0 * 2.0 - 1.0) * radius;
                origin + Position::new(jitter(bytes[0]), jitter(bytes[1]))
            }
        }
    }
}
