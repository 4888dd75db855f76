use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{ClusterNode, NodeId};

/// Forest node in the arena-based index.
#[derive(Debug)]
pub struct ForestNode {
    /// Cluster this entry indexes
    pub id: NodeId,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Derived parent→children index over a flat cluster list.
///
/// The node list stays authoritative; this is rebuilt on demand whenever a
/// caller needs top-down traversal. Parents that do not resolve are treated
/// as roots.
#[derive(Debug, Default)]
pub struct ClusterForest {
    arena: Arena<ForestNode>,
    roots: Vec<Index>,
    by_id: HashMap<NodeId, Index>,
}

impl ClusterForest {
    /// Index `nodes`, rejecting parent chains that loop.
    #[instrument(level = "debug", skip(nodes), fields(count = nodes.len()))]
    pub fn from_nodes(nodes: &[ClusterNode]) -> DomainResult<Self> {
        let mut forest = Self::default();

        for node in nodes {
            let idx = forest.arena.insert(ForestNode {
                id: node.id,
                parent: None,
                children: Vec::new(),
            });
            forest.by_id.insert(node.id, idx);
        }

        for node in nodes {
            let idx = forest.by_id[&node.id];
            match node.parent_id.and_then(|p| forest.by_id.get(&p).copied()) {
                Some(parent_idx) => {
                    if let Some(entry) = forest.arena.get_mut(idx) {
                        entry.parent = Some(parent_idx);
                    }
                    if let Some(parent) = forest.arena.get_mut(parent_idx) {
                        parent.children.push(idx);
                    }
                }
                None => forest.roots.push(idx),
            }
        }

        // Anything unreachable from a root sits on a parent cycle
        let reachable: HashSet<NodeId> = forest.iter().map(|(_, n)| n.id).collect();
        if let Some(stray) = nodes.iter().find(|n| !reachable.contains(&n.id)) {
            return Err(DomainError::CycleDetected(stray.id));
        }

        Ok(forest)
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn index_of(&self, id: NodeId) -> Option<Index> {
        self.by_id.get(&id).copied()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over every tree, roots in insertion order.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self, self.roots.clone())
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn iter_from(&self, id: NodeId) -> ForestIterator<'_> {
        ForestIterator::new(self, self.index_of(id).into_iter().collect())
    }

    /// Number of levels in the deepest tree; 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of nodes without children, in traversal order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id)
            .collect()
    }
}

pub struct ForestIterator<'a> {
    forest: &'a ClusterForest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a ClusterForest, mut start: Vec<Index>) -> Self {
        start.reverse();
        Self {
            forest,
            stack: start,
        }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
