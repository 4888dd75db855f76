use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::ClusterForest;
use crate::domain::error::DomainResult;
use crate::domain::node::{ClusterNode, NodeId};
use crate::domain::store::ClusterTreeStore;

pub trait TreeRender {
    /// Visible part of the hierarchy as a text tree under a synthetic root.
    fn to_tree_string(&self) -> DomainResult<Tree<String>>;
}

impl TreeRender for ClusterTreeStore {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> DomainResult<Tree<String>> {
        let forest = ClusterForest::from_nodes(self.nodes())?;
        let by_id: HashMap<NodeId, &ClusterNode> = self.nodes().iter().map(|n| (n.id, n)).collect();

        fn build_tree(
            forest: &ClusterForest,
            by_id: &HashMap<NodeId, &ClusterNode>,
            node_idx: Index,
        ) -> Option<Tree<String>> {
            let entry = forest.get_node(node_idx)?;
            let node = by_id.get(&entry.id)?;
            if !node.expanded {
                return None;
            }

            let mut tree = Tree::new(format!("{} [{}]", node.label, node.id.short()));
            let mut hidden = 0;
            for &child_idx in &entry.children {
                match build_tree(forest, by_id, child_idx) {
                    Some(child) => {
                        tree.push(child);
                    }
                    None => hidden += 1,
                }
            }
            if hidden > 0 {
                tree.push(Tree::new(format!("[+{hidden} hidden]")));
            }
            Some(tree)
        }

        let leaves: Vec<Tree<String>> = forest
            .roots()
            .iter()
            .filter_map(|&root| build_tree(&forest, &by_id, root))
            .collect();

        if leaves.is_empty() {
            return Ok(Tree::new("(no clusters)".to_string()));
        }
        Ok(Tree::new("clusters".to_string()).with_leaves(leaves))
    }
}
