//! Domain layer: the cluster model and its history
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod color;
pub mod drag;
pub mod error;
pub mod history;
pub mod node;
pub mod store;
pub mod tree_traits;

pub use arena::{ClusterForest, ForestNode};
pub use color::Color;
pub use drag::DragSession;
pub use error::{DomainError, DomainResult};
pub use history::HistoryStack;
pub use node::{ClusterNode, NodeId, Position};
pub use store::{ClusterTreeStore, HistoryPolicy, Link, RootPlacement, StoreOptions};
pub use tree_traits::TreeRender;
