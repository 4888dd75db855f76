//! Cluster tree store: labeled circular nodes arranged in a parent/child
//! forest, with cascade delete, expand/collapse visibility and linear
//! undo/redo over snapshots of the node list.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{ClusterEvent, Outcome, Session};
pub use domain::{ClusterNode, ClusterTreeStore, Color, NodeId, Position, StoreOptions};
