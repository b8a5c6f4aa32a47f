//! Layered auto-layout of the schema graph.
//!
//! Cycles are broken by reversing a greedy feedback arc set, ranks come from
//! longest paths, long edges get virtual nodes, barycenter sweeps reduce
//! crossings, and coordinates are packed per rank before being mapped to the
//! requested [`RankDir`].

mod engine;
mod grouped;
mod layered;
mod order;
mod position;
mod rank;
mod types;

pub use engine::{LayoutConfig, LayoutEngine};
pub use grouped::group_by_folder;
pub use types::{
    GroupLayout, Layout, LayoutEdge, LayoutGraph, LayoutNode, NodeKind, NodeLayout, Point, RankDir,
};
