//! Layout engine configuration and entry points.

use crate::measure::NodeMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::grouped::{GroupFrame, layout_groups};
use super::layered::{Boxed, Placed, Spacing, layout_boxes};
use super::types::{GroupLayout, Layout, LayoutGraph, NodeLayout, Point, RankDir};

/// Spacing, node geometry and mode of the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rank_dir: RankDir,
    pub node_sep: f64,
    pub rank_sep: f64,
    pub margin: f64,
    pub table_width: f64,
    pub enum_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub padding: f64,
    pub group_padding: f64,
    pub group_header: f64,
    /// Lay out by folder groups instead of one flat graph.
    pub grouped: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_dir: RankDir::Lr,
            node_sep: 40.0,
            rank_sep: 80.0,
            margin: 20.0,
            table_width: 240.0,
            enum_width: 180.0,
            header_height: 32.0,
            row_height: 24.0,
            padding: 12.0,
            group_padding: 16.0,
            group_header: 28.0,
            grouped: false,
        }
    }
}

impl LayoutConfig {
    pub fn metrics(&self) -> NodeMetrics {
        NodeMetrics {
            header_height: self.header_height,
            row_height: self.row_height,
            padding: self.padding,
            table_width: self.table_width,
            enum_width: self.enum_width,
        }
    }

    fn spacing(&self) -> Spacing {
        Spacing {
            rank_dir: self.rank_dir,
            node_sep: self.node_sep,
            rank_sep: self.rank_sep,
            margin: self.margin,
        }
    }

    fn frame(&self) -> GroupFrame {
        GroupFrame {
            padding: self.group_padding,
            header: self.group_header,
        }
    }
}

/// Layered layout of schema graphs.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Flat layout of every node.
    ///
    /// `overrides` is used verbatim when it positions every node of `graph`.
    pub fn layout(&self, graph: &LayoutGraph, overrides: Option<&BTreeMap<String, Point>>) -> Layout {
        if graph.nodes.is_empty() {
            return Layout::default();
        }
        let boxes = self.boxes(graph);
        if let Some(layout) = overrides.and_then(|o| self.apply_overrides(&boxes, o, None)) {
            return layout;
        }

        let placed = layout_boxes(&boxes, &edges(graph), &self.config.spacing());
        into_layout(placed, Vec::new())
    }

    /// Grouped layout; nodes missing from `groups` share the empty group.
    pub fn layout_grouped(
        &self,
        graph: &LayoutGraph,
        groups: &BTreeMap<String, String>,
        overrides: Option<&BTreeMap<String, Point>>,
    ) -> Layout {
        if graph.nodes.is_empty() {
            return Layout::default();
        }
        let boxes = self.boxes(graph);
        if let Some(layout) = overrides.and_then(|o| self.apply_overrides(&boxes, o, Some(groups))) {
            return layout;
        }

        let (placed, frames) = layout_groups(
            &boxes,
            &edges(graph),
            groups,
            &self.config.spacing(),
            self.config.frame(),
        );
        into_layout(placed, frames)
    }

    fn boxes(&self, graph: &LayoutGraph) -> Vec<Boxed> {
        let metrics = self.config.metrics();
        graph
            .nodes
            .iter()
            .map(|node| {
                let (width, height) = metrics.node_size(node.kind, node.rows);
                Boxed {
                    id: node.id.clone(),
                    width,
                    height,
                }
            })
            .collect()
    }

    fn apply_overrides(
        &self,
        boxes: &[Boxed],
        overrides: &BTreeMap<String, Point>,
        groups: Option<&BTreeMap<String, String>>,
    ) -> Option<Layout> {
        let mut nodes = BTreeMap::new();
        for b in boxes {
            let Some(point) = overrides.get(&b.id) else {
                log::debug!("no override for `{}`; recomputing layout", b.id);
                return None;
            };
            nodes.insert(
                b.id.clone(),
                NodeLayout {
                    x: point.x,
                    y: point.y,
                    width: b.width,
                    height: b.height,
                },
            );
        }

        let margin = self.config.margin;
        let width = nodes.values().map(|n| n.x + n.width).fold(0.0, f64::max) + margin;
        let height = nodes.values().map(|n| n.y + n.height).fold(0.0, f64::max) + margin;
        let frames = match groups {
            Some(groups) => self.frames_around(&nodes, groups),
            None => Vec::new(),
        };
        Some(Layout {
            nodes,
            groups: frames,
            width,
            height,
        })
    }

    /// Group boxes enclosing already positioned members.
    fn frames_around(
        &self,
        nodes: &BTreeMap<String, NodeLayout>,
        groups: &BTreeMap<String, String>,
    ) -> Vec<GroupLayout> {
        let mut members: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for id in nodes.keys() {
            let key = groups.get(id).map(String::as_str).unwrap_or("");
            members.entry(key).or_default().push(id);
        }

        let pad = self.config.group_padding;
        let header = self.config.group_header;
        members
            .into_iter()
            .map(|(name, ids)| {
                let boxes: Vec<&NodeLayout> = ids.iter().filter_map(|id| nodes.get(*id)).collect();
                let left = boxes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
                let top = boxes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
                let right = boxes.iter().map(|n| n.x + n.width).fold(f64::NEG_INFINITY, f64::max);
                let bottom = boxes.iter().map(|n| n.y + n.height).fold(f64::NEG_INFINITY, f64::max);
                GroupLayout {
                    name: name.to_string(),
                    x: left - pad,
                    y: top - header - pad,
                    width: right - left + 2.0 * pad,
                    height: bottom - top + header + 2.0 * pad,
                    members: ids.into_iter().map(str::to_string).collect(),
                }
            })
            .collect()
    }
}

fn edges(graph: &LayoutGraph) -> Vec<(String, String)> {
    graph
        .edges
        .iter()
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect()
}

fn into_layout(placed: Placed, groups: Vec<GroupLayout>) -> Layout {
    Layout {
        nodes: placed.nodes,
        groups,
        width: placed.width,
        height: placed.height,
    }
}
