//! Data structures for layout computation.

use crate::model::SchemaModel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Direction in which ranks advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RankDir {
    #[default]
    Lr,
    Tb,
    Rl,
    Bt,
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RankDir::Lr => "LR",
            RankDir::Tb => "TB",
            RankDir::Rl => "RL",
            RankDir::Bt => "BT",
        };
        f.write_str(s)
    }
}

impl FromStr for RankDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR" => Ok(RankDir::Lr),
            "TB" => Ok(RankDir::Tb),
            "RL" => Ok(RankDir::Rl),
            "BT" => Ok(RankDir::Bt),
            _ => Err(format!("unknown rank direction `{s}` (expected LR, TB, RL or BT)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Table,
    Enum,
}

/// A table or enum box; `rows` is its column or value count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub kind: NodeKind,
    pub rows: usize,
}

/// Foreign key from the referencing table to the referenced one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
}

/// Input graph for the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    /// One node per table and enum type, one edge per foreign key.
    ///
    /// Names are node ids, so a repeated table keeps its first declaration
    /// and an enum sharing a table's name gets no node of its own.
    pub fn from_model(model: &SchemaModel) -> Self {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut nodes = Vec::new();

        for table in &model.tables {
            if !seen.insert(&table.name) {
                continue;
            }
            nodes.push(LayoutNode {
                id: table.name.clone(),
                kind: NodeKind::Table,
                rows: table.columns.len(),
            });
        }
        for enum_type in &model.enums {
            if !seen.insert(&enum_type.name) {
                log::debug!("enum `{}` shares a name with another node; skipped", enum_type.name);
                continue;
            }
            nodes.push(LayoutNode {
                id: enum_type.name.clone(),
                kind: NodeKind::Enum,
                rows: enum_type.values.len(),
            });
        }

        let edges = model
            .tables
            .iter()
            .flat_map(|table| {
                table.foreign_keys.iter().map(move |fk| LayoutEdge {
                    source: table.name.clone(),
                    target: fk.referenced_table.clone(),
                })
            })
            .collect();

        LayoutGraph { nodes, edges }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Top-left corner and size of a placed node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bounding box of one group in grouped mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub members: Vec<String>,
}

/// The complete layout result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub groups: Vec<GroupLayout>,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-left corners, suitable for passing back as overrides.
    pub fn positions(&self) -> BTreeMap<String, Point> {
        self.nodes
            .iter()
            .map(|(id, n)| (id.clone(), Point::new(n.x, n.y)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, DataType, EnumType, ForeignKey, Table};

    #[test]
    fn test_rank_dir_parse_and_display() {
        assert_eq!("lr".parse::<RankDir>(), Ok(RankDir::Lr));
        assert_eq!("BT".parse::<RankDir>(), Ok(RankDir::Bt));
        assert!("up".parse::<RankDir>().is_err());
        assert_eq!(RankDir::Tb.to_string(), "TB");
        assert_eq!(serde_json::to_string(&RankDir::Rl).unwrap(), "\"RL\"");
    }

    #[test]
    fn test_graph_from_model() {
        let mut users = Table::new("users", "users.sql");
        users.columns.push(Column::new("id", DataType::new("INT")));
        let mut orders = Table::new("orders", "orders.sql");
        orders.foreign_keys.push(ForeignKey {
            constraint_name: None,
            columns: vec!["user_id".into()],
            referenced_table: "users".into(),
            referenced_columns: vec!["id".into()],
            on_delete: None,
            on_update: None,
        });
        let model = SchemaModel {
            tables: vec![users, orders],
            enums: vec![
                EnumType {
                    name: "status".into(),
                    values: vec!["a".into(), "b".into()],
                    source_file: "types.sql".into(),
                },
                EnumType {
                    name: "users".into(),
                    values: vec![],
                    source_file: "types.sql".into(),
                },
            ],
            sequences: vec![],
        };

        let graph = LayoutGraph::from_model(&model);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["users", "orders", "status"]);
        assert_eq!(graph.nodes[0].rows, 1);
        assert_eq!(graph.nodes[2].kind, NodeKind::Enum);
        assert_eq!(graph.nodes[2].rows, 2);
        assert_eq!(
            graph.edges,
            vec![LayoutEdge {
                source: "orders".into(),
                target: "users".into()
            }]
        );
    }
}
