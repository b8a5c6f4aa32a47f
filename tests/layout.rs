use ddlgraph::layout::{
    Layout, LayoutConfig, LayoutEngine, LayoutGraph, Point, RankDir, group_by_folder,
};
use ddlgraph::{ParserKind, Pipeline, SchemaModel, SourceFile};
use std::collections::BTreeMap;

fn model() -> SchemaModel {
    let files = [
        SourceFile::new(
            "auth/users.sql",
            "CREATE TABLE users (id INT PRIMARY KEY, email TEXT, name TEXT, role user_role, created_at TIMESTAMP);
             CREATE TYPE user_role AS ENUM ('admin', 'member');",
        ),
        SourceFile::new(
            "shop/orders.sql",
            "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id));
             CREATE TABLE items (id INT PRIMARY KEY, order_id INT REFERENCES orders (id), product_id INT REFERENCES products (id));
             CREATE TABLE products (id INT PRIMARY KEY, name TEXT);",
        ),
    ];
    Pipeline::new(ParserKind::Strict).run(&files).model
}

fn overlaps(layout: &Layout) -> bool {
    let nodes: Vec<_> = layout.nodes.values().collect();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let apart = a.x + a.width <= b.x
                || b.x + b.width <= a.x
                || a.y + a.height <= b.y
                || b.y + b.height <= a.y;
            if !apart {
                return true;
            }
        }
    }
    false
}

#[test]
fn test_five_column_table_height() {
    let graph = LayoutGraph::from_model(&model());
    let layout = LayoutEngine::default().layout(&graph, None);
    let users = layout.node("users").unwrap();
    assert_eq!(users.height, 164.0);
    assert_eq!(users.width, 240.0);
    assert_eq!(layout.node("user_role").map(|n| n.width), Some(180.0));
}

#[test]
fn test_layout_is_deterministic() {
    let graph = LayoutGraph::from_model(&model());
    let engine = LayoutEngine::default();
    assert_eq!(engine.layout(&graph, None), engine.layout(&graph, None));

    let groups = group_by_folder(&model());
    assert_eq!(
        engine.layout_grouped(&graph, &groups, None),
        engine.layout_grouped(&graph, &groups, None)
    );
}

#[test]
fn test_no_overlaps_in_any_direction() {
    let graph = LayoutGraph::from_model(&model());
    for rank_dir in [RankDir::Lr, RankDir::Tb, RankDir::Rl, RankDir::Bt] {
        let engine = LayoutEngine::new(LayoutConfig {
            rank_dir,
            ..Default::default()
        });
        let layout = engine.layout(&graph, None);
        assert_eq!(layout.nodes.len(), 5, "{rank_dir}");
        assert!(!overlaps(&layout), "{rank_dir}");
        for n in layout.nodes.values() {
            assert!(n.x >= 20.0 - 1e-9 && n.y >= 20.0 - 1e-9, "{rank_dir}");
            assert!(n.x + n.width <= layout.width - 20.0 + 1e-9, "{rank_dir}");
            assert!(n.y + n.height <= layout.height - 20.0 + 1e-9, "{rank_dir}");
        }
    }
}

#[test]
fn test_grouped_layout_frames_and_no_overlaps() {
    let model = model();
    let graph = LayoutGraph::from_model(&model);
    let layout = LayoutEngine::default().layout_grouped(&graph, &group_by_folder(&model), None);

    let names: Vec<&str> = layout.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["auth", "shop"]);
    assert_eq!(layout.groups[0].members, vec!["user_role", "users"]);
    assert!(!overlaps(&layout));
}

#[test]
fn test_full_overrides_returned_verbatim() {
    let graph = LayoutGraph::from_model(&model());
    let engine = LayoutEngine::default();
    let overrides: BTreeMap<String, Point> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), Point::new(i as f64 * 300.0, 50.0)))
        .collect();

    let layout = engine.layout(&graph, Some(&overrides));
    assert_eq!(layout.positions(), overrides);
}

#[test]
fn test_partial_overrides_ignored() {
    let graph = LayoutGraph::from_model(&model());
    let engine = LayoutEngine::default();
    let mut overrides = BTreeMap::new();
    overrides.insert("users".to_string(), Point::new(-999.0, -999.0));

    assert_eq!(engine.layout(&graph, Some(&overrides)), engine.layout(&graph, None));
}

#[test]
fn test_empty_model_short_circuits() {
    let layout = LayoutEngine::default().layout(&LayoutGraph::from_model(&SchemaModel::default()), None);
    assert!(layout.nodes.is_empty());
    assert_eq!((layout.width, layout.height), (0.0, 0.0));
}
