//! Two-level layout: groups laid out internally, then as super-nodes.

use super::layered::{Boxed, Placed, Spacing, layout_boxes};
use super::types::{GroupLayout, NodeLayout};
use crate::model::SchemaModel;
use std::collections::BTreeMap;

/// Frame drawn around every group.
#[derive(Debug, Clone, Copy)]
pub(super) struct GroupFrame {
    pub padding: f64,
    pub header: f64,
}

pub(super) fn layout_groups(
    boxes: &[Boxed],
    edges: &[(String, String)],
    groups: &BTreeMap<String, String>,
    spacing: &Spacing,
    frame: GroupFrame,
) -> (Placed, Vec<GroupLayout>) {
    let group_of = |id: &String| group_key(groups, id);

    let mut members: BTreeMap<&str, Vec<Boxed>> = BTreeMap::new();
    for b in boxes {
        members.entry(group_of(&b.id)).or_default().push(b.clone());
    }

    let inner = Spacing {
        margin: 0.0,
        ..*spacing
    };
    let local: BTreeMap<&str, Placed> = members
        .iter()
        .map(|(&name, nodes)| {
            let intra: Vec<(String, String)> = edges
                .iter()
                .filter(|(s, t)| group_of(s) == name && group_of(t) == name)
                .cloned()
                .collect();
            (name, layout_boxes(nodes, &intra, &inner))
        })
        .collect();

    let supers: Vec<Boxed> = local
        .iter()
        .map(|(&name, placed)| Boxed {
            id: name.to_string(),
            width: placed.width + 2.0 * frame.padding,
            height: placed.height + frame.header + 2.0 * frame.padding,
        })
        .collect();
    let cross: Vec<(String, String)> = edges
        .iter()
        .map(|(s, t)| (group_of(s), group_of(t)))
        .filter(|(s, t)| s != t)
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect();
    let outer = layout_boxes(&supers, &cross, spacing);

    let mut nodes = BTreeMap::new();
    let mut frames = Vec::with_capacity(local.len());
    for (&name, placed) in &local {
        let Some(frame_box) = outer.nodes.get(name) else {
            continue;
        };
        let origin_x = frame_box.x + frame.padding;
        let origin_y = frame_box.y + frame.header + frame.padding;
        for (id, node) in &placed.nodes {
            nodes.insert(
                id.clone(),
                NodeLayout {
                    x: origin_x + node.x,
                    y: origin_y + node.y,
                    ..*node
                },
            );
        }
        frames.push(GroupLayout {
            name: name.to_string(),
            x: frame_box.x,
            y: frame_box.y,
            width: frame_box.width,
            height: frame_box.height,
            members: placed.nodes.keys().cloned().collect(),
        });
    }

    let placed = Placed {
        nodes,
        width: outer.width,
        height: outer.height,
    };
    (placed, frames)
}

fn group_key<'a>(groups: &'a BTreeMap<String, String>, id: &str) -> &'a str {
    groups.get(id).map(String::as_str).unwrap_or("")
}

/// Group key per table and enum: the directory part of its source file,
/// empty for files at the root.
pub fn group_by_folder(model: &SchemaModel) -> BTreeMap<String, String> {
    let folder = |path: &str| match path.rfind('/') {
        Some(i) => path[..i].to_string(),
        None => String::new(),
    };

    let mut groups = BTreeMap::new();
    for table in &model.tables {
        groups
            .entry(table.name.clone())
            .or_insert_with(|| folder(&table.source_file));
    }
    for enum_type in &model.enums {
        groups
            .entry(enum_type.name.clone())
            .or_insert_with(|| folder(&enum_type.source_file));
    }
    groups
}
