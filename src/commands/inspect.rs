//! `ktree inspect`: diagnostic queries against the current tree.

use anyhow::Result;

use crate::tree::edges;
use crate::tree::layout;
use crate::tree::model::TreeModel;
use crate::tree::style;
use crate::workspace;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

pub fn run_dangling() -> Result<()> {
    let model = load_model_from_root()?;
    print_lines(dangling_lines(&model), "No dangling references.");
    Ok(())
}

pub fn run_node(id: &str) -> Result<()> {
    let model = load_model_from_root()?;
    match node_lines(&model, id) {
        Some(lines) => print_lines(lines, ""),
        None => println!("  Node not found: {}", id),
    }
    Ok(())
}

pub fn run_stats() -> Result<()> {
    let model = load_model_from_root()?;
    print_lines(stats_lines(&model), "");
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn dangling_lines(model: &TreeModel) -> Vec<String> {
    let mut lines: Vec<String> = model
        .dangling_parents()
        .into_iter()
        .map(|n| {
            format!(
                "node {} -> missing parent {}",
                n.id,
                n.parent_id.as_deref().unwrap_or_default()
            )
        })
        .collect();
    for conn in model.dangling_connections() {
        let missing: Vec<&str> = [conn.from_node_id.as_str(), conn.to_node_id.as_str()]
            .into_iter()
            .filter(|id| !model.contains(id))
            .collect();
        lines.push(format!(
            "connection {} ({} -> {}) -> missing {}",
            conn.id,
            conn.from_node_id,
            conn.to_node_id,
            missing.join(", ")
        ));
    }
    lines
}

fn node_lines(model: &TreeModel, id: &str) -> Option<Vec<String>> {
    let node = model.get(id)?;
    let node_style = style::node_style(node.node_type);
    let mut lines = vec![
        format!(
            "{} {}{}",
            node_style.icon,
            node.title,
            if node.is_foundational {
                format!(" {}", style::FOUNDATIONAL_ICON)
            } else {
                String::new()
            }
        ),
        format!("type:     {} ({})", node.node_type, node_style.legend),
        format!("year:     {}", node.created_at.year()),
        format!(
            "papers:   {} (size {})",
            node.paper_count,
            layout::node_size(node.paper_count)
        ),
    ];
    match (&node.parent_id, model.parent_of(node)) {
        (Some(_), Some(parent)) => lines.push(format!("parent:   {}", parent.id)),
        (Some(missing), None) => lines.push(format!("parent:   {} (missing)", missing)),
        (None, _) => {}
    }
    let children: Vec<&str> = model.children(id).map(|c| c.id.as_str()).collect();
    if !children.is_empty() {
        lines.push(format!("children: {}", children.join(", ")));
    }
    if !node.what.is_empty() {
        lines.push(format!("what:     {}", node.what));
    }
    for how in &node.how {
        lines.push(format!("how:      {}", how));
    }
    for gap in &node.gaps {
        lines.push(format!("gap:      {}", gap));
    }
    for conn in model.connections_of(id) {
        let (dir, other) = if conn.from_node_id == id {
            ("->", conn.to_node_id.as_str())
        } else {
            ("<-", conn.from_node_id.as_str())
        };
        lines.push(format!(
            "link:     {} {} {} ({})",
            dir, other, conn.connection_type, conn.strength
        ));
    }
    Some(lines)
}

fn stats_lines(model: &TreeModel) -> Vec<String> {
    let stats = model.stats();
    let skipped = edges::resolve(model).skipped;
    vec![
        format!("nodes:        {}", stats.nodes),
        format!("connections:  {}", stats.connections),
        format!("branches:     {}", stats.branches),
        format!("papers:       {}", stats.papers),
        format!("foundational: {}", stats.foundational),
        format!("open gaps:    {}", stats.gaps),
        format!("skipped edges: {}", skipped),
        format!("roots:        {}", model.roots().count()),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_model_from_root() -> Result<TreeModel> {
    let root = workspace::find_root()?;
    workspace::load_model(&root)
}

fn print_lines(lines: Vec<String>, empty: &str) {
    if lines.is_empty() {
        println!("  {}", empty);
    }
    for line in lines {
        println!("  {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::snapshot;

    fn model() -> TreeModel {
        snapshot::load_str(
            r#"{
            "nodes": [
                {"id":"1","type":"mechanism","position":{"x":0,"y":0},"paperCount":2,
                 "what":"core idea","how":["step"],"gaps":["open"],"isFoundational":true,"createdAt":2019},
                {"id":"2","type":"gap","parentId":"1","position":{"x":0,"y":0},"createdAt":2021},
                {"id":"3","type":"solution","parentId":"ghost","position":{"x":0,"y":0},"createdAt":2021}
            ],
            "connections": [
                {"id":"c1","fromNodeId":"2","toNodeId":"1","type":"extends","strength":"weak"},
                {"id":"c2","fromNodeId":"1","toNodeId":"99","type":"supporting","strength":"strong"}
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn dangling_lists_parents_and_connections() {
        assert_eq!(
            dangling_lines(&model()),
            vec![
                "node 3 -> missing parent ghost".to_string(),
                "connection c2 (1 -> 99) -> missing 99".to_string(),
            ]
        );
    }

    #[test]
    fn node_details() {
        let lines = node_lines(&model(), "1").unwrap();
        assert!(lines[0].contains(style::FOUNDATIONAL_ICON));
        assert!(lines.contains(&"children: 2".to_string()));
        assert!(lines.contains(&"what:     core idea".to_string()));
        assert!(lines.contains(&"link:     <- 2 extends (weak)".to_string()));
        assert!(lines.contains(&"link:     -> 99 supporting (strong)".to_string()));

        let orphan = node_lines(&model(), "3").unwrap();
        assert!(orphan.contains(&"parent:   ghost (missing)".to_string()));
        assert!(node_lines(&model(), "nope").is_none());
    }

    #[test]
    fn stats_count_skipped_edges() {
        let lines = stats_lines(&model());
        assert_eq!(lines[0], "nodes:        3");
        assert_eq!(lines[5], "open gaps:    1");
        assert_eq!(lines[6], "skipped edges: 2");
        // "3" has a missing parent, so it is drawn as a root too.
        assert_eq!(lines[7], "roots:        2");
    }
}
