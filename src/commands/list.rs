//! `ktree list`: print parent links and connections in snapshot order.

use anyhow::Result;

use crate::tree::model::TreeModel;
use crate::workspace;

pub fn run() -> Result<()> {
    let root = workspace::find_root()?;
    let model = workspace::load_model(&root)?;

    let lines = list_edges(&model);
    if lines.is_empty() {
        println!("  No edges.");
    } else {
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

/// Dangling references are listed too, marked with `?`.
fn list_edges(model: &TreeModel) -> Vec<String> {
    let mut lines = Vec::new();
    for node in model.nodes() {
        if let Some(parent) = &node.parent_id {
            lines.push(format!(
                "{}{} => {} : parent",
                parent,
                missing_mark(model, parent),
                node.id
            ));
        }
    }
    for conn in model.connections() {
        let arrow = if conn.connection_type.is_dashed() {
            "~>"
        } else {
            "->"
        };
        lines.push(format!(
            "{}{} {} {}{} : {} ({})",
            conn.from_node_id,
            missing_mark(model, &conn.from_node_id),
            arrow,
            conn.to_node_id,
            missing_mark(model, &conn.to_node_id),
            conn.connection_type,
            conn.strength
        ));
    }
    lines
}

fn missing_mark(model: &TreeModel, id: &str) -> &'static str {
    if model.contains(id) { "" } else { "?" }
}
