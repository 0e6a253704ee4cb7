//! `ktree timeline`: print the tree grouped by year.

use anyhow::Result;
use crossterm::style::Stylize;

use crate::tree::layout;
use crate::tree::style;
use crate::tree::timeline::{self, YearGroup, plural};
use crate::workspace;

pub fn run() -> Result<()> {
    let root = workspace::find_root()?;
    let model = workspace::load_model(&root)?;
    if model.is_empty() {
        println!("  Your knowledge tree is empty. Run `ktree build` first.");
        return Ok(());
    }
    for (i, group) in timeline::group_by_year(&model).iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "  {}  {}",
            group.year.to_string().cyan().bold(),
            summary_line(group.developments(), group.methods(), group.gaps()).dark_grey()
        );
        for line in group_lines(group) {
            println!("    {}", line);
        }
    }
    Ok(())
}

fn summary_line(developments: usize, methods: usize, gaps: usize) -> String {
    format!(
        "{} · {} · {}",
        plural(developments, "development", "developments"),
        plural(methods, "method", "methods"),
        plural(gaps, "gap", "gaps")
    )
}

fn group_lines(group: &YearGroup<'_>) -> Vec<String> {
    group
        .nodes
        .iter()
        .map(|n| {
            format!(
                "{} {} [{} papers, marker {}]{}",
                style::node_style(n.node_type).icon,
                n.title,
                n.paper_count,
                layout::timeline_marker_size(n.paper_count),
                if n.is_foundational {
                    format!(" {}", style::FOUNDATIONAL_ICON)
                } else {
                    String::new()
                }
            )
        })
        .collect()
}
