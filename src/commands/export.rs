//! `ktree export`: hand the current tree to the export collaborator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::style::Stylize;

use crate::tree::export::{ExportFormat, ExportOptions, RequestFileExporter};
use crate::tree::session::TreeView;
use crate::workspace;

pub fn run(format: ExportFormat, options: ExportOptions) -> Result<()> {
    let root = workspace::find_root()?;
    let path = export_in(&root, format, options)?;
    println!(
        "  {} {} export request ({})",
        "Queued".green().bold(),
        format,
        format.describe().dark_grey()
    );
    println!("  {}", path.display());
    Ok(())
}

fn export_in(root: &Path, format: ExportFormat, options: ExportOptions) -> Result<PathBuf> {
    let view = TreeView::new(workspace::load_model(root)?);
    let exporter = RequestFileExporter::new(workspace::ktree_dir(root));
    view.export_view(format, options, &exporter)
        .context("failed to hand the tree to the exporter")
}
