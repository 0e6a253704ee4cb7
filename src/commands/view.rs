use anyhow::Result;

use crate::logging;
use crate::tui::canvas;
use crate::workspace;

pub fn run(demo: bool, timeline: bool) -> Result<()> {
    init_logging(demo)?;
    canvas::run(demo, false, timeline)
}

pub fn run_setup() -> Result<()> {
    init_logging(false)?;
    canvas::run(false, true, false)
}

/// The alternate screen owns stderr, so events go to the workspace log file.
fn init_logging(demo: bool) -> Result<()> {
    match workspace::find_root() {
        Ok(root) if !demo => logging::init_file(&workspace::log_path(&root)),
        _ => {
            logging::init_silent();
            Ok(())
        }
    }
}
