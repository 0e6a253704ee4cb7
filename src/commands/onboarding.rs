//! `ktree onboarding`: the first-run walkthrough and its "seen" flag.

use std::path::Path;

use anyhow::Result;
use crossterm::style::Stylize;

use crate::workspace;

pub const FEATURES: [(&str, &str); 4] = [
    (
        "Organizes by problem-solution logic",
        "Structures research into problems, mechanisms, solutions and gaps",
    ),
    (
        "Answers What? Why? How? for each topic",
        "Extracts key insights from papers into every node",
    ),
    (
        "Identifies research gaps automatically",
        "Spots missing pieces in your research domain",
    ),
    (
        "Generates literature reviews faster",
        "Export structured reviews with citations",
    ),
];

pub fn run(reset: bool) -> Result<()> {
    let root = workspace::find_root()?;
    if reset {
        set_seen(&root, false)?;
        println!("  {} onboarding will show on next `ktree view`", "Reset".green().bold());
        return Ok(());
    }
    let papers = workspace::load_papers(&root)?.len();
    println!("  {}", "Welcome to your knowledge tree".cyan().bold());
    for (title, detail) in FEATURES {
        println!("  {} {}", "•".green(), title.bold());
        println!("    {}", detail.dark_grey());
    }
    println!();
    if papers == 0 {
        println!("  Add papers to ktree/papers.json, then run `ktree build`.");
    } else {
        println!("  Run `ktree build` to analyse the {} papers you have.", papers);
    }
    set_seen(&root, true)
}

pub fn set_seen(root: &Path, seen: bool) -> Result<()> {
    let mut prefs = workspace::load_preferences(root)?;
    if prefs.onboarding_seen != seen {
        prefs.onboarding_seen = seen;
        workspace::save_preferences(root, &prefs)?;
    }
    Ok(())
}
