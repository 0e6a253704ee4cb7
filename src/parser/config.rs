//! Parser and writer for `ktree/settings.ktree`.
//!
//! The file is commented `key: value` text. Blank lines and `#` comments are
//! ignored, missing keys take their defaults, unknown keys are rejected with
//! the line they appear on.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Branches offered in the settings panel; all enabled by default.
pub const DEFAULT_BRANCHES: &[&str] = &[
    "Core Methods",
    "Applications",
    "Theoretical Foundations",
    "Evaluation & Benchmarks",
    "Open Problems",
];

pub const MIN_PAPER_CHOICES: [u32; 4] = [3, 5, 7, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum LabelMode {
    Always,
    Hover,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Map a 0..=100 slider position onto a threshold.
    pub fn from_slider(value: u8) -> Self {
        match value {
            0..=33 => Confidence::Low,
            34..=66 => Confidence::Medium,
            _ => Confidence::High,
        }
    }

    pub fn to_slider(self) -> u8 {
        match self {
            Confidence::Low => 33,
            Confidence::Medium => 66,
            Confidence::High => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
    pub auto_update: bool,
    pub build_from_abstracts: bool,
    pub build_from_citations: bool,
    pub build_from_highlights: bool,
    pub build_from_full_text: bool,
    pub enabled_branches: Vec<String>,
    pub min_papers_for_sub_branch: u32,
    pub show_labels: LabelMode,
    pub show_paper_counts: bool,
    pub auto_detect_relationships: bool,
    pub auto_identify_gaps: bool,
    pub suggest_cross_links: bool,
    pub flag_contradictions: bool,
    pub ai_confidence_threshold: Confidence,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            auto_update: true,
            build_from_abstracts: true,
            build_from_citations: true,
            build_from_highlights: true,
            build_from_full_text: false,
            enabled_branches: DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
            min_papers_for_sub_branch: 5,
            show_labels: LabelMode::Always,
            show_paper_counts: true,
            auto_detect_relationships: true,
            auto_identify_gaps: true,
            suggest_cross_links: true,
            flag_contradictions: true,
            ai_confidence_threshold: Confidence::Medium,
        }
    }
}

impl TreeSettings {
    pub fn branch_enabled(&self, name: &str) -> bool {
        self.enabled_branches.iter().any(|b| b == name)
    }

    /// Flip a branch on or off, keeping the default ordering stable.
    pub fn toggle_branch(&mut self, name: &str) {
        if self.branch_enabled(name) {
            self.enabled_branches.retain(|b| b != name);
        } else {
            self.enabled_branches.push(name.to_string());
            self.enabled_branches.sort_by_key(|b| {
                DEFAULT_BRANCHES
                    .iter()
                    .position(|d| d == b)
                    .unwrap_or(usize::MAX)
            });
        }
    }

    /// Step to the next allowed minimum-papers value, wrapping around.
    pub fn cycle_min_papers(&mut self, forward: bool) {
        let idx = MIN_PAPER_CHOICES
            .iter()
            .position(|&v| v == self.min_papers_for_sub_branch)
            .unwrap_or(1);
        let len = MIN_PAPER_CHOICES.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.min_papers_for_sub_branch = MIN_PAPER_CHOICES[next];
    }
}

/// Everything persisted in the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub onboarding_seen: bool,
    pub settings: TreeSettings,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("line {line}: expected `key: value`")]
    Malformed { line: usize },
    #[error("line {line}: unknown setting `{key}`")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: invalid value `{value}` for `{key}`")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
}

pub fn parse(input: &str) -> Result<Preferences, ConfigError> {
    let mut prefs = Preferences::default();
    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(ConfigError::Malformed { line });
        };
        let key = key.trim();
        let value = value.trim();
        let s = &mut prefs.settings;
        let invalid = || ConfigError::InvalidValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "onboarding_seen" => prefs.onboarding_seen = parse_value(value).ok_or_else(invalid)?,
            "auto_update" => s.auto_update = parse_value(value).ok_or_else(invalid)?,
            "build_from_abstracts" => {
                s.build_from_abstracts = parse_value(value).ok_or_else(invalid)?
            }
            "build_from_citations" => {
                s.build_from_citations = parse_value(value).ok_or_else(invalid)?
            }
            "build_from_highlights" => {
                s.build_from_highlights = parse_value(value).ok_or_else(invalid)?
            }
            "build_from_full_text" => {
                s.build_from_full_text = parse_value(value).ok_or_else(invalid)?
            }
            "enabled_branches" => {
                s.enabled_branches = value
                    .split(',')
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }
            "min_papers_for_sub_branch" => {
                let n: u32 = parse_value(value).ok_or_else(invalid)?;
                if !MIN_PAPER_CHOICES.contains(&n) {
                    return Err(invalid());
                }
                s.min_papers_for_sub_branch = n;
            }
            "show_labels" => s.show_labels = parse_value(value).ok_or_else(invalid)?,
            "show_paper_counts" => s.show_paper_counts = parse_value(value).ok_or_else(invalid)?,
            "auto_detect_relationships" => {
                s.auto_detect_relationships = parse_value(value).ok_or_else(invalid)?
            }
            "auto_identify_gaps" => {
                s.auto_identify_gaps = parse_value(value).ok_or_else(invalid)?
            }
            "suggest_cross_links" => {
                s.suggest_cross_links = parse_value(value).ok_or_else(invalid)?
            }
            "flag_contradictions" => {
                s.flag_contradictions = parse_value(value).ok_or_else(invalid)?
            }
            "ai_confidence_threshold" => {
                s.ai_confidence_threshold = parse_value(value).ok_or_else(invalid)?
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    line,
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(prefs)
}

fn parse_value<T: FromStr>(value: &str) -> Option<T> {
    value.parse().ok()
}

pub fn serialize(prefs: &Preferences) -> String {
    let s = &prefs.settings;
    format!(
        "\
# ktree settings
# Edit manually or run: ktree setup

# Set once the onboarding walkthrough has been dismissed
onboarding_seen: {}

# Rebuild the tree when papers are added to the project
auto_update: {}

# Sources the classifier reads from each paper
build_from_abstracts: {}
build_from_citations: {}
build_from_highlights: {}
build_from_full_text: {}

# Comma-separated top-level branches to build
enabled_branches: {}

# Papers needed before a sub-branch is split off
# Options: 3 | 5 | 7 | 10
min_papers_for_sub_branch: {}

# Node labels on the canvas
# Options: always | hover | click
show_labels: {}
show_paper_counts: {}

# Classifier behaviour
auto_detect_relationships: {}
auto_identify_gaps: {}
suggest_cross_links: {}
flag_contradictions: {}

# Options: low | medium | high
ai_confidence_threshold: {}
",
        prefs.onboarding_seen,
        s.auto_update,
        s.build_from_abstracts,
        s.build_from_citations,
        s.build_from_highlights,
        s.build_from_full_text,
        s.enabled_branches.join(", "),
        s.min_papers_for_sub_branch,
        s.show_labels,
        s.show_paper_counts,
        s.auto_detect_relationships,
        s.auto_identify_gaps,
        s.suggest_cross_links,
        s.flag_contradictions,
        s.ai_confidence_threshold,
    )
}
