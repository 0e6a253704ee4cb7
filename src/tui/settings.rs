use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::parser::config::{Confidence, DEFAULT_BRANCHES, LabelMode, TreeSettings};
use crate::tui::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    None,
    Changed,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPanelState {
    pub selected_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    AutoUpdate,
    FromAbstracts,
    FromCitations,
    FromHighlights,
    FromFullText,
    Branch(usize),
    MinPapers,
    ShowLabels,
    ShowPaperCounts,
    DetectRelationships,
    IdentifyGaps,
    SuggestCrossLinks,
    FlagContradictions,
    Confidence,
}

fn rows() -> Vec<Row> {
    let mut rows = vec![
        Row::AutoUpdate,
        Row::FromAbstracts,
        Row::FromCitations,
        Row::FromHighlights,
        Row::FromFullText,
    ];
    rows.extend((0..DEFAULT_BRANCHES.len()).map(Row::Branch));
    rows.extend([
        Row::MinPapers,
        Row::ShowLabels,
        Row::ShowPaperCounts,
        Row::DetectRelationships,
        Row::IdentifyGaps,
        Row::SuggestCrossLinks,
        Row::FlagContradictions,
        Row::Confidence,
    ]);
    rows
}

pub fn handle_key(
    key: KeyEvent,
    state: &mut SettingsPanelState,
    settings: &mut TreeSettings,
) -> SettingsEvent {
    let rows = rows();
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => SettingsEvent::Close,
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected_row = state.selected_row.saturating_sub(1);
            SettingsEvent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected_row = (state.selected_row + 1).min(rows.len() - 1);
            SettingsEvent::None
        }
        KeyCode::Char('R') => {
            *settings = TreeSettings::default();
            SettingsEvent::Changed
        }
        KeyCode::Left | KeyCode::Char('h') => {
            adjust(settings, rows[state.selected_row.min(rows.len() - 1)], false)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => {
            adjust(settings, rows[state.selected_row.min(rows.len() - 1)], true)
        }
        _ => SettingsEvent::None,
    }
}

pub fn draw(frame: &mut Frame, state: &SettingsPanelState, settings: &TreeSettings) {
    let area = centered_rect(frame.area(), 64, 84);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            "Knowledge Tree Settings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Esc] close  [R] defaults", Style::default().fg(Color::Gray)),
    ]);

    let rows = rows();
    let selected_row = state.selected_row.min(rows.len() - 1);
    let mut lines = Vec::new();
    let mut selected_line = 0;
    for (idx, row) in rows.iter().enumerate() {
        if let Some(header) = section_header(*row) {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                header,
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        if idx == selected_row {
            selected_line = lines.len();
        }
        lines.push(settings_row(idx == selected_row, &row_label(*row), row_value(settings, *row)));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Use arrows/hjkl or Enter/Space to change.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Changes write to ktree/settings.ktree immediately.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::new(1, 1, 1, 0));
    let visible = block.inner(area).height as usize;
    let scroll = scroll_offset(selected_line, visible);
    let panel = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(panel, area);
}

fn scroll_offset(selected_line: usize, visible: usize) -> u16 {
    let offset = selected_line.saturating_sub(visible.saturating_sub(1) / 2);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RowValue {
    Toggle(bool),
    Choice(String),
}

fn section_header(row: Row) -> Option<&'static str> {
    match row {
        Row::AutoUpdate => Some("BUILD"),
        Row::Branch(0) => Some("TREE STRUCTURE: main branches"),
        Row::ShowLabels => Some("VISUAL"),
        Row::DetectRelationships => Some("AI INTELLIGENCE"),
        _ => None,
    }
}

fn row_label(row: Row) -> String {
    match row {
        Row::AutoUpdate => "update as I read".into(),
        Row::FromAbstracts => "abstracts & intros".into(),
        Row::FromCitations => "citations".into(),
        Row::FromHighlights => "my highlights".into(),
        Row::FromFullText => "full text".into(),
        Row::Branch(i) => DEFAULT_BRANCHES.get(i).copied().unwrap_or_default().into(),
        Row::MinPapers => "sub-branch at papers".into(),
        Row::ShowLabels => "node labels".into(),
        Row::ShowPaperCounts => "paper counts".into(),
        Row::DetectRelationships => "detect relationships".into(),
        Row::IdentifyGaps => "identify gaps".into(),
        Row::SuggestCrossLinks => "suggest cross-links".into(),
        Row::FlagContradictions => "flag contradictions".into(),
        Row::Confidence => "confidence threshold".into(),
    }
}

fn row_value(s: &TreeSettings, row: Row) -> RowValue {
    match row {
        Row::AutoUpdate => RowValue::Toggle(s.auto_update),
        Row::FromAbstracts => RowValue::Toggle(s.build_from_abstracts),
        Row::FromCitations => RowValue::Toggle(s.build_from_citations),
        Row::FromHighlights => RowValue::Toggle(s.build_from_highlights),
        Row::FromFullText => RowValue::Toggle(s.build_from_full_text),
        Row::Branch(i) => RowValue::Toggle(
            DEFAULT_BRANCHES
                .get(i)
                .is_some_and(|b| s.branch_enabled(b)),
        ),
        Row::MinPapers => RowValue::Choice(s.min_papers_for_sub_branch.to_string()),
        Row::ShowLabels => RowValue::Choice(s.show_labels.to_string()),
        Row::ShowPaperCounts => RowValue::Toggle(s.show_paper_counts),
        Row::DetectRelationships => RowValue::Toggle(s.auto_detect_relationships),
        Row::IdentifyGaps => RowValue::Toggle(s.auto_identify_gaps),
        Row::SuggestCrossLinks => RowValue::Toggle(s.suggest_cross_links),
        Row::FlagContradictions => RowValue::Toggle(s.flag_contradictions),
        Row::Confidence => RowValue::Choice(format!(
            "{} ({})",
            s.ai_confidence_threshold,
            s.ai_confidence_threshold.to_slider()
        )),
    }
}

fn settings_row(selected: bool, key: &str, value: RowValue) -> Line<'static> {
    let indicator = if selected { ">" } else { " " };
    let base_style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let (value_text, mut value_style) = match value {
        RowValue::Toggle(true) => ("[ON]".to_string(), Style::default().fg(Color::Green)),
        RowValue::Toggle(false) => ("[OFF]".to_string(), Style::default().fg(Color::LightRed)),
        RowValue::Choice(text) => (format!("< {} >", text), Style::default().fg(Color::Cyan)),
    };
    if selected {
        value_style = value_style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
    } else {
        value_style = value_style.add_modifier(Modifier::BOLD);
    }

    Line::from(vec![
        Span::styled(format!("{indicator} {key:<30}"), base_style),
        Span::styled(value_text, value_style),
    ])
}

fn adjust(s: &mut TreeSettings, row: Row, forward: bool) -> SettingsEvent {
    match row {
        Row::AutoUpdate => s.auto_update = !s.auto_update,
        Row::FromAbstracts => s.build_from_abstracts = !s.build_from_abstracts,
        Row::FromCitations => s.build_from_citations = !s.build_from_citations,
        Row::FromHighlights => s.build_from_highlights = !s.build_from_highlights,
        Row::FromFullText => s.build_from_full_text = !s.build_from_full_text,
        Row::Branch(i) => match DEFAULT_BRANCHES.get(i) {
            Some(name) => s.toggle_branch(name),
            None => return SettingsEvent::None,
        },
        Row::MinPapers => s.cycle_min_papers(forward),
        Row::ShowLabels => {
            s.show_labels = match (s.show_labels, forward) {
                (LabelMode::Always, true) | (LabelMode::Click, false) => LabelMode::Hover,
                (LabelMode::Hover, true) | (LabelMode::Always, false) => LabelMode::Click,
                (LabelMode::Click, true) | (LabelMode::Hover, false) => LabelMode::Always,
            }
        }
        Row::ShowPaperCounts => s.show_paper_counts = !s.show_paper_counts,
        Row::DetectRelationships => s.auto_detect_relationships = !s.auto_detect_relationships,
        Row::IdentifyGaps => s.auto_identify_gaps = !s.auto_identify_gaps,
        Row::SuggestCrossLinks => s.suggest_cross_links = !s.suggest_cross_links,
        Row::FlagContradictions => s.flag_contradictions = !s.flag_contradictions,
        Row::Confidence => {
            let value = s.ai_confidence_threshold.to_slider();
            let stepped = if forward {
                value.saturating_add(33).min(100)
            } else {
                value.saturating_sub(34)
            };
            s.ai_confidence_threshold = Confidence::from_slider(stepped);
        }
    }
    SettingsEvent::Changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn select(state: &mut SettingsPanelState, row: Row) {
        state.selected_row = rows().iter().position(|r| *r == row).unwrap();
    }

    #[test]
    fn toggles_and_closes() {
        let mut state = SettingsPanelState::default();
        let mut s = TreeSettings::default();
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state, &mut s),
            SettingsEvent::Changed
        );
        assert!(!s.auto_update);
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state, &mut s), SettingsEvent::Close);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut state = SettingsPanelState::default();
        let mut s = TreeSettings::default();
        handle_key(key(KeyCode::Up), &mut state, &mut s);
        assert_eq!(state.selected_row, 0);
        for _ in 0..100 {
            handle_key(key(KeyCode::Down), &mut state, &mut s);
        }
        assert_eq!(state.selected_row, rows().len() - 1);
    }

    #[test]
    fn branch_rows_toggle_membership() {
        let mut state = SettingsPanelState::default();
        let mut s = TreeSettings::default();
        select(&mut state, Row::Branch(1));
        handle_key(key(KeyCode::Char(' ')), &mut state, &mut s);
        assert!(!s.branch_enabled(DEFAULT_BRANCHES[1]));
        handle_key(key(KeyCode::Char(' ')), &mut state, &mut s);
        assert!(s.branch_enabled(DEFAULT_BRANCHES[1]));
    }

    #[test]
    fn confidence_steps_through_levels() {
        let mut state = SettingsPanelState::default();
        let mut s = TreeSettings::default();
        select(&mut state, Row::Confidence);
        handle_key(key(KeyCode::Right), &mut state, &mut s);
        assert_eq!(s.ai_confidence_threshold, Confidence::High);
        handle_key(key(KeyCode::Right), &mut state, &mut s);
        assert_eq!(s.ai_confidence_threshold, Confidence::High);
        handle_key(key(KeyCode::Left), &mut state, &mut s);
        assert_eq!(s.ai_confidence_threshold, Confidence::Medium);
        handle_key(key(KeyCode::Left), &mut state, &mut s);
        handle_key(key(KeyCode::Left), &mut state, &mut s);
        assert_eq!(s.ai_confidence_threshold, Confidence::Low);
    }

    #[test]
    fn label_mode_cycles_both_ways() {
        let mut state = SettingsPanelState::default();
        let mut s = TreeSettings::default();
        select(&mut state, Row::ShowLabels);
        handle_key(key(KeyCode::Right), &mut state, &mut s);
        assert_eq!(s.show_labels, LabelMode::Hover);
        handle_key(key(KeyCode::Left), &mut state, &mut s);
        handle_key(key(KeyCode::Left), &mut state, &mut s);
        assert_eq!(s.show_labels, LabelMode::Click);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = SettingsPanelState::default();
        let mut s = TreeSettings::default();
        s.show_paper_counts = false;
        s.min_papers_for_sub_branch = 10;
        handle_key(key(KeyCode::Char('R')), &mut state, &mut s);
        assert_eq!(s, TreeSettings::default());
    }

    #[test]
    fn scroll_keeps_selection_visible() {
        assert_eq!(scroll_offset(3, 20), 0);
        assert_eq!(scroll_offset(30, 11), 25);
    }
}
