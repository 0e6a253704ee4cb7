use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};
use strum::IntoEnumIterator;

use crate::commands::onboarding;
use crate::parser::config::{LabelMode, TreeSettings};
use crate::tree::edges::{self, EdgePrimitive};
use crate::tree::layout::{self, LabelSize};
use crate::tree::model::{ConnectionType, NodeType, Point, TreeNode};
use crate::tree::session::TreeView;
use crate::tree::style::{self, Rgb};
use crate::tree::timeline::plural;
use crate::tui::centered_rect;

/// Virtual pixels per terminal cell. Cells are roughly twice as tall as wide.
pub const CELL_WIDTH: f32 = 8.0;
pub const CELL_HEIGHT: f32 = 16.0;

const STRAND_SPACING: f32 = 3.0;
const DETAIL_PANEL_WIDTH: u16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tree,
    Timeline,
}

#[derive(Debug)]
pub struct CanvasRenderData<'a> {
    pub view: &'a TreeView,
    pub settings: &'a TreeSettings,
    pub hovered: Option<&'a str>,
    pub tab: Tab,
    pub message: Option<&'a str>,
    pub show_help: bool,
    pub show_onboarding: bool,
    pub onboarding_opt_out: bool,
    pub paper_total: usize,
    pub timeline_scroll: u16,
    pub demo: bool,
}

/// Screen-space centre of the cell at (`column`, `row`), or `None` outside `area`.
pub fn cell_to_screen(area: Rect, column: u16, row: u16) -> Option<Point> {
    if column < area.x
        || row < area.y
        || column >= area.x.saturating_add(area.width)
        || row >= area.y.saturating_add(area.height)
    {
        return None;
    }
    Some(Point::new(
        f32::from(column - area.x) * CELL_WIDTH + CELL_WIDTH / 2.0,
        f32::from(row - area.y) * CELL_HEIGHT + CELL_HEIGHT / 2.0,
    ))
}

/// Size of `area` in screen space.
pub fn screen_size(area: Rect) -> Point {
    Point::new(
        f32::from(area.width) * CELL_WIDTH,
        f32::from(area.height) * CELL_HEIGHT,
    )
}

/// Draw the whole view; returns the area the tree canvas occupies.
pub fn draw(frame: &mut Frame, data: &CanvasRenderData<'_>) -> Rect {
    let area = frame.area().inner(Margin {
        horizontal: 1,
        vertical: 0,
    });

    let tab_label = match data.tab {
        Tab::Tree => "[tree]",
        Tab::Timeline => "[timeline]",
    };
    let mut title_spans = vec![
        Span::styled("ktree view", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            tab_label,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ];
    if data.demo {
        title_spans.push(Span::raw("  "));
        title_spans.push(Span::styled(
            "[DEMO]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(title_spans));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let [header_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(4),
        Constraint::Length(2),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new(header_line(data.view)), header_area);
    draw_status(frame, status_area, data);

    let mut canvas_area = Rect::default();
    if data.view.model().is_empty() {
        draw_empty_state(frame, body_area, data.paper_total);
    } else {
        match data.tab {
            Tab::Tree => {
                let tree_area = match data.view.selected_node() {
                    Some(node) if body_area.width > DETAIL_PANEL_WIDTH * 2 => {
                        let [tree_area, detail_area] = Layout::horizontal([
                            Constraint::Min(20),
                            Constraint::Length(DETAIL_PANEL_WIDTH),
                        ])
                        .areas(body_area);
                        draw_details(frame, detail_area, data.view, node);
                        tree_area
                    }
                    _ => body_area,
                };
                canvas_area = draw_tree(frame, tree_area, data);
            }
            Tab::Timeline => draw_timeline(frame, body_area, data),
        }
    }

    if data.show_help {
        render_help_overlay(frame);
    }
    if data.show_onboarding {
        render_onboarding_overlay(frame, data.paper_total, data.onboarding_opt_out);
    }
    canvas_area
}

fn header_line(view: &TreeView) -> Line<'static> {
    let stats = view.model().stats();
    let vp = view.viewport();
    let mut spans = vec![
        Span::styled(
            format!(
                "{} · {} · {} · {}",
                plural(stats.nodes, "node", "nodes"),
                plural(stats.connections, "connection", "connections"),
                plural(stats.papers as usize, "paper", "papers"),
                plural(stats.gaps, "open gap", "open gaps"),
            ),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("   "),
        Span::styled(
            format!("zoom {:.0}%", vp.scale() * 100.0),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if vp.is_dragging() {
        spans.push(Span::styled(" · panning", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn draw_status(frame: &mut Frame, area: Rect, data: &CanvasRenderData<'_>) {
    let hints = match data.tab {
        Tab::Tree => "drag/hjkl pan · wheel/+/- zoom · 0 reset · f fit · Tab next · t timeline · s settings · e export",
        Tab::Timeline => "j/k scroll · t tree · s settings · e export",
    };
    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(message) = data.message {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(legend_line());
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn legend_line() -> Line<'static> {
    let mut spans = Vec::new();
    for node_type in NodeType::iter() {
        let s = style::node_style(node_type);
        spans.push(Span::styled(
            format!("{} {}  ", s.icon, s.legend),
            Style::default().fg(rgb(s.color)),
        ));
    }
    spans.push(Span::styled(
        format!("{} foundational", style::FOUNDATIONAL_ICON),
        Style::default().fg(Color::Yellow),
    ));
    Line::from(spans)
}

fn draw_empty_state(frame: &mut Frame, area: Rect, paper_total: usize) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Your knowledge tree is empty",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if paper_total == 0 {
        lines.push(Line::from("Add papers to ktree/papers.json to get started."));
    } else {
        lines.push(Line::from(format!(
            "You have {} ready to organise.",
            plural(paper_total, "paper", "papers")
        )));
    }
    lines.push(Line::from(Span::styled(
        "Run `ktree build` to grow the tree, or `ktree view --demo` to explore an example.",
        Style::default().fg(Color::DarkGray),
    )));
    let panel = Paragraph::new(lines)
        .centered()
        .wrap(Wrap { trim: true });
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(panel, middle);
}

// ---------------------------------------------------------------------------
// Tree canvas
// ---------------------------------------------------------------------------

fn draw_tree(frame: &mut Frame, area: Rect, data: &CanvasRenderData<'_>) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let canvas_area = block.inner(area);
    frame.render_widget(block, area);

    let view = data.view;
    let model = view.model();
    let vp = view.viewport();
    let size = screen_size(canvas_area);
    let height = f64::from(size.y);
    let flip = move |p: Point| (f64::from(p.x), height - f64::from(p.y));
    let edge_set = view.edges();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, f64::from(size.x)])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for edge in &edge_set.primitives {
                let color = edge_color(edge);
                for (a, b) in edges::dash_segments(edge.from, edge.to, edge.dash) {
                    let (a, b) = (vp.to_screen(a), vp.to_screen(b));
                    for (sa, sb) in strands(a, b, edge.width) {
                        let (x1, y1) = flip(sa);
                        let (x2, y2) = flip(sb);
                        ctx.draw(&CanvasLine {
                            x1,
                            y1,
                            x2,
                            y2,
                            color,
                        });
                    }
                }
            }
            ctx.layer();

            for node in model.nodes() {
                let (x, y) = flip(vp.to_screen(node.position));
                let radius = f64::from(layout::node_size(node.paper_count) / 2.0 * vp.scale());
                let color = rgb(style::node_style(node.node_type).color);
                ctx.draw(&Circle {
                    x,
                    y,
                    radius,
                    color,
                });
                if node.is_foundational {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: radius + 3.0,
                        color: Color::Yellow,
                    });
                }
                if view.selection().is_selected(&node.id) {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: (radius - 4.0).max(1.0),
                        color: Color::White,
                    });
                }
            }
            ctx.layer();

            for node in model.nodes() {
                let label = label_text(node, data.settings, label_visible(node, data));
                let Some(label) = label else {
                    continue;
                };
                let (x, y) = flip(vp.to_screen(node.position));
                let half_width = label.chars().count() as f64 * f64::from(CELL_WIDTH) / 2.0;
                let mut text_style = Style::default().fg(Color::White);
                if layout::label_size(layout::node_size(node.paper_count)) == LabelSize::Large {
                    text_style = text_style.add_modifier(Modifier::BOLD);
                }
                ctx.print(x - half_width, y, Line::styled(label, text_style));
            }
        });
    frame.render_widget(canvas, canvas_area);
    canvas_area
}

fn label_visible(node: &TreeNode, data: &CanvasRenderData<'_>) -> bool {
    match data.settings.show_labels {
        LabelMode::Always => true,
        LabelMode::Hover => data.hovered == Some(node.id.as_str()),
        LabelMode::Click => data.view.selection().is_selected(&node.id),
    }
}

/// Text printed on a node: title when labels are visible, paper count when
/// enabled, nothing otherwise.
fn label_text(node: &TreeNode, settings: &TreeSettings, title_visible: bool) -> Option<String> {
    let max = match layout::label_size(layout::node_size(node.paper_count)) {
        LabelSize::Small => 14,
        LabelSize::Large => 22,
    };
    let count = settings
        .show_paper_counts
        .then(|| format!("({})", node.paper_count));
    match (title_visible, count) {
        (true, Some(count)) => Some(format!("{} {}", truncate_text(&node.title, max), count)),
        (true, None) => Some(truncate_text(&node.title, max)),
        (false, Some(count)) => Some(count),
        (false, None) => None,
    }
}

fn edge_color(edge: &EdgePrimitive) -> Color {
    match edge.kind {
        Some(ConnectionType::Supporting) => Color::Green,
        Some(ConnectionType::Alternative) => Color::Yellow,
        Some(ConnectionType::Contradictory) => Color::LightRed,
        Some(ConnectionType::Extends) => Color::Cyan,
        None => Color::DarkGray,
    }
}

/// Parallel copies of a segment approximating stroke width on a dot grid.
fn strands(a: Point, b: Point, width: f32) -> Vec<(Point, Point)> {
    let count = (width - 1.0).round().max(1.0) as usize;
    let length = a.distance(b);
    if count == 1 || length == 0.0 {
        return vec![(a, b)];
    }
    let normal = Point::new(-(b.y - a.y) / length, (b.x - a.x) / length);
    let mid = (count - 1) as f32 / 2.0;
    (0..count)
        .map(|i| {
            let offset = (i as f32 - mid) * STRAND_SPACING;
            let shift = offset * normal;
            (a + shift, b + shift)
        })
        .collect()
}

fn rgb(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

fn truncate_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ---------------------------------------------------------------------------
// Detail panel
// ---------------------------------------------------------------------------

fn draw_details(frame: &mut Frame, area: Rect, view: &TreeView, node: &TreeNode) {
    let node_style = style::node_style(node.node_type);
    let accent = rgb(node_style.color);
    let mut title = vec![
        Span::raw(format!("{} ", node_style.icon)),
        Span::styled(
            node.title.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
    ];
    if node.is_foundational {
        title.push(Span::raw(format!(" {}", style::FOUNDATIONAL_ICON)));
    }

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "{} · {} · {}",
                node_style.legend,
                node.created_at.year(),
                plural(node.paper_count as usize, "paper", "papers")
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    if !node.what.is_empty() {
        lines.push(heading("WHAT"));
        lines.push(Line::from(node.what.clone()));
        lines.push(Line::from(""));
    }
    if !node.how.is_empty() {
        lines.push(heading("HOW"));
        lines.extend(node.how.iter().map(|h| Line::from(format!("• {h}"))));
        lines.push(Line::from(""));
    }
    if !node.gaps.is_empty() {
        lines.push(heading("GAPS"));
        lines.extend(
            node.gaps
                .iter()
                .map(|g| Line::from(Span::styled(format!("• {g}"), Style::default().fg(Color::LightRed)))),
        );
        lines.push(Line::from(""));
    }

    let model = view.model();
    if let Some(parent) = model.parent_of(node) {
        lines.push(Line::from(format!("↑ {}", parent.title)));
    }
    for child in model.children(&node.id) {
        lines.push(Line::from(format!("↓ {}", child.title)));
    }
    for conn in model.connections_of(&node.id) {
        let (arrow, other) = if conn.from_node_id == node.id {
            ("→", conn.to_node_id.as_str())
        } else {
            ("←", conn.from_node_id.as_str())
        };
        let other = model.get(other).map_or(other, |n| n.title.as_str());
        lines.push(Line::from(Span::styled(
            format!("{arrow} {other} ({}, {})", conn.connection_type, conn.strength),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !node.papers.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("PAPERS"));
        lines.extend(node.papers.iter().map(|p| Line::from(format!("• {p}"))));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Line::from(title))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(panel, area);
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

fn draw_timeline(frame: &mut Frame, area: Rect, data: &CanvasRenderData<'_>) {
    let mut lines = Vec::new();
    for group in data.view.timeline() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}  ", group.year),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "{} · {} · {}",
                    plural(group.developments(), "development", "developments"),
                    plural(group.methods(), "method", "methods"),
                    plural(group.gaps(), "gap", "gaps")
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for node in &group.nodes {
            lines.push(timeline_row(node, data.settings));
        }
        lines.push(Line::from(""));
    }
    let panel = Paragraph::new(lines)
        .scroll((data.timeline_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(panel, area);
}

fn timeline_row(node: &TreeNode, settings: &TreeSettings) -> Line<'static> {
    let node_style = style::node_style(node.node_type);
    let marker = layout::timeline_marker_size(node.paper_count);
    // One dot per 10 units of marker size.
    let dots = "●".repeat((marker / 10).max(1) as usize);
    let mut spans = vec![
        Span::raw("  "),
        Span::styled(format!("{dots:<6}"), Style::default().fg(rgb(node_style.color))),
        Span::raw(format!("{} {}", node_style.icon, node.title)),
    ];
    if node.is_foundational {
        spans.push(Span::raw(format!(" {}", style::FOUNDATIONAL_ICON)));
    }
    if settings.show_paper_counts {
        spans.push(Span::styled(
            format!("  {}", plural(node.paper_count as usize, "paper", "papers")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 70, 60);
    frame.render_widget(Clear, area);
    let help = Paragraph::new(vec![
        Line::from("CANVAS"),
        Line::from("  drag empty space or h/j/k/l to pan"),
        Line::from("  wheel or +/- to zoom, 0 to reset, f to fit"),
        Line::from("  click a node (or Tab / Shift-Tab) to open its details"),
        Line::from("  Esc clears the selection"),
        Line::from(""),
        Line::from("VIEWS"),
        Line::from("  t switches between tree and timeline"),
        Line::from("  r reloads ktree/snapshot.json"),
        Line::from("  e writes an export request, s opens settings"),
        Line::from(""),
        Line::from("Solid lines support or extend; dashed lines are alternatives or contradictions."),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, area);
}

fn render_onboarding_overlay(frame: &mut Frame, paper_total: usize, opt_out: bool) {
    let area = centered_rect(frame.area(), 64, 60);
    frame.render_widget(Clear, area);
    let mut lines = vec![
        Line::from(Span::styled(
            "Your personal research map that grows as you read",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];
    for (title, detail) in onboarding::FEATURES {
        lines.push(Line::from(Span::styled(
            format!("• {title}"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {detail}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(if paper_total == 0 {
        "Add papers to ktree/papers.json, then run `ktree build`.".to_string()
    } else {
        format!(
            "Run `ktree build` to analyse the {} you have.",
            plural(paper_total, "paper", "papers")
        )
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "[{}] Don't show this again (space)",
        if opt_out { "x" } else { " " }
    )));
    lines.push(Line::from(Span::styled(
        "[Enter] get started  [Esc] later",
        Style::default().fg(Color::Cyan),
    )));
    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("🌳 Welcome to your knowledge tree")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::model::CreatedAt;

    #[test]
    fn cell_mapping_is_area_relative() {
        let area = Rect::new(2, 3, 10, 5);
        assert_eq!(cell_to_screen(area, 2, 3), Some(Point::new(4.0, 8.0)));
        assert_eq!(cell_to_screen(area, 4, 4), Some(Point::new(20.0, 24.0)));
        assert_eq!(cell_to_screen(area, 1, 3), None);
        assert_eq!(cell_to_screen(area, 12, 3), None);
        assert_eq!(cell_to_screen(area, 2, 8), None);
        assert_eq!(screen_size(area), Point::new(80.0, 80.0));
    }

    #[test]
    fn labels_follow_settings() {
        let mut node = TreeNode::new("n", NodeType::Gap, CreatedAt::Year(2020));
        node.title = "A rather long research problem".into();
        node.paper_count = 2;
        let mut settings = TreeSettings::default();

        assert_eq!(
            label_text(&node, &settings, true).as_deref(),
            Some("A rather long… (2)")
        );
        assert_eq!(label_text(&node, &settings, false).as_deref(), Some("(2)"));
        settings.show_paper_counts = false;
        assert_eq!(label_text(&node, &settings, false), None);

        node.paper_count = 10;
        assert_eq!(
            label_text(&node, &settings, true).as_deref(),
            Some("A rather long researc…")
        );
    }

    #[test]
    fn strands_scale_with_width() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(strands(a, b, 2.0).len(), 1);
        assert_eq!(strands(a, b, 3.0).len(), 2);
        let thick = strands(a, b, 4.0);
        assert_eq!(thick.len(), 3);
        assert_eq!(thick[1], (a, b));
        assert_eq!(thick[0].0, Point::new(0.0, -STRAND_SPACING));
        assert_eq!(strands(a, a, 4.0).len(), 1);
    }

    #[test]
    fn edge_colors_come_from_the_primitive() {
        let set = crate::tree::demo::demo_model()
            .map(|m| edges::resolve(&m))
            .unwrap();
        let color_of = |id: &str| {
            set.primitives
                .iter()
                .find(|p| p.id == id)
                .map(edge_color)
                .unwrap()
        };
        assert_eq!(color_of("parent-attn"), Color::DarkGray);
        assert_eq!(color_of("c1"), Color::Cyan);
        assert_eq!(color_of("c2"), Color::Yellow);
        assert_eq!(color_of("c3"), Color::Green);
        assert_eq!(color_of("c4"), Color::LightRed);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 5), "abcd…");
    }
}
