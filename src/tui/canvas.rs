use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::commands::onboarding;
use crate::parser::config::Preferences;
use crate::tree::demo;
use crate::tree::export::{ExportFormat, ExportOptions, RequestFileExporter};
use crate::tree::layout;
use crate::tree::model::Point;
use crate::tree::session::{PointerOutcome, TreeView};
use crate::tui::input::{self, Action, Direction};
use crate::tui::render::{self, CanvasRenderData, Tab};
use crate::tui::settings::{self, SettingsEvent, SettingsPanelState};
use crate::workspace;

/// Screen-space distance moved by one pan key.
const PAN_STEP: f32 = 40.0;

#[derive(Debug)]
struct AppState {
    root: Option<PathBuf>,
    view: TreeView,
    prefs: Preferences,
    paper_total: usize,
    tab: Tab,
    show_help: bool,
    show_settings: bool,
    show_onboarding: bool,
    /// The overlay's "don't show again" checkbox.
    onboarding_opt_out: bool,
    settings_state: SettingsPanelState,
    status_message: Option<String>,
    hovered: Option<String>,
    canvas_area: Rect,
    timeline_scroll: u16,
    demo: bool,
}

impl AppState {
    fn load(demo: bool, open_settings: bool, timeline: bool) -> Result<Self> {
        let tab = if timeline { Tab::Timeline } else { Tab::Tree };
        if demo {
            return Ok(Self {
                root: None,
                view: TreeView::new(demo::demo_model()?),
                prefs: Preferences::default(),
                paper_total: 0,
                tab,
                show_help: false,
                show_settings: open_settings,
                show_onboarding: false,
                onboarding_opt_out: false,
                settings_state: SettingsPanelState::default(),
                status_message: Some("demo mode: changes are in-memory only".to_string()),
                hovered: None,
                canvas_area: Rect::default(),
                timeline_scroll: 0,
                demo: true,
            });
        }

        let root = workspace::find_root()?;
        let model = workspace::load_model(&root)?;
        let prefs = workspace::load_preferences(&root)?;
        let paper_total = workspace::load_papers(&root)?.len();
        Ok(Self {
            show_onboarding: !prefs.onboarding_seen && !open_settings,
            onboarding_opt_out: false,
            root: Some(root),
            view: TreeView::new(model),
            prefs,
            paper_total,
            tab,
            show_help: false,
            show_settings: open_settings,
            settings_state: SettingsPanelState::default(),
            status_message: None,
            hovered: None,
            canvas_area: Rect::default(),
            timeline_scroll: 0,
            demo: false,
        })
    }

    fn draw(&mut self, frame: &mut Frame) {
        let data = CanvasRenderData {
            view: &self.view,
            settings: &self.prefs.settings,
            hovered: self.hovered.as_deref(),
            tab: self.tab,
            message: self.status_message.as_deref(),
            show_help: self.show_help,
            show_onboarding: self.show_onboarding,
            onboarding_opt_out: self.onboarding_opt_out,
            paper_total: self.paper_total,
            timeline_scroll: self.timeline_scroll,
            demo: self.demo,
        };
        self.canvas_area = render::draw(frame, &data);
        if self.show_settings {
            settings::draw(frame, &self.settings_state, &self.prefs.settings);
        }
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.show_onboarding {
            match key.code {
                KeyCode::Char(' ') => self.onboarding_opt_out = !self.onboarding_opt_out,
                KeyCode::Enter => self.complete_onboarding()?,
                KeyCode::Esc | KeyCode::Char('q') => self.show_onboarding = false,
                _ => {}
            }
            return Ok(false);
        }

        if self.show_settings {
            match settings::handle_key(key, &mut self.settings_state, &mut self.prefs.settings) {
                SettingsEvent::Changed => self.persist_preferences()?,
                SettingsEvent::Close => self.show_settings = false,
                SettingsEvent::None => {}
            }
            return Ok(false);
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Ok(false);
        }

        let action = input::action_for_key(key);
        if action != Action::Noop {
            self.status_message = None;
        }
        match action {
            Action::Quit => return Ok(true),
            Action::Pan(direction) => self.pan(direction),
            Action::ZoomIn => self.view.zoom_in(),
            Action::ZoomOut => self.view.zoom_out(),
            Action::ResetView => self.view.reset_viewport(),
            Action::FitView => self.view.fit_to(render::screen_size(self.canvas_area)),
            Action::NextNode => self.cycle_selection(true),
            Action::PrevNode => self.cycle_selection(false),
            Action::ClearSelection => self.view.clear_selection(),
            Action::ToggleTimeline => {
                self.tab = match self.tab {
                    Tab::Tree => Tab::Timeline,
                    Tab::Timeline => Tab::Tree,
                };
            }
            Action::Reload => self.reload(),
            Action::Export => self.export(),
            Action::OpenSettings => self.show_settings = true,
            Action::ToggleHelp => self.show_help = true,
            Action::Noop => {}
        }
        Ok(false)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.show_onboarding || self.show_settings || self.show_help {
            return;
        }
        if self.tab == Tab::Timeline {
            match mouse.kind {
                MouseEventKind::ScrollDown => self.timeline_scroll = self.timeline_scroll.saturating_add(1),
                MouseEventKind::ScrollUp => self.timeline_scroll = self.timeline_scroll.saturating_sub(1),
                _ => {}
            }
            return;
        }

        let screen = render::cell_to_screen(self.canvas_area, mouse.column, mouse.row);
        match (mouse.kind, screen) {
            (MouseEventKind::Down(MouseButton::Left), Some(p)) => {
                if let PointerOutcome::Selected(id) = self.view.pointer_down(p) {
                    debug!(node = %id, "node selected");
                }
            }
            (MouseEventKind::Drag(MouseButton::Left), Some(p)) => self.view.pointer_move(p),
            (MouseEventKind::Drag(MouseButton::Left), None) => self.view.pointer_leave(),
            (MouseEventKind::Up(MouseButton::Left), _) => self.view.pointer_up(),
            (MouseEventKind::ScrollUp, Some(_)) => self.view.wheel(1.0),
            (MouseEventKind::ScrollDown, Some(_)) => self.view.wheel(-1.0),
            (MouseEventKind::Moved, Some(p)) => self.hover(p),
            (MouseEventKind::Moved, None) => self.hovered = None,
            _ => {}
        }
    }

    fn hover(&mut self, screen: Point) {
        let canvas = self.view.viewport().to_canvas(screen);
        self.hovered = layout::hit_test(self.view.model(), canvas).map(|n| n.id.clone());
    }

    fn pan(&mut self, direction: Direction) {
        if self.tab == Tab::Timeline {
            match direction {
                Direction::Up => self.timeline_scroll = self.timeline_scroll.saturating_sub(1),
                Direction::Down => self.timeline_scroll = self.timeline_scroll.saturating_add(1),
                Direction::Left | Direction::Right => {}
            }
            return;
        }
        let delta = match direction {
            Direction::Up => Point::new(0.0, PAN_STEP),
            Direction::Down => Point::new(0.0, -PAN_STEP),
            Direction::Left => Point::new(PAN_STEP, 0.0),
            Direction::Right => Point::new(-PAN_STEP, 0.0),
        };
        let vp = self.view.viewport();
        let (scale, pan) = (vp.scale(), vp.pan());
        self.view.set_viewport(scale, pan + delta);
    }

    fn cycle_selection(&mut self, forward: bool) {
        let nodes = self.view.model().nodes();
        if nodes.is_empty() {
            return;
        }
        let len = nodes.len();
        let current = self
            .view
            .selection()
            .selected()
            .and_then(|id| self.view.model().index_of(id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        let id = nodes[next].id.clone();
        self.view.select_node(&id);
    }

    fn reload(&mut self) {
        let Some(root) = self.root.clone() else {
            self.status_message = Some("demo mode: nothing to reload".to_string());
            return;
        };
        let path = workspace::snapshot_path(&root);
        let result = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
            .and_then(|content| self.view.load_str(&content).map_err(Into::into));
        self.status_message = Some(match result {
            Ok(()) => format!("reloaded {} nodes", self.view.model().nodes().len()),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "reload failed");
                format!("reload failed: {err:#}; keeping the current tree")
            }
        });
        if let Ok(papers) = workspace::load_papers(&root) {
            self.paper_total = papers.len();
        }
    }

    fn export(&mut self) {
        let Some(root) = self.root.as_deref() else {
            self.status_message = Some("demo mode: export needs a workspace".to_string());
            return;
        };
        let exporter = RequestFileExporter::new(workspace::ktree_dir(root));
        self.status_message = Some(
            match self
                .view
                .export_view(ExportFormat::default(), ExportOptions::default(), &exporter)
            {
                Ok(path) => format!("export request written to {}", path.display()),
                Err(err) => format!("export failed: {err}"),
            },
        );
    }

    /// Close the tour; the seen flag is only stored when the user opted out.
    fn complete_onboarding(&mut self) -> Result<()> {
        self.show_onboarding = false;
        if !self.onboarding_opt_out {
            return Ok(());
        }
        self.prefs.onboarding_seen = true;
        if let Some(root) = self.root.as_deref() {
            onboarding::set_seen(root, true)?;
        }
        Ok(())
    }

    fn persist_preferences(&self) -> Result<()> {
        if self.demo {
            return Ok(());
        }
        if let Some(root) = self.root.as_deref() {
            workspace::save_preferences(root, &self.prefs)?;
        }
        Ok(())
    }
}

pub fn run(demo: bool, open_settings: bool, timeline: bool) -> Result<()> {
    let mut app = AppState::load(demo, open_settings, timeline)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key)? {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }

    app.persist_preferences()?;
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
}
