use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Pan(Direction),
    ZoomIn,
    ZoomOut,
    ResetView,
    FitView,
    NextNode,
    PrevNode,
    ClearSelection,
    ToggleTimeline,
    Reload,
    Export,
    OpenSettings,
    ToggleHelp,
    Quit,
    Noop,
}

pub fn action_for_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Pan(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Pan(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Action::Pan(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Pan(Direction::Right),
        KeyCode::Tab => Action::NextNode,
        KeyCode::BackTab => Action::PrevNode,
        KeyCode::Esc | KeyCode::Backspace => Action::ClearSelection,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::ZoomIn,
        KeyCode::Char('-') => Action::ZoomOut,
        KeyCode::Char('0') => Action::ResetView,
        KeyCode::Char('f') => Action::FitView,
        KeyCode::Char('t') => Action::ToggleTimeline,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('e') => Action::Export,
        KeyCode::Char('s') => Action::OpenSettings,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        _ => Action::Noop,
    }
}
