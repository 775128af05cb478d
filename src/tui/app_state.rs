use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// User intents the terminal front end understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TuiAction {
    MoveUp,
    MoveDown,
    ToggleDir,
    ToggleAll,
    CopyRow,
    CopySelected,
    Rescan,
    Quit,
}

pub(super) fn action_for(key: KeyEvent) -> Option<TuiAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(TuiAction::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(TuiAction::Quit),
        KeyCode::Down | KeyCode::Char('j') => Some(TuiAction::MoveDown),
        KeyCode::Up | KeyCode::Char('k') => Some(TuiAction::MoveUp),
        KeyCode::Char('o') | KeyCode::Tab | KeyCode::Enter | KeyCode::Char(' ') => {
            Some(TuiAction::ToggleDir)
        }
        KeyCode::Char('*') | KeyCode::Char('a') => Some(TuiAction::ToggleAll),
        KeyCode::Char('c') => Some(TuiAction::CopyRow),
        KeyCode::Char('C') => Some(TuiAction::CopySelected),
        KeyCode::Char('r') => Some(TuiAction::Rescan),
        _ => None,
    }
}
