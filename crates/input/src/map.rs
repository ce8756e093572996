//! Key mapping from terminal events to player actions.

use crate::types::{PlayerAction, MAX_HAND_SIZE};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to player actions.
///
/// Key releases are ignored so terminals that report them don't act twice.
pub fn handle_key_event(key: KeyEvent) -> Option<PlayerAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    let cursor = |dx: i8, dy: i8| Some(PlayerAction::MoveCursor { dx, dy });

    match key.code {
        // Hand slots
        KeyCode::Char(c @ '1'..='9') => {
            let slot = c as u8 - b'1';
            (slot < MAX_HAND_SIZE).then_some(PlayerAction::SelectSlot(slot))
        }
        KeyCode::Tab => Some(PlayerAction::NextSlot),

        // Cursor
        KeyCode::Left
        | KeyCode::Char('h')
        | KeyCode::Char('H')
        | KeyCode::Char('a')
        | KeyCode::Char('A') => cursor(-1, 0),
        KeyCode::Right
        | KeyCode::Char('l')
        | KeyCode::Char('L')
        | KeyCode::Char('d')
        | KeyCode::Char('D') => cursor(1, 0),
        KeyCode::Up
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W') => cursor(0, -1),
        KeyCode::Down
        | KeyCode::Char('j')
        | KeyCode::Char('J')
        | KeyCode::Char('s')
        | KeyCode::Char('S') => cursor(0, 1),

        // Actions
        KeyCode::Enter | KeyCode::Char(' ') => Some(PlayerAction::Drop),
        KeyCode::Esc => Some(PlayerAction::Cancel),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(PlayerAction::Restart),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(PlayerAction::SwitchMode),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
