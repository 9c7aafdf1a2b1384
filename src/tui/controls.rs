//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('+' | '=') | KeyCode::Right => app.speed_up(),
        KeyCode::Char('-') | KeyCode::Left => app.speed_down(),
        KeyCode::Up => app.adjust_threshold(1),
        KeyCode::Down => app.adjust_threshold(-1),
        KeyCode::Char('a') => app.toggle_auto(),
        KeyCode::Char(c @ '1'..='9') => {
            let slot = c as usize - '1' as usize;
            app.toggle_load(slot);
        }
        KeyCode::Char('f') => app.toggle_feeder(1),
        KeyCode::Char('g') => app.toggle_feeder(2),
        KeyCode::Char('o') => app.all_on(),
        KeyCode::Char('x') => app.all_off(),
        KeyCode::Char('r') => app.restart(),
        _ => {}
    }
}
