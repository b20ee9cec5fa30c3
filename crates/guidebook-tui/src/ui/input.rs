//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use guidebook_core::{Action, View};

use crate::app::{can_add_slug_char, App, AppState, GuideStatus, MENU};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    if matches!(app.state, AppState::EnteringSlug) {
        handle_slug_input(app, key);
        return false;
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return false;
    }

    // Any key clears a transient status message
    app.status_message = None;

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Char('g') => {
            app.start_slug_prompt();
            return false;
        }
        _ => {}
    }

    if matches!(app.guide, GuideStatus::Loaded(_)) {
        handle_guide_input(app, key);
    } else if matches!(app.guide, GuideStatus::NotFound { .. }) {
        match key.code {
            KeyCode::Char('r') => app.retry(),
            KeyCode::Char('h') => app.start_slug_prompt(),
            _ => {}
        }
    }
    false
}

fn handle_slug_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_slug(),
        KeyCode::Esc => {
            app.slug_input.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.slug_input.pop();
        }
        KeyCode::Char(c) if can_add_slug_char(app.slug_input.chars().count(), c) => {
            app.slug_input.push(c);
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.dispatch(Action::ClearQuery);
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            let mut query = app.view.query.clone();
            query.pop();
            app.dispatch(Action::SetQuery(query));
        }
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Char(c) if !c.is_control() => {
            let mut query = app.view.query.clone();
            query.push(c);
            app.dispatch(Action::SetQuery(query));
        }
        _ => {}
    }
}

fn handle_guide_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            if let Some(view) = MENU.get(index) {
                app.navigate(*view);
            }
        }
        KeyCode::Char('e') => app.navigate(View::Emergency),
        KeyCode::Char('m') | KeyCode::Char('h') => app.navigate(View::Home),
        KeyCode::Esc => {
            if app.view.view == View::Find && !app.view.query.is_empty() {
                app.dispatch(Action::ClearQuery);
            } else {
                app.navigate(View::Home);
            }
        }
        KeyCode::Backspace | KeyCode::Char('b') | KeyCode::Char('[') => app.back(),
        KeyCode::Char(']') | KeyCode::Char('f') => app.forward(),
        KeyCode::Char('l') => app.cycle_language(),
        KeyCode::Char('/') => {
            app.navigate(View::Find);
            app.state = AppState::Searching;
        }
        KeyCode::Char('c') if app.view.view == View::Wifi => {
            let password = app
                .loaded()
                .and_then(|l| l.guide.wifi.as_ref())
                .map(|wifi| wifi.password.clone());
            if let Some(password) = password {
                app.copy_to_clipboard(&password);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => app.activate_selection(),
        KeyCode::Char('r') => app.retry(),
        _ => {}
    }
}
