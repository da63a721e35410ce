use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use std::time::Instant;

use crate::app::{App, AppMode, ViewKind};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// `'1'..='9'` as a zero-based index.
fn digit_index(c: char) -> Option<usize> {
  c.to_digit(10).filter(|d| *d > 0).map(|d| d as usize - 1)
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
    if app.player.is_playing() {
      app.player.stop().await.context("Failed to stop playback")?;
    }
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('o') {
    app.open_in_browser();
    return Ok(());
  }

  // Nothing to browse until the dataset arrives.
  if app.is_loading() {
    if key.code == KeyCode::Esc || key.code == KeyCode::Char('q') {
      app.should_quit = true;
    }
    return Ok(());
  }

  match app.mode {
    AppMode::Browse => handle_browse_key(app, key).await.context("Failed to handle browse key event")?,
    AppMode::Search => handle_search_key(app, key),
    AppMode::Player => handle_player_key(app, key).await.context("Failed to handle player key event")?,
  }
  Ok(())
}

async fn toggle_pause(app: &mut App) {
  if app.player.is_playing()
    && let Err(e) = app.player.toggle_pause().await
  {
    app.set_error(format!("Pause error: {}", e));
  }
}

async fn handle_browse_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Enter => app.open_selected(),
    KeyCode::Char(' ') => toggle_pause(app).await,
    KeyCode::Char('/') => {
      app.clear_error();
      app.mode = AppMode::Search;
    }
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
    KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => app.next_page(),
    KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => app.prev_page(),
    KeyCode::Home => app.go_to_page(1),
    KeyCode::End => app.go_to_page(app.page_count()),
    KeyCode::Char(c) if digit_index(c).is_some() => {
      if let Some(i) = digit_index(c) {
        app.go_to_page(i + 1);
      }
    }
    KeyCode::Char('c') => app.cycle_category(),
    KeyCode::Char('v') => app.cycle_quality(),
    KeyCode::Char('r') => app.cycle_region(),
    KeyCode::Char('s') => app.cycle_sort(),
    KeyCode::Char('x') => app.clear_filters(),
    KeyCode::Char('f') => app.toggle_current_favorite(),
    KeyCode::Char('F') => app.show_favorites(),
    KeyCode::Char('*') => app.open_featured(),
    KeyCode::Esc => {
      if app.view == ViewKind::Favorites || !app.filter.is_unconstrained() {
        app.clear_filters();
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
  Ok(())
}

fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  let now = Instant::now();
  match key.code {
    KeyCode::Enter => {
      app.commit_search();
      app.mode = AppMode::Browse;
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
      app.schedule_search(now);
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.schedule_search(now);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.schedule_search(now);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Down => {
      app.commit_search();
      app.mode = AppMode::Browse;
    }
    KeyCode::Esc => {
      app.input.clear();
      app.cursor_position = 0;
      app.input_scroll = 0;
      app.commit_search();
      app.mode = AppMode::Browse;
    }
    _ => {}
  }
}

async fn handle_player_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => app.close_panel(),
    KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.cycle_source(true),
    KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.cycle_source(false),
    KeyCode::Char(c) if digit_index(c).is_some() => {
      if let Some(i) = digit_index(c) {
        app.switch_source(i);
      }
    }
    KeyCode::Char('o') => app.open_in_browser(),
    KeyCode::Enter | KeyCode::Char('m') => app.play_in_mpv().await,
    KeyCode::Char(' ') => toggle_pause(app).await,
    KeyCode::Char('f') => app.toggle_current_favorite(),
    _ => {}
  }
  Ok(())
}
