use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode, PlayerPanel, ViewKind};
use crate::catalog::Channel;
use crate::filter::{PageMarker, PageSlice, category_counts, page_markers};
use crate::resolver::{Resolution, available_count};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Group thousands with dots, as views are shown in the catalog: `125430` → `125.430`.
fn format_views(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push('.');
    }
    out.push(c);
  }
  out
}

fn or_all(value: &str) -> &str {
  if value.is_empty() { "All" } else { value }
}

fn rounded_block<'a>(theme: &Theme) -> Block<'a> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, filter_area, main_area, pages_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(5),
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_filter_bar(frame, app, filter_area);
  render_main(frame, app, main_area);
  render_pages(frame, app, pages_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let site = &app.catalog.site;
  let name = if site.name.is_empty() { "televe" } else { site.name.as_str() };
  let title_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
  let mut spans = vec![Span::styled(format!(" ▶ {} ", name), title_style)];
  if !site.slogan.is_empty() {
    spans.push(Span::styled(site.slogan.as_str(), Style::default().fg(theme.muted)));
  }
  frame.render_widget(Line::from(spans), area);

  let right_text = if app.is_loading() {
    format!("v{} ", env!("CARGO_PKG_VERSION"))
  } else {
    format!(
      "{} channels · ♥ {}  v{} ",
      app.catalog.active_count(),
      app.favorites.len(),
      env!("CARGO_PKG_VERSION")
    )
  };
  let width = right_text.chars().count() as u16;
  let right = Line::from(Span::styled(right_text, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let label = Style::default().fg(theme.muted);
  let value = Style::default().fg(theme.fg).add_modifier(Modifier::BOLD);

  let line = if app.view == ViewKind::Favorites {
    Line::from(vec![
      Span::styled(" ♥ Favorites ", Style::default().fg(theme.favorite).add_modifier(Modifier::BOLD)),
      Span::styled(format!("{} channels", app.visible.len()), label),
    ])
  } else {
    let f = &app.filter;
    let mut spans = vec![
      Span::styled(" Category ", label),
      Span::styled(or_all(&f.category).to_string(), value),
      Span::styled("  Quality ", label),
      Span::styled(or_all(&f.quality).to_string(), value),
      Span::styled("  Region ", label),
      Span::styled(or_all(&f.region).to_string(), value),
      Span::styled("  Sort ", label),
      Span::styled(f.sort.label(), value),
    ];
    if !f.search.trim().is_empty() {
      spans.push(Span::styled("  Search ", label));
      spans.push(Span::styled(format!("\"{}\"", f.search.trim()), value));
    }
    spans.push(Span::styled(format!("  · {} results", app.visible.len()), label));
    Line::from(spans)
  };
  frame.render_widget(line, area);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
  if app.is_loading() {
    render_loading(frame, app.theme(), area);
    return;
  }

  let [side_area, content_area] = Layout::horizontal([Constraint::Length(26), Constraint::Min(20)]).areas(area);
  render_categories(frame, app, side_area);

  match (app.mode, app.panel.as_ref()) {
    (AppMode::Player, Some(panel)) => render_player(frame, app, panel, content_area),
    _ => render_cards(frame, app, content_area),
  }
}

fn render_loading(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  Loading channels…", Style::default().fg(theme.accent).bold())),
    Line::from(""),
    Line::from(Span::styled(
      "The sample catalog is used if the dataset cannot be read.",
      Style::default().fg(theme.muted),
    )),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme));
  frame.render_widget(paragraph, area);
}

fn render_categories(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(4) as usize;
  let mut counts = vec![(String::new(), app.catalog.active_count())];
  counts.extend(category_counts(&app.catalog.channels, &app.catalog.categories));

  let items: Vec<ListItem> = counts
    .iter()
    .map(|(category, count)| {
      let selected = app.view == ViewKind::Catalog && &app.filter.category == category;
      let category = or_all(category);
      let count_str = count.to_string();
      let name = truncate_str(category, inner_w.saturating_sub(count_str.len() + 1));
      let gap = inner_w.saturating_sub(name.chars().count() + count_str.len());
      let fg = if selected { theme.accent } else { theme.fg };
      ListItem::new(Line::from(vec![
        Span::styled(name, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(count_str, Style::default().fg(theme.muted)),
      ]))
    })
    .collect();

  let list = List::new(items).block(
    rounded_block(theme)
      .title(" Categories ")
      .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
      .padding(Padding::horizontal(1)),
  );
  frame.render_widget(list, area);
}

fn card_item<'a>(app: &App, channel: &Channel, row: usize, inner_w: usize) -> ListItem<'a> {
  let theme = app.theme();
  let bg = if row % 2 == 1 { theme.stripe_bg } else { theme.bg };

  let mut badges = String::new();
  if app.favorites.contains(channel.id) {
    badges.push_str("♥ ");
  }
  if channel.featured {
    badges.push_str("★ ");
  }

  let mut meta: Vec<String> = Vec::new();
  if !channel.quality.is_empty() {
    meta.push(channel.quality.clone());
  }
  if !channel.category.is_empty() {
    meta.push(channel.category.clone());
  }
  if let Some(rating) = channel.rating {
    meta.push(format!("★ {:.1}", rating));
  }
  let right = meta.join(" · ");
  let right_w = right.chars().count();
  let badges_w = badges.chars().count();
  let title = truncate_str(&channel.name, inner_w.saturating_sub(right_w + badges_w + 2));
  let gap = inner_w.saturating_sub(badges_w + title.chars().count() + right_w);

  let first = Line::from(vec![
    Span::styled(badges, Style::default().fg(theme.favorite)),
    Span::styled(title, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    Span::raw(" ".repeat(gap)),
    Span::styled(right, Style::default().fg(theme.muted)),
  ]);

  let mut detail = channel.blurb().to_string();
  if let Some(views) = channel.views {
    let views = format!("{} views", format_views(views));
    detail = if detail.is_empty() { views } else { format!("{}  ·  {}", detail, views) };
  }
  let second = Line::from(Span::styled(truncate_str(&detail, inner_w), Style::default().fg(theme.muted)));

  ListItem::new(vec![first, second]).bg(bg)
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let title = match app.view {
    ViewKind::Catalog => " Channels ".to_string(),
    ViewKind::Favorites => " ♥ Favorites ".to_string(),
  };
  let block =
    rounded_block(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  let PageSlice::Items(indices) = app.page_items() else {
    let text = vec![
      Line::from(""),
      Line::from(Span::styled(
        "No channels match these filters",
        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
      )),
      Line::from(""),
      Line::from(Span::styled("Press x to clear filters", Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
    return;
  };

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = indices
    .iter()
    .enumerate()
    .filter_map(|(row, &idx)| app.catalog.channels.get(idx).map(|c| card_item(app, c, row, inner_w)))
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  let mut state = ListState::default().with_selected(Some(app.selected));
  frame.render_stateful_widget(list, area, &mut state);
}

fn render_player(frame: &mut Frame, app: &App, panel: &PlayerPanel, area: Rect) {
  let theme = app.theme();
  let Some(channel) = app.catalog.channels.get(panel.channel_idx) else { return };
  let inner_w = area.width.saturating_sub(4) as usize;
  let label = Style::default().fg(theme.muted);
  let value = Style::default().fg(theme.fg);

  let favorite = if app.favorites.contains(channel.id) { " ♥" } else { "" };
  let title = Line::from(vec![
    Span::styled(format!(" {} ", channel.name), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("{} ", favorite), Style::default().fg(theme.favorite)),
  ]);
  let block = rounded_block(theme).title(title).padding(Padding::horizontal(1));

  let mut lines = vec![Line::from("")];
  let mut facts: Vec<Span> = Vec::new();
  let mut push_fact = |name: &'static str, text: String| {
    if !text.is_empty() {
      facts.push(Span::styled(format!("{} ", name), label));
      facts.push(Span::styled(format!("{}   ", text), value));
    }
  };
  push_fact("Category", channel.category.clone());
  push_fact("Quality", channel.quality.clone());
  push_fact("Region", channel.region.clone());
  push_fact("Since", channel.founded.map(|y| y.to_string()).unwrap_or_default());
  push_fact("Views", channel.views.map(format_views).unwrap_or_default());
  lines.push(Line::from(facts));
  if !channel.description.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(channel.description.clone(), value)));
  }

  if !channel.sources.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      format!("Sources ({} available)", available_count(channel)),
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )));
    let active = match &panel.resolution {
      Resolution::Stream(stream) => stream.source,
      Resolution::Unavailable { .. } => None,
    };
    for (i, source) in channel.sources.iter().enumerate() {
      let text = format!(
        " {} {} · {} · {} ",
        i + 1,
        if source.label.is_empty() { "Source" } else { source.label.as_str() },
        source.kind.label(),
        if source.quality.is_empty() { "?" } else { source.quality.as_str() },
      );
      let style = if Some(i) == active {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
      } else if source.is_configured() {
        value
      } else {
        label.add_modifier(Modifier::CROSSED_OUT)
      };
      lines.push(Line::from(Span::styled(text, style)));
    }
  }

  lines.push(Line::from(""));
  match &panel.resolution {
    Resolution::Stream(stream) => {
      let via = if stream.bridged { "Stream (HLS bridge)" } else { "Stream" };
      lines.push(Line::from(Span::styled(via, label)));
      lines.push(Line::from(Span::styled(
        truncate_str(&stream.url, inner_w),
        Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
      )));
      let playing_here = app.player.now_playing.as_ref().is_some_and(|np| np.channel_id == channel.id);
      if playing_here {
        let state = if app.player.paused { "Paused in mpv" } else { "Playing in mpv" };
        lines.push(Line::from(Span::styled(state, Style::default().fg(theme.status))));
      }
    }
    Resolution::Unavailable { search_url } => {
      lines.push(Line::from(Span::styled(
        "No stream available for this channel",
        Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
      )));
      lines.push(Line::from(Span::styled("Search the web instead (o):", label)));
      lines.push(Line::from(Span::styled(
        truncate_str(search_url, inner_w),
        Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
      )));
    }
  }

  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
  frame.render_widget(paragraph, area);
}

fn render_pages(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let total = app.page_count();
  let markers = page_markers(app.page, total);
  if markers.is_empty() {
    return;
  }

  let nav = |enabled: bool| Style::default().fg(if enabled { theme.fg } else { theme.border });
  let mut spans = vec![Span::styled(" ‹ prev ", nav(app.page > 1))];
  for marker in markers {
    match marker {
      PageMarker::Page(n) if n == app.page => spans.push(Span::styled(
        format!(" {} ", n),
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD),
      )),
      PageMarker::Page(n) => spans.push(Span::styled(format!(" {} ", n), Style::default().fg(theme.muted))),
      PageMarker::Gap => spans.push(Span::styled(" … ", Style::default().fg(theme.border))),
    }
  }
  spans.push(Span::styled(" next › ", nav(app.page < total)));
  frame.render_widget(Line::from(spans).alignment(Alignment::Center), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(status) = app.player.last_mpv_status() {
    (format!(" ♪ {}", status), Style::default().fg(theme.status))
  } else if let Some(info) = &app.info_message {
    (format!(" {}", info), Style::default().fg(theme.muted))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Search { theme.accent } else { theme.border };
  let title = if app.search_pending() { " Search channels … " } else { " Search channels " };
  let input_block = Block::bordered()
    .title(title)
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  // No room for a cursor inside the borders.
  if app.mode == AppMode::Search && inner_w > 0 {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Browse => {
      let mut k = vec![("Enter", "Open"), ("/", "Search"), ("←/→", "Page"), ("c/v/r", "Filter"), ("s", "Sort")];
      k.push(("f", "Fav"));
      k.push(("F", "Favorites"));
      if is_playing {
        k.push(("^s", "Stop"));
      }
      k.push(("^t", "Theme"));
      k.push(("q", "Quit"));
      k
    }
    AppMode::Search => vec![("Enter", "Apply"), ("Esc", "Clear"), ("↓", "Results")],
    AppMode::Player => {
      let available = app.panel.as_ref().is_some_and(|p| p.resolution.is_available());
      let mut k = vec![("1-9/Tab", "Source")];
      if available {
        k.push(("o", "Browser"));
        k.push(("Enter", "mpv"));
      } else {
        k.push(("o", "Search web"));
      }
      k.push(("f", "Fav"));
      if is_playing {
        let pause_label = if app.player.paused { "Resume" } else { "Pause" };
        k.push(("Space", pause_label));
        k.push(("^s", "Stop"));
      }
      k.push(("Esc", "Back"));
      k
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let width = theme_label.chars().count() as u16;
  let right = Line::from(Span::styled(theme_label, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(right, right_area);
}
