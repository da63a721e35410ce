use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogOrigin, Channel, fallback_catalog, load_catalog};
use crate::config::Config;
use crate::constants::constants;
use crate::favorites::Favorites;
use crate::filter::{
  FilterSpec, PageSlice, SortKey, clamp_page, favorites_indices, filter_and_sort_indices, page_count, page_slice,
};
use crate::player::{self, NowPlaying, StreamPlayer};
use crate::resolver::{Resolution, resolve};
use crate::theme::THEMES;

// --- Types ---

pub type LoadResult = (Catalog, CatalogOrigin);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Navigating the channel cards.
  Browse,
  /// Typing into the search box.
  Search,
  /// Player panel open for one channel.
  Player,
}

/// Which list the cards come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
  /// Filtered and sorted by the current [`FilterSpec`].
  Catalog,
  /// The user's favorites, regardless of filters.
  Favorites,
}

/// The channel shown in the player panel and the source it resolved to.
#[derive(Debug, Clone)]
pub struct PlayerPanel {
  /// Index into `catalog.channels`.
  pub channel_idx: usize,
  /// The source the user asked for.
  pub requested: usize,
  pub resolution: Resolution,
}

/// Next value in `["", options...]` after `current`, wrapping around.
pub fn cycle_option(current: &str, options: &[String]) -> String {
  if current.is_empty() {
    return options.first().cloned().unwrap_or_default();
  }
  match options.iter().position(|o| o == current) {
    Some(i) if i + 1 < options.len() => options[i + 1].clone(),
    _ => String::new(),
  }
}

pub struct App {
  pub catalog: Catalog,
  /// `None` while the dataset is still loading.
  pub origin: Option<CatalogOrigin>,
  pub page_size: usize,
  page_size_override: Option<usize>,
  pub filter: FilterSpec,
  /// Search box contents; copied into `filter.search` once typing settles.
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  search_deadline: Option<Instant>,
  pub view: ViewKind,
  /// Indices into `catalog.channels` of the current view, in display order.
  pub visible: Vec<usize>,
  /// 1-based page into `visible`.
  pub page: usize,
  /// Selected card within the current page.
  pub selected: usize,
  pub favorites: Favorites,
  pub mode: AppMode,
  pub panel: Option<PlayerPanel>,
  pub player: StreamPlayer,
  pub http_client: Client,
  pub theme_index: usize,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message, shown with lower priority than status/error.
  pub info_message: Option<String>,
  pub should_quit: bool,
  catalog_rx: Option<oneshot::Receiver<LoadResult>>,
  /// When the last error was set, for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(config: &Config, favorites: Favorites, page_size_override: Option<usize>) -> Self {
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    let sort = config.sort.as_deref().map(SortKey::from_config).unwrap_or_default();

    Self {
      catalog: Catalog::default(),
      origin: None,
      page_size: page_size_override.unwrap_or(constants().default_page_size),
      page_size_override,
      filter: FilterSpec { sort, ..Default::default() },
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      search_deadline: None,
      view: ViewKind::Catalog,
      visible: Vec::new(),
      page: 1,
      selected: 0,
      favorites,
      mode: AppMode::Browse,
      panel: None,
      player: StreamPlayer::default(),
      http_client: Client::new(),
      theme_index,
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      catalog_rx: None,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by position() on initialization.
    &THEMES[self.theme_index]
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after the configured delay.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  fn save_config(&self, catalog: Option<String>) {
    let config = Config {
      theme_name: Some(self.theme().name.to_string()),
      catalog,
      sort: Some(self.filter.sort.label().to_string()),
    };
    config.save();
  }

  fn persist_prefs(&self) {
    let catalog = match self.origin {
      Some(CatalogOrigin::Loaded(ref location)) => Some(location.clone()),
      _ => Config::load().catalog,
    };
    self.save_config(catalog);
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.persist_prefs();
  }

  // --- Catalog loading ---

  /// Spawn the single dataset load. The result is picked up by `check_pending`.
  pub fn start_loading(&mut self, location: String) {
    info!(location = %location, "loading catalog");
    self.status_message = Some(format!("Loading {}…", location));
    let client = self.http_client.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(load_catalog(&client, &location).await);
    });
    self.catalog_rx = Some(rx);
  }

  /// Install a catalog and show its first page.
  pub fn set_catalog(&mut self, catalog: Catalog, origin: CatalogOrigin) {
    self.page_size = self.page_size_override.filter(|n| *n > 0).unwrap_or_else(|| catalog.page_size());
    if let CatalogOrigin::Fallback(ref reason) = origin {
      self.info_message = Some(format!("Using sample data: {}", reason));
    }
    self.catalog = catalog;
    self.origin = Some(origin);
    self.apply_filter();
  }

  pub fn is_loading(&self) -> bool {
    self.origin.is_none()
  }

  /// Poll the dataset load and the search debounce. Called once per frame.
  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.catalog_rx.take() {
      match rx.try_recv() {
        Ok((catalog, origin)) => {
          self.status_message = None;
          self.set_catalog(catalog, origin);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.catalog_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          error!("catalog load task dropped its result");
          self.set_catalog(fallback_catalog(), CatalogOrigin::Fallback("Catalog load task failed".to_string()));
        }
      }
    }

    self.flush_search(Instant::now());
  }

  // --- Filtering ---

  /// Recompute the catalog view from the filter spec. Resets to page 1.
  pub fn apply_filter(&mut self) {
    self.visible = filter_and_sort_indices(&self.catalog.channels, &self.filter);
    self.view = ViewKind::Catalog;
    self.page = 1;
    self.selected = 0;
    debug!(count = self.visible.len(), filter = ?self.filter, "filter applied");
  }

  /// Re-arm the search debounce. Each keystroke pushes the deadline back.
  pub fn schedule_search(&mut self, now: Instant) {
    self.search_deadline = Some(now + Duration::from_millis(constants().search_debounce_ms));
  }

  /// Apply the typed search once the debounce deadline has passed.
  pub fn flush_search(&mut self, now: Instant) {
    if let Some(deadline) = self.search_deadline
      && now >= deadline
    {
      self.commit_search();
    }
  }

  /// Apply the typed search immediately.
  pub fn commit_search(&mut self) {
    self.search_deadline = None;
    if self.filter.search != self.input || self.view != ViewKind::Catalog {
      self.filter.search = self.input.clone();
      self.apply_filter();
    }
  }

  pub fn search_pending(&self) -> bool {
    self.search_deadline.is_some()
  }

  pub fn cycle_category(&mut self) {
    self.filter.category = cycle_option(&self.filter.category, &self.catalog.categories);
    self.apply_filter();
  }

  pub fn cycle_quality(&mut self) {
    self.filter.quality = cycle_option(&self.filter.quality, &self.catalog.qualities);
    self.apply_filter();
  }

  pub fn cycle_region(&mut self) {
    self.filter.region = cycle_option(&self.filter.region, &self.catalog.regions());
    self.apply_filter();
  }

  pub fn cycle_sort(&mut self) {
    self.filter.sort = self.filter.sort.next();
    self.apply_filter();
    self.persist_prefs();
  }

  /// Jump straight to one category, as the category browser does.
  pub fn select_category(&mut self, category: &str) {
    self.filter.category = category.to_string();
    self.apply_filter();
  }

  pub fn clear_filters(&mut self) {
    let sort = self.filter.sort;
    self.filter = FilterSpec { sort, ..Default::default() };
    self.input.clear();
    self.cursor_position = 0;
    self.input_scroll = 0;
    self.search_deadline = None;
    self.apply_filter();
  }

  /// Switch to the favorites list. Leaves the filter spec untouched.
  pub fn show_favorites(&mut self) {
    if self.favorites.is_empty() {
      self.info_message = Some("No favorite channels yet".to_string());
      return;
    }
    self.visible = favorites_indices(&self.catalog.channels, self.favorites.ids());
    self.view = ViewKind::Favorites;
    self.page = 1;
    self.selected = 0;
    self.info_message = Some("Showing your favorites".to_string());
  }

  // --- Pagination ---

  pub fn page_count(&self) -> usize {
    page_count(self.visible.len(), self.page_size)
  }

  pub fn page_items(&self) -> PageSlice<'_, usize> {
    page_slice(&self.visible, self.page, self.page_size)
  }

  pub fn go_to_page(&mut self, page: usize) {
    self.page = clamp_page(page, self.visible.len(), self.page_size);
    self.selected = 0;
  }

  pub fn next_page(&mut self) {
    self.go_to_page(self.page + 1);
  }

  pub fn prev_page(&mut self) {
    self.go_to_page(self.page.saturating_sub(1));
  }

  /// Move the selection down, continuing onto the next page.
  pub fn select_next(&mut self) {
    let len = self.page_items().len();
    if self.selected + 1 < len {
      self.selected += 1;
    } else if self.page < self.page_count() {
      self.next_page();
    }
  }

  /// Move the selection up, continuing onto the end of the previous page.
  pub fn select_prev(&mut self) {
    if self.selected > 0 {
      self.selected -= 1;
    } else if self.page > 1 {
      self.prev_page();
      self.selected = self.page_items().len().saturating_sub(1);
    }
  }

  /// Index into `catalog.channels` of the selected card.
  pub fn selected_channel_idx(&self) -> Option<usize> {
    match self.page_items() {
      PageSlice::Items(items) => items.get(self.selected).copied(),
      PageSlice::Empty => None,
    }
  }

  pub fn selected_channel(&self) -> Option<&Channel> {
    self.selected_channel_idx().and_then(|i| self.catalog.channels.get(i))
  }

  // --- Player panel ---

  pub fn panel_channel(&self) -> Option<&Channel> {
    self.panel.as_ref().and_then(|p| self.catalog.channels.get(p.channel_idx))
  }

  /// Open the player panel for a channel on its first source.
  pub fn open_channel(&mut self, channel_idx: usize) {
    let Some(channel) = self.catalog.channels.get_mut(channel_idx) else { return };
    channel.record_view();
    info!(channel = %channel.name, id = channel.id, "channel opened");
    let resolution = Resolution::Unavailable { search_url: String::new() };
    self.panel = Some(PlayerPanel { channel_idx, requested: 0, resolution });
    self.mode = AppMode::Player;
    self.load_source(0);
  }

  pub fn open_selected(&mut self) {
    if let Some(idx) = self.selected_channel_idx() {
      self.open_channel(idx);
    }
  }

  /// Open the featured channel from the catalog config.
  pub fn open_featured(&mut self) {
    let Some(id) = self.catalog.featured().map(|c| c.id) else { return };
    if let Some(idx) = self.catalog.channels.iter().position(|c| c.id == id) {
      self.open_channel(idx);
    }
  }

  fn load_source(&mut self, idx: usize) {
    let Some(channel) = self.panel_channel() else { return };
    let resolution = resolve(channel, idx);
    let info = match &resolution {
      Resolution::Stream(stream) => match stream.skipped_from {
        Some(from) => Some(format!("Source {} empty, using source {}", from + 1, stream.source.unwrap_or(from) + 1)),
        None => stream.source.and_then(|s| channel.sources.get(s)).map(|s| format!("Loading {}…", s.label)),
      },
      Resolution::Unavailable { .. } => {
        warn!(channel = %channel.name, requested = idx, "no stream available");
        None
      }
    };
    if let Some(msg) = info {
      self.info_message = Some(msg);
    }
    if let Some(panel) = self.panel.as_mut() {
      panel.requested = idx;
      panel.resolution = resolution;
    }
  }

  /// Switch to source `idx`. Sources without a URL cannot be picked.
  pub fn switch_source(&mut self, idx: usize) {
    let configured = self.panel_channel().and_then(|c| c.sources.get(idx)).map(|s| s.is_configured());
    match configured {
      Some(true) => self.load_source(idx),
      Some(false) => self.set_error("No URL configured for that source".to_string()),
      None => {}
    }
  }

  /// Step to the next (or previous) configured source, wrapping around.
  pub fn cycle_source(&mut self, forward: bool) {
    let Some(panel) = self.panel.as_ref() else { return };
    let Some(channel) = self.panel_channel() else { return };
    let configured: Vec<usize> =
      channel.sources.iter().enumerate().filter(|(_, s)| s.is_configured()).map(|(i, _)| i).collect();
    if configured.is_empty() {
      return;
    }
    let current = match &panel.resolution {
      Resolution::Stream(stream) => stream.source.unwrap_or(0),
      Resolution::Unavailable { .. } => panel.requested,
    };
    let pos = configured.iter().position(|i| *i == current);
    let next = match (pos, forward) {
      (Some(p), true) => configured[(p + 1) % configured.len()],
      (Some(p), false) => configured[(p + configured.len() - 1) % configured.len()],
      (None, _) => configured[0],
    };
    self.switch_source(next);
  }

  pub fn close_panel(&mut self) {
    self.panel = None;
    self.mode = AppMode::Browse;
  }

  /// Open the resolved stream (or the discovery link) in the browser.
  pub fn open_in_browser(&mut self) {
    let Some(panel) = self.panel.as_ref() else { return };
    let url = panel.resolution.open_url().to_string();
    if let Err(e) = player::open_in_browser(&url) {
      self.set_error(format!("{:#}", e));
    }
  }

  /// Play the resolved source's raw URL in mpv.
  pub async fn play_in_mpv(&mut self) {
    let Some(panel) = self.panel.as_ref() else { return };
    let Resolution::Stream(stream) = &panel.resolution else {
      self.set_error("No stream available for this channel".to_string());
      return;
    };
    let Some(channel) = self.catalog.channels.get(panel.channel_idx) else { return };
    let now_playing = NowPlaying { channel_id: channel.id, title: channel.name.clone(), url: stream.raw_url.clone() };
    if let Err(e) = self.player.play(now_playing).await {
      self.set_error(format!("Playback error: {:#}", e));
      let _ = self.player.stop().await;
    }
  }

  // --- Favorites ---

  pub fn toggle_favorite(&mut self, channel_idx: usize) {
    let Some(channel) = self.catalog.channels.get(channel_idx) else { return };
    let (id, name) = (channel.id, channel.name.clone());
    match self.favorites.toggle(id) {
      Ok(true) => self.info_message = Some(format!("{} added to favorites", name)),
      Ok(false) => self.info_message = Some(format!("{} removed from favorites", name)),
      Err(e) => self.set_error(format!("{:#}", e)),
    }
  }

  /// Toggle the channel in the player panel, or the selected card.
  pub fn toggle_current_favorite(&mut self) {
    let target = match self.mode {
      AppMode::Player => self.panel.as_ref().map(|p| p.channel_idx),
      _ => self.selected_channel_idx(),
    };
    if let Some(idx) = target {
      self.toggle_favorite(idx);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{Source, TransportKind};
  use crate::favorites::MemoryStore;

  fn channel(id: i64, name: &str, category: &str) -> Channel {
    Channel {
      id,
      name: name.to_string(),
      category: category.to_string(),
      active: true,
      url_embed: format!("https://embed.example/{}", id),
      ..Default::default()
    }
  }

  fn catalog(n: i64) -> Catalog {
    Catalog {
      categories: vec!["Noticias".to_string(), "Deportes".to_string()],
      channels: (1..=n)
        .map(|i| channel(i, &format!("Canal {:02}", i), if i % 2 == 0 { "Deportes" } else { "Noticias" }))
        .collect(),
      ..Default::default()
    }
  }

  fn app_with(catalog: Catalog, store: MemoryStore) -> App {
    let mut app = App::new(&Config::default(), Favorites::load(Box::new(store)), None);
    app.set_catalog(catalog, CatalogOrigin::Loaded("test".to_string()));
    app
  }

  // --- cycle_option ---

  #[test]
  fn cycle_option_walks_through_all_then_none() {
    let opts = vec!["A".to_string(), "B".to_string()];
    assert_eq!(cycle_option("", &opts), "A");
    assert_eq!(cycle_option("A", &opts), "B");
    assert_eq!(cycle_option("B", &opts), "");
    assert_eq!(cycle_option("gone", &opts), "");
    assert_eq!(cycle_option("", &[]), "");
  }

  // --- Filtering and pagination ---

  #[test]
  fn catalog_install_uses_dataset_page_size() {
    let app = app_with(catalog(14), MemoryStore::default());
    assert_eq!(app.page_size, 6);
    assert_eq!(app.visible.len(), 14);
    assert_eq!(app.page_count(), 3);
  }

  #[test]
  fn page_size_override_wins() {
    let mut app = App::new(&Config::default(), Favorites::load(Box::new(MemoryStore::default())), Some(4));
    app.set_catalog(catalog(10), CatalogOrigin::Loaded("test".to_string()));
    assert_eq!(app.page_count(), 3);
  }

  #[test]
  fn filter_change_resets_to_first_page() {
    let mut app = app_with(catalog(14), MemoryStore::default());
    app.go_to_page(3);
    assert_eq!(app.page, 3);
    app.cycle_category();
    assert_eq!(app.filter.category, "Noticias");
    assert_eq!(app.page, 1);
    assert_eq!(app.visible.len(), 7);
  }

  #[test]
  fn go_to_page_is_clamped() {
    let mut app = app_with(catalog(14), MemoryStore::default());
    app.go_to_page(99);
    assert_eq!(app.page, 3);
    app.go_to_page(0);
    assert_eq!(app.page, 1);
  }

  #[test]
  fn selection_flows_across_pages() {
    let mut app = app_with(catalog(8), MemoryStore::default());
    for _ in 0..6 {
      app.select_next();
    }
    assert_eq!(app.page, 2);
    assert_eq!(app.selected, 0);
    assert_eq!(app.selected_channel().map(|c| c.id), Some(7));
    app.select_prev();
    assert_eq!(app.page, 1);
    assert_eq!(app.selected, 5);
  }

  #[test]
  fn empty_result_has_no_selection() {
    let mut app = app_with(catalog(3), MemoryStore::default());
    app.input = "zzz".to_string();
    app.commit_search();
    assert!(app.page_items().is_empty());
    assert_eq!(app.selected_channel_idx(), None);
    assert_eq!(app.page, 1);
  }

  #[test]
  fn search_waits_for_debounce() {
    let mut app = app_with(catalog(12), MemoryStore::default());
    let start = Instant::now();
    app.input = "canal 1".to_string();
    app.schedule_search(start);

    app.flush_search(start + Duration::from_millis(50));
    assert_eq!(app.visible.len(), 12);
    assert!(app.search_pending());

    app.flush_search(start + Duration::from_millis(constants().search_debounce_ms));
    assert!(!app.search_pending());
    assert_eq!(app.visible.len(), 3);
  }

  #[test]
  fn later_keystroke_supersedes_earlier_deadline() {
    let mut app = app_with(catalog(12), MemoryStore::default());
    let start = Instant::now();
    app.input = "canal 0".to_string();
    app.schedule_search(start);
    app.input = "canal 05".to_string();
    app.schedule_search(start + Duration::from_millis(200));

    app.flush_search(start + Duration::from_millis(300));
    assert!(app.search_pending());
    app.flush_search(start + Duration::from_millis(500));
    assert_eq!(app.visible.len(), 1);
  }

  #[test]
  fn clear_filters_keeps_sort() {
    let mut app = app_with(catalog(6), MemoryStore::default());
    app.filter.sort = SortKey::Views;
    app.select_category("Deportes");
    app.clear_filters();
    assert_eq!(app.filter, FilterSpec { sort: SortKey::Views, ..Default::default() });
    assert_eq!(app.visible.len(), 6);
  }

  // --- Favorites ---

  #[test]
  fn favorites_view_and_toggle() {
    let store = MemoryStore::default();
    let mut app = app_with(catalog(5), store.clone());

    app.show_favorites();
    assert_eq!(app.view, ViewKind::Catalog);

    app.toggle_favorite(3);
    app.toggle_favorite(1);
    assert_eq!(store.snapshot(), vec![4, 2]);

    app.show_favorites();
    assert_eq!(app.view, ViewKind::Favorites);
    assert_eq!(app.visible, vec![1, 3]);

    app.toggle_favorite(1);
    assert_eq!(store.snapshot(), vec![4]);
  }

  #[test]
  fn committing_search_leaves_favorites_view() {
    let mut app = app_with(catalog(5), MemoryStore::with_ids(&[1]));
    app.show_favorites();
    assert_eq!(app.view, ViewKind::Favorites);
    app.commit_search();
    assert_eq!(app.view, ViewKind::Catalog);
    assert_eq!(app.visible.len(), 5);
  }

  // --- Player panel ---

  fn multi_source_catalog() -> Catalog {
    let mut ch = channel(1, "Multi", "Noticias");
    ch.url_embed.clear();
    ch.sources = vec![
      Source { label: "Fuente 1".to_string(), kind: TransportKind::Embed, ..Default::default() },
      Source {
        label: "Fuente 2".to_string(),
        kind: TransportKind::Hls,
        quality: "FHD".to_string(),
        url: "https://cdn.example/2.m3u8".to_string(),
      },
      Source {
        label: "Fuente 3".to_string(),
        kind: TransportKind::Embed,
        quality: "SD".to_string(),
        url: "https://embed.example/3".to_string(),
      },
    ];
    Catalog { channels: vec![ch], ..Default::default() }
  }

  #[test]
  fn opening_a_channel_counts_a_view_and_resolves() {
    let mut app = app_with(multi_source_catalog(), MemoryStore::default());
    app.open_selected();
    assert_eq!(app.mode, AppMode::Player);
    assert_eq!(app.catalog.channels[0].views, Some(1));

    let panel = app.panel.as_ref().unwrap();
    let Resolution::Stream(stream) = &panel.resolution else { panic!("expected a stream") };
    assert_eq!(stream.source, Some(1));
    assert_eq!(stream.skipped_from, Some(0));
    assert_eq!(app.info_message.as_deref(), Some("Source 1 empty, using source 2"));
  }

  #[test]
  fn switching_to_an_empty_source_is_refused() {
    let mut app = app_with(multi_source_catalog(), MemoryStore::default());
    app.open_selected();
    app.switch_source(2);
    app.switch_source(0);
    assert!(app.last_error.is_some());
    let Resolution::Stream(stream) = &app.panel.as_ref().unwrap().resolution else { panic!("expected a stream") };
    assert_eq!(stream.source, Some(2));
  }

  #[test]
  fn cycling_sources_skips_unconfigured_ones() {
    let mut app = app_with(multi_source_catalog(), MemoryStore::default());
    app.open_selected();
    app.cycle_source(true);
    let source = |app: &App| match &app.panel.as_ref().unwrap().resolution {
      Resolution::Stream(s) => s.source,
      Resolution::Unavailable { .. } => None,
    };
    assert_eq!(source(&app), Some(2));
    app.cycle_source(true);
    assert_eq!(source(&app), Some(1));
    app.cycle_source(false);
    assert_eq!(source(&app), Some(2));
  }

  #[test]
  fn favorite_toggle_in_player_targets_open_channel() {
    let store = MemoryStore::default();
    let mut app = app_with(catalog(3), store.clone());
    app.open_channel(2);
    app.toggle_current_favorite();
    assert_eq!(store.snapshot(), vec![3]);
    app.close_panel();
    assert_eq!(app.mode, AppMode::Browse);
    assert!(app.panel.is_none());
  }

  #[test]
  fn fallback_origin_sets_info_message() {
    let mut app = App::new(&Config::default(), Favorites::load(Box::new(MemoryStore::default())), None);
    assert!(app.is_loading());
    app.set_catalog(crate::catalog::fallback_catalog(), CatalogOrigin::Fallback("Could not load x".to_string()));
    assert!(!app.is_loading());
    assert_eq!(app.info_message.as_deref(), Some("Using sample data: Could not load x"));
    assert_eq!(app.visible.len(), 1);
  }
}
