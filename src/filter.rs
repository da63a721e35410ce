//! Catalog filtering, ordering and pagination.
//!
//! Everything here is a pure function of the channel list and a [`FilterSpec`]:
//! the visible set never depends on anything else, so the controller can
//! recompute it from scratch on every change.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::catalog::Channel;

// --- Filter Spec ---

/// Ordering applied to the filtered channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
  /// Ascending name, Spanish collation.
  #[default]
  Name,
  /// Best rated first.
  Rating,
  /// Oldest channel first.
  Year,
  /// Most watched first.
  Views,
}

impl SortKey {
  pub const ALL: [SortKey; 4] = [SortKey::Name, SortKey::Rating, SortKey::Year, SortKey::Views];

  pub fn label(self) -> &'static str {
    match self {
      SortKey::Name => "name",
      SortKey::Rating => "rating",
      SortKey::Year => "year",
      SortKey::Views => "views",
    }
  }

  pub fn from_config(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "rating" => SortKey::Rating,
      "year" | "año" => SortKey::Year,
      "views" | "vistas" => SortKey::Views,
      _ => SortKey::Name,
    }
  }

  pub fn next(self) -> Self {
    let idx = SortKey::ALL.iter().position(|k| *k == self).unwrap_or(0);
    SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
  }
}

/// The current catalog view. Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
  pub search: String,
  pub category: String,
  pub quality: String,
  pub region: String,
  pub sort: SortKey,
}

impl FilterSpec {
  /// Normalized search needle (trimmed, lowercase).
  fn needle(&self) -> String {
    self.search.trim().to_lowercase()
  }

  pub fn is_unconstrained(&self) -> bool {
    self.needle().is_empty() && self.category.is_empty() && self.quality.is_empty() && self.region.is_empty()
  }
}

// --- Filtering ---

fn matches_needle(channel: &Channel, needle: &str) -> bool {
  needle.is_empty() || channel.search_haystack().contains(needle)
}

fn matches_exact(constraint: &str, value: &str) -> bool {
  constraint.is_empty() || constraint == value
}

/// Whether a channel belongs to the filtered view.
///
/// Inactive channels never match. Search is a case-insensitive substring test
/// against name, description and tags; the other constraints are exact.
pub fn matches(channel: &Channel, spec: &FilterSpec) -> bool {
  channel.active
    && matches_needle(channel, &spec.needle())
    && matches_exact(&spec.category, &channel.category)
    && matches_exact(&spec.quality, &channel.quality)
    && matches_exact(&spec.region, &channel.region)
}

fn compare_by(key: SortKey, a: &Channel, b: &Channel) -> Ordering {
  match key {
    SortKey::Rating => b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)),
    SortKey::Year => a.founded.unwrap_or(0).cmp(&b.founded.unwrap_or(0)),
    SortKey::Views => b.views.unwrap_or(0).cmp(&a.views.unwrap_or(0)),
    SortKey::Name => compare_names(&a.name, &b.name),
  }
}

/// Indices into `channels` of the filtered view, in display order.
pub fn filter_and_sort_indices(channels: &[Channel], spec: &FilterSpec) -> Vec<usize> {
  let mut indices: Vec<usize> = channels
    .iter()
    .enumerate()
    .filter(|(_, c)| matches(c, spec))
    .map(|(i, _)| i)
    .collect();
  // `sort_by` is stable, so equal keys keep catalog order.
  indices.sort_by(|&a, &b| compare_by(spec.sort, &channels[a], &channels[b]));
  indices
}

/// Borrowed form of [`filter_and_sort_indices`]; the app keeps indices.
#[cfg(test)]
pub fn filter_and_sort<'a>(channels: &'a [Channel], spec: &FilterSpec) -> Vec<&'a Channel> {
  filter_and_sort_indices(channels, spec).into_iter().map(|i| &channels[i]).collect()
}

/// Indices of favorite channels, in catalog order. Ignores the filter spec and the active flag.
pub fn favorites_indices(channels: &[Channel], favorites: &[i64]) -> Vec<usize> {
  channels.iter().enumerate().filter(|(_, c)| favorites.contains(&c.id)).map(|(i, _)| i).collect()
}

/// Active channel count per category, skipping categories with no channels.
pub fn category_counts(channels: &[Channel], categories: &[String]) -> Vec<(String, usize)> {
  categories
    .iter()
    .map(|cat| (cat.clone(), channels.iter().filter(|c| c.active && &c.category == cat).count()))
    .filter(|(_, count)| *count > 0)
    .collect()
}

// --- Collation ---

/// Sort key approximating Spanish locale collation.
///
/// Primary: base letters, with `ñ` between `n` and `o`; whitespace sorts before
/// punctuation, then digits, then letters. Secondary: accents. Tertiary: case,
/// lowercase first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
  primary: Vec<(u8, u32)>,
  secondary: Vec<u8>,
  tertiary: Vec<u8>,
}

fn fold_char(c: char) -> (char, u8) {
  let lower = c.to_lowercase().next().unwrap_or(c);
  match lower {
    'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => ('a', 1),
    'é' | 'è' | 'ê' | 'ë' => ('e', 1),
    'í' | 'ì' | 'î' | 'ï' => ('i', 1),
    'ó' | 'ò' | 'ô' | 'ö' | 'õ' => ('o', 1),
    'ú' | 'ù' | 'û' | 'ü' => ('u', 1),
    'ç' => ('c', 1),
    other => (other, 0),
  }
}

fn collation_key(s: &str) -> CollationKey {
  let mut key = CollationKey { primary: Vec::new(), secondary: Vec::new(), tertiary: Vec::new() };
  for c in s.chars() {
    let (base, accent) = fold_char(c);
    let weight = match base {
      'ñ' => (3, ('n' as u32) * 2 + 1),
      b if b.is_alphabetic() => (3, (b as u32) * 2),
      b if b.is_numeric() => (2, b as u32),
      b if b.is_whitespace() => (0, 0),
      b => (1, b as u32),
    };
    key.primary.push(weight);
    key.secondary.push(accent);
    key.tertiary.push(u8::from(c.is_uppercase()));
  }
  key
}

/// Locale-aware name comparison used for the default ordering.
pub fn compare_names(a: &str, b: &str) -> Ordering {
  collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

// --- Pagination ---

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
  if page_size == 0 { 0 } else { total.div_ceil(page_size) }
}

/// Clamp a 1-based page into `[1, page_count]`, or 1 when there are no pages.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
  page.clamp(1, page_count(total, page_size).max(1))
}

/// One page of a result set.
#[derive(Debug, PartialEq, Eq)]
pub enum PageSlice<'a, T> {
  Items(&'a [T]),
  /// Nothing to show on this page. Not an error.
  Empty,
}

impl<T> PageSlice<'_, T> {
  pub fn len(&self) -> usize {
    match self {
      PageSlice::Items(items) => items.len(),
      PageSlice::Empty => 0,
    }
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, PageSlice::Empty)
  }
}

/// Elements `[(page-1)*size, page*size)` of `items`; out-of-range pages yield [`PageSlice::Empty`].
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> PageSlice<'_, T> {
  if page == 0 || page_size == 0 {
    return PageSlice::Empty;
  }
  let start = (page - 1).saturating_mul(page_size);
  if start >= items.len() {
    return PageSlice::Empty;
  }
  let end = start.saturating_add(page_size).min(items.len());
  PageSlice::Items(&items[start..end])
}

/// An entry of the compact page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
  Page(usize),
  Gap,
}

/// First and last pages plus the neighbours of `current`, with a gap marker
/// where pages are elided. Empty when there is a single page or none.
pub fn page_markers(current: usize, total: usize) -> Vec<PageMarker> {
  if total <= 1 {
    return Vec::new();
  }
  let mut markers = Vec::new();
  for i in 1..=total {
    let shown = i == 1 || i == total || i.abs_diff(current) <= 1;
    if shown {
      markers.push(PageMarker::Page(i));
    } else if i == 2 || i == total - 1 {
      markers.push(PageMarker::Gap);
    }
  }
  markers
}
