//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Catalog location used when neither the CLI nor prefs name one.
  pub default_catalog: String,
  /// Page size used when the dataset carries no `configuracion`.
  pub default_page_size: usize,

  // Player hand-off
  /// Web player wrapping segmented (HLS) streams. `{url}` is replaced by the encoded stream URL.
  pub hls_bridge_template: String,
  /// Discovery link offered when nothing is playable. `{query}` is replaced by the encoded query.
  pub search_template: String,
  pub search_suffix: String,

  // Favorites persistence
  pub favorites_key: String,

  // Input
  pub search_debounce_ms: u64,
  pub error_dismiss_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed the unit tests catch it.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert_eq!(c.default_page_size, 6);
    assert_eq!(c.favorites_key, "televe_favorites");
    assert!(c.hls_bridge_template.contains("{url}"));
    assert!(c.search_template.contains("{query}"));
  }
}
