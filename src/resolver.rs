//! Stream source resolution.
//!
//! Given a channel and the source index the user asked for, decide which URL
//! the player should open. Resolution never fails: when nothing is playable
//! the result is [`Resolution::Unavailable`], which still carries a web search
//! link so the user has somewhere to go.

use crate::catalog::{Channel, Source, TransportKind};
use crate::constants::constants;

/// A playable URL picked for a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
  /// URL to hand to the browser (bridged for segmented streams).
  pub url: String,
  /// The configured stream URL before bridging, suitable for a media player.
  pub raw_url: String,
  /// Index of the source used, or `None` for the legacy single-URL fields.
  pub source: Option<usize>,
  /// Whether `url` goes through the HLS bridge player.
  pub bridged: bool,
  /// Set when the requested source was empty and a later one was used instead.
  pub skipped_from: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  Stream(ResolvedStream),
  /// Nothing configured for this channel. Not an error.
  Unavailable { search_url: String },
}

impl Resolution {
  pub fn is_available(&self) -> bool {
    matches!(self, Resolution::Stream(_))
  }

  /// The URL an "open" action should use: the stream, or the discovery link.
  pub fn open_url(&self) -> &str {
    match self {
      Resolution::Stream(stream) => &stream.url,
      Resolution::Unavailable { search_url } => search_url,
    }
  }
}

/// Wrap a segmented-stream URL in the external HLS web player.
pub fn bridge_url(stream_url: &str) -> String {
  constants().hls_bridge_template.replace("{url}", &urlencoding::encode(stream_url))
}

/// Web search for the channel's live stream, offered when nothing is playable.
pub fn search_url(channel_name: &str) -> String {
  let query = format!("{}{}", channel_name, constants().search_suffix);
  constants().search_template.replace("{query}", &urlencoding::encode(&query))
}

fn unavailable(channel: &Channel) -> Resolution {
  Resolution::Unavailable { search_url: search_url(&channel.name) }
}

fn resolve_legacy(channel: &Channel) -> Resolution {
  let embed = channel.url_embed.trim();
  let stream = channel.url_stream.trim();
  let raw = if embed.is_empty() { stream } else { embed };
  if raw.is_empty() {
    return unavailable(channel);
  }
  // A stream URL with no embed URL alongside it is a segmented stream.
  let bridged = !stream.is_empty() && embed.is_empty();
  let url = if bridged { bridge_url(raw) } else { raw.to_string() };
  Resolution::Stream(ResolvedStream { url, raw_url: raw.to_string(), source: None, bridged, skipped_from: None })
}

fn resolve_source(source: &Source, idx: usize, skipped_from: Option<usize>) -> Resolution {
  let raw = source.url.trim();
  let bridged = source.kind == TransportKind::Hls;
  let url = if bridged { bridge_url(raw) } else { raw.to_string() };
  Resolution::Stream(ResolvedStream { url, raw_url: raw.to_string(), source: Some(idx), bridged, skipped_from })
}

/// Resolve which URL to load for `channel` when source `idx` is requested.
///
/// Channels without sources use the legacy `url_embed`/`url_stream` fields.
/// An empty or out-of-range source falls through to the first configured
/// source after it; earlier sources are never retried and the scan does not
/// wrap around.
pub fn resolve(channel: &Channel, idx: usize) -> Resolution {
  if channel.sources.is_empty() {
    return resolve_legacy(channel);
  }
  match channel.sources.get(idx) {
    Some(source) if source.is_configured() => resolve_source(source, idx, None),
    _ => {
      let next = channel.sources.iter().enumerate().skip(idx.saturating_add(1)).find(|(_, s)| s.is_configured());
      match next {
        Some((next_idx, source)) => resolve_source(source, next_idx, Some(idx)),
        None => unavailable(channel),
      }
    }
  }
}

/// Number of sources with a URL configured.
pub fn available_count(channel: &Channel) -> usize {
  channel.sources.iter().filter(|s| s.is_configured()).count()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn source(url: &str, kind: TransportKind) -> Source {
    Source { label: "Fuente".to_string(), kind, quality: "HD".to_string(), url: url.to_string() }
  }

  fn channel_with(sources: Vec<Source>) -> Channel {
    Channel { id: 1, name: "Canal 13".to_string(), active: true, sources, ..Default::default() }
  }

  #[test]
  fn forward_scan_skips_empty_sources() {
    let channel = channel_with(vec![
      source("", TransportKind::Embed),
      source("  ", TransportKind::Embed),
      source("X", TransportKind::Hls),
    ]);
    let Resolution::Stream(stream) = resolve(&channel, 0) else { panic!("expected a stream") };
    assert_eq!(stream.url, bridge_url("X"));
    assert_eq!(stream.raw_url, "X");
    assert_eq!(stream.source, Some(2));
    assert_eq!(stream.skipped_from, Some(0));
    assert!(stream.bridged);
  }

  #[test]
  fn direct_source_is_used_unchanged() {
    let channel = channel_with(vec![source("https://www.youtube.com/embed/abc", TransportKind::Embed)]);
    let Resolution::Stream(stream) = resolve(&channel, 0) else { panic!("expected a stream") };
    assert_eq!(stream.url, "https://www.youtube.com/embed/abc");
    assert!(!stream.bridged);
    assert_eq!(stream.skipped_from, None);
  }

  #[test]
  fn forward_scan_never_wraps_around() {
    let channel = channel_with(vec![source("A", TransportKind::Embed), source("", TransportKind::Embed)]);
    assert!(matches!(resolve(&channel, 1), Resolution::Unavailable { .. }));
    assert!(resolve(&channel, 0).is_available());
  }

  #[test]
  fn out_of_range_index_is_unavailable() {
    let channel = channel_with(vec![source("A", TransportKind::Embed)]);
    assert!(matches!(resolve(&channel, 5), Resolution::Unavailable { .. }));
  }

  #[test]
  fn all_sources_empty_is_unavailable() {
    let channel = channel_with(vec![source("", TransportKind::Hls), source("", TransportKind::Embed)]);
    let resolution = resolve(&channel, 0);
    let Resolution::Unavailable { search_url } = &resolution else { panic!("expected unavailable") };
    assert!(search_url.contains("Canal%2013"));
    assert_eq!(resolution.open_url(), search_url);
  }

  #[test]
  fn legacy_stream_only_is_bridged() {
    let mut channel = channel_with(Vec::new());
    channel.url_stream = "Y".to_string();
    let Resolution::Stream(stream) = resolve(&channel, 0) else { panic!("expected a stream") };
    assert_eq!(stream.url, bridge_url("Y"));
    assert_eq!(stream.source, None);
    assert!(stream.bridged);
  }

  #[test]
  fn legacy_embed_wins_over_stream() {
    let mut channel = channel_with(Vec::new());
    channel.url_embed = "https://embed.example/live".to_string();
    channel.url_stream = "https://cdn.example/live.m3u8".to_string();
    let Resolution::Stream(stream) = resolve(&channel, 0) else { panic!("expected a stream") };
    assert_eq!(stream.url, "https://embed.example/live");
    assert!(!stream.bridged);
  }

  #[test]
  fn nothing_configured_offers_search_link_with_name() {
    let channel = channel_with(Vec::new());
    let Resolution::Unavailable { search_url } = resolve(&channel, 0) else { panic!("expected unavailable") };
    assert!(!search_url.is_empty());
    assert!(search_url.contains("Canal%2013%20en%20vivo"));
  }

  #[test]
  fn resolution_is_idempotent() {
    let channel = channel_with(vec![source("", TransportKind::Embed), source("Z", TransportKind::Hls)]);
    for idx in 0..3 {
      assert_eq!(resolve(&channel, idx), resolve(&channel, idx));
    }
  }

  #[test]
  fn bridge_url_encodes_the_stream() {
    let url = bridge_url("https://cdn.example/a b.m3u8?x=1&y=2");
    assert_eq!(url, "https://www.hlsplayer.net/play?url=https%3A%2F%2Fcdn.example%2Fa%20b.m3u8%3Fx%3D1%26y%3D2");
  }

  #[test]
  fn available_count_ignores_blank_urls() {
    let channel = channel_with(vec![
      source("", TransportKind::Hls),
      source("A", TransportKind::Embed),
      source(" ", TransportKind::Hls),
    ]);
    assert_eq!(available_count(&channel), 1);
  }
}
