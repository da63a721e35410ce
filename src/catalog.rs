use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::constants;

// --- Helpers ---

/// Decode a field, treating `null` or a value of the wrong type as missing.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + DeserializeOwned,
{
  let value = Value::deserialize(deserializer)?;
  Ok(T::deserialize(value).unwrap_or_default())
}

/// Decode a list entry by entry, dropping the entries that do not fit.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let Value::Array(items) = Value::deserialize(deserializer)? else {
    return Ok(Vec::new());
  };
  Ok(
    items
      .into_iter()
      .filter_map(|item| {
        T::deserialize(item).map_err(|e| debug!(err = %e, "skipping undecodable catalog entry")).ok()
      })
      .collect(),
  )
}

// --- Dataset Model ---

/// Transport of a single stream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
  /// Segmented stream; needs the HLS bridge player.
  Hls,
  /// Page meant to be embedded as-is (YouTube live embeds and the like).
  Embed,
  /// Anything else is handed over unchanged.
  #[default]
  #[serde(other)]
  Direct,
}

impl TransportKind {
  pub fn label(self) -> &'static str {
    match self {
      TransportKind::Hls => "HLS",
      TransportKind::Embed => "EMBED",
      TransportKind::Direct => "DIRECT",
    }
  }
}

/// One candidate stream for a channel. An empty `url` means "not configured yet".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
  #[serde(default, deserialize_with = "lenient")]
  pub label: String,
  #[serde(rename = "tipo", default, deserialize_with = "lenient")]
  pub kind: TransportKind,
  #[serde(rename = "calidad", default, deserialize_with = "lenient")]
  pub quality: String,
  #[serde(default, deserialize_with = "lenient")]
  pub url: String,
}

impl Source {
  pub fn is_configured(&self) -> bool {
    !self.url.trim().is_empty()
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
  pub id: i64,
  #[serde(rename = "nombre")]
  pub name: String,
  #[serde(default, deserialize_with = "lenient")]
  pub slug: String,
  #[serde(default, deserialize_with = "lenient")]
  pub logo: String,
  #[serde(rename = "descripcion", default, deserialize_with = "lenient")]
  pub description: String,
  #[serde(rename = "descripcion_corta", default, deserialize_with = "lenient")]
  pub short_description: String,
  /// Legacy single-URL field for embeddable pages.
  #[serde(default, deserialize_with = "lenient")]
  pub url_embed: String,
  /// Legacy single-URL field for segmented streams.
  #[serde(default, deserialize_with = "lenient")]
  pub url_stream: String,
  #[serde(rename = "categoria", default, deserialize_with = "lenient")]
  pub category: String,
  #[serde(rename = "calidad", default, deserialize_with = "lenient")]
  pub quality: String,
  #[serde(rename = "año_fundacion", default, deserialize_with = "lenient")]
  pub founded: Option<i32>,
  #[serde(default, deserialize_with = "lenient")]
  pub region: String,
  #[serde(rename = "activo", default, deserialize_with = "lenient")]
  pub active: bool,
  #[serde(rename = "destacado", default, deserialize_with = "lenient")]
  pub featured: bool,
  #[serde(default, deserialize_with = "lenient_list")]
  pub tags: Vec<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub rating: Option<f64>,
  #[serde(rename = "vistas", default, deserialize_with = "lenient")]
  pub views: Option<u64>,
  #[serde(rename = "fuentes", default, deserialize_with = "lenient_list")]
  pub sources: Vec<Source>,
}

impl Channel {
  /// Short blurb for cards, falling back to the long description.
  pub fn blurb(&self) -> &str {
    if self.short_description.is_empty() { &self.description } else { &self.short_description }
  }

  /// Text the free-form search runs against: name, description and space-joined tags, run together.
  pub fn search_haystack(&self) -> String {
    format!("{}{}{}", self.name, self.description, self.tags.join(" ")).to_lowercase()
  }

  /// Count an opening of the player. In-memory only.
  pub fn record_view(&mut self) {
    self.views = Some(self.views.unwrap_or(0) + 1);
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteInfo {
  #[serde(rename = "nombre", default, deserialize_with = "lenient")]
  pub name: String,
  #[serde(default, deserialize_with = "lenient")]
  pub slogan: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
  #[serde(rename = "canales_por_pagina", default, deserialize_with = "lenient")]
  pub page_size: Option<usize>,
  #[serde(rename = "canal_destacado_id", default, deserialize_with = "lenient")]
  pub featured_channel_id: Option<i64>,
}

/// The whole dataset document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
  #[serde(rename = "sitio", default, deserialize_with = "lenient")]
  pub site: SiteInfo,
  #[serde(rename = "categorias", default, deserialize_with = "lenient_list")]
  pub categories: Vec<String>,
  #[serde(rename = "calidades", default, deserialize_with = "lenient_list")]
  pub qualities: Vec<String>,
  #[serde(rename = "canales", default, deserialize_with = "lenient_list")]
  pub channels: Vec<Channel>,
  #[serde(rename = "configuracion", default, deserialize_with = "lenient")]
  pub config: Option<CatalogConfig>,
}

impl Catalog {
  /// Configured page size; a missing or zero value falls back to the default.
  pub fn page_size(&self) -> usize {
    self
      .config
      .as_ref()
      .and_then(|c| c.page_size)
      .filter(|n| *n > 0)
      .unwrap_or(constants().default_page_size)
  }

  /// The hero channel: the configured featured ID, or the first channel.
  pub fn featured(&self) -> Option<&Channel> {
    let wanted = self.config.as_ref().and_then(|c| c.featured_channel_id);
    wanted.and_then(|id| self.channel(id)).or_else(|| self.channels.first())
  }

  pub fn channel(&self, id: i64) -> Option<&Channel> {
    self.channels.iter().find(|c| c.id == id)
  }

  pub fn active_count(&self) -> usize {
    self.channels.iter().filter(|c| c.active).count()
  }

  /// Distinct regions of active channels, in first-seen order.
  pub fn regions(&self) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for channel in self.channels.iter().filter(|c| c.active && !c.region.is_empty()) {
      if !regions.contains(&channel.region) {
        regions.push(channel.region.clone());
      }
    }
    regions
  }
}

// --- Loading ---

/// Where the catalog in use came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
  Loaded(String),
  /// The built-in sample, with the reason the real dataset was not used.
  Fallback(String),
}

pub fn parse_catalog(json: &str) -> Result<Catalog> {
  serde_json::from_str(json).context("Catalog is not valid channel JSON")
}

fn is_remote(location: &str) -> bool {
  location.starts_with("http://") || location.starts_with("https://")
}

async fn fetch_catalog(client: &Client, location: &str) -> Result<Catalog> {
  let body = if is_remote(location) {
    let response = client.get(location).send().await.with_context(|| format!("Failed to request {}", location))?;
    if !response.status().is_success() {
      return Err(anyhow!("Could not load {}: HTTP {}", location, response.status()));
    }
    response.text().await.with_context(|| format!("Failed to read body of {}", location))?
  } else {
    tokio::fs::read_to_string(location).await.with_context(|| format!("Could not load {}", location))?
  };
  parse_catalog(&body)
}

/// Load the dataset, substituting the built-in sample on any failure.
///
/// Single attempt: there is no retry and no timeout beyond the HTTP client's own.
pub async fn load_catalog(client: &Client, location: &str) -> (Catalog, CatalogOrigin) {
  match fetch_catalog(client, location).await {
    Ok(catalog) => {
      info!(location = %location, channels = catalog.channels.len(), "catalog loaded");
      (catalog, CatalogOrigin::Loaded(location.to_string()))
    }
    Err(e) => {
      warn!(location = %location, err = %format!("{:#}", e), "catalog unavailable, using sample data");
      (fallback_catalog(), CatalogOrigin::Fallback(format!("{:#}", e)))
    }
  }
}

/// One-channel sample used when the real dataset cannot be read.
pub fn fallback_catalog() -> Catalog {
  let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
  Catalog {
    site: SiteInfo { name: "TeleVe Chile".to_string(), slogan: "Tu TV nacional".to_string() },
    categories: strings(&["Noticias", "Entretenimiento", "Deportes", "Cultura"]),
    qualities: strings(&["4K", "FHD", "HD", "SD"]),
    channels: vec![Channel {
      id: 1,
      name: "Mega".to_string(),
      slug: "mega".to_string(),
      logo: concat!(
        "https://upload.wikimedia.org/wikipedia/commons/thumb/f/f0/",
        "Mega_Chile_logo.svg/2560px-Mega_Chile_logo.svg.png"
      )
      .to_string(),
      description: "Canal líder en Chile con entretenimiento, noticias y programas de farándula para toda la familia."
        .to_string(),
      short_description: "Entretenimiento para toda Chile".to_string(),
      url_embed: "https://www.youtube.com/embed/live_stream?channel=UCdSoqpNuGerAcXxFjcHnXsg".to_string(),
      url_stream: String::new(),
      category: "Entretenimiento".to_string(),
      quality: "HD".to_string(),
      founded: Some(1990),
      region: "Nacional".to_string(),
      active: true,
      featured: true,
      tags: strings(&["entretenimiento", "noticias", "farándula"]),
      rating: Some(4.5),
      views: Some(125_430),
      sources: Vec::new(),
    }],
    config: Some(CatalogConfig { page_size: Some(6), featured_channel_id: Some(1) }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  const SAMPLE: &str = r#"{
    "sitio": { "nombre": "TeleVe", "slogan": "x" },
    "categorias": ["Noticias", "Deportes"],
    "calidades": ["HD", "SD"],
    "canales": [
      {
        "id": 7, "nombre": "Canal Siete", "categoria": "Noticias", "calidad": "HD",
        "año_fundacion": 1969, "region": "Nacional", "activo": true, "destacado": false,
        "tags": ["noticias"], "rating": 4.1, "vistas": 10,
        "fuentes": [
          { "label": "Fuente 1", "tipo": "hls", "calidad": "HD", "url": "https://cdn.example/7.m3u8" },
          { "label": "Fuente 2", "tipo": "iframe", "calidad": "SD", "url": null }
        ]
      },
      { "id": 8, "nombre": "Ocho", "rating": null, "tags": null }
    ],
    "configuracion": { "canales_por_pagina": 12, "canal_destacado_id": 8 }
  }"#;

  #[test]
  fn parses_dataset_with_spanish_keys() {
    let catalog = parse_catalog(SAMPLE).unwrap();
    assert_eq!(catalog.site.name, "TeleVe");
    assert_eq!(catalog.categories, vec!["Noticias", "Deportes"]);
    let siete = catalog.channel(7).unwrap();
    assert_eq!(siete.founded, Some(1969));
    assert_eq!(siete.sources.len(), 2);
    assert_eq!(siete.sources[0].kind, TransportKind::Hls);
    assert_eq!(siete.sources[1].kind, TransportKind::Direct);
    assert!(!siete.sources[1].is_configured());
  }

  #[test]
  fn missing_and_null_fields_degrade_to_defaults() {
    let catalog = parse_catalog(SAMPLE).unwrap();
    let ocho = catalog.channel(8).unwrap();
    assert!(!ocho.active);
    assert_eq!(ocho.rating, None);
    assert!(ocho.tags.is_empty());
    assert!(ocho.sources.is_empty());
    assert_eq!(ocho.category, "");
  }

  const MISTYPED: &str = r#"{
    "canales": [
      { "id": 1, "nombre": "Uno", "activo": true, "rating": "4.5", "año_fundacion": "1990" },
      { "id": 2, "nombre": "Dos", "activo": true, "vistas": 10.5, "tags": ["hd", 3, "cultura"] },
      { "id": 3, "nombre": "Tres", "activo": 1, "destacado": "si", "fuentes": { "url": "x" } },
      { "nombre": "Sin id", "activo": true },
      { "id": 5, "nombre": "Cinco", "activo": true, "fuentes": [{ "tipo": 5, "url": "https://cdn.example/5.m3u8" }, 7] }
    ],
    "categorias": "Noticias",
    "configuracion": { "canales_por_pagina": "doce", "canal_destacado_id": 2 }
  }"#;

  #[test]
  fn wrongly_typed_optional_fields_fall_back_to_defaults() {
    let catalog = parse_catalog(
      r#"{"canales":[{"id":1,"nombre":"Uno","activo":true,"rating":"4.5"},{"id":2,"nombre":"Dos","activo":true,"vistas":10.5}]}"#,
    )
    .unwrap();
    assert_eq!(catalog.channels.len(), 2);
    assert_eq!(catalog.channel(1).unwrap().rating, None);
    assert!(catalog.channel(1).unwrap().active);
    assert_eq!(catalog.channel(2).unwrap().views, None);

    let catalog = parse_catalog(MISTYPED).unwrap();
    assert_eq!(catalog.channels.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3, 5]);
    assert_eq!(catalog.channel(1).unwrap().founded, None);
    assert_eq!(catalog.channel(2).unwrap().tags, vec!["hd", "cultura"]);
    let tres = catalog.channel(3).unwrap();
    assert!(!tres.active);
    assert!(!tres.featured);
    assert!(tres.sources.is_empty());
    let cinco = catalog.channel(5).unwrap();
    assert_eq!(cinco.sources.len(), 1);
    assert_eq!(cinco.sources[0].kind, TransportKind::Direct);
    assert!(catalog.categories.is_empty());
    assert_eq!(catalog.page_size(), 6);
    assert_eq!(catalog.featured().map(|c| c.id), Some(2));
  }

  #[test]
  fn page_size_and_featured_come_from_config() {
    let catalog = parse_catalog(SAMPLE).unwrap();
    assert_eq!(catalog.page_size(), 12);
    assert_eq!(catalog.featured().map(|c| c.id), Some(8));
  }

  #[test]
  fn missing_config_falls_back_to_default_page_size() {
    let catalog = parse_catalog(r#"{ "canales": [{ "id": 1, "nombre": "Uno" }] }"#).unwrap();
    assert_eq!(catalog.page_size(), 6);
    assert_eq!(catalog.featured().map(|c| c.id), Some(1));

    let zero = parse_catalog(r#"{ "configuracion": { "canales_por_pagina": 0 } }"#).unwrap();
    assert_eq!(zero.page_size(), 6);
  }

  #[test]
  fn unknown_featured_id_uses_first_channel() {
    let catalog =
      parse_catalog(r#"{ "canales": [{ "id": 3, "nombre": "Tres" }], "configuracion": { "canal_destacado_id": 99 } }"#)
        .unwrap();
    assert_eq!(catalog.featured().map(|c| c.id), Some(3));
  }

  #[test]
  fn record_view_starts_from_zero() {
    let mut channel = Channel { id: 1, name: "Uno".to_string(), ..Default::default() };
    channel.record_view();
    channel.record_view();
    assert_eq!(channel.views, Some(2));
  }

  #[test]
  fn blurb_prefers_short_description() {
    let mut channel = Channel { description: "long".to_string(), ..Default::default() };
    assert_eq!(channel.blurb(), "long");
    channel.short_description = "short".to_string();
    assert_eq!(channel.blurb(), "short");
  }

  #[test]
  fn regions_are_distinct_and_active_only() {
    let catalog = parse_catalog(
      r#"{ "canales": [
        { "id": 1, "nombre": "A", "activo": true, "region": "Nacional" },
        { "id": 2, "nombre": "B", "activo": true, "region": "Regional" },
        { "id": 3, "nombre": "C", "activo": true, "region": "Nacional" },
        { "id": 4, "nombre": "D", "activo": false, "region": "Internacional" }
      ] }"#,
    )
    .unwrap();
    assert_eq!(catalog.regions(), vec!["Nacional", "Regional"]);
    assert_eq!(catalog.active_count(), 3);
  }

  #[test]
  fn fallback_catalog_has_one_playable_channel() {
    let catalog = fallback_catalog();
    assert_eq!(catalog.channels.len(), 1);
    assert_eq!(catalog.page_size(), 6);
    assert!(!catalog.channels[0].url_embed.is_empty());
  }

  #[tokio::test]
  async fn load_reads_local_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let (catalog, origin) = load_catalog(&Client::new(), &path).await;
    assert_eq!(origin, CatalogOrigin::Loaded(path));
    assert_eq!(catalog.channels.len(), 2);
  }

  #[tokio::test]
  async fn load_keeps_dataset_with_mistyped_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MISTYPED.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let (catalog, origin) = load_catalog(&Client::new(), &path).await;
    assert_eq!(origin, CatalogOrigin::Loaded(path));
    assert_eq!(catalog.channels.len(), 4);
    assert!(catalog.channel(1).is_some_and(|c| c.name == "Uno"));
  }

  #[tokio::test]
  async fn load_missing_file_uses_fallback() {
    let (catalog, origin) = load_catalog(&Client::new(), "/definitely/not/here/canales.json").await;
    assert!(matches!(origin, CatalogOrigin::Fallback(_)));
    assert_eq!(catalog.channels[0].name, "Mega");
  }

  #[tokio::test]
  async fn load_malformed_json_uses_fallback() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let (catalog, origin) = load_catalog(&Client::new(), &path).await;
    assert!(matches!(origin, CatalogOrigin::Fallback(_)));
    assert_eq!(catalog.page_size(), 6);
  }
}
