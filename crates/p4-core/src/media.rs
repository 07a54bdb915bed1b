//! Archive media items and their rendered tiles

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// One entry of the archive picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt: String,
    /// Set once the item has been imported into the media library.
    #[serde(
        default,
        rename = "wordpress_id",
        deserialize_with = "deserialize_remote_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_id: Option<String>,
    #[serde(default)]
    pub original: Option<ImageSize>,
    #[serde(default, rename = "sizes")]
    pub sizes_by_variant: BTreeMap<String, ImageSize>,
    /// Position in the loaded sequence, assigned by the grid.
    #[serde(skip)]
    pub index: usize,
}

/// Accepts numbers or strings; empty strings, zero and null mean "not imported".
fn deserialize_remote_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() && s != "0" => Some(s),
        Some(serde_json::Value::Number(n)) if n.as_u64() != Some(0) => Some(n.to_string()),
        _ => None,
    })
}

impl MediaItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            alt: String::new(),
            remote_id: None,
            original: None,
            sizes_by_variant: BTreeMap::new(),
            index: 0,
        }
    }

    pub fn with_original(mut self, size: ImageSize) -> Self {
        self.original = Some(size);
        self
    }

    pub fn with_size(mut self, label: impl Into<String>, size: ImageSize) -> Self {
        self.sizes_by_variant.insert(label.into(), size);
        self
    }

    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self
    }

    pub fn is_imported(&self) -> bool {
        self.remote_id.is_some()
    }

    fn render_error(&self, reason: impl Into<String>) -> Error {
        Error::Render {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    /// Responsive source set from the variants no wider than `max_width`.
    pub fn srcset(&self, max_width: u32) -> Result<String> {
        let mut sizes: Vec<&ImageSize> = self
            .sizes_by_variant
            .values()
            .filter(|s| s.width > 0 && s.width <= max_width && !s.url.is_empty())
            .collect();
        if sizes.is_empty() {
            return Err(self.render_error(format!("no variant up to {}px", max_width)));
        }
        sizes.sort_by_key(|s| s.width);
        sizes.dedup_by_key(|s| s.width);

        Ok(sizes
            .iter()
            .map(|s| format!("{} {}w", s.url, s.width))
            .collect::<Vec<_>>()
            .join(", "))
    }

    /// Width of the tile when drawn `height` pixels tall, keeping the original ratio.
    pub fn tile_width(&self, height: u32) -> Result<u32> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| self.render_error("missing original size"))?;
        if original.width == 0 || original.height == 0 {
            return Err(self.render_error("degenerate original size"));
        }
        let width = u64::from(height) * u64::from(original.width) / u64::from(original.height);
        u32::try_from(width).map_err(|_| self.render_error("tile too wide"))
    }
}

/// Options for turning items into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub max_srcset_width: u32,
    pub tile_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_srcset_width: 900,
            tile_height: 200,
        }
    }
}

/// Rendered grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tile {
    Image {
        id: String,
        index: usize,
        srcset: String,
        title: String,
        alt: String,
        width: u32,
        height: u32,
        selected: bool,
        /// Imported item shown while bulk mode is on.
        disabled: bool,
        /// "Added to Media Library" badge.
        imported: bool,
        /// Bulk-select checkbox.
        checkbox: bool,
    },
    /// Item whose image could not be resolved.
    Placeholder {
        id: String,
        index: usize,
        title: String,
        error: String,
    },
}

impl Tile {
    pub fn id(&self) -> &str {
        match self {
            Tile::Image { id, .. } | Tile::Placeholder { id, .. } => id,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Tile::Placeholder { .. })
    }
}
