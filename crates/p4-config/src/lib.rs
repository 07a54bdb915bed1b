use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for p4 (`config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub picker: PickerConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search form action (the site root)
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default = "default_ajax_url")]
    pub ajax_url: String,

    /// Cooldown after a scroll-triggered load
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Start loading this many pixels before the load-more button
    #[serde(default = "default_load_earlier_offset")]
    pub load_earlier_offset_px: f64,

    #[serde(default)]
    pub reveal_offset_px: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    #[serde(default = "default_ajax_url")]
    pub ajax_url: String,

    /// Remaining scroll share (0.0-1.0) that triggers the next page
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,

    #[serde(default = "default_max_srcset_width")]
    pub max_srcset_width: u32,

    #[serde(default = "default_tile_height")]
    pub tile_height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            ajax_url: default_ajax_url(),
            throttle_ms: default_throttle_ms(),
            load_earlier_offset_px: default_load_earlier_offset(),
            reveal_offset_px: 0.0,
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            ajax_url: default_ajax_url(),
            scroll_threshold: default_scroll_threshold(),
            max_srcset_width: default_max_srcset_width(),
            tile_height: default_tile_height(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_site_url() -> String {
    "https://www.greenpeace.org/international/".to_string()
}

fn default_ajax_url() -> String {
    "https://www.greenpeace.org/international/wp-admin/admin-ajax.php".to_string()
}

fn default_throttle_ms() -> u64 {
    500
}

fn default_load_earlier_offset() -> f64 {
    250.0
}

fn default_scroll_threshold() -> f64 {
    0.1
}

fn default_max_srcset_width() -> u32 {
    900
}

fn default_tile_height() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "p4/0.2 (planet4 search)".to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there when it is missing
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.picker.scroll_threshold) {
            anyhow::bail!(
                "picker.scroll_threshold must be between 0 and 1, got {}",
                self.picker.scroll_threshold
            );
        }
        if self.picker.tile_height == 0 {
            anyhow::bail!("picker.tile_height must be positive");
        }
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("org", "planet4", "p4") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.p4/config.toml")
        }
    }
}
