//! Application configuration.
//!
//! Defaults are compile-time constants describing the stock build: a
//! 64x32 matrix, three plants, a ten minute refresh. A TOML file can override
//! any subset of them; every field in the file is optional and missing fields
//! keep their default.
//!
//! ```toml
//! refresh_interval_secs = 300
//!
//! [[plants]]
//! feed = "plant-1"
//! name = "FIG"
//!
//! [[plants]]
//! feed = "plant-4"
//! name = "JADE"
//!
//! [palette]
//! dry = 0x880000
//!
//! [feed]
//! username = "me"
//! timeout_secs = 15
//! ```
//!
//! The Adafruit IO key is normally supplied through the `AIO_KEY` environment
//! variable (and the user name through `AIO_USERNAME`) so it does not end up
//! in a checked-in file. Environment values win over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_graphics::geometry::Size;
use log::debug;
use serde::Deserialize;

use crate::colors::{Palette, from_hex};
use crate::error::ConfigError;
use crate::layout::BandHeights;

// =============================================================================
// Display Configuration
// =============================================================================

/// Matrix width in pixels (Adafruit 64x32 RGB LED matrix).
pub const SCREEN_WIDTH: u32 = 64;

/// Matrix height in pixels.
pub const SCREEN_HEIGHT: u32 = 32;

// =============================================================================
// Tile Bands (built from the bottom of each cell upwards)
// =============================================================================

/// Bottom band holding the plant name.
pub const TEXT_AREA_HEIGHT: u32 = 8;

/// Gap between the name band and the bar region.
pub const TEXT_BUFFER: u32 = 1;

/// Band above the bar region reserved for the percentage label.
pub const PCT_AREA_HEIGHT: u32 = 6;

// =============================================================================
// Plants
// =============================================================================

/// Largest supported plant count: two rows of four tiles.
pub const MAX_PLANTS: usize = 8;

/// Longest plant name that fits the label buffer.
pub const NAME_MAX_LEN: usize = 8;

/// Plants shown when no configuration file is given, as `(feed key, name)`.
pub const DEFAULT_PLANTS: [(&str, &str); 3] = [("plant-1", "FIG"), ("plant-2", "IVY"), ("plant-3", "PAL")];

// =============================================================================
// Timing
// =============================================================================

/// Time between refresh ticks.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Shortest refresh interval accepted from the file. Adafruit IO rate limits
/// free accounts, so polling faster than this only earns HTTP 429s.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Per-request timeout for the feed client.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Adafruit IO REST endpoint.
pub const DEFAULT_FEED_URL: &str = "https://io.adafruit.com";

// =============================================================================
// Runtime Configuration
// =============================================================================

/// One monitored plant as configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlantConfig {
    /// Key used to query the data source.
    pub feed_key: String,
    /// Short label drawn under the tile.
    pub name: String,
}

/// Adafruit IO connection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub key: Option<String>,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_URL.to_string(),
            username: None,
            key: None,
            timeout: FEED_TIMEOUT,
        }
    }
}

/// Everything the dashboard needs at startup. Constant for the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Plants in display order (row-major tile placement).
    pub plants: Vec<PlantConfig>,
    pub refresh_interval: Duration,
    pub screen: Size,
    pub bands: BandHeights,
    pub palette: Palette,
    pub feed: FeedConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            plants: DEFAULT_PLANTS
                .iter()
                .map(|(feed_key, name)| PlantConfig {
                    feed_key: (*feed_key).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
            refresh_interval: REFRESH_INTERVAL,
            screen: Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            bands: BandHeights::default(),
            palette: Palette::default(),
            feed: FeedConfig::default(),
        }
    }
}

// =============================================================================
// File Format
// =============================================================================

/// TOML-deserializable config file format.
/// All fields are optional; missing fields use defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    refresh_interval_secs: Option<u64>,
    plants: Option<Vec<FilePlant>>,
    screen: Option<FileScreen>,
    bands: Option<FileBands>,
    palette: Option<FilePalette>,
    feed: Option<FileFeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilePlant {
    feed: String,
    name: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct FileScreen {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct FileBands {
    text_area: Option<u32>,
    text_buffer: Option<u32>,
    pct_area: Option<u32>,
}

/// Colors as `0xRRGGBB` integers (TOML accepts hex integer literals).
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct FilePalette {
    dry: Option<u32>,
    moist: Option<u32>,
    wet: Option<u32>,
    background: Option<u32>,
    name_text: Option<u32>,
    pct_text: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct FileFeed {
    base_url: Option<String>,
    username: Option<String>,
    key: Option<String>,
    timeout_secs: Option<u64>,
}

impl DashboardConfig {
    /// Load configuration from `path` (defaults if `None`), apply the
    /// `AIO_USERNAME` / `AIO_KEY` environment overrides, and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&content, path)?
            }
            None => Self::default(),
        };

        if let Ok(username) = std::env::var("AIO_USERNAME")
            && !username.is_empty()
        {
            config.feed.username = Some(username);
        }
        if let Ok(key) = std::env::var("AIO_KEY")
            && !key.is_empty()
        {
            config.feed.key = Some(key);
        }

        config.validate()?;
        debug!(
            "config: {} plants, refresh every {}s, screen {}x{}",
            config.plants.len(),
            config.refresh_interval.as_secs(),
            config.screen.width,
            config.screen.height
        );
        Ok(config)
    }

    /// Parse a TOML document and merge it over the defaults.
    ///
    /// `origin` is only used for error messages. Does not validate.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from(origin),
            message: e.to_string(),
        })?;

        let mut config = Self::default();

        if let Some(v) = file.refresh_interval_secs {
            config.refresh_interval = Duration::from_secs(v).max(MIN_REFRESH_INTERVAL);
        }
        if let Some(plants) = file.plants {
            config.plants = plants
                .into_iter()
                .map(|p| PlantConfig {
                    feed_key: p.feed,
                    name: p.name,
                })
                .collect();
        }

        if let Some(s) = file.screen {
            if let Some(v) = s.width {
                config.screen.width = v.max(1);
            }
            if let Some(v) = s.height {
                config.screen.height = v.max(1);
            }
        }

        if let Some(b) = file.bands {
            if let Some(v) = b.text_area {
                config.bands.text_area = v;
            }
            if let Some(v) = b.text_buffer {
                config.bands.text_buffer = v;
            }
            if let Some(v) = b.pct_area {
                config.bands.pct_area = v;
            }
        }

        if let Some(p) = file.palette {
            let palette = &mut config.palette;
            for (slot, value) in [
                (&mut palette.dry, p.dry),
                (&mut palette.moist, p.moist),
                (&mut palette.wet, p.wet),
                (&mut palette.background, p.background),
                (&mut palette.name_text, p.name_text),
                (&mut palette.pct_text, p.pct_text),
            ] {
                if let Some(hex) = value {
                    *slot = from_hex(hex);
                }
            }
        }

        if let Some(f) = file.feed {
            if let Some(v) = f.base_url
                && !v.is_empty()
            {
                config.feed.base_url = v.trim_end_matches('/').to_string();
            }
            if let Some(v) = f.username {
                config.feed.username = Some(v);
            }
            if let Some(v) = f.key {
                config.feed.key = Some(v);
            }
            if let Some(v) = f.timeout_secs {
                config.feed.timeout = Duration::from_secs(v.max(1));
            }
        }

        Ok(config)
    }

    /// Reject configurations the dashboard cannot render at all.
    ///
    /// Configurations that merely render badly (bands taller than the cell)
    /// pass; the layout degrades to 1px bars instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plants.is_empty() {
            return Err(ConfigError::NoPlants);
        }
        if self.plants.len() > MAX_PLANTS {
            return Err(ConfigError::TooManyPlants {
                count: self.plants.len(),
                max: MAX_PLANTS,
            });
        }
        if let Some(plant) = self.plants.iter().find(|p| p.name.len() > NAME_MAX_LEN) {
            return Err(ConfigError::NameTooLong(plant.name.clone()));
        }
        Ok(())
    }

    /// Adafruit IO credentials, if both parts are present.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (self.feed.username.as_deref(), self.feed.key.as_deref()) {
            (Some(user), Some(key)) if !user.is_empty() && !key.is_empty() => Ok((user, key)),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::colors::{GREEN, RED};

    fn parse(content: &str) -> Result<DashboardConfig, ConfigError> {
        DashboardConfig::from_toml(content, Path::new("test.toml"))
    }

    #[test]
    fn test_defaults_match_stock_build() {
        let config = DashboardConfig::default();
        assert_eq!(config.screen, Size::new(64, 32));
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.bands, BandHeights::new(8, 1, 6));
        let names: Vec<&str> = config.plants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["FIG", "IVY", "PAL"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_plants_keep_file_order() {
        let config = parse(
            r#"
            [[plants]]
            feed = "plant-4"
            name = "JADE"

            [[plants]]
            feed = "plant-1"
            name = "FIG"
            "#,
        )
        .unwrap();
        assert_eq!(config.plants.len(), 2);
        assert_eq!(config.plants[0].feed_key, "plant-4");
        assert_eq!(config.plants[0].name, "JADE");
        assert_eq!(config.plants[1].feed_key, "plant-1");
    }

    #[test]
    fn test_partial_sections_overlay_defaults() {
        let config = parse(
            r#"
            [bands]
            pct_area = 5

            [palette]
            dry = 0x004400
            "#,
        )
        .unwrap();
        assert_eq!(config.bands, BandHeights::new(8, 1, 5));
        assert_eq!(config.palette.dry, GREEN);
        assert_eq!(config.palette.wet, GREEN);
        assert_eq!(config.palette.moist, DashboardConfig::default().palette.moist);
        assert_ne!(config.palette.dry, RED);
    }

    #[test]
    fn test_refresh_interval_is_clamped() {
        let config = parse("refresh_interval_secs = 1").unwrap();
        assert_eq!(config.refresh_interval, MIN_REFRESH_INTERVAL);

        let config = parse("refresh_interval_secs = 120").unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(120));
    }

    #[test]
    fn test_feed_section() {
        let config = parse(
            r#"
            [feed]
            base_url = "http://localhost:8080/"
            username = "gardener"
            timeout_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.base_url, "http://localhost:8080");
        assert_eq!(config.feed.username.as_deref(), Some("gardener"));
        assert_eq!(config.feed.timeout, Duration::from_secs(1));
        assert!(matches!(config.credentials(), Err(ConfigError::MissingCredentials)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = parse("refresh_rate = 600").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_validate_rejects_empty_plant_list() {
        let config = DashboardConfig {
            plants: Vec::new(),
            ..DashboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoPlants)));
    }

    #[test]
    fn test_validate_rejects_too_many_plants() {
        let plants = (0..=MAX_PLANTS)
            .map(|i| PlantConfig {
                feed_key: format!("plant-{i}"),
                name: format!("P{i}"),
            })
            .collect();
        let config = DashboardConfig {
            plants,
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyPlants { count: 9, max: 8 })
        ));
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let config = DashboardConfig {
            plants: vec![PlantConfig {
                feed_key: "plant-1".into(),
                name: "MONSTERA!".into(),
            }],
            ..DashboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NameTooLong(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[plants]]\nfeed = \"plant-9\"\nname = \"ALOE\"").unwrap();

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.plants.len(), 1);
        assert_eq!(config.plants[0].name, "ALOE");
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = DashboardConfig::load(Some(Path::new("/nonexistent/dashboard.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
