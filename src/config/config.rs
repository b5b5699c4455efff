use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub remote: RemoteConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before the pattern is committed
    pub debounce_ms: u64,

    /// Only match at the start of the searchable text
    pub anchor_front: bool,

    /// Treat the input as a case-insensitive regular expression
    pub search_as_regex: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Nominal size of the simulated backend's population
    pub base_population: usize,

    /// Rows fetched per window request
    pub block_size: usize,

    /// Loaded blocks kept before the oldest is evicted
    pub max_cached_blocks: usize,

    /// Artificial delay on every simulated backend answer
    pub latency_ms: u64,

    /// Count estimate shrink factor per character past `decay_threshold`
    pub decay: f64,

    pub decay_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows printed per result table
    pub max_rows: usize,

    /// Show the key column next to the text
    pub show_keys: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            anchor_front: false,
            search_as_regex: false,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_population: 5_000_000,
            block_size: 50,
            max_cached_blocks: 15,
            latency_ms: 0,
            decay: 0.3,
            decay_threshold: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_rows: 15,
            show_keys: false,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("combo-table").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# combo-table configuration
# Location: ~/.config/combo-table/config.toml (Linux)
#           %APPDATA%\combo-table\config.toml (Windows)

[search]
# Milliseconds of quiet after the last keystroke before filtering
debounce_ms = 150

# Only match at the start of the text
anchor_front = false

# Interpret input as a case-insensitive regular expression
search_as_regex = false

[remote]
# Rows the simulated backend pretends to hold
base_population = 5000000

# Rows per window request, and how many windows stay cached
block_size = 50
max_cached_blocks = 15

# Artificial backend delay in milliseconds
latency_ms = 0

# Count estimate: base * decay^(pattern_length - decay_threshold), clamped to base
decay = 0.3
decay_threshold = 10

[display]
# Rows printed per result table
max_rows = 15

# Show the key column next to the text
show_keys = false
"#
        .to_string()
    }
}
