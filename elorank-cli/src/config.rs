/// Config file loading and creation for the elorank CLI.
///
/// Config lives at ~/.config/elorank/config.toml.
/// All fields are optional. CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ElorankConfig {
    pub state_dir: Option<String>,
    pub k_factor: Option<f64>,
    pub min_comparisons: Option<usize>,
    pub batch_size: Option<usize>,
    pub standard_rating: Option<f64>,
    pub question: Option<String>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# elorank configuration
# All values here can be overridden by CLI flags.

# Directory holding ratings_<count>.json snapshots and the expected-score matrix
# state_dir = \"/home/me/rankings/films\"

# K-factor: the largest rating change a single comparison can cause
# k_factor = 32

# Comparisons every item needs before the closest-matchup phase starts
# min_comparisons = 2

# Pairs selected per closest-matchup batch
# batch_size = 10

# Starting rating for items with no prior rating in the items file
# standard_rating = 1000

# Question shown above each pair
# question = \"Which is better?\"
";

/// Returns the default config path: ~/.config/elorank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("elorank").join("config.toml")
}

/// Parse config file contents.
pub fn parse_config(content: &str) -> Result<ElorankConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> ElorankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ElorankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) -> PathBuf {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));

    path.to_path_buf()
}
