use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Defaults for commands that take a genre, key, mode or tempo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub genre: String,
    pub key: String,
    pub mode: String,
    pub bars: usize,
    pub bpm: f64,
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            genre: "pop".to_string(),
            key: "C".to_string(),
            mode: "weighted".to_string(),
            bars: 8,
            bpm: 90.0,
            volume: 0.3,
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chordmap")
        .join("config.toml")
}

/// Missing or unreadable files give the defaults
pub fn load_config() -> Config {
    let path = config_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| parse_config(&s))
        .unwrap_or_default()
}

fn parse_config(s: &str) -> Option<Config> {
    match toml::from_str(s) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring invalid config file: {}", e);
            None
        }
    }
}

pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("genre = \"jazz\"\nbpm = 120.0\n").unwrap();
        assert_eq!(config.genre, "jazz");
        assert_eq!(config.bpm, 120.0);
        assert_eq!(config.key, "C");
        assert_eq!(config.bars, 8);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(parse_config("bars = \"many\"").is_none());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config {
            key: "F#m".to_string(),
            volume: 0.5,
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text), Some(config));
    }
}
