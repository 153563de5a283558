use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PALETTES_FILE: &str = "data/palettes.json";
const DEFAULT_FRONTEND_DIR: &str = "frontend";
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// `PORT`
    pub port: u16,
    /// `PALETTES_FILE`: server-side catalog served by the lookup endpoint
    pub palettes_file: PathBuf,
    /// `FRONTEND_DIR`: static files mounted at `/`
    pub frontend_dir: PathBuf,
    /// `PALETTE_API_URL`: where the client fetches more palettes
    pub api_url: String,
    /// `PALETTE_STATE_FILE`: where the client keeps favorites and history
    pub state_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            palettes_file: var("PALETTES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PALETTES_FILE)),
            frontend_dir: var("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRONTEND_DIR)),
            api_url: var("PALETTE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            state_file: var("PALETTE_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_state_file),
        }
    }
}

fn default_state_file() -> PathBuf {
    ProjectDirs::from("dev", "mood-palette", "mood-palette")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| env::temp_dir().join("mood-palette"))
        .join("state.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.palettes_file, PathBuf::from("data/palettes.json"));
        assert_eq!(config.api_url, "http://localhost:3000");
        assert!(config.state_file.ends_with("state.json"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PORT", "8080"),
            ("PALETTE_API_URL", "http://palettes.internal"),
            ("PALETTE_STATE_FILE", "/tmp/picker.json"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_url, "http://palettes.internal");
        assert_eq!(config.state_file, PathBuf::from("/tmp/picker.json"));
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = Config::from_lookup(|key| (key == "PORT").then(|| "http".to_string()));
        assert_eq!(config.port, 3000);
    }
}
