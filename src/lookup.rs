use crate::models::Palette;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info};

/// Most palettes handed out per request
pub const MAX_PALETTES_PER_RESPONSE: usize = 4;

/// Server-side palettes keyed by mood, immutable once loaded.
#[derive(Debug, Default, Clone)]
pub struct PaletteCatalog {
    palettes: HashMap<String, Vec<Palette>>,
}

impl PaletteCatalog {
    pub fn new(palettes: HashMap<String, Vec<Palette>>) -> Self {
        Self { palettes }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// Load the catalog from disk. A missing or broken file leaves the
    /// service running with no palettes.
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|json| Self::from_json(&json).map_err(|err| err.to_string()));

        match parsed {
            Ok(catalog) => {
                info!(
                    "Loaded palettes for {} moods from {}",
                    catalog.palettes.len(),
                    path.display()
                );
                catalog
            }
            Err(err) => {
                error!("Error reading or parsing {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Leading palettes for `mood`, at most `MAX_PALETTES_PER_RESPONSE`.
    /// Unknown moods get an empty list.
    pub fn lookup(&self, mood: &str) -> &[Palette] {
        self.palettes
            .get(mood)
            .map(|all| &all[..all.len().min(MAX_PALETTES_PER_RESPONSE)])
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PaletteCatalog {
        PaletteCatalog::from_json(include_str!("../data/palettes.json")).unwrap()
    }

    #[test]
    fn test_lookup_truncates() {
        let catalog = catalog();
        let passion = catalog.lookup("Passion");
        assert_eq!(passion.len(), MAX_PALETTES_PER_RESPONSE);
        assert_eq!(passion[0], Palette::from_hex(&["#B71C1C", "#D32F2F", "#FF8A80"]).unwrap());
    }

    #[test]
    fn test_lookup_short_list_is_returned_whole() {
        assert_eq!(catalog().lookup("Serenity").len(), 2);
    }

    #[test]
    fn test_lookup_empty_and_unknown() {
        let catalog = catalog();
        assert!(catalog.lookup("Sophistication").is_empty());
        assert!(catalog.lookup("Nostalgia").is_empty());
    }

    #[test]
    fn test_load_missing_file_gives_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PaletteCatalog::load(&dir.path().join("missing.json"));
        assert!(catalog.lookup("Joy").is_empty());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palettes.json");
        std::fs::write(&path, r#"{"Joy": [["not a color"]]}"#).unwrap();
        assert!(PaletteCatalog::load(&path).lookup("Joy").is_empty());
    }
}
