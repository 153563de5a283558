use crate::error::StorageError;
use crate::models::{Palette, Theme};
use crate::session::Session;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const FAVORITES_KEY: &str = "favorites";
const HISTORY_KEY: &str = "history";
const LAST_PALETTE_KEY: &str = "lastPalette";
const THEME_KEY: &str = "theme";
const FETCHED_KEY: &str = "fetchedPalettes";

/// Durable string key-value storage with synchronous get/set.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Write several keys as one update. Stores able to commit them together
    /// override this.
    fn set_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value store backed by a single JSON object on disk.
///
/// The file is read once on open. Every write replaces it whole: the new
/// contents go to a temporary file in the same directory which is then
/// renamed over the old one, so readers never see a partial file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let values = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!("Ignoring unreadable state file {}: {}", path.display(), err);
                HashMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(&self.values)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_all(vec![(key, value)])
    }

    fn set_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.values.insert(key.to_string(), value);
        }
        self.flush()
    }
}

/// The records kept between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub favorites: Vec<Palette>,
    pub history: Vec<Palette>,
    pub last_palette: Option<Palette>,
    pub theme: Theme,
    /// Palettes received from the lookup service, per mood, in arrival order
    pub fetched: BTreeMap<String, Vec<Palette>>,
}

impl PersistedState {
    pub fn capture(
        session: &Session,
        theme: Theme,
        fetched: &BTreeMap<String, Vec<Palette>>,
    ) -> Self {
        Self {
            favorites: session.favorites().to_vec(),
            history: session.history().to_vec(),
            last_palette: Some(session.current_palette().clone()),
            theme,
            fetched: fetched.clone(),
        }
    }
}

/// Loads and saves `PersistedState` through a `KeyValueStore`.
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read every record, falling back to defaults for anything missing or
    /// malformed. Never fails.
    pub fn load(&self) -> PersistedState {
        let favorites = self
            .read(FAVORITES_KEY)
            .map(|value| palette_list(FAVORITES_KEY, value))
            .unwrap_or_default();
        let history = self
            .read(HISTORY_KEY)
            .map(|value| palette_list(HISTORY_KEY, value))
            .unwrap_or_default();
        let last_palette = self.read(LAST_PALETTE_KEY).and_then(|value| {
            serde_json::from_value::<Palette>(value)
                .map_err(|err| warn!("Dropping malformed {}: {}", LAST_PALETTE_KEY, err))
                .ok()
        });
        let fetched = self
            .read(FETCHED_KEY)
            .map(fetched_palettes)
            .unwrap_or_default();
        let theme = match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::from_stored(&raw),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!("Failed to read {}: {}", THEME_KEY, err);
                Theme::default()
            }
        };

        PersistedState {
            favorites,
            history,
            last_palette,
            theme,
            fetched,
        }
    }

    pub fn save(&mut self, state: &PersistedState) -> Result<(), StorageError> {
        let mut entries = vec![
            (FAVORITES_KEY, serde_json::to_string(&state.favorites)?),
            (HISTORY_KEY, serde_json::to_string(&state.history)?),
            (FETCHED_KEY, serde_json::to_string(&state.fetched)?),
            (THEME_KEY, state.theme.as_str().to_string()),
        ];
        if let Some(palette) = &state.last_palette {
            entries.push((LAST_PALETTE_KEY, serde_json::to_string(palette)?));
        }
        self.store.set_all(entries)?;
        debug!(
            "Saved state: {} favorites, {} history entries",
            state.favorites.len(),
            state.history.len()
        );
        Ok(())
    }

    fn read(&self, key: &str) -> Option<Value> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("Failed to read {}: {}", key, err);
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|err| warn!("Dropping unparsable {}: {}", key, err))
            .ok()
    }
}

/// Keep the well-formed palettes of a stored list, dropping the rest
fn palette_list(key: &str, value: Value) -> Vec<Palette> {
    let Value::Array(entries) = value else {
        warn!("Dropping {}: not a list", key);
        return Vec::new();
    };

    let total = entries.len();
    let palettes: Vec<Palette> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if palettes.len() < total {
        warn!(
            "Dropped {} malformed entries from {}",
            total - palettes.len(),
            key
        );
    }
    palettes
}

/// Fetched palettes keyed by mood. Moods whose lists hold nothing usable
/// are left out.
fn fetched_palettes(value: Value) -> BTreeMap<String, Vec<Palette>> {
    let Value::Object(moods) = value else {
        warn!("Dropping {}: not an object", FETCHED_KEY);
        return BTreeMap::new();
    };

    moods
        .into_iter()
        .map(|(mood, list)| (mood, palette_list(FETCHED_KEY, list)))
        .filter(|(_, palettes)| !palettes.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(codes: &[&str]) -> Palette {
        Palette::from_hex(codes).unwrap()
    }

    #[test]
    fn test_load_empty_store_gives_defaults() {
        let persistence = Persistence::new(MemoryStore::new());
        assert_eq!(persistence.load(), PersistedState::default());
    }

    #[test]
    fn test_save_then_load() {
        let state = PersistedState {
            favorites: vec![palette(&["#111", "#222"])],
            history: vec![palette(&["#333333"]), palette(&["#111", "#222"])],
            last_palette: Some(palette(&["#111", "#222"])),
            theme: Theme::Light,
            fetched: BTreeMap::from([(
                "Joy".to_string(),
                vec![palette(&["#F9A825", "#FFCA28"]), palette(&["#FF8F00"])],
            )]),
        };
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(&state).unwrap();
        assert_eq!(persistence.load(), state);
        assert_eq!(
            persistence.into_inner().get("theme").unwrap().as_deref(),
            Some("light")
        );
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let mut store = MemoryStore::new();
        store
            .set(
                "favorites",
                r##"[["#FFD700","#FFEE58"], [], "nope", ["zzz"], 42, ["#000"]]"##.to_string(),
            )
            .unwrap();
        store.set("history", r#"{"not": "a list"}"#.to_string()).unwrap();
        store.set("lastPalette", "[]".to_string()).unwrap();
        store.set("theme", "purple".to_string()).unwrap();

        let state = Persistence::new(store).load();
        assert_eq!(
            state.favorites,
            vec![palette(&["#FFD700", "#FFEE58"]), palette(&["#000"])]
        );
        assert!(state.history.is_empty());
        assert_eq!(state.last_palette, None);
        assert_eq!(state.theme, Theme::Dark);
    }

    #[test]
    fn test_malformed_fetched_palettes_are_dropped() {
        let mut store = MemoryStore::new();
        store
            .set(
                "fetchedPalettes",
                r##"{"Joy": [["#F9A825"], ["#nope"]], "Passion": "x", "Serenity": []}"##
                    .to_string(),
            )
            .unwrap();
        let state = Persistence::new(store).load();
        assert_eq!(
            state.fetched,
            BTreeMap::from([("Joy".to_string(), vec![palette(&["#F9A825"])])])
        );

        let mut store = MemoryStore::new();
        store.set("fetchedPalettes", "[1, 2]".to_string()).unwrap();
        assert!(Persistence::new(store).load().fetched.is_empty());
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let mut store = MemoryStore::new();
        store.set("favorites", "{{{".to_string()).unwrap();
        store.set("lastPalette", "null".to_string()).unwrap();

        let state = Persistence::new(store).load();
        assert!(state.favorites.is_empty());
        assert_eq!(state.last_palette, None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("favorites").unwrap(), None);
        store.set("theme", "light".to_string()).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_saves_every_record_in_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = PersistedState {
            favorites: vec![palette(&["#111"])],
            history: vec![palette(&["#222"])],
            last_palette: Some(palette(&["#222"])),
            theme: Theme::Light,
            fetched: BTreeMap::new(),
        };

        let mut persistence = Persistence::new(FileStore::open(&path).unwrap());
        persistence.save(&state).unwrap();
        persistence.save(&state).unwrap();

        let reopened = Persistence::new(FileStore::open(&path).unwrap());
        assert_eq!(reopened.load(), state);

        // The temporary file was renamed into place, nothing else is left
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("history").unwrap(), None);
    }
}
