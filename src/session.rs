use crate::error::PaletteError;
use crate::models::{MoodPalettes, Palette};
use tracing::debug;

pub const HISTORY_SIZE: usize = 20;

/// Picker state for one user: the mood catalog, what is currently shown,
/// favorites and the recently applied palettes.
///
/// All mutation goes through methods on this type. Nothing here performs
/// I/O; saving and rendering are left to the caller.
#[derive(Debug, Clone)]
pub struct Session {
    moods: MoodPalettes,
    current_mood: String,
    current_index: usize,
    current_palette: Palette,
    favorites: Vec<Palette>,
    history: Vec<Palette>,
}

impl Session {
    /// Build the session shown at startup.
    ///
    /// A persisted `last_palette` becomes the current palette and the first
    /// mood (in catalog order) holding an equal palette becomes the current
    /// mood. If no mood holds it, `default_mood` stays current. Without a
    /// persisted palette the default mood's first palette is used.
    pub fn restore(
        moods: MoodPalettes,
        default_mood: &str,
        last_palette: Option<Palette>,
    ) -> Result<Self, PaletteError> {
        let first = first_palette(&moods, default_mood)?.clone();

        let (current_mood, current_index, current_palette) = match last_palette {
            Some(palette) => match moods.find_owner(&palette) {
                Some((owner, index)) => (owner.to_string(), index, palette),
                None => (default_mood.to_string(), 0, palette),
            },
            None => (default_mood.to_string(), 0, first),
        };

        debug!("Restored session on mood {} ({})", current_mood, current_palette);

        Ok(Self {
            moods,
            current_mood,
            current_index,
            current_palette,
            favorites: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Install previously saved favorites and history.
    ///
    /// Duplicate favorites are collapsed and only the newest
    /// `HISTORY_SIZE` history entries are kept.
    pub fn restore_lists(&mut self, favorites: Vec<Palette>, mut history: Vec<Palette>) {
        self.favorites.clear();
        for palette in favorites {
            if !self.is_favorited(&palette) {
                self.favorites.push(palette);
            }
        }

        if history.len() > HISTORY_SIZE {
            history.drain(..history.len() - HISTORY_SIZE);
        }
        self.history = history;
    }

    pub fn moods(&self) -> &MoodPalettes {
        &self.moods
    }

    pub fn current_mood(&self) -> &str {
        &self.current_mood
    }

    /// Position of the current palette in the current mood. Stale once a
    /// palette from favorites or history has been applied.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_palette(&self) -> &Palette {
        &self.current_palette
    }

    pub fn favorites(&self) -> &[Palette] {
        &self.favorites
    }

    pub fn history(&self) -> &[Palette] {
        &self.history
    }

    pub fn is_favorited(&self, palette: &Palette) -> bool {
        self.favorites.iter().any(|fav| fav == palette)
    }

    /// Switch to `mood` and apply its first palette.
    ///
    /// Returns whether the history grew.
    pub fn select_mood(&mut self, mood: &str) -> Result<bool, PaletteError> {
        let palette = first_palette(&self.moods, mood)?.clone();
        self.current_mood = mood.to_string();
        self.current_index = 0;
        Ok(self.apply_palette(palette))
    }

    /// Apply the palette at `index` within the current mood.
    pub fn select_palette(&mut self, index: usize) -> Result<bool, PaletteError> {
        let palettes = self
            .moods
            .get(&self.current_mood)
            .ok_or_else(|| PaletteError::UnknownMood(self.current_mood.clone()))?;
        let palette = palettes
            .get(index)
            .ok_or(PaletteError::IndexOutOfRange {
                index,
                len: palettes.len(),
            })?
            .clone();
        self.current_index = index;
        Ok(self.apply_palette(palette))
    }

    /// Make `palette` current and record it in the history.
    ///
    /// The history never gets the same palette twice in a row; beyond
    /// `HISTORY_SIZE` entries the oldest is dropped. Returns whether the
    /// history grew.
    pub fn apply_palette(&mut self, palette: Palette) -> bool {
        let appended = self.history.last() != Some(&palette);
        if appended {
            self.history.push(palette.clone());
            if self.history.len() > HISTORY_SIZE {
                self.history.remove(0);
            }
        }
        self.current_palette = palette;
        appended
    }

    /// Add the current palette to favorites, or remove it if already there.
    ///
    /// Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self) -> bool {
        if self.is_favorited(&self.current_palette) {
            let current = &self.current_palette;
            self.favorites.retain(|fav| fav != current);
            false
        } else {
            self.favorites.push(self.current_palette.clone());
            true
        }
    }

    pub fn remove_from_favorites(&mut self, index: usize) -> Result<Palette, PaletteError> {
        remove_at(&mut self.favorites, index)
    }

    /// Removing an entry does not re-check its new neighbours for
    /// duplicates; that rule only applies on append.
    pub fn remove_from_history(&mut self, index: usize) -> Result<Palette, PaletteError> {
        remove_at(&mut self.history, index)
    }

    /// Append palettes received from the lookup service to `mood`.
    ///
    /// Returns the index of the first new palette, or `None` when there was
    /// nothing to add (the catalog is left untouched).
    pub fn append_server_palettes(
        &mut self,
        mood: &str,
        palettes: Vec<Palette>,
    ) -> Result<Option<usize>, PaletteError> {
        if !self.moods.contains(mood) {
            return Err(PaletteError::UnknownMood(mood.to_string()));
        }
        if palettes.is_empty() {
            return Ok(None);
        }
        let count = palettes.len();
        let first_new = self.moods.append(mood, palettes)?;
        debug!("Appended {} palettes to mood {}", count, mood);
        Ok(Some(first_new))
    }
}

fn first_palette<'a>(moods: &'a MoodPalettes, mood: &str) -> Result<&'a Palette, PaletteError> {
    moods
        .get(mood)
        .ok_or_else(|| PaletteError::UnknownMood(mood.to_string()))?
        .first()
        .ok_or(PaletteError::IndexOutOfRange { index: 0, len: 0 })
}

fn remove_at(list: &mut Vec<Palette>, index: usize) -> Result<Palette, PaletteError> {
    if index >= list.len() {
        return Err(PaletteError::IndexOutOfRange {
            index,
            len: list.len(),
        });
    }
    Ok(list.remove(index))
}
