use crate::client::LookupClient;
use crate::color::{contrast_against_white, contrast_status};
use crate::error::{PaletteError, PickerError};
use crate::models::{ContrastStatus, MoodPalettes, Palette, Theme};
use crate::session::Session;
use crate::storage::{KeyValueStore, PersistedState, Persistence};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What the user sees after an action.
#[derive(Debug, Clone, Serialize)]
pub struct PaletteView {
    pub mood: String,
    /// Position in `mood`, when the palette actually comes from there
    pub index: Option<usize>,
    pub palette: Palette,
    pub contrast: ContrastStatus,
    pub contrast_ratio: f64,
    pub favorited: bool,
    pub gradient: String,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Palettes were appended and the first new one applied
    Added(usize),
    /// The service had nothing for this mood
    NothingNew,
}

/// Drives a `Session` on behalf of a user: every action mutates the
/// session, saves it, and yields a fresh `PaletteView`.
pub struct Picker<S> {
    session: Session,
    theme: Theme,
    fetched: BTreeMap<String, Vec<Palette>>,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> Picker<S> {
    /// Restore the previous run from `store` and apply its palette.
    ///
    /// Palettes fetched in earlier runs are appended to their moods again
    /// before the last palette is looked up.
    pub fn open(
        mut moods: MoodPalettes,
        default_mood: &str,
        store: S,
    ) -> Result<Self, PickerError> {
        let persistence = Persistence::new(store);
        let saved = persistence.load();

        let mut fetched = BTreeMap::new();
        for (mood, palettes) in saved.fetched {
            match moods.append(&mood, palettes.clone()) {
                Ok(_) => {
                    fetched.insert(mood, palettes);
                }
                Err(err) => warn!("Dropping fetched palettes: {}", err),
            }
        }

        let mut session = Session::restore(moods, default_mood, saved.last_palette)?;
        session.restore_lists(saved.favorites, saved.history);
        let current = session.current_palette().clone();
        session.apply_palette(current);

        let mut picker = Self {
            session,
            theme: saved.theme,
            fetched,
            persistence,
        };
        picker.save()?;
        Ok(picker)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_store(self) -> S {
        self.persistence.into_inner()
    }

    pub fn view(&self) -> PaletteView {
        let palette = self.session.current_palette();
        PaletteView {
            mood: self.session.current_mood().to_string(),
            index: self.current_position(),
            palette: palette.clone(),
            contrast: contrast_status(palette),
            contrast_ratio: contrast_against_white(palette),
            favorited: self.session.is_favorited(palette),
            gradient: palette.css_gradient(),
            theme: self.theme,
        }
    }

    fn current_position(&self) -> Option<usize> {
        let index = self.session.current_index();
        self.session
            .moods()
            .get(self.session.current_mood())
            .and_then(|palettes| palettes.get(index))
            .filter(|palette| *palette == self.session.current_palette())
            .map(|_| index)
    }

    /// Clipboard text for the current palette
    pub fn copy_text(&self) -> String {
        self.session.current_palette().copy_text()
    }

    pub fn select_mood(&mut self, mood: &str) -> Result<PaletteView, PickerError> {
        self.session.select_mood(mood)?;
        info!("Selected mood {}", mood);
        self.commit()
    }

    pub fn select_palette(&mut self, index: usize) -> Result<PaletteView, PickerError> {
        self.session.select_palette(index)?;
        self.commit()
    }

    pub fn apply_current(&mut self) -> Result<PaletteView, PickerError> {
        let current = self.session.current_palette().clone();
        self.session.apply_palette(current);
        self.commit()
    }

    pub fn apply_favorite(&mut self, index: usize) -> Result<PaletteView, PickerError> {
        let palette = pick(self.session.favorites(), index)?;
        self.session.apply_palette(palette);
        self.commit()
    }

    pub fn apply_history(&mut self, index: usize) -> Result<PaletteView, PickerError> {
        let palette = pick(self.session.history(), index)?;
        self.session.apply_palette(palette);
        self.commit()
    }

    pub fn toggle_favorite(&mut self) -> Result<PaletteView, PickerError> {
        let favorited = self.session.toggle_favorite();
        info!(
            "{} favorites",
            if favorited { "Added to" } else { "Removed from" }
        );
        self.commit()
    }

    pub fn remove_favorite(&mut self, index: usize) -> Result<PaletteView, PickerError> {
        self.session.remove_from_favorites(index)?;
        self.commit()
    }

    pub fn remove_history(&mut self, index: usize) -> Result<PaletteView, PickerError> {
        self.session.remove_from_history(index)?;
        self.commit()
    }

    pub fn toggle_theme(&mut self) -> Result<PaletteView, PickerError> {
        self.theme = self.theme.toggled();
        self.commit()
    }

    /// Ask the lookup service for more palettes of the current mood.
    ///
    /// New palettes are appended to the mood and the first of them is
    /// applied. Holding `&mut self` across the request keeps fetches
    /// strictly one at a time.
    pub async fn fetch_more(&mut self, client: &LookupClient) -> Result<FetchOutcome, PickerError> {
        let mood = self.session.current_mood().to_string();
        let palettes = client.fetch_palettes(&mood).await?;
        let count = palettes.len();

        match self.session.append_server_palettes(&mood, palettes.clone())? {
            Some(first_new) => {
                self.fetched.entry(mood).or_default().extend(palettes);
                self.session.select_palette(first_new)?;
                self.save()?;
                Ok(FetchOutcome::Added(count))
            }
            None => Ok(FetchOutcome::NothingNew),
        }
    }

    fn commit(&mut self) -> Result<PaletteView, PickerError> {
        self.save()?;
        Ok(self.view())
    }

    fn save(&mut self) -> Result<(), PickerError> {
        let state = PersistedState::capture(&self.session, self.theme, &self.fetched);
        self.persistence.save(&state)?;
        Ok(())
    }
}

fn pick(list: &[Palette], index: usize) -> Result<Palette, PickerError> {
    list.get(index).cloned().ok_or_else(|| {
        PaletteError::IndexOutOfRange {
            index,
            len: list.len(),
        }
        .into()
    })
}
