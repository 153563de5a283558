use crate::color::color_utils::hex_to_rgb;
use crate::error::PaletteError;
use serde::{Deserialize, Serialize};
use std::fmt;

// Moods and palettes shipped with the client
static SEED_MOODS: &str = include_str!("../data/moods.json");

pub const DEFAULT_MOOD: &str = "Joy";

/// A hex color code such as `#FFD700` or the shorthand `#abc`.
///
/// The text is kept exactly as given: two colors are equal only when their
/// strings are, so `#ABC` and `#aabbcc` are different colors here even though
/// they render the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    hex: String,
    rgb: (u8, u8, u8),
}

impl Color {
    pub fn parse(hex: &str) -> Result<Self, PaletteError> {
        let rgb = hex_to_rgb(hex)?;
        Ok(Self {
            hex: hex.to_string(),
            rgb,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        self.rgb
    }
}

impl TryFrom<String> for Color {
    type Error = PaletteError;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        let rgb = hex_to_rgb(&hex)?;
        Ok(Self { hex, rgb })
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.hex
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// An ordered, non-empty list of colors.
///
/// Equality is positional: the same colors in a different order make a
/// different palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        Ok(Self(colors))
    }

    pub fn from_hex<S: AsRef<str>>(codes: &[S]) -> Result<Self, PaletteError> {
        let colors = codes
            .iter()
            .map(|code| Color::parse(code.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// Comma separated color list, the text put on the clipboard
    pub fn copy_text(&self) -> String {
        self.0
            .iter()
            .map(Color::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// CSS background used when the palette is applied
    pub fn css_gradient(&self) -> String {
        format!("linear-gradient(135deg, {})", self.copy_text())
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = PaletteError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.0
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.copy_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: String,
    pub palettes: Vec<Palette>,
}

/// Mood name to palettes, in seed order.
///
/// The mapping only grows: moods are never removed and a mood's list is only
/// ever appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodPalettes {
    moods: Vec<MoodEntry>,
}

impl MoodPalettes {
    pub fn seeded() -> Result<Self, serde_json::Error> {
        Self::from_json(SEED_MOODS)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn contains(&self, mood: &str) -> bool {
        self.entry(mood).is_some()
    }

    pub fn get(&self, mood: &str) -> Option<&[Palette]> {
        self.entry(mood).map(|entry| entry.palettes.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.moods.iter().map(|entry| entry.mood.as_str())
    }

    /// Append palettes to the tail of a mood's list, returning the index of
    /// the first appended palette.
    pub fn append(&mut self, mood: &str, palettes: Vec<Palette>) -> Result<usize, PaletteError> {
        let entry = self
            .moods
            .iter_mut()
            .find(|entry| entry.mood == mood)
            .ok_or_else(|| PaletteError::UnknownMood(mood.to_string()))?;
        let first_new = entry.palettes.len();
        entry.palettes.extend(palettes);
        Ok(first_new)
    }

    /// First mood (in seed order) holding an equal palette, with its position
    pub fn find_owner(&self, palette: &Palette) -> Option<(&str, usize)> {
        self.moods.iter().find_map(|entry| {
            entry
                .palettes
                .iter()
                .position(|candidate| candidate == palette)
                .map(|index| (entry.mood.as_str(), index))
        })
    }

    fn entry(&self, mood: &str) -> Option<&MoodEntry> {
        self.moods.iter().find(|entry| entry.mood == mood)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContrastStatus {
    Good,
    Poor,
}

impl ContrastStatus {
    pub fn label(self) -> &'static str {
        match self {
            ContrastStatus::Good => "Good Contrast",
            ContrastStatus::Poor => "Poor Contrast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Anything other than `light` means dark
    pub fn from_stored(value: &str) -> Self {
        if value == "light" {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}
