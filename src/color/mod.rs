pub mod color_utils;

use crate::models::{Color, ContrastStatus, Palette};
use color_utils::{contrast_ratio, relative_luminance};

/// WCAG AA threshold for normal text
pub const MIN_TEXT_CONTRAST: f64 = 4.5;

const WHITE_LUMINANCE: f64 = 1.0;

pub fn luminance(color: &Color) -> f64 {
    relative_luminance(color.rgb())
}

/// The palette color with the lowest luminance. Ties go to the earliest color.
pub fn darkest_color(palette: &Palette) -> &Color {
    let colors = palette.colors();
    let mut darkest = &colors[0];
    let mut darkest_lum = luminance(darkest);
    for color in &colors[1..] {
        let lum = luminance(color);
        if lum < darkest_lum {
            darkest = color;
            darkest_lum = lum;
        }
    }
    darkest
}

/// Contrast of white text drawn over the darkest palette color
pub fn contrast_against_white(palette: &Palette) -> f64 {
    contrast_ratio(WHITE_LUMINANCE, luminance(darkest_color(palette)))
}

pub fn contrast_status(palette: &Palette) -> ContrastStatus {
    if contrast_against_white(palette) >= MIN_TEXT_CONTRAST {
        ContrastStatus::Good
    } else {
        ContrastStatus::Poor
    }
}
