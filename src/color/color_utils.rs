use crate::error::PaletteError;

/// Parse a hex color into its RGB channels.
///
/// Accepts an optional leading `#` and either six digits or the three digit
/// shorthand, which is expanded by doubling each digit (`#abc` == `#aabbcc`).
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8), PaletteError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || PaletteError::InvalidColor(hex.to_string());

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let expanded = match digits.len() {
        6 => digits.to_string(),
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => return Err(invalid()),
    };

    let value = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
    Ok((
        (value >> 16) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}

/// sRGB channel (0-255) to linear light
fn channel_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Calculate relative luminance of an RGB triple
pub fn relative_luminance((r, g, b): (u8, u8, u8)) -> f64 {
    0.2126 * channel_to_linear(r) + 0.7152 * channel_to_linear(g) + 0.0722 * channel_to_linear(b)
}

/// Calculate contrast ratio between two luminance values
pub fn contrast_ratio(l1: f64, l2: f64) -> f64 {
    let lighter = l1.max(l2);
    let darker = l1.min(l2);

    (lighter + 0.05) / (darker + 0.05)
}
