//! Display helpers shared by the UI and headless output (names, type
//! colours, sprite thumbnails).

use image::imageops::FilterType;

use crate::error::{DexError, Result};

pub const THUMB_W: u32 = 48;
pub const THUMB_H: u32 = 48;

pub const TYPE_OPTIONS: [&str; 18] = [
    "bug", "dark", "dragon", "electric", "fairy", "fighting", "fire", "flying", "ghost", "grass",
    "ground", "ice", "normal", "poison", "psychic", "rock", "steel", "water",
];

/// Format a Pokémon `name` into a human-friendly form.
///
/// Examples: `mr-mime` -> `Mr Mime`, `ho_oh` -> `Ho Oh`.
pub fn format_name(name: &str) -> String {
    let replaced = name.replace(['-', '_'], " ");
    let parts: Vec<String> = replaced
        .split_whitespace()
        .map(|w| {
            let mut chs = w.chars();
            match chs.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chs.as_str().to_lowercase()
                }
            }
        })
        .collect();
    parts.join(" ")
}

/// `generation-iv` -> `Gen IV`.
pub fn format_generation(label: &str) -> String {
    match label.strip_prefix("generation-") {
        Some(roman) => format!("Gen {}", roman.to_uppercase()),
        None => format_name(label),
    }
}

/// Badge background for a type name; unknown types get a neutral grey.
pub fn type_color(type_name: &str) -> (u8, u8, u8) {
    match type_name.to_lowercase().as_str() {
        "normal" => (168, 168, 120),
        "fire" => (240, 128, 48),
        "water" => (104, 144, 240),
        "grass" => (120, 200, 80),
        "electric" => (248, 208, 48),
        "ice" => (152, 216, 216),
        "fighting" => (192, 48, 40),
        "poison" => (160, 64, 160),
        "ground" => (224, 192, 104),
        "flying" => (168, 144, 240),
        "psychic" => (248, 88, 136),
        "bug" => (168, 184, 32),
        "rock" => (184, 160, 56),
        "ghost" => (112, 88, 152),
        "dragon" => (112, 56, 248),
        "dark" => (112, 88, 72),
        "steel" => (184, 184, 208),
        "fairy" => (238, 153, 172),
        _ => (200, 200, 200),
    }
}

/// Black or white, whichever reads better on `bg`.
pub fn contrast_on(bg: (u8, u8, u8)) -> (u8, u8, u8) {
    let (r, g, b) = bg;
    let lum = 0.2126 * (r as f32) + 0.7152 * (g as f32) + 0.0722 * (b as f32);
    if lum > 160.0 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}

pub fn stat_abbrev(stat_name: &str) -> String {
    match stat_name {
        "hp" => "HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SpA".to_string(),
        "special-defense" => "SpD".to_string(),
        "speed" => "SPD".to_string(),
        other => format_name(other),
    }
}

/// Next entry of `options` after `current`, wrapping to "no filter" (empty)
/// after the last one.
pub fn cycle_option(options: &[&str], current: &str) -> String {
    if current.is_empty() {
        return options.first().map(|s| s.to_string()).unwrap_or_default();
    }
    match options.iter().position(|o| *o == current) {
        Some(i) if i + 1 < options.len() => options[i + 1].to_string(),
        _ => String::new(),
    }
}

/// Compact RGBA thumbnail kept in the in-memory sprite cache.
pub struct SpriteThumb {
    pub w: u32,
    pub h: u32,
    /// RGBA pixels in row-major order (len = w*h*4)
    pub pixels: Vec<u8>,
}

impl SpriteThumb {
    /// Decode downloaded image bytes and shrink them to the thumbnail size.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| DexError::MalformedResponse(format!("sprite: {}", e)))?;
        let small = image::imageops::resize(&img.to_rgba8(), THUMB_W, THUMB_H, FilterType::Triangle);
        Ok(Self {
            w: THUMB_W,
            h: THUMB_H,
            pixels: small.into_raw(),
        })
    }

    /// Pixel rows sized `w` x `h`; `None` marks a transparent pixel.
    pub fn rows(&self, w: u32, h: u32) -> Vec<Vec<Option<(u8, u8, u8)>>> {
        let resized;
        let (src, sw, sh) = if self.w == w && self.h == h {
            (&self.pixels[..], self.w, self.h)
        } else {
            let buf = image::RgbaImage::from_raw(self.w, self.h, self.pixels.clone())
                .unwrap_or_else(|| image::RgbaImage::new(self.w, self.h));
            resized = image::imageops::resize(&buf, w.max(1), h.max(1), FilterType::Triangle);
            (resized.as_raw().as_slice(), resized.width(), resized.height())
        };

        (0..sh)
            .map(|y| {
                (0..sw)
                    .map(|x| {
                        let idx = ((y * sw + x) * 4) as usize;
                        let px = &src[idx..idx + 4];
                        if px[3] < 64 {
                            None
                        } else {
                            Some((px[0], px[1], px[2]))
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
