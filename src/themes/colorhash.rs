use egui::Color32;
use egui::Stroke;

/// A small, deterministic hash for turning "content" into a stable palette index.
///
/// This is intentionally not cryptographic; it's for UI color bucketing.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 1469598103934665603;
    const PRIME: u64 = 1099511628211;

    pub fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub fn update(&mut self, bytes: &[u8]) {
        let mut hash = self.0;
        for b in bytes {
            hash ^= *b as u64;
            hash = hash.wrapping_mul(Self::PRIME);
        }
        self.0 = hash;
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self::new()
    }
}

pub fn hash64(bytes: &[u8]) -> u64 {
    let mut h = Fnv1a64::new();
    h.update(bytes);
    h.finish()
}

pub fn palette_index(hash: u64, palette_len: usize) -> usize {
    if palette_len == 0 {
        0
    } else {
        (hash as usize) % palette_len
    }
}

/// A small, visually distinct palette for coloring networks.
///
/// Note: Avoids greens and reds so a network accent never reads as an
/// up/down state.
pub const NETWORK_CATEGORICAL: &[Color32] = &[
    Color32::from_rgb(0xFF, 0xB3, 0x00), // amber
    Color32::from_rgb(0xFF, 0x6F, 0x00), // deep orange
    Color32::from_rgb(0xAB, 0x47, 0xBC), // violet
    Color32::from_rgb(0x29, 0xB6, 0xF6), // sky blue
    Color32::from_rgb(0x26, 0xC6, 0xDA), // cyan
    Color32::from_rgb(0x7E, 0x57, 0xC2), // lavender
    Color32::from_rgb(0xEC, 0x40, 0x7A), // pink
    Color32::from_rgb(0x5C, 0x6B, 0xC0), // indigo
];

pub fn categorical_from_hash(hash: u64, palette: &[Color32]) -> Color32 {
    if palette.is_empty() {
        return Color32::GRAY;
    }
    palette[palette_index(hash, palette.len())]
}

/// Stable accent color for an SSID.
pub fn ssid_accent(ssid: &str) -> Color32 {
    categorical_from_hash(hash64(ssid.as_bytes()), NETWORK_CATEGORICAL)
}

pub fn luma(color: Color32) -> f32 {
    // Cheap, perceptual-ish luma in sRGB space.
    let r = color.r() as f32 / 255.0;
    let g = color.g() as f32 / 255.0;
    let b = color.b() as f32 / 255.0;
    0.299 * r + 0.587 * g + 0.114 * b
}

pub fn text_color_on(background: Color32) -> Color32 {
    if luma(background) > 0.55 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// A thick, high-contrast outline stroke for emphasizing a colored region.
pub fn highlight_stroke(fill: Color32) -> Stroke {
    Stroke::new(2.0, text_color_on(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_is_stable_per_ssid() {
        assert_eq!(ssid_accent("HomeNet"), ssid_accent("HomeNet"));
    }

    #[test]
    fn palette_index_stays_in_bounds() {
        for hash in [0, 1, u64::MAX] {
            assert!(palette_index(hash, NETWORK_CATEGORICAL.len()) < NETWORK_CATEGORICAL.len());
        }
        assert_eq!(palette_index(42, 0), 0);
    }

    #[test]
    fn text_contrast_flips_with_luma() {
        assert_eq!(text_color_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_color_on(Color32::from_rgb(0x22, 0x22, 0x22)), Color32::WHITE);
    }
}
