//! 256-entry colour palette and its lookup texture.

use serde::{Deserialize, Serialize};

/// Number of palette slots, including the unused slot 0
pub const PALETTE_SIZE: usize = 256;

/// 8-bit sRGB colour with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Colour channels decoded from sRGB to linear, alpha kept linear
    pub fn to_linear(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a as f32 / 255.0,
        ]
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Palette indexed by the colour byte of a voxel. Slot 0 means "empty" and is
/// always transparent black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgba; PALETTE_SIZE],
}

impl Palette {
    /// All slots transparent black
    pub fn empty() -> Self {
        Self {
            colors: [Rgba::TRANSPARENT; PALETTE_SIZE],
        }
    }

    #[inline]
    pub fn get(&self, index: u8) -> Rgba {
        self.colors[index as usize]
    }

    /// Set a colour. Writes to slot 0 are ignored.
    pub fn set(&mut self, index: u8, color: Rgba) {
        if index != 0 {
            self.colors[index as usize] = color;
        }
    }

    pub fn colors(&self) -> &[Rgba; PALETTE_SIZE] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Rgba)> + '_ {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as u8, c))
    }
}

impl Default for Palette {
    fn default() -> Self {
        default_palette()
    }
}

/// MagicaVoxel's built-in palette, used by files without an RGBA chunk.
///
/// Slots 1..=215 are a 6x6x6 colour cube (black excluded), followed by
/// ten-step red, green, blue and grey ramps.
pub fn default_palette() -> Palette {
    const CUBE: [u8; 6] = [0xFF, 0xCC, 0x99, 0x66, 0x33, 0x00];
    const RAMP: [u8; 10] = [0xEE, 0xDD, 0xBB, 0xAA, 0x88, 0x77, 0x55, 0x44, 0x22, 0x11];

    let mut colors = [Rgba::TRANSPARENT; PALETTE_SIZE];
    let mut next = 1;

    for &r in &CUBE {
        for &g in &CUBE {
            for &b in &CUBE {
                if r == 0 && g == 0 && b == 0 {
                    continue;
                }
                colors[next] = Rgba::opaque(r, g, b);
                next += 1;
            }
        }
    }

    for &v in &RAMP {
        colors[next] = Rgba::opaque(v, 0, 0);
        next += 1;
    }
    for &v in &RAMP {
        colors[next] = Rgba::opaque(0, v, 0);
        next += 1;
    }
    for &v in &RAMP {
        colors[next] = Rgba::opaque(0, 0, v);
        next += 1;
    }
    for &v in &RAMP {
        colors[next] = Rgba::opaque(v, v, v);
        next += 1;
    }

    debug_assert_eq!(next, PALETTE_SIZE);
    Palette { colors }
}

/// 256 x 1 RGBA8 texture with one texel per palette slot.
///
/// Meshes sample it at [`PaletteTexture::uv_for`], so a single material can
/// colour every face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTexture {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 texels
    pub data: Vec<u8>,
}

impl PaletteTexture {
    pub fn from_palette(palette: &Palette) -> Self {
        let data = palette
            .colors()
            .iter()
            .flat_map(|c| c.to_array())
            .collect();
        Self {
            width: PALETTE_SIZE as u32,
            height: 1,
            data,
        }
    }

    /// Texel centre for a palette index
    #[inline]
    pub fn uv_for(index: u8) -> [f32; 2] {
        [(index as f32 + 0.5) / PALETTE_SIZE as f32, 0.5]
    }

    pub fn texel(&self, index: u8) -> Rgba {
        let i = index as usize * 4;
        Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        )
    }

    #[cfg(feature = "image")]
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, _| {
            image::Rgba(self.texel(x as u8).to_array())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_layout() {
        let palette = default_palette();
        assert_eq!(palette.get(0), Rgba::TRANSPARENT);
        assert_eq!(palette.get(1), Rgba::opaque(0xFF, 0xFF, 0xFF));
        assert_eq!(palette.get(2), Rgba::opaque(0xFF, 0xFF, 0xCC));
        assert_eq!(palette.get(215), Rgba::opaque(0x00, 0x00, 0x33));
        assert_eq!(palette.get(216), Rgba::opaque(0xEE, 0x00, 0x00));
        assert_eq!(palette.get(226), Rgba::opaque(0x00, 0xEE, 0x00));
        assert_eq!(palette.get(236), Rgba::opaque(0x00, 0x00, 0xEE));
        assert_eq!(palette.get(246), Rgba::opaque(0xEE, 0xEE, 0xEE));
        assert_eq!(palette.get(255), Rgba::opaque(0x11, 0x11, 0x11));
    }

    #[test]
    fn test_slot_zero_is_never_written() {
        let mut palette = Palette::empty();
        palette.set(0, Rgba::opaque(1, 2, 3));
        palette.set(1, Rgba::opaque(1, 2, 3));
        assert_eq!(palette.get(0), Rgba::TRANSPARENT);
        assert_eq!(palette.get(1), Rgba::opaque(1, 2, 3));
    }

    #[test]
    fn test_to_linear() {
        let [r, g, b, a] = Rgba::new(255, 0, 188, 128).to_linear();
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!(g, 0.0);
        assert!((b - 0.5).abs() < 0.01, "b = {}", b);
        assert!((a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_palette_texture() {
        let palette = default_palette();
        let texture = PaletteTexture::from_palette(&palette);
        assert_eq!(texture.width, 256);
        assert_eq!(texture.height, 1);
        assert_eq!(texture.data.len(), 256 * 4);
        assert_eq!(texture.texel(216), palette.get(216));
        assert_eq!(PaletteTexture::uv_for(0), [0.5 / 256.0, 0.5]);
        assert_eq!(PaletteTexture::uv_for(255), [255.5 / 256.0, 0.5]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_to_image() {
        let texture = PaletteTexture::from_palette(&default_palette());
        let image = texture.to_image();
        assert_eq!(image.dimensions(), (256, 1));
        assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }
}
