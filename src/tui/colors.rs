use palette::{FromColor, Lch, Srgb};

use crate::engine::grid::Tile;

/// Number of distinct tile hues before the palette wraps around.
const HUES: u32 = 11;
const FG_HUE: f32 = 28.0 + 180.0;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Rgb(pub(crate) u8, pub(crate) u8, pub(crate) u8);

impl Rgb {
    pub(crate) const BOARD_BG: Rgb = Rgb(60, 46, 40);
    pub(crate) const BOARD_FG: Rgb = Rgb(187, 173, 160);
    pub(crate) const EMPTY_TILE: Rgb = Rgb(92, 80, 72);
    pub(crate) const PANEL_BG: Rgb = Rgb(143, 122, 102);
    pub(crate) const TEXT: Rgb = Rgb(249, 246, 242);
    pub(crate) const HIGHLIGHT: Rgb = Rgb(237, 194, 46);
}

impl From<Srgb<u8>> for Rgb {
    fn from(c: Srgb<u8>) -> Rgb {
        Rgb(c.red, c.green, c.blue)
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(f: Rgb) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: f.0,
            g: f.1,
            b: f.2,
        }
    }
}

/// Background and foreground colors of a tile. Hue rotates with the tile's exponent so that
/// neighbouring values stay distinguishable.
pub(crate) fn tile_colors(value: Tile) -> (Rgb, Rgb) {
    if value == 0 {
        return (Rgb::EMPTY_TILE, Rgb::BOARD_FG);
    }
    let exponent = value.trailing_zeros();
    let hue = (exponent % HUES) as f32 * 360.0 / (HUES - 1) as f32;
    let bg: Lch = Lch::new(80.0, 90.0, hue);
    let fg: Lch = Lch::new(20.0, 50.0, FG_HUE);
    (
        Srgb::from_color(bg).into_format::<u8>().into(),
        Srgb::from_color(fg).into_format::<u8>().into(),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tiles_get_distinct_backgrounds() {
        let backgrounds: Vec<Rgb> = (1..HUES).map(|e| tile_colors(1 << e).0).collect();
        for (i, a) in backgrounds.iter().enumerate() {
            for b in backgrounds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn empty_tile_uses_board_colors() {
        assert_eq!(tile_colors(0), (Rgb::EMPTY_TILE, Rgb::BOARD_FG));
    }
}
