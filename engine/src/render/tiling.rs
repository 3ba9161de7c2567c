//! Scrolling tiled background lit by a circular halo.
//!
//! The background is an endless checkerboard made of two 16×16 tiles, a light
//! one and a dark one, scrolled by the [`Offset`] handed over by the scroll
//! controller. Only the pixels close to the center of the screen are lit; the
//! rest of the screen stays black.
//!
//! # Shading Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Per-pixel shading                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Screen Position (x, y)                                         │
//! │         │                                                       │
//! │         ├──────────────────────────────┐                        │
//! │         ▼                              ▼                        │
//! │  ┌──────────────┐              ┌──────────────┐                 │
//! │  │ Add Scroll   │              │ r² to screen │                 │
//! │  │ Offset       │              │ center       │                 │
//! │  └──────────────┘              └──────────────┘                 │
//! │         │                              │                        │
//! │         ▼                              ▼                        │
//! │  ┌──────────────┐              ┌──────────────┐                 │
//! │  │ Tile parity  │              │ r² < 2^11 ?  │── no ──► black  │
//! │  │ light / dark │              └──────────────┘                 │
//! │  └──────────────┘                      │ yes                    │
//! │         │                              ▼                        │
//! │         ▼                      ┌──────────────┐                 │
//! │  ┌──────────────┐  index 0     │ lux =        │                 │
//! │  │ BITMAP       │─────────────►│ r² · 32/2^11 │                 │
//! │  │ lookup       │  ► black     └──────────────┘                 │
//! │  └──────────────┘                      │                        │
//! │         │ reference color              │                        │
//! │         └──────────────┬───────────────┘                        │
//! │                        ▼                                        │
//! │               PALETTE[1 + color·32 + lux]                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Tile Selection
//!
//! Tiles are numbered along both axes once the offset is applied. The dark
//! tile is used wherever exactly one of the two tile numbers is odd:
//!
//! ```text
//!            tx even   tx odd
//!  ty even │  light  │  dark   │
//!  ty odd  │  dark   │  light  │
//! ```
//!
//! # Palette Layout
//!
//! ```text
//!  index 0        transparent sentinel (never written)
//!  1   ..= 32     reference color #1, levels 0..=31
//!  33  ..= 64     reference color #2, levels 0..=31
//!  65  ..= 96     reference color #3, levels 0..=31
//!  97  ..= 128    reference color #4, levels 0..=31
//! ```
//!
//! The level grows linearly with the squared distance to the center, and each
//! ramp goes from its brightest entry (level 0) to its darkest (level 31).
//!
//! All the divisions by tile sizes, halo radius and level count are by powers
//! of two, so they reduce to shifts and masks.

use std::cell::Cell;

use super::color::Color;
use super::renderable::Renderable;
use super::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Width of a tile in pixels.
pub const TILE_WIDTH: usize = 16;

/// Height of a tile in pixels.
pub const TILE_HEIGHT: usize = 16;

/// Pixels in a tile; also the distance between the two tiles in [`BITMAP`].
pub const TILE_LEN: usize = TILE_WIDTH * TILE_HEIGHT;

/// The squared halo radius is `2^HALO_RADIUS2_POWER_OF_TWO` (radius ≈ 45px).
pub const HALO_RADIUS2_POWER_OF_TWO: u32 = 11;

/// Each reference color has `2^BRIGHTNESS_LEVELS_POWER_OF_TWO` levels.
pub const BRIGHTNESS_LEVELS_POWER_OF_TWO: u32 = 5;

/// Number of entries in a brightness ramp.
pub const BRIGHTNESS_LEVELS: usize = 1 << BRIGHTNESS_LEVELS_POWER_OF_TWO;

/// Number of reference colors used by the tiles.
pub const REFERENCE_COLORS: usize = 4;

/// Bitmap index of the transparent color.
pub const TRANSPARENT: u8 = 0;

#[rustfmt::skip]
const TILESET: [u8; 2 * TILE_LEN] = [
    // light tile
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3,
    0, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 0,
    // dark tile
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3,
    0, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 0,
];

#[rustfmt::skip]
const RAMPS: [u16; 1 + REFERENCE_COLORS * BRIGHTNESS_LEVELS] = [
    // transparent sentinel
    0xffff,
    // reference color #1
    0x79ce, 0x38c6, 0xf7bd, 0xd7bd, 0x96b5, 0x75ad, 0x34a5, 0xf39c,
    0xd39c, 0x9294, 0x718c, 0x3084, 0x1084, 0xcf7b, 0x8e73, 0x6d6b,
    0x2c63, 0x0c63, 0xcb5a, 0x8a52, 0x694a, 0x2842, 0x0842, 0xc739,
    0x8631, 0x6529, 0x2421, 0x0421, 0xc318, 0x8210, 0x6108, 0x2000,
    // reference color #2
    0x55ad, 0x34a5, 0xf39c, 0xd39c, 0xb294, 0x718c, 0x518c, 0x3084,
    0x1084, 0xcf7b, 0xae73, 0x8e73, 0x4d6b, 0x2c63, 0x0c63, 0xcb5a,
    0xaa52, 0x8a52, 0x494a, 0x2842, 0x0842, 0xc739, 0xa631, 0x8631,
    0x4529, 0x2421, 0x0421, 0xc318, 0xa210, 0x8210, 0x4108, 0x2000,
    // reference color #3
    0x2842, 0x0842, 0x0842, 0xe739, 0xe739, 0xc739, 0xa631, 0xa631,
    0x8631, 0x8631, 0x6529, 0x6529, 0x4529, 0x4529, 0x2421, 0x2421,
    0x0421, 0x0421, 0xe318, 0xe318, 0xc318, 0xa210, 0xa210, 0x8210,
    0x8210, 0x6108, 0x6108, 0x4108, 0x4108, 0x2000, 0x2000, 0x0000,
    // reference color #4
    0x518c, 0x3084, 0x1084, 0xcf7b, 0xae73, 0x8e73, 0x6d6b, 0x4d6b,
    0x2c63, 0x0c63, 0xeb5a, 0xcb5a, 0xaa52, 0x8a52, 0x694a, 0x494a,
    0x2842, 0x0842, 0xe739, 0xa631, 0x8631, 0x6529, 0x4529, 0x2421,
    0x0421, 0xe318, 0xc318, 0xa210, 0x8210, 0x6108, 0x4108, 0x2000,
];

/// Reference color indices of the light tile followed by the dark tile.
pub static BITMAP: [u8; 2 * TILE_LEN] = TILESET;

/// Wire words of the transparent sentinel followed by one brightness ramp per
/// reference color.
pub static PALETTE: [u16; 1 + REFERENCE_COLORS * BRIGHTNESS_LEVELS] = RAMPS;

const fn highest_reference_color(bitmap: &[u8]) -> u8 {
    let mut highest = 0;
    let mut i = 0;
    while i < bitmap.len() {
        if bitmap[i] > highest {
            highest = bitmap[i];
        }
        i += 1;
    }
    highest
}

const _: () = assert!(
    highest_reference_color(&TILESET) as usize <= REFERENCE_COLORS,
    "the bitmap references a color the palette does not have"
);

// The farthest pixel of the halo must still land inside its ramp.
const _: () = assert!(brightness_level((1 << HALO_RADIUS2_POWER_OF_TWO) - 1) < BRIGHTNESS_LEVELS);

// The squared distance of a screen corner, shifted by the level count, fits in 32 bits.
const _: () = assert!(
    ((SCREEN_WIDTH / 2) * (SCREEN_WIDTH / 2) + (SCREEN_HEIGHT / 2) * (SCREEN_HEIGHT / 2))
        << BRIGHTNESS_LEVELS_POWER_OF_TWO
        <= u32::MAX as usize
);

/// Displacement applied to every sampled tile coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Applies a scroll offset to a screen coordinate.
///
/// The sum wraps around the machine word. The word size is a multiple of
/// every tile period, so tile parity and in-tile position are unaffected.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn scrolled(coordinate: usize, offset: i32) -> usize {
    coordinate.wrapping_add_signed(offset as isize)
}

/// Whether the dark tile is sampled at the scrolled position `(xo, yo)`.
#[must_use]
pub const fn uses_alternate_tile(xo: usize, yo: usize) -> bool {
    ((xo / TILE_WIDTH) ^ (yo / TILE_HEIGHT)) & 1 == 1
}

/// Index in [`BITMAP`] of the scrolled position `(xo, yo)`.
#[must_use]
pub const fn bitmap_index(xo: usize, yo: usize) -> usize {
    let local = (yo % TILE_HEIGHT) * TILE_WIDTH + xo % TILE_WIDTH;
    if uses_alternate_tile(xo, yo) {
        local + TILE_LEN
    } else {
        local
    }
}

/// Squared distance from the screen pixel `(x, y)` to the screen center.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn distance2_to_center(x: usize, y: usize) -> u32 {
    let dx = x as i32 - (SCREEN_WIDTH / 2) as i32;
    let dy = y as i32 - (SCREEN_HEIGHT / 2) as i32;
    (dx * dx + dy * dy).unsigned_abs()
}

#[must_use]
pub const fn is_inside_halo(r2: u32) -> bool {
    r2 >> HALO_RADIUS2_POWER_OF_TWO == 0
}

/// Brightness level for a pixel inside the halo, `r2 · 2^5 / 2^11`.
#[must_use]
pub const fn brightness_level(r2: u32) -> usize {
    ((r2 << BRIGHTNESS_LEVELS_POWER_OF_TWO) >> HALO_RADIUS2_POWER_OF_TWO) as usize
}

/// Index in [`PALETTE`] of a zero-based reference color at a given level.
#[must_use]
pub const fn palette_index(reference_color: usize, level: usize) -> usize {
    1 + (reference_color << BRIGHTNESS_LEVELS_POWER_OF_TWO) + level
}

/// The background layer. It must be the first entity drawn in a slice since
/// it clears the slice before painting it.
#[derive(Debug, Default)]
pub struct Tiling {
    offset: Cell<Offset>,
}

impl Tiling {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: Cell::new(Offset::new(0, 0)),
        }
    }

    /// Sets the displacement used by the next draws.
    pub fn set_offset(&self, offset: Offset) {
        self.offset.set(offset);
    }

    #[must_use]
    pub fn offset(&self) -> Offset {
        self.offset.get()
    }
}

impl Renderable for Tiling {
    fn draw(&self, slice_y: usize, slice_height: usize, buffer: &mut [Color]) {
        let slice_len = SCREEN_WIDTH * slice_height;
        debug_assert!(buffer.len() >= slice_len);
        debug_assert!(slice_y + slice_height <= SCREEN_HEIGHT);

        let offset = self.offset.get();
        let slice = &mut buffer[..slice_len];

        // the whole slice goes dark first, only the halo gets painted
        slice.fill(Color::BLACK);

        for (sy, row) in slice.chunks_exact_mut(SCREEN_WIDTH).enumerate() {
            let y = slice_y + sy;
            let yo = scrolled(y, offset.y);
            let ry2 = distance2_to_center(SCREEN_WIDTH / 2, y);

            for (x, pixel) in row.iter_mut().enumerate() {
                let dx = x.abs_diff(SCREEN_WIDTH / 2);
                #[allow(clippy::cast_possible_truncation)]
                let r2 = (dx * dx) as u32 + ry2;

                if !is_inside_halo(r2) {
                    continue;
                }

                let xo = scrolled(x, offset.x);
                let reference_color = BITMAP[bitmap_index(xo, yo)];

                if reference_color == TRANSPARENT {
                    continue;
                }

                let index = palette_index(
                    usize::from(reference_color - 1),
                    brightness_level(r2),
                );
                *pixel = Color::from_wire(PALETTE[index]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::render::{SLICE_COUNT, SLICE_HEIGHT};
    use pretty_assertions::{assert_eq, assert_ne};

    const FRAME_LEN: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

    /// Straightforward signed-arithmetic rendition of the shading rules, used
    /// to check the optimized loop pixel by pixel.
    fn reference_pixel(x: usize, y: usize, offset: Offset) -> Color {
        let (x, y) = (x as i64, y as i64);
        let xo = (x + i64::from(offset.x)).rem_euclid(256);
        let yo = (y + i64::from(offset.y)).rem_euclid(256);
        let dark = ((xo / 16) % 2 == 1) != ((yo / 16) % 2 == 1);
        let index = (yo % 16) * 16 + xo % 16 + if dark { 256 } else { 0 };

        let r2 = (x - 80).pow(2) + (y - 64).pow(2);
        if r2 >= 2048 {
            return Color::BLACK;
        }

        let value = BITMAP[index as usize];
        if value == 0 {
            return Color::BLACK;
        }

        let level = r2 * 32 / 2048;
        Color(PALETTE[1 + (usize::from(value) - 1) * 32 + level as usize])
    }

    fn render_frame(tiling: &Tiling, frame: &mut [Color]) {
        for (slice, buffer) in frame.chunks_exact_mut(SCREEN_WIDTH * SLICE_HEIGHT).enumerate() {
            tiling.draw(slice * SLICE_HEIGHT, SLICE_HEIGHT, buffer);
        }
    }

    fn reference_frame(offset: Offset) -> Vec<Color> {
        (0..SCREEN_HEIGHT)
            .flat_map(|y| (0..SCREEN_WIDTH).map(move |x| reference_pixel(x, y, offset)))
            .collect()
    }

    #[test]
    fn tables_have_the_documented_sizes() {
        assert_eq!(BITMAP.len(), 512);
        assert_eq!(PALETTE.len(), 129);
        assert_eq!(PALETTE[0], 0xffff);
    }

    #[test]
    fn alternate_tile_follows_tile_parity() {
        // (x, y, offset x, offset y, dark tile)
        let cases = [
            (0, 0, 0, 0, false),
            (15, 15, 0, 0, false),
            (16, 0, 0, 0, true),
            (0, 16, 0, 0, true),
            (16, 16, 0, 0, false),
            (31, 47, 0, 0, true),
            (0, 0, 16, 0, true),
            (0, 0, 16, 16, false),
            (0, 0, -1, 0, true),
            (0, 0, -1, -1, false),
            (15, 0, 1, 0, true),
            (80, 64, 0, 0, true),
            (159, 127, 0, 0, false),
            (159, 127, 1, 1, false),
            (0, 0, 255, 0, true),
            (0, 0, 256, 0, false),
        ];

        for (x, y, ox, oy, expected) in cases {
            let xo = scrolled(x, ox);
            let yo = scrolled(y, oy);
            assert_eq!(
                uses_alternate_tile(xo, yo),
                expected,
                "pixel ({x}, {y}) with offset ({ox}, {oy})"
            );
        }
    }

    #[test]
    fn bitmap_index_jumps_to_the_dark_tile() {
        assert_eq!(bitmap_index(0, 0), 0);
        assert_eq!(bitmap_index(17, 1), TILE_LEN + 16 + 1);
        assert_eq!(bitmap_index(33, 34), 2 * 16 + 1);
    }

    #[test]
    fn levels_stay_inside_their_ramp() {
        let mut previous = 0;
        for r2 in 0..(1 << HALO_RADIUS2_POWER_OF_TWO) {
            assert!(is_inside_halo(r2));

            let level = brightness_level(r2);
            assert!(level >= previous, "level decreased at r2 = {r2}");
            assert!(level < BRIGHTNESS_LEVELS);
            previous = level;

            for reference_color in 0..REFERENCE_COLORS {
                let index = palette_index(reference_color, level);
                let ramp_start = 1 + reference_color * BRIGHTNESS_LEVELS;
                assert!((ramp_start..ramp_start + BRIGHTNESS_LEVELS).contains(&index));
            }
        }

        assert_eq!(brightness_level(0), 0);
        assert_eq!(brightness_level(2047), 31);
        assert!(!is_inside_halo(2048));
    }

    #[test]
    fn draw_matches_the_reference_for_random_offsets() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let tiling = Tiling::new();
        let mut frame = vec![Color::BLACK; FRAME_LEN];

        for _ in 0..16 {
            let offset = Offset::new(rng.random_range(-300..300), rng.random_range(-300..300));
            tiling.set_offset(offset);
            render_frame(&tiling, &mut frame);

            assert_eq!(frame, reference_frame(offset), "offset {offset:?}");
        }
    }

    #[test]
    fn pixels_outside_the_halo_are_cleared() {
        let tiling = Tiling::new();
        tiling.set_offset(Offset::new(7, -3));
        let mut frame = vec![Color(0xBEEF); FRAME_LEN];

        render_frame(&tiling, &mut frame);

        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                if !is_inside_halo(distance2_to_center(x, y)) {
                    assert_eq!(frame[x + y * SCREEN_WIDTH], Color::BLACK, "pixel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn center_is_the_transparent_corner_without_offset() {
        let tiling = Tiling::new();
        let mut frame = vec![Color(0xBEEF); FRAME_LEN];

        render_frame(&tiling, &mut frame);

        // (80, 64) is the top-left corner of a dark tile
        assert_eq!(frame[80 + 64 * SCREEN_WIDTH], Color::BLACK);
        // (81, 65): dark tile interior, r2 = 2, level 0 of reference color #4
        assert_eq!(frame[81 + 65 * SCREEN_WIDTH], Color(0x518c));
    }

    #[test]
    fn center_samples_the_brightest_level() {
        let tiling = Tiling::new();
        tiling.set_offset(Offset::new(1, 1));
        let mut frame = vec![Color::BLACK; FRAME_LEN];

        render_frame(&tiling, &mut frame);

        assert_eq!(distance2_to_center(80, 64), 0);
        assert_eq!(frame[80 + 64 * SCREEN_WIDTH], Color(PALETTE[palette_index(3, 0)]));
    }

    #[test]
    fn halo_edge_is_a_hard_boundary() {
        let tiling = Tiling::new();
        let mut buffer = vec![Color(0xBEEF); SCREEN_WIDTH * SLICE_HEIGHT];

        // rows 104..112 hold both y = 109 (r2 = 2025) and y = 110 (r2 = 2116)
        tiling.draw(104, SLICE_HEIGHT, &mut buffer);

        assert_eq!(buffer[80 + 5 * SCREEN_WIDTH], Color(0x2000));
        assert_eq!(buffer[80 + 6 * SCREEN_WIDTH], Color::BLACK);
    }

    #[test]
    fn offsets_a_full_turn_apart_render_the_same() {
        let tiling = Tiling::new();
        let mut a = vec![Color::BLACK; FRAME_LEN];
        let mut b = vec![Color::BLACK; FRAME_LEN];

        tiling.set_offset(Offset::new(-1, -3));
        render_frame(&tiling, &mut a);
        tiling.set_offset(Offset::new(255, 253));
        render_frame(&tiling, &mut b);

        assert_eq!(a, b);
    }

    #[test]
    fn consecutive_frames_fully_repaint() {
        let tiling = Tiling::new();
        let mut frame = vec![Color::BLACK; FRAME_LEN];

        tiling.set_offset(Offset::new(3, 5));
        render_frame(&tiling, &mut frame);
        let first = frame.clone();
        assert_eq!(first, reference_frame(Offset::new(3, 5)));

        tiling.set_offset(Offset::new(-9, 12));
        render_frame(&tiling, &mut frame);

        assert_eq!(frame, reference_frame(Offset::new(-9, 12)));
        assert_ne!(frame, first);
        assert_eq!(frame.len() / (SCREEN_WIDTH * SLICE_HEIGHT), SLICE_COUNT);
    }
}
