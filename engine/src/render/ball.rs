use super::color::Color;
use super::renderable::Renderable;
use super::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const BALL_WIDTH: usize = 16;
pub const BALL_HEIGHT: usize = 16;

/// Sprite pixels with this value are not drawn.
pub const TRANSPARENT_COLOR: Color = Color::from_rgb(31, 0, 31);

/// The ball sprite, row-major, in wire order.
pub static SPRITE: [Color; BALL_WIDTH * BALL_HEIGHT] = shaded_disc();

/// Squared radius of the disc, in half-pixel units.
const DISC_RADIUS2: i32 = 16 * 16;

/// Renders a disc lit from the upper left.
///
/// Coordinates are doubled so that the center of the sprite, which falls
/// between pixels, is an integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn shaded_disc() -> [Color; BALL_WIDTH * BALL_HEIGHT] {
    let mut sprite = [TRANSPARENT_COLOR; BALL_WIDTH * BALL_HEIGHT];

    let mut y = 0;
    while y < BALL_HEIGHT {
        let mut x = 0;
        while x < BALL_WIDTH {
            let dx = 2 * x as i32 - (BALL_WIDTH as i32 - 1);
            let dy = 2 * y as i32 - (BALL_HEIGHT as i32 - 1);

            if dx * dx + dy * dy <= DISC_RADIUS2 {
                // highlight sits a third of the radius up and left
                let lx = dx + 5;
                let ly = dy + 5;
                let falloff = (lx * lx + ly * ly) * 26 / 800;
                let shade = if falloff > 26 { 5 } else { 31 - falloff };

                sprite[x + y * BALL_WIDTH] =
                    Color::from_rgb(shade as u8, shade as u8, (shade / 4) as u8);
            }
            x += 1;
        }
        y += 1;
    }

    sprite
}

const _: () = assert!(BALL_WIDTH <= SCREEN_WIDTH && BALL_HEIGHT <= SCREEN_HEIGHT);

/// The foreground sprite, fixed at the center of the screen.
///
/// It only overlays: pixels outside the sprite and transparent sprite pixels
/// are left as the previous entities painted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ball {
    x: usize,
    y: usize,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

impl Ball {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: (SCREEN_WIDTH - BALL_WIDTH) / 2,
            y: (SCREEN_HEIGHT - BALL_HEIGHT) / 2,
        }
    }

    /// Screen position of the top-left corner of the sprite.
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}

impl Renderable for Ball {
    fn draw(&self, slice_y: usize, slice_height: usize, buffer: &mut [Color]) {
        debug_assert!(buffer.len() >= SCREEN_WIDTH * slice_height);

        let first = self.y.max(slice_y);
        let last = (self.y + BALL_HEIGHT).min(slice_y + slice_height);

        for y in first..last {
            let sprite_row = &SPRITE[(y - self.y) * BALL_WIDTH..][..BALL_WIDTH];
            let start = self.x + (y - slice_y) * SCREEN_WIDTH;
            let row = &mut buffer[start..start + BALL_WIDTH];

            for (pixel, &color) in row.iter_mut().zip(sprite_row) {
                if color != TRANSPARENT_COLOR {
                    *pixel = color;
                }
            }
        }
    }
}
