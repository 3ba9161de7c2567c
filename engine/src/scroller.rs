//! Inertial scrolling of the background.
//!
//! Each button press gives the background a short kick. The velocity then
//! decays by friction and snaps to rest once it gets slow enough.
use crate::input::{Button, Keypad};
use crate::render::tiling::Offset;

/// Acceleration given by a single press, in pixels per frame².
pub const PULSE: f32 = 1.0;

/// Fraction of the velocity kept from one frame to the next.
pub const FRICTION: f32 = 0.9;

/// Below this speed, in pixels per frame, a component stops.
pub const REST_SPEED: f32 = 0.5;

/// Kinematic state driving the tiling offset.
///
/// The offset is kept on 8 signed bits and wraps around. A jump of 256 pixels
/// is a whole number of tile pairs, so the wrap is invisible.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Scroller {
    ax: f32,
    ay: f32,
    vx: f32,
    vy: f32,
    offset_x: i8,
    offset_y: i8,
}

impl Scroller {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ax: 0.0,
            ay: 0.0,
            vx: 0.0,
            vy: 0.0,
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub const fn left(&mut self) {
        self.ax = -PULSE;
    }

    pub const fn right(&mut self) {
        self.ax = PULSE;
    }

    pub const fn up(&mut self) {
        self.ay = -PULSE;
    }

    pub const fn down(&mut self) {
        self.ay = PULSE;
    }

    /// Applies every held button. When opposite buttons are held, right and
    /// down win.
    pub fn apply(&mut self, keypad: &Keypad) {
        for button in keypad.pressed() {
            match button {
                Button::Left => self.left(),
                Button::Right => self.right(),
                Button::Up => self.up(),
                Button::Down => self.down(),
            }
        }
    }

    /// Advances the motion by one frame.
    pub fn tick(&mut self) {
        self.vx += self.ax;
        self.vy += self.ay;

        self.offset_x = advance(self.offset_x, self.vx);
        self.offset_y = advance(self.offset_y, self.vy);

        // a kick only lasts one frame
        self.ax = 0.0;
        self.ay = 0.0;

        self.vx = slow_down(self.vx);
        self.vy = slow_down(self.vy);
    }

    #[must_use]
    pub fn offset(&self) -> Offset {
        Offset::new(i32::from(self.offset_x), i32::from(self.offset_y))
    }

    #[must_use]
    pub const fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0
    }
}

/// Moves a coordinate, truncating toward zero and wrapping on 8 bits.
#[allow(clippy::cast_possible_truncation)]
fn advance(offset: i8, velocity: f32) -> i8 {
    (f32::from(offset) + velocity) as i32 as i8
}

fn slow_down(velocity: f32) -> f32 {
    let velocity = velocity * FRICTION;
    if velocity.abs() < REST_SPEED {
        0.0
    } else {
        velocity
    }
}
