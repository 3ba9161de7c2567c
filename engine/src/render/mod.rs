//! Data structures and constants used to render the panel.
//!
//! The screen is never rendered as a whole. It is cut into horizontal
//! **slices** of [`SLICE_HEIGHT`] rows, and each slice is drawn into one of two
//! small buffers while the other one is being pushed to the panel:
//!
//! ```text
//!   y = 0   ┌──────────────────────────────┐  slice 0  → buffer A
//!   y = 8   ├──────────────────────────────┤  slice 1  → buffer B
//!   y = 16  ├──────────────────────────────┤  slice 2  → buffer A
//!           │             ...              │
//!   y = 120 ├──────────────────────────────┤  slice 15 → buffer B
//!   y = 128 └──────────────────────────────┘
//!            ◄──────── 160 pixels ────────►
//! ```
pub mod ball;
pub mod color;
pub mod framebuffer;
pub mod observer_list;
pub mod renderable;
pub mod renderer;
pub mod tiling;

use self::color::Color;

/// Panel width in pixels.
pub const SCREEN_WIDTH: usize = 160;

/// Panel height in pixels.
pub const SCREEN_HEIGHT: usize = 128;

/// Height of a slice, the unit of compute/transfer overlap.
pub const SLICE_HEIGHT: usize = 8;

/// Number of slices in a frame.
pub const SLICE_COUNT: usize = SCREEN_HEIGHT / SLICE_HEIGHT;

/// Number of pixels held by a slice buffer.
pub const SLICE_LEN: usize = SCREEN_WIDTH * SLICE_HEIGHT;

const _: () = assert!(
    SCREEN_HEIGHT % SLICE_HEIGHT == 0,
    "the screen height must be a multiple of the slice height"
);

// Slice ordinates are handed to the panel as 8-bit row addresses.
const _: () = assert!(SCREEN_WIDTH <= 256 && SCREEN_HEIGHT <= 256);

/// One slice worth of pixels, row-major, `index = x + y * SCREEN_WIDTH`.
pub type SliceBuffer = [Color; SLICE_LEN];

/// Allocates a zeroed slice buffer on the heap.
#[must_use]
pub fn new_slice_buffer() -> Box<SliceBuffer> {
    Box::new([Color::BLACK; SLICE_LEN])
}
