//! # Shading Effect Engine
//!
//! Renders a scrolling checkerboard of tiles lit by a circular halo, with a
//! ball sprite on top, to a 160×128 RGB565 panel.
//!
//! ```text
//! Game::tick(keypad)
//!     │
//!     ├─► Scroller: buttons → acceleration → velocity → offset
//!     │
//!     ├─► Tiling::set_offset(offset)
//!     │
//!     └─► Renderer::draw()
//!             │
//!             └─► for each 8-pixel slice (buffers A, B, A, B, ...)
//!                     ├─► ObserverList::draw  (Tiling, then Ball)
//!                     ├─► DisplayLink::await_transfer   (previous slice)
//!                     └─► DisplayLink::begin_transfer   (this slice)
//! ```
//!
//! The crate never installs a `tracing` subscriber; the binary does.

pub mod display;
pub mod game;
pub mod input;
pub mod render;
pub mod scroller;
