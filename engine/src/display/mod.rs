//! Links between the renderer and a panel.
//!
//! A link moves one slice buffer at a time to a rectangular window of the
//! panel. Transfers are asynchronous: the buffer is handed over when the
//! transfer begins and handed back when it is awaited, so it cannot be
//! touched while the panel is still reading it.
//!
//! ```text
//!   Renderer                          DisplayLink
//!      │  begin_transfer(region, buf)      │
//!      │ ────────────────────────────────► │  buf in flight
//!      │                                   │
//!      │  (computes the next slice)        │
//!      │                                   │
//!      │  await_transfer()                 │
//!      │ ────────────────────────────────► │
//!      │ ◄──────────────────────────────── │  buf back
//! ```
pub mod capture;
pub mod panel;

use std::fmt::Display;

use thiserror::Error;

use crate::render::{SCREEN_HEIGHT, SCREEN_WIDTH, SliceBuffer};

/// A window of the panel, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    #[must_use]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered by the region.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the region lies entirely on the screen.
    #[must_use]
    pub const fn fits_screen(&self) -> bool {
        self.x + self.width <= SCREEN_WIDTH && self.y + self.height <= SCREEN_HEIGHT
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The far side of the link is gone.
    #[error("display link disconnected")]
    Disconnected,

    /// A transfer was started while another one was still in flight.
    #[error("a transfer is already in flight")]
    Busy,

    #[error("region {0} does not fit the screen or the buffer")]
    OutOfBounds(Region),

    /// A buffer was awaited but none was in flight, or the renderer lost
    /// track of one of its buffers.
    #[error("slice buffer lost")]
    BufferLost,
}

/// Asynchronous transport of slice buffers to a panel.
///
/// At most one transfer is in flight at a time.
pub trait DisplayLink {
    /// Starts pushing `buffer` to `region` and returns immediately.
    ///
    /// # Errors
    /// Returns [`TransferError::Busy`] if the previous transfer has not been
    /// awaited, [`TransferError::OutOfBounds`] if `region` is not on screen or
    /// larger than the buffer, and [`TransferError::Disconnected`] if the panel
    /// is gone.
    fn begin_transfer(
        &mut self,
        region: Region,
        buffer: Box<SliceBuffer>,
    ) -> Result<(), TransferError>;

    /// Blocks until the transfer in flight is done and hands its buffer back.
    ///
    /// # Errors
    /// Returns [`TransferError::BufferLost`] when nothing is in flight and
    /// [`TransferError::Disconnected`] if the panel went away mid-transfer.
    fn await_transfer(&mut self) -> Result<Box<SliceBuffer>, TransferError>;
}

/// Checks a region against the screen and the slice buffer size.
///
/// # Errors
/// Returns [`TransferError::OutOfBounds`] carrying the rejected region.
pub const fn check_region(region: Region) -> Result<(), TransferError> {
    if region.fits_screen() && region.len() <= crate::render::SLICE_LEN {
        Ok(())
    } else {
        Err(TransferError::OutOfBounds(region))
    }
}
