use super::color::Color;
use super::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::display::{Region, TransferError, check_region};

/// What the panel currently shows, one [`Color`] per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[Color]>,
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &SCREEN_WIDTH)
            .field("height", &SCREEN_HEIGHT)
            .field("checksum", &self.checksum())
            .finish()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: vec![Color::BLACK; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
        }
    }

    /// Copies `pixels`, row-major and `region.width` wide, into `region`.
    ///
    /// # Errors
    /// Returns [`TransferError::OutOfBounds`] if the region is not on screen
    /// or `pixels` is too short for it.
    pub fn blit(&mut self, region: Region, pixels: &[Color]) -> Result<(), TransferError> {
        check_region(region)?;
        if pixels.len() < region.len() {
            return Err(TransferError::OutOfBounds(region));
        }
        if region.is_empty() {
            return Ok(());
        }

        for (row, source) in pixels.chunks_exact(region.width).take(region.height).enumerate() {
            let start = region.x + (region.y + row) * SCREEN_WIDTH;
            self.pixels[start..start + region.width].copy_from_slice(source);
        }

        Ok(())
    }

    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Expands every pixel to 8-bit RGB, row by row.
    #[must_use]
    pub fn to_rgb888(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|color| color.to_rgb888()).collect()
    }

    /// FNV-1a over the wire words, used to compare frames cheaply.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        self.pixels.iter().fold(0xcbf2_9ce4_8422_2325, |hash, color| {
            color
                .0
                .to_le_bytes()
                .iter()
                .fold(hash, |hash, &byte| {
                    (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
                })
        })
    }
}

impl std::ops::Index<(usize, usize)> for Framebuffer {
    type Output = Color;

    fn index(&self, (x, y): (usize, usize)) -> &Color {
        assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);
        &self.pixels[y * SCREEN_WIDTH + x]
    }
}
