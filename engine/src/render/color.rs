use std::fmt::Display;

/// A 16-bit RGB565 pixel, stored the way the panel receives it.
///
/// The panel is fed over SPI most significant byte first, so the words held in
/// slice buffers (and in every compiled-in table) are the RGB565 value with its
/// two bytes swapped:
///
/// ```text
///  RGB565          rrrrrggg gggbbbbb
///  stored word     gggbbbbb rrrrrggg
/// ```
///
/// Nothing in the rendering path converts colors: table words are copied
/// verbatim into the slice buffers. Conversion only happens when a frame is
/// shown on a desktop preview.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u16);

impl Color {
    /// The cleared value of a slice: every channel at zero.
    pub const BLACK: Self = Self(0);

    #[must_use]
    pub const fn from_wire(word: u16) -> Self {
        Self(word)
    }

    /// Builds a color from 5-bit red, 6-bit green and 5-bit blue channels.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let red = (red & 0x1F) as u16;
        let green = (green & 0x3F) as u16;
        let blue = (blue & 0x1F) as u16;

        Self(((red << 11) | (green << 5) | blue).swap_bytes())
    }

    /// The color as a native-order RGB565 value.
    #[must_use]
    pub const fn rgb565(self) -> u16 {
        self.0.swap_bytes()
    }

    #[must_use]
    pub const fn red(self) -> u8 {
        (self.rgb565() >> 11) as u8
    }

    #[must_use]
    pub const fn green(self) -> u8 {
        ((self.rgb565() >> 5) & 0x3F) as u8
    }

    #[must_use]
    pub const fn blue(self) -> u8 {
        (self.rgb565() & 0x1F) as u8
    }

    /// Expands the channels to 8 bits, replicating the high bits into the
    /// low ones so that full intensity maps to 255.
    #[must_use]
    pub const fn to_rgb888(self) -> [u8; 3] {
        let red = self.red();
        let green = self.green();
        let blue = self.blue();

        [
            (red << 3) | (red >> 2),
            (green << 2) | (green >> 4),
            (blue << 3) | (blue >> 2),
        ]
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.red(), self.green(), self.blue())
    }
}

impl From<u16> for Color {
    fn from(word: u16) -> Self {
        Self::from_wire(word)
    }
}

impl From<Color> for u16 {
    fn from(color: Color) -> Self {
        color.0
    }
}
