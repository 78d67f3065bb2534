//! A mutable view over the pixels of one segment.
//!
//! Patterns draw through [`Pixels`] instead of indexing the LED buffer
//! directly. Out-of-range indexes are ignored, which lets patterns such as the
//! scanner draw partially visible tails without bounds checks of their own.

use smart_leds::RGB8;

use crate::color::{BLACK, is_black, wheel};

/// Full brightness; colors are stored unchanged.
pub const MAX_BRIGHTNESS: u8 = 255;

/// Drawing surface for one segment of an LED buffer.
pub struct Pixels<'a> {
    leds: &'a mut [RGB8],
    brightness: u8,
    keep_nonzero: bool,
}

impl<'a> Pixels<'a> {
    /// View `leds` at full brightness.
    #[must_use]
    pub const fn new(leds: &'a mut [RGB8]) -> Self {
        Self {
            leds,
            brightness: MAX_BRIGHTNESS,
            keep_nonzero: false,
        }
    }

    /// View `leds` with colors scaled by `brightness` on every write.
    ///
    /// With `keep_nonzero`, a color that is not black never scales down to
    /// black: its strongest channel is kept at 1.
    #[must_use]
    pub const fn with_brightness(leds: &'a mut [RGB8], brightness: u8, keep_nonzero: bool) -> Self {
        Self {
            leds,
            brightness,
            keep_nonzero,
        }
    }

    /// Number of pixels in the view.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.leds.len()
    }

    /// Returns `true` if the view has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// The stored pixels.
    #[must_use]
    pub fn as_slice(&self) -> &[RGB8] {
        &*self.leds
    }

    /// Apply the view's brightness to `color`.
    #[must_use]
    pub fn scale(&self, color: RGB8) -> RGB8 {
        if self.brightness == MAX_BRIGHTNESS {
            return color;
        }
        let brightness = u16::from(self.brightness);
        let channel = |value: u8| ((u16::from(value) * brightness + 0x80) >> 8) as u8;
        let mut scaled = RGB8::new(channel(color.r), channel(color.g), channel(color.b));
        if self.keep_nonzero && self.brightness != 0 && !is_black(color) && is_black(scaled) {
            if color.r >= color.g && color.r >= color.b {
                scaled.r = 1;
            } else if color.g >= color.b {
                scaled.g = 1;
            } else {
                scaled.b = 1;
            }
        }
        scaled
    }

    /// Set pixel `index`; ignored when out of range.
    pub fn set(&mut self, index: usize, color: RGB8) {
        let scaled = self.scale(color);
        if let Some(pixel) = self.leds.get_mut(index) {
            *pixel = scaled;
        }
    }

    /// Store `color` as is, without brightness scaling.
    pub(crate) fn set_unscaled(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.leds.get_mut(index) {
            *pixel = color;
        }
    }

    /// Set pixel `index`; negative and too large indexes are ignored.
    pub fn set_clipped(&mut self, index: i32, color: RGB8) {
        if let Ok(index) = usize::try_from(index) {
            self.set(index, color);
        }
    }

    /// The stored (brightness scaled) color of pixel `index`, black when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> RGB8 {
        self.leds.get(index).copied().unwrap_or(BLACK)
    }

    /// Add `color` to pixel `index`, saturating each channel at 255.
    pub fn add(&mut self, index: usize, color: RGB8) {
        let scaled = self.scale(color);
        if let Some(pixel) = self.leds.get_mut(index) {
            *pixel = if is_black(*pixel) {
                scaled
            } else {
                RGB8::new(
                    pixel.r.saturating_add(scaled.r),
                    pixel.g.saturating_add(scaled.g),
                    pixel.b.saturating_add(scaled.b),
                )
            };
        }
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: RGB8) {
        let scaled = self.scale(color);
        self.leds.fill(scaled);
    }

    /// Set `len` pixels starting at `first`; nothing happens unless the whole
    /// region fits.
    pub fn fill_region(&mut self, color: RGB8, first: usize, len: usize) {
        let scaled = self.scale(color);
        if let Some(region) = first
            .checked_add(len)
            .and_then(|end| self.leds.get_mut(first..end))
        {
            region.fill(scaled);
        }
    }

    /// Switch all pixels off.
    pub fn clear(&mut self) {
        self.leds.fill(BLACK);
    }

    /// Halve the stored color of pixel `index`.
    pub fn dim_at(&mut self, index: usize) {
        if let Some(pixel) = self.leds.get_mut(index) {
            *pixel = crate::color::dim(*pixel);
        }
    }

    /// Light `len` pixels with `color` and switch the rest off.
    ///
    /// `from_bottom` grows the bar from index 0, otherwise from the last pixel.
    pub fn draw_bar(&mut self, len: usize, color: RGB8, from_bottom: bool) {
        let count = self.len();
        for index in 0..count {
            if in_bar(index, len, count, from_bottom) {
                self.set(index, color);
            } else {
                self.set(index, BLACK);
            }
        }
    }

    /// Like [`draw_bar`](Self::draw_bar), but each lit pixel takes its color from `colors`.
    ///
    /// `colors` holds one entry per pixel, listed from the top (last pixel) down.
    pub fn draw_bar_from_colors(&mut self, len: usize, colors: &[RGB8], from_bottom: bool) {
        let count = self.len();
        for index in 0..count {
            if in_bar(index, len, count, from_bottom) {
                let color_index = if from_bottom { count - 1 - index } else { index };
                let color = colors.get(color_index).copied().unwrap_or(BLACK);
                self.set(index, color);
            } else {
                self.set(index, BLACK);
            }
        }
    }

    /// Spread one turn of the color wheel over the pixels, starting with
    /// `start` at index 0 (or at the last pixel when `reversed`).
    pub fn rainbow(&mut self, start: u8, reversed: bool) {
        let count = self.len();
        if count == 0 {
            return;
        }
        let delta = (0x10000 / count) as u16;
        let mut position = u16::from(start) << 8;
        for index in 0..count {
            let target = if reversed { count - 1 - index } else { index };
            self.set(target, wheel((position >> 8) as u8));
            position = position.wrapping_add(delta);
        }
    }

    /// Show the low-end response of the LEDs: for red, green and blue the
    /// values 1, 2, 3, 4, 8, ... 128 and 255, one pixel each.
    pub fn test_resolution(&mut self) {
        const LEVELS: [u8; 10] = [1, 2, 3, 4, 8, 16, 32, 64, 128, 255];
        let mut position = 0;
        for channel in 0..3 {
            for level in LEVELS {
                let color = match channel {
                    0 => RGB8::new(level, 0, 0),
                    1 => RGB8::new(0, level, 0),
                    _ => RGB8::new(0, 0, level),
                };
                self.set(position, color);
                position += 1;
            }
        }
    }
}

const fn in_bar(index: usize, len: usize, count: usize, from_bottom: bool) -> bool {
    if from_bottom {
        index < len
    } else {
        index >= count.saturating_sub(len)
    }
}
