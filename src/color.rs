//! Color helpers shared by all patterns: the color wheel, the coarse 32-step
//! gamma table used for dimming, and the fire heat palette.
//!
//! Pixel colors are [`RGB8`] from `smart_leds`. Matrix drawing goes through
//! `embedded-graphics`, whose color type is [`Rgb888`]; [`ToRgb8`] and
//! [`ToRgb888`] convert between the two.

use embedded_graphics::prelude::RgbColor;

#[doc(inline)]
pub use embedded_graphics::pixelcolor::Rgb888;
/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;
/// RGB color type used by all pixel buffers.
pub use smart_leds::RGB8;

use crate::led_strip::GAMMA_2_2_TABLE;

/// All channels off.
pub const BLACK: RGB8 = RGB8::new(0, 0, 0);
/// Half brightness white, to reduce power consumption.
pub const WHITE_HALF: RGB8 = RGB8::new(128, 128, 128);
/// Quarter brightness white.
pub const WHITE_QUARTER: RGB8 = RGB8::new(64, 64, 64);
/// 1/16 brightness white.
pub const WHITE_16TH: RGB8 = RGB8::new(16, 16, 16);
/// 1/64 brightness white.
pub const WHITE_64TH: RGB8 = RGB8::new(4, 4, 4);
/// Half brightness red.
pub const RED_HALF: RGB8 = RGB8::new(128, 0, 0);
/// Half brightness green.
pub const GREEN_HALF: RGB8 = RGB8::new(0, 128, 0);
/// Half brightness blue.
pub const BLUE_HALF: RGB8 = RGB8::new(0, 0, 128);
/// Dark blue as used by the matrix mapping test.
pub const DARK_BLUE: RGB8 = RGB8::new(0, 0, 160);

/// Convert colors to [`RGB8`] for pixel buffers.
///
/// # Example
///
/// ```rust
/// use neo_patterns::color::{Rgb888, ToRgb8, RGB8};
///
/// let converted = Rgb888::new(16, 32, 48).to_rgb8();
/// assert_eq!(converted, RGB8::new(16, 32, 48));
/// ```
pub trait ToRgb8 {
    /// Convert this color to [`RGB8`].
    #[must_use]
    fn to_rgb8(self) -> RGB8;
}

impl ToRgb8 for RGB8 {
    #[inline(always)]
    fn to_rgb8(self) -> RGB8 {
        self
    }
}

impl ToRgb8 for Rgb888 {
    #[inline(always)]
    fn to_rgb8(self) -> RGB8 {
        RGB8::new(self.r(), self.g(), self.b())
    }
}

/// Convert colors to [`Rgb888`] for embedded-graphics rendering.
pub trait ToRgb888 {
    /// Convert this color to [`Rgb888`].
    #[must_use]
    fn to_rgb888(self) -> Rgb888;
}

impl ToRgb888 for RGB8 {
    #[inline(always)]
    fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

impl ToRgb888 for Rgb888 {
    #[inline(always)]
    fn to_rgb888(self) -> Rgb888 {
        self
    }
}

/// Returns `true` if all channels are zero.
#[must_use]
pub const fn is_black(color: RGB8) -> bool {
    color.r == 0 && color.g == 0 && color.b == 0
}

/// Map a position 0..=255 to a color on the red, green, blue color wheel.
///
/// 0 is red, 85 is green, 170 is blue, and the wheel wraps back to red.
#[must_use]
pub const fn wheel(position: u8) -> RGB8 {
    let position = 255 - position;
    if position < 85 {
        RGB8::new(255 - position * 3, 0, position * 3)
    } else if position < 170 {
        let position = position - 85;
        RGB8::new(0, position * 3, 255 - position * 3)
    } else {
        let position = position - 170;
        RGB8::new(position * 3, 255 - position * 3, 0)
    }
}

/// Coarse gamma table with 32 steps, indexed by `value / 8`.
pub const GAMMA_32: [u8; 32] = [
    0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 4, 5, 6, 7, 9, 11, 13, 16, 20, 24, 29, 36, 43, 55, 64, 78, 95,
    116, 141, 172, 209, 255,
];

/// Gamma corrected brightness with 32 steps.
#[must_use]
pub const fn gamma_32(value: u8) -> u8 {
    GAMMA_32[(value / 8) as usize]
}

/// Like [`gamma_32`], but values 1..=7 map to 1 instead of 0, so a dim
/// non-zero input never switches the LED off.
#[must_use]
pub const fn gamma_32_special_zero(value: u8) -> u8 {
    if value > 0 && value < 8 {
        1
    } else {
        gamma_32(value)
    }
}

/// Dim `color` by a gamma corrected `brightness`.
///
/// Each channel becomes `((channel + 1) * gamma(brightness)) >> 8`, so full
/// brightness returns the color unchanged.
#[must_use]
pub const fn dim_color_with_gamma_32(color: RGB8, brightness: u8, special_zero: bool) -> RGB8 {
    let gamma = (if special_zero {
        gamma_32_special_zero(brightness)
    } else {
        gamma_32(brightness)
    }) as u16;
    RGB8::new(
        (((color.r as u16 + 1) * gamma) >> 8) as u8,
        (((color.g as u16 + 1) * gamma) >> 8) as u8,
        (((color.b as u16 + 1) * gamma) >> 8) as u8,
    )
}

/// Half of each channel.
#[must_use]
pub const fn dim(color: RGB8) -> RGB8 {
    RGB8::new(color.r >> 1, color.g >> 1, color.b >> 1)
}

/// Twice each channel, saturating at 255.
#[must_use]
pub const fn brighten(color: RGB8) -> RGB8 {
    RGB8::new(
        color.r.saturating_mul(2),
        color.g.saturating_mul(2),
        color.b.saturating_mul(2),
    )
}

/// Map a heat value to black, red, orange, yellow and white. The ramp within
/// each third is corrected with the same gamma 2.2 table as
/// [`Gamma::Gamma2_2`](crate::led_strip::Gamma::Gamma2_2).
#[must_use]
pub const fn heat_color(temperature: u8) -> RGB8 {
    heat_color_with(temperature, false)
}

/// Heat color whose ramp uses the 32 step gamma table instead of gamma 2.2.
#[must_use]
pub const fn heat_color_gamma_32(temperature: u8) -> RGB8 {
    heat_color_with(temperature, true)
}

const fn heat_color_with(temperature: u8, coarse_gamma: bool) -> RGB8 {
    // Scale to 0..=191 so the three thirds are easy to tell apart.
    let t192 = if temperature == 0 {
        0
    } else {
        ((temperature as u16 * 192) >> 8) as u8
    };
    let ramp = (t192 & 0x3F) << 2;
    let ramp = if coarse_gamma {
        gamma_32(ramp)
    } else {
        GAMMA_2_2_TABLE[ramp as usize]
    };
    if t192 & 0x80 != 0 {
        RGB8::new(255, 255, ramp)
    } else if t192 & 0x40 != 0 {
        RGB8::new(255, ramp, 0)
    } else {
        RGB8::new(ramp, 0, 0)
    }
}

/// Weighted mix of two colors: `(from * (total - step) + to * step) / total`.
///
/// `step` outside `0..=total` is clamped.
#[must_use]
pub fn blend(from: RGB8, to: RGB8, step: i32, total: i32) -> RGB8 {
    if total <= 0 {
        return to;
    }
    let step = step.clamp(0, total);
    let mix = |from: u8, to: u8| -> u8 {
        let value = (i32::from(from) * (total - step) + i32::from(to) * step) / total;
        value.clamp(0, 255) as u8
    };
    RGB8::new(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b))
}
