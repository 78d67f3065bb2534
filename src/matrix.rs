//! Two-dimensional drawing on LED matrices.
//!
//! A matrix is a strip whose LEDs are wired into rows or columns. The wiring is
//! described once by a [`LedLayout`] (usually built from a [`MatrixGeometry`]);
//! [`MatrixPixels`] then draws in `(x, y)` coordinates with `(0, 0)` at the
//! top-left corner and `y` growing downward.
//!
//! [`MatrixPixels`] is an [`embedded_graphics`] draw target, so text and
//! primitives from that crate render straight into the LED buffer.
//! [`Frame2d`] is an offline frame in the same coordinates, e.g. for PNG
//! previews.
//!
//! # Example
//!
//! ```rust
//! use neo_patterns::color::{BLACK, RED_HALF, RGB8};
//! use neo_patterns::matrix::{HEART_8X8, MatrixGeometry, MatrixPixels};
//! use neo_patterns::matrix::layout::LedLayout;
//!
//! const LAYOUT: LedLayout<64, 8, 8> = LedLayout::from_geometry(MatrixGeometry::BOTTOM_RIGHT_PROGRESSIVE);
//!
//! let mut leds = [RGB8::default(); 64];
//! let mut matrix = MatrixPixels::new(&mut leds, &LAYOUT);
//! matrix.load_picture(&HEART_8X8, 8, RED_HALF, BLACK, 0, 7, false);
//! assert_eq!(matrix.get_xy(1, 0), RED_HALF);
//! assert_eq!(matrix.get_xy(0, 0), BLACK);
//! // Pixel 0 is wired at the bottom-right corner.
//! assert_eq!(leds[LAYOUT.index_of(3, 6)], RED_HALF);
//! ```

pub mod layout;

use core::convert::Infallible;
use core::ops::{Deref, DerefMut, Index, IndexMut};

use embedded_graphics::{
    Drawable,
    draw_target::DrawTarget,
    mono_font::{
        DecorationDimensions, MonoFont, MonoTextStyleBuilder,
        ascii::{FONT_4X6, FONT_5X7, FONT_5X8, FONT_6X9, FONT_6X10},
        mapping::StrGlyphMapping,
    },
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use itertools::iproduct;
use smart_leds::RGB8;

use self::layout::LedLayout;
use crate::color::{BLACK, ToRgb8, ToRgb888, gamma_32};
use crate::patterns::Direction;
use crate::pixels::{MAX_BRIGHTNESS, Pixels};

/// An 8×8 heart, one byte per row, top row first, leftmost pixel in the high bit.
pub const HEART_8X8: [u8; 8] = [0x66, 0xFF, 0xFF, 0xFF, 0x7E, 0x3C, 0x18, 0x00];

/// Width and height of [`HEART_8X8`].
pub const HEART_SIZE: usize = 8;

/// Wiring of a NeoPixel matrix: where pixel 0 sits and how the strip runs.
///
/// The default is pixel 0 at the bottom-right corner with rows that all run
/// right to left, the wiring of the common 8×8 and 10×10 panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixGeometry {
    /// Pixel 0 is in the bottom row instead of the top row.
    pub origin_bottom: bool,
    /// Pixel 0 is in the rightmost column instead of the leftmost one.
    pub origin_right: bool,
    /// The strip runs along columns instead of rows.
    pub columns_first: bool,
    /// Every other line runs backward.
    pub zigzag: bool,
}

impl Default for MatrixGeometry {
    fn default() -> Self {
        Self::BOTTOM_RIGHT_PROGRESSIVE
    }
}

impl MatrixGeometry {
    /// Pixel 0 at the top left, rows left to right.
    pub const TOP_LEFT_PROGRESSIVE: Self = Self {
        origin_bottom: false,
        origin_right: false,
        columns_first: false,
        zigzag: false,
    };

    /// Pixel 0 at the bottom right, rows right to left.
    pub const BOTTOM_RIGHT_PROGRESSIVE: Self = Self {
        origin_bottom: true,
        origin_right: true,
        columns_first: false,
        zigzag: false,
    };

    /// Pixel 0 at the bottom right, rows alternating direction.
    pub const BOTTOM_RIGHT_ZIGZAG: Self = Self {
        zigzag: true,
        ..Self::BOTTOM_RIGHT_PROGRESSIVE
    };

    /// Strip index of `(x, y)` on a `width`×`height` matrix wired this way.
    /// Coordinates outside the matrix are clamped to its border.
    #[must_use]
    pub const fn xy_to_index(self, x: usize, y: usize, width: usize, height: usize) -> usize {
        let x = if x < width { x } else { width - 1 };
        let y = if y < height { y } else { height - 1 };
        if self.columns_first {
            let line = if self.origin_right { width - x } else { x + 1 };
            wire(line, y, height, self.origin_bottom, self.zigzag)
        } else {
            let line = if self.origin_bottom { height - y } else { y + 1 };
            wire(line, x, width, self.origin_right, self.zigzag)
        }
    }
}

/// Index of `position` on the 1-based `line` of `line_len` pixels.
const fn wire(line: usize, position: usize, line_len: usize, reversed: bool, zigzag: bool) -> usize {
    let backward = if zigzag {
        (line % 2 == 0) != reversed
    } else {
        reversed
    };
    if backward {
        line_len * line - position - 1
    } else {
        line_len * (line - 1) + position
    }
}

/// Fonts for text on small matrices.
///
/// Variants with a `Trim` suffix advance by one column less than the font's
/// cell, packing text tighter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixFont {
    Font3x4Trim,
    Font4x6,
    Font3x5Trim,
    Font5x7,
    Font4x6Trim,
    #[default]
    Font5x8,
    Font4x7Trim,
    Font6x9,
    Font5x8Trim,
    Font6x10,
}

impl MatrixFont {
    /// The `embedded-graphics` font behind this variant.
    #[must_use]
    pub fn to_font(self) -> MonoFont<'static> {
        match self {
            Self::Font3x4Trim => bit_matrix3x4_font(),
            Self::Font4x6 | Self::Font3x5Trim => FONT_4X6,
            Self::Font5x7 | Self::Font4x6Trim => FONT_5X7,
            Self::Font5x8 | Self::Font4x7Trim => FONT_5X8,
            Self::Font6x9 | Self::Font5x8Trim => FONT_6X9,
            Self::Font6x10 => FONT_6X10,
        }
    }

    const fn trim(self) -> i32 {
        match self {
            Self::Font3x5Trim | Self::Font4x6Trim | Self::Font4x7Trim | Self::Font5x8Trim => 1,
            _ => 0,
        }
    }

    /// Columns from one character to the next.
    #[must_use]
    pub fn width(self) -> i32 {
        let font = self.to_font();
        (font.character_size.width + font.character_spacing) as i32 - self.trim()
    }

    /// Rows of one character.
    #[must_use]
    pub fn height(self) -> i32 {
        self.to_font().character_size.height as i32
    }
}

// Packed bitmap for the 3x4 font (ASCII 0x20-0x7E).
const BIT_MATRIX3X4_FONT_DATA: [u8; 144] = [
    0x0a, 0xd5, 0x10, 0x4a, 0xa0, 0x01, 0x0a, 0xfe, 0x68, 0x85, 0x70, 0x02, 0x08, 0x74, 0x90, 0x86,
    0xa5, 0xc4, 0x08, 0x5e, 0x68, 0x48, 0x08, 0x10, 0xeb, 0x7b, 0xe7, 0xfd, 0x22, 0x27, 0xb8, 0x9b,
    0x39, 0xb4, 0x05, 0xd1, 0xa9, 0x3e, 0xea, 0x5d, 0x28, 0x0a, 0xff, 0xf3, 0xfc, 0xe4, 0x45, 0xd2,
    0xff, 0x7d, 0xff, 0xbc, 0xd9, 0xff, 0xb7, 0xcb, 0xb4, 0xe8, 0xe9, 0xfd, 0xfe, 0xcb, 0x25, 0xaa,
    0xd9, 0x7d, 0x97, 0x7d, 0xe7, 0xbf, 0xdf, 0x6f, 0xdf, 0x7f, 0x6d, 0xb7, 0xe0, 0xd0, 0xf7, 0xe5,
    0x6d, 0x48, 0xc0, 0x68, 0xdf, 0x35, 0x6f, 0x49, 0x40, 0x40, 0x86, 0xf5, 0xd7, 0xab, 0xe0, 0xc7,
    0x5f, 0x7d, 0xff, 0xbc, 0xd9, 0xff, 0x37, 0xcb, 0xb4, 0xe8, 0xe9, 0xfd, 0x1e, 0xcb, 0x25, 0xaa,
    0xd9, 0x7d, 0x17, 0x7d, 0xe7, 0xbf, 0xdf, 0x6f, 0xdf, 0x7f, 0x6d, 0xb7, 0xb1, 0x80, 0xf7, 0xe5,
    0x6d, 0x48, 0xa0, 0xa8, 0xdf, 0x35, 0x6f, 0x49, 0x20, 0x90, 0x86, 0xf5, 0xd7, 0xab, 0xb1, 0x80,
];
const BIT_MATRIX3X4_GLYPH_MAPPING: StrGlyphMapping<'static> = StrGlyphMapping::new("\0 \u{7e}", 0);

/// Monospace 3×4 font for the tiniest matrices.
#[must_use]
pub fn bit_matrix3x4_font() -> MonoFont<'static> {
    MonoFont {
        image: embedded_graphics::image::ImageRaw::new(&BIT_MATRIX3X4_FONT_DATA, 48),
        glyph_mapping: &BIT_MATRIX3X4_GLYPH_MAPPING,
        character_size: Size::new(3, 4),
        character_spacing: 0,
        baseline: 3,
        underline: DecorationDimensions::new(3, 1),
        strikethrough: DecorationDimensions::new(2, 1),
    }
}

/// A `W`×`H` frame in matrix coordinates, `frame[y][x]`.
///
/// Frames are independent of any wiring; use [`Frame2d::from_leds`] to read
/// one back from an LED buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame2d<const W: usize, const H: usize>(pub [[RGB8; W]; H]);

impl<const W: usize, const H: usize> Frame2d<W, H> {
    /// Number of columns.
    pub const WIDTH: usize = W;
    /// Number of rows.
    pub const HEIGHT: usize = H;

    /// A black frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([[BLACK; W]; H])
    }

    /// A frame of one color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([[color; W]; H])
    }

    /// Read the matrix stored in `leds` as wired by `layout`.
    #[must_use]
    pub fn from_leds<const N: usize>(layout: &LedLayout<N, W, H>, leds: &[RGB8]) -> Self {
        let mut frame = Self::new();
        for (y, x) in iproduct!(0..H, 0..W) {
            frame.0[y][x] = leds.get(layout.index_of(x, y)).copied().unwrap_or(BLACK);
        }
        frame
    }

    /// The color at `(x, y)`, `None` outside the frame.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<RGB8> {
        self.0.get(y).and_then(|row| row.get(x)).copied()
    }
}

impl<const W: usize, const H: usize> Deref for Frame2d<W, H> {
    type Target = [[RGB8; W]; H];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const W: usize, const H: usize> DerefMut for Frame2d<W, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const W: usize, const H: usize> Index<(usize, usize)> for Frame2d<W, H> {
    type Output = RGB8;

    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.0[y][x]
    }
}

impl<const W: usize, const H: usize> IndexMut<(usize, usize)> for Frame2d<W, H> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.0[y][x]
    }
}

impl<const W: usize, const H: usize> From<[[RGB8; W]; H]> for Frame2d<W, H> {
    fn from(array: [[RGB8; W]; H]) -> Self {
        Self(array)
    }
}

impl<const W: usize, const H: usize> From<Frame2d<W, H>> for [[RGB8; W]; H] {
    fn from(frame: Frame2d<W, H>) -> Self {
        frame.0
    }
}

impl<const W: usize, const H: usize> Default for Frame2d<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for Frame2d<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for Frame2d<W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if let Some(pixel) = self.0.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *pixel = color.to_rgb8();
                }
            }
        }
        Ok(())
    }
}

/// Drawing surface for a `W`×`H` matrix stored in a strip buffer.
///
/// Writes outside the matrix are ignored and reads outside it return black.
pub struct MatrixPixels<'a, const W: usize, const H: usize> {
    pixels: Pixels<'a>,
    xy_table: &'a [u16],
}

impl<'a, const W: usize, const H: usize> MatrixPixels<'a, W, H> {
    /// View `leds` as the matrix wired by `layout`.
    #[must_use]
    pub fn new<const N: usize>(leds: &'a mut [RGB8], layout: &'a LedLayout<N, W, H>) -> Self {
        Self::with_brightness(leds, layout, MAX_BRIGHTNESS, false)
    }

    /// Like [`new`](Self::new), with colors scaled by `brightness` on every
    /// write (see [`Pixels::with_brightness`]).
    #[must_use]
    pub fn with_brightness<const N: usize>(
        leds: &'a mut [RGB8],
        layout: &'a LedLayout<N, W, H>,
        brightness: u8,
        keep_nonzero: bool,
    ) -> Self {
        Self {
            pixels: Pixels::with_brightness(leds, brightness, keep_nonzero),
            xy_table: layout.xy_table(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        W
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        H
    }

    /// The underlying strip, in wiring order.
    pub const fn strip(&mut self) -> &mut Pixels<'a> {
        &mut self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < W)?;
        let y = usize::try_from(y).ok().filter(|&y| y < H)?;
        self.xy_table.get(y * W + x).map(|&index| usize::from(index))
    }

    /// Set the pixel at `(x, y)`.
    pub fn set_xy(&mut self, x: i32, y: i32, color: RGB8) {
        if let Some(index) = self.index(x, y) {
            self.pixels.set(index, color);
        }
    }

    /// The stored color at `(x, y)`.
    #[must_use]
    pub fn get_xy(&self, x: i32, y: i32) -> RGB8 {
        self.index(x, y).map_or(BLACK, |index| self.pixels.get(index))
    }

    /// Add `color` to the pixel at `(x, y)`, saturating each channel.
    pub fn add_xy(&mut self, x: i32, y: i32, color: RGB8) {
        if let Some(index) = self.index(x, y) {
            self.pixels.add(index, color);
        }
    }

    /// Halve the pixel at `(x, y)`.
    pub fn dim_xy(&mut self, x: i32, y: i32) {
        if let Some(index) = self.index(x, y) {
            self.pixels.dim_at(index);
        }
    }

    fn copy_xy(&mut self, from: (i32, i32), to: (i32, i32)) {
        let color = self.get_xy(from.0, from.1);
        if let Some(index) = self.index(to.0, to.1) {
            self.pixels.set_unscaled(index, color);
        }
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: RGB8) {
        self.pixels.fill(color);
    }

    /// Switch every pixel off.
    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    /// Copy the matrix into a [`Frame2d`].
    #[must_use]
    pub fn to_frame(&self) -> Frame2d<W, H> {
        let mut frame = Frame2d::new();
        for (y, x) in iproduct!(0..H, 0..W) {
            frame.0[y][x] = self.get_xy(x as i32, y as i32);
        }
        frame
    }

    /// Light `len` pixels of column `x` and switch the rest of it off.
    ///
    /// `from_bottom` grows the bar up from the bottom row, otherwise down from
    /// the top row.
    pub fn draw_bar(&mut self, x: i32, len: usize, color: RGB8, from_bottom: bool) {
        for y in 0..H {
            let lit = if from_bottom { y >= H.saturating_sub(len) } else { y < len };
            self.set_xy(x, y as i32, if lit { color } else { BLACK });
        }
    }

    /// Like [`draw_bar`](Self::draw_bar), but each lit pixel takes its color
    /// from `colors`, which holds one entry per row from the bar's base outward.
    pub fn draw_bar_from_colors(&mut self, x: i32, len: usize, colors: &[RGB8], from_bottom: bool) {
        for y in 0..H {
            let (lit, color_index) = if from_bottom {
                (y >= H.saturating_sub(len), H - 1 - y)
            } else {
                (y < len, y)
            };
            let color = if lit {
                colors.get(color_index).copied().unwrap_or(BLACK)
            } else {
                BLACK
            };
            self.set_xy(x, y as i32, color);
        }
    }

    /// Draw a one-color bitmap of up to 8 columns.
    ///
    /// `bitmap` has one byte per row, top row first; the lowest `width` bits
    /// hold the row with the leftmost pixel in the highest of them. `x` is the
    /// left column and `y_bottom` the row of the bitmap's last line. With
    /// `padding`, a frame of `background` is drawn above, below and to the
    /// right, which erases the trail of a moving bitmap.
    #[expect(clippy::too_many_arguments, reason = "mirrors the bitmap parameters")]
    pub fn load_picture(
        &mut self,
        bitmap: &[u8],
        width: u8,
        foreground: RGB8,
        background: RGB8,
        x: i32,
        y_bottom: i32,
        padding: bool,
    ) {
        let width = width.min(8);
        if width == 0 {
            return;
        }
        let height = bitmap.len() as i32;
        let top = y_bottom - (height - 1);
        let first_bit = 0x80_u8 >> (8 - width);
        for y in (top - 1)..=(top + height) {
            let line = match usize::try_from(y - top).ok().and_then(|row| bitmap.get(row)) {
                Some(&line) => line,
                None if padding => 0,
                None => continue,
            };
            let mut mask = first_bit;
            for column in x..x + i32::from(width) {
                self.set_xy(column, y, if line & mask == 0 { background } else { foreground });
                mask >>= 1;
            }
            if padding {
                self.set_xy(x + i32::from(width), y, background);
            }
        }
    }

    /// Draw a 7×7 pattern that is symmetric around its center pixel on an
    /// 8×8 area; the last row and column are set to `background`.
    ///
    /// The upper-left 4×4 quarter comes from `pattern`, four bits per row,
    /// bit 0 at the top-left corner and bit 15 at the center.
    pub fn draw_quarter_pattern_odd(&mut self, pattern: u16, foreground: RGB8, background: RGB8) {
        for (y, x) in iproduct!(0..8, 0..8) {
            let color = if x == 7 || y == 7 {
                background
            } else {
                quarter_color(pattern, x.min(6 - x), y.min(6 - y), foreground, background)
            };
            self.set_xy(x, y, color);
        }
    }

    /// Draw an 8×8 pattern mirrored in both axes; the upper-left 4×4 quarter
    /// comes from `pattern` as for
    /// [`draw_quarter_pattern_odd`](Self::draw_quarter_pattern_odd).
    pub fn draw_quarter_pattern_even(&mut self, pattern: u16, foreground: RGB8, background: RGB8) {
        for (y, x) in iproduct!(0..8, 0..8) {
            let color = quarter_color(pattern, x.min(7 - x), y.min(7 - y), foreground, background);
            self.set_xy(x, y, color);
        }
    }

    /// Color test: red grows downward, blue to the right and green shrinks
    /// along the diagonal in the upper-left triangle. The lower-right corner
    /// shows it rotated by half a turn with gamma corrected values, as far as
    /// that leaves the triangle intact.
    pub fn draw_all_colors(&mut self) {
        let (width, height) = (W as u32, H as u32);
        let x_span = width.saturating_sub(1).max(1);
        let y_span = height.saturating_sub(1).max(1);
        for (y, x) in iproduct!(0..height, 0..width) {
            if x + y >= width {
                continue;
            }
            let blue = (255 * x / x_span) as u8;
            let red = (255 * y / y_span).min(255) as u8;
            let green = 255 - (255 * (x + y) / x_span).min(255) as u8;
            self.set_xy(x as i32, y as i32, RGB8::new(red, green, blue));
            let (mirror_x, mirror_y) = (width - 1 - x, height - 1 - y);
            if mirror_x + mirror_y >= width {
                let corrected = RGB8::new(gamma_32(red), gamma_32(green), gamma_32(blue));
                self.set_xy(mirror_x as i32, mirror_y as i32, corrected);
            }
        }
    }

    /// Color test with more red tones: red grows downward and the rest is
    /// split between green (left) and blue (right).
    pub fn draw_all_colors2(&mut self) {
        let x_span = (W as u32).saturating_sub(1).max(1);
        let y_span = (H as u32).saturating_sub(1).max(1);
        for (y, x) in iproduct!(0..H as u32, 0..W as u32) {
            let red = (255 * y / y_span).min(255);
            let rest = 255 - red;
            let blue = rest * x / x_span;
            let color = RGB8::new(red as u8, (rest - blue) as u8, blue as u8);
            self.set_xy(x as i32, y as i32, color);
        }
    }

    /// The pixels [`test_mapping`](Self::test_mapping) lights, in order: the top
    /// row left to right, the diagonal down to the bottom-left and the left
    /// column back up.
    pub fn test_mapping_path() -> impl Iterator<Item = (i32, i32)> {
        let (width, height) = (W as i32, H as i32);
        let top_row = (0..width).map(|x| (x, 0));
        let diagonal = (1..height).map(move |y| (width - 1 - y, y));
        let left_column = (1..height - 1).rev().map(move |y| (width - height, y));
        top_row.chain(diagonal).chain(left_column)
    }

    /// Draw the mapping test triangle in `color`. A wrong layout shows up as a
    /// broken or misplaced triangle.
    pub fn test_mapping(&mut self, color: RGB8) {
        for (x, y) in Self::test_mapping_path() {
            self.set_xy(x, y, color);
        }
    }

    /// Shift the whole content one pixel in `direction`; the freed line is
    /// set to `background`.
    pub fn move_content(&mut self, direction: Direction, background: RGB8) {
        let (width, height) = (W as i32, H as i32);
        match direction {
            Direction::Up => {
                for (y, x) in iproduct!(0..height, 0..width) {
                    if y + 1 < height {
                        self.copy_xy((x, y + 1), (x, y));
                    } else {
                        self.set_xy(x, y, background);
                    }
                }
            }
            Direction::Down => {
                for (y, x) in iproduct!((0..height).rev(), 0..width) {
                    if y > 0 {
                        self.copy_xy((x, y - 1), (x, y));
                    } else {
                        self.set_xy(x, y, background);
                    }
                }
            }
            Direction::Left => {
                for (x, y) in iproduct!(0..width, 0..height) {
                    if x + 1 < width {
                        self.copy_xy((x + 1, y), (x, y));
                    } else {
                        self.set_xy(x, y, background);
                    }
                }
            }
            Direction::Right => {
                for (x, y) in iproduct!((0..width).rev(), 0..height) {
                    if x > 0 {
                        self.copy_xy((x - 1, y), (x, y));
                    } else {
                        self.set_xy(x, y, background);
                    }
                }
            }
            Direction::None => {}
        }
    }

    /// Draw `character` with its cell's top-left corner at `(x, y_top)`.
    ///
    /// The whole cell is painted, glyph pixels in `foreground` and the rest in
    /// `background`. With `padding`, a `background` frame is added above,
    /// below and to the right of the cell.
    #[expect(clippy::too_many_arguments, reason = "mirrors the glyph parameters")]
    pub fn draw_glyph(
        &mut self,
        character: char,
        font: MatrixFont,
        x: i32,
        y_top: i32,
        foreground: RGB8,
        background: RGB8,
        padding: bool,
    ) {
        let mono_font = font.to_font();
        let style = MonoTextStyleBuilder::new()
            .font(&mono_font)
            .text_color(foreground.to_rgb888())
            .background_color(background.to_rgb888())
            .build();
        let mut buffer = [0u8; 4];
        let text = character.encode_utf8(&mut buffer);
        let Ok(_) = Text::with_baseline(text, Point::new(x, y_top), style, Baseline::Top).draw(self);

        if padding {
            let (width, height) = (font.width(), font.height());
            for column in x..=x + width {
                self.set_xy(column, y_top - 1, background);
                self.set_xy(column, y_top + height, background);
            }
            for y in y_top..y_top + height {
                self.set_xy(x + width, y, background);
            }
        }
    }

    /// Clear the matrix and show `number` right aligned in the 4×6 font.
    /// Digits that do not fit are cut off at the left.
    pub fn show_number(&mut self, number: u32, color: RGB8) {
        let font = MatrixFont::Font4x6;
        let width = font.width();
        let y_top = (H as i32 - font.height()) / 2;
        self.clear();
        let mut x = W as i32 - width;
        let mut rest = number;
        loop {
            let digit = char::from(b'0' + (rest % 10) as u8);
            self.draw_glyph(digit, font, x, y_top, color, BLACK, false);
            rest /= 10;
            x -= width;
            if rest == 0 || x <= -width {
                break;
            }
        }
    }
}

fn quarter_color(pattern: u16, x: i32, y: i32, foreground: RGB8, background: RGB8) -> RGB8 {
    if pattern & (1 << (y * 4 + x)) == 0 {
        background
    } else {
        foreground
    }
}

impl<const W: usize, const H: usize> OriginDimensions for MatrixPixels<'_, W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for MatrixPixels<'_, W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_xy(point.x, point.y, color.to_rgb8());
        }
        Ok(())
    }
}
