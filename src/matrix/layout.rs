//! Compile-time wiring of a matrix: which LED of the strip sits at which `(x, y)`.
//!
//! See [`LedLayout`] for the constructors and transforms.

use super::MatrixGeometry;

/// Compile-time description of how the `N` LEDs of a strip are wired into a
/// `W`×`H` matrix.
///
/// Coordinates are screen-style: `(0, 0)` is the top-left corner, `x` grows to
/// the right and `y` grows downward.
///
/// A layout is either computed from a [`MatrixGeometry`] (the usual corner,
/// axis and zigzag flags of NeoPixel panels) or listed LED by LED with
/// [`LedLayout::new`]. Layouts can then be rotated, flipped and joined.
///
/// Every constructor checks, at compile time when used in a `const`, that all
/// coordinates are inside the matrix and that every cell is wired exactly once.
///
/// # Example
///
/// ```rust
/// use neo_patterns::matrix::MatrixGeometry;
/// use neo_patterns::matrix::layout::LedLayout;
///
/// // Pixel 0 at the bottom right, rows wired right to left.
/// const PANEL: LedLayout<6, 3, 2> = LedLayout::from_geometry(MatrixGeometry::BOTTOM_RIGHT_PROGRESSIVE);
/// const EXPECTED: LedLayout<6, 3, 2> =
///     LedLayout::new([(2, 1), (1, 1), (0, 1), (2, 0), (1, 0), (0, 0)]);
/// const _: () = assert!(PANEL.equals(&EXPECTED));
///
/// assert_eq!(PANEL.index_of(0, 0), 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedLayout<const N: usize, const W: usize, const H: usize> {
    map: [(u16, u16); N],
    xy_table: [u16; N],
}

impl<const N: usize, const W: usize, const H: usize> LedLayout<N, W, H> {
    /// Layout from the `(x, y)` of each LED in wiring order.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in a `const`) if `W * H != N`, a coordinate is
    /// outside the matrix or a cell is wired twice.
    #[must_use]
    pub const fn new(map: [(u16, u16); N]) -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");
        assert!(N <= u16::MAX as usize, "matrix must have at most 65535 LEDs");

        let mut seen = [false; N];
        let mut xy_table = [0u16; N];
        let mut led_index = 0;
        while led_index < N {
            let (x, y) = map[led_index];
            assert!((x as usize) < W, "column out of bounds");
            assert!((y as usize) < H, "row out of bounds");
            let cell = y as usize * W + x as usize;
            assert!(!seen[cell], "duplicate (col,row) in mapping");
            seen[cell] = true;
            xy_table[cell] = led_index as u16;
            led_index += 1;
        }
        // N cells, N distinct entries: the map is a permutation.
        Self { map, xy_table }
    }

    /// Layout of a panel wired as described by `geometry`.
    #[must_use]
    pub const fn from_geometry(geometry: MatrixGeometry) -> Self {
        assert!(W * H == N, "W*H must equal N");
        let mut map = [(0_u16, 0_u16); N];
        let mut y = 0;
        while y < H {
            let mut x = 0;
            while x < W {
                map[geometry.xy_to_index(x, y, W, H)] = (x as u16, y as u16);
                x += 1;
            }
            y += 1;
        }
        Self::new(map)
    }

    /// Each row wired left to right, top row first.
    #[must_use]
    pub const fn row_major() -> Self {
        Self::from_geometry(MatrixGeometry::TOP_LEFT_PROGRESSIVE)
    }

    /// Rows wired alternately left to right and right to left, top row first.
    #[must_use]
    pub const fn serpentine_row_major() -> Self {
        Self::from_geometry(MatrixGeometry {
            zigzag: true,
            ..MatrixGeometry::TOP_LEFT_PROGRESSIVE
        })
    }

    /// Columns wired alternately top to bottom and bottom to top, left column first.
    #[must_use]
    pub const fn serpentine_column_major() -> Self {
        Self::from_geometry(MatrixGeometry {
            columns_first: true,
            zigzag: true,
            ..MatrixGeometry::TOP_LEFT_PROGRESSIVE
        })
    }

    /// `(x, y)` of each LED in wiring order.
    #[must_use]
    pub const fn index_to_xy(&self) -> &[(u16, u16); N] {
        &self.map
    }

    /// Strip index of each cell, row by row from the top-left corner.
    #[must_use]
    pub const fn xy_table(&self) -> &[u16; N] {
        &self.xy_table
    }

    /// Strip index of the LED at `(x, y)`. Coordinates outside the matrix are
    /// clamped to its border.
    #[must_use]
    pub const fn index_of(&self, x: usize, y: usize) -> usize {
        let x = if x < W { x } else { W - 1 };
        let y = if y < H { y } else { H - 1 };
        self.xy_table[y * W + x] as usize
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

    /// Number of LEDs.
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Always `false`; a layout has at least one LED.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// `const` equality, for compile-time asserts.
    #[must_use]
    pub const fn equals(&self, other: &Self) -> bool {
        let mut i = 0;
        while i < N {
            if self.map[i].0 != other.map[i].0 || self.map[i].1 != other.map[i].1 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// The panel turned a quarter clockwise; width and height swap.
    #[must_use]
    pub const fn rotate_cw(self) -> LedLayout<N, H, W> {
        let mut out = [(0_u16, 0_u16); N];
        let mut i = 0;
        while i < N {
            let (x, y) = self.map[i];
            out[i] = ((H - 1 - y as usize) as u16, x);
            i += 1;
        }
        LedLayout::new(out)
    }

    /// The panel turned a quarter counterclockwise; width and height swap.
    #[must_use]
    pub const fn rotate_ccw(self) -> LedLayout<N, H, W> {
        let mut out = [(0_u16, 0_u16); N];
        let mut i = 0;
        while i < N {
            let (x, y) = self.map[i];
            out[i] = (y, (W - 1 - x as usize) as u16);
            i += 1;
        }
        LedLayout::new(out)
    }

    /// The panel turned upside down.
    #[must_use]
    pub const fn rotate_180(self) -> Self {
        self.flip_h().flip_v()
    }

    /// Mirror left and right.
    #[must_use]
    pub const fn flip_h(self) -> Self {
        let mut out = self.map;
        let mut i = 0;
        while i < N {
            out[i].0 = (W - 1 - out[i].0 as usize) as u16;
            i += 1;
        }
        Self::new(out)
    }

    /// Mirror top and bottom.
    #[must_use]
    pub const fn flip_v(self) -> Self {
        let mut out = self.map;
        let mut i = 0;
        while i < N {
            out[i].1 = (H - 1 - out[i].1 as usize) as u16;
            i += 1;
        }
        Self::new(out)
    }

    /// Chain `right` after this panel's last LED and place it to the right.
    #[must_use]
    pub const fn concat_h<const N2: usize, const OUT_N: usize, const W2: usize, const OUT_W: usize>(
        self,
        right: LedLayout<N2, W2, H>,
    ) -> LedLayout<OUT_N, OUT_W, H> {
        assert!(OUT_N == N + N2, "OUT_N must equal N + N2");
        assert!(OUT_W == W + W2, "OUT_W must equal W + W2");
        let mut out = [(0_u16, 0_u16); OUT_N];
        let mut i = 0;
        while i < OUT_N {
            out[i] = if i < N {
                self.map[i]
            } else {
                let (x, y) = right.map[i - N];
                ((x as usize + W) as u16, y)
            };
            i += 1;
        }
        LedLayout::new(out)
    }

    /// Chain `bottom` after this panel's last LED and place it below.
    #[must_use]
    pub const fn concat_v<const N2: usize, const OUT_N: usize, const H2: usize, const OUT_H: usize>(
        self,
        bottom: LedLayout<N2, W, H2>,
    ) -> LedLayout<OUT_N, W, OUT_H> {
        assert!(OUT_N == N + N2, "OUT_N must equal N + N2");
        assert!(OUT_H == H + H2, "OUT_H must equal H + H2");
        let mut out = [(0_u16, 0_u16); OUT_N];
        let mut i = 0;
        while i < OUT_N {
            out[i] = if i < N {
                self.map[i]
            } else {
                let (x, y) = bottom.map[i - N];
                (x, (y as usize + H) as u16)
            };
            i += 1;
        }
        LedLayout::new(out)
    }
}
