//! Patterns that need the two-dimensional layout of a matrix.
//!
//! [`MatrixNeoPatterns`] runs every strip [`Pattern`] (in wiring order) plus
//! the [`MatrixPattern`]s: a text ticker, moving and scrolling pictures, snow
//! and a convolution fire. It shares the update cycle of the strip engine, so
//! completion handlers written for strips also chain matrix patterns.
//!
//! # Example
//!
//! ```rust
//! use embassy_time::{Duration, Instant};
//! use neo_patterns::color::{BLACK, RGB8, colors};
//! use neo_patterns::matrix::{MatrixFont, MatrixGeometry};
//! use neo_patterns::matrix::layout::LedLayout;
//! use neo_patterns::matrix_patterns::{MatrixNeoPatterns, MatrixPattern};
//! use neo_patterns::patterns::{Direction, PatternEngine, Update};
//!
//! const LAYOUT: LedLayout<64, 8, 8> = LedLayout::from_geometry(MatrixGeometry::BOTTOM_RIGHT_PROGRESSIVE);
//!
//! let mut leds = [RGB8::default(); 64];
//! let mut matrix = MatrixNeoPatterns::new(LAYOUT);
//! matrix.start(MatrixPattern::Ticker {
//!     text: "Hi",
//!     foreground: colors::GREEN,
//!     background: BLACK,
//!     interval: Duration::from_millis(80),
//!     direction: Direction::Left,
//!     font: MatrixFont::Font5x8,
//! })?;
//! assert_eq!(matrix.update(&mut leds, Instant::from_millis(0), &mut ())?, Update::Drawn);
//! # Ok::<(), neo_patterns::Error>(())
//! ```

use core::mem;

use embassy_time::Duration;
use fastrand::Rng;
use heapless::Vec;
use itertools::iproduct;
use smart_leds::RGB8;

use crate::color::{BLACK, RED_HALF, WHITE_16TH, WHITE_64TH, WHITE_QUARTER, colors, heat_color, wheel};
use crate::matrix::layout::LedLayout;
use crate::matrix::{HEART_8X8, HEART_SIZE, MatrixFont, MatrixPixels};
use crate::patterns::{
    ColorProcess, Direction, NeoPatterns, OnPatternComplete, Pattern, PatternEngine, PatternKind,
    PatternState, Phase, Scheduler, StartPattern, Step,
};
use crate::{Error, Result};

/// Rows of fire that cool down by [`FIRE_COOLING_PER_8_ROWS`] in total.
const FIRE_COOLING_PER_8_ROWS: usize = 15;
/// Convolution weights ×256 of the row nearer to the heat source, the own row
/// and the row further away. The own weight cancels the own value, so heat
/// only spreads.
const FIRE_WEIGHTS: [[i32; 3]; 3] = [[12, 189, 12], [12, -256, 12], [5, 5, 5]];
/// Steps between two new random heat source lines.
const FIRE_SOURCE_STEPS: i32 = 4;

/// Steps between two dimmings of the snow on the ground.
const SNOW_MELT_STEPS: i32 = 20;
/// Faster flakes are brighter.
const FLAKE_COLORS: [RGB8; 4] = [colors::WHITE, WHITE_QUARTER, WHITE_16TH, WHITE_64TH];

/// A pattern for a matrix engine: any strip pattern or one of the matrix ones.
#[derive(Debug, Clone, Copy)]
pub enum MatrixPattern {
    /// A strip pattern, drawn in wiring order.
    Strip(Pattern),
    /// Text scrolling through the matrix.
    ///
    /// `Left` scrolls in from the right, `Up` from below. `None` shows the
    /// text centered (or from the left if too long) and never completes.
    /// `Right` and `Down` scroll like `Left`.
    Ticker {
        /// Text to show.
        text: &'static str,
        /// Color of the characters.
        foreground: RGB8,
        /// Color around the characters.
        background: RGB8,
        /// Time per pixel of movement.
        interval: Duration,
        /// Scroll direction.
        direction: Direction,
        /// Font of the characters.
        font: MatrixFont,
    },
    /// Shift the whole content one pixel per step, filling in `background`.
    Move {
        /// Direction of the content.
        direction: Direction,
        /// Number of shifts.
        steps: u16,
        /// Time per shift.
        interval: Duration,
        /// Color of the freed lines.
        background: RGB8,
    },
    /// A bitmap of up to 8×8 moving one pixel per step, e.g. to move it in.
    MovingPicture {
        /// One byte per row, see [`MatrixPixels::load_picture`].
        picture: &'static [u8],
        /// Color of set bits.
        foreground: RGB8,
        /// Color of clear bits and of the trail.
        background: RGB8,
        /// Start column of the left edge, `-8..=W`.
        x: i32,
        /// Start row of the bottom edge, `-1..=H+8`.
        y: i32,
        /// Frames to draw.
        steps: u16,
        /// Time per frame.
        interval: Duration,
        /// Direction of the movement; `None` keeps the picture in place.
        direction: Direction,
    },
    /// Falling snow that piles up and melts on the ground.
    Snow {
        /// Simulation steps.
        steps: u16,
        /// Time per step.
        interval: Duration,
    },
    /// Fire rising from the bottom row.
    Fire {
        /// Simulation steps.
        steps: u16,
        /// Time per step.
        interval: Duration,
    },
}

impl MatrixPattern {
    /// Snow with 500 steps of 20 ms.
    #[must_use]
    pub const fn snow() -> Self {
        Self::Snow {
            steps: 500,
            interval: Duration::from_millis(20),
        }
    }

    /// Fire with 200 steps of 30 ms.
    #[must_use]
    pub const fn fire() -> Self {
        Self::Fire {
            steps: 200,
            interval: Duration::from_millis(30),
        }
    }

    /// The kind of this pattern.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        match self {
            Self::Strip(pattern) => pattern.kind(),
            Self::Ticker { .. } => PatternKind::Ticker,
            Self::Move { .. } => PatternKind::Move,
            Self::MovingPicture { .. } => PatternKind::MovingPicture,
            Self::Snow { .. } => PatternKind::MatrixSnow,
            Self::Fire { .. } => PatternKind::MatrixFire,
        }
    }
}

impl From<Pattern> for MatrixPattern {
    fn from(pattern: Pattern) -> Self {
        Self::Strip(pattern)
    }
}

/// Engines that accept matrix patterns; the seam for [`MatrixDemo`].
pub trait StartMatrixPattern: StartPattern {
    /// Start `pattern`, replacing the running one.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters make no pattern. The running
    /// pattern is then left untouched.
    fn start_matrix(&mut self, pattern: MatrixPattern) -> Result<()>;

    /// Width and height of the matrix.
    fn matrix_size(&self) -> (usize, usize);

    /// The color last produced by [`Pattern::ProcessSelectiveColor`].
    fn processed_color(&self) -> RGB8;

    /// Switch all pixels of the matrix off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SegmentOutOfRange`] if `leds` is shorter than the matrix.
    fn clear_matrix(&self, leds: &mut [RGB8]) -> Result<()>;

    /// Clear the matrix and show `number`, see [`MatrixPixels::show_number`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SegmentOutOfRange`] if `leds` is shorter than the matrix.
    fn show_number(&self, leds: &mut [RGB8], number: u32, color: RGB8) -> Result<()>;

    /// Start a self-playing snake game if the engine has one. Returns `false`
    /// if it has not.
    ///
    /// # Errors
    ///
    /// Returns an error if the game does not fit the matrix.
    fn start_snake_autorun(&mut self, _interval: Duration, _color: RGB8, _repetitions: u16) -> Result<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy)]
struct Ticker {
    text: &'static str,
    foreground: RGB8,
    background: RGB8,
    direction: Direction,
    font: MatrixFont,
    /// Index of the first visible character.
    first: usize,
    /// Left column of the first visible character.
    x: i32,
    /// Bottom row of the first visible character.
    y: i32,
}

impl Ticker {
    fn new(
        text: &'static str,
        foreground: RGB8,
        background: RGB8,
        direction: Direction,
        font: MatrixFont,
        width: i32,
        height: i32,
    ) -> Self {
        let (font_width, font_height) = (font.width(), font.height());
        let centered_y = (height - 1) - (height - font_height) / 2;
        let (direction, x, y) = match direction {
            Direction::Up => (Direction::Up, (width - font_width) / 2, height + font_height),
            Direction::None => {
                let remaining = width - text.chars().count() as i32 * font_width;
                (Direction::None, (remaining / 2).max(0), centered_y)
            }
            _ => (Direction::Left, width, centered_y),
        };
        Self {
            text,
            foreground,
            background,
            direction,
            font,
            first: 0,
            x,
            y,
        }
    }

    fn first_is_out(&self) -> bool {
        match self.direction {
            Direction::Up => self.y < 0,
            Direction::None => false,
            _ => self.x == -self.font.width(),
        }
    }

    fn is_last(&self) -> bool {
        self.first + 1 >= self.text.chars().count()
    }

    /// `true` once the last character has left the matrix.
    fn is_finished(&self) -> bool {
        self.first_is_out() && self.is_last()
    }

    fn advance(&mut self) {
        if self.first_is_out() && !self.is_last() {
            self.first += 1;
            match self.direction {
                Direction::Up => self.y = self.font.height() - 1,
                _ => self.x = 0,
            }
        }
        match self.direction {
            Direction::Up => self.y -= 1,
            Direction::None => {}
            _ => self.x -= 1,
        }
    }

    fn draw<const W: usize, const H: usize>(&self, pixels: &mut MatrixPixels<'_, W, H>) {
        let (font_width, font_height) = (self.font.width(), self.font.height());
        let mut characters = self.text.chars().skip(self.first).peekable();
        let (mut x, mut y) = (self.x, self.y);
        while let Some(character) = characters.next() {
            let visible = match self.direction {
                Direction::Up => y < H as i32 + font_height - 1,
                _ => x < W as i32,
            };
            if !visible {
                break;
            }
            let last = characters.peek().is_none();
            let y_top = y - (font_height - 1);
            pixels.draw_glyph(character, self.font, x, y_top, self.foreground, self.background, last);
            match self.direction {
                Direction::Up => y += font_height,
                _ => x += font_width,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MovingPicture {
    picture: &'static [u8],
    foreground: RGB8,
    background: RGB8,
    x: i32,
    y: i32,
    direction: Direction,
}

impl MovingPicture {
    fn advance(&mut self) {
        match self.direction {
            Direction::Up => self.y -= 1,
            Direction::Down => self.y += 1,
            Direction::Left => self.x -= 1,
            Direction::Right => self.x += 1,
            Direction::None => {}
        }
    }

    fn draw<const W: usize, const H: usize>(&self, pixels: &mut MatrixPixels<'_, W, H>) {
        pixels.load_picture(
            self.picture,
            HEART_SIZE as u8,
            self.foreground,
            self.background,
            self.x,
            self.y,
            true,
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum MatrixRun {
    Ticker(Ticker),
    Move { direction: Direction, background: RGB8 },
    MovingPicture(MovingPicture),
    Snow,
    Fire,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flake {
    /// Steps per row, 8..16; faster flakes are brighter.
    period: u8,
    counter: u8,
    row: u16,
    column: u16,
}

impl Flake {
    fn random(rng: &mut Rng, width: usize, height: usize) -> Self {
        Self {
            period: rng.u8(..16) | 0x08,
            counter: rng.u8(..16),
            row: rng.u16(..height as u16),
            column: rng.u16(..width as u16),
        }
    }

    const fn color(self) -> RGB8 {
        FLAKE_COLORS[((self.period >> 1) & 0x03) as usize]
    }
}

#[derive(Debug, Clone)]
struct Snow<const N: usize> {
    flakes: Vec<Flake, N>,
}

impl<const N: usize> Snow<N> {
    const fn new() -> Self {
        Self { flakes: Vec::new() }
    }

    fn reset(&mut self, rng: &mut Rng, width: usize, height: usize) {
        self.flakes.clear();
        let count = (height * 2 / 5) * width;
        for _ in 0..count {
            if self.flakes.push(Flake::random(rng, width, height)).is_err() {
                break;
            }
        }
    }

    fn step<const W: usize, const H: usize>(&mut self, pixels: &mut MatrixPixels<'_, W, H>, rng: &mut Rng, index: &mut i32) {
        let ground = H as i32 - 1;
        for (y, x) in iproduct!(0..ground, 0..W as i32) {
            pixels.set_xy(x, y, BLACK);
        }
        *index += 1;
        if *index >= SNOW_MELT_STEPS {
            *index = 0;
            for x in 0..W as i32 {
                pixels.dim_xy(x, ground);
            }
        }

        for flake in &mut self.flakes {
            if flake.counter == 0 {
                flake.counter = flake.period;
                flake.row += 1;
            } else {
                flake.counter -= 1;
            }
            pixels.add_xy(i32::from(flake.column), i32::from(flake.row), flake.color());
        }

        for flake in &mut self.flakes {
            if i32::from(flake.row) < ground {
                continue;
            }
            *flake = Flake::random(rng, W, H);
            flake.row = 0;
            // Prefer a column with room for the new flake.
            for _ in 0..W {
                let column = i32::from(flake.column);
                if (0..3).all(|y| pixels.get_xy(column, y) == BLACK) {
                    break;
                }
                flake.column = (flake.column + 1) % W as u16;
            }
            pixels.add_xy(i32::from(flake.column), 0, flake.color());
        }
    }
}

/// Heat of a `W`×`H` fire. Row 0 is next to the invisible source line below
/// the bottom row of the matrix.
#[derive(Debug, Clone)]
struct Fire<const W: usize, const H: usize, const N: usize> {
    old: [u8; N],
    new: [u8; N],
    source: [u8; W],
    source_edges: [u8; 2],
    cooling: u8,
}

impl<const W: usize, const H: usize, const N: usize> Fire<W, H, N> {
    const fn new() -> Self {
        Self {
            old: [0; N],
            new: [0; N],
            source: [0; W],
            source_edges: [0; 2],
            cooling: (FIRE_COOLING_PER_8_ROWS * 8 / H) as u8,
        }
    }

    fn new_source(&mut self, rng: &mut Rng) {
        let mut random_heat = || ((u16::from(rng.u8(..)) * (255 - 40)) >> 8) as u8 + 40;
        self.source_edges[0] = random_heat();
        for heat in &mut self.source {
            *heat = random_heat();
        }
        self.source_edges[1] = random_heat();
    }

    fn heat_at(&self, x: i32, row: i32) -> i32 {
        let heat = if row < 0 {
            match x {
                -1 => self.source_edges[0],
                x if x == W as i32 => self.source_edges[1],
                x => self.source.get(x as usize).copied().unwrap_or(0),
            }
        } else if x < 0 || x >= W as i32 || row >= H as i32 {
            0
        } else {
            self.old.get(row as usize * W + x as usize).copied().unwrap_or(0)
        };
        i32::from(heat)
    }

    fn step(&mut self, pixels: &mut MatrixPixels<'_, W, H>, rng: &mut Rng, index: &mut i32) {
        *index += 1;
        if *index >= FIRE_SOURCE_STEPS {
            *index = 0;
            self.new_source(rng);
        }
        for (row, x) in iproduct!(0..H, 0..W) {
            let (xi, rowi) = (x as i32, row as i32);
            let mut sum = 0;
            for (dy, weights) in (-1..=1).zip(FIRE_WEIGHTS) {
                for (dx, weight) in (-1..=1).zip(weights) {
                    sum += weight * self.heat_at(xi + dx, rowi + dy);
                }
            }
            let heat = (self.heat_at(xi, rowi) + (sum + 128) / 256).clamp(0, 255) as u8;
            let heat = heat.saturating_sub(self.cooling);
            self.new[row * W + x] = heat;
            pixels.set_xy(xi, (H - 1 - row) as i32, heat_color(heat));
        }
        mem::swap(&mut self.old, &mut self.new);
    }

    fn draw(&self, pixels: &mut MatrixPixels<'_, W, H>) {
        for (row, x) in iproduct!(0..H, 0..W) {
            pixels.set_xy(x as i32, (H - 1 - row) as i32, heat_color(self.old[row * W + x]));
        }
    }
}

/// Pattern engine for a `W`×`H` matrix of `N` LEDs at the start of the strip
/// buffer.
pub struct MatrixNeoPatterns<const W: usize, const H: usize, const N: usize> {
    strip: NeoPatterns<N>,
    layout: LedLayout<N, W, H>,
    matrix: Option<MatrixRun>,
    snow: Snow<N>,
    fire: Fire<W, H, N>,
}

impl<const W: usize, const H: usize, const N: usize> MatrixNeoPatterns<W, H, N> {
    /// An idle engine for a matrix wired as `layout`.
    #[must_use]
    pub fn new(layout: LedLayout<N, W, H>) -> Self {
        Self::with_seed(layout, crate::patterns::DEFAULT_SEED)
    }

    /// Like [`new`](Self::new) with a chosen seed for the random patterns.
    #[must_use]
    pub fn with_seed(layout: LedLayout<N, W, H>, seed: u64) -> Self {
        Self {
            strip: NeoPatterns::with_seed(0, seed),
            layout,
            matrix: None,
            snow: Snow::new(),
            fire: Fire::new(),
        }
    }

    /// The wiring of the matrix.
    #[must_use]
    pub const fn layout(&self) -> &LedLayout<N, W, H> {
        &self.layout
    }

    /// The strip engine that runs the strip patterns.
    #[must_use]
    pub const fn strip(&self) -> &NeoPatterns<N> {
        &self.strip
    }

    /// Scale all colors drawn from now on, see [`NeoPatterns::set_brightness`].
    pub const fn set_brightness(&mut self, brightness: u8, keep_nonzero: bool) {
        self.strip.set_brightness(brightness, keep_nonzero);
    }

    /// Position of the running pattern, e.g. the step within a melt or source
    /// cycle for snow and fire.
    #[must_use]
    pub const fn index(&self) -> i32 {
        self.strip.index()
    }

    /// Steps left until the running pattern completes.
    #[must_use]
    pub const fn steps_left(&self) -> i32 {
        self.strip.steps_left()
    }

    /// Draw on the matrix part of `leds` directly, with the engine's brightness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SegmentOutOfRange`] if `leds` is shorter than the matrix.
    pub fn pixels<'a>(&'a self, leds: &'a mut [RGB8]) -> Result<MatrixPixels<'a, W, H>> {
        matrix_pixels(&self.layout, leds, self.strip.brightness(), self.strip.keep_nonzero())
    }

    /// Start `pattern`, replacing the running one. Pixels change at the next
    /// [`update`](PatternEngine::update).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroSteps`] or [`Error::ZeroLength`] for parameters
    /// that make no pattern, plus the errors of [`NeoPatterns::start`]. The
    /// engine is then unchanged.
    pub fn start(&mut self, pattern: impl Into<MatrixPattern>) -> Result<()> {
        let pattern = pattern.into();
        let kind = pattern.kind();
        let mut state = PatternState::default();
        let (run, interval) = match pattern {
            MatrixPattern::Strip(pattern) => {
                self.strip.start(pattern)?;
                self.matrix = None;
                return Ok(());
            }
            MatrixPattern::Ticker {
                text,
                foreground,
                background,
                interval,
                direction,
                font,
            } => {
                if text.is_empty() {
                    return Err(Error::ZeroLength(kind));
                }
                let ticker = Ticker::new(text, foreground, background, direction, font, W as i32, H as i32);
                state.direction = ticker.direction;
                (MatrixRun::Ticker(ticker), interval)
            }
            MatrixPattern::Move {
                direction,
                steps,
                interval,
                background,
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.direction = direction;
                state.total_steps = i32::from(steps) + 1;
                (MatrixRun::Move { direction, background }, interval)
            }
            MatrixPattern::MovingPicture {
                picture,
                foreground,
                background,
                x,
                y,
                steps,
                interval,
                direction,
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                if picture.is_empty() {
                    return Err(Error::ZeroLength(kind));
                }
                state.direction = direction;
                state.total_steps = i32::from(steps) + 1;
                let picture = MovingPicture {
                    picture,
                    foreground,
                    background,
                    x: x.clamp(-(HEART_SIZE as i32), W as i32),
                    y: y.clamp(-1, (H + HEART_SIZE) as i32),
                    direction,
                };
                (MatrixRun::MovingPicture(picture), interval)
            }
            MatrixPattern::Snow { steps, interval } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.total_steps = i32::from(steps) + 1;
                self.snow.reset(&mut self.strip.rng, W, H);
                (MatrixRun::Snow, interval)
            }
            MatrixPattern::Fire { steps, interval } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.direction = Direction::Up;
                state.total_steps = i32::from(steps) + 1;
                // The first step creates the heat source.
                state.index = FIRE_SOURCE_STEPS - 1;
                self.fire = Fire::new();
                (MatrixRun::Fire, interval)
            }
        };
        self.strip.state = state;
        self.strip.pattern = None;
        self.matrix = Some(run);
        self.strip.scheduler.activate(kind, interval);
        #[cfg(feature = "defmt")]
        defmt::info!("Start {} with {} steps", kind, state.total_steps);
        Ok(())
    }

    /// Clear the matrix part of `leds` and show `number` on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SegmentOutOfRange`] if `leds` is shorter than the matrix.
    pub fn show_number(&self, leds: &mut [RGB8], number: u32, color: RGB8) -> Result<()> {
        self.pixels(leds)?.show_number(number, color);
        Ok(())
    }
}

pub(crate) fn matrix_pixels<'a, const W: usize, const H: usize, const N: usize>(
    layout: &'a LedLayout<N, W, H>,
    leds: &'a mut [RGB8],
    brightness: u8,
    keep_nonzero: bool,
) -> Result<MatrixPixels<'a, W, H>> {
    let strip_len = leds.len();
    let leds = leds.get_mut(..N).ok_or(Error::SegmentOutOfRange {
        offset: 0,
        len: N,
        strip_len,
    })?;
    Ok(MatrixPixels::with_brightness(leds, layout, brightness, keep_nonzero))
}

impl<const W: usize, const H: usize, const N: usize> PatternEngine for MatrixNeoPatterns<W, H, N> {
    fn scheduler(&self) -> &Scheduler {
        &self.strip.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.strip.scheduler
    }

    fn step(&mut self, leds: &mut [RGB8], phase: Phase) -> Result<Step> {
        let Some(mut run) = self.matrix else {
            return self.strip.step(leds, phase);
        };
        let mut pixels = matrix_pixels(&self.layout, leds, self.strip.brightness(), self.strip.keep_nonzero())?;
        let state = &mut self.strip.state;
        let step = match &mut run {
            MatrixRun::Ticker(ticker) => {
                if phase == Phase::Advance {
                    ticker.advance();
                }
                ticker.draw(&mut pixels);
                if phase == Phase::Advance && ticker.is_finished() {
                    Step::Completed { drawn: true }
                } else {
                    Step::Drawn
                }
            }
            MatrixRun::Move { direction, background } => {
                if phase == Phase::Redraw {
                    return Ok(Step::Unchanged);
                }
                if let Some(end) = state.count_down() {
                    return Ok(end);
                }
                pixels.move_content(*direction, *background);
                Step::Drawn
            }
            MatrixRun::MovingPicture(picture) => {
                if phase != Phase::Redraw {
                    if let Some(end) = state.count_down() {
                        return Ok(end);
                    }
                }
                if phase == Phase::Advance {
                    picture.advance();
                }
                picture.draw(&mut pixels);
                Step::Drawn
            }
            MatrixRun::Snow => {
                if phase == Phase::Redraw {
                    return Ok(Step::Unchanged);
                }
                if let Some(end) = state.count_down() {
                    return Ok(end);
                }
                if phase == Phase::Start {
                    pixels.clear();
                }
                self.snow.step(&mut pixels, &mut self.strip.rng, &mut state.index);
                Step::Drawn
            }
            MatrixRun::Fire => {
                if phase == Phase::Redraw {
                    self.fire.draw(&mut pixels);
                    return Ok(Step::Drawn);
                }
                if let Some(end) = state.count_down() {
                    return Ok(end);
                }
                self.fire.step(&mut pixels, &mut self.strip.rng, &mut state.index);
                Step::Drawn
            }
        };
        self.matrix = Some(run);
        Ok(step)
    }
}

impl<const W: usize, const H: usize, const N: usize> StartPattern for MatrixNeoPatterns<W, H, N> {
    fn start(&mut self, pattern: Pattern) -> Result<()> {
        Self::start(self, pattern)
    }

    fn led_count(&self) -> usize {
        N
    }

    fn rng(&mut self) -> &mut Rng {
        &mut self.strip.rng
    }
}

impl<const W: usize, const H: usize, const N: usize> StartMatrixPattern for MatrixNeoPatterns<W, H, N> {
    fn start_matrix(&mut self, pattern: MatrixPattern) -> Result<()> {
        Self::start(self, pattern)
    }

    fn matrix_size(&self) -> (usize, usize) {
        (W, H)
    }

    fn processed_color(&self) -> RGB8 {
        self.strip.processed_color()
    }

    fn clear_matrix(&self, leds: &mut [RGB8]) -> Result<()> {
        self.pixels(leds)?.clear();
        Ok(())
    }

    fn show_number(&self, leds: &mut [RGB8], number: u32, color: RGB8) -> Result<()> {
        Self::show_number(self, leds, number, color)
    }
}

const DEMO_TEXTS: [&str; 4] = ["I love Neopixel", "I love Neopatterns", "Matrix Demo", "Welcome"];

/// Completion handler that runs the matrix show: a ticker, a heart that moves
/// in, beats twice and moves out, then snake, fire or snow in turn.
///
/// Patterns are separated by 100 ms pauses and the show starts over after the
/// last one.
#[derive(Debug, Clone, Copy)]
pub struct MatrixDemo {
    state: u8,
    heart_direction: Direction,
    ticker_direction: Direction,
    finale: u8,
}

impl Default for MatrixDemo {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixDemo {
    /// A show that starts with a ticker scrolling left.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: 0,
            heart_direction: Direction::Down,
            ticker_direction: Direction::Left,
            finale: 0,
        }
    }

    /// Start the next pattern of the show.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not fit the matrix.
    pub fn start_next<P: StartMatrixPattern + ?Sized>(&mut self, patterns: &mut P, leds: &mut [RGB8]) -> Result<()> {
        if self.state & 1 == 1 {
            self.state += 1;
            return patterns.start(Pattern::Delay {
                duration: Duration::from_millis(100),
            });
        }
        let (width, height) = patterns.matrix_size();
        let (width, height) = (width as i32, height as i32);
        let heart = HEART_SIZE as i32;
        match self.state / 2 {
            0 => {
                let text = DEMO_TEXTS[patterns.rng().usize(..DEMO_TEXTS.len())];
                patterns.start_matrix(MatrixPattern::Ticker {
                    text,
                    foreground: wheel(0),
                    background: BLACK,
                    interval: Duration::from_millis(80),
                    direction: self.ticker_direction,
                    font: MatrixFont::default(),
                })?;
                self.ticker_direction = if self.ticker_direction == Direction::Left {
                    Direction::Up
                } else {
                    Direction::Left
                };
            }
            1 => {
                let y = if self.heart_direction == Direction::Up {
                    height + heart - 1
                } else {
                    -1
                };
                patterns.start_matrix(MatrixPattern::MovingPicture {
                    picture: &HEART_8X8,
                    foreground: RED_HALF,
                    background: BLACK,
                    x: (width - heart) / 2,
                    y,
                    steps: (heart + 1 + ((height - heart) / 2).max(0)) as u16,
                    interval: Duration::from_millis(100),
                    direction: self.heart_direction,
                })?;
            }
            beat @ 2..=5 => {
                let selected = if beat == 2 { RED_HALF } else { patterns.processed_color() };
                let process = if beat % 2 == 0 {
                    ColorProcess::Dim
                } else {
                    ColorProcess::Brighten
                };
                patterns.start(Pattern::ProcessSelectiveColor {
                    selected,
                    process,
                    steps: 6,
                    interval: Duration::from_millis(40),
                })?;
            }
            6 => {
                patterns.start_matrix(MatrixPattern::Move {
                    direction: self.heart_direction,
                    steps: height as u16,
                    interval: Duration::from_millis(100),
                    background: BLACK,
                })?;
                self.heart_direction = self.heart_direction.opposite();
            }
            7 => patterns.start(Pattern::Delay {
                duration: Duration::from_millis(1500),
            })?,
            8 => {
                let finale = self.finale % 3;
                self.finale = self.finale.wrapping_add(1);
                match finale {
                    0 if patterns.start_snake_autorun(Duration::from_millis(200), colors::BLUE, 1)? => {}
                    0 | 1 => patterns.start_matrix(MatrixPattern::fire())?,
                    _ => patterns.start_matrix(MatrixPattern::snow())?,
                }
            }
            _ => {
                patterns.clear_matrix(leds)?;
                self.state = 0;
                return patterns.start(Pattern::Delay {
                    duration: Duration::from_millis(2000),
                });
            }
        }
        self.state += 1;
        Ok(())
    }
}

impl<P: StartMatrixPattern + ?Sized> OnPatternComplete<P> for MatrixDemo {
    fn on_pattern_complete(&mut self, patterns: &mut P, leds: &mut [RGB8], _finished: PatternKind) -> Result<()> {
        self.start_next(patterns, leds)
    }
}
