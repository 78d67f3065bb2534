//! Non-blocking animated patterns for one segment of an LED strip.
//!
//! A [`NeoPatterns`] engine runs one [`Pattern`] at a time on `N` LEDs
//! starting at an offset into a caller-owned buffer. Starting a pattern only
//! records its parameters; every call of
//! [`update`](PatternEngine::update) checks the clock, advances the pattern one
//! step when its interval has passed and draws the result.
//!
//! # Example
//!
//! ```rust
//! use embassy_time::{Duration, Instant};
//! use neo_patterns::color::{RGB8, colors};
//! use neo_patterns::patterns::{Direction, NeoPatterns, Pattern, PatternEngine, Timing, Update};
//!
//! let mut leds = [RGB8::default(); 8];
//! let mut wipe = NeoPatterns::<8>::new(0);
//! wipe.start(Pattern::ColorWipe {
//!     color: colors::RED,
//!     timing: Timing::Interval(Duration::from_millis(50)),
//!     direction: Direction::Up,
//!     clear: true,
//! })?;
//!
//! let start = Instant::from_millis(0);
//! assert_eq!(wipe.update(&mut leds, start, &mut ())?, Update::Drawn);
//! assert_eq!(leds[0], colors::RED);
//! assert_eq!(leds[1], RGB8::default());
//! # Ok::<(), neo_patterns::Error>(())
//! ```

mod engine;
mod steps;

use core::ops::BitOr;

use derive_more::derive::Display;
use embassy_time::Duration;
use fastrand::Rng;
use smart_leds::RGB8;

pub use self::engine::{
    OnPatternComplete, PatternEngine, Phase, Scheduler, Segment, Step, Update,
};
use crate::pixels::MAX_BRIGHTNESS;
use crate::{Error, Result};

/// Seed of engines created with [`NeoPatterns::new`].
pub const DEFAULT_SEED: u64 = 0x4E45_4F50;

/// Direction of a pattern. Strip patterns use `Up` (towards higher indexes)
/// and `Down`; matrix patterns use all four.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    /// Towards higher indexes, or towards the top row.
    Up,
    /// Towards column 0.
    Left,
    /// Towards index 0, or towards the bottom row.
    Down,
    /// Towards the last column.
    Right,
    /// No movement.
    None,
}

impl Direction {
    /// The reverse direction; `None` stays `None`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    /// A quarter turn counterclockwise; `None` turns into `Left`.
    #[must_use]
    pub const fn turn_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
            Self::None => Self::Left,
        }
    }

    /// A quarter turn clockwise; `None` turns into `Right`.
    #[must_use]
    pub const fn turn_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            Self::None => Self::Right,
        }
    }

    /// Strip patterns know only two directions: everything but `Up` runs down.
    #[must_use]
    pub const fn along_strip(self) -> Self {
        match self {
            Self::Up => Self::Up,
            _ => Self::Down,
        }
    }
}

/// How long a pattern takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timing {
    /// Time between two steps.
    Interval(Duration),
    /// Time for the whole pattern, divided evenly over its steps.
    Total(Duration),
}

impl Timing {
    /// The step interval for a pattern of `steps` steps.
    #[must_use]
    pub fn per_step(self, steps: u32) -> Duration {
        match self {
            Self::Interval(interval) => interval,
            Self::Total(total) => total / steps.max(1),
        }
    }
}

impl From<Duration> for Timing {
    fn from(interval: Duration) -> Self {
        Self::Interval(interval)
    }
}

/// Which pattern an engine runs.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[expect(missing_docs, reason = "The display names describe the variants.")]
pub enum PatternKind {
    #[display("Rainbow cycle")]
    RainbowCycle,
    #[display("Color wipe")]
    ColorWipe,
    #[display("Fade")]
    Fade,
    #[display("Delay")]
    Delay,
    #[display("Scanner extended")]
    Scanner,
    #[display("Stripes")]
    Stripes,
    #[display("Flash")]
    Flash,
    #[display("Process selective color")]
    ProcessSelectiveColor,
    #[display("Heartbeat")]
    Heartbeat,
    #[display("Fire")]
    Fire,
    #[display("Bouncing ball")]
    BouncingBall,
    #[display("User pattern 1")]
    MovingPixel,
    #[display("User pattern 2")]
    BouncingPixel,
    #[display("Ticker")]
    Ticker,
    #[display("Move")]
    Move,
    #[display("Moving picture")]
    MovingPicture,
    #[display("Snow")]
    MatrixSnow,
    #[display("Matrix fire")]
    MatrixFire,
    #[display("Snake")]
    Snake,
}

/// Behavior flags of [`Pattern::Scanner`], combined with `|`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScannerMode(u8);

impl ScannerMode {
    /// A single dimming tail behind the brightest pixel.
    pub const ROCKET: Self = Self(0);
    /// Dimming tails on both sides of the brightest pixel.
    pub const CYLON: Self = Self(0x01);
    /// Start and end with the scanner completely outside the strip.
    pub const VANISH_COMPLETE: Self = Self(0x02);
    /// A mirrored second scanner starts at the other end.
    pub const START_AT_BOTH_ENDS: Self = Self(0x04);
    /// Draw over the current content instead of clearing it first.
    pub const KEEP_BACKGROUND: Self = Self(0x08);

    /// `true` if all flags of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Both sets of flags.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for ScannerMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// What [`Pattern::ProcessSelectiveColor`] does to the selected color on every step.
#[derive(Debug, Clone, Copy)]
pub enum ColorProcess {
    /// Halve each channel.
    Dim,
    /// Double each channel, saturating.
    Brighten,
    /// Blend linearly from the selected color to this one, reaching it
    /// with the last step.
    FadeTo(RGB8),
    /// Any function of the current color.
    Custom(fn(RGB8) -> RGB8),
}

/// A strip pattern with its parameters.
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// Cycle all pixels through the color wheel.
    RainbowCycle {
        /// Time per wheel turn.
        timing: Timing,
        /// Direction the colors move.
        direction: Direction,
        /// Wheel turns.
        repetitions: u16,
    },
    /// Light one pixel after another.
    ColorWipe {
        /// Wipe color.
        color: RGB8,
        /// Time per pixel.
        timing: Timing,
        /// `Up` starts at index 0.
        direction: Direction,
        /// Switch not yet reached pixels off.
        clear: bool,
    },
    /// Fill with a color moving from `from` to `to` in `steps` steps.
    Fade {
        /// First color.
        from: RGB8,
        /// Last color.
        to: RGB8,
        /// Steps between the colors.
        steps: u16,
        /// Time per step.
        interval: Duration,
    },
    /// Do nothing for a while, e.g. between two patterns of a sequence.
    Delay {
        /// Time until the completion handler runs.
        duration: Duration,
    },
    /// A bright pixel with a dimming tail running along the strip.
    Scanner {
        /// Color of the brightest pixel.
        color: RGB8,
        /// Pixels from the brightest to the darkest.
        length: u8,
        /// Time per step.
        timing: Timing,
        /// How often the scanner turns at the strip ends.
        bounces: u16,
        /// Shape and start behavior.
        mode: ScannerMode,
        /// `Up` starts at index 0.
        direction: Direction,
    },
    /// Moving stripes of two colors.
    Stripes {
        /// First color.
        color1: RGB8,
        /// Pixels of the first color.
        length1: u8,
        /// Second color.
        color2: RGB8,
        /// Pixels of the second color.
        length2: u8,
        /// Shifts by one pixel.
        steps: u16,
        /// Time per shift.
        timing: Timing,
        /// Direction the stripes move.
        direction: Direction,
    },
    /// Alternate between two colors.
    Flash {
        /// First color.
        color1: RGB8,
        /// How long the first color shows.
        interval1: Duration,
        /// Second color.
        color2: RGB8,
        /// How long the second color shows.
        interval2: Duration,
        /// Pairs of flashes.
        steps: u16,
        /// Show black instead of the last second color.
        end_with_black: bool,
    },
    /// Change every pixel of the selected color, once at start and once per step.
    ProcessSelectiveColor {
        /// Color of the pixels to change.
        selected: RGB8,
        /// How the color changes.
        process: ColorProcess,
        /// Changes, the first one included.
        steps: u16,
        /// Time per change.
        interval: Duration,
    },
    /// Brighten and dim the whole strip like a beating heart.
    Heartbeat {
        /// Color at full brightness.
        color: RGB8,
        /// Time per brightness step.
        interval: Duration,
        /// Beats after the first one.
        repetitions: u16,
        /// Switch off after the last beat.
        clear_at_end: bool,
    },
    /// A flickering fire rising along the strip.
    Fire {
        /// Simulation steps.
        steps: u16,
        /// Time per step.
        interval: Duration,
        /// `Up` has its base at index 0.
        direction: Direction,
    },
    /// A ball falling and bouncing with lower height after each bounce.
    BouncingBall {
        /// Ball color.
        color: RGB8,
        /// Index of the highest point.
        top_index: u16,
        /// Time the ball needs for the first pixel from the top.
        interval: Duration,
        /// Height lost on each bounce, in percent.
        loss_percent: u8,
        /// `Up` starts on the ground, `Down` at the top.
        direction: Direction,
    },
    /// One pixel moving over a background.
    MovingPixel {
        /// Pixel color.
        color: RGB8,
        /// Color of all other pixels.
        background: RGB8,
        /// Time per pixel.
        interval: Duration,
        /// `Up` starts at index 0.
        direction: Direction,
    },
    /// One pixel running to the end of the strip and back.
    BouncingPixel {
        /// Pixel color.
        color: RGB8,
        /// Time per pixel.
        interval: Duration,
        /// Runs after the first one.
        repetitions: u16,
        /// `Up` starts at index 0.
        direction: Direction,
    },
}

impl Pattern {
    /// The kind of this pattern.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        match self {
            Self::RainbowCycle { .. } => PatternKind::RainbowCycle,
            Self::ColorWipe { .. } => PatternKind::ColorWipe,
            Self::Fade { .. } => PatternKind::Fade,
            Self::Delay { .. } => PatternKind::Delay,
            Self::Scanner { .. } => PatternKind::Scanner,
            Self::Stripes { .. } => PatternKind::Stripes,
            Self::Flash { .. } => PatternKind::Flash,
            Self::ProcessSelectiveColor { .. } => PatternKind::ProcessSelectiveColor,
            Self::Heartbeat { .. } => PatternKind::Heartbeat,
            Self::Fire { .. } => PatternKind::Fire,
            Self::BouncingBall { .. } => PatternKind::BouncingBall,
            Self::MovingPixel { .. } => PatternKind::MovingPixel,
            Self::BouncingPixel { .. } => PatternKind::BouncingPixel,
        }
    }

    /// The vanishing single pass scanner used for falling stars.
    #[must_use]
    pub const fn falling_star(color: RGB8, length: u8, interval: Duration, direction: Direction) -> Self {
        Self::Scanner {
            color,
            length,
            timing: Timing::Interval(interval),
            bounces: 0,
            mode: ScannerMode::VANISH_COMPLETE,
            direction,
        }
    }
}

/// Engines that accept strip patterns; the seam for handlers that work on
/// strips and matrices alike.
pub trait StartPattern: PatternEngine {
    /// Start `pattern`, replacing the running one.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not fit the engine's LEDs. The
    /// running pattern is then left untouched.
    fn start(&mut self, pattern: Pattern) -> Result<()>;

    /// Number of LEDs the engine draws on.
    fn led_count(&self) -> usize;

    /// The engine's random number generator.
    fn rng(&mut self) -> &mut Rng;
}

/// Per-pattern working state. Every start replaces all of it.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PatternState {
    /// Steps left until completion.
    pub(crate) total_steps: i32,
    pub(crate) index: i32,
    pub(crate) direction: Direction,
    /// Tracked color of the selective color process.
    pub(crate) color_tmp: RGB8,
    /// Configured changes of the selective color process.
    pub(crate) fade_steps: i32,
    /// Bounces left for the scanner.
    pub(crate) repetitions: u16,
    /// Exact height of the bouncing ball.
    pub(crate) top: f32,
    pub(crate) top_index: i32,
    pub(crate) base_interval: Duration,
    pub(crate) clear_on_start: bool,
    pub(crate) brightness_delta: u32,
}

impl PatternState {
    /// Count one step down; `Some` when the pattern is over.
    pub(crate) const fn count_down(&mut self) -> Option<Step> {
        self.total_steps -= 1;
        if self.total_steps < 0 {
            Some(Step::Ended)
        } else if self.total_steps == 0 {
            Some(Step::Completed { drawn: false })
        } else {
            None
        }
    }

    pub(crate) const fn next_index(&mut self) {
        if matches!(self.direction, Direction::Up) {
            self.index += 1;
        } else {
            self.index -= 1;
        }
    }

    /// [`count_down`](Self::count_down), then move the index on.
    pub(crate) const fn count_down_and_move(&mut self) -> Option<Step> {
        if let Some(step) = self.count_down() {
            return Some(step);
        }
        self.next_index();
        None
    }
}

/// Pattern engine for `N` LEDs of a strip.
pub struct NeoPatterns<const N: usize> {
    pub(crate) scheduler: Scheduler,
    offset: usize,
    brightness: u8,
    keep_nonzero: bool,
    pub(crate) rng: Rng,
    pub(crate) pattern: Option<Pattern>,
    pub(crate) state: PatternState,
    heat: [u8; N],
}

impl<const N: usize> NeoPatterns<N> {
    /// Number of LEDs of this segment.
    pub const LEN: usize = N;

    /// An idle engine for the `N` LEDs starting at `offset`.
    #[must_use]
    pub fn new(offset: usize) -> Self {
        Self::with_seed(offset, DEFAULT_SEED)
    }

    /// Like [`new`](Self::new) with a chosen seed for the random patterns.
    #[must_use]
    pub fn with_seed(offset: usize, seed: u64) -> Self {
        Self {
            scheduler: Scheduler::new(),
            offset,
            brightness: MAX_BRIGHTNESS,
            keep_nonzero: false,
            rng: Rng::with_seed(seed),
            pattern: None,
            state: PatternState::default(),
            heat: [0; N],
        }
    }

    /// Index of the first LED in the strip buffer.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Scale all colors drawn from now on.
    ///
    /// With `keep_nonzero`, dim colors keep at least one channel at 1 instead
    /// of switching off.
    pub const fn set_brightness(&mut self, brightness: u8, keep_nonzero: bool) {
        self.brightness = brightness;
        self.keep_nonzero = keep_nonzero;
    }

    /// Current brightness.
    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    pub(crate) const fn keep_nonzero(&self) -> bool {
        self.keep_nonzero
    }

    /// The running pattern with its parameters.
    #[must_use]
    pub const fn pattern(&self) -> Option<&Pattern> {
        match self.scheduler.active() {
            Some(_) => self.pattern.as_ref(),
            None => None,
        }
    }

    /// Position of the running pattern.
    #[must_use]
    pub const fn index(&self) -> i32 {
        self.state.index
    }

    /// Current moving direction of the running pattern.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.state.direction
    }

    /// Steps left until the running pattern completes.
    #[must_use]
    pub const fn steps_left(&self) -> i32 {
        self.state.total_steps
    }

    /// The color last produced by [`Pattern::ProcessSelectiveColor`].
    #[must_use]
    pub const fn processed_color(&self) -> RGB8 {
        self.state.color_tmp
    }

    /// Heat values of the fire simulation.
    #[must_use]
    pub const fn heat(&self) -> &[u8; N] {
        &self.heat
    }

    /// Start `pattern`, replacing the running one. Pixels change at the next
    /// [`update`](PatternEngine::update).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroSteps`], [`Error::ZeroLength`] or
    /// [`Error::LengthTooLarge`] for parameters that make no pattern. The
    /// engine is then unchanged.
    pub fn start(&mut self, pattern: Pattern) -> Result<()> {
        let (state, interval) = Self::prepare(&pattern)?;
        self.state = state;
        self.pattern = Some(pattern);
        if matches!(pattern, Pattern::Fire { .. }) {
            self.heat = [0; N];
        }
        let kind = pattern.kind();
        self.scheduler.activate(kind, interval);
        #[cfg(feature = "defmt")]
        defmt::info!("Start {} with {} steps", kind, state.total_steps);
        Ok(())
    }

    /// Initial state and step interval of `pattern` on `N` LEDs.
    pub(crate) fn prepare(pattern: &Pattern) -> Result<(PatternState, Duration)> {
        let kind = pattern.kind();
        if N == 0 && kind != PatternKind::Delay {
            return Err(Error::ZeroLength(kind));
        }
        let n = N as i32;
        let mut state = PatternState {
            direction: Direction::Up,
            ..PatternState::default()
        };
        let interval = match *pattern {
            Pattern::RainbowCycle {
                timing,
                direction,
                repetitions,
            } => {
                if repetitions == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.direction = direction.along_strip().opposite();
                state.total_steps = 256 * i32::from(repetitions);
                state.index = if state.direction == Direction::Up { 0 } else { 255 };
                timing.per_step(256)
            }
            Pattern::ColorWipe {
                timing, direction, ..
            } => {
                state.direction = direction.along_strip();
                state.total_steps = n;
                state.index = if state.direction == Direction::Up { 0 } else { n - 1 };
                timing.per_step(N as u32)
            }
            Pattern::Fade {
                steps, interval, ..
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.total_steps = i32::from(steps) + 1;
                interval
            }
            Pattern::Delay { duration } => {
                state.total_steps = 1;
                duration
            }
            Pattern::Scanner {
                length,
                timing,
                bounces,
                mode,
                direction,
                ..
            } => return Self::prepare_scanner(length, timing, bounces, mode, direction),
            Pattern::Stripes {
                length1,
                length2,
                steps,
                timing,
                direction,
                ..
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                let period = i32::from(length1) + i32::from(length2);
                if period == 0 {
                    return Err(Error::ZeroLength(kind));
                }
                let length1 = i32::from(length1);
                state.direction = direction.along_strip().opposite();
                state.total_steps = i32::from(steps) + 1;
                state.index = if direction.along_strip() == Direction::Up {
                    0
                } else {
                    let rest = n % period;
                    if length1 >= rest {
                        length1 - rest
                    } else {
                        length1 + period - rest
                    }
                };
                timing.per_step(u32::from(steps))
            }
            Pattern::Flash {
                interval1, steps, ..
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.total_steps = i32::from(steps) * 2;
                state.index = state.total_steps;
                interval1
            }
            Pattern::ProcessSelectiveColor {
                selected,
                steps,
                interval,
                ..
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.total_steps = i32::from(steps);
                state.fade_steps = i32::from(steps);
                state.color_tmp = selected;
                interval
            }
            Pattern::Heartbeat {
                interval,
                repetitions,
                clear_at_end,
                ..
            } => {
                state.total_steps = 2 * 16 * (i32::from(repetitions) + 1) + 1;
                if !clear_at_end {
                    state.total_steps -= 1;
                }
                state.index = 8;
                interval
            }
            Pattern::Fire {
                steps,
                interval,
                direction,
            } => {
                if steps == 0 {
                    return Err(Error::ZeroSteps(kind));
                }
                state.direction = direction.along_strip();
                state.total_steps = i32::from(steps) + 1;
                interval
            }
            Pattern::BouncingBall {
                top_index,
                interval,
                direction,
                ..
            } => {
                let top_index = usize::from(top_index);
                if top_index >= N {
                    return Err(Error::LengthTooLarge {
                        kind,
                        length: top_index,
                        leds: N,
                    });
                }
                if top_index < 1 {
                    return Err(Error::ZeroLength(kind));
                }
                state.direction = direction.along_strip();
                state.total_steps = 2;
                state.top = top_index as f32;
                state.top_index = top_index as i32;
                state.base_interval = interval;
                if state.direction == Direction::Up {
                    state.index = 0;
                    steps::ball_interval(steps::sqrt(state.top) - steps::sqrt(state.top - 1.0), interval)
                } else {
                    state.index = state.top_index;
                    interval
                }
            }
            Pattern::MovingPixel {
                interval, direction, ..
            } => {
                state.direction = direction.along_strip();
                state.total_steps = n + 1;
                state.index = if state.direction == Direction::Up { 0 } else { n - 1 };
                interval
            }
            Pattern::BouncingPixel {
                interval,
                repetitions,
                direction,
                ..
            } => {
                state.direction = direction.along_strip();
                state.total_steps = (i32::from(repetitions) + 1) * 2 * (n - 1) + 1 + 2;
                state.index = if state.direction == Direction::Up { 0 } else { n - 1 };
                interval
            }
        };
        Ok((state, interval))
    }

    fn prepare_scanner(
        length: u8,
        timing: Timing,
        bounces: u16,
        mode: ScannerMode,
        direction: Direction,
    ) -> Result<(PatternState, Duration)> {
        let kind = PatternKind::Scanner;
        if length == 0 {
            return Err(Error::ZeroLength(kind));
        }
        if usize::from(length) > N {
            return Err(Error::LengthTooLarge {
                kind,
                length: usize::from(length),
                leds: N,
            });
        }
        let n = N as i32;
        let length = i32::from(length);
        let cylon = mode.contains(ScannerMode::CYLON);
        let mut state = PatternState {
            direction: direction.along_strip(),
            total_steps: n - length,
            index: length - 1,
            repetitions: bounces,
            clear_on_start: !mode.contains(ScannerMode::KEEP_BACKGROUND),
            brightness_delta: 0x10000 / length as u32,
            ..PatternState::default()
        };
        let mut bounce_steps = n - 1;

        // Start and end outside the strip.
        if mode.contains(ScannerMode::VANISH_COMPLETE) {
            state.index -= length;
            state.total_steps += 2 * length;
            if cylon {
                state.total_steps += 2 * (length - 1);
                state.index -= length - 1;
            }
        }
        if cylon {
            state.total_steps -= length - 1;
            bounce_steps = n - (2 * length - 1);
        }
        state.total_steps += bounce_steps * i32::from(bounces);
        if state.direction == Direction::Down {
            state.index = (n - 1) - state.index;
        }
        let interval = timing.per_step(state.total_steps.max(1) as u32);
        state.total_steps += 1;
        Ok((state, interval))
    }
}

impl<const N: usize> PatternEngine for NeoPatterns<N> {
    fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    fn step(&mut self, leds: &mut [RGB8], phase: Phase) -> Result<Step> {
        let strip_len = leds.len();
        let segment = self
            .offset
            .checked_add(N)
            .and_then(|end| leds.get_mut(self.offset..end))
            .ok_or(Error::SegmentOutOfRange {
                offset: self.offset,
                len: N,
                strip_len,
            })?;
        Ok(self.step_segment(segment, phase))
    }
}

impl<const N: usize> StartPattern for NeoPatterns<N> {
    fn start(&mut self, pattern: Pattern) -> Result<()> {
        Self::start(self, pattern)
    }

    fn led_count(&self) -> usize {
        N
    }

    fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }
}
