//! Output stage for NeoPixel-style (WS2812) LED strips and matrices.
//!
//! [`LedStrip`] owns a [`smart_leds::SmartLedsWrite`] driver and a
//! [`Frame1d`] that pattern engines draw into. On [`show`](LedStrip::show)
//! the frame passes through gamma correction and current limiting before it
//! reaches the driver; the engines themselves always work with uncorrected
//! colors.
//!
//! # Example
//!
//! ```rust
//! use core::convert::Infallible;
//! use embassy_time::{Duration, Instant};
//! use neo_patterns::led_strip::{Current, Gamma, LedStrip};
//! use neo_patterns::patterns::{NeoPatterns, Pattern};
//! use smart_leds::{RGB8, SmartLedsWrite};
//!
//! struct Recorder(Vec<RGB8>);
//!
//! impl SmartLedsWrite for Recorder {
//!     type Error = Infallible;
//!     type Color = RGB8;
//!     fn write<T, I>(&mut self, iterator: T) -> Result<(), Infallible>
//!     where
//!         T: IntoIterator<Item = I>,
//!         I: Into<RGB8>,
//!     {
//!         self.0 = iterator.into_iter().map(Into::into).collect();
//!         Ok(())
//!     }
//! }
//!
//! let mut strip = LedStrip::<_, 16>::new(Recorder(Vec::new()), Gamma::Linear, Current::Unlimited);
//! let mut heartbeat = NeoPatterns::<16>::new(0);
//! heartbeat.start(Pattern::Heartbeat {
//!     color: RGB8::new(255, 0, 0),
//!     interval: Duration::from_millis(20),
//!     repetitions: 2,
//!     clear_at_end: true,
//! })?;
//! strip.update(&mut heartbeat, &mut (), Instant::from_millis(0))?;
//! # Ok::<(), neo_patterns::Error>(())
//! ```

use core::convert::Infallible;
use core::ops::{Deref, DerefMut};

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use smart_leds::{RGB8, SmartLedsWrite};

use crate::patterns::{OnPatternComplete, Pattern, PatternEngine, Segment, StartPattern, Update};
use crate::{Error, Result};

/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;

/// Worst-case current of one LED with all channels at full brightness.
pub const MILLIAMPS_PER_LED: u32 = 60;

// ============================================================================
// Gamma Correction
// ============================================================================

/// Gamma correction applied on [`LedStrip::show`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gamma {
    /// No correction.
    Linear,
    /// Gamma 2.2, close to the perceived brightness of the eye.
    #[default]
    Gamma2_2,
}

/// Gamma 2.2 lookup table: `corrected = (value / 255)^2.2 * 255`.
pub(crate) const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

/// Combine gamma correction and brightness scaling into one lookup table:
/// `table[value]` is the corrected and scaled output for `value`.
#[must_use]
pub const fn generate_combo_table(gamma: Gamma, max_brightness: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut value = 0;
    while value < 256 {
        let corrected = match gamma {
            Gamma::Linear => value as u8,
            Gamma::Gamma2_2 => GAMMA_2_2_TABLE[value],
        };
        table[value] = ((corrected as u16 * max_brightness as u16) / 255) as u8;
        value += 1;
    }
    table
}

// ============================================================================
// Current Limiting
// ============================================================================

/// Power budget of a strip.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Current {
    /// Scale all output so that every LED at full white stays within this
    /// many milliamps. 16 LEDs draw 960 mA at full white, so a 250 mA budget
    /// caps them at about 26 %.
    Milliamps(u16),
    /// Full brightness.
    Unlimited,
}

impl Default for Current {
    fn default() -> Self {
        Self::Milliamps(250)
    }
}

impl Current {
    /// Output scale 0..=255 that keeps `worst_case_ma` within the budget.
    #[must_use]
    pub const fn max_brightness(self, worst_case_ma: u32) -> u8 {
        match self {
            Self::Milliamps(_) if worst_case_ma == 0 => 255,
            Self::Milliamps(ma) => {
                let scale = (ma as u32 * 255) / worst_case_ma;
                if scale > 255 { 255 } else { scale as u8 }
            }
            Self::Unlimited => 255,
        }
    }
}

// ============================================================================
// Frame
// ============================================================================

/// Pixel buffer of a strip with `N` LEDs.
///
/// Frames deref to `[RGB8; N]`, so engines and user code write pixels directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame1d<const N: usize>(pub [RGB8; N]);

impl<const N: usize> Frame1d<N> {
    /// Number of LEDs in this frame.
    pub const LEN: usize = N;

    /// An all black frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([RGB8::new(0, 0, 0); N])
    }

    /// A frame filled with one color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([color; N])
    }
}

impl<const N: usize> Deref for Frame1d<N> {
    type Target = [RGB8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for Frame1d<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[RGB8; N]> for Frame1d<N> {
    fn from(array: [RGB8; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> From<Frame1d<N>> for [RGB8; N] {
    fn from(frame: Frame1d<N>) -> Self {
        frame.0
    }
}

impl<const N: usize> Default for Frame1d<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Strip
// ============================================================================

/// Commands for [`LedStrip::run`].
#[derive(Clone, Copy, Debug)]
pub enum StripCommand {
    /// Start a pattern, replacing the running one.
    Start(Pattern),
    /// Stop the running pattern; the LEDs keep their last frame.
    Stop,
    /// Scale the output, 255 is the full current budget.
    Brightness(u8),
}

/// Signal that feeds [`StripCommand`]s to [`LedStrip::run`].
pub type StripCommandSignal = Signal<CriticalSectionRawMutex, StripCommand>;

/// A strip of `N` LEDs behind a `smart_leds` driver.
pub struct LedStrip<S, const N: usize> {
    writer: S,
    frame: Frame1d<N>,
    gamma: Gamma,
    max_brightness: u8,
    combo_table: [u8; 256],
}

impl<S, const N: usize> LedStrip<S, N>
where
    S: SmartLedsWrite<Color = RGB8>,
{
    /// Number of LEDs.
    pub const LEN: usize = N;

    /// Wrap `writer`; output is corrected with `gamma` and scaled to stay
    /// within `max_current` for all `N` LEDs.
    #[must_use]
    pub fn new(writer: S, gamma: Gamma, max_current: Current) -> Self {
        let max_brightness = max_current.max_brightness(N as u32 * MILLIAMPS_PER_LED);
        Self {
            writer,
            frame: Frame1d::new(),
            gamma,
            max_brightness,
            combo_table: generate_combo_table(gamma, max_brightness),
        }
    }

    /// The uncorrected pixels.
    #[must_use]
    pub const fn frame(&self) -> &Frame1d<N> {
        &self.frame
    }

    /// The uncorrected pixels, for drawing.
    pub const fn leds(&mut self) -> &mut [RGB8] {
        &mut self.frame.0
    }

    /// The driver.
    pub const fn writer(&self) -> &S {
        &self.writer
    }

    /// Switch all pixels off; takes effect on the next [`show`](Self::show).
    pub fn clear(&mut self) {
        self.frame = Frame1d::new();
    }

    /// Scale the output by `brightness` on top of the current budget.
    pub fn set_brightness(&mut self, brightness: u8) {
        let scaled = (u16::from(self.max_brightness) * u16::from(brightness)) / 255;
        self.combo_table = generate_combo_table(self.gamma, scaled as u8);
    }

    /// Correct the frame and send it to the LEDs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedWrite`] if the driver fails.
    pub fn show(&mut self) -> Result<()> {
        let mut corrected = self.frame;
        apply_correction(&mut corrected, &self.combo_table);
        self.writer
            .write(corrected.iter().copied())
            .map_err(|_| Error::LedWrite)
    }

    /// Update one engine and show the frame if it changed.
    ///
    /// # Errors
    ///
    /// Returns errors of the engine, its handler and the driver.
    pub fn update<P, C>(&mut self, patterns: &mut P, handler: &mut C, now: Instant) -> Result<Update>
    where
        P: PatternEngine,
        C: OnPatternComplete<P>,
    {
        let update = patterns.update(&mut self.frame.0, now, handler)?;
        if update.needs_show() {
            self.show()?;
        }
        Ok(update)
    }

    /// Update several segments that share this strip and show at most once.
    ///
    /// Later segments draw over earlier ones: once a segment changed pixels,
    /// every following segment redraws its current frame even if no step is due.
    ///
    /// # Errors
    ///
    /// Returns the first error of a segment or of the driver.
    pub fn update_all(&mut self, segments: &mut [&mut dyn Segment], now: Instant) -> Result<bool> {
        let mut changed = false;
        for segment in segments.iter_mut() {
            changed |= segment.update_or_redraw(&mut self.frame.0, now, changed)?;
        }
        if changed {
            self.show()?;
        }
        Ok(changed)
    }

    /// Stop every segment.
    pub fn stop_all(segments: &mut [&mut dyn Segment]) {
        for segment in segments.iter_mut() {
            segment.stop();
        }
    }

    /// Drive `patterns` forever: step and show whenever the next step is due,
    /// and apply commands from `commands` as they arrive.
    ///
    /// # Errors
    ///
    /// Returns the first error of the engine, its handler or the driver.
    /// Commands starting an invalid pattern are ignored.
    pub async fn run<P, C>(
        &mut self,
        patterns: &mut P,
        handler: &mut C,
        commands: &StripCommandSignal,
    ) -> Result<Infallible>
    where
        P: StartPattern,
        C: OnPatternComplete<P>,
    {
        loop {
            self.update(patterns, handler, Instant::now())?;
            let command = match patterns.next_update_at() {
                Some(at) => match select(commands.wait(), Timer::at(at)).await {
                    Either::First(command) => Some(command),
                    Either::Second(()) => None,
                },
                None => Some(commands.wait().await),
            };
            match command {
                Some(StripCommand::Start(pattern)) => {
                    // A rejected pattern leaves the running one in place.
                    if let Err(error) = patterns.start(pattern) {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Ignoring {}: {}", pattern.kind(), error);
                        #[cfg(not(feature = "defmt"))]
                        let _ = error;
                    }
                }
                Some(StripCommand::Stop) => patterns.stop(),
                Some(StripCommand::Brightness(brightness)) => {
                    self.set_brightness(brightness);
                    self.show()?;
                }
                None => {}
            }
        }
    }
}

fn apply_correction<const N: usize>(frame: &mut Frame1d<N>, combo_table: &[u8; 256]) {
    for color in frame.iter_mut() {
        *color = RGB8::new(
            combo_table[usize::from(color.r)],
            combo_table[usize::from(color.g)],
            combo_table[usize::from(color.b)],
        );
    }
}
