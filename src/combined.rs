//! Completion handlers that chain patterns into longer shows.
//!
//! Each handler works on any engine that accepts strip patterns, so the same
//! show runs on a strip segment or on a whole matrix.

use embassy_time::Duration;
use smart_leds::RGB8;

use crate::color::{RED_HALF, WHITE_HALF, wheel};
use crate::patterns::{
    Direction, OnPatternComplete, Pattern, PatternKind, ScannerMode, StartPattern, Timing,
};
use crate::Result;

/// A series of falling stars: vanishing scanners separated by a pause of two
/// scanner intervals.
///
/// After the last star and one more pause, the `next` handler takes over.
/// In endless mode the stars never stop; the pause before each new series is a
/// random 10 to 1000 scanner intervals.
#[derive(Debug, Clone, Copy)]
pub struct FallingStars<N = ()> {
    color: RGB8,
    length: u8,
    interval: Duration,
    direction: Direction,
    repetitions: u16,
    remaining: u16,
    endless: bool,
    handing_over: bool,
    next: N,
}

impl FallingStars {
    /// `repetitions` stars of `color` with a tail of `length` pixels.
    #[must_use]
    pub const fn new(color: RGB8, length: u8, interval: Duration, repetitions: u16, direction: Direction) -> Self {
        Self {
            color,
            length,
            interval,
            direction,
            repetitions,
            remaining: 0,
            endless: false,
            handing_over: false,
            next: (),
        }
    }
}

impl<N> FallingStars<N> {
    /// Hand over to `next` after the last star.
    #[must_use]
    pub fn then<M>(self, next: M) -> FallingStars<M> {
        FallingStars {
            color: self.color,
            length: self.length,
            interval: self.interval,
            direction: self.direction,
            repetitions: self.repetitions,
            remaining: self.remaining,
            endless: self.endless,
            handing_over: self.handing_over,
            next,
        }
    }

    /// Repeat the series forever.
    #[must_use]
    pub const fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    /// `true` once the last pause runs and the next completion goes to `next`.
    #[must_use]
    pub const fn is_handing_over(&self) -> bool {
        self.handing_over
    }

    /// The handler that follows the stars.
    pub const fn next_mut(&mut self) -> &mut N {
        &mut self.next
    }

    /// Start the first star on `patterns`.
    ///
    /// # Errors
    ///
    /// Returns an error if the star does not fit the engine's LEDs.
    pub fn start<P: StartPattern + ?Sized>(&mut self, patterns: &mut P) -> Result<()> {
        // An odd count: stars and pauses alternate, ending with a star.
        self.remaining = self.repetitions.max(1) * 2 - 1;
        self.handing_over = false;
        patterns.start(self.star(ScannerMode::VANISH_COMPLETE))
    }

    const fn star(&self, mode: ScannerMode) -> Pattern {
        Pattern::Scanner {
            color: self.color,
            length: self.length,
            timing: Timing::Interval(self.interval),
            bounces: 0,
            mode,
            direction: self.direction,
        }
    }
}

impl<P, N> OnPatternComplete<P> for FallingStars<N>
where
    P: StartPattern + ?Sized,
    N: OnPatternComplete<P>,
{
    fn on_pattern_complete(&mut self, patterns: &mut P, leds: &mut [RGB8], finished: PatternKind) -> Result<()> {
        if self.handing_over {
            self.handing_over = false;
            return self.next.on_pattern_complete(patterns, leds, finished);
        }
        if self.remaining <= 1 {
            let duration = if self.endless {
                self.remaining = 2;
                self.interval * patterns.rng().u32(10..1000)
            } else {
                self.handing_over = true;
                self.interval * 2
            };
            return patterns.start(Pattern::Delay { duration });
        }
        let pattern = if self.remaining & 0x01 == 1 {
            Pattern::Delay {
                duration: self.interval * 2,
            }
        } else {
            self.star(ScannerMode::VANISH_COMPLETE | ScannerMode::KEEP_BACKGROUND)
        };
        self.remaining -= 1;
        patterns.start(pattern)
    }
}

/// Runs a random pattern with random color and speed after each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllPatternsRandom {
    stars: Option<FallingStars>,
}

impl AllPatternsRandom {
    /// A handler that has not picked a pattern yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { stars: None }
    }

    /// Start one of 13 preset patterns on `patterns`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen pattern does not fit the engine's LEDs.
    pub fn start_random<P: StartPattern + ?Sized>(&mut self, patterns: &mut P) -> Result<()> {
        let random = patterns.rng().u32(..);
        let choice = ((random & 0xFF) * 13) >> 8;
        let position = (random >> 8) as u8;
        let millis = ((u64::from(position) * 40) >> 8) + 40;
        let duration = Duration::from_millis(millis);
        let color = wheel(position);
        let complement = wheel(position.wrapping_add(0x80));
        let direction = if position & 0x02 == 0 {
            Direction::Up
        } else {
            Direction::Down
        };
        let maybe_vanish = if millis & 0x04 == 0 {
            ScannerMode::ROCKET
        } else {
            ScannerMode::VANISH_COMPLETE
        };
        let led_count = patterns.led_count();
        let fit = |length: u8| length.min(u8::try_from(led_count).unwrap_or(u8::MAX));
        let scanner = |color, length, interval, bounces, mode, direction| Pattern::Scanner {
            color,
            length: fit(length),
            timing: Timing::Interval(interval),
            bounces,
            mode,
            direction,
        };
        let steps = u16::try_from(led_count * 2).unwrap_or(u16::MAX);
        let fade = Pattern::Fade {
            from: color,
            to: complement,
            steps: 64,
            interval: duration,
        };

        let pattern = match choice {
            0 => scanner(color, 5, duration, 3, ScannerMode::CYLON | maybe_vanish, direction),
            1 => scanner(
                color,
                7,
                duration,
                2,
                ScannerMode::VANISH_COMPLETE | ScannerMode::KEEP_BACKGROUND,
                direction,
            ),
            2 => scanner(WHITE_HALF, 7, duration / 2, 0, ScannerMode::VANISH_COMPLETE, direction),
            3 => Pattern::RainbowCycle {
                timing: Timing::Interval(duration / 4),
                direction: if millis & 0x02 == 0 {
                    Direction::Up
                } else {
                    Direction::Down
                },
                repetitions: 1,
            },
            4 | 5 => {
                let (length1, length2) = if choice == 4 { (5, 3) } else { (1, 2) };
                Pattern::Stripes {
                    color1: color,
                    length1,
                    color2: complement,
                    length2,
                    steps,
                    timing: Timing::Interval(duration * 2),
                    direction,
                }
            }
            6 => fade,
            7 => Pattern::ColorWipe {
                color,
                timing: Timing::Interval(duration),
                direction,
                clear: false,
            },
            8 => scanner(
                color,
                7,
                duration / 2,
                3,
                maybe_vanish | ScannerMode::START_AT_BOTH_ENDS,
                Direction::Up,
            ),
            9 => Pattern::Heartbeat {
                color,
                interval: duration / 2,
                repetitions: 2,
                clear_at_end: true,
            },
            10 => {
                let mut stars = FallingStars::new(WHITE_HALF, fit(7), duration, 3, direction);
                stars.start(patterns)?;
                self.stars = Some(stars);
                return Ok(());
            }
            11 => Pattern::Fire {
                steps: millis as u16 * 2,
                interval: duration / 2,
                direction: Direction::Up,
            },
            _ if led_count >= 2 => Pattern::BouncingBall {
                color,
                top_index: u16::try_from(led_count - 1).unwrap_or(u16::MAX),
                interval: Duration::from_millis(40),
                loss_percent: 10,
                direction: Direction::Up,
            },
            _ => fade,
        };
        patterns.start(pattern)
    }
}

impl<P: StartPattern + ?Sized> OnPatternComplete<P> for AllPatternsRandom {
    fn on_pattern_complete(&mut self, patterns: &mut P, leds: &mut [RGB8], finished: PatternKind) -> Result<()> {
        if let Some(stars) = &mut self.stars {
            if !stars.is_handing_over() {
                return stars.on_pattern_complete(patterns, leds, finished);
            }
            self.stars = None;
        }
        self.start_random(patterns)
    }
}

/// Alternates the moving pixel and the bouncing pixel, each with a random
/// color and speed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MovingPixelDemo {
    bouncing_next: bool,
}

impl MovingPixelDemo {
    /// Starts with the moving pixel.
    #[must_use]
    pub const fn new() -> Self {
        Self { bouncing_next: false }
    }

    /// Start the next of the two patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine has no LEDs.
    pub fn start_next<P: StartPattern + ?Sized>(&mut self, patterns: &mut P) -> Result<()> {
        let rng = patterns.rng();
        let interval = Duration::from_millis(rng.u64(20..120));
        let color = wheel(rng.u8(..));
        let repetitions = rng.u16(0..2);
        let pattern = if self.bouncing_next {
            Pattern::BouncingPixel {
                color,
                interval,
                repetitions,
                direction: Direction::Up,
            }
        } else {
            Pattern::MovingPixel {
                color: RED_HALF,
                background: color,
                interval,
                direction: Direction::Up,
            }
        };
        self.bouncing_next = !self.bouncing_next;
        patterns.start(pattern)
    }
}

impl<P: StartPattern + ?Sized> OnPatternComplete<P> for MovingPixelDemo {
    fn on_pattern_complete(&mut self, patterns: &mut P, _leds: &mut [RGB8], _finished: PatternKind) -> Result<()> {
        self.start_next(patterns)
    }
}
