//! The non-blocking update cycle shared by strip, matrix and snake patterns.
//!
//! An engine owns a [`Scheduler`] and knows how to draw one step of its active
//! pattern. [`PatternEngine::update`] decides from the clock whether a step is
//! due, runs it, and hands a finished pattern to an [`OnPatternComplete`]
//! handler, which may start the next pattern right away.

use embassy_time::{Duration, Instant};
use smart_leds::RGB8;

use crate::Result;
use crate::patterns::PatternKind;

/// Timing state of one engine: which pattern runs, how often it steps and when
/// it stepped last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    active: Option<PatternKind>,
    interval: Duration,
    last_update: Option<Instant>,
    pending_start: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// An idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: None,
            interval: Duration::from_ticks(0),
            last_update: None,
            pending_start: false,
        }
    }

    /// The running pattern, if any.
    #[must_use]
    pub const fn active(&self) -> Option<PatternKind> {
        self.active
    }

    /// Time between two steps.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the step interval of the running pattern.
    pub const fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// `true` between a start and the update that draws its first frame.
    #[must_use]
    pub const fn pending_start(&self) -> bool {
        self.pending_start
    }

    /// Make `kind` the running pattern. Its first frame is drawn by the next update.
    pub const fn activate(&mut self, kind: PatternKind, interval: Duration) {
        self.active = Some(kind);
        self.interval = interval;
        self.pending_start = true;
    }

    /// Forget the running pattern.
    pub const fn deactivate(&mut self) {
        self.active = None;
        self.pending_start = false;
    }

    pub(crate) const fn mark_updated(&mut self, now: Instant) {
        self.last_update = Some(now);
        self.pending_start = false;
    }

    /// `true` once a full interval has passed since the last step.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_update {
            Some(last_update) => now.saturating_duration_since(last_update) >= self.interval,
            None => true,
        }
    }

    /// When the next step is due, `None` while idle.
    #[must_use]
    pub fn next_update_at(&self) -> Option<Instant> {
        self.active?;
        if self.pending_start {
            return Some(Instant::from_ticks(0));
        }
        Some(match self.last_update {
            Some(last_update) => last_update + self.interval,
            None => Instant::from_ticks(0),
        })
    }
}

/// Why an engine is asked to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// First frame after a start.
    Start,
    /// Draw the current frame again without advancing, e.g. after another
    /// segment wrote over it.
    Redraw,
    /// Advance one step and draw the result.
    Advance,
}

/// Outcome of one [`PatternEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Pixels changed.
    Drawn,
    /// Nothing to show, e.g. a delay or a pattern that cannot redraw itself.
    Unchanged,
    /// The last step was taken; the completion handler runs next.
    Completed {
        /// Whether this final step still changed pixels.
        drawn: bool,
    },
    /// The step counter ran past zero; the pattern stops without a handler call.
    Ended,
}

/// Outcome of one [`PatternEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Update {
    /// No pattern is running.
    Inactive,
    /// The running pattern is waiting for its interval.
    NotDue,
    /// A step was drawn.
    Drawn,
    /// A step ran but left the pixels alone.
    Unchanged,
    /// The pattern finished and its completion handler ran.
    Completed {
        /// Whether the pixels changed, either in the final step or because the
        /// handler started a new pattern.
        show: bool,
    },
    /// The pattern ran past its last step and stopped without a handler call.
    Ended,
}

impl Update {
    /// `true` if the LEDs must be refreshed.
    #[must_use]
    pub const fn needs_show(self) -> bool {
        matches!(self, Self::Drawn | Self::Completed { show: true })
    }
}

/// Called when a pattern runs its last step.
///
/// The engine is already inactive when the handler runs, so `finished` tells
/// which pattern ended. Starting a new pattern on `patterns` chains it; its
/// first frame is drawn in the same update.
pub trait OnPatternComplete<P: ?Sized> {
    /// React to the end of `finished`.
    ///
    /// # Errors
    ///
    /// Errors (typically from starting the next pattern) propagate out of
    /// [`PatternEngine::update`].
    fn on_pattern_complete(
        &mut self,
        patterns: &mut P,
        leds: &mut [RGB8],
        finished: PatternKind,
    ) -> Result<()>;
}

impl<P: ?Sized> OnPatternComplete<P> for () {
    fn on_pattern_complete(&mut self, _: &mut P, _: &mut [RGB8], _: PatternKind) -> Result<()> {
        Ok(())
    }
}

impl<P: ?Sized, C: OnPatternComplete<P> + ?Sized> OnPatternComplete<P> for &mut C {
    fn on_pattern_complete(
        &mut self,
        patterns: &mut P,
        leds: &mut [RGB8],
        finished: PatternKind,
    ) -> Result<()> {
        (**self).on_pattern_complete(patterns, leds, finished)
    }
}

/// A pattern state machine driven by [`update`](Self::update).
pub trait PatternEngine {
    /// Timing state of this engine.
    fn scheduler(&self) -> &Scheduler;

    /// Mutable timing state of this engine.
    fn scheduler_mut(&mut self) -> &mut Scheduler;

    /// Draw the active pattern into `leds` for `phase`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine's pixels do not fit into `leds`.
    fn step(&mut self, leds: &mut [RGB8], phase: Phase) -> Result<Step>;

    /// Give the engine a chance to continue by itself after `finished`.
    /// Returns `true` if it did, in which case no handler is called.
    ///
    /// # Errors
    ///
    /// Returns an error if starting the follow-up pattern fails.
    fn complete_internally(&mut self, _leds: &mut [RGB8], _finished: PatternKind) -> Result<bool> {
        Ok(false)
    }

    /// Hook for engines with state beyond the scheduler.
    fn on_stop(&mut self) {}

    /// Step the running pattern if its interval has passed.
    ///
    /// The first update after a start always draws, whatever the time.
    ///
    /// # Errors
    ///
    /// Returns errors of [`step`](Self::step) and of the completion handler.
    fn update<C>(&mut self, leds: &mut [RGB8], now: Instant, handler: &mut C) -> Result<Update>
    where
        C: OnPatternComplete<Self> + ?Sized,
    {
        if self.scheduler().active().is_none() {
            return Ok(Update::Inactive);
        }
        if self.scheduler().pending_start() {
            return draw_started(self, leds, now);
        }
        if !self.scheduler().is_due(now) {
            return Ok(Update::NotDue);
        }
        self.scheduler_mut().mark_updated(now);
        match self.step(leds, Phase::Advance)? {
            Step::Drawn => Ok(Update::Drawn),
            Step::Unchanged => Ok(Update::Unchanged),
            Step::Ended => {
                #[cfg(feature = "defmt")]
                if let Some(kind) = self.scheduler().active() {
                    defmt::warn!("{} ran past its last step", kind);
                }
                self.scheduler_mut().deactivate();
                Ok(Update::Ended)
            }
            Step::Completed { drawn } => complete(self, leds, now, drawn, handler),
        }
    }

    /// Like [`update`](Self::update), but when no step is due and `redraw` is
    /// set, draw the current frame again. Returns `true` if pixels changed.
    ///
    /// Use this to layer patterns that share LEDs: redraw the background
    /// pattern first, then update the foreground patterns, then show once.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    fn update_or_redraw<C>(
        &mut self,
        leds: &mut [RGB8],
        now: Instant,
        redraw: bool,
        handler: &mut C,
    ) -> Result<bool>
    where
        C: OnPatternComplete<Self> + ?Sized,
    {
        let update = self.update(leds, now, handler)?;
        if update == Update::NotDue && redraw {
            return Ok(self.step(leds, Phase::Redraw)? == Step::Drawn);
        }
        Ok(update.needs_show())
    }

    /// Stop the running pattern without calling the completion handler.
    fn stop(&mut self) {
        #[cfg(feature = "defmt")]
        if let Some(kind) = self.scheduler().active() {
            defmt::info!("Stop {}", kind);
        }
        self.scheduler_mut().deactivate();
        self.on_stop();
    }

    /// `true` while a pattern runs.
    fn is_active(&self) -> bool {
        self.scheduler().active().is_some()
    }

    /// The running pattern.
    fn active_pattern(&self) -> Option<PatternKind> {
        self.scheduler().active()
    }

    /// When the next step is due, `None` while idle.
    fn next_update_at(&self) -> Option<Instant> {
        self.scheduler().next_update_at()
    }
}

fn draw_started<P: PatternEngine + ?Sized>(
    engine: &mut P,
    leds: &mut [RGB8],
    now: Instant,
) -> Result<Update> {
    let step = engine.step(leds, Phase::Start)?;
    engine.scheduler_mut().mark_updated(now);
    Ok(match step {
        Step::Unchanged => Update::Unchanged,
        _ => Update::Drawn,
    })
}

fn complete<P, C>(
    engine: &mut P,
    leds: &mut [RGB8],
    now: Instant,
    drawn: bool,
    handler: &mut C,
) -> Result<Update>
where
    P: PatternEngine + ?Sized,
    C: OnPatternComplete<P> + ?Sized,
{
    let Some(finished) = engine.scheduler().active() else {
        return Ok(Update::Inactive);
    };
    engine.scheduler_mut().deactivate();
    #[cfg(feature = "defmt")]
    defmt::debug!("{} completed", finished);

    let handled = engine.complete_internally(leds, finished)?;
    if !handled {
        handler.on_pattern_complete(engine, leds, finished)?;
    }
    let started = engine.scheduler().pending_start() && draw_started(engine, leds, now)?.needs_show();
    Ok(Update::Completed {
        show: drawn || handled || started,
    })
}

/// An engine together with its completion handler, as one unit that a strip
/// can update next to other segments.
pub trait Segment {
    /// See [`PatternEngine::update_or_redraw`].
    ///
    /// # Errors
    ///
    /// Same as [`PatternEngine::update`].
    fn update_or_redraw(&mut self, leds: &mut [RGB8], now: Instant, redraw: bool) -> Result<bool>;

    /// When the next step is due, `None` while idle.
    fn next_update_at(&self) -> Option<Instant>;

    /// Stop the running pattern.
    fn stop(&mut self);

    /// `true` while a pattern runs.
    fn is_active(&self) -> bool;
}

impl<P, C> Segment for (P, C)
where
    P: PatternEngine,
    C: OnPatternComplete<P>,
{
    fn update_or_redraw(&mut self, leds: &mut [RGB8], now: Instant, redraw: bool) -> Result<bool> {
        let (engine, handler) = self;
        engine.update_or_redraw(leds, now, redraw, handler)
    }

    fn next_update_at(&self) -> Option<Instant> {
        self.0.next_update_at()
    }

    fn stop(&mut self) {
        self.0.stop();
    }

    fn is_active(&self) -> bool {
        self.0.is_active()
    }
}
