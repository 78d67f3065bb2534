#![cfg(feature = "host")]
//! Host-level tests for the completion handlers that chain patterns.

use embassy_time::{Duration, Instant};
use neo_patterns::color::{BLACK, RGB8, WHITE_HALF};
use neo_patterns::combined::{AllPatternsRandom, FallingStars, MovingPixelDemo};
use neo_patterns::patterns::{
    Direction, NeoPatterns, OnPatternComplete, PatternEngine, PatternKind,
};

#[derive(Default)]
struct Finished(Vec<PatternKind>);

impl<P> OnPatternComplete<P> for Finished {
    fn on_pattern_complete(
        &mut self,
        _patterns: &mut P,
        _leds: &mut [RGB8],
        finished: PatternKind,
    ) -> neo_patterns::Result<()> {
        self.0.push(finished);
        Ok(())
    }
}

/// Run `patterns` in 10 ms ticks and list each pattern as it becomes active.
fn run_and_trace<const N: usize, C>(
    patterns: &mut NeoPatterns<N>,
    handler: &mut C,
    ticks: u64,
) -> neo_patterns::Result<Vec<PatternKind>>
where
    C: OnPatternComplete<NeoPatterns<N>>,
{
    let mut leds = [BLACK; N];
    let mut trace = Vec::new();
    for tick in 0..ticks {
        if let Some(active) = patterns.active_pattern() {
            if trace.last() != Some(&active) {
                trace.push(active);
            }
        }
        patterns.update(&mut leds, Instant::from_millis(tick * 10), handler)?;
    }
    Ok(trace)
}

#[test]
fn falling_stars_alternate_with_pauses_then_hand_over() -> neo_patterns::Result<()> {
    let mut patterns = NeoPatterns::<5>::new(0);
    let mut stars =
        FallingStars::new(WHITE_HALF, 2, Duration::from_millis(10), 2, Direction::Up).then(Finished::default());
    stars.start(&mut patterns)?;

    let trace = run_and_trace(&mut patterns, &mut stars, 200)?;
    assert_eq!(
        trace,
        [
            PatternKind::Scanner,
            PatternKind::Delay,
            PatternKind::Scanner,
            PatternKind::Delay,
        ]
    );
    assert_eq!(stars.next_mut().0, [PatternKind::Delay]);
    assert!(!patterns.is_active());
    Ok(())
}

#[test]
fn endless_falling_stars_never_hand_over() -> neo_patterns::Result<()> {
    let mut patterns = NeoPatterns::<5>::with_seed(0, 3);
    let mut stars = FallingStars::new(WHITE_HALF, 2, Duration::from_millis(10), 1, Direction::Down)
        .endless()
        .then(Finished::default());
    stars.start(&mut patterns)?;

    run_and_trace(&mut patterns, &mut stars, 5000)?;
    assert!(patterns.is_active());
    assert!(stars.next_mut().0.is_empty());
    Ok(())
}

#[test]
fn random_patterns_keep_running() -> neo_patterns::Result<()> {
    let mut patterns = NeoPatterns::<16>::with_seed(0, 42);
    let mut random = AllPatternsRandom::new();
    random.start_random(&mut patterns)?;

    let trace = run_and_trace(&mut patterns, &mut random, 20_000)?;
    assert!(patterns.is_active());
    assert!(trace.len() > 1);
    Ok(())
}

#[test]
fn moving_pixel_demo_alternates_its_patterns() -> neo_patterns::Result<()> {
    let mut patterns = NeoPatterns::<8>::with_seed(0, 1);
    let mut demo = MovingPixelDemo::new();
    demo.start_next(&mut patterns)?;

    let trace = run_and_trace(&mut patterns, &mut demo, 200)?;
    assert_eq!(trace[0], PatternKind::MovingPixel);
    assert_eq!(trace[1], PatternKind::BouncingPixel);
    assert!(trace.windows(2).all(|pair| pair[0] != pair[1]));
    Ok(())
}
