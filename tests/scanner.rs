#![cfg(feature = "host")]
//! Host-level tests for the scanner and the falling star.

use embassy_time::{Duration, Instant};
use neo_patterns::color::{BLACK, RGB8, colors};
use neo_patterns::patterns::{
    Direction, NeoPatterns, Pattern, PatternEngine, ScannerMode, Timing, Update,
};

const TAIL: RGB8 = RGB8::new(11, 0, 0);

fn at(millis: u64) -> Instant {
    Instant::from_millis(millis)
}

fn scanner(length: u8, bounces: u16, mode: ScannerMode, direction: Direction) -> Pattern {
    Pattern::Scanner {
        color: colors::RED,
        length,
        timing: Timing::Interval(Duration::from_millis(10)),
        bounces,
        mode,
        direction,
    }
}

/// Index of the brightest pixel of each frame until the scanner completes.
fn head_positions<const N: usize>(patterns: &mut NeoPatterns<N>) -> neo_patterns::Result<Vec<Option<usize>>> {
    let mut leds = [BLACK; N];
    let mut positions = Vec::new();
    let mut now = 0;
    let mut update = patterns.update(&mut leds, at(now), &mut ())?;
    while !matches!(update, Update::Completed { .. } | Update::Ended) && now < 10_000 {
        positions.push(leds.iter().position(|&led| led == colors::RED));
        now += 10;
        update = patterns.update(&mut leds, at(now), &mut ())?;
    }
    Ok(positions)
}

#[test]
fn rocket_runs_with_a_dimming_tail() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 5];
    let mut patterns = NeoPatterns::<5>::new(0);
    patterns.start(scanner(2, 0, ScannerMode::ROCKET, Direction::Up))?;

    patterns.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [TAIL, colors::RED, BLACK, BLACK, BLACK]);
    patterns.update(&mut leds, at(10), &mut ())?;
    assert_eq!(leds, [BLACK, TAIL, colors::RED, BLACK, BLACK]);
    patterns.update(&mut leds, at(20), &mut ())?;
    patterns.update(&mut leds, at(30), &mut ())?;
    assert_eq!(leds, [BLACK, BLACK, BLACK, TAIL, colors::RED]);
    assert_eq!(
        patterns.update(&mut leds, at(40), &mut ())?,
        Update::Completed { show: false }
    );
    Ok(())
}

#[test]
fn rocket_down_starts_at_the_end() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 5];
    let mut patterns = NeoPatterns::<5>::new(0);
    patterns.start(scanner(2, 0, ScannerMode::ROCKET, Direction::Down))?;

    patterns.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [BLACK, BLACK, BLACK, colors::RED, TAIL]);
    Ok(())
}

#[test]
fn vanishing_scanner_enters_and_leaves_the_strip() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 5];
    let mut patterns = NeoPatterns::<5>::new(0);
    patterns.start(scanner(2, 0, ScannerMode::VANISH_COMPLETE, Direction::Up))?;

    patterns.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [BLACK; 5]);
    patterns.update(&mut leds, at(10), &mut ())?;
    assert_eq!(leds, [colors::RED, BLACK, BLACK, BLACK, BLACK]);
    for step in 2..=6 {
        patterns.update(&mut leds, at(step * 10), &mut ())?;
    }
    assert_eq!(leds, [BLACK, BLACK, BLACK, BLACK, TAIL]);
    patterns.update(&mut leds, at(70), &mut ())?;
    assert_eq!(leds, [BLACK; 5]);
    assert_eq!(
        patterns.update(&mut leds, at(80), &mut ())?,
        Update::Completed { show: false }
    );
    Ok(())
}

#[test]
fn bounces_turn_at_the_strip_end() -> neo_patterns::Result<()> {
    let mut patterns = NeoPatterns::<4>::new(0);
    patterns.start(scanner(1, 1, ScannerMode::ROCKET, Direction::Up))?;

    let positions = head_positions(&mut patterns)?;
    assert_eq!(
        positions,
        [Some(0), Some(1), Some(2), Some(3), Some(2), Some(1), Some(0)]
    );
    Ok(())
}

#[test]
fn cylon_has_tails_on_both_sides() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 7];
    let mut patterns = NeoPatterns::<7>::new(0);
    patterns.start(scanner(2, 0, ScannerMode::CYLON, Direction::Up))?;

    patterns.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [TAIL, colors::RED, TAIL, BLACK, BLACK, BLACK, BLACK]);
    Ok(())
}

#[test]
fn both_ends_mirror_the_scanner() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 6];
    let mut patterns = NeoPatterns::<6>::new(0);
    patterns.start(scanner(1, 0, ScannerMode::START_AT_BOTH_ENDS, Direction::Up))?;

    patterns.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [colors::RED, BLACK, BLACK, BLACK, BLACK, colors::RED]);
    patterns.update(&mut leds, at(10), &mut ())?;
    assert_eq!(leds, [BLACK, colors::RED, BLACK, BLACK, colors::RED, BLACK]);
    Ok(())
}

#[test]
fn keep_background_draws_over_existing_pixels() -> neo_patterns::Result<()> {
    let background = RGB8::new(0, 0, 7);
    let mut leds = [background; 4];
    let mut patterns = NeoPatterns::<4>::new(0);
    patterns.start(scanner(1, 0, ScannerMode::KEEP_BACKGROUND, Direction::Up))?;

    patterns.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [colors::RED, background, background, background]);
    Ok(())
}

#[test]
fn total_timing_spreads_over_all_steps() -> neo_patterns::Result<()> {
    let mut patterns = NeoPatterns::<5>::new(0);
    patterns.start(Pattern::Scanner {
        color: colors::RED,
        length: 2,
        timing: Timing::Total(Duration::from_millis(600)),
        bounces: 0,
        mode: ScannerMode::ROCKET,
        direction: Direction::Up,
    })?;

    assert_eq!(patterns.scheduler().interval(), Duration::from_millis(200));
    Ok(())
}
