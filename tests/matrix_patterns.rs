#![cfg(feature = "host")]
//! Host-level tests for the matrix pattern engine and the matrix show.

use embassy_time::{Duration, Instant};
use neo_patterns::Error;
use neo_patterns::color::{BLACK, RGB8, colors, is_black};
use neo_patterns::matrix::layout::LedLayout;
use neo_patterns::matrix::{MatrixFont, MatrixGeometry, MatrixPixels};
use neo_patterns::matrix_patterns::{MatrixDemo, MatrixNeoPatterns, MatrixPattern, StartMatrixPattern};
use neo_patterns::patterns::{Direction, Pattern, PatternEngine, PatternKind, Timing, Update};

const ROWS_8X8: LedLayout<64, 8, 8> = LedLayout::row_major();
const ROWS_4X6: LedLayout<24, 4, 6> = LedLayout::row_major();
const ROWS_3X3: LedLayout<9, 3, 3> = LedLayout::row_major();
const A: RGB8 = RGB8::new(1, 2, 3);

fn at(millis: u64) -> Instant {
    Instant::from_millis(millis)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn ticker(text: &'static str, direction: Direction) -> MatrixPattern {
    MatrixPattern::Ticker {
        text,
        foreground: colors::GREEN,
        background: BLACK,
        interval: ms(10),
        direction,
        font: MatrixFont::Font4x6,
    }
}

#[test]
fn ticker_scrolls_through_and_completes() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 24];
    let mut matrix = MatrixNeoPatterns::new(ROWS_4X6);
    matrix.start(ticker("A", Direction::Left))?;

    assert_eq!(matrix.update(&mut leds, at(0), &mut ())?, Update::Drawn);
    assert!(leds.iter().copied().all(is_black));

    for step in 1..=4 {
        assert_eq!(matrix.update(&mut leds, at(step * 10), &mut ())?, Update::Drawn);
    }
    let mut expected_leds = [BLACK; 24];
    let mut expected = MatrixPixels::new(&mut expected_leds, &ROWS_4X6);
    expected.draw_glyph('A', MatrixFont::Font4x6, 0, 0, colors::GREEN, BLACK, false);
    assert_eq!(leds, expected_leds);

    for step in 5..=7 {
        assert_eq!(matrix.update(&mut leds, at(step * 10), &mut ())?, Update::Drawn);
    }
    assert_eq!(
        matrix.update(&mut leds, at(80), &mut ())?,
        Update::Completed { show: true }
    );
    assert!(!matrix.is_active());
    Ok(())
}

#[test]
fn still_ticker_is_centered_and_keeps_running() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 64];
    let mut matrix = MatrixNeoPatterns::new(ROWS_8X8);
    matrix.start(ticker("A", Direction::None))?;
    matrix.update(&mut leds, at(0), &mut ())?;

    let mut expected_leds = [BLACK; 64];
    let mut expected = MatrixPixels::new(&mut expected_leds, &ROWS_8X8);
    expected.draw_glyph('A', MatrixFont::Font4x6, 2, 1, colors::GREEN, BLACK, true);
    assert_eq!(leds, expected_leds);

    for step in 1..100 {
        assert_eq!(matrix.update(&mut leds, at(step * 10), &mut ())?, Update::Drawn);
    }
    assert_eq!(leds, expected_leds);
    Ok(())
}

#[test]
fn move_shifts_the_content_step_by_step() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 9];
    leds[0] = A;
    let mut matrix = MatrixNeoPatterns::new(ROWS_3X3);
    matrix.start(MatrixPattern::Move {
        direction: Direction::Right,
        steps: 2,
        interval: ms(10),
        background: BLACK,
    })?;

    assert_eq!(matrix.update(&mut leds, at(0), &mut ())?, Update::Drawn);
    assert_eq!(leds[1], A);
    assert_eq!(matrix.update(&mut leds, at(10), &mut ())?, Update::Drawn);
    assert_eq!(leds[..3], [BLACK, BLACK, A]);
    assert_eq!(
        matrix.update(&mut leds, at(20), &mut ())?,
        Update::Completed { show: false }
    );
    assert_eq!(leds[2], A);
    Ok(())
}

#[test]
fn moving_picture_erases_its_trail() -> neo_patterns::Result<()> {
    static DOT: [u8; 1] = [0x80];
    let mut leds = [BLACK; 9];
    let mut matrix = MatrixNeoPatterns::new(ROWS_3X3);
    matrix.start(MatrixPattern::MovingPicture {
        picture: &DOT,
        foreground: A,
        background: BLACK,
        x: 1,
        y: 0,
        steps: 2,
        interval: ms(10),
        direction: Direction::Down,
    })?;

    matrix.update(&mut leds, at(0), &mut ())?;
    assert_eq!(leds, [BLACK, A, BLACK, BLACK, BLACK, BLACK, BLACK, BLACK, BLACK]);
    matrix.update(&mut leds, at(10), &mut ())?;
    assert_eq!(leds, [BLACK, BLACK, BLACK, BLACK, A, BLACK, BLACK, BLACK, BLACK]);
    assert_eq!(
        matrix.update(&mut leds, at(20), &mut ())?,
        Update::Completed { show: false }
    );
    Ok(())
}

#[test]
fn fire_rises_from_the_bottom() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 64];
    let mut matrix = MatrixNeoPatterns::with_seed(ROWS_8X8, 5);
    matrix.start(MatrixPattern::Fire {
        steps: 3,
        interval: ms(30),
    })?;

    matrix.update(&mut leds, at(0), &mut ())?;
    assert!(leds[56..].iter().any(|&led| !is_black(led)));
    assert!(leds[..8].iter().copied().all(is_black));

    assert_eq!(matrix.update(&mut leds, at(30), &mut ())?, Update::Drawn);
    assert_eq!(matrix.update(&mut leds, at(60), &mut ())?, Update::Drawn);
    assert_eq!(
        matrix.update(&mut leds, at(90), &mut ())?,
        Update::Completed { show: false }
    );
    Ok(())
}

#[test]
fn snow_falls_for_its_steps() -> neo_patterns::Result<()> {
    let mut leds = [colors::RED; 64];
    let mut matrix = MatrixNeoPatterns::with_seed(ROWS_8X8, 9);
    matrix.start(MatrixPattern::Snow {
        steps: 5,
        interval: ms(20),
    })?;

    matrix.update(&mut leds, at(0), &mut ())?;
    assert!(!leds.contains(&colors::RED));
    assert!(leds.iter().any(|&led| !is_black(led)));

    for step in 1..5 {
        assert_eq!(matrix.update(&mut leds, at(step * 20), &mut ())?, Update::Drawn);
    }
    assert_eq!(
        matrix.update(&mut leds, at(100), &mut ())?,
        Update::Completed { show: false }
    );
    Ok(())
}

#[test]
fn strip_patterns_run_in_wiring_order() -> neo_patterns::Result<()> {
    const LAYOUT: LedLayout<9, 3, 3> = LedLayout::from_geometry(MatrixGeometry::BOTTOM_RIGHT_PROGRESSIVE);
    let mut leds = [BLACK; 9];
    let mut matrix = MatrixNeoPatterns::new(LAYOUT);
    matrix.start(Pattern::ColorWipe {
        color: A,
        timing: Timing::Interval(ms(10)),
        direction: Direction::Up,
        clear: true,
    })?;

    matrix.update(&mut leds, at(0), &mut ())?;
    assert_eq!(matrix.active_pattern(), Some(PatternKind::ColorWipe));
    assert_eq!(leds[0], A);
    let pixels = matrix.pixels(&mut leds)?;
    assert_eq!(pixels.get_xy(2, 2), A);
    Ok(())
}

#[test]
fn invalid_matrix_patterns_are_rejected() {
    let mut matrix = MatrixNeoPatterns::new(ROWS_3X3);
    assert_eq!(
        matrix.start(ticker("", Direction::Left)),
        Err(Error::ZeroLength(PatternKind::Ticker))
    );
    assert_eq!(
        matrix.start(MatrixPattern::Move {
            direction: Direction::Up,
            steps: 0,
            interval: ms(10),
            background: BLACK,
        }),
        Err(Error::ZeroSteps(PatternKind::Move))
    );
    assert_eq!(
        matrix.start(MatrixPattern::Snow {
            steps: 0,
            interval: ms(10),
        }),
        Err(Error::ZeroSteps(PatternKind::MatrixSnow))
    );
    assert!(!matrix.is_active());
}

#[test]
fn short_buffers_are_reported() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 4];
    let mut matrix = MatrixNeoPatterns::new(ROWS_3X3);
    assert_eq!(
        matrix.show_number(&mut leds, 1, A),
        Err(Error::SegmentOutOfRange {
            offset: 0,
            len: 9,
            strip_len: 4,
        })
    );

    matrix.start(MatrixPattern::fire())?;
    assert!(matrix.update(&mut leds, at(0), &mut ()).is_err());
    Ok(())
}

#[test]
fn engine_exposes_the_matrix_seam() -> neo_patterns::Result<()> {
    let mut leds = [A; 64];
    let mut matrix = MatrixNeoPatterns::new(ROWS_8X8);
    assert_eq!(matrix.matrix_size(), (8, 8));
    assert!(!matrix.start_snake_autorun(ms(10), A, 1)?);
    matrix.clear_matrix(&mut leds)?;
    assert_eq!(leds, [BLACK; 64]);
    Ok(())
}

#[test]
fn matrix_demo_runs_its_show_in_order() -> neo_patterns::Result<()> {
    let mut leds = [BLACK; 64];
    let mut matrix = MatrixNeoPatterns::with_seed(ROWS_8X8, 11);
    let mut demo = MatrixDemo::new();
    demo.start_next(&mut matrix, &mut leds)?;

    let mut trace = Vec::new();
    for tick in 0..6_000 {
        if let Some(active) = matrix.active_pattern() {
            if trace.last() != Some(&active) {
                trace.push(active);
            }
        }
        matrix.update(&mut leds, at(tick * 10), &mut demo)?;
    }

    let show = [
        PatternKind::Ticker,
        PatternKind::Delay,
        PatternKind::MovingPicture,
        PatternKind::Delay,
        PatternKind::ProcessSelectiveColor,
        PatternKind::Delay,
        PatternKind::ProcessSelectiveColor,
        PatternKind::Delay,
        PatternKind::ProcessSelectiveColor,
        PatternKind::Delay,
        PatternKind::ProcessSelectiveColor,
        PatternKind::Delay,
        PatternKind::Move,
        PatternKind::Delay,
        PatternKind::MatrixFire,
        PatternKind::Delay,
        PatternKind::Ticker,
    ];
    assert!(trace.len() > show.len());
    assert_eq!(trace[..show.len()], show);
    Ok(())
}
