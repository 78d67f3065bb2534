#![cfg(feature = "host")]
//! Host-level tests for the PNG previews.

use std::error::Error;
use std::fs::File;
use std::path::Path;

use embassy_time::{Duration, Instant};
use neo_patterns::color::{BLACK, RGB8, colors};
use neo_patterns::led_strip::Frame1d;
use neo_patterns::matrix::layout::LedLayout;
use neo_patterns::matrix::{Frame2d, HEART_8X8, MatrixPixels};
use neo_patterns::matrix_patterns::{MatrixNeoPatterns, MatrixPattern};
use neo_patterns::patterns::{Direction, PatternEngine};
use neo_patterns::to_png::{
    write_frame_png, write_frame_png_with_gamma, write_frames_apng, write_strip_png,
};

type TestResult = Result<(), Box<dyn Error>>;

const ROWS_8X8: LedLayout<64, 8, 8> = LedLayout::row_major();

/// Width, height and animation frame count of the PNG at `path`.
fn png_info(path: &Path) -> Result<(u32, u32, Option<u32>), Box<dyn Error>> {
    let reader = png::Decoder::new(File::open(path)?).read_info()?;
    let info = reader.info();
    Ok((
        info.width,
        info.height,
        info.animation_control.as_ref().map(|control| control.num_frames),
    ))
}

fn heart_frame() -> Frame2d<8, 8> {
    let mut leds = [BLACK; 64];
    let mut matrix = MatrixPixels::new(&mut leds, &ROWS_8X8);
    matrix.load_picture(&HEART_8X8, 8, colors::RED, BLACK, 0, 7, false);
    matrix.to_frame()
}

#[test]
fn matrix_preview_fits_the_target_size() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("heart.png");
    write_frame_png(&heart_frame(), &path, 200)?;

    let (width, height, frames) = png_info(&path)?;
    assert!(width <= 200 && width > 150, "width {width}");
    assert_eq!(width, height);
    assert_eq!(frames, None);
    Ok(())
}

#[test]
fn strip_preview_is_one_row_of_dots() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("strip.png");
    let mut frame = Frame1d::<8>::new();
    frame[3] = RGB8::new(0, 0, 255);
    write_strip_png(&frame, &path, 160)?;

    // Cells of 18 pixels plus a 7 pixel border on each side.
    assert_eq!(png_info(&path)?, (158, 32, None));
    Ok(())
}

#[test]
fn animation_holds_every_frame() -> TestResult {
    let mut leds = [BLACK; 64];
    let mut matrix = MatrixNeoPatterns::new(ROWS_8X8);
    matrix.start(MatrixPattern::MovingPicture {
        picture: &HEART_8X8,
        foreground: colors::RED,
        background: BLACK,
        x: 0,
        y: -1,
        steps: 9,
        interval: Duration::from_millis(100),
        direction: Direction::Down,
    })?;
    let mut frames = Vec::new();
    let mut now = 0;
    while matrix.is_active() {
        if matrix.update(&mut leds, Instant::from_millis(now), &mut ())?.needs_show() {
            frames.push(Frame2d::from_leds(&ROWS_8X8, &leds));
        }
        now += 100;
    }
    assert_eq!(frames.len(), 9);
    assert_eq!(frames.last(), Some(&heart_frame()));

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("heart_moves_in.png");
    write_frames_apng(&frames, &path, 120, 100)?;
    let (_, _, count) = png_info(&path)?;
    assert_eq!(count, Some(9));
    Ok(())
}

#[test]
fn bad_parameters_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("never.png");
    let frame = heart_frame();

    assert!(write_frames_apng::<8, 8>(&[], &path, 100, 100).is_err());
    assert!(write_frames_apng(&[frame], &path, 100, 0).is_err());
    assert!(write_frames_apng(&[frame], &path, 100, 70_000).is_err());
    assert!(write_frame_png(&frame, &path, 0).is_err());
    assert!(write_frame_png_with_gamma(&frame, &path, 100, 0.0).is_err());
    assert!(!path.exists());
    Ok(())
}
