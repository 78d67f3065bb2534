#![cfg(feature = "host")]
//! Host-level tests for the strip output stage.

use core::convert::Infallible;

use embassy_time::{Duration, Instant};
use neo_patterns::Error;
use neo_patterns::color::{BLACK, RGB8};
use neo_patterns::led_strip::{
    Current, Gamma, LedStrip, StripCommand, StripCommandSignal, generate_combo_table,
};
use neo_patterns::patterns::{
    ColorProcess, Direction, NeoPatterns, Pattern, Segment, Timing, Update,
};
use smart_leds::SmartLedsWrite;

/// Keeps every frame written to it.
#[derive(Default)]
struct Recorder(Vec<Vec<RGB8>>);

impl SmartLedsWrite for Recorder {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Infallible>
    where
        T: IntoIterator<Item = I>,
        I: Into<RGB8>,
    {
        self.0.push(iterator.into_iter().map(Into::into).collect());
        Ok(())
    }
}

struct Broken;

impl SmartLedsWrite for Broken {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, _iterator: T) -> Result<(), ()>
    where
        T: IntoIterator<Item = I>,
        I: Into<RGB8>,
    {
        Err(())
    }
}

/// Keeps every frame written to it, then reports a failure.
#[derive(Default)]
struct RecordThenFail(Vec<Vec<RGB8>>);

impl SmartLedsWrite for RecordThenFail {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), ()>
    where
        T: IntoIterator<Item = I>,
        I: Into<RGB8>,
    {
        self.0.push(iterator.into_iter().map(Into::into).collect());
        Err(())
    }
}

fn wipe(color: RGB8) -> Pattern {
    Pattern::ColorWipe {
        color,
        timing: Timing::Interval(Duration::from_millis(10)),
        direction: Direction::Up,
        clear: true,
    }
}

#[test]
fn linear_unlimited_output_is_unchanged() -> neo_patterns::Result<()> {
    let mut strip = LedStrip::<_, 3>::new(Recorder::default(), Gamma::Linear, Current::Unlimited);
    strip.leds()[1] = RGB8::new(1, 128, 255);
    strip.show()?;

    assert_eq!(strip.writer().0, [vec![BLACK, RGB8::new(1, 128, 255), BLACK]]);
    Ok(())
}

#[test]
fn current_budget_scales_the_output() -> neo_patterns::Result<()> {
    // 8 LEDs draw 480 mA at full white.
    let mut strip = LedStrip::<_, 8>::new(Recorder::default(), Gamma::Linear, Current::Milliamps(240));
    strip.leds().fill(RGB8::new(255, 0, 0));
    strip.show()?;

    assert_eq!(strip.writer().0[0][0], RGB8::new(127, 0, 0));
    Ok(())
}

#[test]
fn gamma_and_brightness_apply_on_show_only() -> neo_patterns::Result<()> {
    let mut strip = LedStrip::<_, 2>::new(Recorder::default(), Gamma::Gamma2_2, Current::Unlimited);
    strip.leds()[0] = RGB8::new(128, 255, 0);
    strip.show()?;
    let corrected = generate_combo_table(Gamma::Gamma2_2, 255)[128];
    assert_eq!(strip.writer().0[0][0], RGB8::new(corrected, 255, 0));
    assert_eq!(strip.frame()[0], RGB8::new(128, 255, 0));

    strip.set_brightness(128);
    strip.show()?;
    assert_eq!(strip.writer().0[1][0].g, 128);
    Ok(())
}

#[test]
fn update_shows_only_changed_frames() -> neo_patterns::Result<()> {
    let mut strip = LedStrip::<_, 2>::new(Recorder::default(), Gamma::Linear, Current::Unlimited);
    let mut patterns = NeoPatterns::<2>::new(0);
    patterns.start(Pattern::Delay {
        duration: Duration::from_millis(10),
    })?;
    assert_eq!(strip.update(&mut patterns, &mut (), Instant::from_millis(0))?, Update::Unchanged);
    assert!(strip.writer().0.is_empty());

    patterns.start(wipe(RGB8::new(9, 0, 0)))?;
    assert_eq!(strip.update(&mut patterns, &mut (), Instant::from_millis(0))?, Update::Drawn);
    assert_eq!(strip.writer().0, [vec![RGB8::new(9, 0, 0), BLACK]]);
    Ok(())
}

#[test]
fn segments_share_one_show() -> neo_patterns::Result<()> {
    let mut strip = LedStrip::<_, 4>::new(Recorder::default(), Gamma::Linear, Current::Unlimited);
    let mut lower = (NeoPatterns::<2>::new(0), ());
    let mut upper = (NeoPatterns::<2>::new(2), ());
    lower.0.start(wipe(RGB8::new(1, 0, 0)))?;
    upper.0.start(wipe(RGB8::new(2, 0, 0)))?;

    let changed = strip.update_all(&mut [&mut lower, &mut upper], Instant::from_millis(0))?;
    assert!(changed);
    assert_eq!(
        strip.writer().0,
        [vec![RGB8::new(1, 0, 0), BLACK, RGB8::new(2, 0, 0), BLACK]]
    );

    let changed = strip.update_all(&mut [&mut lower, &mut upper], Instant::from_millis(5))?;
    assert!(!changed);
    assert_eq!(strip.writer().0.len(), 1);

    LedStrip::<Recorder, 4>::stop_all(&mut [&mut lower, &mut upper]);
    assert!(!lower.is_active());
    assert!(!upper.is_active());
    Ok(())
}

#[test]
fn driver_errors_are_reported() {
    let mut strip = LedStrip::<_, 2>::new(Broken, Gamma::Linear, Current::Unlimited);
    assert_eq!(strip.show(), Err(Error::LedWrite));
}

#[test]
fn run_stops_on_the_first_driver_error() -> neo_patterns::Result<()> {
    let mut strip = LedStrip::<_, 2>::new(Broken, Gamma::Linear, Current::Unlimited);
    let mut patterns = NeoPatterns::<2>::new(0);
    patterns.start(wipe(RGB8::new(3, 0, 0)))?;
    let commands = StripCommandSignal::new();

    let result = embassy_futures::block_on(strip.run(&mut patterns, &mut (), &commands));
    assert_eq!(result, Err(Error::LedWrite));
    Ok(())
}

#[test]
fn current_budget_never_exceeds_full_brightness() {
    assert_eq!(Current::Milliamps(2000).max_brightness(960), 255);
    assert_eq!(Current::Milliamps(250).max_brightness(0), 255);
    assert_eq!(Current::Unlimited.max_brightness(960), 255);
}

#[test]
fn run_ignores_rejected_patterns() {
    let mut strip = LedStrip::<_, 2>::new(RecordThenFail::default(), Gamma::Linear, Current::Unlimited);
    let mut patterns = NeoPatterns::<2>::new(0);
    let commands = StripCommandSignal::new();

    let send = async {
        commands.signal(StripCommand::Start(Pattern::ProcessSelectiveColor {
            selected: BLACK,
            process: ColorProcess::Dim,
            steps: 0,
            interval: Duration::from_millis(10),
        }));
        embassy_futures::yield_now().await;
        commands.signal(StripCommand::Start(wipe(RGB8::new(3, 0, 0))));
    };
    let (result, ()) = embassy_futures::block_on(embassy_futures::join::join(
        strip.run(&mut patterns, &mut (), &commands),
        send,
    ));

    // The wipe's first frame reached the driver, whose error ends the loop.
    assert_eq!(result, Err(Error::LedWrite));
    assert_eq!(strip.writer().0, [vec![RGB8::new(3, 0, 0), BLACK]]);
}
