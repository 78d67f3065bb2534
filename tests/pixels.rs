#![cfg(feature = "host")]
//! Host-level tests for pixel access and color helpers.

use neo_patterns::color::{
    BLACK, RGB8, Rgb888, ToRgb8, ToRgb888, blend, brighten, dim, dim_color_with_gamma_32,
    heat_color, heat_color_gamma_32, wheel,
};
use neo_patterns::led_strip::{Gamma, generate_combo_table};
use neo_patterns::pixels::Pixels;

#[test]
fn set_and_get_ignore_out_of_range() {
    let mut leds = [BLACK; 4];
    let mut pixels = Pixels::new(&mut leds);
    pixels.set(1, RGB8::new(1, 2, 3));
    pixels.set(4, RGB8::new(9, 9, 9));
    pixels.set_clipped(-1, RGB8::new(9, 9, 9));

    assert_eq!(pixels.get(1), RGB8::new(1, 2, 3));
    assert_eq!(pixels.get(4), BLACK);
    assert_eq!(leds, [BLACK, RGB8::new(1, 2, 3), BLACK, BLACK]);
}

#[test]
fn brightness_scales_on_write() {
    let mut leds = [BLACK; 2];
    let mut pixels = Pixels::with_brightness(&mut leds, 128, false);
    pixels.set(0, RGB8::new(255, 64, 0));
    pixels.set(1, RGB8::new(1, 0, 2));

    assert_eq!(leds, [RGB8::new(128, 32, 0), RGB8::new(1, 0, 1)]);
}

#[test]
fn keep_nonzero_keeps_dim_colors_visible() {
    let mut leds = [BLACK; 3];
    let mut pixels = Pixels::with_brightness(&mut leds, 64, true);
    pixels.set(0, RGB8::new(1, 0, 0));
    pixels.set(1, RGB8::new(0, 1, 1));
    pixels.set(2, BLACK);

    assert_eq!(leds, [RGB8::new(1, 0, 0), RGB8::new(0, 1, 0), BLACK]);
}

#[test]
fn add_saturates_each_channel() {
    let mut leds = [BLACK; 1];
    let mut pixels = Pixels::new(&mut leds);
    pixels.set(0, RGB8::new(200, 0, 10));
    pixels.add(0, RGB8::new(100, 10, 0));

    assert_eq!(leds[0], RGB8::new(255, 10, 10));
}

#[test]
fn bars_grow_from_either_end() {
    let mut leds = [BLACK; 5];
    let mut pixels = Pixels::new(&mut leds);
    let color = RGB8::new(0, 9, 0);
    pixels.draw_bar(2, color, true);
    assert_eq!(pixels.as_slice(), &[color, color, BLACK, BLACK, BLACK]);

    pixels.draw_bar(2, color, false);
    assert_eq!(pixels.as_slice(), &[BLACK, BLACK, BLACK, color, color]);
}

#[test]
fn bar_from_colors_lists_colors_from_the_top() {
    let mut leds = [BLACK; 3];
    let mut pixels = Pixels::new(&mut leds);
    let colors = [RGB8::new(3, 0, 0), RGB8::new(2, 0, 0), RGB8::new(1, 0, 0)];
    pixels.draw_bar_from_colors(2, &colors, true);

    assert_eq!(leds, [RGB8::new(1, 0, 0), RGB8::new(2, 0, 0), BLACK]);
}

#[test]
fn fill_region_needs_the_whole_region() {
    let mut leds = [BLACK; 4];
    let mut pixels = Pixels::new(&mut leds);
    let color = RGB8::new(5, 5, 5);
    pixels.fill_region(color, 3, 2);
    assert_eq!(pixels.as_slice(), &[BLACK; 4]);

    pixels.fill_region(color, 1, 2);
    assert_eq!(pixels.as_slice(), &[BLACK, color, color, BLACK]);
}

#[test]
fn rainbow_spreads_one_wheel_turn() {
    let mut leds = [BLACK; 4];
    Pixels::new(&mut leds).rainbow(0, false);
    assert_eq!(leds, [wheel(0), wheel(64), wheel(128), wheel(192)]);

    Pixels::new(&mut leds).rainbow(0, true);
    assert_eq!(leds, [wheel(192), wheel(128), wheel(64), wheel(0)]);
}

#[test]
fn resolution_test_lights_ten_levels_per_channel() {
    let mut leds = [BLACK; 30];
    Pixels::new(&mut leds).test_resolution();

    assert_eq!(leds[0], RGB8::new(1, 0, 0));
    assert_eq!(leds[9], RGB8::new(255, 0, 0));
    assert_eq!(leds[10], RGB8::new(0, 1, 0));
    assert_eq!(leds[29], RGB8::new(0, 0, 255));
}

#[test]
fn wheel_visits_the_primaries() {
    assert_eq!(wheel(0), RGB8::new(255, 0, 0));
    assert_eq!(wheel(85), RGB8::new(0, 255, 0));
    assert_eq!(wheel(170), RGB8::new(0, 0, 255));
}

#[test]
fn dim_and_brighten_halve_and_double() {
    assert_eq!(dim(RGB8::new(255, 3, 0)), RGB8::new(127, 1, 0));
    assert_eq!(brighten(RGB8::new(200, 3, 0)), RGB8::new(255, 6, 0));
}

#[test]
fn gamma_dimming_keeps_full_brightness() {
    let color = RGB8::new(255, 128, 0);
    assert_eq!(dim_color_with_gamma_32(color, 255, false), RGB8::new(255, 128, 0));
    assert_eq!(dim_color_with_gamma_32(color, 0, false), BLACK);
    assert_eq!(dim_color_with_gamma_32(color, 3, true), RGB8::new(1, 0, 0));
}

#[test]
fn blend_clamps_the_step() {
    let from = RGB8::new(0, 100, 200);
    let to = RGB8::new(100, 100, 0);
    assert_eq!(blend(from, to, 1, 2), RGB8::new(50, 100, 100));
    assert_eq!(blend(from, to, 5, 2), to);
    assert_eq!(blend(from, to, -1, 2), from);
}

#[test]
fn rgb888_and_rgb8_convert_both_ways() {
    let rgb8_color = RGB8::new(16, 32, 48);
    let rgb888_color = Rgb888::new(16, 32, 48);

    assert_eq!(rgb888_color.to_rgb8(), rgb8_color);
    assert_eq!(rgb8_color.to_rgb888(), rgb888_color);
    assert_eq!(rgb888_color.to_rgb888(), rgb888_color);
}

#[test]
fn heat_ramps_use_the_strip_gamma() {
    let gamma = generate_combo_table(Gamma::Gamma2_2, 255);
    assert_eq!(heat_color(0), BLACK);
    assert_eq!(heat_color(64), RGB8::new(gamma[192], 0, 0));
    assert_eq!(heat_color(128), RGB8::new(255, gamma[128], 0));
    assert_eq!(heat_color(255), RGB8::new(255, 255, gamma[252]));
    assert_eq!(heat_color_gamma_32(128), RGB8::new(255, 13, 0));
}
