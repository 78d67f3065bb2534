use embassy_time::Duration;
use smart_leds::RGB8;

use super::{ColorProcess, Direction, NeoPatterns, Pattern, Phase, ScannerMode, Step};
use crate::color::{
    BLACK, blend, brighten, dim, dim_color_with_gamma_32, heat_color, is_black,
};
use crate::pixels::Pixels;

/// Cooling of the strip fire; higher values give shorter flames.
const COOLING: usize = 40;
/// Chance (out of 256) of a new spark per step.
const SPARKING: u8 = 120;

/// Square root that treats negative input as zero.
pub(crate) fn sqrt(value: f32) -> f32 {
    libm::sqrtf(value.max(0.0))
}

/// `factor` times `base`, at microsecond resolution.
pub(crate) fn ball_interval(factor: f32, base: Duration) -> Duration {
    Duration::from_micros((factor.max(0.0) * base.as_micros() as f32) as u64)
}

impl<const N: usize> NeoPatterns<N> {
    /// Run one step of the active strip pattern on `leds`, which holds the
    /// `N` LEDs of this segment.
    pub(crate) fn step_segment(&mut self, leds: &mut [RGB8], phase: Phase) -> Step {
        let Some(pattern) = self.pattern else {
            return Step::Unchanged;
        };
        let mut pixels = Pixels::with_brightness(leds, self.brightness(), self.keep_nonzero);
        let advance = phase == Phase::Advance;
        match pattern {
            Pattern::RainbowCycle { .. } => {
                if advance {
                    if let Some(end) = self.state.count_down_and_move() {
                        return end;
                    }
                }
                pixels.rainbow((self.state.index & 0xFF) as u8, false);
                Step::Drawn
            }
            Pattern::ColorWipe { color, clear, .. } => {
                if advance {
                    if let Some(end) = self.state.count_down_and_move() {
                        return end;
                    }
                }
                self.draw_color_wipe(&mut pixels, color, clear);
                Step::Drawn
            }
            Pattern::Fade { from, to, steps, .. } => {
                if advance {
                    if let Some(end) = self.state.count_down_and_move() {
                        return end;
                    }
                }
                pixels.fill(blend(from, to, self.state.index, i32::from(steps)));
                Step::Drawn
            }
            Pattern::Delay { .. } => {
                if advance {
                    if let Some(end) = self.state.count_down() {
                        return end;
                    }
                }
                Step::Unchanged
            }
            Pattern::Scanner {
                color,
                length,
                mode,
                ..
            } => self.scanner(&mut pixels, phase, color, i32::from(length), mode),
            Pattern::Stripes {
                color1,
                length1,
                color2,
                length2,
                ..
            } => {
                let length1 = i32::from(length1);
                let period = length1 + i32::from(length2);
                if advance {
                    if let Some(end) = self.state.count_down() {
                        return end;
                    }
                    let state = &mut self.state;
                    if state.direction == Direction::Up {
                        state.index += 1;
                        if state.index >= period {
                            state.index = 0;
                        }
                    } else {
                        state.index -= 1;
                        if state.index < 0 {
                            state.index = period - 1;
                        }
                    }
                }
                let mut running = self.state.index;
                for position in 0..pixels.len() {
                    pixels.set(position, if running < length1 { color1 } else { color2 });
                    running += 1;
                    if running >= period {
                        running = 0;
                    }
                }
                Step::Drawn
            }
            Pattern::Flash {
                color1,
                interval1,
                color2,
                interval2,
                end_with_black,
                ..
            } => {
                if advance {
                    if let Some(end) = self.state.count_down() {
                        return end;
                    }
                    self.state.index -= 1;
                }
                if self.state.index & 0x01 == 0 {
                    pixels.fill(color1);
                    self.scheduler.set_interval(interval1);
                } else {
                    let last = self.state.index == 1 && end_with_black;
                    pixels.fill(if last { BLACK } else { color2 });
                    self.scheduler.set_interval(interval2);
                }
                Step::Drawn
            }
            Pattern::ProcessSelectiveColor {
                selected, process, ..
            } => match phase {
                // The processed pixels cannot be restored.
                Phase::Redraw => Step::Unchanged,
                Phase::Start => {
                    self.process_selected_color(&mut pixels, selected, process);
                    Step::Drawn
                }
                Phase::Advance => {
                    if let Some(end) = self.state.count_down() {
                        return end;
                    }
                    self.process_selected_color(&mut pixels, selected, process);
                    Step::Drawn
                }
            },
            Pattern::Heartbeat {
                color,
                clear_at_end,
                ..
            } => self.heartbeat(&mut pixels, advance, color, clear_at_end),
            Pattern::Fire { .. } => {
                if phase == Phase::Start {
                    pixels.clear();
                }
                if advance {
                    if let Some(end) = self.state.count_down() {
                        return end;
                    }
                    self.heat_fire();
                }
                let up = self.state.direction == Direction::Up;
                for (position, heat) in self.heat.iter().enumerate() {
                    let target = if up { position } else { N - 1 - position };
                    pixels.set(target, heat_color(*heat));
                }
                Step::Drawn
            }
            Pattern::BouncingBall {
                color,
                loss_percent,
                ..
            } => self.bouncing_ball(&mut pixels, advance, color, loss_percent),
            Pattern::MovingPixel {
                color, background, ..
            } => {
                if phase == Phase::Start {
                    pixels.fill(background);
                    return Step::Drawn;
                }
                if advance {
                    if let Some(end) = self.state.count_down_and_move() {
                        return end;
                    }
                }
                for position in 0..pixels.len() {
                    let on = position as i32 == self.state.index;
                    pixels.set(position, if on { color } else { background });
                }
                Step::Drawn
            }
            Pattern::BouncingPixel { color, .. } => {
                if phase == Phase::Start {
                    pixels.clear();
                    return Step::Drawn;
                }
                if advance {
                    pixels.set_clipped(self.state.index, BLACK);
                    if let Some(end) = self.state.count_down_and_move() {
                        return end;
                    }
                    let last = pixels.len() as i32 - 1;
                    let state = &mut self.state;
                    // Turn without showing the end pixels twice.
                    if state.direction == Direction::Up && state.index == last {
                        state.direction = Direction::Down;
                    } else if state.direction == Direction::Down && state.index == 0 {
                        state.direction = Direction::Up;
                    }
                }
                if self.state.total_steps != 1 {
                    pixels.set_clipped(self.state.index, color);
                }
                Step::Drawn
            }
        }
    }

    fn draw_color_wipe(&self, pixels: &mut Pixels<'_>, color: RGB8, clear: bool) {
        let index = self.state.index;
        let up = self.state.direction == Direction::Up;
        for position in 0..pixels.len() {
            let signed = position as i32;
            if (up && signed <= index) || (!up && signed >= index) {
                pixels.set(position, color);
            } else if clear {
                pixels.set(position, BLACK);
            }
        }
    }

    fn scanner(
        &mut self,
        pixels: &mut Pixels<'_>,
        phase: Phase,
        color: RGB8,
        length: i32,
        mode: ScannerMode,
    ) -> Step {
        let n = pixels.len() as i32;
        let cylon = mode.contains(ScannerMode::CYLON);
        let both_ends = mode.contains(ScannerMode::START_AT_BOTH_ENDS);
        let advance = phase == Phase::Advance;

        if phase == Phase::Start && self.state.clear_on_start {
            pixels.clear();
        }
        if advance {
            if let Some(end) = self.state.count_down_and_move() {
                return end;
            }
            let state = &mut self.state;
            if state.repetitions > 0 {
                if state.direction == Direction::Up {
                    // The last pixel was still drawn in the old direction.
                    if state.index == n {
                        state.index -= 2;
                        state.direction = Direction::Down;
                        state.repetitions = state.repetitions.saturating_sub(1);
                    }
                    if cylon && state.index + length == n + 1 {
                        state.index -= 2;
                        state.direction = Direction::Down;
                        state.repetitions = state.repetitions.saturating_sub(1);
                    }
                } else {
                    if state.index < 0 || state.index > n {
                        state.index = 1;
                        state.direction = Direction::Up;
                        state.repetitions = state.repetitions.saturating_sub(1);
                    }
                    if cylon && state.index - (length - 2) == 0 {
                        state.index = length;
                        state.direction = Direction::Up;
                        state.repetitions = state.repetitions.saturating_sub(1);
                    }
                }
            }
        }

        let index = self.state.index;
        let up = self.state.direction == Direction::Up;
        let delta = self.state.brightness_delta;
        let mut brightness: u32 = 0xFFFF;
        let mut drawn = 0;
        while drawn < length {
            let dimmed = dim_color_with_gamma_32(color, (brightness >> 8).min(255) as u8, false);
            // A black tail would overwrite whatever is behind the scanner.
            if is_black(dimmed) {
                break;
            }
            let offset = if up { drawn } else { -drawn };
            let position = index - offset;
            pixels.set_clipped(position, dimmed);
            if both_ends {
                pixels.set_clipped((n - 1) - position, dimmed);
            }
            if cylon {
                let mirrored = index + offset;
                pixels.set_clipped(mirrored, dimmed);
                if both_ends {
                    pixels.set_clipped((n - 1) - mirrored, dimmed);
                }
            }
            brightness = brightness.saturating_sub(delta);
            drawn += 1;
        }

        if advance {
            // Clear the pixel the tail just left.
            let tail = if up { index - drawn } else { index + drawn };
            if both_ends {
                let apart = if up {
                    index - drawn / 2 <= (n - 1) / 2 || tail >= n / 2
                } else {
                    index + drawn / 2 >= n / 2 || tail <= (n - 1) / 2
                };
                if apart {
                    pixels.set_clipped((n - 1) - tail, BLACK);
                    pixels.set_clipped(tail, BLACK);
                }
            } else {
                pixels.set_clipped(tail, BLACK);
            }
        }
        Step::Drawn
    }

    fn process_selected_color(&mut self, pixels: &mut Pixels<'_>, selected: RGB8, process: ColorProcess) {
        let current = self.state.color_tmp;
        let processed = match process {
            ColorProcess::Dim => dim(current),
            ColorProcess::Brighten => brighten(current),
            ColorProcess::FadeTo(target) => {
                self.state.index += 1;
                blend(selected, target, self.state.index, self.state.fade_steps)
            }
            ColorProcess::Custom(function) => function(current),
        };
        // Pixels hold the scaled color, the state tracks the unscaled one.
        let stored = pixels.scale(current);
        for position in 0..pixels.len() {
            if pixels.get(position) == stored {
                pixels.set(position, processed);
            }
        }
        self.state.color_tmp = processed;
    }

    fn heartbeat(&mut self, pixels: &mut Pixels<'_>, mut advance: bool, color: RGB8, clear_at_end: bool) -> Step {
        loop {
            if advance {
                if let Some(end) = self.state.count_down() {
                    return end;
                }
                let state = &mut self.state;
                // The brightest and the darkest level show twice.
                if state.direction == Direction::Up {
                    if state.index >= 248 {
                        state.direction = Direction::Down;
                    } else {
                        state.index += 16;
                    }
                } else if state.index <= 8 {
                    state.direction = Direction::Up;
                } else {
                    state.index -= 16;
                }
            }
            if self.state.total_steps == 1 && clear_at_end {
                pixels.clear();
                return Step::Drawn;
            }
            let dimmed = dim_color_with_gamma_32(color, self.state.index.clamp(0, 255) as u8, false);
            if !is_black(dimmed) {
                pixels.fill(dimmed);
                return Step::Drawn;
            }
            // Skip levels that are black for this color.
            advance = true;
        }
    }

    fn heat_fire(&mut self) {
        let max_chill = (COOLING * 20 / N + 2) as u32;
        for heat in &mut self.heat {
            let chill = self.rng.u32(0..max_chill).min(255) as u8;
            *heat = heat.saturating_sub(chill);
        }
        // Heat drifts up and diffuses a little.
        for k in (2..N).rev() {
            let below = u16::from(self.heat[k - 1]) + 2 * u16::from(self.heat[k - 2]);
            self.heat[k] = (below / 3) as u8;
        }
        let random = self.rng.u32(..);
        if (random as u8) < SPARKING {
            let position = ((random >> 16) as usize) % (N / 4).max(1);
            let spark = ((u16::from((random >> 8) as u8) * (255 - 160)) >> 8) as u8 + 160;
            self.heat[position] = self.heat[position].saturating_add(spark);
        }
    }

    fn bouncing_ball(&mut self, pixels: &mut Pixels<'_>, advance: bool, color: RGB8, loss_percent: u8) -> Step {
        let mut draw_index = self.state.index;
        if advance {
            pixels.set_clipped(self.state.index, BLACK);
            if let Some(end) = self.state.count_down_and_move() {
                return end;
            }
            let state = &mut self.state;
            draw_index = state.index;
            state.total_steps = 2;
            let distance = state.top - state.index as f32;
            let factor = if state.direction == Direction::Up {
                if state.index == state.top_index {
                    // Show the top pixel twice, for the way up to the exact top and back.
                    state.direction = Direction::Down;
                    state.index += 1;
                    2.0 * sqrt(state.top - state.top_index as f32)
                } else {
                    sqrt(distance) - sqrt(distance - 1.0)
                }
            } else if state.index != 0 {
                sqrt(distance + 1.0) - sqrt(distance)
            } else {
                state.direction = Direction::Up;
                let kept = f32::from(100 - loss_percent.min(100)) / 100.0;
                state.top = (state.top + 1.0) * kept - 1.0;
                state.top_index = state.top.max(0.0) as i32;
                if state.top_index < 1 {
                    state.total_steps = 1;
                }
                sqrt(state.top) - sqrt(state.top - 1.0)
            };
            let interval = ball_interval(factor, state.base_interval);
            self.scheduler.set_interval(interval);
        }
        pixels.set_clipped(draw_index, color);
        Step::Drawn
    }
}
