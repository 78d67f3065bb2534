//! PNG previews of strip and matrix frames, for the host.
//!
//! Every LED becomes a soft round dot on a black panel. Colors are taken
//! through an inverse gamma so the preview looks like the LEDs do.
#![cfg(feature = "host")]

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use smart_leds::RGB8;

use crate::led_strip::Frame1d;
use crate::matrix::Frame2d;

/// Inverse gamma used by the functions without a `_with_gamma` suffix.
pub const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

type PreviewResult = Result<(), Box<dyn Error>>;

/// Render a matrix frame into a PNG whose larger side is at most
/// `target_max_dimension` pixels.
///
/// # Errors
///
/// Returns an error if the size is zero or the file cannot be written.
pub fn write_frame_png<const W: usize, const H: usize>(
    frame: &Frame2d<W, H>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> PreviewResult {
    write_frame_png_with_gamma(frame, output_path, target_max_dimension, PREVIEW_INVERSE_GAMMA)
}

/// Like [`write_frame_png`] with a chosen inverse gamma; 1.0 shows the raw values.
///
/// # Errors
///
/// Returns an error if the size or gamma is not positive or the file cannot be written.
pub fn write_frame_png_with_gamma<const W: usize, const H: usize>(
    frame: &Frame2d<W, H>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    inverse_gamma: f32,
) -> PreviewResult {
    let preview = Preview::new(W as u32, H as u32, target_max_dimension, inverse_gamma)?;
    let image = preview.render(frame);
    write_png(output_path.as_ref(), &preview, &[image], None)
}

/// Render a strip frame as one row of dots.
///
/// # Errors
///
/// Returns an error if the size is zero or the file cannot be written.
pub fn write_strip_png<const N: usize>(
    frame: &Frame1d<N>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> PreviewResult {
    write_frame_png(&Frame2d::<N, 1>([frame.0]), output_path, target_max_dimension)
}

/// Render matrix frames into a looping animated PNG, each frame shown for
/// `frame_delay_ms`.
///
/// # Errors
///
/// Returns an error if `frames` is empty, the delay does not fit 1..=65535 ms
/// or the file cannot be written.
pub fn write_frames_apng<const W: usize, const H: usize>(
    frames: &[Frame2d<W, H>],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u32,
) -> PreviewResult {
    write_frames_apng_with_gamma(
        frames,
        output_path,
        target_max_dimension,
        frame_delay_ms,
        PREVIEW_INVERSE_GAMMA,
    )
}

/// Like [`write_frames_apng`] with a chosen inverse gamma.
///
/// # Errors
///
/// Same as [`write_frames_apng`], plus a gamma that is not positive.
pub fn write_frames_apng_with_gamma<const W: usize, const H: usize>(
    frames: &[Frame2d<W, H>],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u32,
    inverse_gamma: f32,
) -> PreviewResult {
    if frames.is_empty() {
        return Err("an animation needs at least one frame".into());
    }
    let delay_ms = u16::try_from(frame_delay_ms)?;
    if delay_ms == 0 {
        return Err("frame delay must be positive".into());
    }
    let preview = Preview::new(W as u32, H as u32, target_max_dimension, inverse_gamma)?;
    let images: Vec<Vec<u8>> = frames.iter().map(|frame| preview.render(frame)).collect();
    write_png(output_path.as_ref(), &preview, &images, Some(delay_ms))
}

/// Dot geometry of one preview.
struct Preview {
    columns: u32,
    rows: u32,
    cell_size: u32,
    radius: u32,
    inverse_gamma: f32,
}

impl Preview {
    fn new(columns: u32, rows: u32, target_max_dimension: u32, inverse_gamma: f32) -> Result<Self, Box<dyn Error>> {
        if target_max_dimension == 0 {
            return Err("target size must be positive".into());
        }
        if inverse_gamma <= 0.0 {
            return Err("inverse gamma must be positive".into());
        }
        // Largest cell whose panel, border included, fits the target size.
        let mut cell_size = target_max_dimension.max(4);
        while cell_size > 4 {
            let radius = Self::radius_for(cell_size);
            let size = columns.max(rows) * cell_size + radius * 2;
            if size <= target_max_dimension {
                break;
            }
            cell_size -= 1;
        }
        Ok(Self {
            columns,
            rows,
            cell_size,
            radius: Self::radius_for(cell_size),
            inverse_gamma,
        })
    }

    const fn radius_for(cell_size: u32) -> u32 {
        let margin = if cell_size / 8 > 1 { cell_size / 8 } else { 1 };
        (cell_size - margin * 2) / 2
    }

    const fn width(&self) -> u32 {
        self.columns * self.cell_size + self.radius * 2
    }

    const fn height(&self) -> u32 {
        self.rows * self.cell_size + self.radius * 2
    }

    /// Dot brightness at `distance_sq` from the center, 0.0 outside the dot.
    fn intensity(&self, distance_sq: i32) -> f32 {
        let radius = self.radius as f32;
        let fade = (self.radius / 3).max(1) as f32;
        let distance = (distance_sq as f32).sqrt();
        if distance > radius {
            0.0
        } else if distance <= radius - fade {
            1.0
        } else {
            ((radius - distance) / fade).max(0.0)
        }
    }

    /// 16 bit RGB samples, big endian, row by row.
    fn render<const W: usize, const H: usize>(&self, frame: &Frame2d<W, H>) -> Vec<u8> {
        let width = self.width() as usize;
        let mut bytes = vec![0u8; width * self.height() as usize * 6];
        let center = (self.cell_size as i32 - 1) / 2;
        for (row_index, row) in frame.0.iter().enumerate() {
            for (column_index, &led) in row.iter().enumerate() {
                let left = self.radius as usize + column_index * self.cell_size as usize;
                let top = self.radius as usize + row_index * self.cell_size as usize;
                for local_y in 0..self.cell_size as i32 {
                    for local_x in 0..self.cell_size as i32 {
                        let (dx, dy) = (local_x - center, local_y - center);
                        let intensity = self.intensity(dx * dx + dy * dy);
                        if intensity <= 0.0 {
                            continue;
                        }
                        let offset = ((top + local_y as usize) * width + left + local_x as usize) * 6;
                        self.put(&mut bytes[offset..offset + 6], led, intensity);
                    }
                }
            }
        }
        bytes
    }

    fn put(&self, sample: &mut [u8], led: RGB8, intensity: f32) {
        for (channel, value) in sample.chunks_exact_mut(2).zip([led.r, led.g, led.b]) {
            let linear = (f32::from(value) / 255.0).powf(self.inverse_gamma) * intensity;
            channel.copy_from_slice(&((linear.clamp(0.0, 1.0) * 65535.0).round() as u16).to_be_bytes());
        }
    }
}

fn write_png(output_path: &Path, preview: &Preview, images: &[Vec<u8>], delay_ms: Option<u16>) -> PreviewResult {
    if let Some(parent) = output_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), preview.width(), preview.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    if delay_ms.is_some() {
        encoder.set_animated(u32::try_from(images.len())?, 0)?;
    }
    let mut writer = encoder.write_header()?;
    for image in images {
        if let Some(delay_ms) = delay_ms {
            writer.set_frame_delay(delay_ms, 1000)?;
        }
        writer.write_image_data(image)?;
    }
    writer.finish()?;
    Ok(())
}
