//! Non-blocking animated patterns for NeoPixel-style LED strips and matrices.
//!
//! Pattern engines draw into a caller-owned `[RGB8]` buffer. Call
//! [`update`](patterns::PatternEngine::update) as often as you like: it only
//! steps a pattern when its interval has passed, and returns whether the LEDs
//! need a refresh. When a pattern completes, a completion handler chooses
//! what runs next.
//!
//! - [`patterns`]: the strip engine [`NeoPatterns`](patterns::NeoPatterns) and its patterns.
//! - [`combined`]: completion handlers that chain patterns into shows.
//! - [`matrix`] and [`matrix_patterns`]: drawing and patterns on LED matrices.
//! - [`snake`]: the snake game, played with buttons or by a solver.
//! - [`led_strip`]: gamma correction, current limiting and output through `smart_leds`.
//! - [`hex_dump`]: hex dumps of byte buffers.
//!
//! # Glossary
//!
//! - **Segment:** a run of LEDs inside a longer strip, driven by its own engine.
//! - **Step:** one advance of a pattern, done once per interval.
//! - **Completion handler:** an [`OnPatternComplete`](patterns::OnPatternComplete)
//!   called when a pattern finishes, typically starting the next one.
#![cfg_attr(not(feature = "host"), no_std)]

pub mod color;
pub mod combined;
mod error;
pub mod hex_dump;
pub mod led_strip;
pub mod matrix;
pub mod matrix_patterns;
pub mod patterns;
pub mod pixels;
pub mod snake;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
