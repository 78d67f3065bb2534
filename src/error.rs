use core::convert::Infallible;

use derive_more::derive::{Display, Error};

use crate::patterns::PatternKind;

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[expect(missing_docs, reason = "The variants are self-explanatory.")]
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[display("Writing to the LED driver failed")]
    LedWrite,

    #[display("Segment at offset {offset} with {len} LEDs does not fit a buffer of {strip_len} LEDs")]
    SegmentOutOfRange {
        offset: usize,
        len: usize,
        strip_len: usize,
    },

    #[display("{_0} needs at least one step")]
    ZeroSteps(#[error(not(source))] PatternKind),

    #[display("{_0} needs a length of at least one")]
    ZeroLength(#[error(not(source))] PatternKind),

    #[display("{kind} of length {length} does not fit {leds} LEDs")]
    LengthTooLarge {
        kind: PatternKind,
        length: usize,
        leds: usize,
    },

    #[display("{kind} needs a matrix of at least {width}x{height}")]
    MatrixTooSmall {
        kind: PatternKind,
        width: usize,
        height: usize,
    },
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
