//! Hex dumps of byte buffers, one line per `bytes_per_line` bytes.
//!
//! ```text
//! 0x0000:  0xF1 0x81 0x82 0x00 0x08 0x02 0x00 0x27 0xFF 0xFF 0x0E 0xB3  ... .. '  ..
//! ```
//!
//! # Example
//!
//! ```rust
//! use neo_patterns::hex_dump::{HexDump, HexDumpFormat};
//!
//! let text = HexDump::new(b"AB\0", 16, HexDumpFormat::BUFFER_AND_ASCII).to_string();
//! assert_eq!(text, " 0x00:  0x41 0x42 0x00  AB \n");
//! ```

use core::fmt::{self, Write};

/// Bytes per line of the usual dump.
pub const BYTES_PER_LINE: usize = 16;

/// What starts each line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HexDumpAddress {
    /// Nothing, the line starts with the first byte.
    None,
    /// Offset into the buffer as ` 0xNN`, wrapping after 255.
    Relative8,
    /// Offset into the buffer as `0xNNNN`.
    #[default]
    Relative16,
    /// `base` plus the offset as `0xNNNN`, e.g. the buffer's memory address.
    Absolute16 {
        /// Address of the first byte.
        base: u16,
    },
}

/// Layout of a hex dump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HexDumpFormat {
    /// Address column.
    pub address: HexDumpAddress,
    /// Append the bytes as text: printable ASCII as is, `0x00` and `0xFF` as
    /// space and everything else as `.`.
    pub ascii: bool,
}

impl HexDumpFormat {
    /// Hex bytes only.
    pub const BUFFER: Self = Self {
        address: HexDumpAddress::None,
        ascii: false,
    };
    /// Short relative address and hex bytes.
    pub const BUFFER_DUMP: Self = Self {
        address: HexDumpAddress::Relative8,
        ascii: false,
    };
    /// Short relative address, hex bytes and text.
    pub const BUFFER_AND_ASCII: Self = Self {
        address: HexDumpAddress::Relative8,
        ascii: true,
    };

    /// Absolute 16 bit addresses starting at `base`, hex bytes and text.
    #[must_use]
    pub const fn memory(base: u16) -> Self {
        Self {
            address: HexDumpAddress::Absolute16 { base },
            ascii: true,
        }
    }
}

/// Write `bytes` to `out`, `bytes_per_line` to a line; the last line may be
/// shorter. Every line ends with `\n`. Nothing is written for
/// `bytes_per_line == 0`.
///
/// # Errors
///
/// Returns the first error of `out`.
pub fn hex_dump(
    out: &mut impl Write,
    bytes: &[u8],
    bytes_per_line: usize,
    format: HexDumpFormat,
) -> fmt::Result {
    if bytes_per_line == 0 {
        return Ok(());
    }
    for (line_index, line) in bytes.chunks(bytes_per_line).enumerate() {
        let offset = line_index * bytes_per_line;
        match format.address {
            HexDumpAddress::None => {}
            HexDumpAddress::Relative8 => {
                write_byte(out, offset as u8)?;
                out.write_str(": ")?;
            }
            HexDumpAddress::Relative16 => write!(out, "0x{:04X}: ", offset as u16)?,
            HexDumpAddress::Absolute16 { base } => {
                write!(out, "0x{:04X}: ", base.wrapping_add(offset as u16))?;
            }
        }
        for &byte in line {
            write_byte(out, byte)?;
        }
        if format.ascii {
            out.write_str("  ")?;
            for &byte in line {
                out.write_char(ascii_char(byte))?;
            }
        }
        out.write_char('\n')?;
    }
    Ok(())
}

/// Write ` 0xNN`.
///
/// # Errors
///
/// Returns the error of `out`.
pub fn write_byte(out: &mut impl Write, byte: u8) -> fmt::Result {
    write!(out, " 0x{byte:02X}")
}

const fn ascii_char(byte: u8) -> char {
    match byte {
        b' '..=b'~' => byte as char,
        0x00 | 0xFF => ' ',
        _ => '.',
    }
}

/// A hex dump that formats with `{}`, for `write!` and logging.
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a> {
    bytes: &'a [u8],
    bytes_per_line: usize,
    format: HexDumpFormat,
}

impl<'a> HexDump<'a> {
    /// Dump `bytes` as [`hex_dump`] would.
    #[must_use]
    pub const fn new(bytes: &'a [u8], bytes_per_line: usize, format: HexDumpFormat) -> Self {
        Self {
            bytes,
            bytes_per_line,
            format,
        }
    }
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex_dump(f, self.bytes, self.bytes_per_line, self.format)
    }
}
