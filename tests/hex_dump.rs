#![cfg(feature = "host")]
//! Host-level tests for hex dumps.

use core::fmt::{self, Write};

use neo_patterns::hex_dump::{BYTES_PER_LINE, HexDump, HexDumpAddress, HexDumpFormat, hex_dump, write_byte};

fn dump(bytes: &[u8], bytes_per_line: usize, format: HexDumpFormat) -> String {
    HexDump::new(bytes, bytes_per_line, format).to_string()
}

#[test]
fn default_format_has_16_bit_offsets() {
    let bytes: Vec<u8> = (0..20).collect();
    let text = dump(&bytes, BYTES_PER_LINE, HexDumpFormat::default());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0x0000:  0x00 0x01"));
    assert!(lines[0].ends_with("0x0F"));
    assert_eq!(lines[1], "0x0010:  0x10 0x11 0x12 0x13");
    assert!(text.ends_with('\n'));
}

#[test]
fn buffer_format_prints_bytes_only() {
    assert_eq!(dump(&[0xAB, 0x01, 0x02], 2, HexDumpFormat::BUFFER), " 0xAB 0x01\n 0x02\n");
}

#[test]
fn short_offsets_wrap_after_255() {
    let bytes = [0_u8; 272];
    let text = dump(&bytes, BYTES_PER_LINE, HexDumpFormat::BUFFER_DUMP);
    let last = text.lines().last().unwrap_or_default();
    assert!(last.starts_with(" 0x00: "));
    assert_eq!(text.lines().nth(15).map(|line| &line[..7]), Some(" 0xF0: "));
}

#[test]
fn ascii_column_shows_printable_text() {
    let text = dump(b"Hi\x00\xFF\x07~", 8, HexDumpFormat::BUFFER_AND_ASCII);
    assert_eq!(text, " 0x00:  0x48 0x69 0x00 0xFF 0x07 0x7E  Hi  .~\n");
}

#[test]
fn memory_format_adds_the_base_address() {
    let text = dump(&[1, 2, 3], 2, HexDumpFormat::memory(0x1FFF));
    assert_eq!(text, "0x1FFF:  0x01 0x02  ..\n0x2001:  0x03  .\n");

    let wrapped = dump(
        &[0, 0],
        1,
        HexDumpFormat {
            address: HexDumpAddress::Absolute16 { base: 0xFFFF },
            ascii: false,
        },
    );
    assert_eq!(wrapped, "0xFFFF:  0x00\n0x0000:  0x00\n");
}

#[test]
fn nothing_is_written_without_bytes_or_line_length() -> fmt::Result {
    let mut out = String::new();
    hex_dump(&mut out, &[1, 2, 3], 0, HexDumpFormat::default())?;
    hex_dump(&mut out, &[], BYTES_PER_LINE, HexDumpFormat::default())?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn single_bytes_have_a_leading_space() -> fmt::Result {
    let mut out = String::new();
    write_byte(&mut out, 0x0A)?;
    out.write_char('|')?;
    assert_eq!(out, " 0x0A|");
    Ok(())
}

/// Accepts a fixed number of writes, then fails.
struct Limited(usize);

impl Write for Limited {
    fn write_str(&mut self, _text: &str) -> fmt::Result {
        self.0 = self.0.checked_sub(1).ok_or(fmt::Error)?;
        Ok(())
    }
}

#[test]
fn writer_errors_stop_the_dump() {
    assert_eq!(hex_dump(&mut Limited(3), &[1, 2, 3, 4], 4, HexDumpFormat::BUFFER), Err(fmt::Error));
    assert_eq!(hex_dump(&mut Limited(100), &[1, 2, 3, 4], 4, HexDumpFormat::BUFFER), Ok(()));
}
