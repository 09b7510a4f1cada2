//! Commodore "display code" character table, used to decode filenames
//! and SEQ payload text. Distinct from PETSCII and ASCII, which are
//! diagnostic-only tables out of scope for this crate.

/// 256-entry display-code table, one character per byte value. Ported
/// directly; codes with no assigned glyph render as `.`.
const TABLE: &str = concat!(
    "@ABCDEFGHIJKLMNOPQRSTUVWXYZ[£].. !\"#$%&'()*+,-./0123456789:;<=>?",
    "@abcdefghijklmnopqrstuvwxyz[£]...ABCDEFGHIJKLMNOPQRSTUVWXYZ.....",
    "................................................................",
    "................................................................",
);

/// Decode one display-code byte to its character.
#[must_use]
pub fn decode_byte(byte: u8) -> char {
    TABLE.chars().nth(byte as usize).unwrap_or('.')
}

/// Decode a display-code byte slice to a `String`.
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}
