// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Various Augmented BNF (ABNF) tools and utilities.
//!
//! # Ranges
//! Ranges are inclusive:
//! ```text
//! DIGIT       =  %x30-39
//! ```
//! is equivalent to:
//! ```text
//! DIGIT       =  "0" / "1" / "2" / "3" / "4" / "5" / "6" /
//!                "7" / "8" / "9"
//! ```
//!
//! # References
//! * [RFC 5234 Augmented BNF for Syntax Specifications: ABNF](https://www.rfc-editor.org/rfc/rfc5234.html)
//! * [RFC 3986 Uniform Resource Identifier (URI): Generic Syntax](https://www.rfc-editor.org/rfc/rfc3986.html)

/// Is the character a visible (printing) character.
///
/// ```text
/// VCHAR          =  %x21-7E
/// ```
#[inline]
pub fn is_visible_character(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E)
}

/// ```text
/// HEXDIG         =  DIGIT / "A" / "B" / "C" / "D" / "E" / "F"
/// ```
///
/// Lowercase digits are accepted as well, as RFC 5234 string literals are
/// case-insensitive.
#[inline]
pub fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

/// ```text
/// unreserved    = ALPHA / DIGIT / "-" / "." / "_" / "~"
/// ```
#[inline]
pub fn is_unreserved_character(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// ```text
/// sub-delims    = "!" / "$" / "&" / "'" / "(" / ")"
///               / "*" / "+" / "," / ";" / "="
/// ```
#[inline]
pub fn is_sub_delimiter(byte: u8) -> bool {
    matches!(byte, b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=')
}

/// Is the byte an ASCII control character (`CTL` in RFC 5234).
///
/// ```text
/// CTL            =  %x00-1F / %x7F
/// ```
#[inline]
pub fn is_control_character(byte: u8) -> bool {
    matches!(byte, 0x00..=0x1F | 0x7F)
}
