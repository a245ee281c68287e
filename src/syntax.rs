// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This module contains HTTP syntax semantics, valid across all representations
//! of HTTP messages.
//!
//! # References
//! * [RFC 9110](https://www.rfc-editor.org/rfc/rfc9110.html)

use strum_macros::AsRefStr;

use crate::abnf;

/// Why a string isn't a valid `token`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr)]
pub enum TokenError {
    ContainsDelimiter,
    ContainsNonVisibleAscii,
    ContainsWhitespace,
    Empty,
}

/// Validate a field character. Note that in HTTP, UTF-8 is optional (US-ASCII),
/// and isn't used before validating the content.
///
/// ```text
/// field-vchar    = VCHAR / obs-text
/// ```
#[inline]
fn is_field_value_character(byte: u8) -> bool {
    abnf::is_visible_character(byte) || is_obs_text(byte)
}

/// Returns whether or not the character is whitespace according to the HTTP
/// specification. This is in effect just `U+0020 SPACE` and `U+0009 CHARACTER
/// TABULATION`.
///
/// # Definition
/// ```text
/// OWS            = *( SP / HTAB )
///                ; optional whitespace
/// ```
///
/// # References
/// * [RFC 9110 Section 5.6.3](https://www.rfc-editor.org/rfc/rfc9110.html#name-whitespace)
#[inline]
pub fn is_whitespace_character(character: char) -> bool {
    character == ' ' || character == '\t'
}

/// Strips the optional whitespace (`OWS`) around a field value.
#[inline]
pub fn trim_optional_whitespace(value: &str) -> &str {
    value.trim_matches(is_whitespace_character)
}

/// ```text
/// obs-text       = %x80-FF
/// ```
#[inline]
fn is_obs_text(byte: u8) -> bool {
    matches!(byte, 0x80..=0xFF)
}

/// Validates the (trimmed) value of a header field. Every CR and LF is
/// rejected, as is every other control character, since the
/// `obs-fold` line continuation is never acceptable in a constructed
/// message.
///
/// ```text
/// field-value    = *field-content
/// field-content  = field-vchar
///                  [ 1*( SP / HTAB / field-vchar ) field-vchar ]
/// ```
pub fn is_valid_field_value(value: &str) -> bool {
    value.bytes().all(|byte| is_field_value_character(byte) || byte == b' ' || byte == b'\t')
}

pub fn validate_token(value: &str) -> Result<(), TokenError> {
    if value.is_empty() {
        return Err(TokenError::Empty);
    }

    for character in value.bytes() {
        validate_token_character(character)?;
    }

    Ok(())
}

/// Validate a token character.
///
/// ```text
/// tchar          = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///                / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///                / DIGIT / ALPHA
///                ; any VCHAR, except delimiters
/// ```
fn validate_token_character(character: u8) -> Result<(), TokenError> {
    match character {
        b' ' | b'\t' => Err(TokenError::ContainsWhitespace),

        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~' => Ok(()),

        b'0'..=b'9' => Ok(()),
        b'A'..=b'Z' => Ok(()),
        b'a'..=b'z' => Ok(()),

        b'"' | b'(' | b')' | b',' | b'/' | b':' | b';' | b'<' | b'=' | b'>' |
        b'?' | b'@' | b'[' | b'\\' | b']' | b'{' | b'}' => Err(TokenError::ContainsDelimiter),

        _ => Err(TokenError::ContainsNonVisibleAscii),
    }
}

/// The method grammar accepted by request values: a `token` restricted to
/// letters and hyphens, so `GET1` and `POST!` are refused.
pub fn is_valid_method(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_alphabetic() || byte == b'-')
}

/// ```text
/// protocol-version = 1*DIGIT [ "." 1*DIGIT ]
/// ```
pub fn is_valid_protocol_version(value: &str) -> bool {
    fn is_digits(value: &str) -> bool {
        !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
    }

    match value.split_once('.') {
        Some((major, minor)) => is_digits(major) && is_digits(minor),
        None => is_digits(value),
    }
}
