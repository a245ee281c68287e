// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Percent-encoding for the sub-components of a URI.
//!
//! Every set below lists the bytes that must be *encoded*; everything else
//! passes through. An already-encoded octet (`%` followed by two hex
//! digits) is never encoded a second time, which makes [`normalize`]
//! idempotent.
//!
//! # References
//! * [RFC 3986 Section 2.1 Percent-Encoding](https://www.rfc-editor.org/rfc/rfc3986.html#section-2.1)

use std::borrow::Cow;

use percent_encoding::{
    AsciiSet,
    NON_ALPHANUMERIC,
    percent_encode,
};

use crate::abnf;

/// ```text
/// userinfo      = *( unreserved / pct-encoded / sub-delims / ":" )
/// ```
///
/// The user part can't contain the `:` separator.
pub const USER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-').remove(b'.').remove(b'_').remove(b'~')
    .remove(b'!').remove(b'$').remove(b'&').remove(b'\'').remove(b'(').remove(b')')
    .remove(b'*').remove(b'+').remove(b',').remove(b';').remove(b'=');

/// The password part of the userinfo, which may contain further colons.
pub const PASSWORD: &AsciiSet = &USER.remove(b':');

/// ```text
/// pchar         = unreserved / pct-encoded / sub-delims / ":" / "@"
/// path          = *( "/" / pchar )
/// ```
pub const PATH: &AsciiSet = &PASSWORD.remove(b'@').remove(b'/');

/// ```text
/// query         = *( pchar / "/" / "?" )
/// fragment      = *( pchar / "/" / "?" )
/// ```
pub const QUERY_OR_FRAGMENT: &AsciiSet = &PATH.remove(b'?');

/// Percent-encodes every byte of `raw` that is in `set`, as well as every
/// non-ASCII byte, using uppercase hexadecimal digits.
pub fn encode(raw: &[u8], set: &'static AsciiSet) -> String {
    percent_encode(raw, set).to_string()
}

/// Normalizes a component: existing `%XX` triples are kept as is, a lone
/// `%` becomes `%25` and every other byte in `set` is encoded.
pub fn normalize<'a>(input: &'a str, set: &'static AsciiSet) -> Cow<'a, str> {
    let bytes = input.as_bytes();
    let mut result = String::new();
    let mut changed = false;
    let mut run_start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] != b'%' {
            index += 1;
            continue;
        }

        changed |= push_encoded(&mut result, &bytes[run_start..index], set);

        if is_percent_triple(bytes, index) {
            result.push_str(&input[index..index + 3]);
            index += 3;
        } else {
            result.push_str("%25");
            changed = true;
            index += 1;
        }

        run_start = index;
    }

    changed |= push_encoded(&mut result, &bytes[run_start..], set);

    if changed {
        Cow::Owned(result)
    } else {
        Cow::Borrowed(input)
    }
}

/// Decodes every `%XX` triple. Invalid UTF-8 in the result is replaced by
/// `U+FFFD`.
pub fn decode(input: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(input.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(input),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Appends the encoded form of `run`, returning whether anything had to be
/// encoded.
fn push_encoded(result: &mut String, run: &[u8], set: &'static AsciiSet) -> bool {
    match Cow::from(percent_encode(run, set)) {
        Cow::Borrowed(unchanged) => {
            result.push_str(unchanged);
            false
        }
        Cow::Owned(encoded) => {
            result.push_str(&encoded);
            true
        }
    }
}

#[inline]
fn is_percent_triple(bytes: &[u8], index: usize) -> bool {
    index + 2 < bytes.len()
        && abnf::is_hex_digit(bytes[index + 1])
        && abnf::is_hex_digit(bytes[index + 2])
}
