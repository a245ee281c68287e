// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! An immutable URI-reference value.
//!
//! ```text
//! URI-reference = URI / relative-ref
//! URI           = scheme ":" hier-part [ "?" query ] [ "#" fragment ]
//! hier-part     = "//" authority path-abempty
//!               / path-absolute
//!               / path-rootless
//!               / path-empty
//! authority     = [ userinfo "@" ] host [ ":" port ]
//! ```
//!
//! # References
//! * [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986.html)

use std::{
    fmt::{self, Write},
    str::FromStr,
};

use phf::phf_map;

use crate::{
    abnf,
    percent,
    InvalidArgument,
};

/// The registered default ports; a port equal to the default of the current
/// scheme is not reported by [`Uri::port()`].
static DEFAULT_PORTS: phf::Map<&'static str, u16> = phf_map!(
    "http" => 80,
    "https" => 443,
);

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Uri {
    scheme: String,
    user_info: String,
    host: String,

    /// The port as it was given, even when it's the default for the scheme.
    /// This way a later scheme change decides whether it is elided.
    port: Option<u16>,

    path: String,
    query: String,
    fragment: String,
}

impl Uri {
    /// An empty URI-reference (the same-document reference `""`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URI-reference.
    pub fn parse(input: &str) -> Result<Self, InvalidArgument> {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, fragment),
            None => (input, ""),
        };

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, query),
            None => (rest, ""),
        };

        let (scheme, rest) = split_scheme(rest)?;

        let mut uri = Uri {
            scheme: scheme.to_ascii_lowercase(),
            query: percent::normalize(query, percent::QUERY_OR_FRAGMENT).into_owned(),
            fragment: percent::normalize(fragment, percent::QUERY_OR_FRAGMENT).into_owned(),
            ..Default::default()
        };

        let path = match rest.strip_prefix("//") {
            Some(hierarchical) => {
                let (authority, path) = match hierarchical.find('/') {
                    Some(index) => hierarchical.split_at(index),
                    None => (hierarchical, ""),
                };
                uri.parse_authority(authority)?;
                path
            }
            None => rest,
        };

        uri.path = percent::normalize(path, percent::PATH).into_owned();
        Ok(uri)
    }

    fn parse_authority(&mut self, authority: &str) -> Result<(), InvalidArgument> {
        let host_and_port = match authority.rsplit_once('@') {
            Some((user_info, host_and_port)) => {
                if user_info.bytes().any(abnf::is_control_character) {
                    return Err(InvalidArgument::UriUserInfoInvalid);
                }

                self.user_info = match user_info.split_once(':') {
                    Some((user, password)) => format_user_info(user, Some(password)),
                    None => format_user_info(user_info, None),
                };
                host_and_port
            }
            None => authority,
        };

        let (host, port) = split_host_and_port(host_and_port)?;
        if host.is_empty() {
            return Err(InvalidArgument::UriHostMissing);
        }

        self.host = validate_host(host)?;
        self.port = match port {
            Some(port) if !port.is_empty() => Some(parse_port(port)?),
            _ => None,
        };
        Ok(())
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns `[ userinfo "@" ] host [ ":" port ]`, or the empty string when
    /// there is no host. User information without a host is not rendered.
    pub fn authority(&self) -> String {
        if self.host.is_empty() {
            return String::new();
        }

        let mut authority = String::with_capacity(self.user_info.len() + self.host.len() + 7);
        if !self.user_info.is_empty() {
            authority.push_str(&self.user_info);
            authority.push('@');
        }
        authority.push_str(&self.host);
        if let Some(port) = self.port() {
            _ = write!(authority, ":{port}");
        }
        authority
    }

    /// Returns `user [ ":" password ]`, percent-encoded.
    pub fn user_info(&self) -> &str {
        &self.user_info
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, unless it's the registered default port of the
    /// current scheme.
    pub fn port(&self) -> Option<u16> {
        match self.port {
            Some(port) if DEFAULT_PORTS.get(self.scheme.as_str()) == Some(&port) => None,
            port => port,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns a copy with the given scheme. The empty string removes it.
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, InvalidArgument> {
        if !scheme.is_empty() && !is_valid_scheme(scheme) {
            return Err(InvalidArgument::UriSchemeInvalid);
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            ..self.clone()
        })
    }

    /// Returns a copy with the given user information. An empty user removes
    /// the user information altogether, including the password.
    #[must_use]
    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        Self {
            user_info: format_user_info(user, password),
            ..self.clone()
        }
    }

    /// Returns a copy with the given host, lowercased. The empty string
    /// removes the authority.
    pub fn with_host(&self, host: &str) -> Result<Self, InvalidArgument> {
        let host = if host.is_empty() {
            String::new()
        } else {
            validate_host(host)?
        };

        Ok(Self {
            host,
            ..self.clone()
        })
    }

    /// Returns a copy with the given port; `None` removes it.
    pub fn with_port(&self, port: Option<u16>) -> Result<Self, InvalidArgument> {
        if port == Some(0) {
            return Err(InvalidArgument::UriPortOutOfRange);
        }

        Ok(Self {
            port,
            ..self.clone()
        })
    }

    /// Returns a copy with the given path. `?`, `#` and every other byte
    /// outside of `pchar` are percent-encoded, existing escapes are kept.
    #[must_use]
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: percent::normalize(path, percent::PATH).into_owned(),
            ..self.clone()
        }
    }

    /// Returns a copy with the given query. A leading `?` is part of the
    /// query, not a delimiter.
    #[must_use]
    pub fn with_query(&self, query: &str) -> Self {
        Self {
            query: percent::normalize(query, percent::QUERY_OR_FRAGMENT).into_owned(),
            ..self.clone()
        }
    }

    /// Returns a copy with the given fragment. A leading `#` is part of the
    /// fragment, and is encoded as `%23`.
    #[must_use]
    pub fn with_fragment(&self, fragment: &str) -> Self {
        Self {
            fragment: percent::normalize(fragment, percent::QUERY_OR_FRAGMENT).into_owned(),
            ..self.clone()
        }
    }

    /// The origin-form of this URI, as used for the request-target:
    /// `absolute-path [ "?" query ]`, with an empty path becoming `/`.
    pub fn origin_form(&self) -> String {
        let mut target = match self.path.as_str() {
            "" => String::from("/"),
            path if !path.starts_with('/') && !self.host.is_empty() => format!("/{path}"),
            path => path.to_string(),
        };

        if !self.query.is_empty() {
            target.push('?');
            target.push_str(&self.query);
        }
        target
    }

    /// The value for a `Host` header: `host [ ":" port ]`, or `None` when the
    /// URI has no host.
    pub fn host_header_value(&self) -> Option<String> {
        if self.host.is_empty() {
            return None;
        }

        Some(match self.port() {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }

        let authority = self.authority();
        if !authority.is_empty() {
            write!(f, "//{authority}")?;
        }

        if !authority.is_empty() && !self.path.is_empty() && !self.path.starts_with('/') {
            // "//example.comfoo" would change the host
            write!(f, "/{}", self.path)?;
        } else if authority.is_empty() && self.path.starts_with("//") {
            // "//foo" would be read as a network-path reference
            write!(f, "/{}", self.path.trim_start_matches('/'))?;
        } else {
            f.write_str(&self.path)?;
        }

        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }

        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }

        Ok(())
    }
}

impl FromStr for Uri {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// ```text
/// scheme        = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
/// ```
fn is_valid_scheme(scheme: &str) -> bool {
    let mut bytes = scheme.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            bytes.all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'-' | b'.'))
        }
        _ => false,
    }
}

/// Splits the scheme from the rest of the reference. A colon in the first
/// segment always means a scheme, since a relative path can't begin with
/// such a segment (`path-noscheme`).
fn split_scheme(input: &str) -> Result<(&str, &str), InvalidArgument> {
    let Some(colon) = input.find(':') else {
        return Ok(("", input));
    };

    if input[..colon].contains('/') {
        return Ok(("", input));
    }

    let scheme = &input[..colon];
    if !is_valid_scheme(scheme) {
        return Err(InvalidArgument::UriSchemeInvalid);
    }

    Ok((scheme, &input[colon + 1..]))
}

fn split_host_and_port(input: &str) -> Result<(&str, Option<&str>), InvalidArgument> {
    if input.starts_with('[') {
        let Some(end) = input.find(']') else {
            return Err(InvalidArgument::UriHostInvalid);
        };

        let (host, rest) = input.split_at(end + 1);
        return match rest {
            "" => Ok((host, None)),
            rest => match rest.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(InvalidArgument::UriHostInvalid),
            },
        };
    }

    match input.split_once(':') {
        Some((_, port)) if port.contains(':') => Err(InvalidArgument::UriHostInvalid),
        Some((host, port)) => Ok((host, Some(port))),
        None => Ok((input, None)),
    }
}

fn parse_port(port: &str) -> Result<u16, InvalidArgument> {
    if !port.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(InvalidArgument::UriPortOutOfRange);
    }

    match port.parse::<u16>() {
        Ok(0) | Err(..) => Err(InvalidArgument::UriPortOutOfRange),
        Ok(port) => Ok(port),
    }
}

/// Validates a non-empty host and returns its lowercase form.
fn validate_host(host: &str) -> Result<String, InvalidArgument> {
    let is_ip_literal = host.starts_with('[') && host.ends_with(']') && host.len() > 2;

    let invalid = host.bytes().any(|byte| {
        abnf::is_control_character(byte)
            || byte == b' '
            || matches!(byte, b'/' | b'?' | b'#' | b'@')
            || (!is_ip_literal && matches!(byte, b':' | b'[' | b']'))
    });

    if invalid || host.starts_with('-') || host.ends_with('-') {
        return Err(InvalidArgument::UriHostInvalid);
    }

    Ok(host.to_ascii_lowercase())
}

fn format_user_info(user: &str, password: Option<&str>) -> String {
    if user.is_empty() {
        return String::new();
    }

    let mut user_info = percent::normalize(user, percent::USER).into_owned();
    if let Some(password) = password {
        user_info.push(':');
        user_info.push_str(&percent::normalize(password, percent::PASSWORD));
    }
    user_info
}
