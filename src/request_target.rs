// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! ```text
//! request-target = origin-form
//!                / absolute-form
//!                / authority-form
//!                / asterisk-form
//! ```
//!
//! # References
//! * [RFC 9112 Section 3.2](https://www.rfc-editor.org/rfc/rfc9112.html#section-3.2)

use std::fmt;

use crate::{
    abnf,
    InvalidArgument,
    Uri,
};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestTarget {
    Origin {
        path: String,
        query: Option<String>,
    },
    Absolute(String),
    Authority(String),
    Asterisk,
}

impl RequestTarget {
    /// Classifies a request-target. It is rejected when it is empty or
    /// contains whitespace or control characters, but is otherwise kept
    /// verbatim.
    pub fn parse(input: &str) -> Result<Self, InvalidArgument> {
        if input.is_empty() || input.bytes().any(|byte| byte == b' ' || abnf::is_control_character(byte)) {
            #[cfg(feature = "debugging")]
            tracing::trace!("Invalid request-target {input:?}");
            return Err(InvalidArgument::RequestTargetInvalid);
        }

        if input == "*" {
            return Ok(Self::Asterisk);
        }

        if input.starts_with('/') {
            return Ok(match input.split_once('?') {
                Some((path, query)) => Self::Origin {
                    path: path.to_string(),
                    query: Some(query.to_string()),
                },
                None => Self::Origin {
                    path: input.to_string(),
                    query: None,
                },
            });
        }

        match Uri::parse(input) {
            Ok(uri) if !uri.scheme().is_empty() && !uri.host().is_empty() => Ok(Self::Absolute(input.to_string())),
            _ => Ok(Self::Authority(input.to_string())),
        }
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin { path, query: Some(query) } => write!(f, "{path}?{query}"),
            Self::Origin { path, query: None } => f.write_str(path),
            Self::Absolute(target) | Self::Authority(target) => f.write_str(target),
            Self::Asterisk => f.write_str("*"),
        }
    }
}
