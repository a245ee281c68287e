// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{fmt, str::FromStr};

use phf::phf_map;

use crate::{
    syntax,
    InvalidArgument,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    /// A method outside of the registry, or a registered method in a
    /// different case. The string is kept as supplied.
    Other(String),
    Connect,
    Copy,
    Delete,
    #[default]
    Get,
    Head,
    Lock,
    MkCol,
    Move,
    Options,
    Patch,
    Post,
    PropFind,
    PropPatch,
    Put,
    Trace,
    Unlock,
}

/// Method tokens are case-sensitive, so `get` is not [`Method::Get`].
static METHOD_MAP: phf::Map<&'static str, Method> = phf_map!(
    "CONNECT" => Method::Connect,
    "COPY" => Method::Copy,
    "DELETE" => Method::Delete,
    "GET" => Method::Get,
    "HEAD" => Method::Head,
    "LOCK" => Method::Lock,
    "MKCOL" => Method::MkCol,
    "MOVE" => Method::Move,
    "OPTIONS" => Method::Options,
    "PATCH" => Method::Patch,
    "POST" => Method::Post,
    "PROPFIND" => Method::PropFind,
    "PROPPATCH" => Method::PropPatch,
    "PUT" => Method::Put,
    "TRACE" => Method::Trace,
    "UNLOCK" => Method::Unlock,
);

impl Method {
    /// Parses a method, which may only consist of letters and hyphens.
    pub fn parse(method: &str) -> Result<Self, InvalidArgument> {
        if !syntax::is_valid_method(method) {
            #[cfg(feature = "debugging")]
            tracing::trace!("Invalid method {method:?}");
            return Err(InvalidArgument::MethodInvalid);
        }

        Ok(match METHOD_MAP.get(method) {
            Some(method) => method.clone(),
            None => Method::Other(method.to_string()),
        })
    }

    /// Get the method in string form.
    ///
    /// # Notes
    /// The method token is case-sensitive, as per
    /// [RFC 9110 - Section 9.1](https://www.rfc-editor.org/rfc/rfc9110.html#section-9.1-5).
    ///
    /// # References
    /// * [IANA Hypertext Transfer Protocol (HTTP) Method Registry](https://www.iana.org/assignments/http-methods/http-methods.xhtml)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Other(method) => method,
            Self::Connect => "CONNECT",
            Self::Copy => "COPY",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Lock => "LOCK",
            Self::MkCol => "MKCOL",
            Self::Move => "MOVE",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::PropFind => "PROPFIND",
            Self::PropPatch => "PROPPATCH",
            Self::Put => "PUT",
            Self::Trace => "TRACE",
            Self::Unlock => "UNLOCK",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
