// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{borrow::Cow, fmt, str::FromStr};

use crate::{
    syntax,
    InvalidArgument,
};

/// The version of the protocol a message is expressed in, e.g. `1.1` or `2`.
///
/// The version is kept exactly as supplied, so `2.0` and `2` stay distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProtocolVersion(Cow<'static, str>);

impl ProtocolVersion {
    pub const HTTP_1_0: ProtocolVersion = ProtocolVersion(Cow::Borrowed("1.0"));
    pub const HTTP_1_1: ProtocolVersion = ProtocolVersion(Cow::Borrowed("1.1"));
    pub const HTTP_2: ProtocolVersion = ProtocolVersion(Cow::Borrowed("2"));

    pub fn parse(version: &str) -> Result<Self, InvalidArgument> {
        if !syntax::is_valid_protocol_version(version) {
            #[cfg(feature = "debugging")]
            tracing::trace!("Invalid protocol version {version:?}");
            return Err(InvalidArgument::ProtocolVersionInvalid);
        }

        Ok(Self(Cow::Owned(version.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProtocolVersion {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq<str> for ProtocolVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProtocolVersion {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
