// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{fmt, io};

use strum_macros::AsRefStr;

use crate::UploadErrorStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The caller supplied a value that violates the preconditions of a
    /// constructor or mutator. Always raised eagerly.
    InvalidArgument(InvalidArgument),

    /// The value is valid, but the operation is not, given its current
    /// state (e.g. reading a detached stream).
    Runtime(RuntimeError),
}

impl Error {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(..))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(..))
    }

    /// Returns the reason if this is an [`Error::InvalidArgument`].
    pub fn invalid_argument(&self) -> Option<InvalidArgument> {
        match self {
            Self::InvalidArgument(reason) => Some(*reason),
            Self::Runtime(..) => None,
        }
    }
}

impl From<InvalidArgument> for Error {
    fn from(error: InvalidArgument) -> Self {
        Error::InvalidArgument(error)
    }
}

impl From<RuntimeError> for Error {
    fn from(error: RuntimeError) -> Self {
        Error::Runtime(error)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Runtime(RuntimeError::Io(error))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason.as_ref()),
            Self::Runtime(RuntimeError::Io(error)) => write!(f, "runtime error: I/O: {error}"),
            Self::Runtime(RuntimeError::UploadFailed(status)) => write!(f, "runtime error: upload failed with {}", status.as_ref()),
            Self::Runtime(error) => write!(f, "runtime error: {}", error.as_ref()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(RuntimeError::Io(error)) => Some(error),
            _ => None,
        }
    }
}

/// The reason a supplied value was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
pub enum InvalidArgument {
    /// The header name is empty, or contains a byte that isn't a `tchar`.
    ///
    /// ## Examples:
    /// ```text
    /// hey dude
    /// Location:
    /// X-Foo\r\n-Bar
    /// ```
    HeaderNameInvalid,

    /// The header value contains a byte outside of `field-content`, most
    /// notably CR or LF.
    ///
    /// ## Example:
    /// ```text
    /// value\r\ninjection
    /// ```
    HeaderValueInvalid,

    /// A list of values was supplied for a header that takes a single value.
    MultipleHostValues,

    /// The protocol version isn't `DIGIT+ [ "." DIGIT+ ]`.
    ///
    /// ## Examples:
    /// ```text
    /// 1.a
    /// 2.
    /// 1.1 enhanced
    /// ```
    ProtocolVersionInvalid,

    /// The method contains something other than letters and hyphens.
    ///
    /// ## Examples:
    /// ```text
    /// POST!
    /// GET1
    /// hey dude
    /// ```
    MethodInvalid,

    /// The request-target is empty, or contains whitespace or control
    /// characters.
    RequestTargetInvalid,

    /// The status code is outside of `100..=599`.
    StatusCodeOutOfRange,

    /// The string couldn't be parsed as a URI-reference.
    UriInvalid,

    /// The authority marker `//` was present, but the host was empty.
    ///
    /// ## Example:
    /// ```text
    /// http://
    /// ```
    UriHostMissing,

    /// The scheme doesn't match `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
    UriSchemeInvalid,

    /// The host contains a colon (outside of an IP literal), whitespace,
    /// control characters, or starts or ends with a hyphen.
    UriHostInvalid,

    /// The user information contains control characters.
    UriUserInfoInvalid,

    /// The port is zero, non-numeric or larger than 65535.
    UriPortOutOfRange,

    /// A query or cookie parameter holds a value that isn't a string, an
    /// integer, or a nested list/map of those.
    ParamValueNotPermitted,

    /// The parsed body is a scalar instead of null, a list, a map or an
    /// object.
    ParsedBodyShapeNotPermitted,

    /// The fopen-style mode string isn't recognized.
    ///
    /// ## Examples:
    /// ```text
    /// q
    /// r++
    /// ```
    StreamModeInvalid,

    /// The upload error code is not one of the defined codes.
    UploadErrorStatusUnknown,

    /// The target path of an upload move is empty.
    TargetPathEmpty,
}

/// The reason an operation failed on an otherwise valid value.
#[derive(Debug, AsRefStr)]
pub enum RuntimeError {
    /// The resource was detached or closed; there's no resource left.
    StreamDetached,
    StreamNotReadable,
    StreamNotWritable,
    StreamNotSeekable,

    /// `move_to` was already called successfully.
    UploadAlreadyMoved,

    /// The upload itself failed, so there's no file to access.
    UploadFailed(UploadErrorStatus),

    Io(io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let error = Error::from(InvalidArgument::HeaderNameInvalid);
        assert!(error.is_invalid_argument());
        assert!(!error.is_runtime());
        assert_eq!(error.invalid_argument(), Some(InvalidArgument::HeaderNameInvalid));

        let error = Error::from(RuntimeError::StreamDetached);
        assert!(error.is_runtime());
        assert_eq!(error.invalid_argument(), None);

        let error = Error::from(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        assert!(matches!(error, Error::Runtime(RuntimeError::Io(..))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::from(InvalidArgument::MethodInvalid).to_string(), "invalid argument: MethodInvalid");
        assert_eq!(Error::from(RuntimeError::StreamDetached).to_string(), "runtime error: StreamDetached");
        assert_eq!(Error::from(RuntimeError::UploadFailed(UploadErrorStatus::Partial)).to_string(),
            "runtime error: upload failed with Partial");
    }
}
