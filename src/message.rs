// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The parts shared by requests and responses, and the capability traits
//! through which they are accessed.
//!
//! Every `with_*` method returns a new value. The receiver is never altered.

use crate::{
    HeaderBag,
    HeaderValues,
    InvalidArgument,
    ProtocolVersion,
    Stream,
};

/// Values with a protocol version.
pub trait HasProtocolVersion: Sized {
    fn protocol_version(&self) -> &ProtocolVersion;

    fn with_protocol_version_value(&self, version: ProtocolVersion) -> Self;

    /// Returns a copy with the given version, e.g. `1.0` or `2`.
    fn with_protocol_version(&self, version: &str) -> Result<Self, InvalidArgument> {
        Ok(self.with_protocol_version_value(ProtocolVersion::parse(version)?))
    }
}

/// Values with header fields.
pub trait HasHeaders: Sized {
    fn headers(&self) -> &HeaderBag;

    /// Returns a copy where the header fields are replaced wholesale.
    fn with_headers(&self, headers: HeaderBag) -> Self;

    /// Returns the values of the header, or an empty slice when absent. The
    /// name is matched case-insensitively.
    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    /// Returns the values of the header joined by `", "`.
    fn header_line(&self, name: &str) -> String {
        self.headers().get_line(name)
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Result<Self, InvalidArgument> {
        Ok(self.with_headers(self.headers().with_header(name, values)?))
    }

    fn with_added_header(&self, name: &str, values: impl Into<HeaderValues>) -> Result<Self, InvalidArgument> {
        Ok(self.with_headers(self.headers().with_added_header(name, values)?))
    }

    fn without_header(&self, name: &str) -> Self {
        self.with_headers(self.headers().without_header(name))
    }
}

/// Values with a body.
pub trait HasBody: Sized {
    /// Returns the body. The returned handle is shared with this value.
    fn body(&self) -> &Stream;

    fn with_body(&self, body: Stream) -> Self;
}

#[derive(Clone, Debug, Default)]
pub struct Message {
    protocol_version: ProtocolVersion,
    headers: HeaderBag,
    body: Stream,
}

impl Message {
    /// A `1.1` message without headers and with an empty in-memory body.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HasProtocolVersion for Message {
    fn protocol_version(&self) -> &ProtocolVersion {
        &self.protocol_version
    }

    fn with_protocol_version_value(&self, protocol_version: ProtocolVersion) -> Self {
        Self {
            protocol_version,
            ..self.clone()
        }
    }
}

impl HasHeaders for Message {
    fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    fn with_headers(&self, headers: HeaderBag) -> Self {
        Self {
            headers,
            ..self.clone()
        }
    }
}

impl HasBody for Message {
    fn body(&self) -> &Stream {
        &self.body
    }

    fn with_body(&self, body: Stream) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }
}

/// Implements the capability traits for a type that wraps a [`Message`] (or
/// another value implementing them) in the given field. With `headers`,
/// [`HasHeaders`] is forwarded as well, including `without_header`.
macro_rules! delegate_message {
    ($type:ty, $field:ident) => {
        impl $crate::HasProtocolVersion for $type {
            fn protocol_version(&self) -> &$crate::ProtocolVersion {
                $crate::HasProtocolVersion::protocol_version(&self.$field)
            }

            fn with_protocol_version_value(&self, version: $crate::ProtocolVersion) -> Self {
                Self {
                    $field: $crate::HasProtocolVersion::with_protocol_version_value(&self.$field, version),
                    ..self.clone()
                }
            }
        }

        impl $crate::HasBody for $type {
            fn body(&self) -> &$crate::Stream {
                $crate::HasBody::body(&self.$field)
            }

            fn with_body(&self, body: $crate::Stream) -> Self {
                Self {
                    $field: $crate::HasBody::with_body(&self.$field, body),
                    ..self.clone()
                }
            }
        }
    };

    ($type:ty, $field:ident, headers) => {
        $crate::message::delegate_message!($type, $field);

        impl $crate::HasHeaders for $type {
            fn headers(&self) -> &$crate::HeaderBag {
                $crate::HasHeaders::headers(&self.$field)
            }

            fn with_headers(&self, headers: $crate::HeaderBag) -> Self {
                Self {
                    $field: $crate::HasHeaders::with_headers(&self.$field, headers),
                    ..self.clone()
                }
            }

            fn without_header(&self, name: &str) -> Self {
                Self {
                    $field: $crate::HasHeaders::without_header(&self.$field, name),
                    ..self.clone()
                }
            }
        }
    };
}

pub(crate) use delegate_message;
