// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Immutable HTTP message values: URIs, headers, bodies, requests, server
//! requests, responses and uploaded files.
//!
//! Every `with_*` method returns a modified copy and leaves the receiver as
//! it was. Only the body [`Stream`] is shared between copies.

pub mod abnf;
pub mod error;
pub mod header_bag;
pub mod message;
pub mod method;
pub mod percent;
pub mod request;
pub mod request_target;
pub mod response;
pub mod server_request;
pub mod status;
pub mod stream;
pub mod syntax;
pub mod uploaded_file;
pub mod uri;
pub mod value;
pub mod version;

pub use error::*;
pub use header_bag::*;
pub use message::*;
pub use method::*;
pub use request::*;
pub use request_target::*;
pub use response::*;
pub use server_request::*;
pub use status::*;
pub use stream::*;
pub use uploaded_file::*;
pub use uri::*;
pub use value::*;
pub use version::*;
