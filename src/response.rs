// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{
    message::delegate_message,
    status::{reason_phrase_for, validate_code},
    InvalidArgument,
    Message,
    StatusCode,
    StatusCodeClass,
};

/// An outgoing response.
#[derive(Clone, Debug)]
pub struct Response {
    message: Message,
    status: u16,
    reason_phrase: String,
}

delegate_message!(Response, message, headers);

impl Default for Response {
    /// `200 OK`, without headers and with an empty body.
    fn default() -> Self {
        Self::from(StatusCode::Ok)
    }
}

impl From<StatusCode> for Response {
    fn from(status: StatusCode) -> Self {
        Self {
            message: Message::new(),
            status: status.code(),
            reason_phrase: status.reason_phrase().to_string(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// The class of the status code. The code is always in `100..=599`.
    pub fn status_class(&self) -> StatusCodeClass {
        StatusCodeClass::of(self.status).unwrap_or(StatusCodeClass::ServerError)
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// Returns a copy with the given status. An explicit reason phrase is
    /// kept as is, even when empty; without one, the standard phrase of the
    /// code is used, or `""` for unregistered codes.
    pub fn with_status(&self, code: u16, reason_phrase: Option<&str>) -> Result<Self, InvalidArgument> {
        let status = validate_code(code)?;
        let reason_phrase = match reason_phrase {
            Some(reason_phrase) => reason_phrase.to_string(),
            None => reason_phrase_for(status).to_string(),
        };

        Ok(Self {
            status,
            reason_phrase,
            ..self.clone()
        })
    }
}
