// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{
    header_bag::HOST,
    message::delegate_message,
    HasHeaders,
    HeaderBag,
    InvalidArgument,
    Message,
    Method,
    RequestTarget,
    Uri,
};

/// An outgoing request.
///
/// The `Host` header follows the host of the [`Uri`] unless it is set
/// explicitly, or the host is preserved with [`Request::with_uri()`].
#[derive(Clone, Debug, Default)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Uri,

    /// Set by [`Request::with_request_target()`], cleared by a new URI.
    target: Option<RequestTarget>,
}

delegate_message!(Request, message);

impl Request {
    pub fn new(method: &str, uri: Uri) -> Result<Self, InvalidArgument> {
        Ok(Self {
            method: Method::parse(method)?,
            ..Default::default()
        }.with_uri(uri, false))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns a copy with the given method; the case is kept.
    pub fn with_method(&self, method: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            method: Method::parse(method)?,
            ..self.clone()
        })
    }

    /// Returns the explicitly set request-target, or else the origin-form of
    /// the URI (`/` when the URI has no path).
    pub fn request_target(&self) -> String {
        match &self.target {
            Some(target) => target.to_string(),
            None => self.uri.origin_form(),
        }
    }

    pub fn with_request_target(&self, target: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            target: Some(RequestTarget::parse(target)?),
            ..self.clone()
        })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns a copy with the given URI, which also drops an explicitly set
    /// request-target.
    ///
    /// The `Host` header is replaced by the host (and port) of the URI, unless
    /// the URI has no host, or `preserve_host` is set while a `Host` header
    /// is already present.
    #[must_use]
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut headers = self.message.headers().clone();
        if let Some(host) = uri.host_header_value() {
            if !preserve_host || !headers.contains(HOST) {
                headers = headers.with_uri_host(host);
            }
        }

        Self {
            message: self.message.with_headers(headers),
            uri,
            target: None,
            ..self.clone()
        }
    }
}

impl HasHeaders for Request {
    fn headers(&self) -> &HeaderBag {
        self.message.headers()
    }

    fn with_headers(&self, headers: HeaderBag) -> Self {
        Self {
            message: self.message.with_headers(headers),
            ..self.clone()
        }
    }

    /// Removes the header. Removing `Host` while the URI has a host brings
    /// back the `Host` derived from the URI.
    fn without_header(&self, name: &str) -> Self {
        let mut headers = self.message.headers().without_header(name);
        if name.eq_ignore_ascii_case(HOST) {
            if let Some(host) = self.uri.host_header_value() {
                headers = headers.with_uri_host(host);
            }
        }

        self.with_headers(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HasBody, HasProtocolVersion, Stream};
    use rstest::rstest;

    fn uri(value: &str) -> Uri {
        Uri::parse(value).unwrap()
    }

    fn request() -> Request {
        Request::default()
    }

    #[test]
    fn test_request_target_defaults_to_slash() {
        assert_eq!(request().request_target(), "/");
        assert_eq!(request().with_uri(uri(""), false).request_target(), "/");
        assert_eq!(request().with_uri(uri("*"), false).request_target(), "*");
        assert_eq!(request().with_uri(uri("http://foo.com/bar baz/"), false).request_target(), "/bar%20baz/");
        assert_eq!(request().with_uri(uri("http://foo.com/?oops#2"), false).request_target(), "/?oops");
        assert_eq!(request().with_uri(uri("http://example.com"), false).request_target(), "/");
    }

    #[rstest]
    #[case("*")]
    #[case("api.example.com")]
    #[case("https://api.example.com/users")]
    #[case("https://api.example.com/users?foo=bar")]
    #[case("/users")]
    #[case("/users?id=foo")]
    fn test_with_request_target_accepts_valid_targets(#[case] target: &str) {
        assert_eq!(request().with_request_target(target).unwrap().request_target(), target);
    }

    #[rstest]
    #[case("foo bar baz")]
    #[case("")]
    #[case(" \t")]
    fn test_with_request_target_rejects_invalid_targets(#[case] target: &str) {
        assert_eq!(request().with_request_target(target).unwrap_err(), InvalidArgument::RequestTargetInvalid);
    }

    #[test]
    fn test_request_target_preserved_with_falsey_query() {
        assert_eq!(request().with_uri(uri("http://foo.com/baz?0"), false).request_target(), "/baz?0");
    }

    #[test]
    fn test_with_request_target_preserves_original() {
        let request = request().with_request_target("dGFyZ2V0").unwrap();
        let _ = request.with_request_target("dGFyZ2V0-modified").unwrap();
        assert_eq!(request.request_target(), "dGFyZ2V0");
    }

    #[rstest]
    #[case("http://foo.com/baz?bar=bam", "/baz?bar=bam")]
    #[case("http://example.com", "/")]
    #[case("http://example.com#proceed", "/")]
    fn test_request_target_is_read_from_uri(#[case] value: &str, #[case] target: &str) {
        assert_eq!(request().with_uri(uri(value), false).request_target(), target);
    }

    #[test]
    fn test_with_new_uri_resets_request_target() {
        let request = request().with_request_target("*").unwrap();
        let request = request.with_uri(uri("http://example.net/path"), false);
        assert_eq!(request.request_target(), "/path");
    }

    #[test]
    fn test_method() {
        assert_eq!(request().method(), &Method::Get);
        assert_eq!(request().with_method("head").unwrap().method().as_str(), "head");

        let request = request().with_method("POST").unwrap();
        let _ = request.with_method("PUT").unwrap();
        assert_eq!(request.method(), &Method::Post);

        assert_eq!(request.with_method("GET1").unwrap_err(), InvalidArgument::MethodInvalid);
    }

    #[rstest]
    #[case("http://www.example.com", "www.example.com")]
    #[case("http://www.example.com:80", "www.example.com")]
    #[case("http://foo.com:8124/bar", "foo.com:8124")]
    fn test_host_header_from_uri(#[case] value: &str, #[case] host: &str) {
        let request = request().with_uri(uri(value), false);
        assert_eq!(request.header("Host"), [host]);
        assert_eq!(request.headers().iter().next().map(|(name, _)| name), Some("Host"));
    }

    #[test]
    fn test_with_uri_overrides_host_header() {
        let request1 = request().with_uri(uri("http://foo.com/baz?bar=bam"), false);
        assert_eq!(request1.header_line("host"), "foo.com");

        let request2 = request1.with_uri(uri("http://www.baz.com/bar"), false);
        assert_eq!(request2.header_line("host"), "www.baz.com");
        assert_eq!(request1.header_line("host"), "foo.com");
    }

    #[test]
    fn test_with_uri_preserves_host_if_required() {
        let request = request().with_header("Host", "preserved.com").unwrap();
        let request = request.with_uri(uri("http://www.foo.com/bar"), true);
        assert_eq!(request.header_line("host"), "preserved.com");
    }

    #[test]
    fn test_with_uri_sets_host_when_preserving_without_host() {
        let request = request().with_uri(uri("http://www.foo.com/bar"), true);
        assert_eq!(request.header_line("host"), "www.foo.com");
    }

    #[test]
    fn test_with_uri_replaces_host_header() {
        let request1 = request().with_uri(uri("http://foo.com:8124/bar"), false);
        assert_eq!(request1.header_line("host"), "foo.com:8124");

        let request2 = request1.with_uri(uri("http://foo.com:8125/bar"), false);
        assert_eq!(request2.header_line("host"), "foo.com:8125");
    }

    #[test]
    fn test_host_header_survives_removal_while_uri_has_host() {
        let request1 = request().with_uri(uri("http://www.example.com"), false);
        assert_eq!(request1.header_line("host"), "www.example.com");

        let request2 = request1.without_header("host");
        assert!(request2.has_header("Host"));
        assert_eq!(request2.header_line("Host"), "www.example.com");
    }

    #[test]
    fn test_no_host_header_without_uri_host() {
        assert!(!request().has_header("host"));
        assert!(!request().with_uri(uri("/test?a"), false).has_header("host"));
    }

    #[test]
    fn test_uri_without_host_leaves_host_header_untouched() {
        let request = request().with_header("Host", "example.com").unwrap();
        assert_eq!(request.with_uri(uri("/path"), false).header_line("Host"), "example.com");
    }

    #[test]
    fn test_host_header_set_afterwards_wins() {
        let request = request()
            .with_uri(uri("http://www.example.com"), false)
            .with_header("Host", "www.test.com").unwrap();
        assert_eq!(request.header_line("host"), "www.test.com");
    }

    #[test]
    fn test_host_header_updates_from_uri_when_not_preserving_host() {
        let request = request().with_added_header("Host", "example.com").unwrap();
        let uri = Uri::new()
            .with_host("www.example.com").unwrap()
            .with_port(Some(10081)).unwrap();

        assert_eq!(request.with_uri(uri, false).header_line("Host"), "www.example.com:10081");
    }

    #[test]
    fn test_new() {
        let request = Request::new("PUT", uri("https://example.com:8443/upload")).unwrap();
        assert_eq!(request.method(), &Method::Put);
        assert_eq!(request.header_line("Host"), "example.com:8443");
        assert_eq!(request.request_target(), "/upload");

        assert_eq!(Request::new("hey dude", Uri::new()).unwrap_err(), InvalidArgument::MethodInvalid);
    }

    #[test]
    fn test_message_capabilities() {
        let body = Stream::from_contents("payload");
        let request = request()
            .with_protocol_version("2").unwrap()
            .with_body(body.clone());

        assert_eq!(request.protocol_version().as_str(), "2");
        assert!(request.body().ptr_eq(&body));
        assert_eq!(request.with_method("DELETE").unwrap().protocol_version().as_str(), "2");
    }
}
