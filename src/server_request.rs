// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use indexmap::IndexMap;

use crate::{
    message::delegate_message,
    InvalidArgument,
    Method,
    Request,
    UploadedFile,
    Uri,
    Value,
};

/// Query or cookie parameters, in the order they were received.
pub type Params = IndexMap<String, Value>;

/// The uploaded files of a request, shaped like the form fields they were
/// sent with.
#[derive(Clone, Debug)]
pub enum UploadedFiles {
    File(UploadedFile),
    List(Vec<UploadedFiles>),
    Map(IndexMap<String, UploadedFiles>),
}

impl From<UploadedFile> for UploadedFiles {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl UploadedFiles {
    /// Returns the file when this is a leaf.
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Looks up a field of a [`UploadedFiles::Map`].
    pub fn get(&self, name: &str) -> Option<&UploadedFiles> {
        match self {
            Self::Map(files) => files.get(name),
            _ => None,
        }
    }
}

/// An incoming request, as seen by the server. Next to the request itself,
/// it carries the server environment, the decoded query, cookies, uploaded
/// files and body, and attributes derived by the application.
#[derive(Clone, Debug, Default)]
pub struct ServerRequest {
    request: Request,
    server_params: IndexMap<String, String>,
    query_params: Params,
    cookie_params: Params,
    uploaded_files: IndexMap<String, UploadedFiles>,
    parsed_body: Option<Value>,
    attributes: IndexMap<String, Value>,
}

delegate_message!(ServerRequest, request, headers);

impl ServerRequest {
    pub fn new(method: &str, uri: Uri, server_params: IndexMap<String, String>) -> Result<Self, InvalidArgument> {
        Ok(Self {
            request: Request::new(method, uri)?,
            server_params,
            ..Default::default()
        })
    }

    /// Returns the request without the server-side data.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn with_method(&self, method: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            request: self.request.with_method(method)?,
            ..self.clone()
        })
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    #[must_use]
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        Self {
            request: self.request.with_uri(uri, preserve_host),
            ..self.clone()
        }
    }

    pub fn request_target(&self) -> String {
        self.request.request_target()
    }

    pub fn with_request_target(&self, target: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            request: self.request.with_request_target(target)?,
            ..self.clone()
        })
    }

    /// The environment of the server, fixed at construction.
    pub fn server_params(&self) -> &IndexMap<String, String> {
        &self.server_params
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    /// Returns a copy with the query parameters replaced. The URI is left
    /// alone.
    pub fn with_query_params<I, K, V>(&self, params: I) -> Result<Self, InvalidArgument>
            where I: IntoIterator<Item = (K, V)>,
                  K: Into<String>,
                  V: Into<Value> {
        Ok(Self {
            query_params: collect_params(params)?,
            ..self.clone()
        })
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    /// Returns a copy with the cookie parameters replaced. The `Cookie`
    /// header is left alone.
    pub fn with_cookie_params<I, K, V>(&self, params: I) -> Result<Self, InvalidArgument>
            where I: IntoIterator<Item = (K, V)>,
                  K: Into<String>,
                  V: Into<Value> {
        Ok(Self {
            cookie_params: collect_params(params)?,
            ..self.clone()
        })
    }

    pub fn uploaded_files(&self) -> &IndexMap<String, UploadedFiles> {
        &self.uploaded_files
    }

    #[must_use]
    pub fn with_uploaded_files(&self, uploaded_files: IndexMap<String, UploadedFiles>) -> Self {
        Self {
            uploaded_files,
            ..self.clone()
        }
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Returns a copy with the given deserialized body, which must be absent,
    /// a sequence, a mapping or an opaque object. [`Value::Null`] counts as
    /// absent.
    pub fn with_parsed_body(&self, parsed_body: Option<Value>) -> Result<Self, InvalidArgument> {
        let parsed_body = match parsed_body {
            None | Some(Value::Null) => None,
            Some(value @ (Value::Sequence(..) | Value::Mapping(..) | Value::Opaque(..))) => Some(value),
            Some(..) => {
                #[cfg(feature = "debugging")]
                tracing::trace!("Rejected scalar parsed body");
                return Err(InvalidArgument::ParsedBodyShapeNotPermitted);
            }
        };

        Ok(Self {
            parsed_body,
            ..self.clone()
        })
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the attribute, or `default` when it isn't set.
    pub fn attribute_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.attributes.get(name).unwrap_or(default)
    }

    #[must_use]
    pub fn with_attribute(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.insert(name.into(), value.into());
        Self {
            attributes,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.shift_remove(name);
        Self {
            attributes,
            ..self.clone()
        }
    }
}

impl From<Request> for ServerRequest {
    fn from(request: Request) -> Self {
        Self {
            request,
            ..Default::default()
        }
    }
}

fn collect_params<I, K, V>(params: I) -> Result<Params, InvalidArgument>
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<Value> {
    params.into_iter()
        .map(|(name, value)| {
            let value: Value = value.into();
            if value.is_param() {
                Ok((name.into(), value))
            } else {
                #[cfg(feature = "debugging")]
                tracing::trace!("Rejected parameter value {value:?}");
                Err(InvalidArgument::ParamValueNotPermitted)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HasBody, HasHeaders, HasProtocolVersion, Stream, UploadErrorStatus};
    use rstest::rstest;

    #[derive(Debug)]
    struct User {
        name: &'static str,
    }

    fn server_request() -> ServerRequest {
        ServerRequest::new("GET", Uri::parse("http://example.com/").unwrap(), IndexMap::new()).unwrap()
    }

    #[test]
    fn test_server_params() {
        let params = IndexMap::from([
            ("REMOTE_ADDR".to_string(), "127.0.0.1".to_string()),
            ("SERVER_NAME".to_string(), "example.com".to_string()),
        ]);
        let request = ServerRequest::new("POST", Uri::parse("/").unwrap(), params.clone()).unwrap();
        assert_eq!(request.server_params(), &params);
        assert_eq!(request.method(), &Method::Post);
    }

    #[test]
    fn test_query_params() {
        let request = server_request();
        assert!(request.query_params().is_empty());

        let request = request.with_query_params([("test", "value")]).unwrap();
        assert_eq!(request.query_params().get("test"), Some(&Value::from("value")));
        assert_eq!(request.uri().query(), "");

        let request = request.with_query_params([("list", vec!["1", "2"])]).unwrap();
        assert_eq!(request.query_params().len(), 1);
        assert_eq!(request.query_params()["list"], Value::from(vec!["1", "2"]));
    }

    #[rstest]
    #[case(Value::Null)]
    #[case(Value::from(true))]
    #[case(Value::from(1.5))]
    #[case(Value::opaque(User { name: "me" }))]
    #[case(Value::from(vec![Value::from(1i64), Value::from(false)]))]
    fn test_invalid_params_are_rejected(#[case] value: Value) {
        let request = server_request();
        assert_eq!(request.with_query_params([("key", value.clone())]).unwrap_err(), InvalidArgument::ParamValueNotPermitted);
        assert_eq!(request.with_cookie_params([("key", value)]).unwrap_err(), InvalidArgument::ParamValueNotPermitted);
    }

    #[test]
    fn test_cookie_params() {
        let request = server_request().with_cookie_params([("session", "abc"), ("theme", "dark")]).unwrap();
        assert_eq!(request.cookie_params().keys().collect::<Vec<_>>(), ["session", "theme"]);
        assert!(!request.has_header("Cookie"));
    }

    #[test]
    fn test_uploaded_files() {
        let file = UploadedFile::new(Stream::from_contents("avatar"), Some(6), UploadErrorStatus::Ok);
        let files = IndexMap::from([
            ("avatar".to_string(), UploadedFiles::from(file)),
            ("gallery".to_string(), UploadedFiles::Map(IndexMap::from([
                ("first".to_string(), UploadedFiles::List(vec![])),
            ]))),
        ]);

        let request = server_request();
        let with_files = request.with_uploaded_files(files);
        assert!(request.uploaded_files().is_empty());
        assert_eq!(with_files.uploaded_files()["avatar"].as_file().and_then(UploadedFile::size), Some(6));
        assert!(with_files.uploaded_files()["gallery"].get("first").is_some());
    }

    #[rstest]
    #[case(None)]
    #[case(Some(Value::Null))]
    #[case(Some(Value::from(vec!["a"])))]
    #[case(Some(Value::Mapping(IndexMap::new())))]
    #[case(Some(Value::opaque(User { name: "body" })))]
    fn test_with_parsed_body_accepts(#[case] body: Option<Value>) {
        let is_some = matches!(body, Some(ref value) if !value.is_null());
        let request = server_request().with_parsed_body(body).unwrap();
        assert_eq!(request.parsed_body().is_some(), is_some);
    }

    #[rstest]
    #[case(Value::from(1i64))]
    #[case(Value::from(1.1))]
    #[case(Value::from(false))]
    #[case(Value::from("body"))]
    fn test_with_parsed_body_rejects_scalars(#[case] body: Value) {
        assert_eq!(server_request().with_parsed_body(Some(body)).unwrap_err(), InvalidArgument::ParsedBodyShapeNotPermitted);
    }

    #[test]
    fn test_attributes() {
        let request = server_request();
        assert!(request.attributes().is_empty());
        assert_eq!(request.attribute("name"), None);
        assert_eq!(request.attribute_or("name", &Value::from("default")), &Value::from("default"));

        let user = Value::opaque(User { name: "Tristan" });
        let with_user = request.with_attribute("user", user.clone());
        assert!(request.attribute("user").is_none());
        assert_eq!(with_user.attribute("user"), Some(&user));
        assert_eq!(with_user.attribute("user").and_then(Value::downcast_ref::<User>).map(|user| user.name), Some("Tristan"));

        let without = with_user.without_attribute("user");
        assert!(without.attribute("user").is_none());
        assert!(with_user.attribute("user").is_some());

        assert!(request.without_attribute("missing").attributes().is_empty());
    }

    #[test]
    fn test_attribute_null_is_distinct_from_absent() {
        let request = server_request().with_attribute("name", Value::Null);
        assert_eq!(request.attribute("name"), Some(&Value::Null));
        assert_eq!(request.attribute_or("name", &Value::from(1i64)), &Value::Null);
    }

    #[test]
    fn test_host_follows_uri() {
        let request = server_request();
        assert_eq!(request.header_line("Host"), "example.com");
        assert_eq!(request.without_header("Host").header_line("Host"), "example.com");

        let request = request.with_uri(Uri::parse("https://other.example:8443/x").unwrap(), false);
        assert_eq!(request.header_line("Host"), "other.example:8443");
        assert_eq!(request.request_target(), "/x");
    }

    #[test]
    fn test_message_capabilities_carry_server_data() {
        let request = server_request()
            .with_attribute("id", 7i64)
            .with_protocol_version("2").unwrap()
            .with_body(Stream::from_contents("{}"))
            .with_header("Accept", "application/json").unwrap()
            .with_method("PATCH").unwrap()
            .with_request_target("*").unwrap();

        assert_eq!(request.attribute("id"), Some(&Value::from(7i64)));
        assert_eq!(request.protocol_version().as_str(), "2");
        assert_eq!(request.body().to_string(), "{}");
        assert_eq!(request.header_line("accept"), "application/json");
        assert_eq!(request.method(), &Method::Patch);
        assert_eq!(request.request_target(), "*");
    }

    #[test]
    fn test_from_request() {
        let request = Request::new("DELETE", Uri::parse("/resource").unwrap()).unwrap();
        let server_request = ServerRequest::from(request);
        assert_eq!(server_request.method(), &Method::Delete);
        assert!(server_request.server_params().is_empty());
    }
}
