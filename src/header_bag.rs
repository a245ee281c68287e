// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use unicase::UniCase;

use crate::{
    syntax,
    InvalidArgument,
};

/// The canonical name of the `Host` header, which is always stored first.
pub const HOST: &str = "Host";

/// One or more values for a header field, as supplied to
/// [`HeaderBag::with_header()`] and [`HeaderBag::with_added_header()`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderValues(Vec<String>);

impl HeaderValues {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&String> for HeaderValues {
    fn from(value: &String) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for HeaderValues {
    fn from(values: Vec<&str>) -> Self {
        values.as_slice().into()
    }
}

impl From<&[&str]> for HeaderValues {
    fn from(values: &[&str]) -> Self {
        Self(values.iter().map(|value| value.to_string()).collect())
    }
}

impl From<&[String]> for HeaderValues {
    fn from(values: &[String]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValues {
    fn from(values: [&str; N]) -> Self {
        values.as_slice().into()
    }
}

/// An ordered, case-insensitive collection of header fields.
///
/// Names keep the case they were first supplied with, except `Host`, which
/// is always stored as `Host` and always iterated first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderBag {
    headers: Vec<(String, Vec<String>)>,
}

impl HeaderBag {
    pub fn new() -> HeaderBag {
        HeaderBag::default()
    }

    pub fn contains(&self, header_name: &str) -> bool {
        self.position(header_name).is_some()
    }

    /// Returns the values of the header, or an empty slice when absent.
    pub fn get(&self, header_name: &str) -> &[String] {
        match self.position(header_name) {
            Some(index) => &self.headers[index].1,
            None => &[],
        }
    }

    /// Returns the values of the header joined by `", "`, or the empty string
    /// when absent.
    pub fn get_line(&self, header_name: &str) -> String {
        self.get(header_name).join(", ")
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns a copy where the header has exactly the given values.
    pub fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Result<Self, InvalidArgument> {
        validate_name(name)?;
        let values = validate_values(name, values.into())?;

        let mut bag = self.clone();
        match bag.position(name) {
            Some(index) => bag.headers[index].1 = values,
            None if is_host(name) => bag.headers.insert(0, (HOST.to_string(), values)),
            None => bag.headers.push((name.to_string(), values)),
        }
        Ok(bag)
    }

    /// Returns a copy where the given values are appended to the existing
    /// values of the header. The `Host` header can't hold a second value.
    pub fn with_added_header(&self, name: &str, values: impl Into<HeaderValues>) -> Result<Self, InvalidArgument> {
        validate_name(name)?;
        let values = validate_values(name, values.into())?;

        let mut bag = self.clone();
        match bag.position(name) {
            Some(..) if is_host(name) => {
                #[cfg(feature = "debugging")]
                tracing::trace!("Rejecting a second Host value");
                return Err(InvalidArgument::MultipleHostValues);
            }
            Some(index) => bag.headers[index].1.extend(values),
            None if is_host(name) => bag.headers.insert(0, (HOST.to_string(), values)),
            None => bag.headers.push((name.to_string(), values)),
        }
        Ok(bag)
    }

    /// Returns a copy without the header. Returns an equal bag when the
    /// header wasn't present.
    #[must_use]
    pub fn without_header(&self, header_name: &str) -> Self {
        let header_name = UniCase::ascii(header_name);
        Self {
            headers: self.headers.iter()
                .filter(|(name, _)| UniCase::ascii(name.as_str()) != header_name)
                .cloned()
                .collect(),
        }
    }

    /// Sets the `Host` header to a value derived from a [`Uri`](crate::Uri),
    /// whose host and port can't contain anything a field value forbids.
    pub(crate) fn with_uri_host(&self, value: String) -> Self {
        let mut bag = self.without_header(HOST);
        bag.headers.insert(0, (HOST.to_string(), vec![value]));
        bag
    }

    fn position(&self, header_name: &str) -> Option<usize> {
        let header_name = UniCase::ascii(header_name);
        self.headers.iter().position(|(name, _)| UniCase::ascii(name.as_str()) == header_name)
    }
}

impl<'a> IntoIterator for &'a HeaderBag {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[inline]
fn is_host(name: &str) -> bool {
    name.eq_ignore_ascii_case(HOST)
}

fn validate_name(name: &str) -> Result<(), InvalidArgument> {
    syntax::validate_token(name).map_err(|_reason| {
        #[cfg(feature = "debugging")]
        tracing::trace!("Invalid header name {name:?}: {}", _reason.as_ref());
        InvalidArgument::HeaderNameInvalid
    })
}

/// Trims every value and checks it is valid `field-content`.
fn validate_values(name: &str, values: HeaderValues) -> Result<Vec<String>, InvalidArgument> {
    if values.is_empty() {
        return Err(InvalidArgument::HeaderValueInvalid);
    }

    if is_host(name) && values.len() > 1 {
        return Err(InvalidArgument::MultipleHostValues);
    }

    values.0.into_iter()
        .map(|value| {
            let trimmed = syntax::trim_optional_whitespace(&value);
            if !syntax::is_valid_field_value(trimmed) {
                #[cfg(feature = "debugging")]
                tracing::trace!("Invalid value for header {name:?}: {value:?}");
                return Err(InvalidArgument::HeaderValueInvalid);
            }

            if trimmed.len() == value.len() {
                Ok(value)
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(bag: &HeaderBag) -> Vec<&str> {
        bag.iter().map(|(name, _)| name).collect()
    }

    #[rstest]
    #[case("Access-Control-Allow-Credentials")]
    #[case("Content-MD5")]
    #[case("Content-Security-Policy-Report-Only")]
    #[case("ETag")]
    #[case("HTTP")]
    #[case("P3P")]
    #[case("WWW-Authenticate")]
    #[case("X-XSS-Protection")]
    fn test_valid_header_names(#[case] name: &str) {
        let bag = HeaderBag::new().with_header(name, "c29tZSB2YWx1ZQ==").unwrap();
        assert_eq!(bag.get_line(name), "c29tZSB2YWx1ZQ==");

        let bag = HeaderBag::new().with_added_header(name, "c29tZSB2YWx1ZQ==").unwrap();
        assert_eq!(bag.get_line(name), "c29tZSB2YWx1ZQ==");
    }

    #[rstest]
    #[case("")]
    #[case("hey dude")]
    #[case("Location:")]
    #[case("This-is-a-cyrillic-о")]
    #[case("X-Foo\r-Bar")]
    #[case("X-Foo\n-Bar")]
    #[case("X-Foo\r\n-Bar")]
    fn test_invalid_header_names(#[case] name: &str) {
        assert_eq!(HeaderBag::new().with_header(name, "value"), Err(InvalidArgument::HeaderNameInvalid));
        assert_eq!(HeaderBag::new().with_added_header(name, "value"), Err(InvalidArgument::HeaderNameInvalid));
    }

    #[rstest]
    #[case("text/plain")]
    #[case("PHP 9.1")]
    #[case("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8")]
    #[case("gzip, deflate, br")]
    fn test_valid_header_values(#[case] value: &str) {
        let bag = HeaderBag::new().with_header("header", value).unwrap();
        assert_eq!(bag.get_line("header"), value);
    }

    #[rstest]
    #[case(HeaderValues::from("package http\r\nH: 0 0\r\n\r\n"))]
    #[case(HeaderValues::from("value\rinjection"))]
    #[case(HeaderValues::from("value\ninjection"))]
    #[case(HeaderValues::from(["valid", "in\r\nvalid"]))]
    #[case(HeaderValues::from(Vec::<String>::new()))]
    fn test_invalid_header_values(#[case] values: HeaderValues) {
        assert_eq!(HeaderBag::new().with_header("header", values.clone()), Err(InvalidArgument::HeaderValueInvalid));
        assert_eq!(HeaderBag::new().with_added_header("header", values), Err(InvalidArgument::HeaderValueInvalid));
    }

    #[test]
    fn test_added_header_aggregates_without_removing_duplicates() {
        let bag = HeaderBag::new()
            .with_header("Zoo", "a").unwrap()
            .with_added_header("zoo", ["b", "c", "a"]).unwrap();

        assert_eq!(bag.len(), 1);
        assert_eq!(bag.iter().next(), Some(("Zoo", &["a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()][..])));
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let bag = HeaderBag::new().with_header("LANGUAGE", "ru-RU").unwrap();
        assert_eq!(bag.get_line("Language"), "ru-RU");
        assert_eq!(bag.get("language"), ["ru-RU"]);
        assert!(bag.contains("lAnGuAgE"));
    }

    #[test]
    fn test_absent_header() {
        let bag = HeaderBag::new();
        assert!(bag.get("Accept").is_empty());
        assert_eq!(bag.get_line("Accept"), "");
        assert!(!bag.contains("Accept"));
    }

    #[test]
    fn test_lists_of_values() {
        let bag = HeaderBag::new().with_header("Foo", ["a", "b", "c"]).unwrap();
        assert_eq!(bag.get_line("Foo"), "a, b, c");

        let bag = HeaderBag::new()
            .with_header("Foo", "a").unwrap()
            .with_added_header("Foo", vec!["b", "c"]).unwrap();
        assert_eq!(bag.get_line("Foo"), "a, b, c");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let bag = HeaderBag::new().with_header("Zoo", ["elephant", "monkey, rhino", "t-rex!"]).unwrap();
        assert_eq!(bag.get_line("zoo"), "elephant, monkey, rhino, t-rex!");
    }

    #[test]
    fn test_with_header_replaces_values() {
        let bag = HeaderBag::new()
            .with_header("Foo", ["a", "b"]).unwrap()
            .with_header("foo", "c").unwrap();
        assert_eq!(bag.get("FOO"), ["c"]);
        assert_eq!(names(&bag), ["Foo"]);
    }

    #[test]
    fn test_host_is_first() {
        let bag = HeaderBag::new()
            .with_header("Foo", "Bar").unwrap()
            .with_header("Host", "foo.com").unwrap();
        assert_eq!(names(&bag), ["Host", "Foo"]);

        let bag = HeaderBag::new()
            .with_header("Foo", "Bar").unwrap()
            .with_added_header("host", "foo.com").unwrap();
        assert_eq!(names(&bag), ["Host", "Foo"]);
    }

    #[rstest]
    #[case("host")]
    #[case("hosT")]
    #[case("hOST")]
    #[case("HOST")]
    #[case("HoSt")]
    #[case("Host")]
    fn test_host_name_is_normalized(#[case] name: &str) {
        let bag = HeaderBag::new().with_header(name, "example.com").unwrap();
        assert_eq!(names(&bag), ["Host"]);
        assert_eq!(bag.get(HOST), ["example.com"]);
    }

    #[test]
    fn test_host_is_not_duplicated() {
        let bag = HeaderBag::new().with_header("Host", "example.com").unwrap();
        assert_eq!(bag.with_added_header("Host", "example.net"), Err(InvalidArgument::MultipleHostValues));

        let bag = bag.with_header("HOST", "example.net").unwrap();
        assert_eq!(bag.get_line("Host"), "example.net");
    }

    #[test]
    fn test_multiple_host_values_are_rejected() {
        assert_eq!(HeaderBag::new().with_header("Host", ["a.com", "b.com"]), Err(InvalidArgument::MultipleHostValues));
        assert_eq!(HeaderBag::new().with_added_header("Host", ["a.com", "b.com"]), Err(InvalidArgument::MultipleHostValues));
    }

    #[test]
    fn test_without_header() {
        let bag = HeaderBag::new()
            .with_header("Language", "ru").unwrap()
            .with_header("Accept", "*/*").unwrap();

        let removed = bag.without_header("LANGUAGE");
        assert_eq!(removed.get_line("Language"), "");
        assert_eq!(names(&removed), ["Accept"]);
        assert_eq!(bag.get_line("Language"), "ru");

        assert_eq!(bag.without_header("X-Absent"), bag);
    }

    #[test]
    fn test_values_are_trimmed() {
        let expected = ["Foo".to_string()];
        for bag in [
            HeaderBag::new().with_header("OWS", " \t \tFoo\t \t ").unwrap(),
            HeaderBag::new().with_added_header("OWS", " \t \tFoo\t \t ").unwrap(),
        ] {
            assert_eq!(bag.iter().collect::<Vec<_>>(), [("OWS", &expected[..])]);
            assert_eq!(bag.get_line("OWS"), "Foo");
        }
    }

    #[test]
    fn test_mutators_preserve_original() {
        let bag = HeaderBag::new().with_header("X-Name", "value").unwrap();
        let _ = bag.with_header("X-Name", "value-replaced").unwrap();
        let _ = bag.with_added_header("X-Name", "value-added").unwrap();
        let _ = bag.without_header("X-Name");
        assert_eq!(bag.get_line("X-Name"), "value");
    }
}
