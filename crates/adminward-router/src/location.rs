//! In-app locations: a path plus query parameters.
//!
//! Parsing percent-decodes both parts. Formatting encodes each `/`-separated
//! piece on its own, so slashes inside a query value stay readable:
//! `/login?redirect=/heritage/list`, not `/login?redirect=%2Fheritage%2Flist`.

use std::fmt;
use std::str::FromStr;

use crate::RouterError;

/// A navigation target or origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    /// A location with no query. `path` is taken as-is.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parses `/path?key=value&...`. A `#fragment` is dropped.
    ///
    /// # Errors
    /// [`RouterError::InvalidPath`] if the path is not absolute or a part
    /// is not valid percent-encoded UTF-8.
    pub fn parse(input: &str) -> Result<Self, RouterError> {
        let without_fragment = input.split('#').next().unwrap_or_default();
        let (raw_path, raw_query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        if !raw_path.starts_with('/') {
            return Err(RouterError::invalid(input, "path must start with '/'"));
        }

        let path = decode(input, raw_path)?;
        let mut query = Vec::new();
        for pair in raw_query.unwrap_or_default().split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            query.push((decode(input, key)?, decode(input, value)?));
        }

        Ok(Self { path, query })
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Replaces the query with `query`.
    pub(crate) fn with_query_pairs(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// The first value for `key`, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl FromStr for Location {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(&self.path))?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", encode(key), encode(value))?;
        }
        Ok(())
    }
}

fn decode(input: &str, part: &str) -> Result<String, RouterError> {
    urlencoding::decode(part)
        .map(|s| s.into_owned())
        .map_err(|e| RouterError::invalid(input, e.to_string()))
}

fn encode(part: &str) -> String {
    part.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_only() {
        let loc = Location::parse("/dashboard").unwrap();

        assert_eq!(loc.path(), "/dashboard");
        assert!(loc.query().is_empty());
    }

    #[test]
    fn test_parse_query_and_fragment() {
        let loc = Location::parse("/login?redirect=%2Fuser%2Fadmin&x=1#top").unwrap();

        assert_eq!(loc.path(), "/login");
        assert_eq!(loc.query_value("redirect"), Some("/user/admin"));
        assert_eq!(loc.query_value("x"), Some("1"));
        assert_eq!(loc.query_value("missing"), None);
    }

    #[test]
    fn test_parse_key_without_value() {
        let loc = Location::parse("/log/list?debug").unwrap();

        assert_eq!(loc.query_value("debug"), Some(""));
    }

    #[test]
    fn test_parse_relative_path_is_invalid() {
        let err = Location::parse("dashboard").unwrap_err();

        assert!(matches!(err, RouterError::InvalidPath { .. }));
        assert!(Location::parse("").is_err());
        assert!(Location::parse("https://evil.example/x").is_err());
    }

    #[test]
    fn test_parse_bad_encoding_is_invalid() {
        assert!(Location::parse("/x?y=%FF%FE").is_err());
    }

    #[test]
    fn test_display_keeps_slashes_in_query_values() {
        let loc = Location::new("/login").with_query("redirect", "/dashboard");

        assert_eq!(loc.to_string(), "/login?redirect=/dashboard");
    }

    #[test]
    fn test_display_encodes_reserved_characters() {
        let loc = Location::new("/login").with_query("redirect", "/search/a b&c");

        assert_eq!(loc.to_string(), "/login?redirect=/search/a%20b%26c");
        assert_eq!(Location::parse(&loc.to_string()).unwrap(), loc);
    }
}
