//! Page path helpers.

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Location of a page within the site (e.g. `/orders.html`).
///
/// Query strings and fragments are dropped on construction; the gate only ever
/// decides on the path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PagePath(String);

impl PagePath {
    pub fn parse(raw: &str) -> Result<Self, GateError> {
        let trimmed = raw.trim();
        let path = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        if path.is_empty() {
            return Err(GateError::invalid_path("path must not be empty"));
        }
        if !path.starts_with('/') {
            return Err(GateError::invalid_path(format!("'{path}' is not absolute")));
        }

        Ok(Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PagePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PagePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_and_fragment_are_stripped() {
        let path = PagePath::parse("/orders.html?id=3#top").unwrap();
        assert_eq!(path.as_str(), "/orders.html");
    }

    #[test]
    fn relative_and_empty_paths_are_rejected() {
        assert!(PagePath::parse("orders.html").is_err());
        assert!(PagePath::parse("?x=1").is_err());
        assert!(PagePath::parse("").is_err());
    }
}
