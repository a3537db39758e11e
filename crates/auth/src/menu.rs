use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use pagegate_core::MenuId;

/// One navigation entry the identity is authorized to see.
///
/// Order within the sequence returned by the backend is the rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedMenuEntry {
    #[serde(default)]
    pub id: Option<MenuId>,

    #[serde(default, alias = "nome")]
    pub name: Option<String>,

    /// Target page of the entry.
    #[serde(default, alias = "url")]
    pub path: Option<String>,

    /// Presentation-neutral icon key (mapped to a concrete icon by the renderer).
    #[serde(default, alias = "icone")]
    pub icon: Option<String>,
}

/// How an allowed-page entry is compared with the current path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatch {
    /// Equal, or the entry is a plain string suffix of the path.
    ///
    /// Tolerates pages mounted under a prefix, but `/orders` also matches an
    /// entry `rders`.
    #[default]
    Suffix,
    /// Equal, or the entry is a suffix starting on a `/` boundary of the path.
    Segment,
}

impl PathMatch {
    pub fn matches(self, path: &str, entry: &str) -> bool {
        if path == entry {
            return true;
        }
        if !path.ends_with(entry) {
            return false;
        }
        match self {
            PathMatch::Suffix => true,
            PathMatch::Segment => {
                let head = &path[..path.len() - entry.len()];
                entry.starts_with('/') || head.ends_with('/')
            }
        }
    }
}

impl core::str::FromStr for PathMatch {
    type Err = pagegate_core::GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suffix" => Ok(PathMatch::Suffix),
            "segment" => Ok(PathMatch::Segment),
            other => Err(pagegate_core::GateError::validation(format!(
                "unknown path match mode '{other}'"
            ))),
        }
    }
}

/// Server-declared set of pages the identity may visit.
///
/// An empty set means "permissions not configured", never "everything allowed".
/// Blank entries are dropped on construction: an empty string is a suffix of
/// every path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AllowedPageSet(BTreeSet<String>);

impl AllowedPageSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether `path` is covered by any entry under the given matching mode.
    pub fn permits(&self, path: &str, mode: PathMatch) -> bool {
        self.0.iter().any(|entry| mode.matches(path, entry))
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedPageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
        )
    }
}

impl From<Vec<String>> for AllowedPageSet {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<AllowedPageSet> for Vec<String> {
    fn from(value: AllowedPageSet) -> Self {
        value.0.into_iter().collect()
    }
}
