use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name assigned to an identity (e.g. "Administrador", "Comprador (PJ)").
///
/// Roles are opaque strings at this layer; the backend owns the mapping from
/// roles to pages and menus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated role list, trimming and skipping blanks.
    pub fn parse_list(list: &str) -> Vec<Role> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Role::new(name.to_string()))
            .collect()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
