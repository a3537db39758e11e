use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use pagegate_core::UserId;

use crate::{Permission, Role};

/// Kind of account backing an identity.
///
/// Any kind the backend reports other than `admin` is treated as a standard
/// account; only `admin` unlocks the administrator bypass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AccountKind {
    #[default]
    Standard,
    Admin,
}

impl From<String> for AccountKind {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            AccountKind::Admin
        } else {
            AccountKind::Standard
        }
    }
}

/// Resolved profile of the current user, as returned by `GET /auth/me`.
///
/// An identity is replaced wholesale on each resolution; it is never patched in
/// place. Field aliases accept the backend's legacy payload keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,

    #[serde(default, alias = "nome")]
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, alias = "tipo")]
    pub kind: AccountKind,

    /// Role name, or `None` when the account has no role assigned.
    #[serde(default, alias = "perfil")]
    pub role: Option<Role>,

    /// Page the user lands on after login.
    #[serde(default, alias = "tela_inicial")]
    pub home_page: Option<String>,

    #[serde(default, alias = "permissoes", deserialize_with = "deserialize_permissions")]
    pub permissions: BTreeSet<Permission>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.kind == AccountKind::Admin
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(Role::as_str)
    }

    pub fn holds(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Label shown in page headers: the display name, falling back to the email.
    pub fn display_label(&self) -> &str {
        if !self.name.trim().is_empty() {
            return &self.name;
        }
        self.email.as_deref().unwrap_or_default()
    }
}

/// The backend reports permissions either as a list or as a `{name: bool}` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPermissions {
    List(Vec<Permission>),
    Flags(BTreeMap<String, bool>),
}

fn deserialize_permissions<'de, D>(deserializer: D) -> Result<BTreeSet<Permission>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawPermissions>::deserialize(deserializer)?;
    Ok(match raw {
        None => BTreeSet::new(),
        Some(RawPermissions::List(list)) => list.into_iter().collect(),
        Some(RawPermissions::Flags(flags)) => flags
            .into_iter()
            .filter(|(_, granted)| *granted)
            .map(|(name, _)| Permission::new(name))
            .collect(),
    })
}
