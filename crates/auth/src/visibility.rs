//! Capability-based visibility of UI elements.
//!
//! Hiding is cosmetic: the backend enforces the same checks on every action an
//! element triggers.

use serde::{Deserialize, Serialize};

use crate::{Identity, Permission, Role};

/// What an element requires to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Permission(Permission),
    AnyRole(Vec<Role>),
}

impl Capability {
    pub fn permission(name: impl Into<String>) -> Self {
        Capability::Permission(Permission::new(name.into()))
    }

    /// Build a role requirement from a comma-separated list ("A, B").
    pub fn roles_from_list(list: &str) -> Self {
        Capability::AnyRole(Role::parse_list(list))
    }
}

/// Binding of one element key to the capability it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBinding<K> {
    pub element: K,
    pub requires: Capability,
}

impl<K> ElementBinding<K> {
    pub fn new(element: K, requires: Capability) -> Self {
        Self { element, requires }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Whether the identity holds `permission`. Admin accounts hold every permission.
pub fn has_permission(identity: Option<&Identity>, permission: &Permission) -> bool {
    match identity {
        None => false,
        Some(identity) => identity.is_admin() || identity.holds(permission),
    }
}

/// Whether the identity's role is one of `roles`. Admin accounts match any list.
pub fn has_role(identity: Option<&Identity>, roles: &[Role]) -> bool {
    match identity {
        None => false,
        Some(identity) => {
            identity.is_admin()
                || identity
                    .role
                    .as_ref()
                    .is_some_and(|role| roles.contains(role))
        }
    }
}

pub fn is_satisfied(identity: Option<&Identity>, capability: &Capability) -> bool {
    match capability {
        Capability::Permission(permission) => has_permission(identity, permission),
        Capability::AnyRole(roles) => has_role(identity, roles),
    }
}

/// Resolve the visibility of every bound element, in binding order.
pub fn filter<'a, K>(
    identity: Option<&Identity>,
    bindings: &'a [ElementBinding<K>],
) -> Vec<(&'a K, Visibility)> {
    let resolved: Vec<(&K, Visibility)> = bindings
        .iter()
        .map(|binding| {
            let visibility = if is_satisfied(identity, &binding.requires) {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            (&binding.element, visibility)
        })
        .collect();

    let hidden = resolved
        .iter()
        .filter(|(_, visibility)| *visibility == Visibility::Hidden)
        .count();
    tracing::debug!(total = resolved.len(), hidden, "visibility filter applied");

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountKind;
    use pagegate_core::UserId;
    use std::collections::BTreeSet;

    fn identity(kind: AccountKind, role: Option<&str>, permissions: &[&str]) -> Identity {
        Identity {
            id: UserId::new("9").unwrap(),
            name: "Bea".to_string(),
            email: None,
            kind,
            role: role.map(|r| Role::new(r.to_string())),
            home_page: None,
            permissions: permissions
                .iter()
                .map(|p| Permission::new(p.to_string()))
                .collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn permission_bindings_follow_the_permission_set() {
        let buyer = identity(AccountKind::Standard, Some("Buyer"), &["criar_solicitacao"]);
        let bindings = vec![
            ElementBinding::new("new-request", Capability::permission("criar_solicitacao")),
            ElementBinding::new("approve", Capability::permission("aprovar_solicitacao")),
        ];

        let result = filter(Some(&buyer), &bindings);
        assert_eq!(
            result,
            vec![(&"new-request", Visibility::Visible), (&"approve", Visibility::Hidden)]
        );
    }

    #[test]
    fn role_bindings_accept_any_listed_role() {
        let checker = identity(AccountKind::Standard, Some("Conferente / Estoque"), &[]);
        let capability = Capability::roles_from_list("Comprador (PJ), Conferente / Estoque");
        assert!(is_satisfied(Some(&checker), &capability));

        let other = Capability::roles_from_list("Financeiro");
        assert!(!is_satisfied(Some(&checker), &other));
    }

    #[test]
    fn admin_sees_everything() {
        let admin = identity(AccountKind::Admin, None, &[]);
        assert!(has_permission(Some(&admin), &Permission::new("anything")));
        assert!(has_role(Some(&admin), &[Role::new("Financeiro")]));
    }

    #[test]
    fn missing_identity_sees_nothing() {
        let bindings = vec![ElementBinding::new(1u32, Capability::roles_from_list("A"))];
        assert_eq!(filter(None, &bindings), vec![(&1u32, Visibility::Hidden)]);
        assert!(!has_permission(None, &Permission::new("x")));
    }
}
