//! Page access policy.
//!
//! Decides, from the resolved identity state and the current location, whether a
//! page may be shown and where to send the user when it may not.
//!
//! - No IO
//! - No panics
//! - Fail-closed: missing role or an empty allowed-page set deny access

use serde::{Deserialize, Serialize};

use crate::{AccountKind, AllowedPageSet, Identity, PathMatch, Role};

/// Pages and role names the policy is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Unauthenticated entry (login) page.
    pub entry_page: String,
    /// Other paths serving the entry page.
    pub entry_aliases: Vec<String>,
    pub access_denied_page: String,
    /// Landing page for identities without a home page of their own.
    pub default_home_page: String,
    pub admin_role: Role,
    /// Role name the backend reports for accounts without a role.
    pub no_role_sentinel: String,
    pub path_match: PathMatch,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            entry_page: "/".to_string(),
            entry_aliases: vec!["/index.html".to_string()],
            access_denied_page: "/acesso-negado.html".to_string(),
            default_home_page: "/dashboard.html".to_string(),
            admin_role: Role::new("Administrador"),
            no_role_sentinel: "Sem perfil".to_string(),
            path_match: PathMatch::Suffix,
        }
    }
}

impl PolicyConfig {
    pub fn is_entry_page(&self, path: &str) -> bool {
        path == self.entry_page || self.entry_aliases.iter().any(|alias| alias == path)
    }

    /// Public pages are shown regardless of identity or resolution state.
    pub fn is_public(&self, path: &str) -> bool {
        self.is_entry_page(path) || path == self.access_denied_page
    }

    /// Admin account kind, or the administrator role.
    pub fn is_administrator(&self, identity: &Identity) -> bool {
        identity.kind == AccountKind::Admin || identity.role.as_ref() == Some(&self.admin_role)
    }

    pub fn has_role_assigned(&self, identity: &Identity) -> bool {
        match identity.role_name() {
            None => false,
            Some(name) => {
                let name = name.trim();
                !name.is_empty() && name != self.no_role_sentinel
            }
        }
    }

    /// Label shown for the identity's role in page headers.
    pub fn role_label<'a>(&'a self, identity: &'a Identity) -> &'a str {
        if self.has_role_assigned(identity) {
            identity.role_name().unwrap_or(self.no_role_sentinel.as_str())
        } else {
            &self.no_role_sentinel
        }
    }

    /// Where to send the identity after login or when asked to go "home".
    pub fn home_for(&self, identity: Option<&Identity>) -> String {
        identity
            .and_then(|identity| identity.home_page.as_deref())
            .map(str::trim)
            .filter(|page| !page.is_empty())
            .unwrap_or(self.default_home_page.as_str())
            .to_string()
    }
}

/// Resolution state as seen by the policy.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// Identity and navigation data have not been fetched yet.
    NotLoaded,
    /// Fetch completed (possibly degraded, possibly without identity).
    Loaded {
        identity: Option<&'a Identity>,
        allowed_pages: &'a AllowedPageSet,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    PublicPage,
    Administrator,
    AllowedPage,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Resolution in flight; caller should defer and re-check.
    Pending,
    /// No identity after resolution.
    Unauthenticated,
    /// Identity has no role (configuration error).
    MissingRole,
    /// Allowed-page set is empty (configuration error).
    PermissionsNotConfigured,
    /// Ordinary denial: page not in the allowed set.
    PageNotPermitted,
}

impl DenialKind {
    /// Denials caused by incomplete backend configuration rather than policy.
    pub fn is_configuration_error(self) -> bool {
        matches!(
            self,
            DenialKind::MissingRole | DenialKind::PermissionsNotConfigured
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub kind: DenialKind,
    /// Page to navigate to, or `None` when the caller must defer.
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Granted { grant: GrantKind },
    Denied(Denial),
}

impl AccessDecision {
    fn granted(grant: GrantKind) -> Self {
        AccessDecision::Granted { grant }
    }

    fn denied(kind: DenialKind, redirect: Option<&str>) -> Self {
        AccessDecision::Denied(Denial {
            kind,
            redirect: redirect.map(str::to_string),
        })
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted { .. })
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            AccessDecision::Granted { .. } => None,
            AccessDecision::Denied(denial) => denial.redirect.as_deref(),
        }
    }

    pub fn denial_kind(&self) -> Option<DenialKind> {
        match self {
            AccessDecision::Granted { .. } => None,
            AccessDecision::Denied(denial) => Some(denial.kind),
        }
    }
}

/// Decide whether `current_path` may be shown. First matching rule wins.
pub fn evaluate(
    config: &PolicyConfig,
    resolution: Resolution<'_>,
    current_path: &str,
) -> AccessDecision {
    if config.is_public(current_path) {
        return AccessDecision::granted(GrantKind::PublicPage);
    }

    let (identity, allowed_pages) = match resolution {
        Resolution::NotLoaded => {
            tracing::debug!(path = current_path, "access check deferred: resolution pending");
            return AccessDecision::denied(DenialKind::Pending, None);
        }
        Resolution::Loaded {
            identity,
            allowed_pages,
        } => (identity, allowed_pages),
    };

    let Some(identity) = identity else {
        tracing::warn!(path = current_path, "no identity after resolution; sending to entry page");
        return AccessDecision::denied(
            DenialKind::Unauthenticated,
            Some(config.entry_page.as_str()),
        );
    };

    if config.is_administrator(identity) {
        return AccessDecision::granted(GrantKind::Administrator);
    }

    if !config.has_role_assigned(identity) {
        tracing::error!(
            user_id = %identity.id,
            path = current_path,
            "configuration error: identity has no role assigned; denying access"
        );
        return AccessDecision::denied(
            DenialKind::MissingRole,
            Some(config.access_denied_page.as_str()),
        );
    }

    if allowed_pages.is_empty() {
        tracing::error!(
            user_id = %identity.id,
            role = identity.role_name().unwrap_or_default(),
            path = current_path,
            "configuration error: no allowed pages configured for role; denying access"
        );
        return AccessDecision::denied(
            DenialKind::PermissionsNotConfigured,
            Some(config.access_denied_page.as_str()),
        );
    }

    if allowed_pages.permits(current_path, config.path_match) {
        tracing::info!(path = current_path, "page access granted");
        AccessDecision::granted(GrantKind::AllowedPage)
    } else {
        tracing::warn!(
            user_id = %identity.id,
            path = current_path,
            allowed = allowed_pages.len(),
            "page access denied"
        );
        AccessDecision::denied(
            DenialKind::PageNotPermitted,
            Some(config.access_denied_page.as_str()),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation (diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable explanation of an access decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub path: String,
    pub decision: AccessDecision,
    pub reason: String,
    pub account_kind: Option<AccountKind>,
    pub role: Option<String>,
    pub allowed_pages: Vec<String>,
    pub path_match: PathMatch,
}

/// Evaluate and explain why the decision was made.
pub fn explain_access(
    config: &PolicyConfig,
    resolution: Resolution<'_>,
    current_path: &str,
) -> AccessExplanation {
    let decision = evaluate(config, resolution, current_path);

    let (identity, allowed_pages) = match resolution {
        Resolution::NotLoaded => (None, Vec::new()),
        Resolution::Loaded {
            identity,
            allowed_pages,
        } => (identity, allowed_pages.iter().map(str::to_string).collect()),
    };

    let reason = match &decision {
        AccessDecision::Granted { grant } => match grant {
            GrantKind::PublicPage => format!("'{current_path}' is a public page"),
            GrantKind::Administrator => "administrators bypass the allowed-page set".to_string(),
            GrantKind::AllowedPage => {
                format!("'{current_path}' matches an allowed page ({:?} match)", config.path_match)
            }
        },
        AccessDecision::Denied(denial) => match denial.kind {
            DenialKind::Pending => "identity resolution has not completed".to_string(),
            DenialKind::Unauthenticated => "no identity is present".to_string(),
            DenialKind::MissingRole => "identity has no role assigned".to_string(),
            DenialKind::PermissionsNotConfigured => {
                "no allowed pages are configured for the role".to_string()
            }
            DenialKind::PageNotPermitted => {
                format!("'{current_path}' matches none of the allowed pages")
            }
        },
    };

    AccessExplanation {
        path: current_path.to_string(),
        decision,
        reason,
        account_kind: identity.map(|identity| identity.kind),
        role: identity.and_then(Identity::role_name).map(str::to_string),
        allowed_pages,
        path_match: config.path_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagegate_core::UserId;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn identity(kind: AccountKind, role: Option<&str>) -> Identity {
        Identity {
            id: UserId::new("1").unwrap(),
            name: "Test".to_string(),
            email: None,
            kind,
            role: role.map(|r| Role::new(r.to_string())),
            home_page: None,
            permissions: BTreeSet::new(),
        }
    }

    fn pages(entries: &[&str]) -> AllowedPageSet {
        entries.iter().copied().collect()
    }

    fn loaded<'a>(identity: &'a Identity, allowed: &'a AllowedPageSet) -> Resolution<'a> {
        Resolution::Loaded {
            identity: Some(identity),
            allowed_pages: allowed,
        }
    }

    #[test]
    fn buyer_reaches_allowed_page() {
        let config = PolicyConfig::default();
        let buyer = identity(AccountKind::Standard, Some("Buyer"));
        let allowed = pages(&["/orders.html"]);

        let decision = evaluate(&config, loaded(&buyer, &allowed), "/orders.html");
        assert_eq!(decision, AccessDecision::granted(GrantKind::AllowedPage));
    }

    #[test]
    fn buyer_is_sent_to_access_denied_for_other_pages() {
        let config = PolicyConfig::default();
        let buyer = identity(AccountKind::Standard, Some("Buyer"));
        let allowed = pages(&["/orders.html"]);

        let decision = evaluate(&config, loaded(&buyer, &allowed), "/admin.html");
        assert_eq!(decision.redirect(), Some("/acesso-negado.html"));
        assert_eq!(decision.denial_kind(), Some(DenialKind::PageNotPermitted));
    }

    #[test]
    fn missing_identity_goes_to_entry_page() {
        let config = PolicyConfig::default();
        let allowed = pages(&["/orders.html"]);
        let resolution = Resolution::Loaded {
            identity: None,
            allowed_pages: &allowed,
        };

        let decision = evaluate(&config, resolution, "/orders.html");
        assert_eq!(decision.redirect(), Some("/"));
        assert_eq!(decision.denial_kind(), Some(DenialKind::Unauthenticated));
    }

    #[test]
    fn admin_role_name_bypasses_like_admin_kind() {
        let config = PolicyConfig::default();
        let admin = identity(AccountKind::Standard, Some("Administrador"));
        let allowed = AllowedPageSet::empty();

        assert!(evaluate(&config, loaded(&admin, &allowed), "/usuarios.html").is_granted());
    }

    #[test]
    fn no_role_sentinel_is_a_configuration_error() {
        let config = PolicyConfig::default();
        let user = identity(AccountKind::Standard, Some("Sem perfil"));
        let allowed = pages(&["/orders.html"]);

        let decision = evaluate(&config, loaded(&user, &allowed), "/orders.html");
        let kind = decision.denial_kind().unwrap();
        assert_eq!(kind, DenialKind::MissingRole);
        assert!(kind.is_configuration_error());
        assert!(!DenialKind::PageNotPermitted.is_configuration_error());
    }

    #[test]
    fn segment_mode_tightens_partial_suffix_matches() {
        let buyer = identity(AccountKind::Standard, Some("Buyer"));
        let allowed = pages(&["rders"]);

        let legacy = PolicyConfig::default();
        assert!(evaluate(&legacy, loaded(&buyer, &allowed), "/orders").is_granted());

        let strict = PolicyConfig {
            path_match: PathMatch::Segment,
            ..PolicyConfig::default()
        };
        let decision = evaluate(&strict, loaded(&buyer, &allowed), "/orders");
        assert_eq!(decision.denial_kind(), Some(DenialKind::PageNotPermitted));
    }

    #[test]
    fn home_prefers_identity_page() {
        let config = PolicyConfig::default();
        let mut user = identity(AccountKind::Standard, Some("Buyer"));
        assert_eq!(config.home_for(Some(&user)), "/dashboard.html");
        assert_eq!(config.home_for(None), "/dashboard.html");

        user.home_page = Some("/solicitacoes.html".to_string());
        assert_eq!(config.home_for(Some(&user)), "/solicitacoes.html");
    }

    #[test]
    fn role_label_uses_sentinel_when_unassigned() {
        let config = PolicyConfig::default();
        assert_eq!(config.role_label(&identity(AccountKind::Standard, None)), "Sem perfil");
        assert_eq!(
            config.role_label(&identity(AccountKind::Standard, Some("Buyer"))),
            "Buyer"
        );
    }

    #[test]
    fn explanation_reports_configuration_errors() {
        let config = PolicyConfig::default();
        let user = identity(AccountKind::Standard, Some("Buyer"));
        let allowed = AllowedPageSet::empty();

        let explanation = explain_access(&config, loaded(&user, &allowed), "/orders.html");
        assert!(!explanation.decision.is_granted());
        assert_eq!(explanation.role.as_deref(), Some("Buyer"));
        assert!(explanation.reason.contains("no allowed pages"));

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["decision"]["decision"], "denied");
        assert_eq!(json["decision"]["kind"], "permissions_not_configured");
    }

    fn arb_path() -> impl Strategy<Value = String> {
        "/[a-z_]{1,12}(\\.html)?"
    }

    fn arb_pages() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_path(), 0..6)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: admin accounts are granted every path, listed or not.
        #[test]
        fn admin_is_granted_everywhere(path in arb_path(), allowed in arb_pages()) {
            let config = PolicyConfig::default();
            let admin = identity(AccountKind::Admin, None);
            let allowed: AllowedPageSet = allowed.into();
            prop_assert!(evaluate(&config, loaded(&admin, &allowed), &path).is_granted());
        }

        /// Property: identities without a role are denied even with pages configured.
        #[test]
        fn roleless_identity_is_denied(path in arb_path(), allowed in arb_pages()) {
            let config = PolicyConfig::default();
            let user = identity(AccountKind::Standard, None);
            let mut allowed = allowed;
            allowed.push(path.clone());
            let allowed: AllowedPageSet = allowed.into();

            let decision = evaluate(&config, loaded(&user, &allowed), &path);
            if !config.is_public(&path) {
                prop_assert_eq!(decision.redirect(), Some("/acesso-negado.html"));
                prop_assert_eq!(decision.denial_kind(), Some(DenialKind::MissingRole));
            }
        }

        /// Property: an empty allowed-page set never grants a protected page.
        #[test]
        fn empty_set_fails_closed(path in arb_path(), role in "[A-Z][a-z]{2,10}") {
            let config = PolicyConfig::default();
            prop_assume!(role != config.admin_role.as_str());
            prop_assume!(!config.is_public(&path));
            let user = identity(AccountKind::Standard, Some(role.as_str()));
            let allowed = AllowedPageSet::empty();

            let decision = evaluate(&config, loaded(&user, &allowed), &path);
            prop_assert!(!decision.is_granted());
            prop_assert_eq!(decision.redirect(), Some("/acesso-negado.html"));
        }

        /// Property: public pages are granted in any state.
        #[test]
        fn public_pages_always_granted(
            page in prop::sample::select(vec!["/", "/index.html", "/acesso-negado.html"]),
            loaded_state in any::<bool>(),
        ) {
            let config = PolicyConfig::default();
            let allowed = AllowedPageSet::empty();
            let resolution = if loaded_state {
                Resolution::Loaded { identity: None, allowed_pages: &allowed }
            } else {
                Resolution::NotLoaded
            };
            prop_assert!(evaluate(&config, resolution, page).is_granted());
        }

        /// Property: before resolution completes, protected pages defer without a redirect.
        #[test]
        fn pending_resolution_defers(path in arb_path()) {
            let config = PolicyConfig::default();
            prop_assume!(!config.is_public(&path));
            let decision = evaluate(&config, Resolution::NotLoaded, &path);
            prop_assert_eq!(decision.denial_kind(), Some(DenialKind::Pending));
            prop_assert_eq!(decision.redirect(), None);
        }
    }
}
