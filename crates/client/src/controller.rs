//! Page controller: the single entry point page code talks to.
//!
//! Resolution, gating and rendering run strictly in that order. This is the only
//! place that navigates the browsing context or clears the credential.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use pagegate_auth::{
    evaluate, explain_access, visibility, AccessDecision, AccessExplanation, DenialKind,
    ElementBinding, Identity, Permission, PolicyConfig, Resolution, Role, Visibility,
};
use pagegate_core::PagePath;

use crate::config::{ClientConfig, ConfigError};
use crate::fetcher::{AuthenticatedFetcher, FetchOutcome, RequestOptions};
use crate::navigation::{self, Navigation};
use crate::resolver::{self, ResolveOutcome, SignOutReason};
use crate::session::{SessionContext, SessionSnapshot};
use crate::token_store::{Credential, TokenStore};
use crate::types::{ErrorBody, LoginRequest, LoginResponse};

pub const LOGIN_PATH: &str = "/auth/login";

/// Full-page navigation of the browsing context.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// What page code gets back from [`PageController::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome<K> {
    /// Access granted; navigation and element visibility are ready to apply.
    Rendered(PageView<K>),
    /// No usable identity. Navigation to the entry page already happened when needed.
    SignedOut,
    /// The identity could not be loaded (transport or parse failure). The
    /// credential is kept; nothing is rendered and no navigation happens.
    Unavailable,
    /// Access denied; navigation to `target` already happened.
    Redirected { target: String, kind: DenialKind },
    /// Resolution has not completed; check again later.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView<K> {
    pub navigation: Navigation,
    pub visibility: Vec<(K, Visibility)>,
    /// Display name, falling back to the email.
    pub user_label: String,
    pub role_label: String,
}

impl<K> PageView<K> {
    pub fn hidden(&self) -> impl Iterator<Item = &K> {
        self.visibility
            .iter()
            .filter(|(_, visibility)| *visibility == Visibility::Hidden)
            .map(|(element, _)| element)
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("login rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("login failed: {0}")]
    Transport(String),
    #[error("backend returned an unusable token: {0}")]
    InvalidToken(#[from] pagegate_core::GateError),
    #[error("failed to store credential: {0}")]
    Storage(#[from] crate::token_store::TokenStoreError),
}

/// Authorization gate for one page load.
pub struct PageController {
    config: ClientConfig,
    fetcher: AuthenticatedFetcher,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    session: SessionContext,
    current_path: PagePath,
}

impl PageController {
    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        location: &str,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let current_path = PagePath::parse(location)?;
        let fetcher = AuthenticatedFetcher::new(&config, tokens.clone())?;
        Ok(Self {
            config,
            fetcher,
            tokens,
            navigator,
            session: SessionContext::new(),
            current_path,
        })
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.config.policy
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn current_path(&self) -> &str {
        self.current_path.as_str()
    }

    /// Resolve identity and navigation, handling sign-out side effects.
    ///
    /// `None` means the session ended (or never started). A snapshot without
    /// identity means `/auth/me` could not be reached; the credential is kept.
    pub async fn resolve(&self) -> Option<Arc<SessionSnapshot>> {
        match resolver::resolve(&self.fetcher, &self.session).await {
            ResolveOutcome::Resolved(snapshot) => Some(snapshot),
            ResolveOutcome::SignedOut(SignOutReason::NoCredential) => {
                if !self.policy().is_public(self.current_path()) {
                    self.navigator.navigate(&self.policy().entry_page);
                }
                None
            }
            ResolveOutcome::SignedOut(reason) => {
                tracing::info!(?reason, "signing out");
                self.sign_out().await;
                None
            }
        }
    }

    /// Evaluate the current page against the session as it stands.
    pub fn check_access(&self) -> AccessDecision {
        let snapshot = self.session.snapshot();
        evaluate(self.policy(), self.resolution(snapshot.as_deref()), self.current_path())
    }

    pub fn explain_access(&self) -> AccessExplanation {
        let snapshot = self.session.snapshot();
        explain_access(self.policy(), self.resolution(snapshot.as_deref()), self.current_path())
    }

    fn resolution<'a>(&self, snapshot: Option<&'a SessionSnapshot>) -> Resolution<'a> {
        match snapshot {
            Some(snapshot) => snapshot.resolution(),
            None => Resolution::NotLoaded,
        }
    }

    /// Resolve, gate, then render navigation and element visibility.
    pub async fn initialize<K: Clone>(&self, bindings: &[ElementBinding<K>]) -> PageOutcome<K> {
        let Some(snapshot) = self.resolve().await else {
            return PageOutcome::SignedOut;
        };
        let Some(identity) = snapshot.identity.as_ref() else {
            return PageOutcome::Unavailable;
        };

        match evaluate(self.policy(), snapshot.resolution(), self.current_path()) {
            AccessDecision::Granted { .. } => {}
            AccessDecision::Denied(denial) => {
                return match denial.redirect {
                    Some(target) => {
                        self.navigator.navigate(&target);
                        PageOutcome::Redirected {
                            target,
                            kind: denial.kind,
                        }
                    }
                    None => PageOutcome::Deferred,
                };
            }
        }

        let navigation = navigation::render(
            &snapshot.menus,
            self.current_path(),
            &self.config.create_action_fallback,
        );
        let visibility = visibility::filter(Some(identity), bindings)
            .into_iter()
            .map(|(element, visibility)| (element.clone(), visibility))
            .collect();

        PageOutcome::Rendered(PageView {
            navigation,
            visibility,
            user_label: identity.display_label().to_string(),
            role_label: self.policy().role_label(identity).to_string(),
        })
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session
            .snapshot()
            .and_then(|snapshot| snapshot.identity.clone())
    }

    /// Whether the current identity holds `permission` (admins hold all).
    pub fn has_permission(&self, permission: &str) -> bool {
        let snapshot = self.session.snapshot();
        visibility::has_permission(
            snapshot.as_deref().and_then(|s| s.identity.as_ref()),
            &Permission::new(permission.to_string()),
        )
    }

    /// Whether the current identity has one of `roles` (admins match all).
    pub fn has_role(&self, roles: &[&str]) -> bool {
        let snapshot = self.session.snapshot();
        let roles: Vec<Role> = roles.iter().map(|r| Role::new(r.to_string())).collect();
        visibility::has_role(snapshot.as_deref().and_then(|s| s.identity.as_ref()), &roles)
    }

    /// Authenticated request for page code. `None` means "do not proceed":
    /// on a rejected credential the session was already ended.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Option<reqwest::Response> {
        match self.fetcher.request(path, options).await {
            FetchOutcome::Ok(resp) => Some(resp),
            FetchOutcome::Unauthorized => {
                self.sign_out().await;
                None
            }
            FetchOutcome::NetworkError(err) => {
                tracing::warn!(path, "request failed: {err}");
                None
            }
        }
    }

    /// Exchange email and password for a credential and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, LoginError> {
        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        let resp = match self.fetcher.request(LOGIN_PATH, RequestOptions::post_json(body)).await {
            FetchOutcome::Ok(resp) => resp,
            FetchOutcome::Unauthorized => return Err(LoginError::InvalidCredentials),
            FetchOutcome::NetworkError(err) => return Err(LoginError::Transport(err.to_string())),
        };

        let status = resp.status();
        if !status.is_success() {
            let body: ErrorBody = resp.json().await.unwrap_or_default();
            return Err(LoginError::Rejected {
                status: status.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let login: LoginResponse = resp
            .json()
            .await
            .map_err(|e| LoginError::Transport(format!("unreadable login response: {e}")))?;

        self.tokens.set(Credential::new(login.token)?).await?;
        tracing::info!(user_id = %login.user.id, "logged in");
        Ok(login.user)
    }

    /// Clear the credential and return to the entry page.
    pub async fn logout(&self) {
        tracing::info!("logging out");
        self.sign_out().await;
    }

    /// Navigate to the identity's home page (or the default home).
    pub fn redirect_home(&self) {
        let snapshot = self.session.snapshot();
        let target = self
            .policy()
            .home_for(snapshot.as_deref().and_then(|s| s.identity.as_ref()));
        self.navigator.navigate(&target);
    }

    async fn sign_out(&self) {
        if let Err(err) = self.tokens.clear().await {
            tracing::error!("failed to clear credential: {err:#}");
        }
        self.session.reset();
        self.navigator.navigate(&self.policy().entry_page);
    }
}
