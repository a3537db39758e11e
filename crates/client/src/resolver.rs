//! Identity resolution: current user plus authorized navigation, fetched together.

use std::sync::Arc;

use pagegate_auth::{AllowedPageSet, Identity};

use crate::fetcher::{AuthenticatedFetcher, FetchOutcome};
use crate::session::{SessionContext, SessionSnapshot};
use crate::types::MenusPayload;

pub const IDENTITY_PATH: &str = "/auth/me";
pub const MENUS_PATH: &str = "/auth/menus";

/// Why resolution ended the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutReason {
    /// No credential stored; no request was made.
    NoCredential,
    /// Identity or menus request answered 401.
    CredentialRejected,
    /// Identity request answered another non-success status.
    IdentityStatus(u16),
}

#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// Resolution completed. The snapshot carries no identity when `/auth/me`
    /// could not be reached or read; the credential is kept in that case.
    Resolved(Arc<SessionSnapshot>),
    SignedOut(SignOutReason),
}

enum IdentityFailure {
    Rejected(SignOutReason),
    Unavailable(String),
}

enum MenusFailure {
    Unauthorized,
    Unavailable(String),
}

/// Fetch identity and navigation concurrently and publish the result.
///
/// A 401 on either request, or a non-success status on the identity request,
/// signs out. Transport and parse failures never do: a failed identity read
/// publishes a session without identity, and failed navigation degrades to empty
/// menus and an empty allowed-page set. The session is marked loaded either way.
pub async fn resolve(fetcher: &AuthenticatedFetcher, session: &SessionContext) -> ResolveOutcome {
    if fetcher.credential().await.is_none() {
        tracing::debug!("no stored credential; skipping identity resolution");
        return ResolveOutcome::SignedOut(SignOutReason::NoCredential);
    }

    let (identity, menus) = tokio::join!(fetcher.get(IDENTITY_PATH), fetcher.get(MENUS_PATH));
    let identity = read_identity(identity).await;
    let menus = read_menus(menus).await;

    let identity = match identity {
        Ok(identity) => identity,
        Err(IdentityFailure::Rejected(reason)) => return sign_out(session, reason),
        Err(IdentityFailure::Unavailable(_))
            if matches!(menus, Err(MenusFailure::Unauthorized)) =>
        {
            return sign_out(session, SignOutReason::CredentialRejected);
        }
        Err(IdentityFailure::Unavailable(err)) => {
            tracing::warn!("identity unavailable, continuing without identity: {err}");
            return ResolveOutcome::Resolved(session.publish(SessionSnapshot::unavailable()));
        }
    };

    let (payload, menus_degraded) = match menus {
        Ok(payload) => (payload, false),
        Err(MenusFailure::Unauthorized) => {
            return sign_out(session, SignOutReason::CredentialRejected);
        }
        Err(MenusFailure::Unavailable(err)) => {
            tracing::warn!(
                user_id = %identity.id,
                "navigation data unavailable, continuing with empty menus: {err}"
            );
            (
                MenusPayload {
                    menus: Vec::new(),
                    allowed_pages: AllowedPageSet::empty(),
                },
                true,
            )
        }
    };

    tracing::info!(
        user_id = %identity.id,
        menus = payload.menus.len(),
        allowed_pages = payload.allowed_pages.len(),
        menus_degraded,
        "identity resolved"
    );

    let snapshot = session.publish(SessionSnapshot {
        identity: Some(identity),
        menus: payload.menus,
        allowed_pages: payload.allowed_pages,
        menus_degraded,
    });

    ResolveOutcome::Resolved(snapshot)
}

fn sign_out(session: &SessionContext, reason: SignOutReason) -> ResolveOutcome {
    tracing::warn!(?reason, "credential rejected during resolution; signing out");
    session.reset();
    ResolveOutcome::SignedOut(reason)
}

async fn read_identity(outcome: FetchOutcome) -> Result<Identity, IdentityFailure> {
    let resp = match outcome {
        FetchOutcome::Ok(resp) => resp,
        FetchOutcome::Unauthorized => {
            return Err(IdentityFailure::Rejected(SignOutReason::CredentialRejected));
        }
        FetchOutcome::NetworkError(err) => {
            return Err(IdentityFailure::Unavailable(err.to_string()));
        }
    };

    if !resp.status().is_success() {
        return Err(IdentityFailure::Rejected(SignOutReason::IdentityStatus(
            resp.status().as_u16(),
        )));
    }

    resp.json::<Identity>()
        .await
        .map_err(|e| IdentityFailure::Unavailable(format!("unreadable identity: {e}")))
}

async fn read_menus(outcome: FetchOutcome) -> Result<MenusPayload, MenusFailure> {
    let resp = match outcome {
        FetchOutcome::Ok(resp) => resp,
        FetchOutcome::Unauthorized => return Err(MenusFailure::Unauthorized),
        FetchOutcome::NetworkError(err) => {
            return Err(MenusFailure::Unavailable(err.to_string()));
        }
    };

    if !resp.status().is_success() {
        return Err(MenusFailure::Unavailable(format!(
            "menus request returned {}",
            resp.status()
        )));
    }

    resp.json::<MenusPayload>()
        .await
        .map_err(|e| MenusFailure::Unavailable(format!("unreadable menus payload: {e}")))
}
