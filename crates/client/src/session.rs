//! Per-page session context.
//!
//! Identity, menus and allowed pages are published together as one immutable
//! snapshot. The resolver is the only writer; everything else reads.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use pagegate_auth::{AllowedPageSet, AuthorizedMenuEntry, Identity, Resolution};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    NotLoaded,
    Loaded,
}

/// Output of one resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// `None` when the identity request failed in transit or returned an
    /// unreadable body. The credential is kept in that case.
    pub identity: Option<Identity>,
    pub menus: Vec<AuthorizedMenuEntry>,
    pub allowed_pages: AllowedPageSet,
    /// Navigation data could not be loaded; menus and pages are empty.
    pub menus_degraded: bool,
}

impl SessionSnapshot {
    /// Loaded without identity or navigation.
    pub fn unavailable() -> Self {
        Self {
            identity: None,
            menus: Vec::new(),
            allowed_pages: AllowedPageSet::empty(),
            menus_degraded: true,
        }
    }

    pub fn resolution(&self) -> Resolution<'_> {
        Resolution::Loaded {
            identity: self.identity.as_ref(),
            allowed_pages: &self.allowed_pages,
        }
    }
}

/// Session state for a single page load.
///
/// Constructed fresh for each page; never reused across reloads.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<Arc<SessionSnapshot>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResolutionState {
        if self.snapshot().is_some() {
            ResolutionState::Loaded
        } else {
            ResolutionState::NotLoaded
        }
    }

    pub fn snapshot(&self) -> Option<Arc<SessionSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn publish(&self, snapshot: SessionSnapshot) -> Arc<SessionSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        snapshot
    }

    pub(crate) fn reset(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
