//! `pagegate-client`
//!
//! **Responsibility:** client-side authorization gate for protected pages.
//!
//! This crate provides:
//! - Credential storage (in-memory or SQLite, scoped per origin)
//! - Authenticated requests with uniform credential-rejection reporting
//! - Concurrent identity + navigation resolution into a per-page session
//! - Page gating, navigation rendering and element visibility via [`PageController`]
//!
//! The backend remains the authority: everything decided here is presentation.

pub mod config;
pub mod controller;
pub mod fetcher;
pub mod navigation;
pub mod resolver;
pub mod session;
pub mod token_store;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use controller::{LoginError, Navigator, PageController, PageOutcome, PageView};
pub use fetcher::{AuthenticatedFetcher, FetchError, FetchOutcome, RequestOptions};
pub use navigation::{MobileItem, NavLink, Navigation};
pub use resolver::{ResolveOutcome, SignOutReason};
pub use session::{ResolutionState, SessionContext, SessionSnapshot};
pub use token_store::{Credential, MemoryTokenStore, SqliteTokenStore, TokenStore, TokenStoreError};
