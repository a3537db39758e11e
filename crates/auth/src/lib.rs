//! `pagegate-auth`: pure page-access policy (fail-closed).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod identity;
pub mod menu;
pub mod permissions;
pub mod policy;
pub mod roles;
pub mod visibility;

pub use identity::{AccountKind, Identity};
pub use menu::{AllowedPageSet, AuthorizedMenuEntry, PathMatch};
pub use permissions::Permission;
pub use policy::{
    evaluate, explain_access, AccessDecision, AccessExplanation, Denial, DenialKind, GrantKind,
    PolicyConfig, Resolution,
};
pub use roles::Role;
pub use visibility::{has_permission, has_role, Capability, ElementBinding, Visibility};
