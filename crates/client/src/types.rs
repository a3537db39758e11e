//! Wire types exchanged with the backend.
//!
//! Field aliases accept the backend's legacy (Portuguese) payload keys.

use serde::{Deserialize, Serialize};

use pagegate_auth::{AllowedPageSet, AuthorizedMenuEntry, Identity};

/// Body of `GET /auth/menus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenusPayload {
    #[serde(default)]
    pub menus: Vec<AuthorizedMenuEntry>,
    #[serde(default, alias = "paginas_permitidas")]
    pub allowed_pages: AllowedPageSet,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    #[serde(rename = "senha")]
    pub password: &'a str,
}

/// Successful `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(alias = "usuario")]
    pub user: Identity,
}

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "erro")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn menus_payload_accepts_both_page_keys() {
        let legacy: MenusPayload = serde_json::from_value(json!({
            "menus": [{
                "id": "dashboard",
                "nome": "Dashboard",
                "url": "/dashboard.html",
                "icone": "dashboard"
            }],
            "paginas_permitidas": ["/dashboard.html"]
        }))
        .unwrap();
        assert_eq!(legacy.menus.len(), 1);
        assert!(legacy.allowed_pages.permits("/dashboard.html", Default::default()));

        let current: MenusPayload =
            serde_json::from_value(json!({ "allowed_pages": ["/orders.html"] })).unwrap();
        assert!(current.menus.is_empty());
        assert_eq!(current.allowed_pages.len(), 1);
    }

    #[test]
    fn login_request_uses_backend_field_names() {
        let body = serde_json::to_value(LoginRequest {
            email: "a@b.c",
            password: "pw",
        })
        .unwrap();
        assert_eq!(body, json!({ "email": "a@b.c", "senha": "pw" }));
    }
}
