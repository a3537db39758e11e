//! Desktop and mobile navigation built from the authorized menu list.

use serde::Serialize;

use pagegate_auth::AuthorizedMenuEntry;
use pagegate_core::MenuId;

const DEFAULT_LABEL: &str = "Menu";
const DEFAULT_HREF: &str = "#";
const DEFAULT_ICON: &str = "fas fa-circle";

/// Icon keys issued by the backend mapped to presentation icons.
const ICONS: &[(&str, &str)] = &[
    ("settings", "fas fa-cog"),
    ("dashboard", "fas fa-chart-pie"),
    ("request_quote", "fas fa-file-invoice"),
    ("business", "fas fa-building"),
    ("input", "fas fa-sign-in-alt"),
    ("fact_check", "fas fa-check-double"),
    ("inventory_2", "fas fa-warehouse"),
    ("format_list_bulleted", "fas fa-list"),
    ("local_shipping", "fas fa-truck"),
    ("notifications", "fas fa-bell"),
    ("receipt_long", "fas fa-receipt"),
    ("verified", "fas fa-shield-alt"),
];

/// Presentation icon for a menu icon key. Unknown or missing keys get the default icon.
pub fn icon_for(key: Option<&str>) -> &'static str {
    key.and_then(|key| ICONS.iter().find(|(k, _)| *k == key))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub id: Option<MenuId>,
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// The fixed "create" action of the mobile bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAction {
    pub label: &'static str,
    pub icon: &'static str,
    /// Page opened when the host page registers no create handler.
    pub fallback_href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MobileItem {
    Link { link: NavLink, icon: &'static str },
    CreateAction(CreateAction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub desktop: Vec<NavLink>,
    pub mobile: Vec<MobileItem>,
}

impl Navigation {
    pub fn active_link(&self) -> Option<&NavLink> {
        self.desktop.iter().find(|link| link.active)
    }
}

/// Index of the entry the create action follows: the 1st when there are exactly
/// two entries, otherwise the 2nd. `None` when the bar has fewer than two entries.
pub fn create_action_slot(entries: usize) -> Option<usize> {
    match entries {
        0 | 1 => None,
        2 => Some(0),
        _ => Some(1),
    }
}

fn is_active(current_path: &str, href: &str) -> bool {
    if href.is_empty() || href == DEFAULT_HREF {
        return false;
    }
    current_path == href || current_path.contains(href)
}

fn link_for(entry: &AuthorizedMenuEntry, current_path: &str) -> NavLink {
    let href = entry
        .path
        .as_deref()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or(DEFAULT_HREF)
        .to_string();

    NavLink {
        id: entry.id.clone(),
        label: entry
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_LABEL)
            .to_string(),
        active: is_active(current_path, &href),
        href,
    }
}

/// Build both presentations, preserving server order.
pub fn render(
    menus: &[AuthorizedMenuEntry],
    current_path: &str,
    create_fallback: &str,
) -> Navigation {
    if menus.is_empty() {
        tracing::warn!("no menus available to render");
        return Navigation::default();
    }

    let desktop: Vec<NavLink> = menus.iter().map(|entry| link_for(entry, current_path)).collect();

    let slot = create_action_slot(menus.len());
    let mut mobile = Vec::with_capacity(menus.len() + 1);
    for (index, (entry, link)) in menus.iter().zip(desktop.iter()).enumerate() {
        mobile.push(MobileItem::Link {
            link: link.clone(),
            icon: icon_for(entry.icon.as_deref()),
        });
        if slot == Some(index) {
            mobile.push(MobileItem::CreateAction(CreateAction {
                label: "Nova Solicitação",
                icon: "fas fa-plus",
                fallback_href: create_fallback.to_string(),
            }));
        }
    }

    tracing::debug!(items = desktop.len(), "navigation rendered");
    Navigation { desktop, mobile }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, path: &str, icon: &str) -> AuthorizedMenuEntry {
        AuthorizedMenuEntry {
            id: Some(MenuId::new(id).unwrap()),
            name: Some(id.to_uppercase()),
            path: Some(path.to_string()),
            icon: Some(icon.to_string()),
        }
    }

    fn menus(count: usize) -> Vec<AuthorizedMenuEntry> {
        (0..count)
            .map(|i| entry(&format!("m{i}"), &format!("/m{i}.html"), "dashboard"))
            .collect()
    }

    fn action_position(nav: &Navigation) -> Option<usize> {
        nav.mobile
            .iter()
            .position(|item| matches!(item, MobileItem::CreateAction(_)))
    }

    #[test]
    fn action_follows_first_entry_when_two() {
        let nav = render(&menus(2), "/m0.html", "/solicitacoes.html");
        assert_eq!(nav.mobile.len(), 3);
        assert_eq!(action_position(&nav), Some(1));
    }

    #[test]
    fn action_follows_second_entry_otherwise() {
        for count in [3, 4, 6] {
            let nav = render(&menus(count), "/x.html", "/solicitacoes.html");
            assert_eq!(nav.mobile.len(), count + 1);
            assert_eq!(action_position(&nav), Some(2), "count = {count}");
        }
    }

    #[test]
    fn single_entry_has_no_action() {
        let nav = render(&menus(1), "/m0.html", "/solicitacoes.html");
        assert_eq!(nav.mobile.len(), 1);
        assert_eq!(action_position(&nav), None);
    }

    #[test]
    fn empty_menus_render_nothing() {
        let nav = render(&[], "/orders.html", "/solicitacoes.html");
        assert!(nav.desktop.is_empty());
        assert!(nav.mobile.is_empty());
    }

    #[test]
    fn active_marking_is_shared_by_both_bars() {
        let menus = vec![
            entry("dashboard", "/dashboard.html", "dashboard"),
            entry("orders", "/orders.html", "receipt_long"),
            entry("suppliers", "/fornecedores.html", "business"),
        ];
        let nav = render(&menus, "/orders.html", "/solicitacoes.html");

        assert_eq!(nav.active_link().map(|l| l.href.as_str()), Some("/orders.html"));
        let mobile_active: Vec<&str> = nav
            .mobile
            .iter()
            .filter_map(|item| match item {
                MobileItem::Link { link, .. } if link.active => Some(link.href.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(mobile_active, vec!["/orders.html"]);
    }

    #[test]
    fn rendering_is_idempotent() {
        let menus = menus(4);
        let first = render(&menus, "/m3.html", "/solicitacoes.html");
        let second = render(&menus, "/m3.html", "/solicitacoes.html");
        assert_eq!(first, second);
        assert_eq!(action_position(&first), action_position(&second));
    }

    #[test]
    fn unknown_icons_fall_back() {
        assert_eq!(icon_for(Some("dashboard")), "fas fa-chart-pie");
        assert_eq!(icon_for(Some("rocket")), "fas fa-circle");
        assert_eq!(icon_for(None), "fas fa-circle");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let bare = AuthorizedMenuEntry {
            id: None,
            name: None,
            path: None,
            icon: None,
        };
        let nav = render(&[bare], "/orders.html", "/solicitacoes.html");
        assert_eq!(nav.desktop[0].label, "Menu");
        assert_eq!(nav.desktop[0].href, "#");
        assert!(!nav.desktop[0].active);
    }
}
