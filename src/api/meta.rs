//! Language choices and navigation menu

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    i18n::{Locale, Localizer, MessageCatalog},
    models::user::UserClaims,
};

use super::{MaybeUser, RequestLocale};

#[derive(Debug, Serialize, ToSchema)]
pub struct LocaleOption {
    pub code: Locale,
    pub label: String,
}

/// Menu entry. Entries without a path are handled client-side (groups,
/// logout, which just drops the token).
#[derive(Debug, Serialize, ToSchema)]
pub struct NavEntry {
    pub key: String,
    pub label: String,
    pub path: Option<String>,
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    fn link(key: &str, path: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            label: String::new(),
            path: Some(path.into()),
            children: Vec::new(),
        }
    }

    fn group(key: &str, children: Vec<NavEntry>) -> Self {
        Self {
            key: key.to_string(),
            label: String::new(),
            path: None,
            children,
        }
    }

    fn translate(mut self, localizer: &dyn Localizer, locale: Locale) -> Self {
        self.label = localizer.t(locale, &format!("nav.{}", self.key), &[]);
        self.children = self
            .children
            .into_iter()
            .map(|child| child.translate(localizer, locale))
            .collect();
        self
    }
}

/// Menu for a caller, labels untranslated
pub fn menu_for(caller: Option<&UserClaims>) -> Vec<NavEntry> {
    let Some(claims) = caller else {
        return vec![NavEntry::link("login", "/auth/login")];
    };

    let mut items = vec![NavEntry::link("list", "/"), NavEntry::link("search", "/search")];
    if claims.is_admin() {
        items.insert(0, NavEntry::link("new_item", "/items"));
    }

    let mut menu = vec![
        NavEntry::link("home", "/"),
        NavEntry::group("items", items),
    ];

    if claims.is_admin() {
        menu.push(NavEntry::link("add_user", "/auth/register"));
        menu.push(NavEntry::link("user_list", "/auth/userlist"));
    }

    let account = format!("/auth/user/{}", claims.user_id);
    menu.push(NavEntry {
        key: "account".to_string(),
        label: claims.sub.clone(),
        path: None,
        children: vec![
            NavEntry::link("barcode", format!("{}/barcode", account)),
            NavEntry::link("edit_password", account),
            NavEntry {
                key: "logout".to_string(),
                label: String::new(),
                path: None,
                children: Vec::new(),
            },
        ],
    });

    menu
}

/// Available languages
#[utoipa::path(
    get,
    path = "/locales",
    tag = "meta",
    responses(
        (status = 200, description = "Language choices", body = Vec<LocaleOption>)
    )
)]
pub async fn list_locales(RequestLocale(locale): RequestLocale) -> Json<Vec<LocaleOption>> {
    let catalog = MessageCatalog::global();
    Json(
        Locale::ALL
            .iter()
            .map(|code| LocaleOption {
                code: *code,
                label: catalog.t(locale, code.label_key(), &[]),
            })
            .collect(),
    )
}

/// Navigation menu for the caller
#[utoipa::path(
    get,
    path = "/navigation",
    tag = "meta",
    responses(
        (status = 200, description = "Menu entries", body = Vec<NavEntry>)
    )
)]
pub async fn navigation(
    MaybeUser(claims): MaybeUser,
    RequestLocale(locale): RequestLocale,
) -> Json<Vec<NavEntry>> {
    let catalog = MessageCatalog::global();
    Json(
        menu_for(claims.as_ref())
            .into_iter()
            .map(|entry| {
                // The account group is labelled with the username
                if entry.key == "account" {
                    let label = entry.label.clone();
                    let mut entry = entry.translate(catalog, locale);
                    entry.label = label;
                    entry
                } else {
                    entry.translate(catalog, locale)
                }
            })
            .collect(),
    )
}
