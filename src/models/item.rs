//! Catalog item model.
//!
//! Books and games share one record type; the [`ItemKind`] decides which
//! categories and which catalog code format apply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{non_blank, not_blank, text_column};
use crate::{
    error::{AppError, AppResult},
    i18n::Message,
};

/// Kind of catalog item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Book,
    Game,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Book => "book",
            ItemKind::Game => "game",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            ItemKind::Book => "label.kind.book",
            ItemKind::Game => "label.kind.game",
        }
    }

    /// Catalog code format: books carry an ISBN-13, games an ISBN-10
    pub fn catalog_code_rule(&self) -> CatalogCodeRule {
        match self {
            ItemKind::Book => CatalogCodeRule { label: "ISBN 13", length: 13 },
            ItemKind::Game => CatalogCodeRule { label: "ISBN 10", length: 10 },
        }
    }

    /// Categories an item of this kind may be filed under
    pub fn categories(&self) -> &'static [Category] {
        match self {
            ItemKind::Book => &Category::ALL,
            ItemKind::Game => &[Category::Game],
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(ItemKind::Book),
            "game" => Ok(ItemKind::Game),
            _ => Err(format!("Invalid item kind: {}", s)),
        }
    }
}

text_column!(ItemKind);

/// Catalog category, stored as its key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Textbook,
    GrammarAndVocabulary,
    Literature,
    TextCommentaries,
    DidacticPedagogy,
    Magazine,
    Game,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Textbook,
        Category::GrammarAndVocabulary,
        Category::Literature,
        Category::TextCommentaries,
        Category::DidacticPedagogy,
        Category::Magazine,
        Category::Game,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Textbook => "textbook",
            Category::GrammarAndVocabulary => "grammar_and_vocabulary",
            Category::Literature => "literature",
            Category::TextCommentaries => "text_commentaries",
            Category::DidacticPedagogy => "didactic_pedagogy",
            Category::Magazine => "magazine",
            Category::Game => "game",
        }
    }

    pub fn label_key(&self) -> String {
        format!("label.category.{}", self.as_str())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

text_column!(Category);

/// Fixed-length numeric code rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCodeRule {
    pub label: &'static str,
    pub length: usize,
}

impl CatalogCodeRule {
    pub fn check(&self, code: &str) -> Result<(), Message> {
        if code.chars().count() != self.length {
            return Err(Message::new("error.form.catalog_code_length")
                .arg("label", self.label)
                .arg("length", self.length));
        }
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Message::new("error.form.catalog_code_digits").arg("label", self.label));
        }
        Ok(())
    }
}

/// Catalog item with its rental ledger (`renter_name` / `rented_at`)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub kind: ItemKind,
    pub title: String,
    pub publisher: String,
    pub author: Option<String>,
    /// ISBN-13 for books, ISBN-10 for games
    pub catalog_code: Option<String>,
    pub category: Category,
    /// Username of the current renter
    pub renter_name: Option<String>,
    pub rented_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item create / edit form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemForm {
    #[serde(default)]
    pub kind: ItemKind,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub publisher: String,
    pub author: Option<String>,
    pub catalog_code: Option<String>,
    pub category: Category,
}

/// Validated item fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub kind: ItemKind,
    pub title: String,
    pub publisher: String,
    pub author: Option<String>,
    pub catalog_code: Option<String>,
    pub category: Category,
}

impl ItemForm {
    /// Validate the form and normalize blank optional fields
    pub fn into_new_item(self) -> AppResult<NewItem> {
        self.validate()?;

        let catalog_code = non_blank(self.catalog_code.as_deref());
        if let Some(ref code) = catalog_code {
            self.kind
                .catalog_code_rule()
                .check(code)
                .map_err(AppError::Validation)?;
        }

        if !self.kind.categories().contains(&self.category) {
            return Err(AppError::Validation(
                Message::new("error.form.category_not_allowed")
                    .arg("category", self.category)
                    .arg("kind", self.kind),
            ));
        }

        Ok(NewItem {
            kind: self.kind,
            title: self.title.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            author: non_blank(self.author.as_deref()),
            catalog_code,
            category: self.category,
        })
    }
}

/// Catalog listing filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ItemQuery {
    pub kind: Option<ItemKind>,
}

/// Category choice with its translated label
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryOption {
    pub key: Category,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(kind: ItemKind, code: Option<&str>, category: Category) -> ItemForm {
        ItemForm {
            kind,
            title: "Le Cid".to_string(),
            publisher: "Larousse".to_string(),
            author: Some("Corneille".to_string()),
            catalog_code: code.map(str::to_string),
            category,
        }
    }

    fn validation_key(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg.key.into_owned(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_defaults_to_book() {
        assert_eq!(ItemKind::default(), ItemKind::Book);
        assert_eq!(None::<ItemKind>.unwrap_or_default().categories(), &Category::ALL);
    }

    #[test]
    fn test_valid_book() {
        let item = form(ItemKind::Book, Some("9782035834256"), Category::Literature)
            .into_new_item()
            .unwrap();
        assert_eq!(item.catalog_code.as_deref(), Some("9782035834256"));
        assert_eq!(item.author.as_deref(), Some("Corneille"));
    }

    #[test]
    fn test_twelve_digit_code_rejected() {
        let err = form(ItemKind::Book, Some("978203583425"), Category::Literature)
            .into_new_item()
            .unwrap_err();
        assert_eq!(validation_key(err), "error.form.catalog_code_length");
    }

    #[test]
    fn test_non_numeric_code_rejected() {
        let err = form(ItemKind::Book, Some("978203583425X"), Category::Literature)
            .into_new_item()
            .unwrap_err();
        assert_eq!(validation_key(err), "error.form.catalog_code_digits");
    }

    #[test]
    fn test_game_uses_ten_digit_code() {
        assert!(form(ItemKind::Game, Some("2035834256"), Category::Game)
            .into_new_item()
            .is_ok());
        let err = form(ItemKind::Game, Some("9782035834256"), Category::Game)
            .into_new_item()
            .unwrap_err();
        assert_eq!(validation_key(err), "error.form.catalog_code_length");
    }

    #[test]
    fn test_blank_code_and_author_are_absent() {
        let mut f = form(ItemKind::Book, Some("   "), Category::Magazine);
        f.author = Some(" ".to_string());
        let item = f.into_new_item().unwrap();
        assert_eq!(item.catalog_code, None);
        assert_eq!(item.author, None);
    }

    #[test]
    fn test_title_and_publisher_required() {
        let mut f = form(ItemKind::Book, None, Category::Textbook);
        f.title = "  ".to_string();
        assert_eq!(validation_key(f.into_new_item().unwrap_err()), "error.form.required");

        let mut f = form(ItemKind::Book, None, Category::Textbook);
        f.publisher = String::new();
        assert_eq!(validation_key(f.into_new_item().unwrap_err()), "error.form.required");
    }

    #[test]
    fn test_game_category_restricted() {
        let err = form(ItemKind::Game, None, Category::Literature)
            .into_new_item()
            .unwrap_err();
        assert_eq!(validation_key(err), "error.form.category_not_allowed");
    }

    #[test]
    fn test_category_keys_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("literrature".parse::<Category>().is_err());
    }
}
