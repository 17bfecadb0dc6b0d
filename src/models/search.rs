//! Catalog search query

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::item::Item;

/// Free-text query: the full string plus its whitespace-separated tokens.
///
/// An item matches when the full string appears in its title, or when any
/// token appears in its title, author, publisher, catalog code or category.
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    tokens: Vec<String>,
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        let raw = input.trim().to_string();
        let tokens = raw.split_whitespace().map(str::to_string).collect();
        Self { raw, tokens }
    }

    /// Blank queries list the whole catalog
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// `?q=` parameter for search endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search form body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

/// Search results page
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<Item>,
    pub total: usize,
    /// Caller may edit items
    pub editable: bool,
    /// Set when nothing matched
    pub message: Option<String>,
}
