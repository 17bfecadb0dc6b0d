//! Catalog management service

use crate::{
    error::AppResult,
    i18n::{Locale, Localizer},
    models::{
        item::{CategoryOption, Item, ItemForm, ItemKind},
        search::SearchQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Whole catalog, optionally one kind only
    pub async fn list_items(&self, kind: Option<ItemKind>) -> AppResult<Vec<Item>> {
        self.repository.items.list(kind).await
    }

    /// Free-text search. A blank query returns the full catalog.
    pub async fn search_items(&self, query: &SearchQuery) -> AppResult<Vec<Item>> {
        if query.is_empty() {
            return self.repository.items.list(None).await;
        }

        let items = self.repository.items.search(query).await?;
        tracing::debug!(query = query.raw(), hits = items.len(), "Catalog search");
        Ok(items)
    }

    /// Get item by ID
    pub async fn get_item(&self, id: i32) -> AppResult<Item> {
        self.repository.items.get_by_id(id).await
    }

    /// Create a new item. It starts available.
    pub async fn create_item(&self, form: ItemForm) -> AppResult<Item> {
        let item = form.into_new_item()?;
        let created = self.repository.items.create(&item).await?;
        tracing::info!(id = created.id, kind = %created.kind, title = %created.title, "Item created");
        Ok(created)
    }

    /// Overwrite an item's descriptive fields
    pub async fn update_item(&self, id: i32, form: ItemForm) -> AppResult<Item> {
        let item = form.into_new_item()?;
        let updated = self.repository.items.update(id, &item).await?;
        tracing::info!(id, title = %updated.title, "Item updated");
        Ok(updated)
    }

    /// Categories available to a kind (all of them when no kind is given),
    /// labelled in `locale`
    pub fn categories(
        &self,
        kind: Option<ItemKind>,
        localizer: &dyn Localizer,
        locale: Locale,
    ) -> Vec<CategoryOption> {
        let categories = kind.unwrap_or_default().categories();
        categories
            .iter()
            .map(|category| CategoryOption {
                key: *category,
                label: localizer.t(locale, &category.label_key(), &[]),
            })
            .collect()
    }
}
