//! Items repository for database operations.
//!
//! The rental ledger lives on the item row; it is only ever written through
//! [`ItemsRepository::swap_rental`], a compare-and-swap on `renter_name`.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    i18n::Message,
    models::{
        item::{Item, ItemKind, NewItem},
        rental::RentalTransition,
        search::SearchQuery,
    },
};

const ITEM_COLUMNS: &str = "id, kind, title, publisher, author, catalog_code, category, \
                            renter_name, rented_at, created_at, updated_at";

fn item_not_found(id: i32) -> AppError {
    AppError::NotFound(Message::new("error.item.not_found").arg("id", id))
}

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| item_not_found(id))
    }

    /// Get item by ID inside a unit of work
    pub async fn get_in(&self, conn: &mut PgConnection, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| item_not_found(id))
    }

    /// Whole catalog, optionally restricted to one kind
    pub async fn list(&self, kind: Option<ItemKind>) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE ($1::text IS NULL OR kind = $1) ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Items whose title contains the full query, or where any token is a
    /// substring of title, author, publisher, catalog code or category.
    /// A single SELECT, so every item appears at most once.
    pub async fn search(&self, query: &SearchQuery) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {}
            FROM items
            WHERE strpos(title, $1) > 0
               OR EXISTS (
                    SELECT 1
                    FROM unnest($2::text[]) AS t(token)
                    WHERE strpos(title, t.token) > 0
                       OR strpos(COALESCE(author, ''), t.token) > 0
                       OR strpos(publisher, t.token) > 0
                       OR strpos(COALESCE(catalog_code, ''), t.token) > 0
                       OR strpos(category, t.token) > 0
               )
            ORDER BY id
            "#,
            ITEM_COLUMNS
        ))
        .bind(query.raw())
        .bind(query.tokens().to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a new item with an empty rental ledger
    pub async fn create(&self, item: &NewItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (kind, title, publisher, author, catalog_code, category,
                               renter_name, rented_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, NULL)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.kind)
        .bind(&item.title)
        .bind(&item.publisher)
        .bind(&item.author)
        .bind(&item.catalog_code)
        .bind(item.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Overwrite the descriptive fields. The rental ledger is left alone.
    pub async fn update(&self, id: i32, item: &NewItem) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET kind = $2, title = $3, publisher = $4, author = $5,
                catalog_code = $6, category = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(item.kind)
        .bind(&item.title)
        .bind(&item.publisher)
        .bind(&item.author)
        .bind(&item.catalog_code)
        .bind(item.category)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| item_not_found(id))
    }

    /// Write a rental transition if the ledger still names `expected_renter`.
    ///
    /// Returns `None` when another request changed the ledger first.
    pub async fn swap_rental(
        &self,
        conn: &mut PgConnection,
        id: i32,
        expected_renter: Option<&str>,
        transition: &RentalTransition,
    ) -> AppResult<Option<Item>> {
        let (renter, rented_at) = transition.ledger();

        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET renter_name = $2, rented_at = $3, updated_at = NOW()
            WHERE id = $1 AND renter_name IS NOT DISTINCT FROM $4
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(renter)
        .bind(rented_at)
        .bind(expected_renter)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(item)
    }
}
