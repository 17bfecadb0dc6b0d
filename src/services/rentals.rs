//! Rental toggle service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    i18n::Message,
    models::{
        item::Item,
        rental::{decide, RentalAction, RentalState},
    },
    repository::Repository,
};

/// Result of a successful toggle
#[derive(Debug, Clone)]
pub struct RentalOutcome {
    pub action: RentalAction,
    pub item: Item,
}

impl RentalOutcome {
    pub fn message(&self) -> Message {
        let key = match self.action {
            RentalAction::Rented => "msg.item.rented",
            RentalAction::Returned => "msg.item.returned",
        };
        Message::new(key).arg("title", &self.item.title)
    }
}

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
}

impl RentalsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Rent the item if it is available, give it back if `caller` holds it.
    ///
    /// The ledger write is a compare-and-swap on the renter observed at read
    /// time, so two concurrent toggles can never both take the item.
    pub async fn toggle(&self, item_id: i32, caller: &str) -> AppResult<RentalOutcome> {
        let mut uow = self.repository.begin().await?;

        let item = self.repository.items.get_in(uow.conn(), item_id).await?;
        let state = item.rental_state()?;

        let transition = decide(&state, caller, Utc::now()).map_err(|rejection| {
            tracing::warn!(
                item_id,
                caller,
                holder = %rejection.holder,
                "Rental rejected, item held by another user"
            );
            already_rented(&item.title, &rejection.holder)
        })?;

        let swapped = self
            .repository
            .items
            .swap_rental(uow.conn(), item_id, state.renter(), &transition)
            .await?;

        let Some(item) = swapped else {
            // Ledger moved between read and write: report what it says now
            let current = self.repository.items.get_in(uow.conn(), item_id).await?;
            tracing::warn!(item_id, caller, "Rental ledger changed concurrently");
            return Err(match current.rental_state()? {
                RentalState::Rented { renter, .. } if renter != caller => {
                    already_rented(&current.title, &renter)
                }
                _ => AppError::Conflict(
                    Message::new("error.item.rental_changed").arg("title", &current.title),
                ),
            });
        };

        uow.commit().await?;

        let action = transition.action();
        match action {
            RentalAction::Rented => tracing::info!(item_id, renter = caller, "Item rented"),
            RentalAction::Returned => tracing::info!(item_id, renter = caller, "Item returned"),
        }

        Ok(RentalOutcome { action, item })
    }
}

fn already_rented(title: &str, holder: &str) -> AppError {
    AppError::Conflict(
        Message::new("error.item.already_rented")
            .arg("title", title)
            .arg("renter", holder),
    )
}
