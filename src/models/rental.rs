//! Rental ledger transitions.
//!
//! An item is either available or rented by exactly one user. Toggling is a
//! three-way decision on the ledger and the caller:
//!
//! - rented by the caller: give it back
//! - available: the caller takes it
//! - rented by someone else: rejected, nothing changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::item::Item;
use crate::error::{AppError, AppResult};

/// Current ledger state of an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalState {
    Available,
    Rented { renter: String, since: DateTime<Utc> },
}

impl RentalState {
    pub fn renter(&self) -> Option<&str> {
        match self {
            RentalState::Available => None,
            RentalState::Rented { renter, .. } => Some(renter),
        }
    }
}

/// Change to write to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalTransition {
    Rent { renter: String, at: DateTime<Utc> },
    Return,
}

impl RentalTransition {
    pub fn action(&self) -> RentalAction {
        match self {
            RentalTransition::Rent { .. } => RentalAction::Rented,
            RentalTransition::Return => RentalAction::Returned,
        }
    }

    /// Ledger columns after the transition: `(renter_name, rented_at)`
    pub fn ledger(&self) -> (Option<&str>, Option<DateTime<Utc>>) {
        match self {
            RentalTransition::Rent { renter, at } => (Some(renter.as_str()), Some(*at)),
            RentalTransition::Return => (None, None),
        }
    }
}

/// What a successful toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalAction {
    Rented,
    Returned,
}

/// Item is held by another user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalRejection {
    pub holder: String,
}

/// Decide what a toggle by `caller` does to an item in `state`.
pub fn decide(
    state: &RentalState,
    caller: &str,
    now: DateTime<Utc>,
) -> Result<RentalTransition, RentalRejection> {
    match state {
        RentalState::Rented { renter, .. } if renter == caller => Ok(RentalTransition::Return),
        RentalState::Available => Ok(RentalTransition::Rent {
            renter: caller.to_string(),
            at: now,
        }),
        RentalState::Rented { renter, .. } => Err(RentalRejection {
            holder: renter.clone(),
        }),
    }
}

impl Item {
    /// Read the ledger. Both columns are set or both are null; anything
    /// else is a corrupted row.
    pub fn rental_state(&self) -> AppResult<RentalState> {
        match (&self.renter_name, self.rented_at) {
            (None, None) => Ok(RentalState::Available),
            (Some(renter), Some(since)) => Ok(RentalState::Rented {
                renter: renter.clone(),
                since,
            }),
            _ => Err(AppError::Internal(format!(
                "Item {} has a half-written rental ledger",
                self.id
            ))),
        }
    }
}
