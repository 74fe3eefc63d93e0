//! Per-user book relation (like, bookmark, rate)

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub const MIN_RATE: i16 = 1;
pub const MAX_RATE: i16 = 5;

/// Relation of one user to one book. At most one row exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserBookRelation {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    #[sqlx(rename = "liked")]
    pub like: bool,
    pub in_bookmarks: bool,
    /// 1 to 5, null when the user has not rated the book
    pub rate: Option<i16>,
}

impl UserBookRelation {
    /// State reported for a pair that has never been written
    pub fn unset(user_id: i32, book_id: i32) -> Self {
        Self {
            id: 0,
            user_id,
            book_id,
            like: false,
            in_bookmarks: false,
            rate: None,
        }
    }
}

/// Partial relation update. Absent fields keep their stored value,
/// an explicit `"rate": null` clears the rate.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRelation {
    pub like: Option<bool>,
    pub in_bookmarks: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i16>, nullable)]
    pub rate: Option<Option<i16>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateRelation {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(Some(rate)) = self.rate {
            if !(MIN_RATE..=MAX_RATE).contains(&rate) {
                return Err(AppError::Validation(format!(
                    "rate must be between {} and {}, got {}",
                    MIN_RATE, MAX_RATE, rate
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.like.is_none() && self.in_bookmarks.is_none() && self.rate.is_none()
    }
}
