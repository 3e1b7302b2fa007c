pub mod drink;
pub mod manager;

pub use drink::{Drink, DrinkPatch, Ingredient, LongDrink, NewDrink, ShortDrink};
pub use manager::Database;

use thiserror::Error;

/// Errors from the drink store
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A write collided with a UNIQUE column
    #[error("unique constraint violated on column '{column}'")]
    UniqueViolation { column: &'static str },

    /// The row was gone by the time it was written
    #[error("drink {id} no longer exists")]
    NotFound { id: i64 },

    #[error("stored recipe is not valid JSON: {0}")]
    Recipe(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
