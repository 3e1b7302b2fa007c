// database/drink.rs - The drink record, its projections and its store operations

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection};

use super::DatabaseError;

const SELECT_ALL: &str = "SELECT id, title, recipe FROM drink ORDER BY id";
const SELECT_BY_ID: &str = "SELECT id, title, recipe FROM drink WHERE id = ?";
const INSERT: &str = "INSERT INTO drink (title, recipe) VALUES (?, ?)";
const UPDATE: &str = "UPDATE drink SET title = ?, recipe = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM drink WHERE id = ?";

/// The only user-writable UNIQUE column of the drink table
const TITLE_COLUMN: &str = "title";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: i64,
}

/// A persisted drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A validated create body
#[derive(Debug, Clone, Deserialize)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A validated update body; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

/// Public view of a drink: ingredient names are withheld
#[derive(Debug, Serialize)]
pub struct ShortDrink<'a> {
    pub id: i64,
    pub title: &'a str,
    pub recipe: Vec<ShortIngredient<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient<'a> {
    pub color: &'a str,
    pub parts: i64,
}

/// Full view of a drink for holders of the detail scope
#[derive(Debug, Serialize)]
pub struct LongDrink<'a> {
    pub id: i64,
    pub title: &'a str,
    pub recipe: &'a [Ingredient],
}

impl<'r> FromRow<'r, SqliteRow> for Drink {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let recipe: String = row.try_get("recipe")?;

        let recipe = serde_json::from_str(&recipe).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Self { id, title, recipe })
    }
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| ShortIngredient {
                    color: &ingredient.color,
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: &self.recipe,
        }
    }

    /// Every drink in the store, oldest first
    pub async fn list_all(conn: &mut SqliteConnection) -> Result<Vec<Drink>, DatabaseError> {
        let drinks = sqlx::query_as(SELECT_ALL).fetch_all(&mut *conn).await?;
        Ok(drinks)
    }

    pub async fn find_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Drink>, DatabaseError> {
        let drink = sqlx::query_as(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(drink)
    }

    pub async fn insert(conn: &mut SqliteConnection, draft: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = serde_json::to_string(&draft.recipe)?;

        let result = sqlx::query(INSERT)
            .bind(&draft.title)
            .bind(&recipe)
            .execute(&mut *conn)
            .await
            .map_err(classify_write_error)?;

        Ok(Drink {
            id: result.last_insert_rowid(),
            title: draft.title,
            recipe: draft.recipe,
        })
    }

    /// Apply the fields present in `patch` and persist the result in place.
    /// Fails with `NotFound` if the row was removed since it was read.
    pub async fn update(
        &mut self,
        conn: &mut SqliteConnection,
        patch: DrinkPatch,
    ) -> Result<(), DatabaseError> {
        let mut changed = self.clone();
        if let Some(title) = patch.title {
            changed.title = title;
        }
        if let Some(recipe) = patch.recipe {
            changed.recipe = recipe;
        }

        let recipe = serde_json::to_string(&changed.recipe)?;
        let result = sqlx::query(UPDATE)
            .bind(&changed.title)
            .bind(&recipe)
            .bind(changed.id)
            .execute(&mut *conn)
            .await
            .map_err(classify_write_error)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { id: changed.id });
        }

        *self = changed;
        Ok(())
    }

    /// Fails with `NotFound` if another request deleted the row first
    pub async fn delete(self, conn: &mut SqliteConnection) -> Result<(), DatabaseError> {
        let result = sqlx::query(DELETE_BY_ID)
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { id: self.id });
        }
        Ok(())
    }
}

/// Turn the driver's unique-violation signal into a typed error.
/// `id` is never written by us, so a unique violation can only be on the title.
fn classify_write_error(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::UniqueViolation { column: TITLE_COLUMN };
        }
    }
    DatabaseError::Sqlx(err)
}
