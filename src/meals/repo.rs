use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::ApiError, meals::dto::SaveMealRequest};

/// Stored meal-plan entry; serialized camelCase for the client.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub date: String,
    pub base: String,
    pub external_meal_id: String,
    pub meal_name: String,
    pub meal_thumb: Option<String>,
    pub is_saved_combo: bool,
    pub calories: f64,
    pub protein_grams: f64,
    pub fat_grams: f64,
    pub carb_grams: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Persistence seam for per-user meal selections.
#[async_trait]
pub trait MealPlanStore: Send + Sync {
    /// Insert an entry for the owner. `DuplicateEntry` when
    /// (owner_id, external_meal_id, date) is already saved.
    async fn create(&self, owner_id: Uuid, entry: SaveMealRequest)
        -> Result<MealPlanEntry, ApiError>;

    /// All entries for the owner, in storage order.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<MealPlanEntry>, ApiError>;

    /// Delete one entry. `MealNotFound` if absent, `Forbidden` if owned by
    /// someone else; the entry must survive a forbidden attempt.
    async fn delete_by_id(&self, id: Uuid, requesting_user: Uuid) -> Result<(), ApiError>;
}

pub struct PgMealPlanStore {
    pub db: PgPool,
}

#[async_trait]
impl MealPlanStore for PgMealPlanStore {
    async fn create(
        &self,
        owner_id: Uuid,
        entry: SaveMealRequest,
    ) -> Result<MealPlanEntry, ApiError> {
        let stored = sqlx::query_as::<_, MealPlanEntry>(
            r#"
            INSERT INTO meal_plans
                (owner_id, date, base, external_meal_id, meal_name, meal_thumb,
                 is_saved_combo, calories, protein_grams, fat_grams, carb_grams)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, owner_id, date, base, external_meal_id, meal_name, meal_thumb,
                      is_saved_combo, calories, protein_grams, fat_grams, carb_grams, created_at
            "#,
        )
        .bind(owner_id)
        .bind(&entry.date)
        .bind(&entry.base)
        .bind(&entry.external_meal_id)
        .bind(&entry.meal_name)
        .bind(&entry.meal_thumb)
        .bind(entry.is_saved_combo)
        .bind(entry.calories)
        .bind(entry.protein_grams)
        .bind(entry.fat_grams)
        .bind(entry.carb_grams)
        .fetch_one(&self.db)
        .await?;
        Ok(stored)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<MealPlanEntry>, ApiError> {
        let rows = sqlx::query_as::<_, MealPlanEntry>(
            r#"
            SELECT id, owner_id, date, base, external_meal_id, meal_name, meal_thumb,
                   is_saved_combo, calories, protein_grams, fat_grams, carb_grams, created_at
            FROM meal_plans
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete_by_id(&self, id: Uuid, requesting_user: Uuid) -> Result<(), ApiError> {
        // Read-then-compare-then-delete; a lost race against a concurrent
        // delete degrades to MealNotFound, never to a cross-user deletion.
        let owner: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT owner_id FROM meal_plans WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        let (owner_id,) = owner.ok_or(ApiError::MealNotFound)?;
        if owner_id != requesting_user {
            return Err(ApiError::Forbidden);
        }

        sqlx::query(r#"DELETE FROM meal_plans WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
