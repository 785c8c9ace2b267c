use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{error::ApiError, food::FoodItem};

/// Proxy client for the recipe catalog. No auth upstream; the work here is
/// normalizing its denormalized JSON into the canonical food-item shape.
#[derive(Clone)]
pub struct RecipeClient {
    http: reqwest::Client,
    base_url: Arc<String>,
}

/// `meals` is `null` (not an empty array) when nothing matches.
#[derive(Debug, Deserialize)]
struct MealsEnvelope {
    meals: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

/// Full recipe record with the `strIngredient1..20` columns collapsed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub item: FoodItem,
    pub instructions: Option<String>,
    pub youtube: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: Arc::new(base_url),
        }
    }

    pub async fn random(&self) -> Result<RecipeDetail, ApiError> {
        let meals = self.fetch("random.php", &[]).await?;
        meals
            .first()
            .map(detail_from_value)
            .ok_or(ApiError::MealNotFound)
    }

    pub async fn lookup(&self, id: &str) -> Result<RecipeDetail, ApiError> {
        let meals = self.fetch("lookup.php", &[("i", id)]).await?;
        meals
            .first()
            .map(detail_from_value)
            .ok_or(ApiError::MealNotFound)
    }

    pub async fn search(&self, name: &str) -> Result<Vec<FoodItem>, ApiError> {
        let meals = self.fetch("search.php", &[("s", name)]).await?;
        Ok(meals.iter().map(item_from_value).collect())
    }

    pub async fn by_category(&self, category: &str) -> Result<Vec<FoodItem>, ApiError> {
        let meals = self.fetch("filter.php", &[("c", category)]).await?;
        Ok(meals.iter().map(item_from_value).collect())
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<Value>, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.http.get(&url).query(params).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "recipe api returned {}",
                response.status()
            )));
        }
        let envelope: MealsEnvelope = response.json().await?;
        let meals = envelope.meals.unwrap_or_default();
        debug!(endpoint, count = meals.len(), "recipe api call ok");
        Ok(meals)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn item_from_value(value: &Value) -> FoodItem {
    FoodItem::Recipe {
        id: str_field(value, "idMeal").unwrap_or_default(),
        name: str_field(value, "strMeal").unwrap_or_default(),
        thumb: str_field(value, "strMealThumb"),
        category: str_field(value, "strCategory"),
        area: str_field(value, "strArea"),
    }
}

pub(crate) fn detail_from_value(value: &Value) -> RecipeDetail {
    RecipeDetail {
        item: item_from_value(value),
        instructions: str_field(value, "strInstructions"),
        youtube: str_field(value, "strYoutube"),
        ingredients: collapse_ingredients(value),
    }
}

/// Fold `strIngredient1..20` / `strMeasure1..20` into pairs, dropping the
/// blank tail the upstream pads records with.
pub(crate) fn collapse_ingredients(value: &Value) -> Vec<Ingredient> {
    (1..=20)
        .filter_map(|i| {
            let name = str_field(value, &format!("strIngredient{i}"))?;
            let measure = str_field(value, &format!("strMeasure{i}")).unwrap_or_default();
            Some(Ingredient { name, measure })
        })
        .collect()
}
