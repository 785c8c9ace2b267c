use serde::Serialize;

/// Canonical item shape shared by both upstream catalogs.
///
/// The two providers return wildly different JSON; each proxy converts into
/// this tagged form at its own boundary so clients only ever see one shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum FoodItem {
    #[serde(rename_all = "camelCase")]
    Recipe {
        id: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thumb: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        area: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Nutrition {
        id: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Serving-level macros captured from the nutrition catalog's detail record.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSnapshot {
    pub calories: f64,
    pub protein_grams: f64,
    pub fat_grams: f64,
    pub carb_grams: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_description: Option<String>,
}
