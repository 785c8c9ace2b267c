use serde::Deserialize;

/// Body of POST /meals. The owner is never taken from the client; it comes
/// from the verified token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMealRequest {
    /// `YYYY-MM-DD` by convention; stored verbatim, not parsed.
    pub date: String,
    /// Free-text side/base label, or the literal "None".
    pub base: String,
    pub external_meal_id: String,
    pub meal_name: String,
    #[serde(default)]
    pub meal_thumb: Option<String>,
    #[serde(default)]
    pub is_saved_combo: bool,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein_grams: f64,
    #[serde(default)]
    pub fat_grams: f64,
    #[serde(default)]
    pub carb_grams: f64,
}
