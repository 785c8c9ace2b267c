use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::NutritionConfig,
    error::ApiError,
    food::{FoodItem, NutritionSnapshot},
};

/// Proxy client for the nutrition catalog.
///
/// An access token is exchanged fresh for every incoming request; nothing is
/// cached across requests and expiry is never tracked.
#[derive(Clone)]
pub struct NutritionClient {
    http: reqwest::Client,
    cfg: Arc<NutritionConfig>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// `foods.search` response body.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    foods: Option<FoodsBlock>,
}

#[derive(Debug, Deserialize)]
struct FoodsBlock {
    #[serde(default)]
    food: OneOrMany<SearchFood>,
}

#[derive(Debug, Deserialize)]
struct SearchFood {
    food_id: String,
    food_name: String,
    food_description: Option<String>,
}

/// `food.get.v2` response body.
#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    food: DetailFood,
}

#[derive(Debug, Deserialize)]
struct DetailFood {
    food_id: String,
    food_name: String,
    servings: Option<ServingsBlock>,
}

#[derive(Debug, Deserialize)]
struct ServingsBlock {
    #[serde(default)]
    serving: OneOrMany<Serving>,
}

#[derive(Debug, Deserialize)]
struct Serving {
    serving_description: Option<String>,
    calories: Option<String>,
    protein: Option<String>,
    fat: Option<String>,
    carbohydrate: Option<String>,
}

/// The upstream collapses single-element arrays into bare objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(x) => vec![x],
        }
    }
}

/// Normalized detail record for one catalog item.
#[derive(Debug, Serialize)]
pub struct FoodDetail {
    #[serde(flatten)]
    pub item: FoodItem,
    pub serving: NutritionSnapshot,
}

impl NutritionClient {
    pub fn new(http: reqwest::Client, cfg: NutritionConfig) -> Self {
        Self {
            http,
            cfg: Arc::new(cfg),
        }
    }

    /// Client-credentials exchange with HTTP Basic auth from the application
    /// id/secret pair. Any transport or non-2xx failure is a hard failure of
    /// the calling request.
    async fn token_exchange(&self) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.cfg.oauth_url)
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "basic")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "nutrition token exchange transport failure");
                ApiError::TokenUnavailable
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "nutrition token exchange rejected");
            return Err(ApiError::TokenUnavailable);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "nutrition token response malformed");
            ApiError::TokenUnavailable
        })?;
        Ok(token.access_token)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<FoodItem>, ApiError> {
        let token = self.token_exchange().await?;
        let body = self
            .call(
                &token,
                &[
                    ("method", "foods.search"),
                    ("search_expression", query),
                    ("format", "json"),
                    ("max_results", "50"),
                ],
            )
            .await?;

        let envelope: SearchEnvelope =
            serde_json::from_value(body).map_err(|e| ApiError::Internal(e.into()))?;
        let items = envelope
            .foods
            .map(|f| f.food.into_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|f| FoodItem::Nutrition {
                id: f.food_id,
                name: f.food_name,
                description: f.food_description,
            })
            .collect();
        Ok(items)
    }

    pub async fn detail(&self, id: &str) -> Result<FoodDetail, ApiError> {
        let token = self.token_exchange().await?;
        let body = self
            .call(
                &token,
                &[("method", "food.get.v2"), ("food_id", id), ("format", "json")],
            )
            .await?;

        let envelope: DetailEnvelope =
            serde_json::from_value(body).map_err(|e| ApiError::Internal(e.into()))?;
        let serving = envelope
            .food
            .servings
            .map(|s| s.serving.into_vec())
            .unwrap_or_default()
            .into_iter()
            .next();
        Ok(FoodDetail {
            item: FoodItem::Nutrition {
                id: envelope.food.food_id,
                name: envelope.food.food_name,
                description: None,
            },
            serving: serving.map(snapshot_from_serving).unwrap_or(NutritionSnapshot {
                calories: 0.0,
                protein_grams: 0.0,
                fat_grams: 0.0,
                carb_grams: 0.0,
                serving_description: None,
            }),
        })
    }

    /// One authenticated GET against the API endpoint, with embedded-error
    /// detection: this upstream signals failures inside a 200 OK body.
    async fn call(&self, token: &str, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(&self.cfg.api_url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "nutrition api returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        if let Some(err) = body.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown upstream error")
                .to_string();
            warn!(%message, "nutrition api embedded error in 200 body");
            return Err(ApiError::Upstream(message));
        }
        debug!("nutrition api call ok");
        Ok(body)
    }
}

fn snapshot_from_serving(s: Serving) -> NutritionSnapshot {
    NutritionSnapshot {
        calories: parse_grams(&s.calories),
        protein_grams: parse_grams(&s.protein),
        fat_grams: parse_grams(&s.fat),
        carb_grams: parse_grams(&s.carbohydrate),
        serving_description: s.serving_description,
    }
}

// Serving macros arrive as decimal strings ("240", "12.50").
fn parse_grams(raw: &Option<String>) -> f64 {
    raw.as_deref()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NutritionClient {
        NutritionClient::new(
            reqwest::Client::new(),
            NutritionConfig {
                client_id: "app-id".into(),
                client_secret: "app-secret".into(),
                oauth_url: format!("{}/connect/token", server.uri()),
                api_url: format!("{}/rest/server.api", server.uri()),
            },
        )
    }

    async fn mock_token_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "upstream-token",
                "token_type": "Bearer",
                "expires_in": 86400
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn search_normalizes_result_list() {
        let server = MockServer::start().await;
        mock_token_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/server.api"))
            .and(query_param("method", "foods.search"))
            .and(query_param("search_expression", "chicken"))
            .and(query_param("max_results", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": {
                    "food": [
                        { "food_id": "33691", "food_name": "Chicken Breast",
                          "food_description": "Per 100g - Calories: 110kcal" },
                        { "food_id": "33692", "food_name": "Chicken Thigh" }
                    ],
                    "max_results": "50", "total_results": "2", "page_number": "0"
                }
            })))
            .mount(&server)
            .await;

        let items = client_for(&server).search("chicken").await.expect("search");
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            FoodItem::Nutrition {
                id: "33691".into(),
                name: "Chicken Breast".into(),
                description: Some("Per 100g - Calories: 110kcal".into()),
            }
        );
    }

    #[tokio::test]
    async fn search_accepts_single_object_result() {
        let server = MockServer::start().await;
        mock_token_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/server.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": {
                    "food": { "food_id": "1", "food_name": "Egg" },
                    "total_results": "1"
                }
            })))
            .mount(&server)
            .await;

        let items = client_for(&server).search("egg").await.expect("search");
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn search_with_no_matches_is_empty() {
        let server = MockServer::start().await;
        mock_token_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/server.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": { "total_results": "0" }
            })))
            .mount(&server)
            .await;

        let items = client_for(&server).search("xyzzy").await.expect("search");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn embedded_error_in_200_body_is_not_a_success() {
        let server = MockServer::start().await;
        mock_token_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/server.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": 13, "message": "Invalid token: the token is expired" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).search("chicken").await.unwrap_err();
        match err {
            ApiError::Upstream(message) => assert!(message.contains("expired")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_token_exchange_is_a_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).search("chicken").await.unwrap_err();
        assert!(matches!(err, ApiError::TokenUnavailable));
    }

    #[tokio::test]
    async fn detail_parses_string_macros_from_first_serving() {
        let server = MockServer::start().await;
        mock_token_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/server.api"))
            .and(query_param("method", "food.get.v2"))
            .and(query_param("food_id", "33691"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "food": {
                    "food_id": "33691",
                    "food_name": "Chicken Breast",
                    "servings": {
                        "serving": [
                            { "serving_description": "100 g",
                              "calories": "110", "protein": "23.10",
                              "fat": "1.20", "carbohydrate": "0" },
                            { "serving_description": "1 cup",
                              "calories": "231", "protein": "48.50",
                              "fat": "2.52", "carbohydrate": "0" }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let detail = client_for(&server).detail("33691").await.expect("detail");
        assert_eq!(detail.serving.calories, 110.0);
        assert_eq!(detail.serving.protein_grams, 23.10);
        assert_eq!(detail.serving.fat_grams, 1.20);
        assert_eq!(detail.serving.carb_grams, 0.0);
        assert_eq!(detail.serving.serving_description.as_deref(), Some("100 g"));
    }

    #[test]
    fn unparsable_macros_default_to_zero() {
        assert_eq!(parse_grams(&None), 0.0);
        assert_eq!(parse_grams(&Some("n/a".into())), 0.0);
        assert_eq!(parse_grams(&Some("12.5".into())), 12.5);
    }
}
