use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Client-credentials pair plus endpoints for the nutrition catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionConfig {
    pub client_id: String,
    pub client_secret: String,
    pub oauth_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub nutrition: NutritionConfig,
    pub recipe_api_url: String,
    pub upstream_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "plateplan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "plateplan-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let nutrition = NutritionConfig {
            client_id: std::env::var("NUTRITION_CLIENT_ID")?,
            client_secret: std::env::var("NUTRITION_CLIENT_SECRET")?,
            oauth_url: std::env::var("NUTRITION_OAUTH_URL")
                .unwrap_or_else(|_| "https://oauth.fatsecret.com/connect/token".into()),
            api_url: std::env::var("NUTRITION_API_URL")
                .unwrap_or_else(|_| "https://platform.fatsecret.com/rest/server.api".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            nutrition,
            recipe_api_url: std::env::var("RECIPE_API_URL")
                .unwrap_or_else(|_| "https://www.themealdb.com/api/json/v1/1".into()),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(15),
        })
    }
}
