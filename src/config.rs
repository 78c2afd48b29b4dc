use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub catalog_base_url: String,
    pub catalog_api_key: String,
    pub payment_base_url: String,
    pub payment_secret_key: String,
    pub identity_base_url: String,
    pub identity_secret_key: String,
    pub currency: String,
    /// Whether an expired booking releases its seats back to the pool.
    pub release_on_expiry: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let catalog_base_url = env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let catalog_api_key = env::var("CATALOG_API_KEY")?;
        let payment_base_url =
            env::var("PAYMENT_BASE_URL").unwrap_or_else(|_| "https://api.stripe.com".to_string());
        let payment_secret_key = env::var("PAYMENT_SECRET_KEY")?;
        let identity_base_url =
            env::var("IDENTITY_BASE_URL").unwrap_or_else(|_| "https://api.clerk.com".to_string());
        let identity_secret_key = env::var("IDENTITY_SECRET_KEY")?;
        let currency = env::var("CURRENCY").unwrap_or_else(|_| "usd".to_string());
        let release_on_expiry = env::var("RELEASE_ON_EXPIRY")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            host,
            port,
            catalog_base_url,
            catalog_api_key,
            payment_base_url,
            payment_secret_key,
            identity_base_url,
            identity_secret_key,
            currency,
            release_on_expiry,
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes")
}
