use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub sweep_key: String,
    pub request_ttl_hours: i64,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let sweep_key = env::var("SWEEP_KEY")
            .map_err(|_| "SWEEP_KEY must be set".to_string())?;

        let request_ttl_hours = match env::var("REQUEST_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| format!("REQUEST_TTL_HOURS must be a positive integer, got '{}'", raw))?,
            Err(_) => 72,
        };

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            database_url,
            sweep_key,
            request_ttl_hours,
            cors_origin,
        })
    }
}
