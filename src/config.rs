use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Signing secret. `None` when JWT_SECRET is unset; the service keeps
    /// running but refuses to sign or verify tokens (500 per request).
    pub secret: Option<String>,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let secret = std::env::var("JWT_SECRET").ok();
        if secret.is_none() {
            tracing::warn!("JWT_SECRET is not set; token issuance and verification will fail");
        }
        let jwt = JwtConfig {
            secret,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        Ok(Self { database_url, jwt })
    }
}
