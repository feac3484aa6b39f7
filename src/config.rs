use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Settings for the WhatsApp share deep link.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// E.164 country code prepended while normalizing phone numbers.
    pub phone_country_code: String,
}

/// Settings consumed by the client-side export pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// DOM element id the image exporter rasterizes.
    pub grid_target_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub share: ShareConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutriplan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutriplan-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let share = ShareConfig {
            phone_country_code: std::env::var("SHARE_PHONE_COUNTRY_CODE")
                .unwrap_or_else(|_| "593".into()),
        };
        let export = ExportConfig {
            grid_target_id: std::env::var("EXPORT_GRID_TARGET_ID")
                .unwrap_or_else(|_| "plan-grid-container".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            share,
            export,
        })
    }
}
