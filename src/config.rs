use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub app_name: String,
    pub sms_provider: String,
    /// Incomplete registrations older than this many hours are purged.
    pub registration_retention_hours: i64,
    pub ego_sms: EgoSmsConfig,
}

#[derive(Debug, Clone)]
pub struct EgoSmsConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub sender_id: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Passo".to_string());
        let sms_provider = env::var("SMS_PROVIDER").unwrap_or_else(|_| "log".to_string());
        let registration_retention_hours = env::var("REGISTRATION_RETENTION_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(24);

        let ego_sms = EgoSmsConfig {
            url: env::var("EGO_SMS_URL")
                .unwrap_or_else(|_| "https://www.egosms.co/api/v1/json/".to_string()),
            username: env::var("EGO_SMS_USERNAME").unwrap_or_default(),
            password: env::var("EGO_SMS_PASSWORD").unwrap_or_default(),
            sender_id: env::var("EGO_SMS_SENDER_ID").unwrap_or_else(|_| "PASSO".to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            app_name,
            sms_provider,
            registration_retention_hours,
            ego_sms,
        })
    }
}
