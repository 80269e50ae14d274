use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;

pub mod ego;
pub mod log;

use ego::EgoSms;
use log::LogSms;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SMS provider rejected the message: {0}")]
    Rejected(String),
}

/// Returned by a successful send so callers can log which provider handled it.
#[derive(Debug, Clone)]
pub struct SmsReceipt {
    pub provider: &'static str,
}

/// Capability for dispatching a single text message.
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn send(&self, number: &str, message: &str) -> Result<SmsReceipt, SmsError>;
}

/// Provider chosen once at startup from `SMS_PROVIDER`.
#[derive(Clone)]
pub struct SmsService {
    inner: Arc<dyn SmsSender>,
}

impl SmsService {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let inner: Arc<dyn SmsSender> = match config.sms_provider.as_str() {
            "ego" => Arc::new(EgoSms::new(config.ego_sms.clone())?),
            "log" => Arc::new(LogSms),
            other => anyhow::bail!("unsupported SMS provider: {other}"),
        };
        Ok(Self { inner })
    }

    /// Test constructor wrapping an arbitrary sender.
    pub fn with_sender(sender: Arc<dyn SmsSender>) -> Self {
        Self { inner: sender }
    }

    pub fn provider(&self) -> &'static str {
        self.inner.provider()
    }

    pub async fn send(&self, number: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        self.inner.send(number, message).await
    }
}
