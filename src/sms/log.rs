use async_trait::async_trait;

use super::{SmsError, SmsReceipt, SmsSender};

/// Dev/test provider that only logs the outbound message.
pub struct LogSms;

#[async_trait]
impl SmsSender for LogSms {
    fn provider(&self) -> &'static str {
        "log"
    }

    async fn send(&self, number: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        tracing::info!(number, message, "SMS (log provider)");
        Ok(SmsReceipt { provider: "log" })
    }
}
