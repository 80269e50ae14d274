use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EgoSmsConfig;

use super::{SmsError, SmsReceipt, SmsSender};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ATTEMPTS: u32 = 3;

/// EgoSMS JSON API client.
pub struct EgoSms {
    client: reqwest::Client,
    config: EgoSmsConfig,
}

#[derive(Serialize)]
struct SendSmsPayload<'a> {
    method: &'static str,
    userdata: UserData<'a>,
    msgdata: Vec<MsgData<'a>>,
}

#[derive(Serialize)]
struct UserData<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct MsgData<'a> {
    number: &'a str,
    message: &'a str,
    senderid: &'a str,
    priority: &'static str,
}

#[derive(Deserialize)]
struct SendSmsResponse {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

impl EgoSms {
    pub fn new(config: EgoSmsConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    async fn send_once(&self, number: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let payload = SendSmsPayload {
            method: "SendSms",
            userdata: UserData {
                username: &self.config.username,
                password: &self.config.password,
            },
            msgdata: vec![MsgData {
                number,
                message,
                senderid: &self.config.sender_id,
                // OTPs go out at the highest priority.
                priority: "0",
            }],
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: SendSmsResponse = response.json().await?;
        if body.status.eq_ignore_ascii_case("ok") {
            Ok(SmsReceipt { provider: "ego" })
        } else {
            Err(SmsError::Rejected(
                body.message.unwrap_or(body.status),
            ))
        }
    }
}

#[async_trait]
impl SmsSender for EgoSms {
    fn provider(&self) -> &'static str {
        "ego"
    }

    async fn send(&self, number: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let mut attempt = 1;
        loop {
            match self.send_once(number, message).await {
                Ok(receipt) => return Ok(receipt),
                // A provider rejection will not change on retry.
                Err(err @ SmsError::Rejected(_)) => return Err(err),
                Err(err) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(error = %err, attempt, "SMS send failed, retrying");
                    tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
