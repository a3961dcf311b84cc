//! Alert dispatch to check owners on state changes.

use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::warn;

use crate::config::SmsConfig;
use crate::models::Check;

/// Twilio limit on a single message body.
const MAX_MESSAGE_LEN: usize = 1600;

/// Outbound notification transport. Implementations deliver a message to the
/// owner identified by their stored 10-digit phone number.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> Result<()>;
}

/// Message sent when a check changes state.
pub fn status_change_message(check: &Check) -> String {
    format!(
        "Alert: Your check for {} {} is currently {}",
        check.method.as_str().to_uppercase(),
        check.target(),
        check.state
    )
}

fn validate_alert_input(phone: &str, message: &str) -> Result<()> {
    if phone.trim().len() != 10 {
        bail!("recipient must be a 10-digit phone number");
    }
    let message = message.trim();
    if message.is_empty() || message.len() > MAX_MESSAGE_LEN {
        bail!("message must be between 1 and {MAX_MESSAGE_LEN} characters");
    }
    Ok(())
}

/// Sends SMS alerts through the Twilio Messages API.
pub struct TwilioDispatcher {
    client: reqwest::Client,
    config: SmsConfig,
}

impl TwilioDispatcher {
    pub fn new(config: SmsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl AlertDispatcher for TwilioDispatcher {
    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        validate_alert_input(phone, message)?;

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        // Destination formatting is deployment configuration, not code.
        let to = format!("{}{}", self.config.country_code, phone.trim());
        let params = [
            ("From", self.config.from_phone.as_str()),
            ("To", to.as_str()),
            ("Body", message.trim()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("twilio rejected the message with status {}", response.status());
        }
        Ok(())
    }
}

/// Stand-in transport used when SMS delivery is disabled: the alert is
/// recorded in the service log and reported as delivered.
pub struct LogOnlyDispatcher;

#[async_trait]
impl AlertDispatcher for LogOnlyDispatcher {
    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        validate_alert_input(phone, message)?;
        warn!(recipient = %phone, %message, "sms disabled, alert logged only");
        Ok(())
    }
}
