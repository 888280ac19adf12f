//! Telegram bot alert channel (`sendMessage`, Markdown parse mode).

use crate::domain::error::AlgoError;
use crate::ports::alert_port::AlertPort;
use std::time::Duration;

const BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

pub struct TelegramAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    config: Option<TelegramConfig>,
}

impl TelegramAdapter {
    /// With `None` every send is a no-op.
    pub fn new(config: Option<TelegramConfig>) -> Result<Self, AlgoError> {
        Self::with_base_url(BASE_URL, config)
    }

    pub fn with_base_url(
        base_url: &str,
        config: Option<TelegramConfig>,
    ) -> Result<Self, AlgoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }
}

impl AlertPort for TelegramAdapter {
    fn send(&self, message: &str) -> Result<(), AlgoError> {
        let Some(config) = &self.config else {
            log::debug!("telegram not configured, skipping alert");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.base_url, config.bot_token);
        let params = [
            ("chat_id", config.chat_id.as_str()),
            ("text", message),
            ("parse_mode", "Markdown"),
        ];
        let resp = self.client.post(&url).form(&params).send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(AlgoError::Alert {
                reason: format!("HTTP {status}: {body}"),
            });
        }
        Ok(())
    }
}
