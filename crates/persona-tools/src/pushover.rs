//! Thin Pushover client: one form POST per notification, fire-and-forget.

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Sends push notifications through the Pushover message API.
#[derive(Clone)]
pub struct PushoverClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    user: String,
}

impl PushoverClient {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: PUSHOVER_API_URL.to_string(),
            token: token.into(),
            user: user.into(),
        }
    }

    /// Overrides the API endpoint (tests point this at a local server).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// True when both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.user.is_empty()
    }

    /// POSTs the message as form fields `token`, `user`, `message`.
    /// The response body is not inspected beyond the status code.
    pub async fn notify(
        &self,
        message: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.is_configured() {
            return Err("pushover credentials not configured".into());
        }
        let response = self
            .http
            .post(&self.api_url)
            .form(&[
                ("token", self.token.as_str()),
                ("user", self.user.as_str()),
                ("message", message),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(format!("pushover returned status {}", response.status()).into());
        }
        Ok(())
    }
}
