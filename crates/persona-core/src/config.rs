//! Global application configuration. Built once at startup and passed down;
//! no other module reads the process environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gateway + identity + credential configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Name of the person the chatbot speaks as.
    pub owner_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Directory holding `linkedin.pdf` and `summary.txt`.
    pub profile_dir: String,
    /// LLM mode: "mock" or "live".
    pub llm_mode: String,
    /// Model identifier passed to the live runtime.
    pub model: String,
    /// Chat-completions endpoint for the live runtime.
    pub api_url: String,
    /// API key for the live runtime. Empty in mock mode.
    #[serde(default)]
    pub api_key: String,
    /// Pushover application token for the notification tools.
    #[serde(default)]
    pub pushover_token: String,
    /// Pushover user key for the notification tools.
    #[serde(default)]
    pub pushover_user: String,
    /// If true, the gateway serves the static chat widget from `persona-frontend/`.
    /// (Config alias: `ui_enabled`)
    #[serde(default, alias = "ui_enabled")]
    pub frontend_enabled: bool,
    /// Upper bound on model/tool rounds per turn before the runtime gives up.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

fn default_max_tool_rounds() -> u32 {
    8
}

impl PersonaConfig {
    /// Load config from file and environment.
    /// Precedence: env `PERSONA_CONFIG` path > `config/gateway.toml` > defaults,
    /// then a `PERSONA__*` env overlay, then the conventional credential
    /// variables (`PUSHOVER_TOKEN`, `PUSHOVER_USER`, `OPENAI_API_KEY`) for
    /// fields the file left empty.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PERSONA_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let builder = config::Config::builder()
            .set_default("owner_name", "Utkarsh Patel")?
            .set_default("port", 8001_i64)?
            .set_default("profile_dir", "me")?
            .set_default("llm_mode", "mock")?
            .set_default("model", "gpt-4o")?
            .set_default("api_url", "https://api.openai.com/v1/chat/completions")?
            .set_default("api_key", "")?
            .set_default("pushover_token", "")?
            .set_default("pushover_user", "")?
            .set_default("frontend_enabled", false)?
            .set_default("max_tool_rounds", 8_i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("PERSONA").separator("__"))
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        cfg.apply_conventional_env();
        Ok(cfg)
    }

    /// Overlay the credential variable names the original deployment used,
    /// without clobbering values set through the file or `PERSONA__*`.
    fn apply_conventional_env(&mut self) {
        if self.pushover_token.is_empty() {
            if let Ok(v) = std::env::var("PUSHOVER_TOKEN") {
                self.pushover_token = v;
            }
        }
        if self.pushover_user.is_empty() {
            if let Ok(v) = std::env::var("PUSHOVER_USER") {
                self.pushover_user = v;
            }
        }
        if self.api_key.is_empty() {
            if let Ok(v) = std::env::var("OPENAI_API_KEY") {
                self.api_key = v;
            }
        }
    }

    /// True when the live runtime should be used instead of the mock one.
    pub fn is_live(&self) -> bool {
        self.llm_mode.eq_ignore_ascii_case("live")
    }
}
