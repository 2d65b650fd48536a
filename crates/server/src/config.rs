//! Server configuration, read once at start-up from flags or environment.

use std::path::PathBuf;

use clap::Args;
use strengths_llm::client::{DEFAULT_BASE_URL as ANTHROPIC_BASE_URL, DEFAULT_MODEL};
use strengths_mailer::client::DEFAULT_BASE_URL as RESEND_BASE_URL;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_WEB_DIR: &str = "web/dist";
const DEFAULT_EMAIL_FROM: &str = "Strengths Manager <coach@strengths.local>";
const DEFAULT_WEEKLY_INTERVAL_HOURS: u64 = 168;

#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Public URL of the dashboard; used for links in emails.
    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory holding the SQLite database.
    #[arg(long, env = "STRENGTHS_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory of the built dashboard, served when present.
    #[arg(long, env = "STRENGTHS_WEB_DIR", default_value = DEFAULT_WEB_DIR)]
    pub web_dir: PathBuf,

    /// HMAC secret for access tokens. A random one is generated when empty.
    #[arg(long, env = "JWT_SECRET", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_MODEL", default_value = DEFAULT_MODEL)]
    pub anthropic_model: String,

    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = ANTHROPIC_BASE_URL)]
    pub anthropic_base_url: String,

    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "RESEND_BASE_URL", default_value = RESEND_BASE_URL)]
    pub resend_base_url: String,

    /// Sender address for all outgoing email.
    #[arg(long, env = "EMAIL_FROM", default_value = DEFAULT_EMAIL_FROM)]
    pub email_from: String,

    /// Bearer secret for `POST /api/cron/weekly-emails`. The endpoint is closed when unset.
    #[arg(long, env = "CRON_SECRET", hide_env_values = true)]
    pub cron_secret: Option<String>,

    /// Hours between in-process weekly email runs; 0 disables the scheduler.
    #[arg(
        long,
        env = "WEEKLY_EMAIL_INTERVAL_HOURS",
        default_value_t = DEFAULT_WEEKLY_INTERVAL_HOURS
    )]
    pub weekly_email_interval_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            web_dir: PathBuf::from(DEFAULT_WEB_DIR),
            jwt_secret: String::new(),
            anthropic_api_key: None,
            anthropic_model: DEFAULT_MODEL.to_string(),
            anthropic_base_url: ANTHROPIC_BASE_URL.to_string(),
            resend_api_key: None,
            resend_base_url: RESEND_BASE_URL.to_string(),
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            cron_secret: None,
            weekly_email_interval_hours: DEFAULT_WEEKLY_INTERVAL_HOURS,
        }
    }
}

impl AppConfig {
    /// Dashboard URL without a trailing slash.
    pub fn public_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Configured cron secret, ignoring blank values.
    pub fn cron_secret(&self) -> Option<&str> {
        self.cron_secret.as_deref().filter(|s| !s.trim().is_empty())
    }
}
