use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS (the marketing site and the back office).
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Shared secret for payment webhook signatures. Unset disables the check.
    pub payment_webhook_secret: Option<String>,
    /// Emit JSON log lines instead of human-readable text.
    pub log_json: bool,
}

impl ServerConfig {
    /// Load from the environment (after `.env`, if present).
    ///
    /// | Env var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `3000`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `PAYMENT_WEBHOOK_SECRET` | unset                    |
    /// | `LOG_FORMAT`             | `text` (`json` switches) |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparsable numbers or a missing `JWT_SECRET`.
    pub fn from_env() -> Self {
        Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parsed_or("PORT", 3000),
            cors_origins: split_list(&var_or("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: parsed_or("REQUEST_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            payment_webhook_secret: std::env::var("PAYMENT_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            log_json: var_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: '{raw}'")),
        Err(_) => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_list_skips_blanks() {
        assert_eq!(
            split_list(" https://academia.test, ,http://localhost:5173 "),
            vec!["https://academia.test", "http://localhost:5173"]
        );
        assert!(split_list("").is_empty());
    }
}
