use clap::{ArgAction, Parser};
use std::{net::SocketAddr, path::PathBuf};

/// Origins allowed when no `--cors-origins` are given (local frontends).
pub const DEV_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:8080",
    "http://localhost:4200",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:8080",
    "http://127.0.0.1:4200",
];

/// Outfit advisor server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "outfit-advisor", version, about = "HTTP API server for outfit recommendations")]
pub struct Config {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (-q, -qq, -qqq)
    #[arg(short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Address to bind the HTTP server to
    #[arg(long, env = "OUTFIT_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Log file path (logs are written to stdout + this file)
    #[arg(long, env = "OUTFIT_LOG_FILE", default_value = "outfit-advisor.logs")]
    pub log_file: PathBuf,

    /// Comma separated CORS origins; `*` allows any origin.
    /// If not set, only local development frontends are allowed.
    #[arg(long, env = "OUTFIT_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "OUTFIT_MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Gemini API key used for attribute extraction and recommendations
    #[arg(long, env = "OUTFIT_GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Gemini generateContent endpoint for the vision model
    #[arg(
        long,
        env = "OUTFIT_VISION_ENDPOINT",
        default_value = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
    )]
    pub vision_endpoint: String,

    /// API key for the image model (defaults to the Gemini key)
    #[arg(long, env = "OUTFIT_IMAGE_API_KEY")]
    pub image_api_key: Option<String>,

    /// Gemini generateContent endpoint for the image model
    #[arg(
        long,
        env = "OUTFIT_IMAGE_ENDPOINT",
        default_value = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
    )]
    pub image_endpoint: String,

    /// Google Custom Search API key
    #[arg(long, env = "OUTFIT_SEARCH_API_KEY")]
    pub search_api_key: Option<String>,

    /// Google Custom Search engine id (cx)
    #[arg(long, env = "OUTFIT_SEARCH_ENGINE_ID")]
    pub search_engine_id: Option<String>,

    /// Google Custom Search endpoint
    #[arg(
        long,
        env = "OUTFIT_SEARCH_ENDPOINT",
        default_value = "https://www.googleapis.com/customsearch/v1"
    )]
    pub search_endpoint: String,

    /// Restrict product hits to this site (empty = no restriction)
    #[arg(long, env = "OUTFIT_SEARCH_SITE", default_value = "musinsa.com/products")]
    pub search_site: String,

    /// Timeout for each vision call, in seconds
    #[arg(long, env = "OUTFIT_VISION_TIMEOUT_SECS", default_value_t = 60)]
    pub vision_timeout_secs: u64,

    /// Timeout for each image generation call, in seconds
    #[arg(long, env = "OUTFIT_IMAGE_TIMEOUT_SECS", default_value_t = 120)]
    pub image_timeout_secs: u64,

    /// Timeout for each product search call, in seconds
    #[arg(long, env = "OUTFIT_SEARCH_TIMEOUT_SECS", default_value_t = 30)]
    pub search_timeout_secs: u64,
}

fn is_set(v: Option<&String>) -> bool {
    v.is_some_and(|k| !k.trim().is_empty())
}

/// `<set>` / `<not set>` for secrets in startup logs.
#[must_use]
pub fn mask(v: Option<&String>) -> &'static str {
    if is_set(v) { "<set>" } else { "<not set>" }
}

impl Config {
    #[must_use]
    pub fn verbosity_delta(&self) -> i16 {
        i16::from(self.verbose) - i16::from(self.quiet)
    }

    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_delta() {
            d if d <= -2 => "error",
            -1 => "warn",
            0 => "info,outfit_advisor=info,axum=info,tower_http=info,reqwest=warn",
            1 => "debug,outfit_advisor=debug,axum=info,tower_http=info,hyper=info,reqwest=info",
            2 => "trace,outfit_advisor=trace,axum=debug,tower_http=trace,hyper=info",
            _ => "trace,outfit_advisor=trace,axum=trace,tower_http=trace,hyper=debug",
        }
    }

    /// Image model key, falling back to the Gemini key.
    #[must_use]
    pub fn image_api_key(&self) -> Option<String> {
        if is_set(self.image_api_key.as_ref()) {
            self.image_api_key.clone()
        } else {
            self.gemini_api_key.clone()
        }
    }

    /// Configured CORS origins, or the development list when none are given.
    #[must_use]
    pub fn cors_origins(&self) -> Vec<String> {
        let configured: Vec<String> = self
            .cors_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if configured.is_empty() {
            DEV_CORS_ORIGINS.iter().map(ToString::to_string).collect()
        } else {
            configured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_key_falls_back_to_gemini_key() {
        let cfg = Config::parse_from([
            "outfit-advisor",
            "--gemini-api-key",
            "g-key",
            "--image-api-key",
            " ",
        ]);
        assert_eq!(cfg.image_api_key().as_deref(), Some("g-key"));

        let cfg = Config::parse_from(["outfit-advisor", "--image-api-key", "i-key"]);
        assert_eq!(cfg.image_api_key().as_deref(), Some("i-key"));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let cfg = Config::parse_from([
            "outfit-advisor",
            "--cors-origins",
            "https://a.example, https://b.example",
        ]);
        assert_eq!(
            cfg.cors_origins(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn verbosity_flags_shift_the_filter() {
        assert_eq!(Config::parse_from(["outfit-advisor", "-qq"]).log_filter(), "error");
        assert_eq!(Config::parse_from(["outfit-advisor", "-q"]).log_filter(), "warn");
        assert!(
            Config::parse_from(["outfit-advisor", "-v"])
                .log_filter()
                .starts_with("debug")
        );
    }

    #[test]
    fn secrets_are_masked() {
        assert_eq!(mask(Some(&"k".to_string())), "<set>");
        assert_eq!(mask(Some(&String::new())), "<not set>");
        assert_eq!(mask(None), "<not set>");
    }
}
