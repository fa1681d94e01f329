//! Configuration for editor-prepare
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::document::naming::DEFAULT_MAX_ATTEMPTS;
use crate::document::DEFAULT_LOCALE;
use crate::prepare::token::MIN_SECRET_LEN;

/// editor-prepare - session descriptors for document editing servers
#[derive(Parser, Debug, Clone)]
#[command(name = "editor-prepare")]
#[command(about = "Prepares editor session descriptors for a document editing server")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Public base URL of this gateway (content URLs are built from it)
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:8080")]
    pub public_url: String,

    /// Endpoint the editing server posts saved documents to (required)
    #[arg(long, env = "CALLBACK_URL")]
    pub callback_url: Option<String>,

    /// Base URL of the document editing server
    #[arg(long, env = "EDITOR_SERVICE_URL", default_value = "http://localhost:8000/")]
    pub editor_service_url: String,

    /// Root directory of the filesystem content store
    #[arg(long, env = "CONTENT_ROOT", default_value = "./content")]
    pub content_root: PathBuf,

    /// Root directory of empty-document templates (<root>/<locale>/new.<ext>)
    #[arg(long, env = "TEMPLATES_DIR", default_value = "./newdocs")]
    pub templates_dir: PathBuf,

    /// Optional JSON file of directory entries
    #[arg(long, env = "USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Optional JSON file of extra message bundles
    #[arg(long, env = "MESSAGES_FILE")]
    pub messages_file: Option<PathBuf>,

    /// Fallback locale for templates and messages
    #[arg(long, env = "DEFAULT_LOCALE", default_value = DEFAULT_LOCALE)]
    pub default_locale: String,

    /// Sign descriptors with a JWT
    #[arg(long, env = "JWT_ENABLED", default_value = "false")]
    pub jwt_enabled: bool,

    /// Shared secret for descriptor signing
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Ceiling on candidate names tried when creating a document
    #[arg(long, env = "MAX_NAME_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_name_attempts: usize,

    /// Header carrying the authenticated user id
    #[arg(long, env = "USER_HEADER", default_value = "X-Remote-User")]
    pub user_header: String,

    /// Enable development mode (requests without a user header run as `dev_user`)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// User id assumed in development mode
    #[arg(long, env = "DEV_USER", default_value = "admin")]
    pub dev_user: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Args {
    /// Save-callback endpoint served by the content repository.
    /// Empty until configured; `validate()` rejects that.
    pub fn callback_endpoint(&self) -> &str {
        self.callback_url.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_enabled {
            match &self.jwt_secret {
                None => return Err("JWT_SECRET is required when JWT_ENABLED is set".to_string()),
                Some(secret) if secret.len() < MIN_SECRET_LEN => {
                    return Err(format!(
                        "JWT_SECRET must be at least {} characters",
                        MIN_SECRET_LEN
                    ));
                }
                Some(_) => {}
            }
        }

        let callback = self.callback_endpoint();
        if callback.is_empty() {
            return Err("CALLBACK_URL is required (the repository's save endpoint)".to_string());
        }
        if !callback.starts_with("http://") && !callback.starts_with("https://") {
            return Err("CALLBACK_URL must be an http(s) URL".to_string());
        }

        if self.max_name_attempts == 0 {
            return Err("MAX_NAME_ATTEMPTS must be at least 1".to_string());
        }

        if !self.public_url.starts_with("http://") && !self.public_url.starts_with("https://") {
            return Err("PUBLIC_URL must be an http(s) URL".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["editor-prepare"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    const CALLBACK: &str = "https://ecm.local/cb";

    #[test]
    fn test_defaults_validate() {
        let args = parse(&["--callback-url", CALLBACK]);
        assert!(args.validate().is_ok());
        assert!(!args.jwt_enabled);
        assert_eq!(args.default_locale, "en");
        assert_eq!(args.callback_endpoint(), CALLBACK);
    }

    #[test]
    fn test_callback_url_required() {
        let args = parse(&[]);
        assert_eq!(args.callback_endpoint(), "");
        assert!(args.validate().unwrap_err().contains("CALLBACK_URL"));

        let args = parse(&["--callback-url", "  "]);
        assert!(args.validate().is_err());

        let args = parse(&["--callback-url", "ecm.local/cb"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_jwt_requires_secret() {
        let args = parse(&["--callback-url", CALLBACK, "--jwt-enabled"]);
        assert!(args.validate().is_err());

        let args = parse(&[
            "--callback-url",
            CALLBACK,
            "--jwt-enabled",
            "--jwt-secret",
            "short",
        ]);
        assert!(args.validate().is_err());

        let args = parse(&[
            "--callback-url",
            CALLBACK,
            "--jwt-enabled",
            "--jwt-secret",
            "this-secret-is-at-least-32-chars-long",
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_format() {
        let args = parse(&["--log-format", "json"]);
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
