//! Server configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::BoxError;

const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// Server configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// Rolling file logs are written under `<log_dir>/app` when set
    pub log_dir: Option<String>,
    /// Mail relay (None = email delivery disabled)
    pub smtp: Option<SmtpConfig>,
    /// Display name used in the From header
    pub mail_from_name: String,
    /// Document store (None = local JSON file)
    pub firestore: Option<FirestoreConfig>,
    /// Directory holding `membres.json`
    pub data_dir: PathBuf,
    /// Directory for per-member QR images (file store only)
    pub qr_dir: PathBuf,
    /// Scratch directory for rendered cards
    pub temp_dir: PathBuf,
    /// Base URL for wallet-pass links in the welcome email
    pub wallet_pass_base_url: Option<String>,
}

/// SMTP transport security
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    StartTls,
    Tls,
    None,
}

impl FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!("unknown SMTP_TLS mode: {other}")),
        }
    }
}

/// Mail relay settings
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub tls: SmtpTls,
    pub timeout: Duration,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Firestore REST settings
#[derive(Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// OAuth bearer token; omitted against the emulator
    pub access_token: Option<String>,
    pub base_url: String,
    pub collection: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let parsed = |name: &str| -> Result<Option<u64>, BoxError> {
            var(name)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .map_err(|_| BoxError::from(format!("{name} must be a number, got {v:?}")))
                })
                .transpose()
        };

        let http_port = match var("HTTP_PORT").or_else(|| var("PORT")) {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("HTTP_PORT must be a valid port, got {p:?}"))?,
            None => 3000,
        };

        let smtp = match (var("SMTP_HOST"), var("SMTP_USER"), var("SMTP_PASS")) {
            (Some(host), Some(user), Some(password)) => Some(SmtpConfig {
                host,
                port: match parsed("SMTP_PORT")? {
                    Some(p) => u16::try_from(p).map_err(|_| "SMTP_PORT out of range")?,
                    None => 587,
                },
                user,
                password,
                tls: var("SMTP_TLS")
                    .map(|v| v.parse::<SmtpTls>())
                    .transpose()?
                    .unwrap_or(SmtpTls::StartTls),
                timeout: Duration::from_secs(parsed("SMTP_TIMEOUT_SECS")?.unwrap_or(10)),
            }),
            _ => None,
        };

        let firestore = var("FIREBASE_PROJECT_ID").map(|project_id| -> Result<_, BoxError> {
            Ok(FirestoreConfig {
                project_id,
                access_token: var("FIREBASE_ACCESS_TOKEN"),
                base_url: var("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.into()),
                collection: var("FIRESTORE_COLLECTION").unwrap_or_else(|| "membres".into()),
                timeout: Duration::from_secs(parsed("HTTP_CLIENT_TIMEOUT_SECS")?.unwrap_or(10)),
            })
        });

        Ok(Self {
            http_port,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: var("LOG_JSON").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
            log_dir: var("LOG_DIR"),
            smtp,
            mail_from_name: var("MAIL_FROM_NAME")
                .unwrap_or_else(|| shared::branding::ORG_NAME.into()),
            firestore: firestore.transpose()?,
            data_dir: var("DATA_DIR").unwrap_or_else(|| "temp".into()).into(),
            qr_dir: var("QR_DIR").unwrap_or_else(|| "qr-codes".into()).into(),
            temp_dir: var("TEMP_DIR").unwrap_or_else(|| "temp".into()).into(),
            wallet_pass_base_url: var("WALLET_PASS_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    /// Path of the JSON record file used when no document store is configured
    pub fn members_file(&self) -> PathBuf {
        self.data_dir.join("membres.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, BoxError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_without_any_variable() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.environment, "development");
        assert!(config.smtp.is_none());
        assert!(config.firestore.is_none());
        assert_eq!(config.members_file(), PathBuf::from("temp/membres.json"));
        assert_eq!(config.qr_dir, PathBuf::from("qr-codes"));
    }

    #[test]
    fn port_falls_back_to_port_variable() {
        assert_eq!(load(&[("PORT", "8080")]).unwrap().http_port, 8080);
        assert_eq!(
            load(&[("PORT", "8080"), ("HTTP_PORT", "9000")])
                .unwrap()
                .http_port,
            9000
        );
        assert!(load(&[("HTTP_PORT", "abc")]).is_err());
    }

    #[test]
    fn smtp_requires_host_user_and_password() {
        assert!(load(&[("SMTP_HOST", "smtp.test"), ("SMTP_USER", "u")])
            .unwrap()
            .smtp
            .is_none());

        let config = load(&[
            ("SMTP_HOST", "smtp.test"),
            ("SMTP_USER", "u@test.fr"),
            ("SMTP_PASS", "secret"),
            ("SMTP_PORT", "465"),
            ("SMTP_TLS", "tls"),
        ])
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.tls, SmtpTls::Tls);
        assert_eq!(smtp.timeout, Duration::from_secs(10));
        assert!(!format!("{smtp:?}").contains("secret"));
    }

    #[test]
    fn firestore_enabled_by_project_id() {
        let config = load(&[("FIREBASE_PROJECT_ID", "fort-4nap")]).unwrap();
        let fs = config.firestore.unwrap();
        assert_eq!(fs.project_id, "fort-4nap");
        assert_eq!(fs.collection, "membres");
        assert_eq!(fs.base_url, DEFAULT_FIRESTORE_BASE_URL);
    }

    #[test]
    fn invalid_tls_mode_is_rejected() {
        let result = load(&[
            ("SMTP_HOST", "h"),
            ("SMTP_USER", "u"),
            ("SMTP_PASS", "p"),
            ("SMTP_TLS", "maybe"),
        ]);
        assert!(result.is_err());
    }
}
