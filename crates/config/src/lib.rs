use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "chorely.toml",
    "config/chorely.toml",
    "crates/config/chorely.toml",
    "../chorely.toml",
    "../config/chorely.toml",
    "../crates/config/chorely.toml",
];

/// Signing secrets shorter than this are rejected by [`SessionConfig::validate`].
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub firebase: FirebaseConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

/// Connection settings for the Firebase project backing the app.
///
/// The base URLs only need overriding for emulators and tests.
///
/// ```
/// use chorely_config::FirebaseConfig;
///
/// let firebase = FirebaseConfig::default();
/// assert_eq!(firebase.firestore_base_url, "https://firestore.googleapis.com");
/// assert_eq!(firebase.request_timeout_seconds, 15);
/// assert!(!firebase.is_configured());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "FirebaseConfig::default_firestore_base_url")]
    pub firestore_base_url: String,
    #[serde(default = "FirebaseConfig::default_identity_base_url")]
    pub identity_base_url: String,
    #[serde(default = "FirebaseConfig::default_securetoken_base_url")]
    pub securetoken_base_url: String,
    #[serde(default = "FirebaseConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl FirebaseConfig {
    fn default_firestore_base_url() -> String {
        "https://firestore.googleapis.com".to_string()
    }

    fn default_identity_base_url() -> String {
        "https://identitytoolkit.googleapis.com".to_string()
    }

    fn default_securetoken_base_url() -> String {
        "https://securetoken.googleapis.com".to_string()
    }

    const fn default_request_timeout() -> u64 {
        15
    }

    pub fn is_configured(&self) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(|inner| !inner.trim().is_empty())
                .unwrap_or(false)
        };
        present(&self.project_id) && present(&self.api_key)
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            api_key: None,
            firestore_base_url: Self::default_firestore_base_url(),
            identity_base_url: Self::default_identity_base_url(),
            securetoken_base_url: Self::default_securetoken_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "SessionConfig::default_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "SessionConfig::default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "SessionConfig::default_secure_cookie")]
    pub secure_cookie: bool,
}

impl SessionConfig {
    const fn default_ttl() -> u64 {
        14 * 86_400
    }

    fn default_cookie_name() -> String {
        "chorely_session".to_string()
    }

    const fn default_secure_cookie() -> bool {
        true
    }

    /// Returns the signing secret, refusing to run with a missing or weak one.
    pub fn validate(&self) -> anyhow::Result<&str> {
        let secret = self
            .secret
            .as_deref()
            .context("session.secret must be set")?;
        if secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!("session.secret must be at least {MIN_SESSION_SECRET_LEN} bytes");
        }
        Ok(secret)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_seconds: Self::default_ttl(),
            cookie_name: Self::default_cookie_name(),
            secure_cookie: Self::default_secure_cookie(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use chorely_config::load;
///
/// std::env::remove_var("CHORELY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = i64::try_from(defaults.session.ttl_seconds).unwrap_or(i64::MAX);
    let timeout = i64::try_from(defaults.firebase.request_timeout_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default(
            "firebase.firestore_base_url",
            defaults.firebase.firestore_base_url.clone(),
        )?
        .set_default(
            "firebase.identity_base_url",
            defaults.firebase.identity_base_url.clone(),
        )?
        .set_default(
            "firebase.securetoken_base_url",
            defaults.firebase.securetoken_base_url.clone(),
        )?
        .set_default("firebase.request_timeout_seconds", timeout)?
        .set_default("session.ttl_seconds", session_ttl)?
        .set_default("session.cookie_name", defaults.session.cookie_name.clone())?
        .set_default("session.secure_cookie", defaults.session.secure_cookie)?;

    let environment_overrides = config::Environment::with_prefix("CHORELY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("CHORELY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via CHORELY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(
        http = ?config.http,
        firebase_configured = config.firebase.is_configured(),
        session_ttl = config.session.ttl_seconds,
        "loaded backend configuration"
    );
    Ok(config)
}
