use std::sync::Arc;

use anyhow::{Context, Result};
use chorely_auth::{FirebaseIdentity, SessionCodec};
use chorely_config::AppConfig;
use chorely_firestore::FirestoreClient;
use chorely_gateway::{AppState, CookieSettings, FirebaseBackend};
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Installs the global subscriber. `RUST_LOG` overrides the default
    /// `info` filter.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub sessions: SessionCodec,
    pub cookie: CookieSettings,
    pub firebase: Option<FirebaseBackend>,
}

impl BackendServices {
    /// Builds the session codec and, when a Firebase project is configured,
    /// the Firestore and identity clients. Without Firebase the server still
    /// starts and data endpoints answer `not_configured`.
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let sessions =
            SessionCodec::from_config(&config.session).context("invalid session configuration")?;

        let firebase = if config.firebase.is_configured() {
            let store = FirestoreClient::new(&config.firebase)
                .context("failed to create firestore client")?;
            let identity = Arc::new(
                FirebaseIdentity::new(&config.firebase)
                    .context("failed to create firebase identity client")?,
            );
            info!(
                project = config.firebase.project_id.as_deref().unwrap_or_default(),
                "firebase backend ready"
            );
            Some(FirebaseBackend::new(
                Arc::new(store),
                identity.clone(),
                identity,
            ))
        } else {
            warn!("firebase is not configured; data endpoints will answer not_configured");
            None
        };

        Ok(Self {
            sessions,
            cookie: CookieSettings::from(&config.session),
            firebase,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.sessions.clone(), self.cookie.clone(), self.firebase.clone())
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
